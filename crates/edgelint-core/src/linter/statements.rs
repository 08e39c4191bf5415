// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Declaration-body and statement checks.
//!
//! Each statement kind validates three things: that it is legal in the
//! active execution scope, that the names it touches resolve, and that the
//! involved types line up. Everything is reported; nothing aborts the walk.

use ecow::EcoString;

use crate::ast::{
    AclDecl, AssignmentOperator, BackendDecl, BackendValue, Block, Declaration, DirectorDecl,
    SetStatement, Statement, SubroutineDecl, TableDecl,
};
use crate::context::{Scope, ScopeSet, Type};

use super::{Diagnostic, Linter, Rule};

/// Scopes where `restart` is legal.
const RESTART_SCOPES: ScopeSet = Scope::Recv
    .mask()
    .union(Scope::Hit.mask())
    .union(Scope::Fetch.mask())
    .union(Scope::Error.mask())
    .union(Scope::Deliver.mask());

/// Scopes where the `error` statement is legal.
const ERROR_SCOPES: ScopeSet = Scope::Recv
    .mask()
    .union(Scope::Hit.mask())
    .union(Scope::Miss.mask())
    .union(Scope::Pass.mask())
    .union(Scope::Fetch.mask());

/// Scopes where `synthetic` is legal.
const SYNTHETIC_SCOPES: ScopeSet = Scope::Error.mask();

/// The return states and the scopes each is legal in.
const RETURN_STATES: [(&str, ScopeSet); 9] = [
    ("lookup", Scope::Recv.mask()),
    ("pass", ERROR_SCOPES),
    ("error", ERROR_SCOPES),
    ("restart", RESTART_SCOPES),
    (
        "deliver",
        Scope::Hit
            .mask()
            .union(Scope::Miss.mask())
            .union(Scope::Pass.mask())
            .union(Scope::Fetch.mask())
            .union(Scope::Error.mask())
            .union(Scope::Deliver.mask())
            .union(Scope::Log.mask()),
    ),
    ("fetch", Scope::Miss.mask().union(Scope::Pass.mask())),
    (
        "deliver_stale",
        Scope::Miss.mask().union(Scope::Fetch.mask()),
    ),
    ("hash", Scope::Hash.mask()),
    ("upgrade", Scope::Recv.mask()),
];

impl Linter<'_> {
    // ========================================================================
    // Declaration Bodies (pass 2)
    // ========================================================================

    /// Checks one declaration body. Registration has already happened.
    pub(crate) fn check_declaration(&mut self, declaration: &Declaration) {
        match declaration {
            Declaration::Subroutine(sub) => self.check_subroutine(sub),
            Declaration::Table(table) => self.check_table(table),
            Declaration::Acl(acl) => self.check_acl(acl),
            Declaration::Backend(backend) => self.check_backend(backend),
            Declaration::Director(director) => self.check_director(director),
            Declaration::Import(_) | Declaration::Include(_) => {}
        }
    }

    /// Checks a subroutine body under its declared scopes.
    fn check_subroutine(&mut self, sub: &SubroutineDecl) {
        self.scope = self
            .context
            .subroutine(&sub.name.name)
            .map_or(ScopeSet::REQUEST, |info| info.scopes);
        self.matched = false;
        self.labels = collect_labels(&sub.body);

        self.context.push_locals();
        self.check_block(&sub.body);
        let locals = self.context.pop_locals();

        if self.strict {
            for local in locals {
                if !local.read {
                    self.report(Diagnostic::warning(
                        Rule::UnusedLocal,
                        format!("local variable '{}' is declared but never read", local.name),
                        local.span,
                    ));
                }
            }
        }

        self.scope = Scope::Init.mask();
    }

    /// Checks table entry values against the declared value type.
    fn check_table(&mut self, table: &TableDecl) {
        let value_type = self.context.table(&table.name.name).unwrap_or(Type::String);
        for entry in &table.entries {
            let found = self.check_expression(&entry.value);
            if !compatible_assign(value_type, found) {
                self.report(Diagnostic::error(
                    Rule::TypeMismatch,
                    format!(
                        "table '{}' holds {value_type} values, entry \"{}\" is {found}",
                        table.name.name, entry.key.value
                    ),
                    entry.value.span(),
                ));
            }
        }
    }

    /// Checks ACL entry masks.
    fn check_acl(&mut self, acl: &AclDecl) {
        for entry in &acl.entries {
            if let Some(mask) = &entry.mask {
                if !(0..=128).contains(&mask.value) {
                    self.report(Diagnostic::error(
                        Rule::InvalidDeclaration,
                        format!(
                            "subnet mask /{} is out of range in acl '{}'",
                            mask.value, acl.name.name
                        ),
                        mask.meta.span,
                    ));
                }
            }
        }
    }

    /// Checks backend property values (including nested probe blocks).
    fn check_backend(&mut self, backend: &BackendDecl) {
        fn walk(linter: &mut Linter<'_>, properties: &[crate::ast::BackendProperty]) {
            for property in properties {
                match &property.value {
                    BackendValue::Expression(value) => {
                        linter.check_expression(value);
                    }
                    BackendValue::Block(inner, _) => walk(linter, inner),
                }
            }
        }
        walk(self, &backend.properties);
    }

    /// Checks a director's policy and member backend references.
    fn check_director(&mut self, director: &DirectorDecl) {
        if !matches!(
            director.policy.name.as_str(),
            "random" | "hash" | "client" | "fallback"
        ) {
            self.report(Diagnostic::error(
                Rule::InvalidDeclaration,
                format!(
                    "unknown director policy '{}' (expected random, hash, client, or fallback)",
                    director.policy.name
                ),
                director.policy.meta.span,
            ));
        }

        for member in &director.backends {
            let mut has_backend = false;
            for property in &member.properties {
                if property.name.name == ".backend" {
                    has_backend = true;
                    if let crate::ast::Expression::Ident(ident) = &property.value {
                        if !self.context.has_backend(&ident.name) {
                            self.report(Diagnostic::error(
                                Rule::Undeclared,
                                format!(
                                    "director '{}' references undeclared backend '{}'",
                                    director.name.name, ident.name
                                ),
                                ident.meta.span,
                            ));
                        }
                    }
                } else {
                    self.check_expression(&property.value);
                }
            }
            if !has_backend {
                self.report(Diagnostic::error(
                    Rule::InvalidDeclaration,
                    format!(
                        "director '{}' member is missing a .backend property",
                        director.name.name
                    ),
                    member.meta.span,
                ));
            }
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    /// Checks every statement in a block.
    pub(crate) fn check_block(&mut self, block: &Block) {
        for statement in &block.statements {
            self.with_suppressions(statement.meta(), |linter| {
                linter.check_statement(statement);
            });
        }
    }

    fn check_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::If(stmt) => {
                let condition = self.check_expression(&stmt.condition);
                if !is_truthy(condition) {
                    self.report(Diagnostic::error(
                        Rule::TypeMismatch,
                        format!("if condition must be BOOL or STRING, found {condition}"),
                        stmt.condition.span(),
                    ));
                }
                self.check_block(&stmt.consequence);
                for clause in &stmt.alternatives {
                    let condition = self.check_expression(&clause.condition);
                    if !is_truthy(condition) {
                        self.report(Diagnostic::error(
                            Rule::TypeMismatch,
                            format!("elsif condition must be BOOL or STRING, found {condition}"),
                            clause.condition.span(),
                        ));
                    }
                    self.check_block(&clause.body);
                }
                if let Some(alternative) = &stmt.alternative {
                    self.check_block(alternative);
                }
            }

            Statement::Set(stmt) => self.check_set(stmt),

            Statement::Unset(stmt) => {
                let name = &stmt.target.name;
                if self.context.lookup_local(name).is_some() {
                    self.report(Diagnostic::error(
                        Rule::InvalidAssignment,
                        format!("local variable '{name}' cannot be unset"),
                        stmt.target.meta.span,
                    ));
                } else if let Some(spec) = self.context.lookup_variable(name) {
                    let write = spec.write;
                    if write.is_empty() {
                        self.report(Diagnostic::error(
                            Rule::InvalidAssignment,
                            format!("variable '{name}' is read-only"),
                            stmt.target.meta.span,
                        ));
                    } else if !write.intersects(self.scope) {
                        self.report(Diagnostic::error(
                            Rule::ScopeViolation,
                            format!(
                                "variable '{name}' is not writable in {} scope (writable in: {write})",
                                self.scope
                            ),
                            stmt.target.meta.span,
                        ));
                    }
                } else {
                    self.report(Diagnostic::error(
                        Rule::Undeclared,
                        format!("undeclared variable '{name}'"),
                        stmt.target.meta.span,
                    ));
                }
            }

            Statement::Add(stmt) => {
                let name = &stmt.target.name;
                if name.contains(".http.") {
                    self.check_write_target(&stmt.target);
                } else {
                    self.report(Diagnostic::error(
                        Rule::InvalidAssignment,
                        format!("add works on multi-valued headers, '{name}' is not a header"),
                        stmt.target.meta.span,
                    ));
                }
                let value = self.check_expression(&stmt.value);
                if !value.is_string_coercible() {
                    self.report(Diagnostic::error(
                        Rule::TypeMismatch,
                        format!("{value} value cannot be appended to a header"),
                        stmt.value.span(),
                    ));
                }
            }

            Statement::Call(stmt) => {
                let name = &stmt.subroutine.name;
                match self.context.subroutine(name) {
                    None => self.report(Diagnostic::error(
                        Rule::Undeclared,
                        format!("call to undeclared subroutine '{name}'"),
                        stmt.subroutine.meta.span,
                    )),
                    Some(info) => {
                        let scopes = info.scopes;
                        if !scopes.intersects(self.scope) {
                            self.report(Diagnostic::error(
                                Rule::ScopeViolation,
                                format!(
                                    "subroutine '{name}' is not callable in {} scope (callable in: {scopes})",
                                    self.scope
                                ),
                                stmt.subroutine.meta.span,
                            ));
                        }
                    }
                }
            }

            Statement::Declare(stmt) => {
                let name = &stmt.name.name;
                if !name.starts_with("var.") {
                    self.report(Diagnostic::error(
                        Rule::InvalidDeclaration,
                        format!("local variable '{name}' must be named 'var.*'"),
                        stmt.name.meta.span,
                    ));
                }
                let ty = match Type::from_type_name(&stmt.type_name.name) {
                    Some(ty) => ty,
                    None => {
                        self.report(Diagnostic::error(
                            Rule::InvalidDeclaration,
                            format!("unknown type '{}'", stmt.type_name.name),
                            stmt.type_name.meta.span,
                        ));
                        Type::Any
                    }
                };
                if let Err(duplicate) = self.context.declare_local(name, ty, stmt.name.meta.span) {
                    self.report_duplicate(&duplicate, stmt.name.meta.span);
                }
            }

            Statement::Return(stmt) => {
                if let Some(state) = &stmt.state {
                    self.check_return_state(&state.name, state.meta.span);
                }
            }

            Statement::Error(stmt) => {
                self.check_statement_scope("error", ERROR_SCOPES, statement);
                if let Some(code) = &stmt.code {
                    let ty = self.check_expression(code);
                    if !matches!(ty, Type::Integer | Type::Any) {
                        self.report(Diagnostic::error(
                            Rule::TypeMismatch,
                            format!("error status code must be INTEGER, found {ty}"),
                            code.span(),
                        ));
                    }
                }
                if let Some(response) = &stmt.response {
                    let ty = self.check_expression(response);
                    if !ty.is_string_coercible() {
                        self.report(Diagnostic::error(
                            Rule::TypeMismatch,
                            format!("error response must be a string, found {ty}"),
                            response.span(),
                        ));
                    }
                }
            }

            Statement::Restart(_) => {
                self.check_statement_scope("restart", RESTART_SCOPES, statement);
            }

            Statement::Synthetic(stmt) => {
                let keyword = if stmt.base64 {
                    "synthetic.base64"
                } else {
                    "synthetic"
                };
                self.check_statement_scope(keyword, SYNTHETIC_SCOPES, statement);
                let ty = self.check_expression(&stmt.value);
                if !ty.is_string_coercible() {
                    self.report(Diagnostic::error(
                        Rule::TypeMismatch,
                        format!("synthetic body must be a string, found {ty}"),
                        stmt.value.span(),
                    ));
                }
            }

            Statement::Log(stmt) => {
                let ty = self.check_expression(&stmt.value);
                if !ty.is_string_coercible() {
                    self.report(Diagnostic::error(
                        Rule::TypeMismatch,
                        format!("log value must be a string, found {ty}"),
                        stmt.value.span(),
                    ));
                }
            }

            Statement::Goto(stmt) => {
                if !self.labels.contains(&stmt.destination.name) {
                    self.report(Diagnostic::error(
                        Rule::Undeclared,
                        format!("goto to undeclared label '{}'", stmt.destination.name),
                        stmt.destination.meta.span,
                    ));
                }
            }

            // Labels are collected up front; nothing to check here.
            Statement::GotoLabel(_) => {}
        }
    }

    /// Checks a `set` statement: target resolution, writability, and
    /// operator/type compatibility.
    fn check_set(&mut self, stmt: &SetStatement) {
        let value_type = self.check_expression(&stmt.value);
        let target_type = self.resolve_write_target(stmt);

        let Some(target_type) = target_type else {
            return; // target did not resolve; already reported
        };

        self.check_assignment_operator(stmt, target_type, value_type);
    }

    /// Resolves and validates a write target, reporting resolution problems.
    /// Returns the target's type when usable.
    fn resolve_write_target(&mut self, stmt: &SetStatement) -> Option<Type> {
        let name = &stmt.target.name;
        if name.starts_with("var.") {
            match self.context.lookup_local(name) {
                Some(local) => return Some(local.ty),
                None => {
                    self.report(Diagnostic::error(
                        Rule::Undeclared,
                        format!("undeclared variable '{name}'"),
                        stmt.target.meta.span,
                    ));
                    return None;
                }
            }
        }

        let Some(spec) = self.context.lookup_variable(name) else {
            self.report(Diagnostic::error(
                Rule::Undeclared,
                format!("undeclared variable '{name}'"),
                stmt.target.meta.span,
            ));
            return None;
        };
        let (ty, write) = (spec.ty, spec.write);

        if write.is_empty() {
            self.report(Diagnostic::error(
                Rule::InvalidAssignment,
                format!("variable '{name}' is read-only"),
                stmt.target.meta.span,
            ));
            return None;
        }
        if !write.intersects(self.scope) {
            self.report(Diagnostic::error(
                Rule::ScopeViolation,
                format!(
                    "variable '{name}' is not writable in {} scope (writable in: {write})",
                    self.scope
                ),
                stmt.target.meta.span,
            ));
            return None;
        }
        Some(ty)
    }

    /// Validates writability of an `add` target (already known to be a
    /// header).
    fn check_write_target(&mut self, target: &crate::ast::Ident) {
        let name = &target.name;
        let Some(spec) = self.context.lookup_variable(name) else {
            self.report(Diagnostic::error(
                Rule::Undeclared,
                format!("undeclared variable '{name}'"),
                target.meta.span,
            ));
            return;
        };
        let write = spec.write;
        if !write.intersects(self.scope) {
            self.report(Diagnostic::error(
                Rule::ScopeViolation,
                format!(
                    "variable '{name}' is not writable in {} scope (writable in: {write})",
                    self.scope
                ),
                target.meta.span,
            ));
        }
    }

    /// Checks operator-specific assignment compatibility.
    fn check_assignment_operator(&mut self, stmt: &SetStatement, target: Type, value: Type) {
        let name = &stmt.target.name;
        let operator = stmt.operator;
        let span = stmt.value.span();

        match operator {
            AssignmentOperator::Set => {
                if !compatible_assign(target, value) {
                    self.report(Diagnostic::error(
                        Rule::TypeMismatch,
                        format!("cannot assign {value} to '{name}' ({target})"),
                        span,
                    ));
                }
            }

            AssignmentOperator::Add | AssignmentOperator::Sub => {
                let string_append =
                    operator == AssignmentOperator::Add && target == Type::String;
                if string_append {
                    if !value.is_string_coercible() {
                        self.report(Diagnostic::error(
                            Rule::TypeMismatch,
                            format!("cannot append {value} to '{name}' (STRING)"),
                            span,
                        ));
                    }
                } else if is_additive(target) {
                    if !compatible_additive(target, value) {
                        self.report(Diagnostic::error(
                            Rule::TypeMismatch,
                            format!(
                                "operator '{operator}' cannot apply {value} to '{name}' ({target})"
                            ),
                            span,
                        ));
                    }
                } else {
                    self.report(Diagnostic::error(
                        Rule::InvalidAssignment,
                        format!(
                            "operator '{operator}' requires a numeric or string target, '{name}' is {target}"
                        ),
                        stmt.target.meta.span,
                    ));
                }
            }

            AssignmentOperator::Mul | AssignmentOperator::Div | AssignmentOperator::Mod => {
                if !target.is_numeric() {
                    self.report(Diagnostic::error(
                        Rule::InvalidAssignment,
                        format!(
                            "operator '{operator}' requires a numeric target, '{name}' is {target}"
                        ),
                        stmt.target.meta.span,
                    ));
                } else if !value.is_numeric() {
                    self.report(Diagnostic::error(
                        Rule::TypeMismatch,
                        format!("operator '{operator}' requires a numeric value, found {value}"),
                        span,
                    ));
                }
            }

            AssignmentOperator::BitOr
            | AssignmentOperator::BitAnd
            | AssignmentOperator::BitXor
            | AssignmentOperator::Shl
            | AssignmentOperator::Shr
            | AssignmentOperator::Rol
            | AssignmentOperator::Ror => {
                if !matches!(target, Type::Integer | Type::Any) {
                    self.report(Diagnostic::error(
                        Rule::InvalidAssignment,
                        format!(
                            "operator '{operator}' requires an INTEGER target, '{name}' is {target}"
                        ),
                        stmt.target.meta.span,
                    ));
                } else if !matches!(value, Type::Integer | Type::Any) {
                    self.report(Diagnostic::error(
                        Rule::TypeMismatch,
                        format!("operator '{operator}' requires an INTEGER value, found {value}"),
                        span,
                    ));
                }
            }

            AssignmentOperator::LogicalAnd | AssignmentOperator::LogicalOr => {
                if !matches!(target, Type::Bool | Type::Any) {
                    self.report(Diagnostic::error(
                        Rule::InvalidAssignment,
                        format!(
                            "operator '{operator}' requires a BOOL target, '{name}' is {target}"
                        ),
                        stmt.target.meta.span,
                    ));
                } else if !matches!(value, Type::Bool | Type::Any) {
                    self.report(Diagnostic::error(
                        Rule::TypeMismatch,
                        format!("operator '{operator}' requires a BOOL value, found {value}"),
                        span,
                    ));
                }
            }
        }
    }

    /// Reports when a statement kind is not legal in the active scope.
    fn check_statement_scope(
        &mut self,
        keyword: &str,
        allowed: ScopeSet,
        statement: &Statement,
    ) {
        if !allowed.intersects(self.scope) {
            self.report(Diagnostic::error(
                Rule::ScopeViolation,
                format!(
                    "statement '{keyword}' is not allowed in {} scope (allowed in: {allowed})",
                    self.scope
                ),
                statement.meta().span,
            ));
        }
    }

    /// Validates a return state name against the active scope.
    fn check_return_state(&mut self, state: &str, span: crate::source_analysis::Span) {
        match RETURN_STATES.iter().find(|(name, _)| *name == state) {
            None => self.report(Diagnostic::error(
                Rule::InvalidReturn,
                format!("unknown return state '{state}'"),
                span,
            )),
            Some((_, allowed)) => {
                if !allowed.intersects(self.scope) {
                    self.report(Diagnostic::error(
                        Rule::InvalidReturn,
                        format!(
                            "return state '{state}' is not valid in {} scope (valid in: {allowed})",
                            self.scope
                        ),
                        span,
                    ));
                }
            }
        }
    }
}

/// Collects every goto label declared anywhere in a subroutine body.
fn collect_labels(block: &Block) -> Vec<EcoString> {
    fn walk(block: &Block, labels: &mut Vec<EcoString>) {
        for statement in &block.statements {
            match statement {
                Statement::GotoLabel(label) => labels.push(label.name.clone()),
                Statement::If(stmt) => {
                    walk(&stmt.consequence, labels);
                    for clause in &stmt.alternatives {
                        walk(&clause.body, labels);
                    }
                    if let Some(alternative) = &stmt.alternative {
                        walk(alternative, labels);
                    }
                }
                _ => {}
            }
        }
    }
    let mut labels = Vec::new();
    walk(block, &mut labels);
    labels
}

/// Returns `true` if a type can sit in condition position. Header presence
/// checks (`if (req.http.A)`) make strings truthy.
const fn is_truthy(ty: Type) -> bool {
    matches!(ty, Type::Bool | Type::String | Type::Any)
}

/// Plain-assignment compatibility: exact type, either side unresolved, or a
/// string target absorbing anything string-coercible.
pub(crate) const fn compatible_assign(target: Type, value: Type) -> bool {
    if matches!(target, Type::Any) || matches!(value, Type::Any) {
        return true;
    }
    if target as u8 == value as u8 {
        return true;
    }
    matches!(target, Type::String) && value.is_string_coercible()
}

/// Types the additive compound operators accept as targets.
const fn is_additive(ty: Type) -> bool {
    matches!(
        ty,
        Type::Integer | Type::Float | Type::RTime | Type::Time | Type::Any
    )
}

/// Additive compatibility for `+=`/`-=` on non-string targets.
const fn compatible_additive(target: Type, value: Type) -> bool {
    match target {
        Type::Integer | Type::Float => value.is_numeric(),
        Type::RTime | Type::Time => matches!(value, Type::RTime | Type::Any),
        Type::Any => true,
        _ => false,
    }
}
