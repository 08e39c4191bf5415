// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Expression checking.
//!
//! Every expression resolves to exactly one [`Type`]. When a sub-expression
//! fails to resolve, it yields [`Type::Any`] — compatible with everything —
//! so one mistake is reported once rather than cascading.

use crate::ast::{Expression, FunctionCall, Ident, InfixExpression, InfixOperator, PrefixOperator};
use crate::context::{ExtraBehavior, Type};

use super::{Diagnostic, Linter, Rule};

impl Linter<'_> {
    /// Checks an expression and returns its resolved type.
    pub(crate) fn check_expression(&mut self, expression: &Expression) -> Type {
        match expression {
            Expression::Ident(ident) => self.check_ident_read(ident),
            Expression::String(_) => Type::String,
            Expression::Integer(_) => Type::Integer,
            Expression::Float(_) => Type::Float,
            Expression::Bool(_) => Type::Bool,
            Expression::RTime(_) => Type::RTime,

            Expression::Prefix(prefix) => {
                let operand = self.check_expression(&prefix.right);
                match prefix.operator {
                    PrefixOperator::Not => {
                        if !matches!(operand, Type::Bool | Type::String | Type::Any) {
                            self.report(Diagnostic::error(
                                Rule::TypeMismatch,
                                format!("operator '!' requires BOOL, found {operand}"),
                                prefix.right.span(),
                            ));
                        }
                        Type::Bool
                    }
                    PrefixOperator::Neg => {
                        if matches!(
                            operand,
                            Type::Integer | Type::Float | Type::RTime | Type::Any
                        ) {
                            operand
                        } else {
                            self.report(Diagnostic::error(
                                Rule::TypeMismatch,
                                format!("operator '-' requires a numeric operand, found {operand}"),
                                prefix.right.span(),
                            ));
                            Type::Any
                        }
                    }
                }
            }

            Expression::Infix(infix) => self.check_infix(infix),
            Expression::Call(call) => self.check_call(call),

            Expression::Concat(concat) => {
                for part in &concat.parts {
                    let ty = self.check_expression(part);
                    if !ty.is_string_coercible() {
                        self.report(Diagnostic::error(
                            Rule::TypeMismatch,
                            format!("{ty} value cannot be concatenated into a string"),
                            part.span(),
                        ));
                    }
                }
                Type::String
            }

            Expression::Group(group) => self.check_expression(&group.inner),
        }
    }

    /// Resolves an identifier read: local variables, regex capture groups,
    /// predefined variables, then declared names.
    fn check_ident_read(&mut self, ident: &Ident) -> Type {
        let name = &ident.name;

        if name.starts_with("var.") {
            if let Some(local) = self.context.lookup_local(name) {
                let ty = local.ty;
                self.context.mark_local_read(name);
                return ty;
            }
            self.report(Diagnostic::error(
                Rule::Undeclared,
                format!("undeclared variable '{name}'"),
                ident.meta.span,
            ));
            return Type::Any;
        }

        if let Some(spec) = self.context.lookup_variable(name) {
            let (ty, read) = (spec.ty, spec.read);

            // Capture groups reset at each match context; reading one
            // before any match in this subroutine observes only the reset
            // value.
            if name.starts_with("re.group.") && !self.matched {
                self.report(Diagnostic::warning(
                    Rule::UsedBeforeMatch,
                    format!(
                        "'{name}' is read before any regex match; capture groups reset at each match context"
                    ),
                    ident.meta.span,
                ));
            }

            if !read.intersects(self.scope) {
                self.report(Diagnostic::error(
                    Rule::ScopeViolation,
                    format!(
                        "variable '{name}' is not readable in {} scope (readable in: {read})",
                        self.scope
                    ),
                    ident.meta.span,
                ));
            }
            return ty;
        }

        if self.context.has_backend(name) || self.context.has_director(name) {
            return Type::Backend;
        }
        if self.context.has_acl(name) {
            return Type::Acl;
        }
        if self.context.table(name).is_some() {
            return Type::Table;
        }

        self.report(Diagnostic::error(
            Rule::Undeclared,
            format!("undeclared variable '{name}'"),
            ident.meta.span,
        ));
        Type::Any
    }

    /// Checks a binary operation through the per-operator compatibility
    /// table.
    fn check_infix(&mut self, infix: &InfixExpression) -> Type {
        let left = self.check_expression(&infix.left);
        // Both operands are checked before any match context opens, so a
        // capture group inside the pattern itself still counts as
        // before-match.
        let right = self.check_expression(&infix.right);

        let operator = infix.operator;
        let span = infix.meta.span;
        let mismatch = |linter: &mut Self, left: Type, right: Type| {
            linter.report(Diagnostic::error(
                Rule::TypeMismatch,
                format!("operator '{operator}' cannot combine {left} and {right}"),
                span,
            ));
        };

        match operator {
            InfixOperator::Or | InfixOperator::And => {
                let truthy =
                    |ty: Type| matches!(ty, Type::Bool | Type::String | Type::Any);
                if !truthy(left) || !truthy(right) {
                    mismatch(self, left, right);
                }
                Type::Bool
            }

            InfixOperator::Eq | InfixOperator::Ne => {
                if !comparable(left, right) {
                    mismatch(self, left, right);
                }
                Type::Bool
            }

            InfixOperator::Lt | InfixOperator::Gt | InfixOperator::Le | InfixOperator::Ge => {
                if !ordered(left, right) {
                    mismatch(self, left, right);
                }
                Type::Bool
            }

            InfixOperator::Match | InfixOperator::NotMatch => {
                if right == Type::Acl {
                    // ACL membership test: subject must be an address.
                    if !matches!(left, Type::Ip | Type::String | Type::Any) {
                        mismatch(self, left, right);
                    }
                } else {
                    // Regex match: string subject against a string pattern.
                    if !left.is_string_coercible() || !matches!(right, Type::String | Type::Any)
                    {
                        mismatch(self, left, right);
                    }
                    self.matched = true;
                }
                Type::Bool
            }

            InfixOperator::BitOr
            | InfixOperator::BitAnd
            | InfixOperator::BitXor
            | InfixOperator::Shl
            | InfixOperator::Shr
            | InfixOperator::Rol
            | InfixOperator::Ror => {
                if !matches!(left, Type::Integer | Type::Any)
                    || !matches!(right, Type::Integer | Type::Any)
                {
                    mismatch(self, left, right);
                    return Type::Any;
                }
                Type::Integer
            }

            InfixOperator::Add | InfixOperator::Sub => match (left, right) {
                (Type::Any, other) | (other, Type::Any) => other,
                (Type::Integer, Type::Integer) => Type::Integer,
                (Type::Float, Type::Float)
                | (Type::Float, Type::Integer)
                | (Type::Integer, Type::Float) => Type::Float,
                (Type::RTime, Type::RTime) => Type::RTime,
                (Type::Time, Type::RTime) => Type::Time,
                _ => {
                    mismatch(self, left, right);
                    Type::Any
                }
            },

            InfixOperator::Mul | InfixOperator::Div => match (left, right) {
                (Type::Any, other) | (other, Type::Any) => other,
                (Type::Integer, Type::Integer) => Type::Integer,
                (Type::Float, Type::Float)
                | (Type::Float, Type::Integer)
                | (Type::Integer, Type::Float) => Type::Float,
                _ => {
                    mismatch(self, left, right);
                    Type::Any
                }
            },

            InfixOperator::Mod => {
                if !matches!(left, Type::Integer | Type::Any)
                    || !matches!(right, Type::Integer | Type::Any)
                {
                    mismatch(self, left, right);
                    return Type::Any;
                }
                Type::Integer
            }
        }
    }

    /// Checks a function call: resolution, scope, extras, arity, and
    /// per-position argument types.
    fn check_call(&mut self, call: &FunctionCall) -> Type {
        let name = &call.function.name;
        let Some(spec) = self.context.lookup_function(name).cloned() else {
            self.report(Diagnostic::error(
                Rule::Undeclared,
                format!("undeclared function '{name}'"),
                call.function.meta.span,
            ));
            for argument in &call.arguments {
                self.check_expression(argument);
            }
            return Type::Any;
        };

        if !spec.scopes.intersects(self.scope) {
            self.report(Diagnostic::error(
                Rule::ScopeViolation,
                format!(
                    "function '{name}' is not callable in {} scope (callable in: {})",
                    self.scope, spec.scopes
                ),
                call.function.meta.span,
            ));
        }

        match spec.extra {
            Some(ExtraBehavior::DeprecationNotice(notice)) => {
                self.report(Diagnostic::warning(
                    Rule::Deprecated,
                    format!("'{name}' is deprecated: {notice}"),
                    call.function.meta.span,
                ));
            }
            Some(ExtraBehavior::ProviderVersionGate { min_version }) => {
                self.report(Diagnostic::info(
                    Rule::ProviderVersion,
                    format!("'{name}' requires provider platform version {min_version} or newer"),
                    call.function.meta.span,
                ));
            }
            None => {}
        }

        if call.arguments.len() != spec.arguments.len() {
            self.report(Diagnostic::error(
                Rule::SignatureMismatch,
                format!(
                    "'{name}' expects {} argument(s), found {} (expected {})",
                    spec.arguments.len(),
                    call.arguments.len(),
                    spec.signature(name)
                ),
                call.meta.span,
            ));
            for argument in &call.arguments {
                self.check_expression(argument);
            }
            return spec.ret;
        }

        for (position, (argument, alternatives)) in call
            .arguments
            .iter()
            .zip(spec.arguments.iter().copied())
            .enumerate()
        {
            self.check_argument(name, &spec, position, argument, alternatives);
        }

        spec.ret
    }

    /// Checks one argument position against its accepted type alternatives.
    ///
    /// When a position accepts a reference type (TABLE, ACL, BACKEND), a
    /// bare identifier argument resolves against the matching declaration
    /// registry instead of the variable table.
    fn check_argument(
        &mut self,
        name: &str,
        spec: &crate::context::BuiltinFunction,
        position: usize,
        argument: &Expression,
        alternatives: &[Type],
    ) {
        if let Expression::Ident(ident) = argument {
            let resolved = alternatives.iter().any(|expected| match expected {
                Type::Table => self.context.table(&ident.name).is_some(),
                Type::Acl => self.context.has_acl(&ident.name),
                Type::Backend => {
                    self.context.has_backend(&ident.name) || self.context.has_director(&ident.name)
                }
                Type::Id => true,
                _ => false,
            });
            if resolved {
                return;
            }
            // Not a declared reference; fall through to ordinary checking
            // unless only reference types are accepted.
            if alternatives
                .iter()
                .all(|ty| matches!(ty, Type::Table | Type::Acl | Type::Backend | Type::Id))
            {
                self.report(Diagnostic::error(
                    Rule::SignatureMismatch,
                    format!(
                        "argument {} of '{name}' expects a declared {}, '{}' is not declared (expected {})",
                        position + 1,
                        alternatives_text(alternatives),
                        ident.name,
                        spec.signature(name)
                    ),
                    ident.meta.span,
                ));
                return;
            }
        }

        let found = self.check_expression(argument);
        let accepted = alternatives.iter().any(|expected| {
            matches!(found, Type::Any)
                || *expected == found
                || (*expected == Type::String && found.is_string_coercible())
        });
        if !accepted {
            self.report(Diagnostic::error(
                Rule::SignatureMismatch,
                format!(
                    "argument {} of '{name}' expects {}, found {found} (expected {})",
                    position + 1,
                    alternatives_text(alternatives),
                    spec.signature(name)
                ),
                argument.span(),
            ));
        }
    }
}

/// Renders accepted alternatives for a diagnostic: `STRING|INTEGER`.
fn alternatives_text(alternatives: &[Type]) -> String {
    alternatives
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("|")
}

/// Equality comparability: equal types, unresolved, or a numeric pair.
fn comparable(left: Type, right: Type) -> bool {
    left == Type::Any || right == Type::Any || left == right || (left.is_numeric() && right.is_numeric())
}

/// Ordering comparability: numeric pair, or the same ordered type.
fn ordered(left: Type, right: Type) -> bool {
    if left == Type::Any || right == Type::Any {
        return true;
    }
    if left.is_numeric() && right.is_numeric() {
        return true;
    }
    left == right && matches!(left, Type::RTime | Type::Time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;
    use crate::linter::{lint, Severity};
    use crate::parser::parse;
    use crate::source_analysis::lex;

    fn lint_source(source: &str, strict: bool) -> Vec<Diagnostic> {
        let unit = parse(lex(source).unwrap()).unwrap();
        let mut context = Context::new();
        lint(&unit, &mut context, strict)
    }

    #[test]
    fn deliver_only_variable_read_in_recv_scope() {
        let diagnostics = lint_source(
            "sub vcl_recv {\n  set req.http.X-Status = resp.status;\n}",
            false,
        );
        assert_eq!(diagnostics.len(), 1);
        let diagnostic = &diagnostics[0];
        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.rule, Rule::ScopeViolation);
        // Names the variable and both scopes.
        assert!(diagnostic.message.contains("resp.status"));
        assert!(diagnostic.message.contains("recv"));
        assert!(diagnostic.message.contains("deliver"));
    }

    #[test]
    fn arithmetic_requires_numeric_operands() {
        let diagnostics = lint_source(
            "sub vcl_recv {\n  set req.http.X = \"a\" * 2;\n}",
            false,
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].rule, Rule::TypeMismatch);
        assert!(diagnostics[0].message.contains('*'));
    }

    #[test]
    fn concat_accepts_coercible_rejects_bool() {
        let clean = lint_source(
            "sub vcl_recv {\n  set req.http.X = \"t=\" req.restarts \" u=\" req.url;\n}",
            false,
        );
        assert_eq!(clean, vec![]);

        let wrong = lint_source(
            "sub vcl_recv {\n  set req.http.X = \"flag=\" true;\n}",
            false,
        );
        assert_eq!(wrong.len(), 1);
        assert_eq!(wrong[0].rule, Rule::TypeMismatch);
        assert!(wrong[0].message.contains("BOOL"));
    }

    #[test]
    fn undeclared_identifier_is_error() {
        let diagnostics = lint_source(
            "sub vcl_recv {\n  set req.http.X = req.nonsense;\n}",
            false,
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Error);
        assert_eq!(diagnostics[0].rule, Rule::Undeclared);
        assert!(diagnostics[0].message.contains("req.nonsense"));
    }

    #[test]
    fn acl_match_accepts_ip_subject() {
        let diagnostics = lint_source(
            "acl internal {\n  \"10.0.0.0\"/8;\n}\nsub vcl_recv {\n  if (client.ip ~ internal) {\n    return(pass);\n  }\n}",
            false,
        );
        assert_eq!(diagnostics, vec![]);
    }

    #[test]
    fn regex_match_flags_numeric_subject() {
        let diagnostics = lint_source(
            "sub vcl_recv {\n  if (req.restarts ~ \"a\") {\n    return(pass);\n  }\n}",
            false,
        );
        // INTEGER is string-coercible, so a numeric subject is tolerated.
        assert_eq!(diagnostics, vec![]);

        let wrong = lint_source(
            "sub vcl_recv {\n  if (true ~ \"a\") {\n    return(pass);\n  }\n}",
            false,
        );
        assert_eq!(wrong.len(), 1);
        assert_eq!(wrong[0].rule, Rule::TypeMismatch);
    }

    #[test]
    fn capture_group_before_match_warns() {
        let diagnostics = lint_source(
            "sub vcl_recv {\n  set req.http.G = re.group.3;\n}",
            false,
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert_eq!(diagnostics[0].rule, Rule::UsedBeforeMatch);
        assert!(diagnostics[0].message.contains("re.group.3"));
    }

    #[test]
    fn capture_group_after_match_resolves_as_integer() {
        let diagnostics = lint_source(
            "sub vcl_recv {\n  if (req.url ~ \"^/(v[0-9]+)/\") {\n    declare local var.version INTEGER;\n    set var.version = re.group.1;\n    log var.version;\n  }\n}",
            true,
        );
        assert_eq!(diagnostics, vec![]);
    }

    #[test]
    fn unknown_function_is_undeclared() {
        let diagnostics = lint_source(
            "sub vcl_recv {\n  set req.http.X = std.nope(\"a\");\n}",
            false,
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].rule, Rule::Undeclared);
        assert!(diagnostics[0].message.contains("std.nope"));
    }

    #[test]
    fn arity_mismatch_names_expected_signature() {
        let diagnostics = lint_source(
            "sub vcl_recv {\n  set req.http.X = std.tolower(req.url, \"extra\");\n}",
            false,
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].rule, Rule::SignatureMismatch);
        assert!(
            diagnostics[0]
                .message
                .contains("std.tolower(STRING) -> STRING"),
            "message should carry the closest signature: {}",
            diagnostics[0].message
        );
    }

    #[test]
    fn argument_type_mismatch_is_reported_per_position() {
        let diagnostics = lint_source(
            "sub vcl_recv {\n  set req.http.X = math.floor(req.url);\n}",
            false,
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].rule, Rule::SignatureMismatch);
        assert!(diagnostics[0].message.contains("argument 1"));
        assert!(diagnostics[0].message.contains("FLOAT"));
    }

    #[test]
    fn table_reference_argument_resolves_via_registry() {
        let diagnostics = lint_source(
            "table redirects {\n  \"/old\": \"/new\",\n}\nsub vcl_recv {\n  set req.http.Location = table.lookup(redirects, req.url, \"/\");\n}",
            false,
        );
        assert_eq!(diagnostics, vec![]);

        let missing = lint_source(
            "sub vcl_recv {\n  set req.http.Location = table.lookup(no_table, req.url, \"/\");\n}",
            false,
        );
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].rule, Rule::SignatureMismatch);
        assert!(missing[0].message.contains("no_table"));
    }

    #[test]
    fn deprecated_builtin_warns_and_gated_builtin_informs() {
        let diagnostics = lint_source(
            "sub vcl_recv {\n  set req.http.H = digest.hash_md5(req.url);\n  set req.http.P = h2.push(\"/style.css\");\n}",
            false,
        );
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].rule, Rule::Deprecated);
        assert_eq!(diagnostics[0].severity, Severity::Warning);
        assert_eq!(diagnostics[1].rule, Rule::ProviderVersion);
        assert_eq!(diagnostics[1].severity, Severity::Info);
    }

    #[test]
    fn user_subroutine_usable_as_function() {
        let diagnostics = lint_source(
            "# @recv\nsub classify {\n  set req.http.Class = \"a\";\n}\nsub vcl_recv {\n  set req.http.X = classify();\n}",
            false,
        );
        assert_eq!(diagnostics, vec![]);
    }
}
