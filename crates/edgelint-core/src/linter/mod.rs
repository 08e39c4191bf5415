// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Semantic analysis for VCL: scope checking, type checking, and rule-based
//! diagnostics.
//!
//! [`lint`] walks a parsed [`SourceUnit`] against a [`Context`] and returns
//! every diagnostic it can find — unlike the parser, the linter never stops
//! at the first problem. The walk happens in two passes:
//!
//! 1. **Registration** — every top-level declaration is registered into the
//!    context first, so forward references between subroutines resolve and
//!    duplicates are diagnosed with the first occurrence winning.
//! 2. **Body analysis** — each declaration body is checked: statement
//!    legality against the active execution scope, identifier and call
//!    resolution, and expression typing.
//!
//! Inline directives in comments (`edgelint-ignore`,
//! `edgelint-ignore-next-line`, optionally followed by `: rule, rule`)
//! suppress matching diagnostics on the annotated node. In strict mode a
//! directive that suppressed nothing is itself reported.
//!
//! Diagnostic order is deterministic: stably sorted by source position
//! before returning.

mod expressions;
mod ignore;
mod statements;

use ecow::EcoString;
use tracing::debug;

use crate::ast::{Declaration, Meta, SourceUnit};
use crate::context::{Context, DuplicateDeclaration, Scope, ScopeSet, Type};
use crate::source_analysis::Span;

pub use ignore::Directive;

/// Diagnostic severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// A violation that makes the configuration invalid.
    Error,
    /// A likely mistake that does not invalidate the configuration.
    Warning,
    /// An advisory note.
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// The stable identifier of a lint rule.
///
/// Rule names are the vocabulary of suppression directives
/// (`edgelint-ignore: type-mismatch`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Reference to a name that is neither predefined nor declared.
    Undeclared,
    /// A name declared twice in the same registry.
    DuplicateDeclaration,
    /// Incompatible operand or assignment types.
    TypeMismatch,
    /// A variable, function, or statement used outside its legal scopes.
    ScopeViolation,
    /// A local variable declared but never read.
    UnusedLocal,
    /// An assignment to a read-only target or with an unsuitable operator.
    InvalidAssignment,
    /// A malformed declaration (bad local name, unknown type, bad mask).
    InvalidDeclaration,
    /// A return state unknown or not valid in the current scope.
    InvalidReturn,
    /// A function call that matches no accepted signature.
    SignatureMismatch,
    /// A regex capture group read before any match in the subroutine.
    UsedBeforeMatch,
    /// A call to a deprecated builtin.
    Deprecated,
    /// A builtin gated on a newer provider platform version.
    ProviderVersion,
    /// A suppression directive that suppressed nothing (strict mode).
    IneffectiveSuppression,
}

impl Rule {
    /// Returns the rule's stable kebab-case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Undeclared => "undeclared",
            Self::DuplicateDeclaration => "duplicate-declaration",
            Self::TypeMismatch => "type-mismatch",
            Self::ScopeViolation => "scope-violation",
            Self::UnusedLocal => "unused-local",
            Self::InvalidAssignment => "invalid-assignment",
            Self::InvalidDeclaration => "invalid-declaration",
            Self::InvalidReturn => "invalid-return",
            Self::SignatureMismatch => "signature-mismatch",
            Self::UsedBeforeMatch => "used-before-match",
            Self::Deprecated => "deprecated",
            Self::ProviderVersion => "provider-version",
            Self::IneffectiveSuppression => "ineffective-suppression",
        }
    }

    /// Resolves a rule from its kebab-case name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        const ALL: [Rule; 13] = [
            Rule::Undeclared,
            Rule::DuplicateDeclaration,
            Rule::TypeMismatch,
            Rule::ScopeViolation,
            Rule::UnusedLocal,
            Rule::InvalidAssignment,
            Rule::InvalidDeclaration,
            Rule::InvalidReturn,
            Rule::SignatureMismatch,
            Rule::UsedBeforeMatch,
            Rule::Deprecated,
            Rule::ProviderVersion,
            Rule::IneffectiveSuppression,
        ];
        ALL.into_iter().find(|rule| rule.name() == name)
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One reported finding, never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The severity of the finding.
    pub severity: Severity,
    /// The rule that produced the finding.
    pub rule: Rule,
    /// The human-readable message.
    pub message: EcoString,
    /// The source location.
    pub span: Span,
}

impl Diagnostic {
    /// Creates an error diagnostic.
    #[must_use]
    pub fn error(rule: Rule, message: impl Into<EcoString>, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            rule,
            message: message.into(),
            span,
        }
    }

    /// Creates a warning diagnostic.
    #[must_use]
    pub fn warning(rule: Rule, message: impl Into<EcoString>, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            rule,
            message: message.into(),
            span,
        }
    }

    /// Creates an info diagnostic.
    #[must_use]
    pub fn info(rule: Rule, message: impl Into<EcoString>, span: Span) -> Self {
        Self {
            severity: Severity::Info,
            rule,
            message: message.into(),
            span,
        }
    }
}

/// Lints a source unit against a context.
///
/// The context is enriched with the unit's top-level declarations (the
/// registration pass runs over the whole unit before any body analysis, so
/// forward references resolve). Passing the same context across several
/// calls accumulates declarations, which is how concatenated remote snippets
/// are checked as one pass.
///
/// The `strict` flag raises advisory checks (unused locals, ineffective
/// suppression directives) from silent to reported; it never changes
/// error-level checks.
#[must_use]
pub fn lint(unit: &SourceUnit, context: &mut Context, strict: bool) -> Vec<Diagnostic> {
    let mut linter = Linter {
        context,
        strict,
        diagnostics: Vec::new(),
        scope: Scope::Init.mask(),
        matched: false,
        labels: Vec::new(),
        seen_directives: std::collections::HashMap::new(),
    };

    linter.register_declarations(unit);
    for declaration in &unit.declarations {
        linter.with_suppressions(declaration.meta(), |linter| {
            linter.check_declaration(declaration);
        });
    }
    linter.report_ineffective_directives();

    let mut diagnostics = linter.diagnostics;
    diagnostics.sort_by_key(|d| (d.span.start(), d.span.end()));
    debug!(count = diagnostics.len(), "lint pass finished");
    diagnostics
}

/// The linter state for one pass.
pub(crate) struct Linter<'a> {
    /// The semantic model, enriched during the pass.
    pub(crate) context: &'a mut Context,
    /// Whether advisory checks are reported.
    pub(crate) strict: bool,
    /// Accumulated diagnostics.
    pub(crate) diagnostics: Vec<Diagnostic>,
    /// The active execution scopes (the enclosing subroutine's phases).
    pub(crate) scope: ScopeSet,
    /// Whether a regex match has occurred in the current subroutine.
    pub(crate) matched: bool,
    /// Goto labels declared in the current subroutine.
    pub(crate) labels: Vec<EcoString>,
    /// Every directive seen this pass, keyed by comment span, and whether
    /// it suppressed anything. Declaration directives are evaluated in both
    /// passes, so effectiveness is judged once at the end over the merged
    /// record.
    seen_directives: std::collections::HashMap<Span, bool>,
}

impl Linter<'_> {
    // ========================================================================
    // Pass 1: Declaration Registration
    // ========================================================================

    /// Registers every top-level declaration before any body is analyzed.
    fn register_declarations(&mut self, unit: &SourceUnit) {
        for declaration in &unit.declarations {
            self.with_suppressions(declaration.meta(), |linter| {
                linter.register_declaration(declaration);
            });
        }
    }

    fn register_declaration(&mut self, declaration: &Declaration) {
        let result = match declaration {
            Declaration::Subroutine(sub) => {
                let scopes = subroutine_scopes(&sub.name.name, &sub.meta);
                self.context
                    .declare_subroutine(&sub.name.name, sub.name.meta.span, scopes)
            }
            Declaration::Table(table) => {
                let value_type = match &table.value_type {
                    None => Type::String,
                    Some(name) => match Type::from_type_name(&name.name) {
                        Some(ty) => ty,
                        None => {
                            self.report(Diagnostic::error(
                                Rule::InvalidDeclaration,
                                format!("unknown table value type '{}'", name.name),
                                name.meta.span,
                            ));
                            Type::String
                        }
                    },
                };
                self.context
                    .declare_table(&table.name.name, table.name.meta.span, value_type)
            }
            Declaration::Acl(acl) => self.context.declare_acl(&acl.name.name, acl.name.meta.span),
            Declaration::Backend(backend) => self
                .context
                .declare_backend(&backend.name.name, backend.name.meta.span),
            Declaration::Director(director) => self
                .context
                .declare_director(&director.name.name, director.name.meta.span),
            Declaration::Import(_) | Declaration::Include(_) => Ok(()),
        };

        if let Err(duplicate) = result {
            let span = declaration
                .name()
                .map_or(declaration.meta().span, |name| name.meta.span);
            self.report_duplicate(&duplicate, span);
        }
    }

    /// Reports a duplicate-declaration condition at the second occurrence.
    pub(crate) fn report_duplicate(&mut self, duplicate: &DuplicateDeclaration, span: Span) {
        self.report(Diagnostic::error(
            Rule::DuplicateDeclaration,
            format!(
                "{} '{}' is already declared",
                duplicate.kind, duplicate.name
            ),
            span,
        ));
    }

    // ========================================================================
    // Reporting & Suppression
    // ========================================================================

    /// Appends a diagnostic.
    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Runs `f`, then drops any new diagnostics suppressed by directives in
    /// the node's comments. In strict mode, a directive that suppressed
    /// nothing is itself reported.
    pub(crate) fn with_suppressions(&mut self, meta: &Meta, f: impl FnOnce(&mut Self)) {
        let directives = ignore::directives_in(meta);
        if directives.is_empty() {
            f(self);
            return;
        }

        let before = self.diagnostics.len();
        f(self);

        for directive in &directives {
            self.seen_directives.entry(directive.span).or_insert(false);
        }

        let produced: Vec<Diagnostic> = self.diagnostics.split_off(before);
        for diagnostic in produced {
            match directives
                .iter()
                .position(|directive| directive.suppresses(diagnostic.rule))
            {
                Some(index) => {
                    self.seen_directives.insert(directives[index].span, true);
                }
                None => self.diagnostics.push(diagnostic),
            }
        }
    }

    /// Reports, in strict mode, every directive that suppressed nothing in
    /// either pass. Called once at the end of the lint pass.
    fn report_ineffective_directives(&mut self) {
        if !self.strict {
            return;
        }
        let unused: Vec<Span> = self
            .seen_directives
            .iter()
            .filter(|(_, used)| !**used)
            .map(|(span, _)| *span)
            .collect();
        for span in unused {
            self.report(Diagnostic::info(
                Rule::IneffectiveSuppression,
                "suppression directive matches no diagnostic",
                span,
            ));
        }
    }
}

/// Determines the phases a subroutine body is checked under.
///
/// Well-known `vcl_*` names carry their phase implicitly. Custom
/// subroutines may declare phases with a leading annotation comment
/// (`@recv`, or several: `@recv, @deliver`); unannotated custom
/// subroutines are checked under every request-handling phase.
fn subroutine_scopes(name: &str, meta: &Meta) -> ScopeSet {
    if let Some(scope) = Scope::from_subroutine_name(name) {
        return scope.mask();
    }

    let mut scopes = ScopeSet::NONE;
    for comment in &meta.leading {
        for word in comment
            .text
            .split([',', ' ', '\t'])
            .filter(|word| !word.is_empty())
        {
            if let Some(annotation) = word.strip_prefix('@') {
                if let Some(scope) = Scope::from_annotation(annotation) {
                    scopes = scopes.union(scope.mask());
                }
            }
        }
    }

    if scopes.is_empty() {
        ScopeSet::REQUEST
    } else {
        scopes
    }
}
