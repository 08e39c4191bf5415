// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Beautiful diagnostics using miette.
//!
//! Converts edgelint-core diagnostics into miette-formatted reports with:
//! - Source code context with an arrow pointing at the finding
//! - The rule name as the span label
//! - File name attribution for multi-file runs

// Suppress unused_assignments for struct fields used by derive macros
#![allow(unused_assignments)]

use edgelint_core::{Diagnostic as CoreDiagnostic, Severity};
use miette::{Diagnostic, SourceSpan};

/// One lint finding with rich formatting.
#[derive(Debug, Diagnostic, thiserror::Error)]
#[error("{severity}: {message}")]
#[diagnostic(code(edgelint::lint))]
pub struct ReportDiagnostic {
    /// Error, warning, or info.
    pub severity: Severity,
    /// Human-readable message from the linter.
    pub message: String,
    /// Source code for context.
    #[source_code]
    pub src: miette::NamedSource<String>,
    /// Location of the finding.
    #[label("{label}")]
    pub span: SourceSpan,
    /// The rule name, shown at the span (interpolated by the derive macro).
    pub label: String,
}

impl ReportDiagnostic {
    /// Builds a report from a core diagnostic.
    pub fn from_core(diagnostic: &CoreDiagnostic, source_path: &str, source: &str) -> Self {
        Self {
            severity: diagnostic.severity,
            message: diagnostic.message.to_string(),
            src: miette::NamedSource::new(source_path, source.to_string()),
            span: diagnostic.span.into(),
            label: diagnostic.rule.name().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgelint_core::{Rule, Severity};
    use edgelint_core::source_analysis::Span;

    #[test]
    fn from_core_preserves_fields() {
        let core = CoreDiagnostic::error(
            Rule::TypeMismatch,
            "operator '+' cannot combine INTEGER and STRING",
            Span::new(10, 17),
        );
        let source = "set req.http.X = 1 + \"a\";";
        let report = ReportDiagnostic::from_core(&core, "main.vcl", source);

        assert_eq!(report.severity, Severity::Error);
        assert!(report.message.contains("INTEGER"));
        assert_eq!(report.span.offset(), 10);
        assert_eq!(report.span.len(), 7);
        assert_eq!(report.label, "type-mismatch");
    }

    #[test]
    fn zero_length_span_is_preserved() {
        let core = CoreDiagnostic::warning(Rule::UnusedLocal, "unused", Span::new(5, 5));
        let report = ReportDiagnostic::from_core(&core, "main.vcl", "sub x {}");
        assert_eq!(report.span.offset(), 5);
        assert_eq!(report.span.len(), 0);
    }
}
