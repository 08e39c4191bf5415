// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! edgelint core: a static analyzer for the VCL edge configuration
//! language.
//!
//! This crate contains the analysis pipeline:
//! - Lexical analysis (tokenization with comment trivia)
//! - Parsing (AST construction)
//! - Semantic analysis (scope checking, type checking, diagnostics)
//!
//! Data flows one direction: text → tokens → AST → (AST, [`Context`]) →
//! diagnostics. Nothing is executed; the analyzer validates, it does not
//! run.
//!
//! # Example
//!
//! ```
//! use edgelint_core::{check_source, Context};
//!
//! let mut context = Context::new();
//! let diagnostics = check_source(
//!     "sub vcl_recv { set req.http.X-Trace = \"1\"; }",
//!     &mut context,
//!     false,
//! )
//! .unwrap();
//! assert!(diagnostics.is_empty());
//! ```

pub mod ast;
pub mod context;
pub mod linter;
pub mod parser;
pub mod source_analysis;
pub mod unparse;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

pub use context::Context;
pub use linter::{Diagnostic, Rule, Severity};

/// A fatal analysis failure: the source could not be turned into an AST.
///
/// Semantic findings are *not* errors in this sense — they come back as the
/// [`Diagnostic`] list. This type covers the "could not parse" half of the
/// contract, which aborts the pass for the file.
#[derive(Debug, Clone, Error, MietteDiagnostic)]
pub enum SourceError {
    /// The scanner hit a malformed token.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] source_analysis::LexError),

    /// The token stream violates the grammar.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] parser::ParseError),
}

/// Lexes, parses, and lints one source text in a single call.
///
/// The context accumulates declarations across calls, so concatenated
/// snippets can be checked as one combined pass by threading the same
/// context through.
///
/// # Errors
///
/// Returns a [`SourceError`] when the text cannot be lexed or parsed; the
/// linter is never reached in that case.
pub fn check_source(
    source: &str,
    context: &mut Context,
    strict: bool,
) -> Result<Vec<Diagnostic>, SourceError> {
    let tokens = source_analysis::lex(source)?;
    let unit = parser::parse(tokens)?;
    Ok(linter::lint(&unit, context, strict))
}
