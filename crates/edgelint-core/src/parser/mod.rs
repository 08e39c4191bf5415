// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Recursive descent parser for VCL source code.
//!
//! This parser builds an AST from a stream of tokens. Statements are parsed
//! by recursive descent — each statement keyword dispatches to a dedicated
//! rule — and expressions by precedence climbing (Pratt parsing) with a
//! declarative binding-power table.
//!
//! # Error Policy
//!
//! Syntax errors are **fatal**: parsing aborts at the first violation and the
//! caller receives one [`ParseError`] carrying the offending position and an
//! expected-vs-found description. No partial tree is produced and no recovery
//! is attempted. (The linter has the opposite policy — it collects every
//! diagnostic it can.)
//!
//! # Comment Redistribution
//!
//! The lexer queues comments on adjacent tokens; the parser moves them into
//! AST node [`Meta`] slots as structure is discovered:
//!
//! - a statement's keyword token contributes its leading comments,
//! - the terminating token (`;`, `}`) contributes same-line trailing comments,
//! - a comment on a block's opening line becomes the block's *infix* comment,
//!   not the leading comment of the first inner statement,
//! - comments before `}` that precede no statement also land in the block's
//!   infix slot.
//!
//! Comment sets are always moved between nodes, never copied.
//!
//! # Usage
//!
//! ```
//! use edgelint_core::source_analysis::lex;
//! use edgelint_core::parser::parse;
//!
//! let tokens = lex("sub vcl_recv { set req.http.X = \"1\"; }").unwrap();
//! let unit = parse(tokens).unwrap();
//! assert_eq!(unit.declarations.len(), 1);
//! ```

use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;

use crate::ast::SourceUnit;
use crate::source_analysis::{Span, Token, TokenKind};

mod declarations;
mod expressions;
mod statements;


/// Maximum nesting depth for expressions before the parser bails out.
///
/// Prevents stack overflow on deeply nested input (e.g., `(((((...)))))`).
const MAX_NESTING_DEPTH: usize = 64;

/// A syntax error.
///
/// Carries the offending position and an expected-vs-found description.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("syntax error: expected {expected}, found {found}")]
#[diagnostic(code(edgelint::parse))]
pub struct ParseError {
    /// What the parser expected at this position.
    pub expected: EcoString,
    /// The token actually found, rendered as source text.
    pub found: EcoString,
    /// The source location of the unexpected token.
    #[label("unexpected token")]
    pub span: Span,
}

impl ParseError {
    /// Creates an expected-vs-found error at the given token.
    #[must_use]
    pub fn unexpected(expected: impl Into<EcoString>, token: &Token) -> Self {
        Self {
            expected: expected.into(),
            found: token.kind().to_string().into(),
            span: token.span(),
        }
    }
}

/// Parses a token sequence into a [`SourceUnit`].
///
/// The token sequence must be terminated by an EOF token, as produced by
/// [`crate::source_analysis::lex`].
///
/// # Errors
///
/// Returns the first [`ParseError`] encountered; no partial tree is
/// returned.
pub fn parse(tokens: Vec<Token>) -> Result<SourceUnit, ParseError> {
    let mut parser = Parser::new(tokens);
    parser.parse_source_unit()
}

/// The parser state.
pub(crate) struct Parser {
    /// The tokens being parsed; always ends with an EOF token.
    tokens: Vec<Token>,
    /// Current token index.
    current: usize,
    /// Current expression nesting depth (guards against stack overflow).
    nesting_depth: usize,
}

impl Parser {
    /// Creates a new parser for the given tokens.
    fn new(tokens: Vec<Token>) -> Self {
        debug_assert!(
            tokens.last().is_some_and(|t| t.kind().is_eof()),
            "token stream must be EOF-terminated"
        );
        Self {
            tokens,
            current: 0,
            nesting_depth: 0,
        }
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    /// Returns the current token.
    pub(crate) fn current_token(&self) -> &Token {
        self.tokens
            .get(self.current)
            .or_else(|| self.tokens.last())
            .expect("parser has no tokens; expected at least an EOF token")
    }

    /// Returns the current token kind.
    pub(crate) fn current_kind(&self) -> &TokenKind {
        self.current_token().kind()
    }

    /// Peeks at the next token kind.
    pub(crate) fn peek_kind(&self) -> Option<&TokenKind> {
        self.tokens.get(self.current + 1).map(Token::kind)
    }

    /// Checks if we're at the end of input.
    pub(crate) fn is_at_end(&self) -> bool {
        self.current_kind().is_eof()
    }

    /// Advances to the next token and returns the consumed one.
    ///
    /// The returned token is owned, so its comment trivia can be moved into
    /// AST metadata without cloning.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.current_token().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    /// Checks if the current token matches the given kind (by discriminant,
    /// so payload-carrying kinds match any payload).
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    /// Consumes the current token if it matches the given kind.
    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    /// Expects the current token to match the given kind, advancing if it
    /// does; fails the parse otherwise.
    pub(crate) fn expect(
        &mut self,
        kind: &TokenKind,
        expected: &'static str,
    ) -> Result<Token, ParseError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(ParseError::unexpected(expected, self.current_token()))
        }
    }

    // ========================================================================
    // Nesting Guard
    // ========================================================================

    /// Enters one level of expression nesting.
    pub(crate) fn enter_nesting(&mut self) -> Result<(), ParseError> {
        self.nesting_depth += 1;
        if self.nesting_depth > MAX_NESTING_DEPTH {
            return Err(ParseError {
                expected: "a less deeply nested expression".into(),
                found: self.current_kind().to_string().into(),
                span: self.current_token().span(),
            });
        }
        Ok(())
    }

    /// Leaves one level of expression nesting.
    pub(crate) fn leave_nesting(&mut self) {
        self.nesting_depth -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Declaration, Statement};
    use crate::source_analysis::lex;

    fn parse_source(source: &str) -> SourceUnit {
        parse(lex(source).unwrap()).unwrap()
    }

    #[test]
    fn parse_empty_source() {
        let unit = parse_source("");
        assert!(unit.declarations.is_empty());
    }

    #[test]
    fn parse_error_is_fatal_and_describes_expectation() {
        let err = parse(lex("sub vcl_recv { set ; }").unwrap()).unwrap_err();
        assert!(err.expected.contains("identifier"), "got: {err}");
        assert_eq!(err.found, ";");
    }

    #[test]
    fn top_level_garbage_is_a_syntax_error() {
        let err = parse(lex("restart;").unwrap()).unwrap_err();
        assert!(err.expected.contains("declaration"), "got: {err}");
    }

    #[test]
    fn same_line_trailing_comment_stays_with_statement() {
        let unit = parse_source(
            "sub vcl_recv {\n  set req.http.A = \"1\"; # same line\n  restart;\n}",
        );
        let Declaration::Subroutine(sub) = &unit.declarations[0] else {
            panic!("expected subroutine");
        };
        let Statement::Set(set) = &sub.body.statements[0] else {
            panic!("expected set");
        };
        assert_eq!(set.meta.trailing.len(), 1);
        assert_eq!(set.meta.trailing[0].text, "same line");
        // The next statement gained nothing.
        assert!(sub.body.statements[1].meta().leading.is_empty());
    }

    #[test]
    fn own_line_comment_leads_next_statement() {
        let unit = parse_source(
            "sub vcl_recv {\n  set req.http.A = \"1\";\n  # own line\n  restart;\n}",
        );
        let Declaration::Subroutine(sub) = &unit.declarations[0] else {
            panic!("expected subroutine");
        };
        assert!(sub.body.statements[0].meta().trailing.is_empty());
        let restart = &sub.body.statements[1];
        assert_eq!(restart.meta().leading.len(), 1);
        assert_eq!(restart.meta().leading[0].text, "own line");
    }

    #[test]
    fn block_opening_line_comment_is_infix() {
        let unit = parse_source("sub vcl_recv { # header note\n  restart;\n}");
        let Declaration::Subroutine(sub) = &unit.declarations[0] else {
            panic!("expected subroutine");
        };
        assert_eq!(sub.body.meta.infix.len(), 1);
        assert_eq!(sub.body.meta.infix[0].text, "header note");
        assert!(sub.body.statements[0].meta().leading.is_empty());
    }

    #[test]
    fn comment_before_closing_brace_is_infix() {
        let unit = parse_source("sub vcl_recv {\n  restart;\n  # dangling\n}");
        let Declaration::Subroutine(sub) = &unit.declarations[0] else {
            panic!("expected subroutine");
        };
        assert_eq!(sub.body.meta.infix.len(), 1);
        assert_eq!(sub.body.meta.infix[0].text, "dangling");
    }

    #[test]
    fn declaration_leading_comments_attach() {
        let unit = parse_source("# phase annotation\nsub custom_check { restart; }");
        let decl = &unit.declarations[0];
        assert_eq!(decl.meta().leading.len(), 1);
        assert_eq!(decl.meta().leading[0].text, "phase annotation");
    }
}
