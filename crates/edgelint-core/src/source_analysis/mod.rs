// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical analysis infrastructure for VCL source code.
//!
//! This module contains the lexer and token definitions.
//!
//! # Lexical Analysis
//!
//! [`lex`] converts source text into a vector of [`Token`]s terminated by an
//! EOF token. Each token carries its source location via [`Span`] and any
//! adjacent [`Comment`] trivia, which the parser later moves onto AST nodes.
//!
//! ```
//! use edgelint_core::source_analysis::{lex, TokenKind};
//!
//! let tokens = lex("restart;").unwrap();
//! assert!(matches!(tokens[0].kind(), TokenKind::Restart));
//! ```
//!
//! # Error Handling
//!
//! Lexical errors are fatal to the pass: scanning stops at the first
//! unterminated literal, unterminated block comment, or unrecognised
//! character, and the caller receives a single [`LexError`] with the
//! offending position. See [`error`](self) for the error taxonomy.

mod error;
mod lexer;
mod span;
mod token;

#[cfg(test)]
mod lexer_property_tests;

pub use error::{LexError, LexErrorKind};
pub use lexer::lex;
pub use span::Span;
pub use token::{Comment, Token, TokenKind};
