// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for the lexer.
//!
//! Two properties are checked over generated input:
//!
//! 1. **Determinism** — lexing the same text twice yields identical token and
//!    comment sequences.
//! 2. **Totality** — the lexer never panics: every input produces either a
//!    token sequence or a positioned [`LexError`](super::LexError).

use proptest::prelude::*;

use super::{lex, TokenKind};

/// Generates syntactically plausible VCL-ish fragments: words, literals,
/// operators, punctuation and comments joined by whitespace.
fn vcl_fragment() -> impl Strategy<Value = String> {
    let atom = prop_oneof![
        "[a-z][a-z0-9_.]{0,12}",
        "[0-9]{1,6}",
        "[0-9]{1,3}(ms|s|m|h|d|y)",
        "\"[a-zA-Z0-9 /._-]{0,16}\"",
        Just("==".to_owned()),
        Just("&&=".to_owned()),
        Just("<<=".to_owned()),
        Just("rol=".to_owned()),
        Just("!~".to_owned()),
        Just("{".to_owned()),
        Just("}".to_owned()),
        Just(";".to_owned()),
        Just("# a comment".to_owned()),
        Just("/* boxed */".to_owned()),
    ];
    prop::collection::vec(atom, 0..24).prop_map(|atoms| atoms.join(" "))
}

proptest! {
    #[test]
    fn lexing_is_deterministic(source in vcl_fragment()) {
        let first = lex(&source);
        let second = lex(&source);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn lexing_never_panics(source in "\\PC{0,64}") {
        // Arbitrary printable input: success or a positioned error, never a
        // panic. (The result itself is irrelevant here.)
        let _ = lex(&source);
    }

    #[test]
    fn successful_lex_ends_with_eof(source in vcl_fragment()) {
        if let Ok(tokens) = lex(&source) {
            prop_assert!(tokens.last().is_some_and(|t| t.kind().is_eof()));
            // Exactly one EOF token, always last.
            let eof_count = tokens
                .iter()
                .filter(|t| matches!(t.kind(), TokenKind::Eof))
                .count();
            prop_assert_eq!(eof_count, 1);
        }
    }

    #[test]
    fn token_spans_are_ordered(source in vcl_fragment()) {
        if let Ok(tokens) = lex(&source) {
            for pair in tokens.windows(2) {
                prop_assert!(pair[0].span().start() <= pair[1].span().start());
            }
        }
    }
}
