// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Lexical analysis for VCL source code.
//!
//! This module converts source text into a stream of [`Token`]s. The lexer
//! is hand-written for maximum control over comment handling and spans.
//!
//! # Design Principles
//!
//! - **Fatal errors**: an unterminated string or block comment, or an
//!   unrecognised character, stops the scan and fails the whole pass.
//! - **Comment trivia**: `#`, `//` and `/* */` comments are never emitted as
//!   tokens; they are queued and attached to the adjacent token (leading, or
//!   trailing when on the same line) for the parser to distribute onto AST
//!   nodes.
//! - **Precise spans**: every token carries its exact source location.
//! - **Determinism**: lexing the same text twice yields identical sequences.
//!
//! # Example
//!
//! ```
//! use edgelint_core::source_analysis::{lex, TokenKind};
//!
//! let tokens = lex("set req.http.Host = \"example.com\";").unwrap();
//! assert!(matches!(tokens[0].kind(), TokenKind::Set));
//! assert!(tokens.last().unwrap().kind().is_eof());
//! ```

use std::iter::Peekable;
use std::str::CharIndices;

use ecow::EcoString;

use super::{Comment, LexError, LexErrorKind, Span, Token, TokenKind};

/// Duration-literal unit suffixes, longest first so `ms` wins over `m`.
const RTIME_UNITS: [&str; 6] = ["ms", "s", "m", "h", "d", "y"];

/// Tokenizes VCL source text.
///
/// Returns the full token sequence terminated by a single
/// [`TokenKind::Eof`] token, or the first lexical error. Comments that
/// follow the last real token end up as leading trivia of the EOF token.
///
/// # Errors
///
/// Returns a [`LexError`] for an unterminated string literal or block
/// comment, an invalid number literal, or an unrecognised character. No
/// recovery is attempted.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind().is_eof();
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

/// The scanner state.
struct Lexer<'src> {
    /// The source text being lexed.
    source: &'src str,
    /// Character iterator with byte positions.
    chars: Peekable<CharIndices<'src>>,
    /// Current byte position in source.
    position: usize,
    /// Comments waiting to be attached to the next token.
    pending: Vec<Comment>,
}

impl<'src> Lexer<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            position: 0,
            pending: Vec::new(),
        }
    }

    /// Peeks at the next character without consuming it.
    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    /// Peeks `n+1` characters ahead without consuming.
    fn peek_char_n(&self, n: usize) -> Option<char> {
        let mut iter = self.chars.clone();
        for _ in 0..n {
            iter.next();
        }
        iter.next().map(|(_, c)| c)
    }

    /// Consumes the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let (pos, c) = self.chars.next()?;
        self.position = pos + c.len_utf8();
        Some(c)
    }

    /// Consumes characters while the predicate is true.
    fn advance_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek_char().is_some_and(&predicate) {
            self.advance();
        }
    }

    /// Returns the current byte position.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "source files over 4GB are not supported"
    )]
    fn current_position(&self) -> u32 {
        self.position as u32
    }

    /// Creates a span from start to current position.
    fn span_from(&self, start: u32) -> Span {
        Span::new(start, self.current_position())
    }

    /// Extracts source text for a span.
    fn text_for(&self, span: Span) -> &'src str {
        &self.source[span.as_range()]
    }

    /// Lexes the next token, attaching pending leading comments and any
    /// same-line trailing comments.
    fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia()?;
        let leading = std::mem::take(&mut self.pending);

        let start = self.current_position();
        let kind = match self.peek_char() {
            None => TokenKind::Eof,
            Some(c) => self.lex_token_kind(c, start)?,
        };
        let span = self.span_from(start);

        self.collect_trailing_trivia()?;
        let trailing = std::mem::take(&mut self.pending);

        Ok(Token::with_comments(kind, span, leading, trailing))
    }

    /// Skips whitespace and collects comments as pending trivia.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek_char() {
                Some(' ' | '\t' | '\r' | '\n') => {
                    self.advance_while(|c| matches!(c, ' ' | '\t' | '\r' | '\n'));
                }
                Some('#') => self.lex_line_comment(1),
                Some('/') if self.peek_char_n(1) == Some('/') => self.lex_line_comment(2),
                Some('/') if self.peek_char_n(1) == Some('*') => self.lex_block_comment()?,
                _ => return Ok(()),
            }
        }
    }

    /// Collects same-line trailing comments after a token, stopping at the
    /// first newline. A comment on the same line as a statement belongs to
    /// that statement, not to the next one.
    fn collect_trailing_trivia(&mut self) -> Result<(), LexError> {
        loop {
            match self.peek_char() {
                Some(' ' | '\t') => {
                    self.advance_while(|c| matches!(c, ' ' | '\t'));
                }
                Some('#') => self.lex_line_comment(1),
                Some('/') if self.peek_char_n(1) == Some('/') => self.lex_line_comment(2),
                Some('/') if self.peek_char_n(1) == Some('*') => {
                    // Same-line block comment; a newline inside it still ends
                    // the trailing position for anything that follows.
                    let had_newline = self.lex_block_comment_tracking_newline()?;
                    if had_newline {
                        return Ok(());
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// Lexes a line comment (`#` or `//`), storing the text without its
    /// marker.
    fn lex_line_comment(&mut self, marker_len: usize) {
        let start = self.current_position();
        for _ in 0..marker_len {
            self.advance();
        }
        let text_start = self.current_position();
        self.advance_while(|c| c != '\n');
        let text = self.text_for(self.span_from(text_start)).trim();
        self.pending
            .push(Comment::new(text, self.span_from(start)));
    }

    /// Lexes a block comment `/* ... */`.
    fn lex_block_comment(&mut self) -> Result<(), LexError> {
        self.lex_block_comment_tracking_newline().map(|_| ())
    }

    /// Lexes a block comment, reporting whether it spanned a newline.
    fn lex_block_comment_tracking_newline(&mut self) -> Result<bool, LexError> {
        let start = self.current_position();
        self.advance(); // /
        self.advance(); // *
        let text_start = self.current_position();
        let mut had_newline = false;

        loop {
            match self.peek_char() {
                None => return Err(LexError::unterminated_comment(self.span_from(start))),
                Some('*') if self.peek_char_n(1) == Some('/') => {
                    let text_end = self.current_position();
                    self.advance(); // *
                    self.advance(); // /
                    let text = self.source[text_start as usize..text_end as usize].trim();
                    self.pending
                        .push(Comment::new(text, self.span_from(start)));
                    return Ok(had_newline);
                }
                Some(c) => {
                    had_newline |= c == '\n';
                    self.advance();
                }
            }
        }
    }

    /// Lexes a token kind based on the first character.
    fn lex_token_kind(&mut self, c: char, start: u32) -> Result<TokenKind, LexError> {
        let kind = match c {
            'a'..='z' | 'A'..='Z' | '_' | '.' => self.lex_word(start),
            '0'..='9' => self.lex_number(start)?,
            '"' => self.lex_string(start)?,
            '{' if self.peek_char_n(1) == Some('"') => self.lex_verbatim_string(start)?,

            '(' => self.single(TokenKind::LeftParen),
            ')' => self.single(TokenKind::RightParen),
            '{' => self.single(TokenKind::LeftBrace),
            '}' => self.single(TokenKind::RightBrace),
            ';' => self.single(TokenKind::Semicolon),
            ',' => self.single(TokenKind::Comma),
            ':' => self.single(TokenKind::Colon),
            '~' => self.single(TokenKind::Match),

            '=' => self.one_or_two('=', TokenKind::Equal, TokenKind::Assign),
            '+' => self.one_or_two('=', TokenKind::Addition, TokenKind::Plus),
            '-' => self.one_or_two('=', TokenKind::Subtraction, TokenKind::Minus),
            '*' => self.one_or_two('=', TokenKind::Multiplication, TokenKind::Star),
            '/' => self.one_or_two('=', TokenKind::Division, TokenKind::Slash),
            '%' => self.one_or_two('=', TokenKind::Remainder, TokenKind::Percent),
            '^' => self.one_or_two('=', TokenKind::BitwiseXorAssign, TokenKind::Caret),

            '!' => {
                self.advance();
                match self.peek_char() {
                    Some('~') => self.single(TokenKind::NotMatch),
                    Some('=') => self.single(TokenKind::NotEqual),
                    _ => TokenKind::Not,
                }
            }
            '&' => {
                self.advance();
                match self.peek_char() {
                    Some('&') => {
                        self.advance();
                        if self.peek_char() == Some('=') {
                            self.single(TokenKind::LogicalAndAssign)
                        } else {
                            TokenKind::And
                        }
                    }
                    Some('=') => self.single(TokenKind::BitwiseAndAssign),
                    _ => TokenKind::Amp,
                }
            }
            '|' => {
                self.advance();
                match self.peek_char() {
                    Some('|') => {
                        self.advance();
                        if self.peek_char() == Some('=') {
                            self.single(TokenKind::LogicalOrAssign)
                        } else {
                            TokenKind::Or
                        }
                    }
                    Some('=') => self.single(TokenKind::BitwiseOrAssign),
                    _ => TokenKind::Bar,
                }
            }
            '<' => {
                self.advance();
                match self.peek_char() {
                    Some('<') => {
                        self.advance();
                        if self.peek_char() == Some('=') {
                            self.single(TokenKind::LeftShiftAssign)
                        } else {
                            TokenKind::LeftShift
                        }
                    }
                    Some('=') => self.single(TokenKind::LessThanEqual),
                    _ => TokenKind::LessThan,
                }
            }
            '>' => {
                self.advance();
                match self.peek_char() {
                    Some('>') => {
                        self.advance();
                        if self.peek_char() == Some('=') {
                            self.single(TokenKind::RightShiftAssign)
                        } else {
                            TokenKind::RightShift
                        }
                    }
                    Some('=') => self.single(TokenKind::GreaterThanEqual),
                    _ => TokenKind::GreaterThan,
                }
            }

            other => {
                self.advance();
                return Err(LexError::unexpected_char(other, self.span_from(start)));
            }
        };
        Ok(kind)
    }

    /// Consumes one character and returns the given kind.
    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    /// Consumes one character; if the next is `second`, consumes it too and
    /// returns the two-character kind, otherwise the one-character kind.
    fn one_or_two(&mut self, second: char, two: TokenKind, one: TokenKind) -> TokenKind {
        self.advance();
        if self.peek_char() == Some(second) {
            self.advance();
            two
        } else {
            one
        }
    }

    /// Lexes an identifier, keyword, or word operator (`rol`, `ror`).
    ///
    /// Identifier characters include `.` (dotted variables, header names,
    /// `.host`-style properties), `-` (header names), and `:` (goto labels,
    /// checked for shape by the parser).
    fn lex_word(&mut self, start: u32) -> TokenKind {
        self.advance_while(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ':')
        });
        let word = self.text_for(self.span_from(start));

        // `rol=` / `ror=` are single assignment-operator tokens.
        if (word == "rol" || word == "ror") && self.peek_char() == Some('=') {
            self.advance();
            return if word == "rol" {
                TokenKind::LeftRotateAssign
            } else {
                TokenKind::RightRotateAssign
            };
        }

        TokenKind::keyword(word).unwrap_or_else(|| TokenKind::Ident(EcoString::from(word)))
    }

    /// Lexes an integer, float, or duration literal.
    fn lex_number(&mut self, start: u32) -> Result<TokenKind, LexError> {
        self.advance_while(|c| c.is_ascii_digit());
        let mut is_float = false;
        if self.peek_char() == Some('.') && self.peek_char_n(1).is_some_and(|c| c.is_ascii_digit())
        {
            is_float = true;
            self.advance(); // .
            self.advance_while(|c| c.is_ascii_digit());
        }

        // Duration suffix turns the literal into an RTIME value.
        if self.peek_char().is_some_and(|c| c.is_ascii_alphabetic()) {
            let unit_start = self.current_position();
            self.advance_while(|c| c.is_ascii_alphanumeric());
            let unit = self.text_for(self.span_from(unit_start));
            if RTIME_UNITS.contains(&unit) {
                let literal = self.text_for(self.span_from(start));
                return Ok(TokenKind::RTime(EcoString::from(literal)));
            }
            let literal = self.text_for(self.span_from(start));
            return Err(LexError::new(
                LexErrorKind::InvalidNumber(EcoString::from(literal)),
                self.span_from(start),
            ));
        }

        let literal = EcoString::from(self.text_for(self.span_from(start)));
        Ok(if is_float {
            TokenKind::Float(literal)
        } else {
            TokenKind::Int(literal)
        })
    }

    /// Lexes a short string literal: `"..."` — may not span lines.
    fn lex_string(&mut self, start: u32) -> Result<TokenKind, LexError> {
        self.advance(); // opening quote
        let content_start = self.current_position();
        loop {
            match self.peek_char() {
                None | Some('\n') => {
                    return Err(LexError::unterminated_string(self.span_from(start)));
                }
                Some('"') => {
                    let content = self.source
                        [content_start as usize..self.current_position() as usize]
                        .to_owned();
                    self.advance(); // closing quote
                    return Ok(TokenKind::String(EcoString::from(content), false));
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Lexes a verbatim string literal: `{"..."}` — may span lines and carry
    /// percent-encoded bytes unchanged.
    fn lex_verbatim_string(&mut self, start: u32) -> Result<TokenKind, LexError> {
        self.advance(); // {
        self.advance(); // "
        let content_start = self.current_position();
        loop {
            match self.peek_char() {
                None => return Err(LexError::unterminated_string(self.span_from(start))),
                Some('"') if self.peek_char_n(1) == Some('}') => {
                    let content = self.source
                        [content_start as usize..self.current_position() as usize]
                        .to_owned();
                    self.advance(); // "
                    self.advance(); // }
                    return Ok(TokenKind::String(EcoString::from(content), true));
                }
                _ => {
                    self.advance();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind().clone())
            .collect()
    }

    #[test]
    fn lex_set_statement() {
        assert_eq!(
            kinds("set req.http.Host = \"example.com\";"),
            vec![
                TokenKind::Set,
                TokenKind::Ident("req.http.Host".into()),
                TokenKind::Assign,
                TokenKind::String("example.com".into(), false),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_compound_assignment_operators() {
        assert_eq!(
            kinds("+= -= *= /= %= |= &= ^= <<= >>= rol= ror= &&= ||="),
            vec![
                TokenKind::Addition,
                TokenKind::Subtraction,
                TokenKind::Multiplication,
                TokenKind::Division,
                TokenKind::Remainder,
                TokenKind::BitwiseOrAssign,
                TokenKind::BitwiseAndAssign,
                TokenKind::BitwiseXorAssign,
                TokenKind::LeftShiftAssign,
                TokenKind::RightShiftAssign,
                TokenKind::LeftRotateAssign,
                TokenKind::RightRotateAssign,
                TokenKind::LogicalAndAssign,
                TokenKind::LogicalOrAssign,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_comparison_and_logic() {
        assert_eq!(
            kinds("== != ~ !~ < > <= >= && || !"),
            vec![
                TokenKind::Equal,
                TokenKind::NotEqual,
                TokenKind::Match,
                TokenKind::NotMatch,
                TokenKind::LessThan,
                TokenKind::GreaterThan,
                TokenKind::LessThanEqual,
                TokenKind::GreaterThanEqual,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::Not,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_durations() {
        assert_eq!(
            kinds("1s 2m 1.5h 100ms 3d 1y"),
            vec![
                TokenKind::RTime("1s".into()),
                TokenKind::RTime("2m".into()),
                TokenKind::RTime("1.5h".into()),
                TokenKind::RTime("100ms".into()),
                TokenKind::RTime("3d".into()),
                TokenKind::RTime("1y".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_numbers() {
        assert_eq!(
            kinds("42 0.5"),
            vec![
                TokenKind::Int("42".into()),
                TokenKind::Float("0.5".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn invalid_number_suffix_is_fatal() {
        let err = lex("set req.http.X = 10q;").unwrap_err();
        assert!(matches!(err.kind, LexErrorKind::InvalidNumber(_)));
    }

    #[test]
    fn lex_verbatim_string_spans_lines() {
        let tokens = lex("synthetic {\"line one\nline two %22quoted%22\"};").unwrap();
        assert_eq!(
            *tokens[1].kind(),
            TokenKind::String("line one\nline two %22quoted%22".into(), true)
        );
    }

    #[test]
    fn short_string_may_not_span_lines() {
        let err = lex("set req.http.X = \"broken\n\";").unwrap_err();
        assert!(matches!(err.kind, LexErrorKind::UnterminatedString));
    }

    #[test]
    fn unterminated_block_comment_is_fatal() {
        let err = lex("sub vcl_recv { /* no end").unwrap_err();
        assert!(matches!(err.kind, LexErrorKind::UnterminatedComment));
    }

    #[test]
    fn unexpected_character_is_fatal() {
        let err = lex("sub § {}").unwrap_err();
        assert!(matches!(err.kind, LexErrorKind::UnexpectedCharacter('§')));
    }

    #[test]
    fn line_comment_attaches_as_leading() {
        let tokens = lex("# scope note\nsub vcl_recv {}").unwrap();
        let sub = &tokens[0];
        assert!(matches!(sub.kind(), TokenKind::Sub));
        assert_eq!(sub.leading_comments().len(), 1);
        assert_eq!(sub.leading_comments()[0].text, "scope note");
    }

    #[test]
    fn same_line_comment_attaches_as_trailing() {
        let tokens = lex("restart; # try again\nreturn;").unwrap();
        // `;` after restart carries the same-line comment as trailing trivia.
        let semicolon = &tokens[1];
        assert!(matches!(semicolon.kind(), TokenKind::Semicolon));
        assert_eq!(semicolon.trailing_comments().len(), 1);
        assert_eq!(semicolon.trailing_comments()[0].text, "try again");
        // The next statement's keyword has no leading comments.
        assert!(tokens[2].leading_comments().is_empty());
    }

    #[test]
    fn own_line_comment_attaches_to_next_token() {
        let tokens = lex("restart;\n# next step\nreturn;").unwrap();
        let return_kw = &tokens[2];
        assert!(matches!(return_kw.kind(), TokenKind::Return));
        assert_eq!(return_kw.leading_comments().len(), 1);
        assert_eq!(return_kw.leading_comments()[0].text, "next step");
    }

    #[test]
    fn block_comment_text_is_trimmed() {
        let tokens = lex("/* annotation */ sub vcl_recv {}").unwrap();
        assert_eq!(tokens[0].leading_comments()[0].text, "annotation");
    }

    #[test]
    fn trailing_file_comments_attach_to_eof() {
        let tokens = lex("restart;\n# done\n").unwrap();
        let eof = tokens.last().unwrap();
        assert!(eof.kind().is_eof());
        assert_eq!(eof.leading_comments().len(), 1);
    }

    #[test]
    fn goto_label_lexes_with_colon() {
        let tokens = lex("goto retry; retry:").unwrap();
        assert_eq!(*tokens[1].kind(), TokenKind::Ident("retry".into()));
        assert_eq!(*tokens[3].kind(), TokenKind::Ident("retry:".into()));
        assert!(tokens[3].is_goto_destination());
    }

    #[test]
    fn lexing_is_deterministic() {
        let source = "sub vcl_recv { # a\n set req.http.X = 1 + 2; /* b */ }";
        assert_eq!(lex(source).unwrap(), lex(source).unwrap());
    }

    #[test]
    fn dotted_property_identifiers() {
        assert_eq!(
            kinds("backend origin { .host = \"o.example\"; }"),
            vec![
                TokenKind::Backend,
                TokenKind::Ident("origin".into()),
                TokenKind::LeftBrace,
                TokenKind::Ident(".host".into()),
                TokenKind::Assign,
                TokenKind::String("o.example".into(), false),
                TokenKind::Semicolon,
                TokenKind::RightBrace,
                TokenKind::Eof,
            ]
        );
    }
}
