// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Token types for VCL lexical analysis.
//!
//! This module defines the token types produced by the lexer, including
//! comment trivia used later for inline lint directives.
//!
//! # Token Structure
//!
//! Each token consists of:
//! - A [`TokenKind`] indicating the type of token
//! - A [`Span`] indicating its location in source
//! - Leading and trailing [`Comment`]s queued by the scanner for the parser
//!   to attach to AST nodes
//!
//! # Assignment Operators
//!
//! Every compound assignment operator is its own token kind. The parser
//! recognises the assignment-operator set by exact kind membership (never by
//! inspecting literal text), and each kind maps one-to-one to its literal
//! form for error messages — see [`TokenKind::assignment_literal`].

use ecow::EcoString;

use super::Span;

/// The kind of token, not including source location or trivia.
///
/// This enum represents all syntactic elements that can appear in VCL
/// source code. Tokens are designed to be cheap to clone (using [`EcoString`]
/// for string data).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // === Literals ===
    /// An identifier: `req.http.Host`, `var.timeout`, `.port`
    Ident(EcoString),

    /// An integer literal: `42`, `750`
    Int(EcoString),

    /// A floating-point literal: `0.5`, `3.14`
    Float(EcoString),

    /// A string literal: `"hello"` or the verbatim form `{"multi line"}`
    ///
    /// The flag is `true` for the verbatim `{"..."}` form, which may span
    /// lines and carry percent-encoded bytes unchanged.
    String(EcoString, bool),

    /// A duration literal: `1s`, `2m`, `1.5h`, `100ms`, `3d`, `1y`
    RTime(EcoString),

    // === Keywords ===
    /// `acl`
    Acl,
    /// `backend`
    Backend,
    /// `director`
    Director,
    /// `table`
    Table,
    /// `sub`
    Sub,
    /// `import`
    Import,
    /// `include`
    Include,
    /// `if`
    If,
    /// `elsif` (also spelt `elseif` in source)
    Elsif,
    /// `else`
    Else,
    /// `set`
    Set,
    /// `unset` (also spelt `remove` in source)
    Unset,
    /// `add`
    Add,
    /// `call`
    Call,
    /// `declare`
    Declare,
    /// `return`
    Return,
    /// `error`
    ErrorKw,
    /// `restart`
    Restart,
    /// `synthetic`
    Synthetic,
    /// `synthetic.base64`
    SyntheticBase64,
    /// `log`
    Log,
    /// `goto`
    Goto,
    /// `true`
    True,
    /// `false`
    False,

    // === Assignment operators ===
    /// `=`
    Assign,
    /// `+=`
    Addition,
    /// `-=`
    Subtraction,
    /// `*=`
    Multiplication,
    /// `/=`
    Division,
    /// `%=`
    Remainder,
    /// `|=`
    BitwiseOrAssign,
    /// `&=`
    BitwiseAndAssign,
    /// `^=`
    BitwiseXorAssign,
    /// `<<=`
    LeftShiftAssign,
    /// `>>=`
    RightShiftAssign,
    /// `rol=`
    LeftRotateAssign,
    /// `ror=`
    RightRotateAssign,
    /// `&&=`
    LogicalAndAssign,
    /// `||=`
    LogicalOrAssign,

    // === Binary / unary operators ===
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `~` (regex or ACL match)
    Match,
    /// `!~`
    NotMatch,
    /// `<`
    LessThan,
    /// `>`
    GreaterThan,
    /// `<=`
    LessThanEqual,
    /// `>=`
    GreaterThanEqual,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `!`
    Not,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `|`
    Bar,
    /// `&`
    Amp,
    /// `^`
    Caret,
    /// `<<`
    LeftShift,
    /// `>>`
    RightShift,
    /// `rol`
    LeftRotate,
    /// `ror`
    RightRotate,

    // === Punctuation ===
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `;`
    Semicolon,
    /// `,`
    Comma,
    /// `:`
    Colon,

    // === Special ===
    /// End of file
    Eof,
}

impl TokenKind {
    /// Returns `true` if this token is a literal value.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(
            self,
            Self::Int(_) | Self::Float(_) | Self::String(..) | Self::RTime(_) | Self::True | Self::False
        )
    }

    /// Returns `true` if this token is an identifier.
    #[must_use]
    pub const fn is_identifier(&self) -> bool {
        matches!(self, Self::Ident(_))
    }

    /// Returns `true` if this token is a member of the assignment-operator
    /// set recognised by `set` statements.
    #[must_use]
    pub const fn is_assignment_operator(&self) -> bool {
        self.assignment_literal().is_some()
    }

    /// Maps an assignment-operator token kind to its augmented-assignment
    /// literal form, used verbatim in error messages.
    #[must_use]
    pub const fn assignment_literal(&self) -> Option<&'static str> {
        match self {
            Self::Assign => Some("="),
            Self::Addition => Some("+="),
            Self::Subtraction => Some("-="),
            Self::Multiplication => Some("*="),
            Self::Division => Some("/="),
            Self::Remainder => Some("%="),
            Self::BitwiseOrAssign => Some("|="),
            Self::BitwiseAndAssign => Some("&="),
            Self::BitwiseXorAssign => Some("^="),
            Self::LeftShiftAssign => Some("<<="),
            Self::RightShiftAssign => Some(">>="),
            Self::LeftRotateAssign => Some("rol="),
            Self::RightRotateAssign => Some("ror="),
            Self::LogicalAndAssign => Some("&&="),
            Self::LogicalOrAssign => Some("||="),
            _ => None,
        }
    }

    /// Returns `true` if this is the end-of-file marker.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }

    /// Returns the string content if this token carries one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Ident(s) | Self::Int(s) | Self::Float(s) | Self::String(s, _) | Self::RTime(s) => {
                Some(s)
            }
            _ => None,
        }
    }

    /// Looks up the keyword or word-operator for an identifier-shaped word.
    ///
    /// Returns `None` when the word is an ordinary identifier. `remove` is
    /// folded into [`TokenKind::Unset`] and `elseif` into [`TokenKind::Elsif`];
    /// the distinction is purely orthographic.
    #[must_use]
    pub fn keyword(word: &str) -> Option<Self> {
        let kind = match word {
            "acl" => Self::Acl,
            "backend" => Self::Backend,
            "director" => Self::Director,
            "table" => Self::Table,
            "sub" => Self::Sub,
            "import" => Self::Import,
            "include" => Self::Include,
            "if" => Self::If,
            "elsif" | "elseif" => Self::Elsif,
            "else" => Self::Else,
            "set" => Self::Set,
            "unset" | "remove" => Self::Unset,
            "add" => Self::Add,
            "call" => Self::Call,
            "declare" => Self::Declare,
            "return" => Self::Return,
            "error" => Self::ErrorKw,
            "restart" => Self::Restart,
            "synthetic" => Self::Synthetic,
            "synthetic.base64" => Self::SyntheticBase64,
            "log" => Self::Log,
            "goto" => Self::Goto,
            "true" => Self::True,
            "false" => Self::False,
            "rol" => Self::LeftRotate,
            "ror" => Self::RightRotate,
            "rol=" => Self::LeftRotateAssign,
            "ror=" => Self::RightRotateAssign,
            _ => return None,
        };
        Some(kind)
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ident(s) | Self::Int(s) | Self::Float(s) | Self::RTime(s) => write!(f, "{s}"),
            Self::String(s, false) => write!(f, "\"{s}\""),
            Self::String(s, true) => write!(f, "{{\"{s}\"}}"),
            Self::Acl => write!(f, "acl"),
            Self::Backend => write!(f, "backend"),
            Self::Director => write!(f, "director"),
            Self::Table => write!(f, "table"),
            Self::Sub => write!(f, "sub"),
            Self::Import => write!(f, "import"),
            Self::Include => write!(f, "include"),
            Self::If => write!(f, "if"),
            Self::Elsif => write!(f, "elsif"),
            Self::Else => write!(f, "else"),
            Self::Set => write!(f, "set"),
            Self::Unset => write!(f, "unset"),
            Self::Add => write!(f, "add"),
            Self::Call => write!(f, "call"),
            Self::Declare => write!(f, "declare"),
            Self::Return => write!(f, "return"),
            Self::ErrorKw => write!(f, "error"),
            Self::Restart => write!(f, "restart"),
            Self::Synthetic => write!(f, "synthetic"),
            Self::SyntheticBase64 => write!(f, "synthetic.base64"),
            Self::Log => write!(f, "log"),
            Self::Goto => write!(f, "goto"),
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
            Self::Equal => write!(f, "=="),
            Self::NotEqual => write!(f, "!="),
            Self::Match => write!(f, "~"),
            Self::NotMatch => write!(f, "!~"),
            Self::LessThan => write!(f, "<"),
            Self::GreaterThan => write!(f, ">"),
            Self::LessThanEqual => write!(f, "<="),
            Self::GreaterThanEqual => write!(f, ">="),
            Self::And => write!(f, "&&"),
            Self::Or => write!(f, "||"),
            Self::Not => write!(f, "!"),
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Star => write!(f, "*"),
            Self::Slash => write!(f, "/"),
            Self::Percent => write!(f, "%"),
            Self::Bar => write!(f, "|"),
            Self::Amp => write!(f, "&"),
            Self::Caret => write!(f, "^"),
            Self::LeftShift => write!(f, "<<"),
            Self::RightShift => write!(f, ">>"),
            Self::LeftRotate => write!(f, "rol"),
            Self::RightRotate => write!(f, "ror"),
            Self::LeftParen => write!(f, "("),
            Self::RightParen => write!(f, ")"),
            Self::LeftBrace => write!(f, "{{"),
            Self::RightBrace => write!(f, "}}"),
            Self::Semicolon => write!(f, ";"),
            Self::Comma => write!(f, ","),
            Self::Colon => write!(f, ":"),
            Self::Eof => write!(f, "<eof>"),
            _ => match self.assignment_literal() {
                Some(lit) => write!(f, "{lit}"),
                None => unreachable!("every token kind has a display form"),
            },
        }
    }
}

/// A comment captured by the scanner as trivia.
///
/// The text excludes the comment delimiters (`#`, `//`, `/* */`). Comments
/// are queued on the adjacent token and moved into AST node metadata by the
/// parser; a comment value is never shared between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Comment {
    /// The comment text without delimiters, trimmed.
    pub text: EcoString,
    /// Source location of the comment including delimiters.
    pub span: Span,
}

impl Comment {
    /// Creates a new comment.
    #[must_use]
    pub fn new(text: impl Into<EcoString>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }
}

/// A token with its source location and surrounding comment trivia.
///
/// Leading comments appeared before the token (on earlier lines or earlier
/// on the same line); trailing comments appeared after the token but before
/// the next newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    span: Span,
    leading: Vec<Comment>,
    trailing: Vec<Comment>,
}

impl Token {
    /// Creates a new token with no trivia.
    #[must_use]
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self {
            kind,
            span,
            leading: Vec::new(),
            trailing: Vec::new(),
        }
    }

    /// Creates a new token with comment trivia.
    #[must_use]
    pub fn with_comments(
        kind: TokenKind,
        span: Span,
        leading: Vec<Comment>,
        trailing: Vec<Comment>,
    ) -> Self {
        Self {
            kind,
            span,
            leading,
            trailing,
        }
    }

    /// Returns the kind of this token.
    #[must_use]
    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    /// Returns the source span of this token (excluding trivia).
    #[must_use]
    pub fn span(&self) -> Span {
        self.span
    }

    /// Returns the comments that precede this token.
    #[must_use]
    pub fn leading_comments(&self) -> &[Comment] {
        &self.leading
    }

    /// Returns the same-line comments that follow this token.
    #[must_use]
    pub fn trailing_comments(&self) -> &[Comment] {
        &self.trailing
    }

    /// Moves the leading comments out of this token.
    pub fn take_leading_comments(&mut self) -> Vec<Comment> {
        std::mem::take(&mut self.leading)
    }

    /// Moves the trailing comments out of this token.
    pub fn take_trailing_comments(&mut self) -> Vec<Comment> {
        std::mem::take(&mut self.trailing)
    }

    /// Returns `true` if the token's literal has the shape of a goto
    /// destination: splitting on `:` yields exactly two components, i.e. the
    /// literal carries a single trailing colon (`retry:`).
    ///
    /// This is a lexical-shape check on an ordinary identifier token, not a
    /// dedicated token kind; multi-colon literals are deliberately not
    /// recognised.
    #[must_use]
    pub fn is_goto_destination(&self) -> bool {
        match self.kind.as_str() {
            Some(literal) if self.kind.is_identifier() => {
                literal.split(':').count() == 2 && literal.ends_with(':')
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_kind_display() {
        assert_eq!(TokenKind::Ident("req.url".into()).to_string(), "req.url");
        assert_eq!(TokenKind::Int("42".into()).to_string(), "42");
        assert_eq!(TokenKind::String("x".into(), false).to_string(), "\"x\"");
        assert_eq!(TokenKind::String("x".into(), true).to_string(), "{\"x\"}");
        assert_eq!(TokenKind::RTime("30s".into()).to_string(), "30s");
        assert_eq!(TokenKind::Addition.to_string(), "+=");
        assert_eq!(TokenKind::LeftRotateAssign.to_string(), "rol=");
        assert_eq!(TokenKind::SyntheticBase64.to_string(), "synthetic.base64");
        assert_eq!(TokenKind::NotMatch.to_string(), "!~");
    }

    #[test]
    fn assignment_operator_membership() {
        // All fifteen compound assignment operators, by exact kind.
        let operators = [
            TokenKind::Assign,
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
        ];
        let literals = [
            "=", "+=", "-=", "*=", "/=", "%=", "|=", "&=", "^=", "<<=", ">>=", "rol=", "ror=",
            "&&=", "||=",
        ];
        for (op, literal) in operators.iter().zip(literals) {
            assert!(op.is_assignment_operator());
            assert_eq!(op.assignment_literal(), Some(literal));
        }
        assert!(!TokenKind::Equal.is_assignment_operator());
        assert!(!TokenKind::Match.is_assignment_operator());
    }

    #[test]
    fn keyword_lookup() {
        assert_eq!(TokenKind::keyword("sub"), Some(TokenKind::Sub));
        assert_eq!(TokenKind::keyword("elseif"), Some(TokenKind::Elsif));
        assert_eq!(TokenKind::keyword("remove"), Some(TokenKind::Unset));
        assert_eq!(
            TokenKind::keyword("synthetic.base64"),
            Some(TokenKind::SyntheticBase64)
        );
        assert_eq!(TokenKind::keyword("req.url"), None);
    }

    #[test]
    fn goto_destination_shape() {
        let label = Token::new(TokenKind::Ident("retry:".into()), Span::new(0, 6));
        assert!(label.is_goto_destination());

        // No colon, or more than one colon component boundary: not a label.
        let plain = Token::new(TokenKind::Ident("retry".into()), Span::new(0, 5));
        assert!(!plain.is_goto_destination());
        let multi = Token::new(TokenKind::Ident("a:b:".into()), Span::new(0, 4));
        assert!(!multi.is_goto_destination());
        let infix = Token::new(TokenKind::Ident("a:b".into()), Span::new(0, 3));
        assert!(!infix.is_goto_destination());
    }

    #[test]
    fn token_comment_moves() {
        let mut token = Token::with_comments(
            TokenKind::Semicolon,
            Span::new(10, 11),
            vec![Comment::new("leading", Span::new(0, 9))],
            vec![Comment::new("trailing", Span::new(12, 22))],
        );
        let leading = token.take_leading_comments();
        assert_eq!(leading.len(), 1);
        assert!(token.leading_comments().is_empty());
        let trailing = token.take_trailing_comments();
        assert_eq!(trailing[0].text, "trailing");
        assert!(token.trailing_comments().is_empty());
    }
}
