// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Abstract Syntax Tree (AST) definitions for VCL.
//!
//! The AST represents the structure of a configuration after parsing.
//! Every node carries a [`Meta`] bundle: its [`Span`] plus three comment
//! slots (leading, trailing, infix) used later for inline lint directives.
//!
//! # Design Philosophy
//!
//! - **Closed variant sets** - [`Declaration`], [`Statement`] and
//!   [`Expression`] are tagged unions with one constructor per kind, so the
//!   parser and linter match exhaustively and adding a node kind is a
//!   compile-time visible event.
//! - **Owned trees** - every node owns its `Meta` and children outright; no
//!   node is shared between two parents. Comment reassignment during parsing
//!   is a move between sibling `Meta`s, never a copy.
//! - **Syntax only** - type names in `declare` and `table` forms are kept as
//!   identifiers; resolution to semantic types happens in the linter.
//!
//! # Example
//!
//! ```ignore
//! // Source: set req.http.X = "a" "b";
//! Statement::Set(SetStatement {
//!     target: Ident { name: "req.http.X", .. },
//!     operator: AssignmentOperator::Set,
//!     value: Expression::Concat(ConcatExpression {
//!         parts: vec![Expression::String(..), Expression::String(..)],
//!         ..
//!     }),
//!     meta: Meta { .. },
//! })
//! ```

use ecow::EcoString;

use crate::source_analysis::{Comment, Span};

/// Per-node bundle of source position and comment-attachment slots.
///
/// Invariant: a [`Comment`] value lives in exactly one slot of exactly one
/// node. The parser moves comments between sibling nodes (e.g. a comment
/// trailing one statement may become the leading comment of the next), it
/// never duplicates them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Meta {
    /// Source location of the node.
    pub span: Span,
    /// Comments on lines before the node.
    pub leading: Vec<Comment>,
    /// Same-line comments after the node.
    pub trailing: Vec<Comment>,
    /// Comments inside the node's header or body that belong to no child
    /// (e.g. the comment after `{` on a block's opening line).
    pub infix: Vec<Comment>,
}

impl Meta {
    /// Creates a new comment-free `Meta` for the given span.
    #[must_use]
    pub fn new(span: Span) -> Self {
        Self {
            span,
            leading: Vec::new(),
            trailing: Vec::new(),
            infix: Vec::new(),
        }
    }

    /// Moves this node's leading comments into `other`'s trailing slot.
    ///
    /// Used when a comment lexically attached to the start of one node
    /// turns out to belong to the end of the previous one.
    pub fn swap_leading_to_trailing(&mut self, other: &mut Self) {
        other.trailing.append(&mut self.leading);
    }

    /// Moves this node's leading comments into `other`'s infix slot.
    ///
    /// Used for comments on a block's opening line, which belong to the
    /// block header rather than the first inner statement.
    pub fn swap_leading_to_infix(&mut self, other: &mut Self) {
        other.infix.append(&mut self.leading);
    }
}

/// An identifier: a variable, header, subroutine, or dotted function name.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    /// The name as written in source.
    pub name: EcoString,
    /// Node metadata.
    pub meta: Meta,
}

impl Ident {
    /// Creates a new identifier.
    #[must_use]
    pub fn new(name: impl Into<EcoString>, meta: Meta) -> Self {
        Self {
            name: name.into(),
            meta,
        }
    }
}

/// Top-level container for one analysis pass: a sequence of declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceUnit {
    /// The top-level declarations, in source order.
    pub declarations: Vec<Declaration>,
    /// Node metadata; `trailing` holds comments after the last declaration.
    pub meta: Meta,
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    /// A scoped subroutine: `sub vcl_recv { ... }`
    Subroutine(SubroutineDecl),
    /// A key-value table: `table redirects { "a": "b", }`
    Table(TableDecl),
    /// An access control list: `acl internal { "10.0.0.0"/8; }`
    Acl(AclDecl),
    /// An origin server: `backend origin { .host = "..."; }`
    Backend(BackendDecl),
    /// A routing director: `director pool random { { .backend = b; } }`
    Director(DirectorDecl),
    /// A module import: `import boltsort;`
    Import(ImportDecl),
    /// A source include: `include "other.vcl";`
    Include(IncludeDecl),
}

impl Declaration {
    /// Returns the declared name, where one exists (`include` has none).
    #[must_use]
    pub fn name(&self) -> Option<&Ident> {
        match self {
            Self::Subroutine(d) => Some(&d.name),
            Self::Table(d) => Some(&d.name),
            Self::Acl(d) => Some(&d.name),
            Self::Backend(d) => Some(&d.name),
            Self::Director(d) => Some(&d.name),
            Self::Import(d) => Some(&d.module),
            Self::Include(_) => None,
        }
    }

    /// Returns the node metadata.
    #[must_use]
    pub fn meta(&self) -> &Meta {
        match self {
            Self::Subroutine(d) => &d.meta,
            Self::Table(d) => &d.meta,
            Self::Acl(d) => &d.meta,
            Self::Backend(d) => &d.meta,
            Self::Director(d) => &d.meta,
            Self::Import(d) => &d.meta,
            Self::Include(d) => &d.meta,
        }
    }

    /// Returns the node metadata mutably (comment redistribution).
    pub fn meta_mut(&mut self) -> &mut Meta {
        match self {
            Self::Subroutine(d) => &mut d.meta,
            Self::Table(d) => &mut d.meta,
            Self::Acl(d) => &mut d.meta,
            Self::Backend(d) => &mut d.meta,
            Self::Director(d) => &mut d.meta,
            Self::Import(d) => &mut d.meta,
            Self::Include(d) => &mut d.meta,
        }
    }
}

/// A scoped subroutine declaration.
///
/// The execution phase comes from the well-known `vcl_*` name, or for
/// custom subroutines from a leading `@phase` annotation comment.
#[derive(Debug, Clone, PartialEq)]
pub struct SubroutineDecl {
    /// The subroutine name.
    pub name: Ident,
    /// The subroutine body.
    pub body: Block,
    /// Node metadata.
    pub meta: Meta,
}

/// A key-value table declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDecl {
    /// The table name.
    pub name: Ident,
    /// Optional value type name (`table t INTEGER { ... }`); `STRING` when
    /// absent.
    pub value_type: Option<Ident>,
    /// The table entries.
    pub entries: Vec<TableEntry>,
    /// Node metadata.
    pub meta: Meta,
}

/// One `"key": value` entry in a table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableEntry {
    /// The entry key.
    pub key: StringLit,
    /// The entry value.
    pub value: Expression,
    /// Node metadata.
    pub meta: Meta,
}

/// An access control list declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct AclDecl {
    /// The ACL name.
    pub name: Ident,
    /// The ACL entries.
    pub entries: Vec<AclEntry>,
    /// Node metadata.
    pub meta: Meta,
}

/// One address entry in an ACL: `!"192.0.2.0"/24;`
#[derive(Debug, Clone, PartialEq)]
pub struct AclEntry {
    /// Whether the entry is negated (`!`).
    pub negated: bool,
    /// The address, as written.
    pub address: StringLit,
    /// Optional subnet mask bits.
    pub mask: Option<IntegerLit>,
    /// Node metadata.
    pub meta: Meta,
}

/// An origin server declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendDecl {
    /// The backend name.
    pub name: Ident,
    /// The backend properties (`.host`, `.port`, nested `.probe`).
    pub properties: Vec<BackendProperty>,
    /// Node metadata.
    pub meta: Meta,
}

/// One `.name = value;` property inside a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendProperty {
    /// The property name, including the leading dot.
    pub name: Ident,
    /// The property value.
    pub value: BackendValue,
    /// Node metadata.
    pub meta: Meta,
}

/// A backend property value: an expression, or a nested property block
/// (`.probe = { .request = ...; }`).
#[derive(Debug, Clone, PartialEq)]
pub enum BackendValue {
    /// A plain expression value.
    Expression(Expression),
    /// A nested property block.
    Block(Vec<BackendProperty>, Meta),
}

/// A routing director declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectorDecl {
    /// The director name.
    pub name: Ident,
    /// The balancing policy (`random`, `hash`, `client`, `fallback`).
    pub policy: Ident,
    /// Director-level properties (`.quorum = 50%;`).
    pub properties: Vec<DirectorProperty>,
    /// Member backends.
    pub backends: Vec<DirectorBackend>,
    /// Node metadata.
    pub meta: Meta,
}

/// One `.name = value;` property at director level or inside a member.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectorProperty {
    /// The property name, including the leading dot.
    pub name: Ident,
    /// The property value.
    pub value: Expression,
    /// Whether the value carried a `%` suffix (`.quorum = 50%;`).
    pub percent: bool,
    /// Node metadata.
    pub meta: Meta,
}

/// One `{ .backend = name; .weight = 1; }` member of a director.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectorBackend {
    /// The member properties.
    pub properties: Vec<DirectorProperty>,
    /// Node metadata.
    pub meta: Meta,
}

/// A module import declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    /// The imported module name.
    pub module: Ident,
    /// Node metadata.
    pub meta: Meta,
}

/// A source include declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct IncludeDecl {
    /// The included path.
    pub path: StringLit,
    /// Node metadata.
    pub meta: Meta,
}

/// A brace-delimited sequence of statements.
///
/// `meta.infix` carries the comment on the block's opening line (after `{`)
/// and any comments before `}` that precede no statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// The statements in source order.
    pub statements: Vec<Statement>,
    /// Node metadata.
    pub meta: Meta,
}

/// A statement inside a subroutine body.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `if (cond) { } elsif (cond) { } else { }`
    If(IfStatement),
    /// `set target OP value;`
    Set(SetStatement),
    /// `unset target;`
    Unset(UnsetStatement),
    /// `add target = value;`
    Add(AddStatement),
    /// `call subroutine;`
    Call(CallStatement),
    /// `declare local var.name TYPE;`
    Declare(DeclareStatement),
    /// `return;` or `return(state);`
    Return(ReturnStatement),
    /// `error code response;`
    Error(ErrorStatement),
    /// `restart;`
    Restart(RestartStatement),
    /// `synthetic value;` or `synthetic.base64 value;`
    Synthetic(SyntheticStatement),
    /// `log value;`
    Log(LogStatement),
    /// `goto label;`
    Goto(GotoStatement),
    /// `label:` — a goto destination.
    GotoLabel(GotoLabelStatement),
}

impl Statement {
    /// Returns the node metadata.
    #[must_use]
    pub fn meta(&self) -> &Meta {
        match self {
            Self::If(s) => &s.meta,
            Self::Set(s) => &s.meta,
            Self::Unset(s) => &s.meta,
            Self::Add(s) => &s.meta,
            Self::Call(s) => &s.meta,
            Self::Declare(s) => &s.meta,
            Self::Return(s) => &s.meta,
            Self::Error(s) => &s.meta,
            Self::Restart(s) => &s.meta,
            Self::Synthetic(s) => &s.meta,
            Self::Log(s) => &s.meta,
            Self::Goto(s) => &s.meta,
            Self::GotoLabel(s) => &s.meta,
        }
    }

    /// Returns the node metadata mutably (comment redistribution).
    pub fn meta_mut(&mut self) -> &mut Meta {
        match self {
            Self::If(s) => &mut s.meta,
            Self::Set(s) => &mut s.meta,
            Self::Unset(s) => &mut s.meta,
            Self::Add(s) => &mut s.meta,
            Self::Call(s) => &mut s.meta,
            Self::Declare(s) => &mut s.meta,
            Self::Return(s) => &mut s.meta,
            Self::Error(s) => &mut s.meta,
            Self::Restart(s) => &mut s.meta,
            Self::Synthetic(s) => &mut s.meta,
            Self::Log(s) => &mut s.meta,
            Self::Goto(s) => &mut s.meta,
            Self::GotoLabel(s) => &mut s.meta,
        }
    }
}

/// A conditional statement with optional `elsif` chain and `else` tail.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    /// The condition.
    pub condition: Expression,
    /// The `if` branch.
    pub consequence: Block,
    /// The `elsif` clauses, in source order.
    pub alternatives: Vec<ElseIfClause>,
    /// The `else` branch.
    pub alternative: Option<Block>,
    /// Node metadata.
    pub meta: Meta,
}

/// One `elsif (cond) { ... }` clause.
#[derive(Debug, Clone, PartialEq)]
pub struct ElseIfClause {
    /// The clause condition.
    pub condition: Expression,
    /// The clause body.
    pub body: Block,
    /// Node metadata.
    pub meta: Meta,
}

/// An assignment statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SetStatement {
    /// The assignment target.
    pub target: Ident,
    /// The assignment operator.
    pub operator: AssignmentOperator,
    /// The assigned value.
    pub value: Expression,
    /// Node metadata.
    pub meta: Meta,
}

/// An `unset` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct UnsetStatement {
    /// The target to remove.
    pub target: Ident,
    /// Node metadata.
    pub meta: Meta,
}

/// An `add` statement (appends another value of a multi-valued header).
#[derive(Debug, Clone, PartialEq)]
pub struct AddStatement {
    /// The target header.
    pub target: Ident,
    /// The appended value.
    pub value: Expression,
    /// Node metadata.
    pub meta: Meta,
}

/// A `call` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct CallStatement {
    /// The called subroutine.
    pub subroutine: Ident,
    /// Node metadata.
    pub meta: Meta,
}

/// A `declare local` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclareStatement {
    /// The declared variable name (must start with `var.`).
    pub name: Ident,
    /// The declared type name, resolved by the linter.
    pub type_name: Ident,
    /// Node metadata.
    pub meta: Meta,
}

/// A `return` statement with optional state.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    /// The returned state (`lookup`, `pass`, ...), when present.
    pub state: Option<Ident>,
    /// Node metadata.
    pub meta: Meta,
}

/// An `error` statement with optional status code and response text.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorStatement {
    /// The status code expression.
    pub code: Option<Expression>,
    /// The response text expression.
    pub response: Option<Expression>,
    /// Node metadata.
    pub meta: Meta,
}

/// A `restart` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct RestartStatement {
    /// Node metadata.
    pub meta: Meta,
}

/// A `synthetic` or `synthetic.base64` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticStatement {
    /// The synthesized body.
    pub value: Expression,
    /// Whether this is the `synthetic.base64` form.
    pub base64: bool,
    /// Node metadata.
    pub meta: Meta,
}

/// A `log` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct LogStatement {
    /// The logged value.
    pub value: Expression,
    /// Node metadata.
    pub meta: Meta,
}

/// A `goto` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct GotoStatement {
    /// The destination label (without colon).
    pub destination: Ident,
    /// Node metadata.
    pub meta: Meta,
}

/// A goto destination label: `retry:`
#[derive(Debug, Clone, PartialEq)]
pub struct GotoLabelStatement {
    /// The label name (without the trailing colon).
    pub name: EcoString,
    /// Node metadata.
    pub meta: Meta,
}

/// The assignment-operator set, one variant per compound operator.
///
/// Recognised from tokens by exact kind membership; each variant maps
/// one-to-one to its augmented-assignment literal form for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignmentOperator {
    /// `=`
    Set,
    /// `+=`
    Add,
    /// `-=`
    Sub,
    /// `*=`
    Mul,
    /// `/=`
    Div,
    /// `%=`
    Mod,
    /// `|=`
    BitOr,
    /// `&=`
    BitAnd,
    /// `^=`
    BitXor,
    /// `<<=`
    Shl,
    /// `>>=`
    Shr,
    /// `rol=`
    Rol,
    /// `ror=`
    Ror,
    /// `&&=`
    LogicalAnd,
    /// `||=`
    LogicalOr,
}

impl AssignmentOperator {
    /// Returns the operator's literal form.
    #[must_use]
    pub const fn literal(self) -> &'static str {
        match self {
            Self::Set => "=",
            Self::Add => "+=",
            Self::Sub => "-=",
            Self::Mul => "*=",
            Self::Div => "/=",
            Self::Mod => "%=",
            Self::BitOr => "|=",
            Self::BitAnd => "&=",
            Self::BitXor => "^=",
            Self::Shl => "<<=",
            Self::Shr => ">>=",
            Self::Rol => "rol=",
            Self::Ror => "ror=",
            Self::LogicalAnd => "&&=",
            Self::LogicalOr => "||=",
        }
    }
}

impl std::fmt::Display for AssignmentOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.literal())
    }
}

/// An expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A variable, header, or declared-name reference.
    Ident(Ident),
    /// A string literal.
    String(StringLit),
    /// An integer literal.
    Integer(IntegerLit),
    /// A floating-point literal.
    Float(FloatLit),
    /// A boolean literal.
    Bool(BoolLit),
    /// A duration literal.
    RTime(RTimeLit),
    /// A prefix operation: `!cond`, `-n`
    Prefix(PrefixExpression),
    /// A binary operation: `a == b`, `n + 1`
    Infix(InfixExpression),
    /// A builtin or user-defined function call: `std.tolower(...)`
    Call(FunctionCall),
    /// String concatenation by adjacency: `"a" req.http.B "c"`
    Concat(ConcatExpression),
    /// A parenthesized group.
    Group(GroupExpression),
}

impl Expression {
    /// Returns the node metadata.
    #[must_use]
    pub fn meta(&self) -> &Meta {
        match self {
            Self::Ident(e) => &e.meta,
            Self::String(e) => &e.meta,
            Self::Integer(e) => &e.meta,
            Self::Float(e) => &e.meta,
            Self::Bool(e) => &e.meta,
            Self::RTime(e) => &e.meta,
            Self::Prefix(e) => &e.meta,
            Self::Infix(e) => &e.meta,
            Self::Call(e) => &e.meta,
            Self::Concat(e) => &e.meta,
            Self::Group(e) => &e.meta,
        }
    }

    /// Returns the source span of this expression.
    #[must_use]
    pub fn span(&self) -> Span {
        self.meta().span
    }
}

/// A string literal.
#[derive(Debug, Clone, PartialEq)]
pub struct StringLit {
    /// The string content without delimiters.
    pub value: EcoString,
    /// Whether this is the verbatim `{"..."}` form.
    pub long: bool,
    /// Node metadata.
    pub meta: Meta,
}

/// An integer literal.
#[derive(Debug, Clone, PartialEq)]
pub struct IntegerLit {
    /// The parsed value.
    pub value: i64,
    /// Node metadata.
    pub meta: Meta,
}

/// A floating-point literal.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatLit {
    /// The parsed value.
    pub value: f64,
    /// Node metadata.
    pub meta: Meta,
}

/// A boolean literal.
#[derive(Debug, Clone, PartialEq)]
pub struct BoolLit {
    /// The literal value.
    pub value: bool,
    /// Node metadata.
    pub meta: Meta,
}

/// A duration literal (`30s`, `1.5h`).
#[derive(Debug, Clone, PartialEq)]
pub struct RTimeLit {
    /// The literal as written, including the unit suffix.
    pub literal: EcoString,
    /// Node metadata.
    pub meta: Meta,
}

/// A prefix operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefixOperator {
    /// Logical negation `!`
    Not,
    /// Arithmetic negation `-`
    Neg,
}

impl std::fmt::Display for PrefixOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Not => write!(f, "!"),
            Self::Neg => write!(f, "-"),
        }
    }
}

/// A prefix operation.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefixExpression {
    /// The operator.
    pub operator: PrefixOperator,
    /// The operand.
    pub right: Box<Expression>,
    /// Node metadata.
    pub meta: Meta,
}

/// A binary operator, grouped by precedence tier in the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfixOperator {
    /// `||`
    Or,
    /// `&&`
    And,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `~` (regex or ACL match)
    Match,
    /// `!~`
    NotMatch,
    /// `<`
    Lt,
    /// `>`
    Gt,
    /// `<=`
    Le,
    /// `>=`
    Ge,
    /// `|`
    BitOr,
    /// `&`
    BitAnd,
    /// `^`
    BitXor,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `rol`
    Rol,
    /// `ror`
    Ror,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
}

impl std::fmt::Display for InfixOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let literal = match self {
            Self::Or => "||",
            Self::And => "&&",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Match => "~",
            Self::NotMatch => "!~",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::BitOr => "|",
            Self::BitAnd => "&",
            Self::BitXor => "^",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::Rol => "rol",
            Self::Ror => "ror",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
        };
        write!(f, "{literal}")
    }
}

/// A binary operation.
#[derive(Debug, Clone, PartialEq)]
pub struct InfixExpression {
    /// The operator.
    pub operator: InfixOperator,
    /// The left operand.
    pub left: Box<Expression>,
    /// The right operand.
    pub right: Box<Expression>,
    /// Node metadata.
    pub meta: Meta,
}

/// A function call with a dotted function name.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    /// The function name (`std.tolower`, `table.lookup`).
    pub function: Ident,
    /// The call arguments.
    pub arguments: Vec<Expression>,
    /// Node metadata.
    pub meta: Meta,
}

/// String concatenation by adjacency, the lowest-precedence grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcatExpression {
    /// The concatenated parts, in source order (always two or more).
    pub parts: Vec<Expression>,
    /// Node metadata.
    pub meta: Meta,
}

/// A parenthesized expression.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupExpression {
    /// The inner expression.
    pub inner: Box<Expression>,
    /// Node metadata.
    pub meta: Meta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_swap_leading_to_trailing_moves() {
        let mut next = Meta::new(Span::new(10, 20));
        next.leading.push(Comment::new("note", Span::new(0, 6)));
        let mut prev = Meta::new(Span::new(0, 9));

        next.swap_leading_to_trailing(&mut prev);

        assert!(next.leading.is_empty(), "comments move, never copy");
        assert_eq!(prev.trailing.len(), 1);
        assert_eq!(prev.trailing[0].text, "note");
    }

    #[test]
    fn meta_swap_leading_to_infix_moves() {
        let mut first_inner = Meta::new(Span::new(15, 25));
        first_inner
            .leading
            .push(Comment::new("header note", Span::new(10, 24)));
        let mut block = Meta::new(Span::new(8, 40));

        first_inner.swap_leading_to_infix(&mut block);

        assert!(first_inner.leading.is_empty());
        assert_eq!(block.infix.len(), 1);
    }

    #[test]
    fn assignment_operator_literals() {
        assert_eq!(AssignmentOperator::Set.literal(), "=");
        assert_eq!(AssignmentOperator::Add.literal(), "+=");
        assert_eq!(AssignmentOperator::Rol.literal(), "rol=");
        assert_eq!(AssignmentOperator::LogicalOr.literal(), "||=");
        assert_eq!(AssignmentOperator::Shl.to_string(), "<<=");
    }

    #[test]
    fn expression_span() {
        let span = Span::new(3, 7);
        let expr = Expression::Integer(IntegerLit {
            value: 42,
            meta: Meta::new(span),
        });
        assert_eq!(expr.span(), span);
    }

    #[test]
    fn declaration_names() {
        let sub = Declaration::Subroutine(SubroutineDecl {
            name: Ident::new("vcl_recv", Meta::new(Span::new(4, 12))),
            body: Block {
                statements: Vec::new(),
                meta: Meta::new(Span::new(13, 15)),
            },
            meta: Meta::new(Span::new(0, 15)),
        });
        assert_eq!(sub.name().unwrap().name, "vcl_recv");

        let include = Declaration::Include(IncludeDecl {
            path: StringLit {
                value: "other.vcl".into(),
                long: false,
                meta: Meta::new(Span::new(8, 19)),
            },
            meta: Meta::new(Span::new(0, 20)),
        });
        assert!(include.name().is_none());
    }

    #[test]
    fn infix_operator_display() {
        assert_eq!(InfixOperator::Match.to_string(), "~");
        assert_eq!(InfixOperator::NotMatch.to_string(), "!~");
        assert_eq!(InfixOperator::Rol.to_string(), "rol");
        assert_eq!(PrefixOperator::Not.to_string(), "!");
    }
}
