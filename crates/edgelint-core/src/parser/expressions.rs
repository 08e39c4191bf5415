// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Expression parsing.
//!
//! Binary operator precedence is handled using Pratt parsing (top-down
//! operator precedence parsing) with a declarative binding-power table.
//! Unary prefix operators bind tighter than any binary operator, and string
//! concatenation by adjacency (`"a" req.http.B "c"`) is a distinct grouping
//! construct *below* all operators.
//!
//! # Binary Operator Precedence
//!
//! | Level | Operators | Associativity |
//! |-------|-----------|---------------|
//! | 10 | `\|\|` | Left |
//! | 20 | `&&` | Left |
//! | 30 | `==` `!=` `~` `!~` `<` `>` `<=` `>=` | Left |
//! | 40 | `\|` `&` `^` | Left |
//! | 50 | `<<` `>>` `rol` `ror` | Left |
//! | 60 | `+` `-` | Left |
//! | 70 | `*` `/` `%` | Left |
//!
//! To add a new operator, add an entry to [`infix_binding_power`].

use crate::ast::{
    BoolLit, ConcatExpression, Expression, FloatLit, FunctionCall, GroupExpression, Ident,
    InfixExpression, InfixOperator, Meta, PrefixExpression, PrefixOperator, RTimeLit, StringLit,
};
use crate::source_analysis::TokenKind;

use super::{ParseError, Parser};

/// Binding power for binary operators (Pratt parsing).
///
/// Higher values bind tighter. All operators in this language are
/// left-associative: `left == precedence`, `right == precedence + 1`.
#[derive(Debug, Clone, Copy)]
pub(super) struct BindingPower {
    /// How tightly this operator binds to its left operand.
    pub(super) left: u8,
    /// How tightly this operator binds to its right operand.
    pub(super) right: u8,
}

impl BindingPower {
    /// Creates a left-associative binding power.
    const fn left_assoc(precedence: u8) -> Self {
        Self {
            left: precedence,
            right: precedence + 1,
        }
    }
}

/// Maps a token to its binary operator, if it is one.
fn infix_operator(kind: &TokenKind) -> Option<InfixOperator> {
    let operator = match kind {
        TokenKind::Or => InfixOperator::Or,
        TokenKind::And => InfixOperator::And,
        TokenKind::Equal => InfixOperator::Eq,
        TokenKind::NotEqual => InfixOperator::Ne,
        TokenKind::Match => InfixOperator::Match,
        TokenKind::NotMatch => InfixOperator::NotMatch,
        TokenKind::LessThan => InfixOperator::Lt,
        TokenKind::GreaterThan => InfixOperator::Gt,
        TokenKind::LessThanEqual => InfixOperator::Le,
        TokenKind::GreaterThanEqual => InfixOperator::Ge,
        TokenKind::Bar => InfixOperator::BitOr,
        TokenKind::Amp => InfixOperator::BitAnd,
        TokenKind::Caret => InfixOperator::BitXor,
        TokenKind::LeftShift => InfixOperator::Shl,
        TokenKind::RightShift => InfixOperator::Shr,
        TokenKind::LeftRotate => InfixOperator::Rol,
        TokenKind::RightRotate => InfixOperator::Ror,
        TokenKind::Plus => InfixOperator::Add,
        TokenKind::Minus => InfixOperator::Sub,
        TokenKind::Star => InfixOperator::Mul,
        TokenKind::Slash => InfixOperator::Div,
        TokenKind::Percent => InfixOperator::Mod,
        _ => return None,
    };
    Some(operator)
}

/// Gets the binding power for a binary operator, by precedence tier.
const fn infix_binding_power(operator: InfixOperator) -> BindingPower {
    match operator {
        InfixOperator::Or => BindingPower::left_assoc(10),
        InfixOperator::And => BindingPower::left_assoc(20),
        InfixOperator::Eq
        | InfixOperator::Ne
        | InfixOperator::Match
        | InfixOperator::NotMatch
        | InfixOperator::Lt
        | InfixOperator::Gt
        | InfixOperator::Le
        | InfixOperator::Ge => BindingPower::left_assoc(30),
        InfixOperator::BitOr | InfixOperator::BitAnd | InfixOperator::BitXor => {
            BindingPower::left_assoc(40)
        }
        InfixOperator::Shl | InfixOperator::Shr | InfixOperator::Rol | InfixOperator::Ror => {
            BindingPower::left_assoc(50)
        }
        InfixOperator::Add | InfixOperator::Sub => BindingPower::left_assoc(60),
        InfixOperator::Mul | InfixOperator::Div | InfixOperator::Mod => {
            BindingPower::left_assoc(70)
        }
    }
}

impl Parser {
    /// Parses any expression, including adjacency concatenation.
    ///
    /// Two or more operator-level expressions juxtaposed without an operator
    /// form a [`ConcatExpression`], the lowest-precedence grouping.
    pub(crate) fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        let first = self.parse_binary_expression(0)?;

        if !self.starts_expression() {
            return Ok(first);
        }

        let mut meta = Meta::new(first.span());
        let mut parts = vec![first];
        while self.starts_expression() {
            let part = self.parse_binary_expression(0)?;
            meta.span = meta.span.merge(part.span());
            parts.push(part);
        }

        Ok(Expression::Concat(ConcatExpression { parts, meta }))
    }

    /// Returns `true` if the current token can begin a concatenation part.
    ///
    /// Prefix operators are deliberately excluded: `"a" !var.b` is a syntax
    /// error, not a concatenation.
    fn starts_expression(&self) -> bool {
        match self.current_kind() {
            TokenKind::Ident(_) => !self.current_token().is_goto_destination(),
            TokenKind::String(..)
            | TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::RTime(_)
            | TokenKind::True
            | TokenKind::False
            | TokenKind::LeftParen => true,
            _ => false,
        }
    }

    /// Parses a binary expression with precedence climbing.
    pub(crate) fn parse_binary_expression(
        &mut self,
        min_binding_power: u8,
    ) -> Result<Expression, ParseError> {
        self.enter_nesting()?;
        let mut left = self.parse_unary_expression()?;

        loop {
            let Some(operator) = infix_operator(self.current_kind()) else {
                break;
            };
            let power = infix_binding_power(operator);
            if power.left < min_binding_power {
                break;
            }
            self.advance();

            let right = self.parse_binary_expression(power.right)?;
            let meta = Meta::new(left.span().merge(right.span()));
            left = Expression::Infix(InfixExpression {
                operator,
                left: Box::new(left),
                right: Box::new(right),
                meta,
            });
        }

        self.leave_nesting();
        Ok(left)
    }

    /// Parses a unary prefix expression (`!cond`, `-n`), which binds tighter
    /// than any binary operator.
    fn parse_unary_expression(&mut self) -> Result<Expression, ParseError> {
        let operator = match self.current_kind() {
            TokenKind::Not => Some(PrefixOperator::Not),
            TokenKind::Minus => Some(PrefixOperator::Neg),
            _ => None,
        };
        let Some(operator) = operator else {
            return self.parse_operand();
        };

        let token = self.advance();
        let right = self.parse_unary_expression()?;
        let meta = Meta::new(token.span().merge(right.span()));
        Ok(Expression::Prefix(PrefixExpression {
            operator,
            right: Box::new(right),
            meta,
        }))
    }

    /// Parses an operand: a literal, identifier, function call, or
    /// parenthesized group.
    fn parse_operand(&mut self) -> Result<Expression, ParseError> {
        match self.current_kind().clone() {
            TokenKind::Ident(_) => {
                let ident = self.parse_ident("an expression")?;
                if self.check(&TokenKind::LeftParen) {
                    self.parse_function_call(ident)
                } else {
                    Ok(Expression::Ident(ident))
                }
            }
            TokenKind::String(value, long) => {
                let mut token = self.advance();
                let mut meta = Meta::new(token.span());
                meta.leading = token.take_leading_comments();
                Ok(Expression::String(StringLit { value, long, meta }))
            }
            TokenKind::Int(_) => {
                let token = self.advance();
                Ok(Expression::Integer(self.integer_literal(&token)?))
            }
            TokenKind::Float(text) => {
                let token = self.advance();
                let value = text.parse::<f64>().map_err(|_| ParseError {
                    expected: "a floating-point literal".into(),
                    found: text.clone(),
                    span: token.span(),
                })?;
                Ok(Expression::Float(FloatLit {
                    value,
                    meta: Meta::new(token.span()),
                }))
            }
            TokenKind::RTime(literal) => {
                let token = self.advance();
                Ok(Expression::RTime(RTimeLit {
                    literal,
                    meta: Meta::new(token.span()),
                }))
            }
            TokenKind::True | TokenKind::False => {
                let value = matches!(self.current_kind(), TokenKind::True);
                let token = self.advance();
                Ok(Expression::Bool(BoolLit {
                    value,
                    meta: Meta::new(token.span()),
                }))
            }
            TokenKind::LeftParen => {
                self.enter_nesting()?;
                let open = self.advance();
                let inner = self.parse_expression()?;
                let close = self.expect(&TokenKind::RightParen, "')'")?;
                self.leave_nesting();
                Ok(Expression::Group(GroupExpression {
                    inner: Box::new(inner),
                    meta: Meta::new(open.span().merge(close.span())),
                }))
            }
            _ => Err(ParseError::unexpected(
                "an expression",
                self.current_token(),
            )),
        }
    }

    /// Parses the argument list of a function call, the name already
    /// consumed.
    fn parse_function_call(&mut self, function: Ident) -> Result<Expression, ParseError> {
        self.expect(&TokenKind::LeftParen, "'('")?;

        let mut arguments = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            loop {
                arguments.push(self.parse_expression()?);
                if self.match_token(&TokenKind::Comma).is_none() {
                    break;
                }
            }
        }

        let close = self.expect(&TokenKind::RightParen, "')'")?;
        let meta = Meta::new(function.meta.span.merge(close.span()));
        Ok(Expression::Call(FunctionCall {
            function,
            arguments,
            meta,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Declaration, SetStatement, Statement};
    use crate::parser::parse;
    use crate::source_analysis::lex;

    fn parse_value(value: &str) -> Expression {
        let source = format!("sub vcl_recv {{ set req.http.X = {value}; }}");
        let mut unit = parse(lex(&source).unwrap()).unwrap();
        let Declaration::Subroutine(sub) = unit.declarations.remove(0) else {
            panic!("expected subroutine");
        };
        let Statement::Set(SetStatement { value, .. }) = sub.body.statements.into_iter().next().unwrap()
        else {
            panic!("expected set");
        };
        value
    }

    fn parse_condition(cond: &str) -> Expression {
        let source = format!("sub vcl_recv {{ if ({cond}) {{ restart; }} }}");
        let mut unit = parse(lex(&source).unwrap()).unwrap();
        let Declaration::Subroutine(sub) = unit.declarations.remove(0) else {
            panic!("expected subroutine");
        };
        let Statement::If(stmt) = sub.body.statements.into_iter().next().unwrap() else {
            panic!("expected if");
        };
        stmt.condition
    }

    #[test]
    fn multiplicative_binds_tighter_than_additive() {
        let Expression::Infix(add) = parse_value("1 + 2 * 3") else {
            panic!("expected infix");
        };
        assert_eq!(add.operator, InfixOperator::Add);
        let Expression::Infix(mul) = *add.right else {
            panic!("expected infix rhs");
        };
        assert_eq!(mul.operator, InfixOperator::Mul);
    }

    #[test]
    fn left_associativity_within_a_tier() {
        let Expression::Infix(outer) = parse_value("1 - 2 - 3") else {
            panic!("expected infix");
        };
        assert_eq!(outer.operator, InfixOperator::Sub);
        // (1 - 2) - 3: the left operand is itself the first subtraction.
        assert!(matches!(
            *outer.left,
            Expression::Infix(ref inner) if inner.operator == InfixOperator::Sub
        ));
    }

    #[test]
    fn logical_or_is_lowest_operator_tier() {
        let Expression::Infix(or) = parse_condition("req.http.A && req.http.B || req.http.C")
        else {
            panic!("expected infix");
        };
        assert_eq!(or.operator, InfixOperator::Or);
        assert!(matches!(
            *or.left,
            Expression::Infix(ref and) if and.operator == InfixOperator::And
        ));
    }

    #[test]
    fn prefix_binds_tighter_than_binary() {
        let Expression::Infix(and) = parse_condition("!req.http.A && req.http.B") else {
            panic!("expected infix");
        };
        assert_eq!(and.operator, InfixOperator::And);
        assert!(matches!(*and.left, Expression::Prefix(_)));
    }

    #[test]
    fn adjacency_builds_concat_group() {
        let Expression::Concat(concat) = parse_value("\"a\" req.http.B \"c\"") else {
            panic!("expected concat");
        };
        assert_eq!(concat.parts.len(), 3);
        assert!(matches!(concat.parts[0], Expression::String(_)));
        assert!(matches!(concat.parts[1], Expression::Ident(_)));
    }

    #[test]
    fn concat_is_below_all_operators() {
        // `"a" 1 + 2` concatenates "a" with the whole sum.
        let Expression::Concat(concat) = parse_value("\"a\" 1 + 2") else {
            panic!("expected concat");
        };
        assert_eq!(concat.parts.len(), 2);
        assert!(matches!(
            concat.parts[1],
            Expression::Infix(ref i) if i.operator == InfixOperator::Add
        ));
    }

    #[test]
    fn function_call_with_dotted_name() {
        let Expression::Call(call) = parse_value("std.tolower(req.http.Host)") else {
            panic!("expected call");
        };
        assert_eq!(call.function.name, "std.tolower");
        assert_eq!(call.arguments.len(), 1);
    }

    #[test]
    fn function_call_with_multiple_arguments() {
        let Expression::Call(call) = parse_value("regsub(req.url, \"^/old\", \"/new\")") else {
            panic!("expected call");
        };
        assert_eq!(call.arguments.len(), 3);
    }

    #[test]
    fn group_overrides_precedence() {
        let Expression::Infix(mul) = parse_value("(1 + 2) * 3") else {
            panic!("expected infix");
        };
        assert_eq!(mul.operator, InfixOperator::Mul);
        assert!(matches!(*mul.left, Expression::Group(_)));
    }

    #[test]
    fn regex_match_parses_as_comparison_tier() {
        let Expression::Infix(and) = parse_condition("req.url ~ \"^/api\" && req.http.A") else {
            panic!("expected infix");
        };
        assert_eq!(and.operator, InfixOperator::And);
        assert!(matches!(
            *and.left,
            Expression::Infix(ref m) if m.operator == InfixOperator::Match
        ));
    }

    #[test]
    fn deep_nesting_is_rejected() {
        let nested = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        let source = format!("sub vcl_recv {{ set req.http.X = {nested}; }}");
        let err = parse(lex(&source).unwrap()).unwrap_err();
        assert!(err.expected.contains("less deeply nested"), "got: {err}");
    }

    #[test]
    fn negative_rtime_and_duration_literals() {
        assert!(matches!(parse_value("30s"), Expression::RTime(_)));
        assert!(matches!(parse_value("-1"), Expression::Prefix(_)));
        assert!(matches!(parse_value("true"), Expression::Bool(_)));
        assert!(matches!(parse_value("0.5"), Expression::Float(_)));
    }
}
