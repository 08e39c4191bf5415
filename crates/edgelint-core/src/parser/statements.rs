// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Statement parsing.
//!
//! Each statement keyword dispatches to a dedicated rule. A statement
//! normally ends at `;`, whose same-line trailing comment is moved into the
//! statement's `Meta`. Goto labels are the exception: they are recognised by
//! lexical shape (a single trailing colon) and take no terminator.

use crate::ast::{
    AddStatement, AssignmentOperator, Block, CallStatement, DeclareStatement, ElseIfClause,
    ErrorStatement, GotoLabelStatement, GotoStatement, Ident, IfStatement, LogStatement, Meta,
    RestartStatement, ReturnStatement, SetStatement, Statement, SyntheticStatement, UnsetStatement,
};
use crate::source_analysis::{Token, TokenKind};

use super::{ParseError, Parser};

/// Maps an assignment-operator token to its [`AssignmentOperator`], by exact
/// token-kind membership.
///
/// Returns `None` for any token outside the fixed fifteen-operator set; the
/// parser never inspects literal text to make this decision.
fn assignment_operator(kind: &TokenKind) -> Option<AssignmentOperator> {
    let operator = match kind {
        TokenKind::Assign => AssignmentOperator::Set,
        TokenKind::Addition => AssignmentOperator::Add,
        TokenKind::Subtraction => AssignmentOperator::Sub,
        TokenKind::Multiplication => AssignmentOperator::Mul,
        TokenKind::Division => AssignmentOperator::Div,
        TokenKind::Remainder => AssignmentOperator::Mod,
        TokenKind::BitwiseOrAssign => AssignmentOperator::BitOr,
        TokenKind::BitwiseAndAssign => AssignmentOperator::BitAnd,
        TokenKind::BitwiseXorAssign => AssignmentOperator::BitXor,
        TokenKind::LeftShiftAssign => AssignmentOperator::Shl,
        TokenKind::RightShiftAssign => AssignmentOperator::Shr,
        TokenKind::LeftRotateAssign => AssignmentOperator::Rol,
        TokenKind::RightRotateAssign => AssignmentOperator::Ror,
        TokenKind::LogicalAndAssign => AssignmentOperator::LogicalAnd,
        TokenKind::LogicalOrAssign => AssignmentOperator::LogicalOr,
        _ => return None,
    };
    Some(operator)
}

impl Parser {
    /// Parses a `{ ... }` statement block.
    ///
    /// The opening brace's same-line comment and any comments immediately
    /// before the closing brace land in the block's infix slot.
    pub(crate) fn parse_block(&mut self) -> Result<Block, ParseError> {
        let mut open = self.expect(&TokenKind::LeftBrace, "'{'")?;
        let mut meta = Meta::new(open.span());
        meta.infix = open.take_trailing_comments();

        let mut statements = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        let mut close = self.expect(&TokenKind::RightBrace, "'}'")?;
        // Comments above `}` precede no statement; they move into the block
        // header's infix slot.
        let mut dangling = Meta::new(close.span());
        dangling.leading = close.take_leading_comments();
        dangling.swap_leading_to_infix(&mut meta);
        meta.span = meta.span.merge(close.span());

        Ok(Block { statements, meta })
    }

    /// Parses one statement, dispatching on the leading keyword.
    pub(crate) fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        match self.current_kind() {
            TokenKind::If => self.parse_if().map(Statement::If),
            TokenKind::Set => self.parse_set().map(Statement::Set),
            TokenKind::Unset => self.parse_unset().map(Statement::Unset),
            TokenKind::Add => self.parse_add().map(Statement::Add),
            TokenKind::Call => self.parse_call().map(Statement::Call),
            TokenKind::Declare => self.parse_declare().map(Statement::Declare),
            TokenKind::Return => self.parse_return().map(Statement::Return),
            TokenKind::ErrorKw => self.parse_error_statement().map(Statement::Error),
            TokenKind::Restart => self.parse_restart().map(Statement::Restart),
            TokenKind::Synthetic | TokenKind::SyntheticBase64 => {
                self.parse_synthetic().map(Statement::Synthetic)
            }
            TokenKind::Log => self.parse_log().map(Statement::Log),
            TokenKind::Goto => self.parse_goto().map(Statement::Goto),
            TokenKind::Ident(_) if self.current_token().is_goto_destination() => {
                Ok(Statement::GotoLabel(self.parse_goto_label()))
            }
            _ => Err(ParseError::unexpected(
                "a statement",
                self.current_token(),
            )),
        }
    }

    /// Starts a statement meta from its keyword token.
    fn statement_meta(keyword: &mut Token) -> Meta {
        let mut meta = Meta::new(keyword.span());
        meta.leading = keyword.take_leading_comments();
        meta
    }

    /// Finishes a statement at its `;`, moving the same-line trailing
    /// comment onto the statement.
    fn finish_statement(&mut self, meta: &mut Meta) -> Result<(), ParseError> {
        let mut semi = self.expect(&TokenKind::Semicolon, "';'")?;
        meta.trailing = semi.take_trailing_comments();
        meta.span = meta.span.merge(semi.span());
        Ok(())
    }

    /// Parses `if (cond) { } elsif (cond) { } else { }`.
    ///
    /// Both `elsif` and `elseif` spellings arrive as one token kind, and
    /// `else if` is folded into the same alternative list.
    fn parse_if(&mut self) -> Result<IfStatement, ParseError> {
        let mut keyword = self.advance();
        let mut meta = Self::statement_meta(&mut keyword);

        self.expect(&TokenKind::LeftParen, "'('")?;
        let condition = self.parse_expression()?;
        self.expect(&TokenKind::RightParen, "')'")?;
        let consequence = self.parse_block()?;
        meta.span = meta.span.merge(consequence.meta.span);

        let mut alternatives = Vec::new();
        let mut alternative = None;
        loop {
            let mut clause_leading;
            if self.check(&TokenKind::Elsif) {
                let mut keyword = self.advance();
                clause_leading = keyword.take_leading_comments();
            } else if self.check(&TokenKind::Else)
                && matches!(self.peek_kind(), Some(TokenKind::If))
            {
                let mut keyword = self.advance(); // else
                clause_leading = keyword.take_leading_comments();
                self.advance(); // if
            } else if self.check(&TokenKind::Else) {
                let mut keyword = self.advance();
                let mut block = self.parse_block()?;
                block.meta.leading = keyword.take_leading_comments();
                meta.span = meta.span.merge(block.meta.span);
                alternative = Some(block);
                break;
            } else {
                break;
            }

            let clause_start = self.current_token().span();
            self.expect(&TokenKind::LeftParen, "'('")?;
            let clause_condition = self.parse_expression()?;
            self.expect(&TokenKind::RightParen, "')'")?;
            let body = self.parse_block()?;
            let mut clause_meta = Meta::new(clause_start.merge(body.meta.span));
            clause_meta.leading.append(&mut clause_leading);
            meta.span = meta.span.merge(clause_meta.span);
            alternatives.push(ElseIfClause {
                condition: clause_condition,
                body,
                meta: clause_meta,
            });
        }

        Ok(IfStatement {
            condition,
            consequence,
            alternatives,
            alternative,
            meta,
        })
    }

    /// Parses `set target OP value;`.
    fn parse_set(&mut self) -> Result<SetStatement, ParseError> {
        let mut keyword = self.advance();
        let mut meta = Self::statement_meta(&mut keyword);

        let target = self.parse_ident("an identifier")?;

        let token = self.current_token();
        let Some(operator) = assignment_operator(token.kind()) else {
            return Err(ParseError::unexpected(
                "an assignment operator (=, +=, -=, ...)",
                token,
            ));
        };
        self.advance();

        let value = self.parse_expression()?;
        self.finish_statement(&mut meta)?;

        Ok(SetStatement {
            target,
            operator,
            value,
            meta,
        })
    }

    /// Parses `unset target;` (or the `remove` spelling).
    fn parse_unset(&mut self) -> Result<UnsetStatement, ParseError> {
        let mut keyword = self.advance();
        let mut meta = Self::statement_meta(&mut keyword);
        let target = self.parse_ident("an identifier")?;
        self.finish_statement(&mut meta)?;
        Ok(UnsetStatement { target, meta })
    }

    /// Parses `add target = value;`.
    fn parse_add(&mut self) -> Result<AddStatement, ParseError> {
        let mut keyword = self.advance();
        let mut meta = Self::statement_meta(&mut keyword);
        let target = self.parse_ident("an identifier")?;
        self.expect(&TokenKind::Assign, "'='")?;
        let value = self.parse_expression()?;
        self.finish_statement(&mut meta)?;
        Ok(AddStatement {
            target,
            value,
            meta,
        })
    }

    /// Parses `call subroutine;`.
    fn parse_call(&mut self) -> Result<CallStatement, ParseError> {
        let mut keyword = self.advance();
        let mut meta = Self::statement_meta(&mut keyword);
        let subroutine = self.parse_ident("a subroutine name")?;
        self.finish_statement(&mut meta)?;
        Ok(CallStatement { subroutine, meta })
    }

    /// Parses `declare local var.name TYPE;`.
    fn parse_declare(&mut self) -> Result<DeclareStatement, ParseError> {
        let mut keyword = self.advance();
        let mut meta = Self::statement_meta(&mut keyword);

        let local = self.parse_ident("'local'")?;
        if local.name != "local" {
            return Err(ParseError {
                expected: "'local'".into(),
                found: local.name.clone(),
                span: local.meta.span,
            });
        }

        let name = self.parse_ident("a local variable name")?;
        let type_name = self.parse_ident("a type name")?;
        self.finish_statement(&mut meta)?;

        Ok(DeclareStatement {
            name,
            type_name,
            meta,
        })
    }

    /// Parses `return;`, `return(state);`, or `return state;`.
    fn parse_return(&mut self) -> Result<ReturnStatement, ParseError> {
        let mut keyword = self.advance();
        let mut meta = Self::statement_meta(&mut keyword);

        let state = if self.check(&TokenKind::Semicolon) {
            None
        } else if self.match_token(&TokenKind::LeftParen).is_some() {
            let state = self.parse_return_state()?;
            self.expect(&TokenKind::RightParen, "')'")?;
            Some(state)
        } else {
            Some(self.parse_return_state()?)
        };

        self.finish_statement(&mut meta)?;
        Ok(ReturnStatement { state, meta })
    }

    /// Parses a return state name.
    ///
    /// `error` and `restart` are keywords elsewhere but valid state names
    /// here; every other state (`lookup`, `pass`, `deliver`, ...) arrives as
    /// a plain identifier.
    fn parse_return_state(&mut self) -> Result<Ident, ParseError> {
        match self.current_kind() {
            TokenKind::Ident(_) => self.parse_ident("a return state"),
            TokenKind::ErrorKw | TokenKind::Restart => {
                let token = self.advance();
                Ok(Ident::new(
                    token.kind().to_string(),
                    Meta::new(token.span()),
                ))
            }
            _ => Err(ParseError::unexpected(
                "a return state",
                self.current_token(),
            )),
        }
    }

    /// Parses `error [code [response]];`.
    ///
    /// The status code is parsed without adjacency grouping so that the
    /// response text remains a separate argument.
    fn parse_error_statement(&mut self) -> Result<ErrorStatement, ParseError> {
        let mut keyword = self.advance();
        let mut meta = Self::statement_meta(&mut keyword);

        let mut code = None;
        let mut response = None;
        if !self.check(&TokenKind::Semicolon) {
            code = Some(self.parse_binary_expression(0)?);
            if !self.check(&TokenKind::Semicolon) {
                response = Some(self.parse_expression()?);
            }
        }

        self.finish_statement(&mut meta)?;
        Ok(ErrorStatement {
            code,
            response,
            meta,
        })
    }

    /// Parses `restart;`.
    fn parse_restart(&mut self) -> Result<RestartStatement, ParseError> {
        let mut keyword = self.advance();
        let mut meta = Self::statement_meta(&mut keyword);
        self.finish_statement(&mut meta)?;
        Ok(RestartStatement { meta })
    }

    /// Parses `synthetic value;` or `synthetic.base64 value;`.
    fn parse_synthetic(&mut self) -> Result<SyntheticStatement, ParseError> {
        let mut keyword = self.advance();
        let base64 = matches!(keyword.kind(), TokenKind::SyntheticBase64);
        let mut meta = Self::statement_meta(&mut keyword);
        let value = self.parse_expression()?;
        self.finish_statement(&mut meta)?;
        Ok(SyntheticStatement {
            value,
            base64,
            meta,
        })
    }

    /// Parses `log value;`.
    fn parse_log(&mut self) -> Result<LogStatement, ParseError> {
        let mut keyword = self.advance();
        let mut meta = Self::statement_meta(&mut keyword);
        let value = self.parse_expression()?;
        self.finish_statement(&mut meta)?;
        Ok(LogStatement { value, meta })
    }

    /// Parses `goto label;`.
    fn parse_goto(&mut self) -> Result<GotoStatement, ParseError> {
        let mut keyword = self.advance();
        let mut meta = Self::statement_meta(&mut keyword);
        let destination = self.parse_ident("a goto label")?;
        self.finish_statement(&mut meta)?;
        Ok(GotoStatement { destination, meta })
    }

    /// Parses a goto destination label (`retry:`), already validated by
    /// shape. Labels take no `;` terminator.
    fn parse_goto_label(&mut self) -> GotoLabelStatement {
        let mut token = self.advance();
        let literal = token.kind().as_str().expect("label tokens carry text");
        let name = literal
            .strip_suffix(':')
            .expect("goto destinations end with a colon")
            .into();
        let mut meta = Meta::new(token.span());
        meta.leading = token.take_leading_comments();
        meta.trailing = token.take_trailing_comments();
        GotoLabelStatement { name, meta }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Declaration, Expression};
    use crate::parser::parse;
    use crate::source_analysis::lex;

    fn parse_statements(body: &str) -> Vec<Statement> {
        let source = format!("sub vcl_recv {{\n{body}\n}}");
        let mut unit = parse(lex(&source).unwrap()).unwrap();
        let Declaration::Subroutine(sub) = unit.declarations.remove(0) else {
            panic!("expected subroutine");
        };
        sub.body.statements
    }

    #[test]
    fn parse_set_with_compound_operator() {
        let statements = parse_statements("set var.count += 2;");
        let Statement::Set(set) = &statements[0] else {
            panic!("expected set");
        };
        assert_eq!(set.target.name, "var.count");
        assert_eq!(set.operator, AssignmentOperator::Add);
    }

    #[test]
    fn set_requires_assignment_operator() {
        let tokens = lex("sub vcl_recv { set req.http.X == \"1\"; }").unwrap();
        let err = parse(tokens).unwrap_err();
        assert!(err.expected.contains("assignment operator"), "got: {err}");
        assert_eq!(err.found, "==");
    }

    #[test]
    fn parse_if_elsif_else_chain() {
        let statements = parse_statements(
            "if (req.http.A) {\n restart;\n} elsif (req.http.B) {\n restart;\n} else if (req.http.C) {\n restart;\n} else {\n restart;\n}",
        );
        let Statement::If(stmt) = &statements[0] else {
            panic!("expected if");
        };
        assert_eq!(stmt.alternatives.len(), 2, "elsif and else-if both fold in");
        assert!(stmt.alternative.is_some());
    }

    #[test]
    fn parse_return_forms() {
        let statements = parse_statements("return;\nreturn(lookup);\nreturn (pass);\nreturn(error);");
        let states: Vec<Option<&str>> = statements
            .iter()
            .map(|s| {
                let Statement::Return(r) = s else {
                    panic!("expected return");
                };
                r.state.as_ref().map(|i| i.name.as_str())
            })
            .collect();
        assert_eq!(
            states,
            vec![None, Some("lookup"), Some("pass"), Some("error")]
        );
    }

    #[test]
    fn parse_error_with_code_and_response() {
        let statements = parse_statements("error 750 \"moved\";");
        let Statement::Error(stmt) = &statements[0] else {
            panic!("expected error");
        };
        assert!(matches!(
            stmt.code,
            Some(Expression::Integer(ref lit)) if lit.value == 750
        ));
        assert!(matches!(stmt.response, Some(Expression::String(_))));
    }

    #[test]
    fn parse_declare_local() {
        let statements = parse_statements("declare local var.name STRING;");
        let Statement::Declare(decl) = &statements[0] else {
            panic!("expected declare");
        };
        assert_eq!(decl.name.name, "var.name");
        assert_eq!(decl.type_name.name, "STRING");
    }

    #[test]
    fn declare_requires_local_keyword() {
        let tokens = lex("sub vcl_recv { declare global var.x STRING; }").unwrap();
        let err = parse(tokens).unwrap_err();
        assert_eq!(err.expected, "'local'");
        assert_eq!(err.found, "global");
    }

    #[test]
    fn parse_goto_and_label() {
        let statements = parse_statements("goto retry;\nretry:\nrestart;");
        assert!(matches!(&statements[0], Statement::Goto(g) if g.destination.name == "retry"));
        assert!(matches!(&statements[1], Statement::GotoLabel(l) if l.name == "retry"));
        assert!(matches!(&statements[2], Statement::Restart(_)));
    }

    #[test]
    fn parse_synthetic_variants() {
        let statements = parse_statements(
            "synthetic {\"body\"};\nsynthetic.base64 \"aGVsbG8=\";",
        );
        assert!(matches!(&statements[0], Statement::Synthetic(s) if !s.base64));
        assert!(matches!(&statements[1], Statement::Synthetic(s) if s.base64));
    }

    #[test]
    fn parse_unset_and_remove_spellings() {
        let statements = parse_statements(
            "unset req.http.Cookie;\nremove req.http.X-Debug;",
        );
        assert!(matches!(&statements[0], Statement::Unset(_)));
        assert!(matches!(&statements[1], Statement::Unset(_)));
    }
}
