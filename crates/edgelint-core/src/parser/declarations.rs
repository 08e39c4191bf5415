// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Top-level declaration parsing.
//!
//! Each declaration keyword (`sub`, `table`, `acl`, `backend`, `director`,
//! `import`, `include`) dispatches to a dedicated rule. Declaration bodies
//! that contain statements delegate to the statement rules in
//! [`super::statements`].

use crate::ast::{
    AclDecl, AclEntry, BackendDecl, BackendProperty, BackendValue, Declaration, DirectorBackend,
    DirectorDecl, DirectorProperty, Ident, ImportDecl, IncludeDecl, IntegerLit, Meta, SourceUnit,
    StringLit, SubroutineDecl, TableDecl, TableEntry,
};
use crate::source_analysis::{Span, TokenKind};

use super::{ParseError, Parser};

impl Parser {
    /// Parses the whole token stream into a [`SourceUnit`].
    pub(crate) fn parse_source_unit(&mut self) -> Result<SourceUnit, ParseError> {
        let mut declarations = Vec::new();
        while !self.is_at_end() {
            declarations.push(self.parse_declaration()?);
        }

        // Comments after the last declaration end up on the EOF token.
        let mut eof = self.advance();
        let end = eof.span().end();
        let mut meta = Meta::new(Span::new(0, end));
        meta.trailing = eof.take_leading_comments();

        Ok(SourceUnit { declarations, meta })
    }

    /// Parses one top-level declaration.
    fn parse_declaration(&mut self) -> Result<Declaration, ParseError> {
        match self.current_kind() {
            TokenKind::Sub => self.parse_subroutine().map(Declaration::Subroutine),
            TokenKind::Table => self.parse_table().map(Declaration::Table),
            TokenKind::Acl => self.parse_acl().map(Declaration::Acl),
            TokenKind::Backend => self.parse_backend().map(Declaration::Backend),
            TokenKind::Director => self.parse_director().map(Declaration::Director),
            TokenKind::Import => self.parse_import().map(Declaration::Import),
            TokenKind::Include => self.parse_include().map(Declaration::Include),
            _ => Err(ParseError::unexpected(
                "a top-level declaration (sub, table, acl, backend, director, import, include)",
                self.current_token(),
            )),
        }
    }

    /// Parses `sub name { ... }`.
    fn parse_subroutine(&mut self) -> Result<SubroutineDecl, ParseError> {
        let mut keyword = self.advance();
        let mut meta = Meta::new(keyword.span());
        meta.leading = keyword.take_leading_comments();

        let name = self.parse_ident("a subroutine name")?;
        let body = self.parse_block()?;
        meta.span = meta.span.merge(body.meta.span);

        Ok(SubroutineDecl { name, body, meta })
    }

    /// Parses `table name [TYPE] { "key": value, ... }`.
    fn parse_table(&mut self) -> Result<TableDecl, ParseError> {
        let mut keyword = self.advance();
        let mut meta = Meta::new(keyword.span());
        meta.leading = keyword.take_leading_comments();

        let name = self.parse_ident("a table name")?;
        let value_type = if self.check(&TokenKind::Ident(ecow::EcoString::new())) {
            Some(self.parse_ident("a table value type")?)
        } else {
            None
        };

        let mut open = self.expect(&TokenKind::LeftBrace, "'{'")?;
        meta.infix = open.take_trailing_comments();

        let mut entries = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            entries.push(self.parse_table_entry()?);
        }

        let mut close = self.expect(&TokenKind::RightBrace, "'}'")?;
        meta.infix.append(&mut close.take_leading_comments());
        meta.trailing = close.take_trailing_comments();
        meta.span = meta.span.merge(close.span());

        Ok(TableDecl {
            name,
            value_type,
            entries,
            meta,
        })
    }

    /// Parses one `"key": value,` table entry.
    fn parse_table_entry(&mut self) -> Result<TableEntry, ParseError> {
        let key = self.parse_string_literal("a table key string")?;
        let mut meta = Meta::new(key.meta.span);

        self.expect(&TokenKind::Colon, "':'")?;
        let value = self.parse_expression()?;
        meta.span = meta.span.merge(value.span());

        // Trailing comma is optional on the last entry.
        if let Some(mut comma) = self.match_token(&TokenKind::Comma) {
            meta.trailing = comma.take_trailing_comments();
            meta.span = meta.span.merge(comma.span());
        }

        Ok(TableEntry { key, value, meta })
    }

    /// Parses `acl name { !"addr"/mask; ... }`.
    fn parse_acl(&mut self) -> Result<AclDecl, ParseError> {
        let mut keyword = self.advance();
        let mut meta = Meta::new(keyword.span());
        meta.leading = keyword.take_leading_comments();

        let name = self.parse_ident("an acl name")?;
        let mut open = self.expect(&TokenKind::LeftBrace, "'{'")?;
        meta.infix = open.take_trailing_comments();

        let mut entries = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            entries.push(self.parse_acl_entry()?);
        }

        let mut close = self.expect(&TokenKind::RightBrace, "'}'")?;
        meta.infix.append(&mut close.take_leading_comments());
        meta.trailing = close.take_trailing_comments();
        meta.span = meta.span.merge(close.span());

        Ok(AclDecl {
            name,
            entries,
            meta,
        })
    }

    /// Parses one `[!]"address"[/mask];` ACL entry.
    fn parse_acl_entry(&mut self) -> Result<AclEntry, ParseError> {
        let start_span = self.current_token().span();
        let negated = self.match_token(&TokenKind::Not).is_some();
        let address = self.parse_string_literal("an acl address string")?;

        let mask = if self.match_token(&TokenKind::Slash).is_some() {
            let token = self.expect(&TokenKind::Int(ecow::EcoString::new()), "a subnet mask")?;
            Some(self.integer_literal(&token)?)
        } else {
            None
        };

        let mut semi = self.expect(&TokenKind::Semicolon, "';'")?;
        let mut meta = Meta::new(start_span.merge(semi.span()));
        meta.trailing = semi.take_trailing_comments();

        Ok(AclEntry {
            negated,
            address,
            mask,
            meta,
        })
    }

    /// Parses `backend name { .prop = value; ... }`.
    fn parse_backend(&mut self) -> Result<BackendDecl, ParseError> {
        let mut keyword = self.advance();
        let mut meta = Meta::new(keyword.span());
        meta.leading = keyword.take_leading_comments();

        let name = self.parse_ident("a backend name")?;
        let mut open = self.expect(&TokenKind::LeftBrace, "'{'")?;
        meta.infix = open.take_trailing_comments();

        let properties = self.parse_backend_properties()?;

        let mut close = self.expect(&TokenKind::RightBrace, "'}'")?;
        meta.infix.append(&mut close.take_leading_comments());
        meta.trailing = close.take_trailing_comments();
        meta.span = meta.span.merge(close.span());

        Ok(BackendDecl {
            name,
            properties,
            meta,
        })
    }

    /// Parses the `.name = value;` properties of a backend body.
    fn parse_backend_properties(&mut self) -> Result<Vec<BackendProperty>, ParseError> {
        let mut properties = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            properties.push(self.parse_backend_property()?);
        }
        Ok(properties)
    }

    /// Parses one `.name = value;` property, where the value may be a nested
    /// property block (`.probe = { ... }`).
    fn parse_backend_property(&mut self) -> Result<BackendProperty, ParseError> {
        let name = self.parse_property_name()?;
        let mut meta = Meta::new(name.meta.span);
        self.expect(&TokenKind::Assign, "'='")?;

        let value = if self.check(&TokenKind::LeftBrace) {
            let mut open = self.advance();
            let mut block_meta = Meta::new(open.span());
            block_meta.infix = open.take_trailing_comments();
            let inner = self.parse_backend_properties()?;
            let close = self.expect(&TokenKind::RightBrace, "'}'")?;
            block_meta.span = block_meta.span.merge(close.span());
            meta.span = meta.span.merge(close.span());
            BackendValue::Block(inner, block_meta)
        } else {
            let value = self.parse_expression()?;
            let mut semi = self.expect(&TokenKind::Semicolon, "';'")?;
            meta.trailing = semi.take_trailing_comments();
            meta.span = meta.span.merge(semi.span());
            BackendValue::Expression(value)
        };

        Ok(BackendProperty { name, value, meta })
    }

    /// Parses `director name policy { .prop = v; { .backend = b; } }`.
    fn parse_director(&mut self) -> Result<DirectorDecl, ParseError> {
        let mut keyword = self.advance();
        let mut meta = Meta::new(keyword.span());
        meta.leading = keyword.take_leading_comments();

        let name = self.parse_ident("a director name")?;
        let policy = self.parse_ident("a director policy (random, hash, client, fallback)")?;
        let mut open = self.expect(&TokenKind::LeftBrace, "'{'")?;
        meta.infix = open.take_trailing_comments();

        let mut properties = Vec::new();
        let mut backends = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            if self.check(&TokenKind::LeftBrace) {
                backends.push(self.parse_director_backend()?);
            } else {
                properties.push(self.parse_director_property()?);
            }
        }

        let mut close = self.expect(&TokenKind::RightBrace, "'}'")?;
        meta.infix.append(&mut close.take_leading_comments());
        meta.trailing = close.take_trailing_comments();
        meta.span = meta.span.merge(close.span());

        Ok(DirectorDecl {
            name,
            policy,
            properties,
            backends,
            meta,
        })
    }

    /// Parses one `{ .backend = name; .weight = 1; }` director member.
    fn parse_director_backend(&mut self) -> Result<DirectorBackend, ParseError> {
        let open = self.advance();
        let mut meta = Meta::new(open.span());

        let mut properties = Vec::new();
        while !self.check(&TokenKind::RightBrace) && !self.is_at_end() {
            properties.push(self.parse_director_property()?);
        }

        let close = self.expect(&TokenKind::RightBrace, "'}'")?;
        meta.span = meta.span.merge(close.span());

        Ok(DirectorBackend { properties, meta })
    }

    /// Parses one `.name = value[%];` director property.
    fn parse_director_property(&mut self) -> Result<DirectorProperty, ParseError> {
        let name = self.parse_property_name()?;
        let mut meta = Meta::new(name.meta.span);
        self.expect(&TokenKind::Assign, "'='")?;

        let value = self.parse_binary_expression(0)?;
        let percent = self.match_token(&TokenKind::Percent).is_some();

        let mut semi = self.expect(&TokenKind::Semicolon, "';'")?;
        meta.trailing = semi.take_trailing_comments();
        meta.span = meta.span.merge(semi.span());

        Ok(DirectorProperty {
            name,
            value,
            percent,
            meta,
        })
    }

    /// Parses `import module;`.
    fn parse_import(&mut self) -> Result<ImportDecl, ParseError> {
        let mut keyword = self.advance();
        let mut meta = Meta::new(keyword.span());
        meta.leading = keyword.take_leading_comments();

        let module = self.parse_ident("a module name")?;
        let mut semi = self.expect(&TokenKind::Semicolon, "';'")?;
        meta.trailing = semi.take_trailing_comments();
        meta.span = meta.span.merge(semi.span());

        Ok(ImportDecl { module, meta })
    }

    /// Parses `include "path";`.
    fn parse_include(&mut self) -> Result<IncludeDecl, ParseError> {
        let mut keyword = self.advance();
        let mut meta = Meta::new(keyword.span());
        meta.leading = keyword.take_leading_comments();

        let path = self.parse_string_literal("an include path string")?;
        let mut semi = self.expect(&TokenKind::Semicolon, "';'")?;
        meta.trailing = semi.take_trailing_comments();
        meta.span = meta.span.merge(semi.span());

        Ok(IncludeDecl { path, meta })
    }

    // ========================================================================
    // Shared Helpers
    // ========================================================================

    /// Parses an identifier token into an [`Ident`] node.
    pub(crate) fn parse_ident(&mut self, expected: &'static str) -> Result<Ident, ParseError> {
        let mut token = self.expect(&TokenKind::Ident(ecow::EcoString::new()), expected)?;
        let name = token
            .kind()
            .as_str()
            .expect("identifier tokens carry text")
            .to_owned();
        let mut meta = Meta::new(token.span());
        meta.leading = token.take_leading_comments();
        Ok(Ident::new(name, meta))
    }

    /// Parses a property name (`.host`), which must start with a dot.
    fn parse_property_name(&mut self) -> Result<Ident, ParseError> {
        let ident = self.parse_ident("a property name starting with '.'")?;
        if ident.name.starts_with('.') {
            Ok(ident)
        } else {
            Err(ParseError {
                expected: "a property name starting with '.'".into(),
                found: ident.name.clone(),
                span: ident.meta.span,
            })
        }
    }

    /// Parses a string token into a [`StringLit`] node.
    pub(crate) fn parse_string_literal(
        &mut self,
        expected: &'static str,
    ) -> Result<StringLit, ParseError> {
        let mut token = self.expect(
            &TokenKind::String(ecow::EcoString::new(), false),
            expected,
        )?;
        let TokenKind::String(value, long) = token.kind().clone() else {
            unreachable!("expect() matched a string token");
        };
        let mut meta = Meta::new(token.span());
        meta.leading = token.take_leading_comments();
        Ok(StringLit { value, long, meta })
    }

    /// Converts an integer token into an [`IntegerLit`] node.
    pub(crate) fn integer_literal(
        &self,
        token: &crate::source_analysis::Token,
    ) -> Result<IntegerLit, ParseError> {
        let text = token.kind().as_str().expect("integer tokens carry text");
        let value = text.parse::<i64>().map_err(|_| ParseError {
            expected: "an integer that fits in 64 bits".into(),
            found: text.into(),
            span: token.span(),
        })?;
        Ok(IntegerLit {
            value,
            meta: Meta::new(token.span()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::source_analysis::lex;

    fn parse_one(source: &str) -> Declaration {
        let mut unit = parse(lex(source).unwrap()).unwrap();
        assert_eq!(unit.declarations.len(), 1);
        unit.declarations.remove(0)
    }

    #[test]
    fn parse_table_with_entries() {
        let Declaration::Table(table) = parse_one(
            "table redirects {\n  \"/old\": \"/new\",\n  \"/gone\": \"/\",\n}",
        ) else {
            panic!("expected table");
        };
        assert_eq!(table.name.name, "redirects");
        assert!(table.value_type.is_none());
        assert_eq!(table.entries.len(), 2);
        assert_eq!(table.entries[0].key.value, "/old");
    }

    #[test]
    fn parse_typed_table() {
        let Declaration::Table(table) = parse_one("table limits INTEGER { \"max\": 10, }") else {
            panic!("expected table");
        };
        assert_eq!(table.value_type.as_ref().unwrap().name, "INTEGER");
        assert_eq!(table.entries.len(), 1);
    }

    #[test]
    fn parse_acl_entries() {
        let Declaration::Acl(acl) = parse_one(
            "acl internal {\n  \"10.0.0.0\"/8;\n  !\"192.0.2.1\";\n}",
        ) else {
            panic!("expected acl");
        };
        assert_eq!(acl.entries.len(), 2);
        assert_eq!(acl.entries[0].mask.as_ref().unwrap().value, 8);
        assert!(!acl.entries[0].negated);
        assert!(acl.entries[1].negated);
        assert!(acl.entries[1].mask.is_none());
    }

    #[test]
    fn parse_backend_with_probe_block() {
        let Declaration::Backend(backend) = parse_one(
            "backend origin {\n  .host = \"origin.example\";\n  .port = \"443\";\n  .probe = {\n    .request = \"HEAD / HTTP/1.1\";\n  }\n}",
        ) else {
            panic!("expected backend");
        };
        assert_eq!(backend.name.name, "origin");
        assert_eq!(backend.properties.len(), 3);
        assert!(matches!(
            backend.properties[2].value,
            BackendValue::Block(ref inner, _) if inner.len() == 1
        ));
    }

    #[test]
    fn parse_director_with_members() {
        let Declaration::Director(director) = parse_one(
            "director pool random {\n  .quorum = 50%;\n  { .backend = origin_a; .weight = 2; }\n  { .backend = origin_b; .weight = 1; }\n}",
        ) else {
            panic!("expected director");
        };
        assert_eq!(director.policy.name, "random");
        assert_eq!(director.properties.len(), 1);
        assert!(director.properties[0].percent);
        assert_eq!(director.backends.len(), 2);
        assert_eq!(director.backends[0].properties[0].name.name, ".backend");
    }

    #[test]
    fn parse_import_and_include() {
        let Declaration::Import(import) = parse_one("import boltsort;") else {
            panic!("expected import");
        };
        assert_eq!(import.module.name, "boltsort");

        let Declaration::Include(include) = parse_one("include \"extra.vcl\";") else {
            panic!("expected include");
        };
        assert_eq!(include.path.value, "extra.vcl");
    }

    #[test]
    fn property_name_must_start_with_dot() {
        let err = parse(lex("backend origin { host = \"x\"; }").unwrap()).unwrap_err();
        assert!(err.expected.contains("'.'"), "got: {err}");
    }
}
