// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! AST unparser: converts AST nodes back to canonical source text.
//!
//! The unparser is the inverse of the parser. Its output is canonical rather
//! than byte-faithful — indentation is normalised and comment placement may
//! shift — but re-parsing the output yields an AST with the same node-variant
//! structure. That property is exercised by the parser's property tests.

use std::fmt::Write;

use crate::ast::{
    AclDecl, BackendDecl, BackendProperty, BackendValue, Block, Declaration, DirectorDecl,
    DirectorProperty, Expression, Meta, SourceUnit, Statement, TableDecl,
};

/// Renders a whole source unit to canonical source text.
#[must_use]
pub fn unparse(unit: &SourceUnit) -> String {
    let mut out = String::new();
    for declaration in &unit.declarations {
        write_declaration(&mut out, declaration);
        out.push('\n');
    }
    for comment in &unit.meta.trailing {
        let _ = writeln!(out, "# {}", comment.text);
    }
    out
}

/// Renders one expression to source text.
#[must_use]
pub fn unparse_expression(expression: &Expression) -> String {
    let mut out = String::new();
    write_expression(&mut out, expression);
    out
}

fn write_leading(out: &mut String, meta: &Meta, indent: usize) {
    for comment in &meta.leading {
        let _ = writeln!(out, "{:indent$}# {}", "", comment.text, indent = indent);
    }
}

fn write_trailing(out: &mut String, meta: &Meta) {
    for comment in &meta.trailing {
        let _ = write!(out, " # {}", comment.text);
    }
    out.push('\n');
}

fn write_declaration(out: &mut String, declaration: &Declaration) {
    write_leading(out, declaration.meta(), 0);
    match declaration {
        Declaration::Subroutine(sub) => {
            let _ = write!(out, "sub {} ", sub.name.name);
            write_block(out, &sub.body, 0);
            write_trailing(out, &sub.meta);
        }
        Declaration::Table(table) => write_table(out, table),
        Declaration::Acl(acl) => write_acl(out, acl),
        Declaration::Backend(backend) => write_backend(out, backend),
        Declaration::Director(director) => write_director(out, director),
        Declaration::Import(import) => {
            let _ = write!(out, "import {};", import.module.name);
            write_trailing(out, &import.meta);
        }
        Declaration::Include(include) => {
            let _ = write!(out, "include \"{}\";", include.path.value);
            write_trailing(out, &include.meta);
        }
    }
}

fn write_table(out: &mut String, table: &TableDecl) {
    let _ = write!(out, "table {}", table.name.name);
    if let Some(value_type) = &table.value_type {
        let _ = write!(out, " {}", value_type.name);
    }
    out.push_str(" {\n");
    for entry in &table.entries {
        let _ = write!(out, "  \"{}\": ", entry.key.value);
        write_expression(out, &entry.value);
        out.push_str(",\n");
    }
    out.push('}');
    write_trailing(out, &table.meta);
}

fn write_acl(out: &mut String, acl: &AclDecl) {
    let _ = writeln!(out, "acl {} {{", acl.name.name);
    for entry in &acl.entries {
        out.push_str("  ");
        if entry.negated {
            out.push('!');
        }
        let _ = write!(out, "\"{}\"", entry.address.value);
        if let Some(mask) = &entry.mask {
            let _ = write!(out, "/{}", mask.value);
        }
        out.push_str(";\n");
    }
    out.push('}');
    write_trailing(out, &acl.meta);
}

fn write_backend(out: &mut String, backend: &BackendDecl) {
    let _ = writeln!(out, "backend {} {{", backend.name.name);
    for property in &backend.properties {
        write_backend_property(out, property, 2);
    }
    out.push('}');
    write_trailing(out, &backend.meta);
}

fn write_backend_property(out: &mut String, property: &BackendProperty, indent: usize) {
    let _ = write!(out, "{:indent$}{} = ", "", property.name.name, indent = indent);
    match &property.value {
        BackendValue::Expression(value) => {
            write_expression(out, value);
            out.push_str(";\n");
        }
        BackendValue::Block(inner, _) => {
            out.push_str("{\n");
            for nested in inner {
                write_backend_property(out, nested, indent + 2);
            }
            let _ = writeln!(out, "{:indent$}}}", "", indent = indent);
        }
    }
}

fn write_director(out: &mut String, director: &DirectorDecl) {
    let _ = writeln!(out, "director {} {} {{", director.name.name, director.policy.name);
    for property in &director.properties {
        write_director_property(out, property, 2);
        out.push('\n');
    }
    for member in &director.backends {
        out.push_str("  {");
        for property in &member.properties {
            out.push(' ');
            write_director_property(out, property, 0);
        }
        out.push_str(" }\n");
    }
    out.push('}');
    write_trailing(out, &director.meta);
}

fn write_director_property(out: &mut String, property: &DirectorProperty, indent: usize) {
    let _ = write!(out, "{:indent$}{} = ", "", property.name.name, indent = indent);
    write_expression(out, &property.value);
    if property.percent {
        out.push('%');
    }
    out.push(';');
}

fn write_block(out: &mut String, block: &Block, indent: usize) {
    out.push('{');
    for comment in &block.meta.infix {
        let _ = write!(out, " # {}", comment.text);
    }
    out.push('\n');
    for statement in &block.statements {
        write_statement(out, statement, indent + 2);
    }
    let _ = write!(out, "{:indent$}}}", "", indent = indent);
}

fn write_statement(out: &mut String, statement: &Statement, indent: usize) {
    write_leading(out, statement.meta(), indent);
    let _ = write!(out, "{:indent$}", "", indent = indent);
    match statement {
        Statement::If(stmt) => {
            out.push_str("if (");
            write_expression(out, &stmt.condition);
            out.push_str(") ");
            write_block(out, &stmt.consequence, indent);
            for clause in &stmt.alternatives {
                out.push_str(" elsif (");
                write_expression(out, &clause.condition);
                out.push_str(") ");
                write_block(out, &clause.body, indent);
            }
            if let Some(alternative) = &stmt.alternative {
                out.push_str(" else ");
                write_block(out, alternative, indent);
            }
        }
        Statement::Set(stmt) => {
            let _ = write!(out, "set {} {} ", stmt.target.name, stmt.operator);
            write_expression(out, &stmt.value);
            out.push(';');
        }
        Statement::Unset(stmt) => {
            let _ = write!(out, "unset {};", stmt.target.name);
        }
        Statement::Add(stmt) => {
            let _ = write!(out, "add {} = ", stmt.target.name);
            write_expression(out, &stmt.value);
            out.push(';');
        }
        Statement::Call(stmt) => {
            let _ = write!(out, "call {};", stmt.subroutine.name);
        }
        Statement::Declare(stmt) => {
            let _ = write!(out, "declare local {} {};", stmt.name.name, stmt.type_name.name);
        }
        Statement::Return(stmt) => match &stmt.state {
            Some(state) => {
                let _ = write!(out, "return({});", state.name);
            }
            None => out.push_str("return;"),
        },
        Statement::Error(stmt) => {
            out.push_str("error");
            if let Some(code) = &stmt.code {
                out.push(' ');
                write_expression(out, code);
            }
            if let Some(response) = &stmt.response {
                out.push(' ');
                write_expression(out, response);
            }
            out.push(';');
        }
        Statement::Restart(_) => out.push_str("restart;"),
        Statement::Synthetic(stmt) => {
            if stmt.base64 {
                out.push_str("synthetic.base64 ");
            } else {
                out.push_str("synthetic ");
            }
            write_expression(out, &stmt.value);
            out.push(';');
        }
        Statement::Log(stmt) => {
            out.push_str("log ");
            write_expression(out, &stmt.value);
            out.push(';');
        }
        Statement::Goto(stmt) => {
            let _ = write!(out, "goto {};", stmt.destination.name);
        }
        Statement::GotoLabel(stmt) => {
            let _ = write!(out, "{}:", stmt.name);
        }
    }
    write_trailing(out, statement.meta());
}

fn write_expression(out: &mut String, expression: &Expression) {
    match expression {
        Expression::Ident(ident) => out.push_str(&ident.name),
        Expression::String(lit) => {
            if lit.long {
                let _ = write!(out, "{{\"{}\"}}", lit.value);
            } else {
                let _ = write!(out, "\"{}\"", lit.value);
            }
        }
        Expression::Integer(lit) => {
            let _ = write!(out, "{}", lit.value);
        }
        // Debug formatting keeps the decimal point on whole floats, so the
        // output re-lexes as a float.
        Expression::Float(lit) => {
            let _ = write!(out, "{:?}", lit.value);
        }
        Expression::Bool(lit) => {
            let _ = write!(out, "{}", lit.value);
        }
        Expression::RTime(lit) => out.push_str(&lit.literal),
        Expression::Prefix(prefix) => {
            let _ = write!(out, "{}", prefix.operator);
            write_expression(out, &prefix.right);
        }
        Expression::Infix(infix) => {
            write_expression(out, &infix.left);
            let _ = write!(out, " {} ", infix.operator);
            write_expression(out, &infix.right);
        }
        Expression::Call(call) => {
            let _ = write!(out, "{}(", call.function.name);
            for (i, argument) in call.arguments.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_expression(out, argument);
            }
            out.push(')');
        }
        Expression::Concat(concat) => {
            for (i, part) in concat.parts.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_expression(out, part);
            }
        }
        Expression::Group(group) => {
            out.push('(');
            write_expression(out, &group.inner);
            out.push(')');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::source_analysis::lex;

    fn roundtrip(source: &str) -> String {
        let unit = parse(lex(source).unwrap()).unwrap();
        unparse(&unit)
    }

    #[test]
    fn unparse_reparse_preserves_structure() {
        let source = "sub vcl_recv {\n  if (req.url ~ \"^/api\") {\n    set req.http.X = \"a\" req.http.B;\n    return(pass);\n  }\n  restart;\n}\n";
        let rendered = roundtrip(source);
        let original = parse(lex(source).unwrap()).unwrap();
        let reparsed = parse(lex(&rendered).unwrap()).unwrap();
        assert_eq!(original.declarations.len(), reparsed.declarations.len());
        // Canonical output is a fixpoint: unparse(parse(unparse(x))) == unparse(x).
        assert_eq!(rendered, unparse(&reparsed));
    }

    #[test]
    fn whole_float_keeps_decimal_point() {
        let rendered = roundtrip("sub vcl_recv { set req.http.X = 2.0; }");
        assert!(rendered.contains("2.0"), "got: {rendered}");
    }

    #[test]
    fn table_and_acl_roundtrip() {
        let source = "table t INTEGER {\n  \"max\": 10,\n}\nacl internal {\n  !\"10.0.0.0\"/8;\n}\n";
        let rendered = roundtrip(source);
        let reparsed = parse(lex(&rendered).unwrap()).unwrap();
        assert_eq!(rendered, unparse(&reparsed));
    }

    #[test]
    fn comments_render_without_duplication() {
        let rendered = roundtrip(
            "sub vcl_recv { # header\n  set req.http.A = \"1\"; # same line\n}",
        );
        assert_eq!(rendered.matches("header").count(), 1);
        assert_eq!(rendered.matches("same line").count(), 1);
    }
}
