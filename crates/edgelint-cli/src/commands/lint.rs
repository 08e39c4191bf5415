// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `edgelint lint` — run the analyzer over VCL source files.
//!
//! Each `.vcl` file is lexed, parsed, and linted with a fresh context. The
//! two failure shapes stay distinct, as callers must be able to tell them
//! apart:
//!
//! - **could not parse** — one fatal report per file, rendered with source
//!   context; the file's lint pass is aborted;
//! - **parsed with findings** — the full diagnostic list is printed, and the
//!   command exits non-zero if any finding is error-severity.
//!
//! `edgelint check` is the parse-only half: it stops after the AST is
//! built.

use camino::Utf8PathBuf;
use edgelint_core::{Context, Severity, check_source};
use miette::{IntoDiagnostic, Result};
use tracing::info;

use crate::diagnostic::ReportDiagnostic;

/// Output format for lint diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output via miette (default).
    #[default]
    Text,
    /// Machine-readable JSON (one object per line).
    Json,
}

/// Runs the linter on the given path (file or directory).
///
/// Prints each diagnostic and returns an error if any file fails to parse
/// or produces an error-severity finding. With a snippet snapshot, every
/// file joins the snapshot's rendered fragments in one combined pass, so
/// references into provider-hosted tables/ACLs/backends resolve.
pub fn run_lint(
    path: &str,
    strict: bool,
    format: OutputFormat,
    snippets: Option<&str>,
) -> Result<()> {
    if let Some(snapshot_path) = snippets {
        return run_lint_with_snippets(path, strict, format, snapshot_path);
    }

    let source_files = collect_source_files(path)?;
    let mut error_count = 0usize;
    let mut finding_count = 0usize;

    for file in &source_files {
        let source = std::fs::read_to_string(file)
            .into_diagnostic()
            .map_err(|e| miette::miette!("failed to read '{file}': {e}"))?;

        let mut context = Context::new();
        let diagnostics = match check_source(&source, &mut context, strict) {
            Ok(diagnostics) => diagnostics,
            Err(fatal) => {
                // Could not parse: one fatal report, nothing linted.
                let report = miette::Report::new(fatal)
                    .with_source_code(miette::NamedSource::new(file.as_str(), source.clone()));
                eprintln!("{report:?}");
                error_count += 1;
                continue;
            }
        };

        info!(file = %file, findings = diagnostics.len(), "linted");
        for diagnostic in &diagnostics {
            if diagnostic.severity == Severity::Error {
                error_count += 1;
            }
            match format {
                OutputFormat::Text => {
                    let report = ReportDiagnostic::from_core(diagnostic, file.as_str(), &source);
                    eprintln!("{:?}", miette::Report::new(report));
                }
                OutputFormat::Json => {
                    let json = serde_json::json!({
                        "file": file.as_str(),
                        "severity": diagnostic.severity.to_string(),
                        "rule": diagnostic.rule.name(),
                        "message": diagnostic.message.as_str(),
                        "span_start": diagnostic.span.start(),
                        "span_end": diagnostic.span.end(),
                    });
                    println!("{json}");
                }
            }
        }
        finding_count += diagnostics.len();
    }

    if error_count > 0 {
        let files_checked = source_files.len();
        miette::bail!("{error_count} error(s) among {finding_count} finding(s) in {files_checked} file(s)");
    }

    Ok(())
}

/// Lints local sources together with a pre-fetched service snapshot as one
/// combined pass.
fn run_lint_with_snippets(
    path: &str,
    strict: bool,
    format: OutputFormat,
    snapshot_path: &str,
) -> Result<()> {
    let snapshot = crate::snippet::ServiceSnapshot::load(snapshot_path)?;
    let mut set = crate::snippet::SnippetSet::fetch(&snapshot, 0)?;

    for file in collect_source_files(path)? {
        let source = std::fs::read_to_string(&file)
            .into_diagnostic()
            .map_err(|e| miette::miette!("failed to read '{file}': {e}"))?;
        set.push_source(source);
    }

    let combined = set.combined_source();
    let diagnostics = match set.check(strict) {
        Ok(diagnostics) => diagnostics,
        Err(fatal) => {
            let report = miette::Report::new(fatal)
                .with_source_code(miette::NamedSource::new("<combined>", combined));
            eprintln!("{report:?}");
            miette::bail!("combined snippet pass failed to parse");
        }
    };

    let mut error_count = 0usize;
    for diagnostic in &diagnostics {
        if diagnostic.severity == Severity::Error {
            error_count += 1;
        }
        match format {
            OutputFormat::Text => {
                let report = ReportDiagnostic::from_core(diagnostic, "<combined>", &combined);
                eprintln!("{:?}", miette::Report::new(report));
            }
            OutputFormat::Json => {
                let json = serde_json::json!({
                    "file": "<combined>",
                    "severity": diagnostic.severity.to_string(),
                    "rule": diagnostic.rule.name(),
                    "message": diagnostic.message.as_str(),
                    "span_start": diagnostic.span.start(),
                    "span_end": diagnostic.span.end(),
                });
                println!("{json}");
            }
        }
    }

    if error_count > 0 {
        miette::bail!(
            "{error_count} error(s) among {} finding(s) in the combined pass",
            diagnostics.len()
        );
    }
    Ok(())
}

/// Runs the parse-only check on the given path.
pub fn run_check(path: &str) -> Result<()> {
    let source_files = collect_source_files(path)?;
    let mut failed = 0usize;

    for file in &source_files {
        let source = std::fs::read_to_string(file)
            .into_diagnostic()
            .map_err(|e| miette::miette!("failed to read '{file}': {e}"))?;

        let parsed = edgelint_core::source_analysis::lex(&source)
            .map_err(edgelint_core::SourceError::from)
            .and_then(|tokens| {
                edgelint_core::parser::parse(tokens).map_err(edgelint_core::SourceError::from)
            });

        if let Err(fatal) = parsed {
            let report = miette::Report::new(fatal)
                .with_source_code(miette::NamedSource::new(file.as_str(), source));
            eprintln!("{report:?}");
            failed += 1;
        }
    }

    if failed > 0 {
        miette::bail!("{failed} file(s) failed to parse");
    }
    Ok(())
}

/// Collects `.vcl` source files from a file or directory path.
fn collect_source_files(path: &str) -> Result<Vec<Utf8PathBuf>> {
    let source_path = Utf8PathBuf::from(path);

    let files = if source_path.is_file() {
        if source_path.extension() == Some("vcl") {
            vec![source_path]
        } else {
            miette::bail!("file '{path}' is not a .vcl source file");
        }
    } else if source_path.is_dir() {
        collect_from_dir(&source_path)?
    } else {
        miette::bail!("path '{path}' does not exist");
    };

    if files.is_empty() {
        miette::bail!("no .vcl source files found in '{path}'");
    }
    Ok(files)
}

/// Recursively collects `.vcl` files under a directory, sorted for
/// deterministic output order.
fn collect_from_dir(dir: &Utf8PathBuf) -> Result<Vec<Utf8PathBuf>> {
    let mut files = Vec::new();
    let entries = std::fs::read_dir(dir)
        .into_diagnostic()
        .map_err(|e| miette::miette!("failed to read directory '{dir}': {e}"))?;

    for entry in entries {
        let entry = entry.into_diagnostic()?;
        let path = Utf8PathBuf::from_path_buf(entry.path())
            .map_err(|p| miette::miette!("non-UTF-8 path: {}", p.display()))?;
        if path.is_dir() {
            files.extend(collect_from_dir(&path)?);
        } else if path.extension() == Some("vcl") {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
