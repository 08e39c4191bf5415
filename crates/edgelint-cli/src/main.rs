// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! edgelint command-line interface.
//!
//! This is the main entry point for the `edgelint` command.

use clap::{Parser, Subcommand};
use miette::Result;

mod commands;
mod diagnostic;
mod snippet;

/// edgelint: a static analyzer for VCL edge configurations
#[derive(Debug, Parser)]
#[command(name = "edgelint")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Lint VCL source files and report diagnostics
    Lint {
        /// Source file or directory to lint
        #[arg(default_value = ".")]
        path: String,

        /// Raise advisory checks (unused locals, ineffective suppressions)
        #[arg(long)]
        strict: bool,

        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: commands::lint::OutputFormat,

        /// JSON snapshot of provider-hosted dictionaries/ACLs/backends to
        /// render as fragments and lint together with the sources
        #[arg(long)]
        snippets: Option<String>,
    },

    /// Check that VCL source files parse, without semantic analysis
    Check {
        /// Source file or directory to check
        #[arg(default_value = ".")]
        path: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Install miette's fancy error handler
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Lint {
            path,
            strict,
            format,
            snippets,
        } => commands::lint::run_lint(&path, strict, format, snippets.as_deref()),
        Command::Check { path } => commands::lint::run_check(&path),
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("{e:?}");
            std::process::exit(1);
        }
    }
}
