mod cli;
mod commands;
mod config;
mod engine;
mod progress;
mod resource;
mod schema;
mod ui;

use anyhow::Result;
use axonapi::ErrorCategory;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{ApiOverrides, Cli, Command};
use colored::Colorize;
use std::io;
use std::path::PathBuf;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    /// Explicit `--config` path
    pub config: Option<PathBuf>,
    /// Connection settings from flags and environment
    pub api: ApiOverrides,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    if let Err(err) = run(cli) {
        eprintln!("{} {err:#}", "Error:".red().bold());
        if let Some(category) = error_category(&err) {
            eprintln!(
                "  {} {}: {}",
                "→".dimmed(),
                category.description(),
                category.advice()
            );
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        config: cli.config,
        api: cli.api,
    };

    match cli.command {
        Command::Apply(args) => commands::apply::run(&ctx, args),
        Command::Diff(args) => commands::apply::diff(&ctx, args),
        Command::List { kind } => commands::remote::list(&ctx, kind),
        Command::Delete { kind, name, yes } => commands::remote::delete(&ctx, kind, &name, yes),
        Command::Check => commands::check::run(&ctx),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "axonctl", &mut io::stdout());
            Ok(())
        }
    }
}

/// Category of the first AxonOps API error in the chain
fn error_category(err: &anyhow::Error) -> Option<ErrorCategory> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<axonapi::Error>())
        .map(axonapi::Error::category)
}
