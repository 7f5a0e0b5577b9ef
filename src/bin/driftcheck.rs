//! driftcheck — compare a live schema dump against migration history.
//!
//! # Usage
//!
//! ```bash
//! # Conventional supabase layout, informational report
//! driftcheck
//!
//! # Explicit paths, failing the run on any drift (for CI)
//! driftcheck --remote db/remote-schema.sql --migrations db/migrations --strict
//!
//! # Machine-readable output
//! driftcheck --format json
//! ```
//!
//! Exit codes: `0` clean (or drift without `--strict`), `1` drift under
//! `--strict`, `2` missing or unreadable input.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use colored::*;
use std::path::PathBuf;
use std::process::ExitCode;

use driftcheck::config::Config;
use driftcheck::extract::SchemaExtractor;
use driftcheck::reconcile::reconcile;
use driftcheck::replay::replay_migrations;
use driftcheck::{input, report};

#[derive(Parser)]
#[command(name = "driftcheck")]
#[command(version)]
#[command(about = "Detect drift between a live schema dump and migration files", long_about = None)]
#[command(after_help = "EXAMPLES:
    driftcheck
    driftcheck --remote db/remote-schema.sql --migrations db/migrations
    driftcheck --strict --format json")]
struct Cli {
    /// Path of the live schema dump
    #[arg(long)]
    remote: Option<PathBuf>,

    /// Directory of migration files
    #[arg(long)]
    migrations: Option<PathBuf>,

    /// Schema qualifying every object in the dump
    #[arg(long)]
    schema: Option<String>,

    /// Exit non-zero when any discrepancy is found
    #[arg(long, env = "DRIFTCHECK_STRICT")]
    strict: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    format: OutputFormat,

    /// Config file (defaults to ./driftcheck.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::discover()?,
    };
    if let Some(remote) = &cli.remote {
        config.remote_path = remote.clone();
    }
    if let Some(dir) = &cli.migrations {
        config.migrations_dir = dir.clone();
    }
    if let Some(schema) = &cli.schema {
        config.schema = schema.clone();
    }
    let strict = cli.strict || config.strict;

    let remote_sql = input::read_remote_schema(&config.remote_path)?;
    let migrations = input::read_migrations(&config.migrations_dir)?;

    if cli.verbose {
        println!(
            "{} {}",
            "Remote dump:".dimmed(),
            config.remote_path.display().to_string().yellow()
        );
        println!(
            "{} {} file(s) from {}",
            "Migrations:".dimmed(),
            migrations.len(),
            config.migrations_dir.display().to_string().yellow()
        );
        for migration in &migrations {
            println!("  {}", migration.name.dimmed());
        }
        println!();
    }

    let live = SchemaExtractor::new(&config.schema_prefix()).extract(&remote_sql);
    let texts: Vec<&str> = migrations.iter().map(|m| m.sql.as_str()).collect();
    let expected = replay_migrations(&texts);
    let result = reconcile(&live, &expected);

    match cli.format {
        OutputFormat::Json => println!("{}", report::to_json(&result)),
        OutputFormat::Table => report::print_text(&result),
    }

    if strict && result.has_differences() {
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}
