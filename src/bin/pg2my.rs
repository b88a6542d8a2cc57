//! pg2my — port a Drizzle ORM project from PostgreSQL to MySQL.
//!
//! # Usage
//!
//! ```bash
//! # Convert the schema files
//! pg2my schema
//!
//! # Rewrite .returning() call sites, reporting only
//! pg2my returning server/db.ts --dry-run
//!
//! # Run every stage in order
//! pg2my all
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use pg2my::prelude::*;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "pg2my")]
#[command(version = "0.3.0")]
#[command(about = "Port a Drizzle ORM project from PostgreSQL to MySQL", long_about = None)]
#[command(after_help = "EXAMPLES:
    pg2my schema
    pg2my returning server/db.ts --dry-run
    pg2my all")]
struct Cli {
    /// Don't write anything, just report what would change
    #[arg(short = 'n', long, global = true)]
    dry_run: bool,

    /// Downgrade residual .returning() occurrences from error to warning
    #[arg(long, global = true)]
    allow_residual: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite schema vocabulary from pg-core to mysql-core
    Schema { files: Vec<PathBuf> },
    /// Drop the column-name argument from enum use-sites
    Enums { files: Vec<PathBuf> },
    /// Replace .returning() call sites with mutation-then-select
    Returning { files: Vec<PathBuf> },
    /// Shorten over-length constraint names in generated DDL
    Constraints { files: Vec<PathBuf> },
    /// Run every stage in order against the configured file sets
    All,
}

fn main() {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(0) => {}
        Ok(_) => process::exit(1),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            process::exit(1);
        }
    }
}

/// Load configuration and dispatch the requested stage(s). Returns the
/// number of files that failed.
fn run(cli: &Cli) -> anyhow::Result<usize> {
    let config = Config::load().context("failed to load pg2my.toml")?;

    let options = RunOptions {
        dry_run: cli.dry_run,
        residual_policy: if cli.allow_residual {
            ResidualPolicy::Warn
        } else {
            config.returning.on_residual
        },
    };

    let failed = match &cli.command {
        Commands::Schema { files } => {
            run_stage(Stage::Schema, files, &config.files.schema, options)
        }
        Commands::Enums { files } => run_stage(Stage::Enums, files, &config.files.schema, options),
        Commands::Returning { files } => {
            run_stage(Stage::Returning, files, &config.files.queries, options)
        }
        Commands::Constraints { files } => {
            run_stage(Stage::Constraints, files, &config.files.ddl, options)
        }
        Commands::All => {
            let mut failed = 0;
            failed += run_stage(Stage::Schema, &[], &config.files.schema, options);
            failed += run_stage(Stage::Enums, &[], &config.files.schema, options);
            failed += run_stage(Stage::Returning, &[], &config.files.queries, options);
            failed += run_stage(Stage::Constraints, &[], &config.files.ddl, options);
            failed
        }
    };

    Ok(failed)
}

/// Run one stage over the given files (or the configured fallback set),
/// print per-file results, and return how many files failed.
fn run_stage(stage: Stage, files: &[PathBuf], fallback: &[String], options: RunOptions) -> usize {
    let paths: Vec<PathBuf> = if files.is_empty() {
        fallback.iter().map(PathBuf::from).collect()
    } else {
        files.to_vec()
    };

    if paths.is_empty() {
        println!(
            "{} {}: no files configured, skipping",
            "→".dimmed(),
            stage.name()
        );
        return 0;
    }

    println!("{} {}", "Stage:".cyan().bold(), stage.name());

    let mut failed = 0;
    let mut total = 0;
    for report in run_batch(stage, &paths, options) {
        match report.outcome {
            Ok(stats) => {
                total += stats.changes;
                println!(
                    "  {} {}: {} {}",
                    "✓".green(),
                    report.path.display(),
                    stats.changes,
                    stage.unit()
                );
                if stats.residual > 0 {
                    println!(
                        "    {} {} .returning() call(s) left unmatched",
                        "⚠".yellow(),
                        stats.residual
                    );
                }
            }
            Err(e) => {
                println!("  {} {}", "✗".red(), e.to_string().red());
                failed += 1;
            }
        }
    }

    let verb = if options.dry_run { "Would rewrite" } else { "Rewrote" };
    println!("{} {} {} total\n", verb.dimmed(), total, stage.unit());
    failed
}
