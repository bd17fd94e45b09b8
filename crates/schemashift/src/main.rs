//! schemashift CLI
//!
//! Command-line tool for planning migrations between schema snapshots.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use schemashift::dialect;
use schemashift::options::{DEFAULT_RENAME_THRESHOLD, DEFAULT_SCHEMA};
use schemashift::prelude::*;

/// Schema diff and migration planning.
#[derive(Parser)]
#[command(name = "schemashift")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Old schema snapshot (JSON).
    #[arg(long, env = "SCHEMASHIFT_OLD")]
    old: PathBuf,

    /// New schema snapshot (JSON).
    #[arg(long, env = "SCHEMASHIFT_NEW")]
    new: PathBuf,

    /// SQL dialect (ansi, postgres, mysql, sqlite).
    #[arg(short, long, env = "SCHEMASHIFT_DIALECT", default_value = "ansi")]
    dialect: String,

    /// Schema name used to qualify tables.
    #[arg(short, long, env = "SCHEMASHIFT_SCHEMA", default_value = DEFAULT_SCHEMA)]
    schema: String,

    /// Minimum similarity for rename detection.
    #[arg(long, env = "SCHEMASHIFT_RENAME_THRESHOLD", default_value_t = DEFAULT_RENAME_THRESHOLD)]
    rename_threshold: f64,

    /// Report tables and columns missing from the new snapshot as drops.
    #[arg(long, env = "SCHEMASHIFT_INCLUDE_DROPS")]
    include_drops: bool,

    /// Skip rollback generation.
    #[arg(long)]
    no_rollback: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the reviewer report.
    Report,

    /// Print migration SQL.
    Sql {
        /// Print rollback SQL instead of forward SQL.
        #[arg(short, long)]
        reverse: bool,

        /// Allow printing forward SQL that drops tables or columns.
        #[arg(long, env = "SCHEMASHIFT_ALLOW_DESTRUCTIVE")]
        allow_destructive: bool,
    },

    /// Print the plan as JSON.
    Plan {
        /// Pretty-print the JSON.
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let old = Schema::load(&cli.old)
        .with_context(|| format!("loading old snapshot {}", cli.old.display()))?;
    let new = Schema::load(&cli.new)
        .with_context(|| format!("loading new snapshot {}", cli.new.display()))?;
    debug!(
        old_tables = old.tables.len(),
        new_tables = new.tables.len(),
        "Loaded snapshots"
    );

    let allow_destructive = matches!(
        cli.command,
        Commands::Sql {
            allow_destructive: true,
            ..
        }
    );
    let options = DiffOptions::new()
        .with_include_drops(cli.include_drops)
        .with_rollback(!cli.no_rollback)
        .with_schema_name(cli.schema)
        .with_rename_threshold(cli.rename_threshold)
        .with_allow_destructive(allow_destructive);

    let dialect = dialect::from_name(&cli.dialect)?;
    let plan = plan_migration(&old, &new, &options, dialect.as_ref())?;

    match cli.command {
        Commands::Report => {
            print!("{}", format_migration_report(&plan));
        }

        Commands::Sql { reverse: true, .. } => {
            let Some(rollback) = &plan.rollback_sql else {
                bail!("rollback generation is disabled (--no-rollback)");
            };
            println!("{rollback}");
        }

        Commands::Sql { reverse: false, .. } => {
            if plan.has_destructive_changes() && !options.allow_destructive {
                bail!(
                    "the plan drops tables or columns; rerun with --allow-destructive to print it"
                );
            }
            println!("{}", plan.forward_sql);
        }

        Commands::Plan { pretty } => {
            let json = if pretty {
                serde_json::to_string_pretty(&plan)?
            } else {
                serde_json::to_string(&plan)?
            };
            println!("{json}");
        }
    }

    Ok(())
}
