//! dbfixture CLI - dataset export and replay for build-time fixtures.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{info, Level};

use dbfixture::{run_export, run_operation, Config, DatasetFormat, FixtureError};

#[derive(Parser)]
#[command(name = "dbfixture")]
#[command(about = "Export database contents as dataset files and replay them")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "dbfixture.yaml")]
    config: PathBuf,

    /// Output JSON summary to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a dataset file from the database
    Export {
        /// Override the destination path
        #[arg(long)]
        dest: Option<PathBuf>,

        /// Override the dataset format (xml, flat, csv, dtd)
        #[arg(long)]
        format: Option<String>,

        /// Skip the export entirely
        #[arg(long)]
        skip: bool,
    },

    /// Apply dataset files to the database
    Operation {
        /// Override the operation type (INSERT, CLEAN_INSERT, ...)
        #[arg(long = "type")]
        op_type: Option<String>,

        /// Override the dataset format (xml, flat, csv)
        #[arg(long)]
        format: Option<String>,

        /// Dataset source files, replacing the configured list
        #[arg(long = "source")]
        sources: Vec<PathBuf>,

        /// Apply each source inside one transaction
        #[arg(long)]
        transaction: bool,

        /// Truncate every table before applying sources
        #[arg(long)]
        clear_all_tables: bool,

        /// Skip the operation entirely
        #[arg(long)]
        skip: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), FixtureError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format)
        .map_err(FixtureError::Config)?;

    let config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    match cli.command {
        Commands::Export { dest, format, skip } => {
            let mut export = config.export.clone().ok_or_else(|| {
                FixtureError::Config("configuration has no export section".into())
            })?;

            if let Some(dest) = dest {
                export.dest = dest;
            }
            if let Some(format) = format {
                export.format = format.parse::<DatasetFormat>()?;
            }
            if skip {
                export.skip = true;
            }

            let summary = run_export(&config.connection, &export).await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else if summary.skipped {
                println!("Export skipped");
            } else {
                println!("Export completed!");
                println!("  Tables: {}", summary.tables_exported);
                println!("  Dest: {}", summary.dest.display());
                println!("  Duration: {:.2}s", summary.duration_seconds);
            }
        }

        Commands::Operation {
            op_type,
            format,
            sources,
            transaction,
            clear_all_tables,
            skip,
        } => {
            let mut operation = config.operation.clone().ok_or_else(|| {
                FixtureError::Config("configuration has no operation section".into())
            })?;

            if let Some(op_type) = op_type {
                operation.r#type = op_type;
            }
            if let Some(format) = format {
                operation.format = format.parse::<DatasetFormat>()?;
            }
            if !sources.is_empty() {
                operation.src = None;
                operation.sources = sources;
            }
            if transaction {
                operation.transaction = true;
            }
            if clear_all_tables {
                operation.clear_all_tables = true;
            }
            if skip {
                operation.skip = true;
            }

            let summary = run_operation(&config.connection, &operation).await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else if summary.skipped {
                println!("Operation {} skipped", summary.op_type);
            } else {
                println!("Operation {} completed!", summary.op_type);
                println!("  Sources: {}", summary.sources_applied);
                println!("  Rows affected: {}", summary.rows_affected);
                println!("  Duration: {:.2}s", summary.duration_seconds);
            }
        }
    }

    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}
