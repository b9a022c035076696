use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hikr_report::config::{DEFAULT_CONFIG_PATH, load_config, resolve_config_path};
use hikr_report::fetch::fetch_report_pages;
use hikr_report::harness::{HarnessOptions, run_harness};
use hikr_report::pipeline::{BatchOptions, ValidateOptions, process_archive, validate_config};
use hikr_report::report::extract_report;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hikr-report", about = "Structured field extraction for archived hikr.org reports")]
struct Cli {
    /// Defaults to configs/hikr.toml when that file exists.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Parse {
        file: PathBuf,
    },
    Batch {
        #[arg(long, default_value = "data/archive")]
        archive_dir: PathBuf,
        #[arg(long, default_value = "data/out/reports.json")]
        out: PathBuf,
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    Fetch {
        #[arg(required = true)]
        urls: Vec<String>,
        #[arg(long, default_value = "data/archive")]
        archive_dir: PathBuf,
    },
    Validate,
    Harness {
        #[arg(long, default_value = "data/archive")]
        archive_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();
    let config_path = resolve_config_path(cli.config, Path::new(DEFAULT_CONFIG_PATH));

    match cli.command {
        Commands::Parse { file } => {
            let config = load_config(config_path.as_deref())?;
            let bytes = std::fs::read(&file)
                .with_context(|| format!("failed to read report page {}", file.display()))?;
            let html = String::from_utf8_lossy(&bytes);
            let report = extract_report(&html, &file.display().to_string(), &config)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Batch {
            archive_dir,
            out,
            dry_run,
        } => {
            let config = load_config(config_path.as_deref())?;
            let summary = process_archive(
                &BatchOptions {
                    archive_dir,
                    out_path: out,
                    dry_run,
                },
                &config,
            )?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Fetch { urls, archive_dir } => {
            let config = load_config(config_path.as_deref())?;
            let pages = fetch_report_pages(&urls, &archive_dir, &config.fetch)?;
            info!(pages = pages.len(), "fetch complete");
        }
        Commands::Validate => {
            let messages = validate_config(&ValidateOptions {
                config_path,
            })?;
            for line in messages {
                println!("{line}");
            }
        }
        Commands::Harness { archive_dir } => {
            let config = load_config(config_path.as_deref())?;
            let report = run_harness(&HarnessOptions { archive_dir }, &config)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    Ok(())
}
