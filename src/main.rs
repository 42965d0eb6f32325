//! Object Storage Credentials CLI
//!
//! Applies an object storage configuration to a rendered workload manifest
//! and prints the amended manifest.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use objstore_credentials::{Options, Workload};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Wire object storage credentials into a Deployment or StatefulSet manifest
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Workload manifest (single YAML document)
    #[arg(long, env = "WORKLOAD_FILE")]
    workload: PathBuf,

    /// Storage options (YAML)
    #[arg(long, env = "STORAGE_OPTIONS_FILE")]
    options: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

// =============================================================================
// Main
// =============================================================================

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(&args);

    info!(
        version = objstore_credentials::VERSION,
        workload = %args.workload.display(),
        options = %args.options.display(),
        "Configuring object storage"
    );

    let options_doc = std::fs::read_to_string(&args.options)
        .with_context(|| format!("reading storage options {}", args.options.display()))?;
    let opts: Options = serde_yaml::from_str(&options_doc)
        .with_context(|| format!("parsing storage options {}", args.options.display()))?;

    let workload_doc = std::fs::read_to_string(&args.workload)
        .with_context(|| format!("reading workload {}", args.workload.display()))?;
    let mut workload = Workload::from_yaml(&workload_doc)
        .with_context(|| format!("parsing workload {}", args.workload.display()))?;

    workload.configure(&opts)?;

    print!("{}", workload.to_yaml()?);
    Ok(())
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // stdout carries the manifest
    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
