//! catalog-fetch - runs the fetch layer's cache warmer
//!
//! With `--once` every enabled warming strategy runs a single time and the
//! results are printed as JSON. Otherwise the scheduler runs until Ctrl-C.

#![allow(missing_docs)]

use catalog_fetch::utils::logging::init_logging;
use catalog_fetch::{Config, FetchLayer, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "catalog-fetch", version, about = "Resilient catalog fetch layer")]
struct Args {
    /// YAML configuration file; defaults plus CATALOG_* variables when omitted
    #[arg(short, long, env = "CATALOG_CONFIG")]
    config: Option<PathBuf>,

    /// Run every enabled warming strategy once and exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::from_file(path).await?,
        None => Config::from_env()?,
    };
    init_logging(&config.logging)?;

    let build = catalog_fetch::build_info();
    info!(
        "catalog-fetch {} ({}) against {}",
        build.version, build.git_hash, config.upstream.base_url
    );

    let layer = FetchLayer::new(config)?;

    if args.once {
        let results = layer.warm_all().await?;
        println!("{}", serde_json::to_string_pretty(&results)?);
        layer.close();
        return Ok(());
    }

    layer.start();
    tokio::signal::ctrl_c().await?;

    info!("Received shutdown signal");
    layer.close();
    println!("{}", serde_json::to_string_pretty(&layer.get_warming_stats())?);
    Ok(())
}
