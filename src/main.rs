//! MySQL Export Tool
//!
//! Dumps MySQL databases via mysqldump and optionally compresses or archives
//! each resulting file.

// mysqlexport/src/main.rs
mod config;
mod errors;
mod export;
mod utils;

use anyhow::{Context, Result};
use config::ExportOptions;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

/// Main entry point for the export tool
#[tokio::main]
async fn main() -> ExitCode {
    match run_app().await {
        Ok(_) => {
            println!("✅ Export completed successfully.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Error: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_app() -> Result<()> {
    // Config path may be given as the first argument; defaults to config.json
    // next to the executable or the project root when running via `cargo run`.
    let args: Vec<String> = env::args().collect();
    let config_path = if args.len() > 1 {
        PathBuf::from(args[1].trim())
    } else {
        PathBuf::from("config.json")
    };

    let options = ExportOptions::load_from_json(&config_path).with_context(|| {
        format!(
            "Failed to load export configuration from {}",
            config_path.display()
        )
    })?;

    println!("🚀 Starting MySQL export to {}", options.dest.display());
    export::run_export_flow(options).await
}
