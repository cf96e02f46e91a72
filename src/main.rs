mod auth;
mod config;
mod error;
mod export;
mod graph;
mod pdf;
mod scan;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use graph::GraphClient;

/// Scan today's emails in one mail folder for PDF attachments containing the
/// "Not found" marker and write a summary spreadsheet.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Alternate config file (default: the per-user config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the folder display name from the config
    #[arg(long)]
    folder: Option<String>,

    /// Override the output spreadsheet path
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut cfg = config::load_config(args.config.as_deref())?;
    if let Some(folder) = args.folder {
        cfg.folder_name = folder;
    }

    let access_token = auth::sign_in(&cfg)?;
    let client = GraphClient::new(access_token);

    let results = scan::run(&client, &cfg)?;

    for result in &results {
        println!(
            "Email: {}, Time Sent: {}, Not Found: {}",
            result.email_name,
            result.time_sent,
            result.not_found_label()
        );
    }

    let output_path = args
        .output
        .unwrap_or_else(|| config::resolve_output_path(&cfg));
    export::save_results(&results, &output_path)?;

    Ok(())
}
