//! CLI commands implementation.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;

use crate::config::Settings;
use crate::models::{CollectionRequest, CollectionResult};
use crate::scrapers::{run_collection, ChromeSession};

#[derive(Parser)]
#[command(name = "mapscout")]
#[command(about = "Business listing acquisition from map search results")]
#[command(version)]
pub struct Cli {
    /// Configuration file
    #[arg(long, global = true, env = "MAPSCOUT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Collect business listings for a search term
    Scrape {
        /// Search term, e.g. "coffee roasters berlin"
        term: String,
        /// Number of results to collect
        #[arg(short, long, default_value = "20")]
        count: usize,
        /// Print records as JSON lines instead of a summary
        #[arg(long)]
        json: bool,
        /// Run the browser with a visible window (debugging)
        #[arg(long)]
        headful: bool,
    },

    /// Print the effective configuration
    Config,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Scrape {
            term,
            count,
            json,
            headful,
        } => scrape(settings, &term, count, json, headful).await,
        Commands::Config => {
            println!("{}", toml::to_string_pretty(&settings)?);
            Ok(())
        }
    }
}

async fn scrape(
    mut settings: Settings,
    term: &str,
    count: usize,
    json: bool,
    headful: bool,
) -> Result<()> {
    if headful {
        settings.browser.headless = false;
    }

    let request = CollectionRequest::new(term, count)?;
    let mut session = ChromeSession::new(
        settings.browser.clone(),
        settings.timing.clone(),
        settings.maps_url.clone(),
    );

    let result = run_collection(&mut session, &request, &settings.collector).await;

    if json {
        for record in &result.records {
            println!("{}", serde_json::to_string(record)?);
        }
    } else {
        print_summary(&result);
    }

    Ok(())
}

fn print_summary(result: &CollectionResult) {
    if result.is_empty() {
        println!("{}", style("No listings collected.").yellow());
        return;
    }

    println!(
        "{} {} listing(s) for query {}",
        style("Collected").green().bold(),
        result.len(),
        result.query_id
    );

    for (i, record) in result.records.iter().enumerate() {
        println!(
            "{:>3}. {}",
            i + 1,
            style(record.name.as_deref().unwrap_or("(unnamed)")).bold()
        );
        if let Some(ref address) = record.address {
            println!("     {}", address);
        }
        if let Some(ref phone) = record.phone_number {
            println!("     {}", phone);
        }
        if let Some(ref website) = record.website {
            println!("     {}", website);
        }
        match (record.reviews_count, record.reviews_average) {
            (Some(count), Some(average)) => {
                println!("     {:.1} stars ({} reviews)", average, count);
            }
            (Some(count), None) => println!("     {} reviews", count),
            (None, Some(average)) => println!("     {:.1} stars", average),
            (None, None) => {}
        }
    }
}
