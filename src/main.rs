//! Archive-Scout main entry point
//!
//! This is the command-line interface for the Archive-Scout listing crawler.

use anyhow::Context;
use archive_scout::catalog::Catalog;
use archive_scout::config::{load_config_with_hash, Config};
use archive_scout::crawler::{self, RelayClient, SearchHit};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Archive-Scout: finds archives in relayed directory listings
///
/// Archive-Scout crawls web-server directory listings for each configured
/// platform category, fetching every page through a ranked list of relay
/// endpoints, and prints the matching files it finds.
#[derive(Parser, Debug)]
#[command(name = "archive-scout")]
#[command(version = "1.0.0")]
#[command(about = "Finds archives in relayed directory listings", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Search only this category id (e.g., "gba"); all categories otherwise
    #[arg(short, long)]
    category: Option<String>,

    /// Keep only files whose name contains this text (case-insensitive)
    #[arg(short, long, default_value = "")]
    query: String,

    /// Try every relay endpoint against URL and report how each behaves
    #[arg(long, value_name = "URL", conflicts_with_all = ["fetch", "dry_run"])]
    check_relays: Option<String>,

    /// Fetch a single file through the relays instead of searching
    #[arg(long, value_name = "URL", requires = "output", conflicts_with = "dry_run")]
    fetch: Option<String>,

    /// Where to write the file retrieved with --fetch
    #[arg(short, long, value_name = "PATH", requires = "fetch")]
    output: Option<PathBuf>,

    /// Validate config and show what would be searched without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match load_config_with_hash(path) {
                Ok((config, hash)) => {
                    tracing::info!("Configuration loaded successfully (hash: {})", hash);
                    config
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => {
            tracing::info!("No configuration file given, using built-in defaults");
            Config::default()
        }
    };

    if let Some(url) = &cli.check_relays {
        handle_check_relays(&config, url).await?;
    } else if let (Some(url), Some(output)) = (&cli.fetch, &cli.output) {
        handle_fetch(&config, url, output).await?;
    } else if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_search(&config, cli.category.as_deref(), &cli.query).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("archive_scout=info,warn"),
            1 => EnvFilter::new("archive_scout=debug,info"),
            2 => EnvFilter::new("archive_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles the --dry-run mode: shows relays and categories
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let catalog = Catalog::from_config(config).context("building category catalog")?;

    println!("=== Archive-Scout Dry Run ===\n");

    println!("Relay Endpoints ({}):", config.relay.endpoints.len());
    for (idx, entry) in config.relay.endpoints.iter().enumerate() {
        let endpoint = entry.to_endpoint();
        println!(
            "  {}. {} ({:?})",
            idx + 1,
            endpoint.template(),
            endpoint.style()
        );
    }
    println!(
        "  Listing timeout: {}ms, file timeout: {}ms",
        config.relay.listing_timeout_ms, config.relay.file_timeout_ms
    );

    println!("\nCrawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Descent delay: {}ms", config.crawler.descent_delay_ms);
    println!(
        "  Max links per listing: {}",
        config.crawler.max_links_per_listing
    );

    println!("\nCategories ({}):", catalog.len());
    let mut configured = 0;
    for category in catalog.iter() {
        match category.root_url() {
            Some(root) => {
                configured += 1;
                println!("  - {} [{}] {}", category.label, category.id, root);
            }
            None => println!("  - {} [{}] (no root URL)", category.label, category.id),
        }
        println!("    extensions: {}", category.extensions().join(", "));
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would search {} configured categories", configured);

    Ok(())
}

/// Handles the default mode: searches one or all categories
async fn handle_search(config: &Config, category: Option<&str>, query: &str) -> anyhow::Result<()> {
    let outcomes = crawler::search(config, category, query)
        .await
        .context("setting up search")?;

    let unconfigured: Vec<&str> = outcomes
        .iter()
        .filter(|(_, outcome)| outcome.is_unconfigured())
        .map(|(id, _)| id.as_str())
        .collect();
    if unconfigured.len() == outcomes.len() {
        match category {
            Some(id) => anyhow::bail!(
                "no root URL configured for {}; add it under [roots] as {} = \"...\"",
                id,
                id
            ),
            None => {
                anyhow::bail!("no category has a root URL configured; see [roots] in the config")
            }
        }
    }
    if !unconfigured.is_empty() {
        tracing::warn!("Skipped unconfigured categories: {}", unconfigured.join(", "));
    }

    let hits: Vec<SearchHit> = outcomes
        .into_iter()
        .flat_map(|(_, outcome)| outcome.into_hits())
        .collect();

    print_hits(&hits);
    tracing::info!("{} matching files", hits.len());

    Ok(())
}

/// Prints one line per hit: category, name, size, URL
fn print_hits(hits: &[SearchHit]) {
    for hit in hits {
        let size = hit
            .entry
            .size_bytes
            .map(format_size)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "[{}] {}  {}  {}",
            hit.category_label, hit.entry.display_name, size, hit.entry.download_url
        );
    }
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// Handles the --check-relays mode: probes each relay endpoint
async fn handle_check_relays(config: &Config, url: &str) -> anyhow::Result<()> {
    let relay = RelayClient::from_config(&config.relay).context("building relay client")?;

    println!("Probing {} relays with {}\n", relay.endpoints().len(), url);
    let reports = relay.probe(url).await;
    for (idx, report) in reports.iter().enumerate() {
        let mark = if report.outcome.is_accepted() { "✓" } else { "✗" };
        println!(
            "  {} {}. {}: {}",
            mark,
            idx + 1,
            report.endpoint.template(),
            report.outcome.summary()
        );
    }

    let working = reports.iter().filter(|r| r.outcome.is_accepted()).count();
    println!("\n{} of {} relays returned a usable listing", working, reports.len());

    Ok(())
}

/// Handles the --fetch mode: downloads one file through the relays
async fn handle_fetch(config: &Config, url: &str, output: &std::path::Path) -> anyhow::Result<()> {
    let relay = RelayClient::from_config(&config.relay).context("building relay client")?;

    let file = relay
        .fetch_file(url)
        .await
        .with_context(|| format!("every relay failed to fetch {}", url))?;

    tokio::fs::write(output, &file.bytes)
        .await
        .with_context(|| format!("writing {}", output.display()))?;

    println!(
        "✓ Saved {} ({}) via {}",
        output.display(),
        format_size(file.bytes.len() as u64),
        file.endpoint.template()
    );

    Ok(())
}
