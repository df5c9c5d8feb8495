mod config;
mod deals;
mod model;
mod output;
mod parser;
mod scraper;
mod utils;

use std::fs;
use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::filter::LevelFilter;

use config::load_config;
use deals::{
    filter_available_with_exemption, find_best_cumulative_deals, find_individual_best_deals,
};
use model::Catalog;
use output::{console, ResultsWorkbook};
use parser::TrovaParser;
use scraper::TrovaScraper;

#[derive(Debug, Parser)]
#[command(name = "tpscanner", about = "TrovaPrezzi deal scanner", version)]
struct Cli {
    /// Product listing URLs to scan.
    #[arg(
        short,
        long,
        num_args = 1..,
        required_unless_present = "file",
        conflicts_with = "file"
    )]
    url: Vec<String>,

    /// File with one URL per line, optionally followed by a quantity.
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Quantity to buy for each URL, in order (default 1 each).
    #[arg(short, long, num_args = 1..)]
    quantity: Vec<u32>,

    /// Logging level: debug, info, warning, error, critical or none.
    #[arg(short, long, default_value = "info")]
    level: String,

    /// Seconds to wait between URL scans, overriding the configured rate limit.
    #[arg(short, long)]
    wait: Option<u64>,

    /// Keep offers marked as not available.
    #[arg(long)]
    keep_unavailable: bool,

    /// Skip the console tables.
    #[arg(long)]
    no_console: bool,

    /// Skip the Excel workbook.
    #[arg(long)]
    no_excel: bool,

    /// Path of the JSON config file.
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,
}

struct ScanTarget {
    url: String,
    quantity: u32,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(level_filter(&cli.level))
        .init();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Config load error: {e}");
            return;
        }
    };
    let targets = match resolve_targets(&cli) {
        Ok(targets) => targets,
        Err(e) => {
            error!("{e}");
            return;
        }
    };
    let wait = cli.wait.unwrap_or(config.sleep_rate_limit);

    let scraper = match TrovaScraper::new(&config) {
        Ok(scraper) => scraper,
        Err(e) => {
            error!("Failed to build the HTTP client: {e}");
            return;
        }
    };
    let parser = match TrovaParser::new() {
        Ok(parser) => parser,
        Err(e) => {
            error!("Failed to build the listing parser: {e}");
            return;
        }
    };

    info!("Scanning the deals for each item.");
    let catalog = scan(&scraper, &parser, &targets, wait).await;
    if catalog.is_empty() {
        warn!("No product page could be scanned.");
        return;
    }
    if let Err(e) = catalog.validate() {
        error!("Scraped offers violate the engine contract: {e}");
        return;
    }

    let mut workbook = ResultsWorkbook::new();
    if !cli.no_excel {
        for (product, offers) in catalog.iter() {
            info!("Saving deals for `{product}`.");
            if let Err(e) = workbook.add_product_sheet(product, offers) {
                error!("Spreadsheet error: {e}");
                return;
            }
        }
    }

    let catalog = if cli.keep_unavailable {
        catalog
    } else {
        info!("Removing items marked as not available.");
        let trusted = config.trusted_sellers.clone();
        let (filtered, removed) = filter_available_with_exemption(&catalog, |seller| {
            trusted.iter().any(|marker| seller.contains(marker.as_str()))
        });
        info!("{removed} items removed.");
        filtered
    };

    info!("Finding best individual deals.");
    let individual = find_individual_best_deals(&catalog);
    info!("Found {} individual best deals.", individual.len());
    if !individual.is_empty() {
        if !cli.no_excel {
            if let Err(e) = workbook.add_best_individual_sheet(&individual) {
                error!("Spreadsheet error: {e}");
                return;
            }
        }
        if !cli.no_console {
            let title = format!("Best Individual Deals ({})", individual.len());
            println!("\n{}", console::render_individual_deals(&individual, &title));
        }
    }

    if catalog.product_count() > 1 {
        info!("Finding the best cumulative deals.");
        let cumulative = find_best_cumulative_deals(&catalog);
        info!("Found {} best deals.", cumulative.len());
        if !cli.no_excel {
            if let Err(e) = workbook.add_best_cumulative_sheet(&cumulative) {
                error!("Spreadsheet error: {e}");
                return;
            }
        }
        if !cli.no_console {
            let title = format!("Best Cumulative Deals ({})", cumulative.len());
            println!("\n{}", console::render_cumulative_deals(&cumulative, &title));
        }
    }

    if !cli.no_excel {
        if let Err(e) = fs::create_dir_all(&config.output_dir) {
            error!("Cannot create {}: {e}", config.output_dir.display());
            return;
        }
        let filename = format!("results_{}.xlsx", utils::timestamp_slug(Local::now()));
        let path = config.output_dir.join(filename);
        match workbook.save(&path) {
            Ok(()) => info!("Results saved to {}.", path.display()),
            Err(e) => {
                error!("Failed to save {}: {e}", path.display());
                return;
            }
        }
    }
    info!("Done.");
}

/// Scans every target sequentially: both listing variants are fetched, the
/// shipping-included best offer is merged in when the plain listing missed
/// it, and offers are sorted by unit price for reporting. A failed URL is
/// logged and skipped, it does not abort the remaining scans.
async fn scan(
    scraper: &TrovaScraper,
    parser: &TrovaParser,
    targets: &[ScanTarget],
    wait: u64,
) -> Catalog {
    let mut catalog = Catalog::new();
    for (i, target) in targets.iter().enumerate() {
        info!("Fetching offers from {}", target.url);
        let (listing_html, shipping_html) = match scraper.download_listing_pair(&target.url).await
        {
            Ok(pair) => pair,
            Err(e) => {
                warn!("Scraper error for {}: {e}", target.url);
                continue;
            }
        };

        let (name, mut offers) = match parser.parse_listing(&listing_html, target.quantity) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Parse error for {}: {e}", target.url);
                continue;
            }
        };
        match parser.parse_best_shipping_included(&shipping_html, target.quantity) {
            Ok((_, best)) => {
                if !offers.contains(&best) {
                    offers.push(best);
                }
            }
            Err(e) => warn!("No shipping-included best offer for `{name}`: {e}"),
        }

        offers.sort_by(|a, b| a.price.total_cmp(&b.price));
        info!("Found {} deals for `{name}`.", offers.len());
        catalog.insert(name, offers);

        // Politeness pause before the next page, not after the last one.
        if i + 1 < targets.len() {
            utils::rate_limit_sleep(wait).await;
        }
    }
    catalog
}

fn resolve_targets(cli: &Cli) -> Result<Vec<ScanTarget>, String> {
    if let Some(path) = &cli.file {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {}: {e}", path.display()))?;
        let mut targets = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut parts = line.split_whitespace();
            let Some(url) = parts.next() else { continue };
            let quantity = match parts.next() {
                Some(raw) => raw
                    .parse()
                    .map_err(|_| format!("Invalid quantity `{raw}` in {}", path.display()))?,
                None => 1,
            };
            targets.push(ScanTarget {
                url: url.to_string(),
                quantity,
            });
        }
        Ok(targets)
    } else {
        Ok(cli
            .url
            .iter()
            .enumerate()
            .map(|(i, url)| ScanTarget {
                url: url.clone(),
                quantity: cli.quantity.get(i).copied().unwrap_or(1),
            })
            .collect())
    }
}

/// Maps the CLI level names onto tracing's; `critical` folds into `error`,
/// unknown names fall back to `warn`.
fn level_filter(level: &str) -> LevelFilter {
    match level {
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warning" => LevelFilter::WARN,
        "error" | "critical" => LevelFilter::ERROR,
        "none" => LevelFilter::OFF,
        _ => LevelFilter::WARN,
    }
}
