//! llms-txt-monitor main entry point
//!
//! This is the command-line interface for the llms.txt site monitor.

use anyhow::Context;
use clap::Parser;
use llms_txt_monitor::config::{load_config, Config};
use llms_txt_monitor::crawler::{BrowserlessRenderer, CsrRenderer, Crawler, NoopRenderer};
use llms_txt_monitor::output::{print_statistics, write_llms_txt};
use llms_txt_monitor::snapshot::{Monitor, SnapshotService};
use llms_txt_monitor::storage::SqliteStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

type Service = SnapshotService<Crawler, SqliteStore>;

/// llms-txt-monitor: keeps llms.txt inventories of websites up to date
///
/// Crawls each monitored site within its host, fingerprints every page and
/// script, stores each crawl as a snapshot and reports added, removed and
/// modified URLs. Without a mode flag it re-crawls every site periodically
/// until interrupted.
#[derive(Parser, Debug)]
#[command(name = "llms-txt-monitor")]
#[command(version)]
#[command(about = "Keeps llms.txt inventories of websites up to date", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Crawl a site once and print what changed since its last snapshot
    #[arg(long, value_name = "URL", conflicts_with_all = ["fresh", "print", "stats", "dry_run"])]
    crawl: Option<String>,

    /// Delete every snapshot of a site and crawl it from scratch
    #[arg(long, value_name = "URL", conflicts_with_all = ["crawl", "print", "stats", "dry_run"])]
    fresh: Option<String>,

    /// Print the llms.txt of the latest snapshot of a site
    #[arg(long, value_name = "URL", conflicts_with_all = ["crawl", "fresh", "stats", "dry_run"])]
    print: Option<String>,

    /// Write the --print output to a file instead of stdout
    #[arg(long, value_name = "PATH", requires = "print")]
    output: Option<PathBuf>,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["crawl", "fresh", "print", "dry_run"])]
    stats: bool,

    /// Validate config and show what would be monitored without crawling
    #[arg(long, conflicts_with_all = ["crawl", "fresh", "print", "stats"])]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let service = Arc::new(build_service(&config)?);

    if let Some(url) = cli.crawl {
        handle_crawl(&service, &url).await
    } else if let Some(url) = cli.fresh {
        handle_fresh(&service, &url).await
    } else if let Some(url) = cli.print {
        handle_print(&service, &url, cli.output.as_deref())
    } else if cli.stats {
        handle_stats(&service, &config)
    } else {
        handle_monitor(service, &config).await;
        Ok(())
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("llms_txt_monitor=info,warn"),
            1 => EnvFilter::new("llms_txt_monitor=debug,info"),
            2 => EnvFilter::new("llms_txt_monitor=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the crawler, renderer and store described by the configuration
fn build_service(config: &Config) -> anyhow::Result<Service> {
    let renderer: Arc<dyn CsrRenderer> = match &config.renderer {
        Some(renderer) => {
            tracing::info!("Client-side rendering via {}", renderer.browserless_url);
            Arc::new(
                BrowserlessRenderer::new(
                    &renderer.browserless_url,
                    renderer.token.as_deref(),
                    renderer.timeout(),
                )
                .context("Failed to build renderer HTTP client")?,
            )
        }
        None => Arc::new(NoopRenderer),
    };

    let crawler = Crawler::new(config.crawler.limits(), renderer)
        .context("Failed to build crawler HTTP client")?;

    let store = SqliteStore::new(Path::new(&config.output.database_path)).with_context(|| {
        format!("Failed to open database {}", config.output.database_path)
    })?;

    Ok(SnapshotService::new(crawler, store))
}

/// Stops the crawler's worker pool on Ctrl-C
fn install_ctrl_c(service: &Service) {
    let handle = service.crawler().shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested, stopping workers");
            handle.shutdown();
        }
    });
}

/// Handles the --dry-run mode: validates config and shows what would be monitored
fn handle_dry_run(config: &Config) {
    println!("=== llms-txt-monitor Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Concurrency: {}", config.crawler.concurrency);
    println!("  Timeout: {}ms", config.crawler.timeout_ms);
    println!("  CSR threshold: {} bytes", config.crawler.csr_threshold_bytes);

    println!("\nRenderer:");
    match &config.renderer {
        Some(renderer) => {
            println!("  Browserless: {}", renderer.browserless_url);
            println!("  Token: {}", if renderer.token.is_some() { "set" } else { "none" });
            println!("  Timeout: {}ms", renderer.timeout_ms);
        }
        None => println!("  Disabled"),
    }

    println!("\nMonitor:");
    println!("  Interval: {}ms", config.monitor.interval_ms);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\nConfigured Sites ({}):", config.sites.len());
    for site in &config.sites {
        println!("  - {}", site.url);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --crawl mode: one crawl/persist/diff cycle
async fn handle_crawl(service: &Service, url: &str) -> anyhow::Result<()> {
    install_ctrl_c(service);

    let report = service
        .crawl_and_update(url)
        .await
        .with_context(|| format!("Update of {} failed", url))?;

    println!("=== Changes for {} ===\n", url);
    println!("{}\n", report);

    for (label, urls) in [
        ("Added", &report.added),
        ("Removed", &report.removed),
        ("Modified", &report.modified),
    ] {
        if urls.is_empty() {
            continue;
        }
        println!("{} ({}):", label, urls.len());
        for url in urls {
            println!("  - {}", url);
        }
        println!();
    }

    Ok(())
}

/// Handles the --fresh mode: hard reset of a site followed by a crawl
async fn handle_fresh(service: &Service, url: &str) -> anyhow::Result<()> {
    install_ctrl_c(service);

    let snapshot = service
        .recrawl_fresh(url)
        .await
        .with_context(|| format!("Fresh crawl of {} failed", url))?;
    let pages = service.latest_pages(url)?;

    println!(
        "✓ Snapshot #{} of {} taken at {} with {} records",
        snapshot.id,
        url,
        snapshot.created_at.to_rfc3339(),
        pages.len()
    );

    Ok(())
}

/// Handles the --print mode: renders the latest snapshot as llms.txt
fn handle_print(service: &Service, url: &str, output: Option<&Path>) -> anyhow::Result<()> {
    let text = service.latest_text(url)?;

    match output {
        Some(path) => {
            write_llms_txt(&text, path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✓ llms.txt written to: {}", path.display());
        }
        None => print!("{}", text),
    }

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(service: &Service, config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let stats = service.statistics(&config.site_urls())?;
    print_statistics(&stats);

    Ok(())
}

/// Runs the periodic monitor until Ctrl-C
async fn handle_monitor(service: Arc<Service>, config: &Config) {
    install_ctrl_c(&service);

    let shutdown = service.crawler().shutdown_handle();
    let monitor = Monitor::new(service, config.site_urls(), config.monitor.interval());

    monitor.run(shutdown).await;
}
