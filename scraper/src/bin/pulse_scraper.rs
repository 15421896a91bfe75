use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use pulse_scraper::{pulse_parse, CancelToken, ChromeLauncher, ScrapeConfig};

/// Scrape Pulse posts for one or more tickers into per-ticker CSV files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Tickers to scrape, e.g. VKCO SBER LKOH
    #[arg(required = true)]
    tickers: Vec<String>,

    /// Page length in pixels after which scrolling stops
    #[arg(long)]
    stop_len: i64,

    /// Directory the <ticker>.csv files are written to
    #[arg(long, default_value = pulse_scraper::config::DEFAULT_OUT_DIR)]
    out_dir: PathBuf,

    /// Use this scroll offset instead of calibrating against the reference page
    #[arg(long, allow_hyphen_values = true)]
    scroll_offset: Option<i64>,

    /// Stop after this many polls without the page growing (0 = never)
    #[arg(long, default_value_t = 300)]
    stall_limit: u32,

    /// Stop after this many scroll iterations
    #[arg(long)]
    max_iterations: Option<u64>,

    /// Delay between scrolling and re-measuring the page, in milliseconds
    #[arg(long, default_value_t = 1000)]
    poll_interval_ms: u64,

    /// Run Chrome without a window
    #[arg(long)]
    headless: bool,

    /// Base URL the ticker pages live under
    #[arg(long)]
    base_url: Option<String>,
}

impl Cli {
    fn config(&self) -> ScrapeConfig {
        let mut config = ScrapeConfig {
            out_dir: self.out_dir.clone(),
            scroll_offset: self.scroll_offset,
            headless: self.headless,
            ..ScrapeConfig::default()
        };
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        config.collect.stall_limit = (self.stall_limit > 0).then_some(self.stall_limit);
        config.collect.max_iterations = self.max_iterations;
        config.collect.poll_interval = Duration::from_millis(self.poll_interval_ms);
        config
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.config();

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        // First press while scrolling collects the page; any other press quits
        if !handler_token.interrupt() {
            eprintln!("\nInterrupted, exiting");
            std::process::exit(130);
        }
    })
    .context("Failed to install Ctrl-C handler")?;

    let launcher = ChromeLauncher::from_config(&config);
    let summary = pulse_parse(&cli.tickers, cli.stop_len, &config, &launcher, &cancel)
        .context("Scraping failed")?;

    if !summary.failures.is_empty() {
        return Err(anyhow::anyhow!(
            "{} of {} tickers failed",
            summary.failures.len(),
            summary.failures.len() + summary.outcomes.len()
        ));
    }

    Ok(())
}
