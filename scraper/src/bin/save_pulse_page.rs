use anyhow::{Context, Result};
use pulse_scraper::browser::{BrowserLauncher, PageDriver};
use pulse_scraper::collect::Progress;
use pulse_scraper::{
    calibrate, collect_page, extract_posts, normalize, pulse_link, CancelToken, Calibration,
    ChromeLauncher, PageRequest, ScrapeConfig,
};
use std::env;
use std::fs;
use std::path::Path;

const DEFAULT_STOP_LEN: i64 = 20_000;

fn print_progress(p: &Progress) {
    println!("{} {} {:.2} %", p.ticker, p.length, p.percent());
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Get ticker and fixture name from command line arguments
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Please provide a ticker and a test name");
        eprintln!("Usage: cargo run --bin save_pulse_page <TICKER> <test_name> [STOP_LEN] [SCROLL_OFFSET]");
        std::process::exit(1);
    }

    let ticker = args[1].to_uppercase();
    let test_name = &args[2];
    let stop_len = match args.get(3) {
        Some(s) => s.parse::<i64>().context("STOP_LEN must be an integer")?,
        None => DEFAULT_STOP_LEN,
    };

    let config = ScrapeConfig::default();
    let launcher = ChromeLauncher::from_config(&config);

    let calibration = match args.get(4) {
        Some(s) => Calibration {
            offset: s.parse::<i64>().context("SCROLL_OFFSET must be an integer")?,
        },
        None => calibrate(&launcher, &config).context("Calibration failed")?,
    };

    let url = pulse_link(&ticker);
    println!("Collecting {} up to {}px...", url, stop_len);

    let mut session = launcher.launch().context("Failed to launch browser")?;
    let collected = collect_page(
        &mut session,
        PageRequest {
            ticker: &ticker,
            url: &url,
            target_length: stop_len,
        },
        calibration,
        &config.collect,
        &CancelToken::new(),
        &mut print_progress,
    )
    .context("Failed to collect page")?;
    session.close().context("Failed to close browser")?;

    // Create failures directory if it doesn't exist
    let failures_dir = Path::new("src/tests/fixtures/failures");
    fs::create_dir_all(failures_dir).context("Failed to create failures directory")?;

    // Save the HTML for testing
    let file_path = failures_dir.join(format!("{}.html", test_name));
    fs::write(&file_path, &collected.markup).context("Failed to write HTML file")?;

    println!(
        "Saved HTML to {} for regression testing",
        file_path.display()
    );

    // Attempt to parse with the extractor to validate the failure
    println!("\nAttempting to extract posts to confirm failure:");

    match extract_posts(&collected.markup, &ticker) {
        Ok(posts) => {
            println!("  - Posts found: {}", posts.len());
            match normalize(posts) {
                Ok(rows) => {
                    println!("⚠️ Extraction succeeded with {} rows! This may not be a failure case.", rows.len());
                }
                Err(e) => println!("✅ Date normalization failed with error: {}", e),
            }
        }
        Err(e) => {
            println!("✅ Extraction failed with error: {}", e);
        }
    }

    println!("\nThis page has been saved and will be included in regression tests.");

    Ok(())
}
