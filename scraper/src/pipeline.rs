use std::io::{self, Write};

use log::{error, info, warn};
use thiserror::Error;

use crate::browser::{BrowserLauncher, DriverError, PageDriver};
use crate::calibrate::{calibrate, Calibration, CalibrationError};
use crate::cancel::CancelToken;
use crate::collect::{collect_page, PageRequest, Progress, StopReason};
use crate::config::ScrapeConfig;
use crate::dataset::{dataset_path, merge_into, DatasetError, MergeOutcome};
use crate::dates::{normalize, DateError};
use crate::extract::{extract_posts, ExtractError};
use crate::link::pulse_link_with_base;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    #[error("{ticker}: {source}")]
    Collect {
        ticker: String,
        #[source]
        source: DriverError,
    },

    #[error("{ticker}: {source}")]
    Extract {
        ticker: String,
        #[source]
        source: ExtractError,
    },

    #[error("{ticker}: {source}")]
    Dates {
        ticker: String,
        #[source]
        source: DateError,
    },

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// What a multi-ticker run produced.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<MergeOutcome>,
    pub failures: Vec<PipelineError>,
}

/// Scrapes each ticker in turn and merges its posts into `<out_dir>/<ticker>.csv`.
///
/// Scrolling stops once a page is longer than `stop_len` pixels. Calibration
/// runs once up front unless the config carries a fixed scroll offset. A
/// failed calibration aborts the run; a failed ticker is recorded in the
/// summary and the remaining tickers still run.
pub fn pulse_parse<L, I, S>(
    tickers: I,
    stop_len: i64,
    config: &ScrapeConfig,
    launcher: &L,
    cancel: &CancelToken,
) -> Result<RunSummary, PipelineError>
where
    L: BrowserLauncher,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let calibration = match config.scroll_offset {
        Some(offset) => Calibration { offset },
        None => calibrate(launcher, config)?,
    };

    let mut summary = RunSummary::default();
    for ticker in tickers {
        match scrape_ticker(ticker.as_ref(), stop_len, calibration, config, launcher, cancel) {
            Ok(outcome) => {
                println!("{}", outcome);
                summary.outcomes.push(outcome);
            }
            Err(e) => {
                error!("{}", e);
                summary.failures.push(e);
            }
        }
    }
    Ok(summary)
}

/// Collects, extracts, normalizes and stores the posts of one ticker.
pub fn scrape_ticker<L: BrowserLauncher>(
    ticker: &str,
    stop_len: i64,
    calibration: Calibration,
    config: &ScrapeConfig,
    launcher: &L,
    cancel: &CancelToken,
) -> Result<MergeOutcome, PipelineError> {
    let ticker = ticker.trim().to_uppercase();
    let url = pulse_link_with_base(&config.base_url, &ticker);
    let collect_err = |source| PipelineError::Collect {
        ticker: ticker.clone(),
        source,
    };

    // A press that landed outside scrolling must not cut this ticker short
    cancel.reset();
    let mut session = launcher.launch().map_err(collect_err)?;
    let collected = collect_page(
        &mut session,
        PageRequest {
            ticker: &ticker,
            url: &url,
            target_length: stop_len,
        },
        calibration,
        &config.collect,
        cancel,
        &mut print_progress,
    );
    println!();
    if let Err(e) = session.close() {
        warn!("{}: failed to close browser session: {}", ticker, e);
    }
    let collected = collected.map_err(collect_err)?;

    if collected.reason == StopReason::Interrupted {
        println!("Code was stopped manually, collected html of {}", ticker);
    }

    let posts = extract_posts(&collected.markup, &ticker).map_err(|source| {
        PipelineError::Extract {
            ticker: ticker.clone(),
            source,
        }
    })?;
    info!("{}: extracted {} posts", ticker, posts.len());

    let rows = normalize(posts).map_err(|source| PipelineError::Dates {
        ticker: ticker.clone(),
        source,
    })?;

    Ok(merge_into(&dataset_path(&config.out_dir, &ticker), &rows)?)
}

fn print_progress(progress: &Progress) {
    print!(
        "\r{} {} {:.2} %",
        progress.ticker,
        progress.length,
        progress.percent()
    );
    let _ = io::stdout().flush();
}
