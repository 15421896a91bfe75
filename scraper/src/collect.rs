use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::browser::{scroll_height, scroll_to, DriverError, PageDriver};
use crate::calibrate::Calibration;
use crate::cancel::CancelToken;
use crate::config::CollectPolicy;

/// Why the scroll loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    ReachedTarget,
    Interrupted,
    Stalled,
    IterationLimit,
}

#[derive(Debug, Clone)]
pub struct Collected {
    pub markup: String,
    pub final_length: i64,
    pub reason: StopReason,
}

/// Which page to collect and how long it has to grow.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest<'a> {
    pub ticker: &'a str,
    pub url: &'a str,
    pub target_length: i64,
}

#[derive(Debug, Clone, Copy)]
pub struct Progress<'a> {
    pub ticker: &'a str,
    pub length: i64,
    pub target: i64,
}

impl Progress<'_> {
    pub fn percent(&self) -> f64 {
        if self.target <= 0 {
            return 100.0;
        }
        self.length as f64 / self.target as f64 * 100.0
    }
}

/// Scrolls a ticker's page until its length exceeds the target, then
/// returns the rendered markup.
///
/// Load timeouts, including one on the first height read, are retried. When the page stops
/// growing the same scroll is issued again: the feed sometimes needs a nudge
/// before it loads the next batch. Cancellation or either policy limit ends
/// the loop early with whatever has rendered so far.
pub fn collect_page<D: PageDriver>(
    driver: &mut D,
    request: PageRequest<'_>,
    calibration: Calibration,
    policy: &CollectPolicy,
    cancel: &CancelToken,
    on_progress: &mut dyn FnMut(&Progress),
) -> Result<Collected, DriverError> {
    let PageRequest {
        ticker,
        url,
        target_length,
    } = request;

    let _scrolling = cancel.enter_scrolling();

    driver.set_page_load_timeout(policy.page_load_timeout);
    match driver.navigate(url) {
        Ok(()) => {}
        Err(e) if e.is_timeout() => warn!("{}: page load timed out, scrolling anyway", ticker),
        Err(e) => return Err(e),
    }

    let mut length = first_length(driver, ticker, policy.poll_interval, cancel)?;
    on_progress(&Progress {
        ticker,
        length,
        target: target_length,
    });

    let mut iterations: u64 = 0;
    let mut unchanged: u32 = 0;

    let reason = loop {
        if cancel.is_cancelled() {
            info!("{}: stopped manually, collecting html", ticker);
            break StopReason::Interrupted;
        }
        if policy.max_iterations.is_some_and(|max| iterations >= max) {
            warn!("{}: gave up after {} scroll iterations", ticker, iterations);
            break StopReason::IterationLimit;
        }
        iterations += 1;

        let new_length = match poll_once(driver, length, calibration, policy.poll_interval) {
            Ok(new_length) => new_length,
            Err(e) if e.is_timeout() => {
                debug!("{}: {}, retrying", ticker, e);
                continue;
            }
            Err(e) => return Err(e),
        };

        if new_length == length {
            unchanged += 1;
        } else {
            unchanged = 0;
            length = new_length;
            on_progress(&Progress {
                ticker,
                length,
                target: target_length,
            });
        }

        if length > target_length {
            break StopReason::ReachedTarget;
        }
        if policy.stall_limit.is_some_and(|limit| unchanged >= limit) {
            warn!(
                "{}: page stopped growing at {} after {} polls",
                ticker, length, unchanged
            );
            break StopReason::Stalled;
        }
    };

    let markup = driver.page_source()?;
    debug!("{}: collected {} bytes of markup ({:?})", ticker, markup.len(), reason);

    Ok(Collected {
        markup,
        final_length: length,
        reason,
    })
}

fn poll_once<D: PageDriver>(
    driver: &mut D,
    length: i64,
    calibration: Calibration,
    interval: Duration,
) -> Result<i64, DriverError> {
    let target = length - calibration.offset;
    scroll_to(driver, target)?;
    thread::sleep(interval);

    let new_length = scroll_height(driver)?;
    if new_length == length {
        scroll_to(driver, target)?;
    }
    Ok(new_length)
}

/// Reads the starting height, waiting out load timeouts until a read
/// succeeds or the operator cancels.
fn first_length<D: PageDriver>(
    driver: &mut D,
    ticker: &str,
    interval: Duration,
    cancel: &CancelToken,
) -> Result<i64, DriverError> {
    loop {
        match scroll_height(driver) {
            Ok(length) => return Ok(length),
            Err(e) if e.is_timeout() && !cancel.is_cancelled() => {
                debug!("{}: {}, retrying first read", ticker, e);
                thread::sleep(interval);
            }
            Err(e) => return Err(e),
        }
    }
}
