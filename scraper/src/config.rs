use std::path::PathBuf;
use std::time::Duration;

use crate::link::PULSE_BASE_URL;

/// Web-archive snapshot of the SBER Pulse page used to measure the scroll offset.
pub const CALIBRATION_URL: &str =
    "https://web.archive.org/web/20230208212008/https://www.tinkoff.ru/invest/stocks/SBER/pulse/";

/// The "similar stocks" header that sits right below the post feed.
pub const LANDMARK_XPATH: &str = "//h2[@class = 'SecurityBlockHeader__title_KUEiP']";

pub const DEFAULT_OUT_DIR: &str = "parsed_data";

/// When the scroll-and-poll loop gives up on its own.
///
/// Both limits off reproduces the unbounded loop: it only ends on reaching the
/// target length or on operator interrupt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectPolicy {
    pub page_load_timeout: Duration,
    pub poll_interval: Duration,
    /// Consecutive polls without growth before the page counts as exhausted.
    pub stall_limit: Option<u32>,
    pub max_iterations: Option<u64>,
}

impl Default for CollectPolicy {
    fn default() -> Self {
        Self {
            page_load_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(1),
            stall_limit: Some(300),
            max_iterations: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub base_url: String,
    pub calibration_url: String,
    pub landmark_xpath: String,
    pub calibration_timeout: Duration,
    /// Pause between calibration steps so the page can re-render.
    pub settle_delay: Duration,
    pub window_size: (u32, u32),
    pub headless: bool,
    pub out_dir: PathBuf,
    /// Skips calibration when set.
    pub scroll_offset: Option<i64>,
    pub collect: CollectPolicy,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: PULSE_BASE_URL.to_string(),
            calibration_url: CALIBRATION_URL.to_string(),
            landmark_xpath: LANDMARK_XPATH.to_string(),
            calibration_timeout: Duration::from_secs(60),
            settle_delay: Duration::from_secs(1),
            window_size: (1920, 1080),
            headless: false,
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            scroll_offset: None,
            collect: CollectPolicy::default(),
        }
    }
}
