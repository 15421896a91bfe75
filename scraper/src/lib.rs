pub mod browser;
pub mod calibrate;
pub mod cancel;
pub mod collect;
pub mod config;
pub mod dataset;
pub mod dates;
pub mod extract;
pub mod link;
pub mod pipeline;

#[cfg(test)]
pub mod tests;

// Re-export key types and functions for easier access
pub use crate::browser::{BrowserLauncher, ChromeLauncher, DriverError, PageDriver};
pub use crate::calibrate::{calibrate, Calibration, CalibrationError};
pub use crate::cancel::CancelToken;
pub use crate::collect::{collect_page, Collected, PageRequest, StopReason};
pub use crate::config::{CollectPolicy, ScrapeConfig};
pub use crate::dataset::{dataset_path, merge_into, MergeOutcome};
pub use crate::dates::{normalize, normalize_tokens, NormalizedRecord};
pub use crate::extract::{extract_posts, PostRecord};
pub use crate::link::pulse_link;
pub use crate::pipeline::{pulse_parse, scrape_ticker, PipelineError, RunSummary};
