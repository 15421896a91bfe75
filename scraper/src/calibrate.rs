use std::thread;

use log::{debug, info, warn};
use thiserror::Error;

use crate::browser::{scroll_height, scroll_to, visible_bottom, BrowserLauncher, DriverError, PageDriver};
use crate::config::ScrapeConfig;

/// Distance in pixels from the page bottom to scroll to so the feed loads more posts.
///
/// Depends on the window size, so it is measured once per session and then
/// handed to every collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calibration {
    pub offset: i64,
}

#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("calibration unavailable: reference page did not load ({0})")]
    Unavailable(String),

    #[error("calibration failed: {0}")]
    Driver(#[source] DriverError),
}

impl From<DriverError> for CalibrationError {
    fn from(err: DriverError) -> Self {
        match err {
            DriverError::Timeout(msg) => CalibrationError::Unavailable(msg),
            other => CalibrationError::Driver(other),
        }
    }
}

/// Opens the reference page in a new session and measures the scroll offset.
pub fn calibrate<L: BrowserLauncher>(
    launcher: &L,
    config: &ScrapeConfig,
) -> Result<Calibration, CalibrationError> {
    let mut session = launcher.launch()?;
    let result = measure_offset(&mut session, config);
    if let Err(e) = session.close() {
        warn!("failed to close calibration session: {}", e);
    }

    let calibration = result?;
    info!("calibrated scroll offset: {}px", calibration.offset);
    Ok(calibration)
}

pub fn measure_offset<D: PageDriver>(
    driver: &mut D,
    config: &ScrapeConfig,
) -> Result<Calibration, CalibrationError> {
    driver.set_page_load_timeout(config.calibration_timeout);
    driver.navigate(&config.calibration_url)?;
    thread::sleep(config.settle_delay);

    let page_length = scroll_height(driver)?;
    scroll_to(driver, page_length)?;
    thread::sleep(config.settle_delay);

    driver.scroll_into_view(&config.landmark_xpath)?;
    thread::sleep(config.settle_delay);

    let bottom = visible_bottom(driver)?;
    debug!(
        "page length: {}, visible bottom at landmark: {}",
        page_length, bottom
    );

    Ok(Calibration {
        offset: page_length - bottom,
    })
}
