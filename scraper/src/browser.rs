use std::sync::Arc;
use std::time::Duration;

use headless_chrome::{Browser, LaunchOptions, Tab};
use log::debug;
use serde_json::Value;
use thiserror::Error;

use crate::config::ScrapeConfig;

pub const SCROLL_HEIGHT_JS: &str = "document.body.scrollHeight";
pub const VISIBLE_BOTTOM_JS: &str = "window.pageYOffset + window.innerHeight";

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("page load timed out: {0}")]
    Timeout(String),

    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("script `{script}` returned {value}, expected a number")]
    UnexpectedValue { script: String, value: Value },

    #[error(transparent)]
    Other(anyhow::Error),
}

impl DriverError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, DriverError::Timeout(_))
    }
}

impl From<anyhow::Error> for DriverError {
    fn from(err: anyhow::Error) -> Self {
        if err.downcast_ref::<headless_chrome::util::Timeout>().is_some() {
            DriverError::Timeout(err.to_string())
        } else {
            DriverError::Other(err)
        }
    }
}

/// One open browser window.
pub trait PageDriver {
    fn set_page_load_timeout(&mut self, timeout: Duration);
    fn navigate(&mut self, url: &str) -> Result<(), DriverError>;
    /// Evaluates a JavaScript expression and returns its value.
    fn evaluate(&mut self, script: &str) -> Result<Value, DriverError>;
    /// Scrolls the first element matching `xpath` into view.
    fn scroll_into_view(&mut self, xpath: &str) -> Result<(), DriverError>;
    /// Full rendered markup of the current page.
    fn page_source(&mut self) -> Result<String, DriverError>;
    fn close(self) -> Result<(), DriverError>
    where
        Self: Sized;
}

/// Opens fresh browser sessions.
pub trait BrowserLauncher {
    type Session: PageDriver;

    fn launch(&self) -> Result<Self::Session, DriverError>;
}

pub fn scroll_height<D: PageDriver + ?Sized>(driver: &mut D) -> Result<i64, DriverError> {
    eval_i64(driver, SCROLL_HEIGHT_JS)
}

pub fn visible_bottom<D: PageDriver + ?Sized>(driver: &mut D) -> Result<i64, DriverError> {
    eval_i64(driver, VISIBLE_BOTTOM_JS)
}

pub fn scroll_to<D: PageDriver + ?Sized>(driver: &mut D, y: i64) -> Result<(), DriverError> {
    driver.evaluate(&format!("window.scrollTo(0, {});", y))?;
    Ok(())
}

fn eval_i64<D: PageDriver + ?Sized>(driver: &mut D, script: &str) -> Result<i64, DriverError> {
    let value = driver.evaluate(script)?;
    // pageYOffset is fractional on scaled displays
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|v| v.round() as i64))
        .ok_or_else(|| DriverError::UnexpectedValue {
            script: script.to_string(),
            value,
        })
}

#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    headless: bool,
    window_size: (u32, u32),
}

impl ChromeLauncher {
    pub fn new(headless: bool, window_size: (u32, u32)) -> Self {
        Self {
            headless,
            window_size,
        }
    }

    pub fn from_config(config: &ScrapeConfig) -> Self {
        Self::new(config.headless, config.window_size)
    }
}

impl BrowserLauncher for ChromeLauncher {
    type Session = ChromeSession;

    fn launch(&self) -> Result<ChromeSession, DriverError> {
        let options = LaunchOptions::default_builder()
            .headless(self.headless)
            .window_size(Some(self.window_size))
            .build()
            .map_err(|e| DriverError::Launch(e.to_string()))?;

        debug!("launching Chrome (headless: {})", self.headless);
        let browser = Browser::new(options).map_err(|e| DriverError::Launch(e.to_string()))?;
        let tab = browser.new_tab()?;

        Ok(ChromeSession { browser, tab })
    }
}

/// A Chrome process with a single tab. Dropping it shuts the browser down.
pub struct ChromeSession {
    #[allow(dead_code)]
    browser: Browser,
    tab: Arc<Tab>,
}

impl PageDriver for ChromeSession {
    fn set_page_load_timeout(&mut self, timeout: Duration) {
        self.tab.set_default_timeout(timeout);
    }

    fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        debug!("navigating to {}", url);
        self.tab.navigate_to(url)?.wait_until_navigated()?;
        Ok(())
    }

    fn evaluate(&mut self, script: &str) -> Result<Value, DriverError> {
        let object = self.tab.evaluate(script, false)?;
        Ok(object.value.unwrap_or(Value::Null))
    }

    fn scroll_into_view(&mut self, xpath: &str) -> Result<(), DriverError> {
        self.tab.find_element_by_xpath(xpath)?.scroll_into_view()?;
        Ok(())
    }

    fn page_source(&mut self) -> Result<String, DriverError> {
        Ok(self.tab.get_content()?)
    }

    fn close(self) -> Result<(), DriverError> {
        self.tab.close(true)?;
        Ok(())
    }
}
