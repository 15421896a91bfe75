use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use serde_json::{json, Value};

use crate::cancel::CancelToken;

use crate::browser::{BrowserLauncher, DriverError, PageDriver, SCROLL_HEIGHT_JS, VISIBLE_BOTTOM_JS};

/// What a fake session saw, shared with the test after the session is gone.
#[derive(Debug, Default)]
pub struct SessionLog {
    pub visited: Vec<String>,
    pub page_load_timeouts: Vec<Duration>,
    pub scrolls: Vec<i64>,
    pub landmark_scrolls: Vec<String>,
    pub height_reads: usize,
    pub source_reads: usize,
    pub closed: bool,
}

/// Scripted stand-in for a browser window.
///
/// Page heights are served from `heights`; once it runs dry the last height
/// repeats, like a page that stopped loading.
#[derive(Debug)]
pub struct FakeSession {
    pub heights: VecDeque<i64>,
    pub last_height: i64,
    pub visible_bottom: f64,
    pub markup: String,
    /// 1-based height reads that time out instead of answering.
    pub timeout_reads: Vec<usize>,
    pub navigate_timeout: bool,
    /// Simulates Ctrl-C landing on the given 1-based height read.
    pub cancel_on_height_read: Option<(usize, CancelToken)>,
    /// Simulates Ctrl-C landing while the markup is being read.
    pub cancel_on_source: Option<CancelToken>,
    pub log: Rc<RefCell<SessionLog>>,
}

impl FakeSession {
    pub fn new(heights: &[i64], markup: &str) -> Self {
        Self {
            heights: heights.iter().copied().collect(),
            last_height: 0,
            visible_bottom: 0.0,
            markup: markup.to_string(),
            timeout_reads: Vec::new(),
            navigate_timeout: false,
            cancel_on_height_read: None,
            cancel_on_source: None,
            log: Rc::new(RefCell::new(SessionLog::default())),
        }
    }

    fn next_height(&mut self) -> Result<i64, DriverError> {
        let read = {
            let mut log = self.log.borrow_mut();
            log.height_reads += 1;
            log.height_reads
        };
        if let Some((at, token)) = &self.cancel_on_height_read {
            if *at == read {
                token.cancel();
            }
        }
        if self.timeout_reads.contains(&read) {
            return Err(DriverError::Timeout(format!("fake height read {}", read)));
        }
        if let Some(height) = self.heights.pop_front() {
            self.last_height = height;
        }
        Ok(self.last_height)
    }
}

impl PageDriver for FakeSession {
    fn set_page_load_timeout(&mut self, timeout: Duration) {
        self.log.borrow_mut().page_load_timeouts.push(timeout);
    }

    fn navigate(&mut self, url: &str) -> Result<(), DriverError> {
        self.log.borrow_mut().visited.push(url.to_string());
        if self.navigate_timeout {
            return Err(DriverError::Timeout(format!("fake navigation to {}", url)));
        }
        Ok(())
    }

    fn evaluate(&mut self, script: &str) -> Result<Value, DriverError> {
        if script == SCROLL_HEIGHT_JS {
            return Ok(json!(self.next_height()?));
        }
        if script == VISIBLE_BOTTOM_JS {
            return Ok(json!(self.visible_bottom));
        }
        if let Some(y) = script
            .strip_prefix("window.scrollTo(0, ")
            .and_then(|rest| rest.strip_suffix(");"))
        {
            let y = y.parse().expect("scroll target is an integer");
            self.log.borrow_mut().scrolls.push(y);
            return Ok(Value::Null);
        }
        panic!("unexpected script: {}", script);
    }

    fn scroll_into_view(&mut self, xpath: &str) -> Result<(), DriverError> {
        self.log.borrow_mut().landmark_scrolls.push(xpath.to_string());
        Ok(())
    }

    fn page_source(&mut self) -> Result<String, DriverError> {
        self.log.borrow_mut().source_reads += 1;
        if let Some(token) = &self.cancel_on_source {
            token.cancel();
        }
        Ok(self.markup.clone())
    }

    fn close(self) -> Result<(), DriverError> {
        self.log.borrow_mut().closed = true;
        Ok(())
    }
}

/// Hands out fresh sessions built by `make`, recording each session's log.
pub struct FakeLauncher {
    make: Box<dyn Fn() -> FakeSession>,
    pub logs: RefCell<Vec<Rc<RefCell<SessionLog>>>>,
}

impl FakeLauncher {
    pub fn new(make: impl Fn() -> FakeSession + 'static) -> Self {
        Self {
            make: Box::new(make),
            logs: RefCell::new(Vec::new()),
        }
    }

    pub fn launches(&self) -> usize {
        self.logs.borrow().len()
    }
}

impl BrowserLauncher for FakeLauncher {
    type Session = FakeSession;

    fn launch(&self) -> Result<FakeSession, DriverError> {
        let session = (self.make)();
        self.logs.borrow_mut().push(Rc::clone(&session.log));
        Ok(session)
    }
}
