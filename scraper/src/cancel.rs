use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag an operator (or a Ctrl-C handler) flips to stop page collection.
///
/// Only a scroll loop consumes the flag. [`CancelToken::interrupt`] reports
/// whether a loop is there to take the press, so the caller can exit the
/// process otherwise.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    scrolling: Arc<AtomicBool>,
}

/// Marks a scroll loop as running until dropped.
pub struct ScrollingGuard<'a> {
    token: &'a CancelToken,
}

impl Drop for ScrollingGuard<'_> {
    fn drop(&mut self) {
        self.token.scrolling.store(false, Ordering::SeqCst);
    }
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Handles an operator interrupt.
    ///
    /// Returns `true` when a running scroll loop will stop on it. Returns
    /// `false` for a press outside scrolling or a repeated press, which the
    /// caller should treat as a request to quit.
    pub fn interrupt(&self) -> bool {
        if !self.scrolling.load(Ordering::SeqCst) {
            return false;
        }
        !self.flag.swap(true, Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn is_scrolling(&self) -> bool {
        self.scrolling.load(Ordering::SeqCst)
    }

    /// Re-arms the token so the next ticker starts scrolling again.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    pub fn enter_scrolling(&self) -> ScrollingGuard<'_> {
        self.scrolling.store(true, Ordering::SeqCst);
        ScrollingGuard { token: self }
    }
}
