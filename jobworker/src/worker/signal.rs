//! Cooperative cancellation.
//!
//! A [`CancelSignal`] starts out in the "keep going" position. The caller
//! flips it with [`CancelSignal::request_cancel`] and the runnable's working
//! phase is expected to poll it and return soon afterwards. Nothing is
//! interrupted forcibly.

use std::sync::atomic::{AtomicBool, Ordering};

/// Advisory cancellation flag shared between a job handle and its runnable.
#[derive(Debug, Default)]
pub struct CancelSignal {
    cancelled: AtomicBool,
}

impl CancelSignal {
    /// Creates an armed signal (no cancellation requested).
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    ///
    /// Returns true if this call was the one that flipped the flag.
    pub fn request_cancel(&self) -> bool {
        !self.cancelled.swap(true, Ordering::AcqRel)
    }

    /// Returns true once cancellation has been requested.
    pub fn is_cancel_requested(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Returns true while work should continue.
    ///
    /// Convenience inverse of [`is_cancel_requested`](Self::is_cancel_requested)
    /// for loop conditions.
    pub fn keep_going(&self) -> bool {
        !self.is_cancel_requested()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_starts_armed() {
        let signal = CancelSignal::new();
        assert!(signal.keep_going());
        assert!(!signal.is_cancel_requested());
    }

    #[test]
    fn test_request_cancel_flips_once() {
        let signal = CancelSignal::new();
        assert!(signal.request_cancel());
        assert!(!signal.request_cancel());
        assert!(signal.is_cancel_requested());
        assert!(!signal.keep_going());
    }

    #[test]
    fn test_signal_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CancelSignal>();
    }
}
