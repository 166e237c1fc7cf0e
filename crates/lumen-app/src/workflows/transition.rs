//! # Transition Guard
//!
//! Serializes overlay dismissals and presentations. After any dismissal a
//! present is held back until a settle interval has passed, so a parent sheet
//! is fully unmounted before its child mounts. Some host platforms cannot
//! render two nested overlays at once.
//!
//! Time is supplied by the caller as milliseconds on any monotonic clock.

/// A present waiting for the settle interval.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Deferred<T> {
    target: T,
    ready_at_ms: u64,
}

/// Enforces a minimum gap between "dismiss A" and "present B".
///
/// At most one present is deferred at a time; scheduling another replaces it.
#[derive(Clone, Debug)]
pub struct TransitionGuard<T> {
    settle_ms: u64,
    last_dismiss_ms: Option<u64>,
    deferred: Option<Deferred<T>>,
}

impl<T> TransitionGuard<T> {
    /// Create a guard with the given settle interval.
    pub fn new(settle_ms: u64) -> Self {
        Self {
            settle_ms,
            last_dismiss_ms: None,
            deferred: None,
        }
    }

    /// Configured settle interval.
    pub fn settle_ms(&self) -> u64 {
        self.settle_ms
    }

    /// Record a dismissal at `now_ms`.
    pub fn record_dismiss(&mut self, now_ms: u64) {
        self.last_dismiss_ms = Some(now_ms);
    }

    /// Earliest time a present may happen.
    fn earliest_present_ms(&self) -> u64 {
        self.last_dismiss_ms
            .map_or(0, |dismissed| dismissed.saturating_add(self.settle_ms))
    }

    /// Ask to present `target`.
    ///
    /// Returns it back when it may be presented right away. Otherwise it is
    /// deferred (replacing any earlier deferred present) and `None` is returned.
    pub fn request_present(&mut self, target: T, now_ms: u64) -> Option<T> {
        let ready_at_ms = self.earliest_present_ms();
        if self.deferred.is_none() && now_ms >= ready_at_ms {
            return Some(target);
        }
        self.deferred = Some(Deferred {
            target,
            ready_at_ms: ready_at_ms.max(now_ms),
        });
        None
    }

    /// Release the deferred present if its settle interval has elapsed.
    pub fn drain_ready(&mut self, now_ms: u64) -> Option<T> {
        match &self.deferred {
            Some(deferred) if now_ms >= deferred.ready_at_ms => {
                self.deferred.take().map(|d| d.target)
            }
            _ => None,
        }
    }

    /// Drop the deferred present, returning it.
    pub fn cancel(&mut self) -> Option<T> {
        self.deferred.take().map(|d| d.target)
    }

    /// Borrow the deferred present.
    pub fn pending(&self) -> Option<&T> {
        self.deferred.as_ref().map(|d| &d.target)
    }

    /// Time the deferred present becomes ready.
    pub fn pending_ready_at_ms(&self) -> Option<u64> {
        self.deferred.as_ref().map(|d| d.ready_at_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_without_prior_dismiss_is_immediate() {
        let mut guard = TransitionGuard::new(300);
        assert_eq!(guard.request_present("a", 0), Some("a"));
        assert!(guard.pending().is_none());
    }

    #[test]
    fn test_present_after_dismiss_waits_for_settle() {
        let mut guard = TransitionGuard::new(300);
        guard.record_dismiss(1_000);
        assert_eq!(guard.request_present("child", 1_000), None);
        assert_eq!(guard.pending_ready_at_ms(), Some(1_300));

        assert_eq!(guard.drain_ready(1_299), None);
        assert_eq!(guard.drain_ready(1_300), Some("child"));
        assert_eq!(guard.drain_ready(2_000), None);
    }

    #[test]
    fn test_present_after_settle_is_immediate() {
        let mut guard = TransitionGuard::new(300);
        guard.record_dismiss(1_000);
        assert_eq!(guard.request_present("late", 1_500), Some("late"));
    }

    #[test]
    fn test_newer_request_replaces_deferred() {
        let mut guard = TransitionGuard::new(300);
        guard.record_dismiss(0);
        assert_eq!(guard.request_present("first", 10), None);
        // Still deferred even though the window has passed: a queued present
        // keeps ordering until drained.
        assert_eq!(guard.request_present("second", 400), None);
        assert_eq!(guard.drain_ready(400), Some("second"));
    }

    #[test]
    fn test_cancel_drops_deferred() {
        let mut guard = TransitionGuard::new(300);
        guard.record_dismiss(0);
        guard.request_present("child", 0);
        assert_eq!(guard.cancel(), Some("child"));
        assert_eq!(guard.drain_ready(1_000), None);
    }
}
