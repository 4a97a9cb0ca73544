use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::error::Error;

/// Per-call cancellation and deadline, supplied by the caller of an engine
/// operation. A tripped context makes the active transaction roll back.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancelled: Option<Arc<AtomicBool>>,
    deadline: Option<Instant>,
}

/// Handle that cancels every [`CallContext`] cloned from the one it came with.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

impl CallContext {
    /// A context that never cancels and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context paired with a handle that can cancel it.
    pub fn cancellable() -> (Self, CancelHandle) {
        let flag = Arc::new(AtomicBool::new(false));
        let ctx = Self {
            cancelled: Some(Arc::clone(&flag)),
            deadline: None,
        };
        (ctx, CancelHandle(flag))
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fails if the context was cancelled or its deadline has passed.
    pub fn check(&self) -> Result<(), Error> {
        if self
            .cancelled
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
        {
            return Err(Error::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(Error::DeadlineExceeded);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_never_trips() {
        assert!(CallContext::background().check().is_ok());
    }

    #[test]
    fn test_cancel_handle_trips_clones() {
        let (ctx, handle) = CallContext::cancellable();
        let clone = ctx.clone();
        assert!(ctx.check().is_ok());

        handle.cancel();
        assert!(matches!(ctx.check(), Err(Error::Cancelled)));
        assert!(matches!(clone.check(), Err(Error::Cancelled)));
    }

    #[test]
    fn test_past_deadline_trips() {
        let ctx = CallContext::background().with_deadline(Instant::now());
        assert!(matches!(ctx.check(), Err(Error::DeadlineExceeded)));

        let ctx = CallContext::background().with_timeout(Duration::from_secs(60));
        assert!(ctx.check().is_ok());
    }
}
