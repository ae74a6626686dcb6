//! # Cancellation
//!
//! Out-of-band cancellation for blocking calls.
//!
//! A [`Cancellable`] is a cloneable token handed to the timeout-bearing
//! operations (`get_usb_device`, `get_device`, `get_device_matching`,
//! `close`). Cancelling it from any thread makes the in-flight call fail at
//! its next poll with [`MiruError::OperationCancelled`], never with a
//! timeout, so callers can tell "you aborted this" apart from "the wait
//! elapsed".
//!
//! ## Example
//!
//! ```rust
//! use miru_core::Cancellable;
//!
//! let cancellable = Cancellable::new();
//! let watcher = cancellable.clone();
//! cancellable.cancel();
//! assert!(watcher.is_cancelled());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{MiruError, Result};

/// Cloneable cancellation token
///
/// All clones share one flag; cancellation is one-way and permanent for the
/// token's lifetime.
#[derive(Debug, Clone, Default)]
pub struct Cancellable
{
    cancelled: Arc<AtomicBool>,
}

impl Cancellable
{
    /// Create a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Cancel the token. In-flight waits observe this at their next poll.
    pub fn cancel(&self)
    {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether [`Cancellable::cancel`] has been called on any clone.
    #[must_use]
    pub fn is_cancelled(&self) -> bool
    {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fail with [`MiruError::OperationCancelled`] if already cancelled.
    pub fn err_if_cancelled(&self, operation: &str) -> Result<()>
    {
        if self.is_cancelled() {
            Err(MiruError::OperationCancelled(format!("{operation} was cancelled")))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_cancel_is_shared_across_clones()
    {
        let token = Cancellable::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn test_err_if_cancelled()
    {
        let token = Cancellable::new();
        assert!(token.err_if_cancelled("close").is_ok());
        token.cancel();
        match token.err_if_cancelled("close") {
            Err(MiruError::OperationCancelled(message)) => assert!(message.contains("close")),
            other => panic!("expected OperationCancelled, got {other:?}"),
        }
    }
}
