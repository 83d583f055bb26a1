//! Cancellation for content loads.
//!
//! Each kind of load (site-wide data, page data) owns a [`CancelSlot`].
//! Issuing a new token from a slot cancels the one before it, so when the
//! route or locale changes again before a fetch resolves, the older fetch's
//! result is recognised as stale and dropped instead of overwriting newer
//! state. Tokens are checked before every state mutation, not just before
//! the request goes out.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared "cancelled" flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Holds the live token for one kind of load.
#[derive(Debug, Default)]
pub struct CancelSlot {
    current: Option<CancellationToken>,
}

impl CancelSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the in-flight token (if any) and hand out a fresh one.
    pub fn issue(&mut self) -> CancellationToken {
        self.cancel();
        let token = CancellationToken::new();
        self.current = Some(token.clone());
        token
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }
}
