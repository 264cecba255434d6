//! Per-resource request tracking
//!
//! Starting a fetch cancels the one still in flight for the same resource.

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

/// Cancellation slot for the in-flight fetch of one resource
#[derive(Debug, Default)]
pub struct RequestTracker {
    current: Mutex<Option<CancellationToken>>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the previous fetch and hand out a token for the next one
    pub fn start(&self) -> CancellationToken {
        let token = CancellationToken::new();
        if let Some(previous) = self.current.lock().replace(token.clone()) {
            previous.cancel();
        }
        token
    }

    /// Cancel whatever is in flight
    pub fn cancel_all(&self) {
        if let Some(current) = self.current.lock().take() {
            current.cancel();
        }
    }
}
