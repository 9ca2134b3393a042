//! Cooperative cancellation for share requests.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

use crate::errors::Result;

use super::share_errors::ShareError;

/// Cloneable cancellation handle. All clones observe the same flag.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    sender: Arc<watch::Sender<bool>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolves once the token is cancelled.
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender lives as long as `self`, so this only returns on cancellation.
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives `call` unless `token` gets cancelled first.
///
/// A result that arrives after cancellation is discarded, so the caller sees
/// `ShareError::Cancelled` whenever the token was cancelled before this returns.
pub async fn run_until_cancelled<T, F>(token: &CancellationToken, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if token.is_cancelled() {
        return Err(ShareError::Cancelled.into());
    }

    let result = tokio::select! {
        biased;
        _ = token.cancelled() => return Err(ShareError::Cancelled.into()),
        result = call => result,
    };

    if token.is_cancelled() {
        return Err(ShareError::Cancelled.into());
    }
    result
}
