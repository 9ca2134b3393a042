use async_trait::async_trait;

use crate::errors::Result;
use crate::watchlists::Watchlist;

use super::cancellation::CancellationToken;
use super::share_model::{CreateShareResponse, RetrieveShareResponse, WatchlistShare};

/// Transport to the remote share API.
///
/// Implementations report remote and transport failures as
/// `ShareError::Api` with the status and message they received.
#[async_trait]
pub trait ShareApiTrait: Send + Sync {
    async fn create_share(&self, watchlist: &Watchlist) -> Result<CreateShareResponse>;
    async fn retrieve_share(&self, token: &str) -> Result<RetrieveShareResponse>;
}

/// Trait for share operations.
#[async_trait]
pub trait ShareServiceTrait: Send + Sync {
    /// Publishes a snapshot of `watchlist`. The returned share has
    /// `access_count == 0` and carries the watchlist exactly as passed in.
    async fn create_share(
        &self,
        watchlist: &Watchlist,
        cancel: &CancellationToken,
    ) -> Result<WatchlistShare>;

    /// Fetches a shared watchlist. The token is forwarded as given; callers
    /// check it with `is_valid_share_token` first.
    async fn retrieve_share(
        &self,
        token: &str,
        cancel: &CancellationToken,
    ) -> Result<WatchlistShare>;
}
