use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

use crate::errors::Result;
use crate::watchlists::Watchlist;

use super::cancellation::{run_until_cancelled, CancellationToken};
use super::share_errors::ShareError;
use super::share_model::WatchlistShare;
use super::share_token::is_valid_share_token;
use super::share_traits::{ShareApiTrait, ShareServiceTrait};

/// Thin client over the remote share API.
///
/// Holds no state of its own. Remote errors pass through unchanged; only
/// malformed payloads are turned into `ShareError::InvalidResponse`.
pub struct ShareService {
    api: Arc<dyn ShareApiTrait>,
}

impl ShareService {
    pub fn new(api: Arc<dyn ShareApiTrait>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ShareServiceTrait for ShareService {
    async fn create_share(
        &self,
        watchlist: &Watchlist,
        cancel: &CancellationToken,
    ) -> Result<WatchlistShare> {
        debug!("Creating share for watchlist {}", watchlist.id);
        let response = run_until_cancelled(cancel, self.api.create_share(watchlist)).await?;

        if !is_valid_share_token(&response.token) {
            return Err(ShareError::InvalidResponse(format!(
                "server returned malformed token '{}'",
                response.token
            ))
            .into());
        }
        let expires_at = response.expires_at.to_datetime()?;

        Ok(WatchlistShare {
            token: response.token,
            watchlist: watchlist.clone(),
            expires_at,
            access_count: 0,
        })
    }

    async fn retrieve_share(
        &self,
        token: &str,
        cancel: &CancellationToken,
    ) -> Result<WatchlistShare> {
        debug!("Retrieving share {}", token);
        let response = run_until_cancelled(cancel, self.api.retrieve_share(token)).await?;
        let expires_at = response.expires_at.to_datetime()?;

        Ok(WatchlistShare {
            token: token.to_string(),
            watchlist: response.watchlist,
            expires_at,
            access_count: response.access_count,
        })
    }
}
