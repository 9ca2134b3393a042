use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::watchlists::Watchlist;

use super::share_errors::ShareError;

/// A watchlist snapshot published under a share token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistShare {
    pub token: String,
    pub watchlist: Watchlist,
    pub expires_at: DateTime<Utc>,
    pub access_count: u64,
}

/// Body sent when publishing a watchlist.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShareRequest<'a> {
    pub watchlist: &'a Watchlist,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateShareResponse {
    pub token: String,
    pub expires_at: WireTimestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RetrieveShareResponse {
    pub watchlist: Watchlist,
    pub access_count: u64,
    pub expires_at: WireTimestamp,
}

/// Expiry as sent by the remote API: epoch milliseconds or an RFC 3339 string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum WireTimestamp {
    EpochMillis(i64),
    Rfc3339(String),
}

impl WireTimestamp {
    pub fn to_datetime(&self) -> Result<DateTime<Utc>, ShareError> {
        match self {
            WireTimestamp::EpochMillis(millis) => DateTime::from_timestamp_millis(*millis)
                .ok_or_else(|| {
                    ShareError::InvalidResponse(format!("expiresAt out of range: {}", millis))
                }),
            WireTimestamp::Rfc3339(value) => DateTime::parse_from_rfc3339(value)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| {
                    ShareError::InvalidResponse(format!("expiresAt '{}' is not a timestamp: {}", value, e))
                }),
        }
    }
}

impl From<DateTime<Utc>> for WireTimestamp {
    fn from(value: DateTime<Utc>) -> Self {
        WireTimestamp::Rfc3339(value.to_rfc3339())
    }
}
