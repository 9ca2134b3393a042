use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Uniform error shape reported by the remote share API and its transport.
///
/// Carried through to callers exactly as received.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteApiError {
    pub message: String,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl fmt::Display for RemoteApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (status {})", self.message, self.status)?;
        if let Some(request_id) = &self.request_id {
            write!(f, " [request {}]", request_id)?;
        }
        Ok(())
    }
}

/// Errors specific to share operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShareError {
    #[error("Remote share API error: {0}")]
    Api(RemoteApiError),

    #[error("Invalid share response: {0}")]
    InvalidResponse(String),

    #[error("Invalid share token: {0}")]
    InvalidToken(String),

    #[error("Share request was cancelled")]
    Cancelled,
}

impl From<RemoteApiError> for ShareError {
    fn from(err: RemoteApiError) -> Self {
        ShareError::Api(err)
    }
}
