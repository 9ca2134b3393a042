use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use flipwatch_core::errors::Error as CoreError;
use flipwatch_core::share::ShareError;
use flipwatch_core::watchlists::WatchlistError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("Not Found")]
    NotFound,
}

/// Error payload. Remote share failures also carry the remote status,
/// request id and details as the share API reported them.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    code: u16,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl ErrorBody {
    fn new(status: StatusCode, message: String) -> Self {
        ErrorBody {
            code: status.as_u16(),
            message,
            status: None,
            request_id: None,
            details: None,
        }
    }
}

fn watchlist_status(err: &WatchlistError) -> StatusCode {
    match err {
        WatchlistError::WatchlistNotFound(_) | WatchlistError::ItemNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        WatchlistError::InvalidNameLength { .. } | WatchlistError::NoteTooLong(_) => {
            StatusCode::BAD_REQUEST
        }
        WatchlistError::DuplicateName(_)
        | WatchlistError::WatchlistLimitExceeded(_)
        | WatchlistError::ItemAlreadyPresent(_)
        | WatchlistError::ItemLimitExceeded(_)
        | WatchlistError::CannotModifyDefault => StatusCode::CONFLICT,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            // Remote failures are passed through as the share API reported them.
            ApiError::Core(CoreError::Share(ShareError::Api(remote))) => {
                let status =
                    StatusCode::from_u16(remote.status).unwrap_or(StatusCode::BAD_GATEWAY);
                let body = ErrorBody {
                    status: Some(remote.status),
                    request_id: remote.request_id,
                    details: remote.details,
                    ..ErrorBody::new(status, remote.message)
                };
                (status, body)
            }
            ApiError::Core(e) => {
                let status = match &e {
                    CoreError::Watchlist(err) => watchlist_status(err),
                    CoreError::Validation(_) | CoreError::Share(ShareError::InvalidToken(_)) => {
                        StatusCode::BAD_REQUEST
                    }
                    CoreError::Share(ShareError::InvalidResponse(_)) => StatusCode::BAD_GATEWAY,
                    CoreError::Share(ShareError::Cancelled) => StatusCode::GATEWAY_TIMEOUT,
                    _ => {
                        tracing::error!("Request failed: {}", e);
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                let message = match &e {
                    CoreError::Watchlist(err) => err.to_string(),
                    other => other.to_string(),
                };
                (status, ErrorBody::new(status, message))
            }
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                ErrorBody::new(StatusCode::NOT_FOUND, "Not Found".to_string()),
            ),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<WatchlistError> for ApiError {
    fn from(err: WatchlistError) -> Self {
        ApiError::Core(err.into())
    }
}

impl From<ShareError> for ApiError {
    fn from(err: ShareError) -> Self {
        ApiError::Core(err.into())
    }
}
