//! Share module - share tokens, remote share API contract, and the share service.

mod cancellation;
mod share_errors;
mod share_model;
mod share_service;
mod share_token;
mod share_traits;


pub use cancellation::{run_until_cancelled, CancellationToken};
pub use share_errors::{RemoteApiError, ShareError};
pub use share_model::{
    CreateShareRequest, CreateShareResponse, RetrieveShareResponse, WatchlistShare,
    WireTimestamp,
};
pub use share_service::ShareService;
pub use share_token::{extract_share_token, is_valid_share_token, share_expiry_hint, share_url};
pub use share_traits::{ShareApiTrait, ShareServiceTrait};
