//! Flipwatch Core - watchlist management and sharing engine.
//!
//! This crate owns the collection of watchlists and every rule that keeps it
//! consistent. It is storage and transport agnostic: persistence goes through
//! [`watchlists::WatchlistRepositoryTrait`] (implemented by `storage-sqlite`) and
//! share links go through [`share::ShareApiTrait`] (implemented by `connect`).

pub mod constants;
pub mod errors;
pub mod migration;
pub mod share;
pub mod watchlists;

pub use share::{is_valid_share_token, CancellationToken, WatchlistShare};
pub use watchlists::{Watchlist, WatchlistItem, WatchlistService};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
