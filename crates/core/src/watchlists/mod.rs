//! Watchlists module - domain models, the watchlist store, and traits.

mod import;
mod state;
mod watchlists_errors;
mod watchlists_model;
mod watchlists_service;
mod watchlists_traits;

#[cfg(test)]
mod watchlists_service_tests;

pub use watchlists_errors::WatchlistError;
pub use watchlists_model::{
    NewWatchlistItem, Watchlist, WatchlistExport, WatchlistItem, WatchlistLimits,
    WatchlistState,
};
pub use watchlists_service::WatchlistService;
pub use watchlists_traits::{WatchlistRepositoryTrait, WatchlistServiceTrait};
