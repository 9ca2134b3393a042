//! Flipwatch Connect - HTTP transport for the remote share API.
//!
//! Implements [`flipwatch_core::share::ShareApiTrait`] over `reqwest`.

pub mod client;

pub use client::{ShareApiClient, DEFAULT_REQUEST_TIMEOUT, DEFAULT_SHARE_API_URL};
