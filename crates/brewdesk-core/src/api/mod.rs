//! REST API gateway for the ordering backend.
//!
//! This module provides the `ApiClient`, the single path every backend
//! request takes. It injects the session's bearer token on the way out and
//! classifies failures on the way back (see `ApiError`).

pub mod client;
pub mod error;

pub use client::{
    ApiClient, ConnectionStatus, GatewayConfig, LoginResponse, RequestEnvelope,
    DEFAULT_TIMEOUT_SECS, RECENT_ORDERS_LIMIT,
};
pub use error::ApiError;
