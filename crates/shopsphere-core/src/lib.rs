//! Core library for the ShopSphere admin console.
//!
//! Provides the session/token store, the authenticated API client with its
//! operation catalogue, configuration loading, and the data models shared by
//! every front-end.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiClient, ApiError, QueryParams};
pub use auth::{SessionState, SessionStore};
pub use config::Config;
