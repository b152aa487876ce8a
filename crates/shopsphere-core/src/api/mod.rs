//! REST API client module for the ShopSphere super-admin backend.
//!
//! This module provides the `ApiClient` for managing vendors, delivery
//! agents, products, commissions, users, orders and returns.
//!
//! The API uses JWT bearer token authentication obtained through the
//! admin login endpoint; tokens are kept in the `SessionStore`.

pub mod client;
pub mod error;
pub mod transport;

pub use client::ApiClient;
pub use error::ApiError;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, QueryParams, Transport};
