//! Data models for the ShopSphere admin API.
//!
//! This module contains:
//!
//! - `ResourceId`, `Listing`, `ActionResult`: shapes shared by every endpoint
//! - Resource records: `Vendor`, `Product`, `Order`, `OrderReturn`, ...
//! - Login types: `LoginRequest`, `LoginResponse`
//! - Request bodies for the mutation endpoints

pub mod auth;
pub mod common;
pub mod payloads;
pub mod records;

pub use auth::{LoginRequest, LoginResponse};
pub use common::{ActionResult, Listing, Page, ResourceId};
pub use payloads::{
    DeliveryOtpPayload, DeliveryStatusPayload, EmptyPayload, ReasonPayload, ToggleBlockPayload,
};
pub use records::{
    AdminProfile, AdminUser, CommissionSetting, DashboardStats, DeliveryAgent, DeliveryAssignment,
    DeliveryRequest, Order, OrderReturn, Product, Report, Vendor, VendorRequest,
};
