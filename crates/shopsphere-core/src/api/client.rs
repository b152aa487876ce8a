//! API client for the ShopSphere super-admin REST API.
//!
//! This module provides the `ApiClient` struct. Every call goes through the
//! same pipeline: attach the stored bearer token, dispatch, and on a 401/403
//! tear the session down before handing the error back to the caller.

use std::sync::Arc;

use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::auth::{SessionStore, LOGIN_PATH};
use crate::config::Config;
use crate::models::{
    ActionResult, AdminProfile, AdminUser, CommissionSetting, DashboardStats, DeliveryAgent,
    DeliveryAssignment, DeliveryOtpPayload, DeliveryRequest, DeliveryStatusPayload, EmptyPayload,
    Listing, LoginRequest, LoginResponse, Order, OrderReturn, Product, ReasonPayload, Report,
    ResourceId, ToggleBlockPayload, Vendor, VendorRequest,
};

use super::transport::{ApiRequest, ApiResponse, HttpTransport, QueryParams, Transport};
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Prefix for every super-admin endpoint
const ADMIN_API: &str = "/superAdmin/api";

/// Prefix for the delivery agent endpoints driven from the console
const DELIVERY_API: &str = "/api/delivery";

/// API client for the admin backend.
/// Clone is cheap - the transport and session store are shared.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    default_headers: HeaderMap,
    session: SessionStore,
}

impl ApiClient {
    /// Create a client over HTTP using the configured backend address.
    pub fn new(config: &Config, session: SessionStore) -> Result<Self, ApiError> {
        Self::with_base_url(config.base_url(), config, session)
    }

    /// Create a client over HTTP against an explicit backend address,
    /// taking the remaining settings from `config`.
    pub fn with_base_url(
        base_url: impl Into<String>,
        config: &Config,
        session: SessionStore,
    ) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(config.request_timeout())?;
        Ok(Self::with_transport(base_url, Arc::new(transport), session))
    }

    /// Create a client over an arbitrary transport.
    pub fn with_transport(
        base_url: impl Into<String>,
        transport: Arc<dyn Transport>,
        session: SessionStore,
    ) -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_headers,
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    // ===== Request pipeline =====

    /// Outbound step: default headers plus the bearer token, when one is
    /// stored. Never rejects the request.
    fn authorize(&self, request: &mut ApiRequest) {
        for (name, value) in &self.default_headers {
            request.headers.insert(name.clone(), value.clone());
        }

        let token = self.session.get_token();
        if token.is_empty() {
            request.headers.remove(header::AUTHORIZATION);
            return;
        }
        match HeaderValue::from_str(&format!("Bearer {}", token)) {
            Ok(value) => {
                request.headers.insert(header::AUTHORIZATION, value);
            }
            Err(_) => warn!("Stored token is not a valid header value, sending unauthenticated"),
        }
    }

    /// Inbound step: successes pass through; failures are always returned,
    /// and auth failures outside the login screen end the session first.
    fn intercept(
        &self,
        request: &ApiRequest,
        result: Result<ApiResponse, ApiError>,
    ) -> Result<ApiResponse, ApiError> {
        let response = result?;
        if response.status.is_success() {
            return Ok(response);
        }

        let error = ApiError::from_status(response.status, &response.body);
        if error.is_auth_failure() && self.session.navigator().current_path() != LOGIN_PATH {
            warn!(
                status = response.status.as_u16(),
                path = %request.path,
                "Authentication rejected, clearing session"
            );
            self.session.clear_session();
        }
        Err(error)
    }

    async fn execute(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.authorize(&mut request);
        debug!(method = %request.method, path = %request.path, "Sending request");
        let result = self.transport.send(&self.base_url, &request).await;
        self.intercept(&request, result)
    }

    fn decode<T: DeserializeOwned>(path: &str, body: &str) -> Result<T, ApiError> {
        // 204-style empty bodies decode as JSON null
        let body = if body.trim().is_empty() { "null" } else { body };
        serde_json::from_str(body)
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", path, e)))
    }

    async fn call<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let path = request.path.clone();
        let response = self.execute(request).await?;
        Self::decode(&path, &response.body)
    }

    async fn get<T: DeserializeOwned>(&self, path: String) -> Result<T, ApiError> {
        self.call(ApiRequest::get(path)).await
    }

    async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: String,
        query: QueryParams,
    ) -> Result<T, ApiError> {
        self.call(ApiRequest::get(path).query(query)).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: String,
        body: &B,
    ) -> Result<T, ApiError> {
        self.call(ApiRequest::post(path).json(body)?).await
    }

    // ===== Auth =====

    /// Sign in. A response carrying an access token stores a new session
    /// before returning; any other response leaves the session untouched.
    pub async fn admin_login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let path = format!("{}/admin-login/", ADMIN_API);
        let response: LoginResponse = self
            .post(path, &LoginRequest { username, password })
            .await?;

        match response.access_token() {
            Some(access) => {
                self.session
                    .set_session(access, response.refresh.as_deref(), username);
                info!(username = username, "Admin logged in");
            }
            None => warn!(username = username, "Login response carried no access token"),
        }
        Ok(response)
    }

    /// Drop the stored session and return to the login screen.
    pub fn logout(&self) {
        info!("Admin logged out");
        self.session.clear_session();
    }

    // ===== Admin / Dashboard =====

    /// Fetch the profile of the signed-in admin
    pub async fn who_am_i(&self) -> Result<AdminProfile, ApiError> {
        self.get(format!("{}/whoami/", ADMIN_API)).await
    }

    /// Fetch dashboard counters
    pub async fn fetch_dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.get(format!("{}/dashboard/", ADMIN_API)).await
    }

    // ===== Vendors =====

    /// Fetch pending vendor onboarding requests
    pub async fn fetch_vendor_requests(&self) -> Result<Listing<VendorRequest>, ApiError> {
        self.get(format!("{}/vendor-requests/", ADMIN_API)).await
    }

    /// Fetch all vendors
    pub async fn fetch_all_vendors(&self) -> Result<Listing<Vendor>, ApiError> {
        self.get(format!("{}/vendors/", ADMIN_API)).await
    }

    /// Fetch a single vendor
    pub async fn fetch_vendor_detail(&self, id: impl Into<ResourceId>) -> Result<Vendor, ApiError> {
        self.get(format!("{}/vendors/{}/", ADMIN_API, id.into())).await
    }

    /// Approve a vendor onboarding request
    pub async fn approve_vendor_request(
        &self,
        id: impl Into<ResourceId>,
        reason: &str,
    ) -> Result<ActionResult, ApiError> {
        let path = format!("{}/vendor-requests/{}/approve/", ADMIN_API, id.into());
        self.post(path, &ReasonPayload { reason }).await
    }

    /// Reject a vendor onboarding request
    pub async fn reject_vendor_request(
        &self,
        id: impl Into<ResourceId>,
        reason: &str,
    ) -> Result<ActionResult, ApiError> {
        let path = format!("{}/vendor-requests/{}/reject/", ADMIN_API, id.into());
        self.post(path, &ReasonPayload { reason }).await
    }

    /// Block a vendor from selling
    pub async fn block_vendor(
        &self,
        id: impl Into<ResourceId>,
        reason: &str,
    ) -> Result<ActionResult, ApiError> {
        let path = format!("{}/vendors/{}/block/", ADMIN_API, id.into());
        self.post(path, &ReasonPayload { reason }).await
    }

    /// Lift a vendor block
    pub async fn unblock_vendor(
        &self,
        id: impl Into<ResourceId>,
        reason: &str,
    ) -> Result<ActionResult, ApiError> {
        let path = format!("{}/vendors/{}/unblock/", ADMIN_API, id.into());
        self.post(path, &ReasonPayload { reason }).await
    }

    // ===== Products =====

    /// Fetch products, filtered by the given query parameters
    pub async fn fetch_all_products(&self, params: QueryParams) -> Result<Listing<Product>, ApiError> {
        self.get_with_query(format!("{}/products/", ADMIN_API), params)
            .await
    }

    /// Fetch the products of one vendor
    pub async fn fetch_products_by_vendor(
        &self,
        vendor_id: impl Into<ResourceId>,
    ) -> Result<Listing<Product>, ApiError> {
        let query = QueryParams::new().with("vendor_id", vendor_id.into());
        self.get_with_query(format!("{}/products/", ADMIN_API), query)
            .await
    }

    // ===== Delivery Agents =====

    /// Fetch pending delivery agent onboarding requests
    pub async fn fetch_delivery_requests(&self) -> Result<Listing<DeliveryRequest>, ApiError> {
        self.get(format!("{}/delivery-requests/", ADMIN_API)).await
    }

    /// Fetch all delivery agents
    pub async fn fetch_all_delivery_agents(&self) -> Result<Listing<DeliveryAgent>, ApiError> {
        self.get(format!("{}/delivery-agents/", ADMIN_API)).await
    }

    /// Fetch a single delivery agent
    pub async fn fetch_delivery_agent_detail(
        &self,
        id: impl Into<ResourceId>,
    ) -> Result<DeliveryAgent, ApiError> {
        self.get(format!("{}/delivery-agents/{}/", ADMIN_API, id.into()))
            .await
    }

    /// Approve a delivery agent onboarding request
    pub async fn approve_delivery_agent(
        &self,
        id: impl Into<ResourceId>,
        reason: &str,
    ) -> Result<ActionResult, ApiError> {
        let path = format!("{}/delivery-requests/{}/approve/", ADMIN_API, id.into());
        self.post(path, &ReasonPayload { reason }).await
    }

    /// Reject a delivery agent onboarding request
    pub async fn reject_delivery_agent(
        &self,
        id: impl Into<ResourceId>,
        reason: &str,
    ) -> Result<ActionResult, ApiError> {
        let path = format!("{}/delivery-requests/{}/reject/", ADMIN_API, id.into());
        self.post(path, &ReasonPayload { reason }).await
    }

    /// Block a delivery agent
    pub async fn block_delivery_agent(
        &self,
        id: impl Into<ResourceId>,
        reason: &str,
    ) -> Result<ActionResult, ApiError> {
        let path = format!("{}/delivery-agents/{}/block/", ADMIN_API, id.into());
        self.post(path, &ReasonPayload { reason }).await
    }

    /// Lift a delivery agent block
    pub async fn unblock_delivery_agent(
        &self,
        id: impl Into<ResourceId>,
    ) -> Result<ActionResult, ApiError> {
        let path = format!("{}/delivery-agents/{}/unblock/", ADMIN_API, id.into());
        self.post(path, &EmptyPayload {}).await
    }

    // ===== Commission Settings =====

    /// Fetch the platform-wide commission rate
    pub async fn fetch_global_commission(&self) -> Result<CommissionSetting, ApiError> {
        self.get(format!("{}/commission-settings/global/", ADMIN_API))
            .await
    }

    /// Replace the platform-wide commission rate
    pub async fn update_global_commission<B: Serialize + ?Sized>(
        &self,
        data: &B,
    ) -> Result<CommissionSetting, ApiError> {
        self.post(format!("{}/commission-settings/global/", ADMIN_API), data)
            .await
    }

    /// Fetch per-category commission overrides
    pub async fn fetch_category_commissions(&self) -> Result<Listing<CommissionSetting>, ApiError> {
        self.get(format!("{}/commission-settings/", ADMIN_API)).await
    }

    /// Create a per-category commission override
    pub async fn save_category_commission<B: Serialize + ?Sized>(
        &self,
        data: &B,
    ) -> Result<CommissionSetting, ApiError> {
        self.post(format!("{}/commission-settings/", ADMIN_API), data)
            .await
    }

    /// Partially update a per-category commission override
    pub async fn update_category_commission<B: Serialize + ?Sized>(
        &self,
        id: impl Into<ResourceId>,
        data: &B,
    ) -> Result<CommissionSetting, ApiError> {
        let path = format!("{}/commission-settings/{}/", ADMIN_API, id.into());
        self.call(ApiRequest::patch(path).json(data)?).await
    }

    /// Delete a per-category commission override. Returns `None` when the
    /// server answers with an empty body
    pub async fn delete_category_commission(
        &self,
        id: impl Into<ResourceId>,
    ) -> Result<Option<ActionResult>, ApiError> {
        let path = format!("{}/commission-settings/{}/", ADMIN_API, id.into());
        self.call(ApiRequest::delete(path)).await
    }

    // ===== Reports =====

    /// Fetch sales and activity reports
    pub async fn fetch_reports(&self) -> Result<Report, ApiError> {
        self.get(format!("{}/reports/", ADMIN_API)).await
    }

    // ===== Users =====

    /// Fetch customer accounts, filtered by the given query parameters
    pub async fn fetch_users(&self, params: QueryParams) -> Result<Listing<AdminUser>, ApiError> {
        self.get_with_query(format!("{}/users/", ADMIN_API), params)
            .await
    }

    /// Block or unblock a customer account (`action` is "block" or "unblock")
    pub async fn toggle_user_block(
        &self,
        user_id: impl Into<ResourceId>,
        action: &str,
        reason: &str,
    ) -> Result<ActionResult, ApiError> {
        let path = format!("{}/users/{}/toggle-block/", ADMIN_API, user_id.into());
        self.post(path, &ToggleBlockPayload { action, reason }).await
    }

    // ===== Orders =====

    /// Fetch orders, filtered by the given query parameters
    pub async fn fetch_admin_orders(&self, params: QueryParams) -> Result<Listing<Order>, ApiError> {
        self.get_with_query(format!("{}/orders/", ADMIN_API), params)
            .await
    }

    /// Fetch a single order
    pub async fn fetch_admin_order_detail(&self, id: impl Into<ResourceId>) -> Result<Order, ApiError> {
        self.get(format!("{}/orders/{}/", ADMIN_API, id.into())).await
    }

    /// Ask the backend to assign a delivery agent to an order
    pub async fn trigger_assignment(
        &self,
        order_id: impl Into<ResourceId>,
    ) -> Result<ActionResult, ApiError> {
        let path = format!("{}/trigger-assignment/{}/", ADMIN_API, order_id.into());
        self.post(path, &EmptyPayload {}).await
    }

    // ===== Delivery simulation (agent actions) =====

    /// Move a delivery assignment to a new status
    pub async fn update_delivery_status(
        &self,
        assignment_id: impl Into<ResourceId>,
        status: &str,
        notes: &str,
    ) -> Result<DeliveryAssignment, ApiError> {
        let path = format!(
            "{}/assignments/{}/update-status/",
            DELIVERY_API,
            assignment_id.into()
        );
        self.post(path, &DeliveryStatusPayload { status, notes })
            .await
    }

    /// Complete a delivery with the OTP the customer was given
    pub async fn complete_delivery_otp(
        &self,
        assignment_id: impl Into<ResourceId>,
        otp_code: &str,
    ) -> Result<DeliveryAssignment, ApiError> {
        let path = format!("{}/assignments/{}/complete/", DELIVERY_API, assignment_id.into());
        self.post(path, &DeliveryOtpPayload { otp_code }).await
    }

    // ===== Returns =====

    /// Fetch return requests, filtered by the given query parameters
    pub async fn fetch_admin_returns(&self, params: QueryParams) -> Result<Listing<OrderReturn>, ApiError> {
        self.get_with_query(format!("{}/order-returns/", ADMIN_API), params)
            .await
    }

    /// Fetch a single return request
    pub async fn fetch_return_detail(&self, id: impl Into<ResourceId>) -> Result<OrderReturn, ApiError> {
        self.get(format!("{}/order-returns/{}/", ADMIN_API, id.into()))
            .await
    }

    /// Approve a return request. Sent without a body
    pub async fn approve_return(&self, id: impl Into<ResourceId>) -> Result<ActionResult, ApiError> {
        let path = format!("{}/order-returns/{}/approve/", ADMIN_API, id.into());
        self.call(ApiRequest::post(path)).await
    }

    /// Reject a return request
    pub async fn reject_return(
        &self,
        id: impl Into<ResourceId>,
        reason: &str,
    ) -> Result<ActionResult, ApiError> {
        let path = format!("{}/order-returns/{}/reject/", ADMIN_API, id.into());
        self.post(path, &ReasonPayload { reason }).await
    }

    /// Refund an approved return. Sent without a body
    pub async fn process_refund(&self, id: impl Into<ResourceId>) -> Result<ActionResult, ApiError> {
        let path = format!("{}/order-returns/{}/process_refund/", ADMIN_API, id.into());
        self.call(ApiRequest::post(path)).await
    }
}

// ============================================================================
// Tests
// ============================================================================
