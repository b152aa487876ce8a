//! Request descriptors and the network seam underneath `ApiClient`.

use std::fmt::Display;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, AUTHORIZATION};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;

use super::ApiError;

/// Ordered query-string parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter. Chainable.
    pub fn with(mut self, key: &str, value: impl Display) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: &str, value: impl Display) {
        self.0.push((key.to_string(), value.to_string()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }
}

impl<K: Display, V: Display> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

/// One outbound call: method, path, query, optional JSON body, headers.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: QueryParams,
    pub body: Option<serde_json::Value>,
    pub headers: HeaderMap,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: QueryParams::new(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value =
            serde_json::to_value(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Token carried in the `Authorization: Bearer` header, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")
    }
}

/// Raw answer from the backend, before any interpretation.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Moves an `ApiRequest` over the wire.
///
/// Implementations report transport failures as errors and hand back every
/// HTTP answer, successful or not, as an `ApiResponse`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, base_url: &str, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

/// `reqwest`-backed transport.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a transport. Without a timeout, requests wait as long as the
    /// underlying connection does.
    pub fn new(timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Translate a descriptor into the `reqwest::Request` that `send` puts
    /// on the wire. Requests without a body carry none.
    pub fn build(&self, base_url: &str, request: &ApiRequest) -> Result<reqwest::Request, ApiError> {
        let url = format!("{}{}", base_url, request.path);

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .headers(request.headers.clone());
        if !request.query.is_empty() {
            builder = builder.query(request.query.pairs());
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }
        Ok(builder.build()?)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, base_url: &str, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let http_request = self.build(base_url, request)?;
        let response = self.client.execute(http_request).await?;
        let status = response.status();
        let body = response.text().await?;
        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, CONTENT_TYPE};

    #[test]
    fn test_query_params_keep_order() {
        let params = QueryParams::new().with("status", "pending").with("page", 2);
        assert_eq!(
            params.pairs(),
            &[
                ("status".to_string(), "pending".to_string()),
                ("page".to_string(), "2".to_string()),
            ]
        );
        assert_eq!(params.get("page"), Some("2"));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn test_query_params_from_iter() {
        let params: QueryParams = [("vendor_id", 7)].into_iter().collect();
        assert_eq!(params.get("vendor_id"), Some("7"));
    }

    #[test]
    fn test_request_builders() {
        let req = ApiRequest::post("/superAdmin/api/vendors/1/block/")
            .json(&serde_json::json!({"reason": "fraud"}))
            .expect("serializable body");
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.body, Some(serde_json::json!({"reason": "fraud"})));
        assert!(req.query.is_empty());
        assert_eq!(req.bearer_token(), None);
    }

    const BASE: &str = "https://admin.test";

    fn transport() -> HttpTransport {
        HttpTransport::new(None).expect("http transport")
    }

    #[test]
    fn test_build_joins_base_path_and_query() {
        let req = ApiRequest::get("/superAdmin/api/products/")
            .query(QueryParams::new().with("vendor_id", 7));
        let built = transport().build(BASE, &req).expect("build");

        assert_eq!(built.method(), &Method::GET);
        assert_eq!(
            built.url().as_str(),
            "https://admin.test/superAdmin/api/products/?vendor_id=7"
        );
        assert!(built.body().is_none());
    }

    #[test]
    fn test_build_without_query_adds_no_question_mark() {
        let built = transport()
            .build(BASE, &ApiRequest::get("/superAdmin/api/whoami/"))
            .expect("build");
        assert_eq!(built.url().as_str(), "https://admin.test/superAdmin/api/whoami/");
        assert_eq!(built.url().query(), None);
    }

    #[test]
    fn test_build_carries_headers_and_json_body() {
        let mut req = ApiRequest::post("/superAdmin/api/vendor-requests/42/approve/")
            .json(&serde_json::json!({"reason": "valid docs"}))
            .expect("serializable body");
        req.headers
            .insert(AUTHORIZATION, HeaderValue::from_static("Bearer tok-123"));
        req.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let built = transport().build(BASE, &req).expect("build");
        assert_eq!(built.method(), &Method::POST);
        assert_eq!(
            built.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok()),
            Some("Bearer tok-123")
        );
        assert_eq!(
            built.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some("application/json")
        );
        let bytes = built.body().and_then(|b| b.as_bytes()).expect("json body");
        let sent: serde_json::Value = serde_json::from_slice(bytes).expect("valid json");
        assert_eq!(sent, serde_json::json!({"reason": "valid docs"}));
    }

    #[test]
    fn test_build_bodyless_post_sends_no_body() {
        let req = ApiRequest::post("/superAdmin/api/order-returns/21/process_refund/");
        let built = transport().build(BASE, &req).expect("build");
        assert_eq!(built.method(), &Method::POST);
        assert!(built.body().is_none());
    }

    #[test]
    fn test_bearer_token_extraction() {
        let mut req = ApiRequest::get("/superAdmin/api/whoami/");
        req.headers
            .insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(req.bearer_token(), Some("abc"));

        req.headers
            .insert(AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert_eq!(req.bearer_token(), None);
    }
}
