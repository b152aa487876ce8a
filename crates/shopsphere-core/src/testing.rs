//! Test doubles for the transport and navigation seams.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::api::{ApiError, ApiRequest, ApiResponse, Transport};
use crate::auth::{MemoryStore, Navigator, SessionStore, LOGIN_PATH};

/// Counts redirects instead of navigating anywhere.
pub struct RecordingNavigator {
    path: Mutex<String>,
    redirects: AtomicUsize,
}

impl RecordingNavigator {
    pub fn new(path: &str) -> Self {
        Self {
            path: Mutex::new(path.to_string()),
            redirects: AtomicUsize::new(0),
        }
    }

    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Navigator for RecordingNavigator {
    fn current_path(&self) -> String {
        self.path.lock().expect("path lock").clone()
    }

    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
        *self.path.lock().expect("path lock") = LOGIN_PATH.to_string();
    }
}

/// Records every request and answers from a queue of canned responses.
/// An empty queue answers `200 {}`.
#[derive(Default)]
pub struct MockTransport {
    requests: Mutex<Vec<(String, ApiRequest)>>,
    responses: Mutex<VecDeque<Result<ApiResponse, ApiError>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: &str) {
        let status = StatusCode::from_u16(status).expect("valid status");
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(Ok(ApiResponse::new(status, body)));
    }

    pub fn fail(&self, error: ApiError) {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .expect("requests lock")
            .iter()
            .map(|(_, r)| r.clone())
            .collect()
    }

    pub fn last_request(&self) -> ApiRequest {
        self.requests().pop().expect("at least one request")
    }

    pub fn last_base_url(&self) -> String {
        self.requests
            .lock()
            .expect("requests lock")
            .last()
            .map(|(base, _)| base.clone())
            .expect("at least one request")
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, base_url: &str, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push((base_url.to_string(), request.clone()));
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| Ok(ApiResponse::new(StatusCode::OK, "{}")))
    }
}

/// A session store over two in-memory scopes.
pub struct TestSession {
    pub store: SessionStore,
    pub persistent: Arc<MemoryStore>,
    pub session: Arc<MemoryStore>,
    pub navigator: Arc<RecordingNavigator>,
}

impl TestSession {
    pub fn at(path: &str) -> Self {
        let persistent = Arc::new(MemoryStore::new());
        let session = Arc::new(MemoryStore::new());
        let navigator = Arc::new(RecordingNavigator::new(path));
        let store = SessionStore::new(persistent.clone(), session.clone(), navigator.clone());
        Self {
            store,
            persistent,
            session,
            navigator,
        }
    }
}
