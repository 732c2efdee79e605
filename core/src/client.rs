//! The helpdesk API client.
//!
//! # Design
//! `HelpdeskClient` is built once from a `ClientConfig` and passed to
//! whoever needs to talk to the backend. It holds the read-only config and a
//! shared `Transport`; cloning is cheap and clones share the transport, so
//! concurrent callers never touch per-request shared state.
//!
//! Every call goes through the same two steps: `prepare` (the pure
//! content-type policy) and `execute` (one round-trip through the
//! transport plus status interpretation). The per-endpoint wrappers live in
//! `endpoints` and only ever build a descriptor and call `request`.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{ApiResponse, HttpResponse, PreparedRequest, RequestDescriptor, ResponseBody, ResponseMode};
use crate::policy;
use crate::transport::{Transport, UreqTransport};

/// Client for the helpdesk REST API.
#[derive(Clone)]
pub struct HelpdeskClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
}

impl HelpdeskClient {
    /// Build a client with the default ureq transport.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        config.validate()?;
        let transport = UreqTransport::new(config.timeout());
        Ok(Self::with_transport(config, transport))
    }

    /// Build a client around any transport. The transport is responsible for
    /// honouring `config.timeout()`.
    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        Self {
            config: Arc::new(config),
            transport: Arc::new(transport),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Apply the content-type policy without sending anything.
    pub fn prepare(&self, descriptor: RequestDescriptor) -> Result<PreparedRequest, ApiError> {
        policy::prepare(descriptor, self.config.response_mode)
    }

    /// Prepare and send one request.
    pub fn request(&self, descriptor: RequestDescriptor) -> Result<ApiResponse, ApiError> {
        let prepared = self.prepare(descriptor)?;
        self.execute(&prepared)
    }

    /// Send an already prepared request.
    pub fn execute(&self, request: &PreparedRequest) -> Result<ApiResponse, ApiError> {
        let url = self.url_for(&request.path);
        debug!(
            method = %request.method,
            path = %request.path,
            content_type = request.content_type().unwrap_or("-"),
            "sending request"
        );

        let started = Instant::now();
        let response = self.transport.send(&url, request)?;
        debug!(
            method = %request.method,
            path = %request.path,
            status = response.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "received response"
        );

        check_status(response, request.response_mode)
    }
}

impl fmt::Debug for HelpdeskClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelpdeskClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Decode the body and map non-2xx statuses to `ApiError::HttpStatus`.
fn check_status(response: HttpResponse, mode: ResponseMode) -> Result<ApiResponse, ApiError> {
    let success = response.is_success();
    let body = ResponseBody::decode(response.body, mode);
    if !success {
        return Err(ApiError::HttpStatus {
            status: response.status,
            headers: response.headers,
            body,
        });
    }
    Ok(ApiResponse {
        status: response.status,
        headers: response.headers,
        body,
    })
}
