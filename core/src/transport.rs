//! The HTTP transport seam.
//!
//! # Design
//! `Transport` is the single point where bytes leave the process. The client
//! only ever hands it a `PreparedRequest`, so any implementation (ureq, an
//! in-memory recorder in tests, a host-provided bridge) sends exactly what
//! the content-type policy produced and makes no encoding decisions itself.
//! Implementations report non-2xx statuses as ordinary `HttpResponse`s;
//! status interpretation stays with the client.

use std::io;
use std::time::Duration;

use crate::error::{ApiError, NetworkErrorKind};
use crate::http::{HttpMethod, HttpResponse, PreparedRequest};

/// Sends a prepared request to an absolute URL.
pub trait Transport: Send + Sync {
    fn send(&self, url: &str, request: &PreparedRequest) -> Result<HttpResponse, ApiError>;
}

/// Blocking transport backed by a shared `ureq::Agent`.
///
/// The agent pools connections internally and is safe to share across
/// threads. The timeout covers the whole call, body included.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn send(&self, url: &str, request: &PreparedRequest) -> Result<HttpResponse, ApiError> {
        let result = match request.method {
            HttpMethod::Get => {
                let builder = with_headers(self.agent.get(url), &request.headers);
                match &request.body {
                    Some(body) => builder.force_send_body().send(&body[..]),
                    None => builder.call(),
                }
            }
            HttpMethod::Delete => {
                let builder = with_headers(self.agent.delete(url), &request.headers);
                match &request.body {
                    Some(body) => builder.force_send_body().send(&body[..]),
                    None => builder.call(),
                }
            }
            HttpMethod::Post => {
                let builder = with_headers(self.agent.post(url), &request.headers);
                match &request.body {
                    Some(body) => builder.send(&body[..]),
                    None => builder.send_empty(),
                }
            }
            HttpMethod::Put => {
                let builder = with_headers(self.agent.put(url), &request.headers);
                match &request.body {
                    Some(body) => builder.send(&body[..]),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(network_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        // ureq caps reads at 10 MiB unless told otherwise.
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(network_error)?;

        Ok(HttpResponse { status, headers, body })
    }
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, headers: &[(String, String)]) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// Map a ureq failure to `ApiError::Network`. With `http_status_as_error`
/// off, ureq only fails when no complete response was received.
fn network_error(err: ureq::Error) -> ApiError {
    let kind = match &err {
        ureq::Error::Timeout(_) => NetworkErrorKind::Timeout,
        ureq::Error::HostNotFound => NetworkErrorKind::Dns,
        ureq::Error::ConnectionFailed => NetworkErrorKind::Connect,
        ureq::Error::Io(io_err) => match io_err.kind() {
            io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => NetworkErrorKind::Timeout,
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected => NetworkErrorKind::Connect,
            _ => NetworkErrorKind::Io,
        },
        _ => NetworkErrorKind::Other,
    };
    ApiError::network(kind, err.to_string())
}
