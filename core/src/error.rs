//! Error types for the helpdesk API client.
//!
//! # Design
//! Every failure the client can observe lands in one `ApiError` and is
//! returned to the caller unmodified. Nothing is retried or swallowed here;
//! toasts, inline form errors and retry loops belong to calling code.
//!
//! `Network` means no response arrived at all. `HttpStatus` means the server
//! answered with a non-2xx status, and carries the decoded body so callers
//! can read the backend's error envelope.

use std::fmt;

use thiserror::Error;

use crate::http::ResponseBody;

/// Errors returned by `HelpdeskClient` and the request builders.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received: timeout, DNS failure, refused connection.
    #[error("network error ({kind}): {message}")]
    Network {
        kind: NetworkErrorKind,
        message: String,
    },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        status: u16,
        headers: Vec<(String, String)>,
        body: ResponseBody,
    },

    /// The request body does not fit the active content-type policy.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Why a request never produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    Timeout,
    Connect,
    Dns,
    Io,
    Other,
}

impl fmt::Display for NetworkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NetworkErrorKind::Timeout => "timeout",
            NetworkErrorKind::Connect => "connect",
            NetworkErrorKind::Dns => "dns",
            NetworkErrorKind::Io => "io",
            NetworkErrorKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// Coarse classification of an `ApiError`, for callers that branch on the
/// failure category without matching every field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    HttpStatus,
    Encoding,
    Deserialization,
    Config,
}

impl ApiError {
    pub(crate) fn network(kind: NetworkErrorKind, message: impl Into<String>) -> Self {
        ApiError::Network {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Network { .. } => ErrorKind::Network,
            ApiError::HttpStatus { .. } => ErrorKind::HttpStatus,
            ApiError::Encoding(_) => ErrorKind::Encoding,
            ApiError::Deserialization(_) => ErrorKind::Deserialization,
            ApiError::Config(_) => ErrorKind::Config,
        }
    }

    /// The HTTP status code, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The decoded response body, when the server answered.
    pub fn body(&self) -> Option<&ResponseBody> {
        match self {
            ApiError::HttpStatus { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ApiError::Network {
                kind: NetworkErrorKind::Timeout,
                ..
            }
        )
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// The `message` field of the backend's error envelope, if the error
    /// response carried one.
    pub fn message(&self) -> Option<&str> {
        match self.body()? {
            ResponseBody::Json(value) => value.get("message")?.as_str(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn status_error(status: u16, body: ResponseBody) -> ApiError {
        ApiError::HttpStatus {
            status,
            headers: Vec::new(),
            body,
        }
    }

    #[test]
    fn not_found_is_an_http_status_error() {
        let err = status_error(404, ResponseBody::Json(json!({"message": "Status not found"})));
        assert_eq!(err.kind(), ErrorKind::HttpStatus);
        assert_eq!(err.status(), Some(404));
        assert!(err.is_not_found());
        assert!(!err.is_timeout());
    }

    #[test]
    fn message_reads_error_envelope() {
        let err = status_error(
            400,
            ResponseBody::Json(json!({
                "status": "error",
                "message": "Invalid `id`",
                "error_type": "InputException",
                "data": null
            })),
        );
        assert_eq!(err.message(), Some("Invalid `id`"));
    }

    #[test]
    fn message_is_none_for_text_bodies() {
        let err = status_error(502, ResponseBody::Text("bad gateway".to_string()));
        assert_eq!(err.message(), None);
        assert_eq!(err.to_string(), "HTTP 502: bad gateway");
    }

    #[test]
    fn timeout_is_a_network_error() {
        let err = ApiError::network(NetworkErrorKind::Timeout, "deadline elapsed");
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(err.is_timeout());
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "network error (timeout): deadline elapsed");
    }
}
