//! Blocking API client for the helpdesk backend.
//!
//! # Overview
//! Every backend call flows through one `HelpdeskClient`, which owns the
//! transport configuration (base URL, timeout, response mode) and applies a
//! single request-preprocessing policy before anything is sent.
//!
//! # Design
//! - `RequestDescriptor` describes a call; `policy::prepare` turns it into a
//!   `PreparedRequest`. A POST or PUT that declares no content type is sent
//!   URL-form-encoded; an explicit declaration is passed through untouched.
//! - `Transport` is the I/O seam. `UreqTransport` is the default; tests plug
//!   in recorders, so the policy is checkable without a network.
//! - `endpoints` is a declarative table with one builder and one
//!   `HelpdeskClient` wrapper generated per backend endpoint.
//! - Errors are returned, never retried or logged in place of returning.

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod form;
pub mod http;
pub mod media;
pub mod multipart;
pub mod policy;
pub mod transport;

pub use client::HelpdeskClient;
pub use config::ClientConfig;
pub use endpoints::{BodyFormat, Endpoint, ENDPOINTS};
pub use error::{ApiError, ErrorKind, NetworkErrorKind};
pub use http::{
    ApiResponse, Body, ContentType, HttpMethod, HttpResponse, PreparedRequest, QueryValue, RequestDescriptor,
    ResponseBody, ResponseMode,
};
pub use multipart::MultipartForm;
pub use transport::{Transport, UreqTransport};
