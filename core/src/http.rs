//! HTTP request and response types for the helpdesk client.
//!
//! # Design
//! A `RequestDescriptor` describes one call before any encoding decision has
//! been made: the body is still structured and the content type is a tag
//! saying whether the caller declared one. `policy::prepare` turns it into a
//! `PreparedRequest`, which is plain data a transport can put on the wire.
//! Transports hand back an `HttpResponse`, which the client decodes into an
//! `ApiResponse` according to the active `ResponseMode`.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::multipart::MultipartForm;

pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";
pub const APPLICATION_JSON: &str = "application/json";
pub const MULTIPART_FORM_DATA: &str = "multipart/form-data";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// POST and PUT are the only methods whose bodies get default encoding.
    pub fn mutates(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The content type a caller declared for a request body.
///
/// `Default` is the absence of a declaration, and is the only case the
/// content-type policy is allowed to act on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContentType {
    #[default]
    Default,
    Json,
    Multipart,
    Custom(String),
}

/// Request payload before encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// A structured mapping; how it is encoded depends on the content type.
    Value(serde_json::Value),
    /// Bytes the caller already encoded. Always transmitted as-is.
    Raw(Vec<u8>),
    Multipart(MultipartForm),
}

/// A query parameter value. The backend only ever sees strings and numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Str(String),
    Int(i64),
    UInt(u64),
}

impl fmt::Display for QueryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryValue::Str(s) => f.write_str(s),
            QueryValue::Int(n) => write!(f, "{n}"),
            QueryValue::UInt(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Str(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Str(value)
    }
}

impl From<&String> for QueryValue {
    fn from(value: &String) -> Self {
        QueryValue::Str(value.clone())
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        QueryValue::Int(value.into())
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Int(value)
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        QueryValue::UInt(value.into())
    }
}

impl From<u64> for QueryValue {
    fn from(value: u64) -> Self {
        QueryValue::UInt(value)
    }
}

impl From<usize> for QueryValue {
    fn from(value: usize) -> Self {
        QueryValue::UInt(value as u64)
    }
}

/// How a response body is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    #[default]
    Json,
    Text,
    Bytes,
}

impl FromStr for ResponseMode {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ResponseMode::Json),
            "text" => Ok(ResponseMode::Text),
            "bytes" => Ok(ResponseMode::Bytes),
            other => Err(ApiError::Config(format!("unknown response mode: {other}"))),
        }
    }
}

/// One outgoing call, before the content-type policy has run.
///
/// Built with consuming methods and never mutated once handed to the
/// client. `path` already has its path parameters substituted.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    method: HttpMethod,
    path: String,
    query: Vec<(String, QueryValue)>,
    body: Option<Body>,
    content_type: ContentType,
    response_mode: Option<ResponseMode>,
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            content_type: ContentType::Default,
            response_mode: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach a structured body without declaring a content type.
    pub fn value(self, value: serde_json::Value) -> Self {
        self.body(Body::Value(value))
    }

    /// Attach a structured body and declare it JSON.
    pub fn json(self, value: serde_json::Value) -> Self {
        self.body(Body::Value(value)).content_type(ContentType::Json)
    }

    /// Attach a multipart form and declare it multipart.
    pub fn multipart(self, form: MultipartForm) -> Self {
        self.body(Body::Multipart(form))
            .content_type(ContentType::Multipart)
    }

    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    pub fn response_mode(mut self, mode: ResponseMode) -> Self {
        self.response_mode = Some(mode);
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_params(&self) -> &[(String, QueryValue)] {
        &self.query
    }

    pub fn body_ref(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn declared_content_type(&self) -> &ContentType {
        &self.content_type
    }

    pub fn response_mode_override(&self) -> Option<ResponseMode> {
        self.response_mode
    }

    /// The path with its query string appended, as it goes on the wire.
    pub fn path_and_query(&self) -> Result<String, ApiError> {
        if self.query.is_empty() {
            return Ok(self.path.clone());
        }
        let pairs: Vec<(&str, String)> = self
            .query
            .iter()
            .map(|(name, value)| (name.as_str(), value.to_string()))
            .collect();
        let query = serde_urlencoded::to_string(&pairs)
            .map_err(|e| ApiError::Encoding(format!("query string: {e}")))?;
        Ok(format!("{}?{query}", self.path))
    }

    pub(crate) fn into_parts(self) -> (HttpMethod, Option<Body>, ContentType, Option<ResponseMode>) {
        (self.method, self.body, self.content_type, self.response_mode)
    }
}

/// A request after the content-type policy ran: plain data a transport can
/// send without making any decisions of its own.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    /// Path plus query string, relative to the client's base URL.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub response_mode: ResponseMode,
}

impl PreparedRequest {
    pub fn content_type(&self) -> Option<&str> {
        header_value(&self.headers, "content-type")
    }

    /// The body as text, for logging and assertions.
    pub fn body_text(&self) -> Option<String> {
        self.body
            .as_deref()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }
}

/// A raw response as returned by a `Transport`.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A response body decoded per `ResponseMode`.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
    Bytes(Vec<u8>),
}

impl ResponseBody {
    /// Decode raw bytes. In JSON mode an empty body is `null` and a body
    /// that is not valid JSON is kept as text.
    pub fn decode(bytes: Vec<u8>, mode: ResponseMode) -> Self {
        match mode {
            ResponseMode::Json => {
                if bytes.iter().all(u8::is_ascii_whitespace) {
                    return ResponseBody::Json(serde_json::Value::Null);
                }
                match serde_json::from_slice(&bytes) {
                    Ok(value) => ResponseBody::Json(value),
                    Err(_) => ResponseBody::Text(String::from_utf8_lossy(&bytes).into_owned()),
                }
            }
            ResponseMode::Text => ResponseBody::Text(String::from_utf8_lossy(&bytes).into_owned()),
            ResponseMode::Bytes => ResponseBody::Bytes(bytes),
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseBody::Json(value) => write!(f, "{value}"),
            ResponseBody::Text(text) => f.write_str(text),
            ResponseBody::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

/// A successful (2xx) response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: ResponseBody,
}

impl ApiResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        header_value(&self.headers, name)
    }

    /// Deserialize the whole body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let result = match &self.body {
            ResponseBody::Json(value) => T::deserialize(value),
            ResponseBody::Text(text) => serde_json::from_str(text),
            ResponseBody::Bytes(bytes) => serde_json::from_slice(bytes),
        };
        result.map_err(|e| ApiError::Deserialization(e.to_string()))
    }

    /// Deserialize the `data` field of the backend's success envelope.
    pub fn data<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let mut envelope: serde_json::Value = self.json()?;
        let data = envelope
            .get_mut("data")
            .map(serde_json::Value::take)
            .ok_or_else(|| ApiError::Deserialization("response has no `data` field".to_string()))?;
        serde_json::from_value(data).map_err(|e| ApiError::Deserialization(e.to_string()))
    }
}

fn header_value<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
