//! The content-type policy applied to every outgoing request.
//!
//! # Design
//! `prepare` is a pure function from a `RequestDescriptor` to the bytes and
//! headers that go on the wire. The only decision it makes on its own is the
//! default: a POST or PUT with no declared content type is sent
//! URL-form-encoded. An explicit declaration is authoritative and the body
//! passes through, and GET/DELETE bodies are never encoded.
//!
//! Body shapes that cannot satisfy the declared content type (a structured
//! value under `Custom`, a multipart form under `Json`) fail with
//! `ApiError::Encoding` instead of being guessed at.

use crate::error::ApiError;
use crate::form;
use crate::http::{
    Body, ContentType, HttpMethod, PreparedRequest, RequestDescriptor, ResponseMode, APPLICATION_JSON,
    FORM_URLENCODED, MULTIPART_FORM_DATA,
};

/// Encoded body plus the content-type header it goes out with.
type Encoded = (Option<String>, Option<Vec<u8>>);

/// Run the content-type policy over a descriptor.
///
/// `default_mode` is the client's configured response mode; the descriptor's
/// own override wins when present.
pub fn prepare(descriptor: RequestDescriptor, default_mode: ResponseMode) -> Result<PreparedRequest, ApiError> {
    let path = descriptor.path_and_query()?;
    let (method, body, declared, mode_override) = descriptor.into_parts();

    let (content_type, body) = if method.mutates() {
        encode_body(method, declared, body)?
    } else {
        pass_through(method, declared, body)?
    };

    let mut headers = Vec::new();
    if let Some(content_type) = content_type {
        headers.push(("content-type".to_string(), content_type));
    }

    Ok(PreparedRequest {
        method,
        path,
        headers,
        body,
        response_mode: mode_override.unwrap_or(default_mode),
    })
}

fn encode_body(method: HttpMethod, declared: ContentType, body: Option<Body>) -> Result<Encoded, ApiError> {
    match declared {
        ContentType::Default => {
            let bytes = match body {
                None => Vec::new(),
                Some(Body::Value(value)) => form::encode(&value)?.into_bytes(),
                Some(Body::Raw(bytes)) => bytes,
                Some(Body::Multipart(_)) => {
                    return Err(ApiError::Encoding(format!(
                        "{method} with a multipart body must declare a multipart content type"
                    )));
                }
            };
            Ok((Some(FORM_URLENCODED.to_string()), Some(bytes)))
        }
        ContentType::Json => {
            let bytes = match body {
                None => None,
                Some(Body::Value(value)) => {
                    Some(serde_json::to_vec(&value).map_err(|e| ApiError::Encoding(e.to_string()))?)
                }
                Some(Body::Raw(bytes)) => Some(bytes),
                Some(Body::Multipart(_)) => {
                    return Err(ApiError::Encoding(
                        "a multipart body cannot be sent as application/json".to_string(),
                    ));
                }
            };
            Ok((Some(APPLICATION_JSON.to_string()), bytes))
        }
        ContentType::Multipart => match body {
            None => Ok((Some(MULTIPART_FORM_DATA.to_string()), None)),
            Some(Body::Multipart(form)) => Ok((Some(form.content_type()), Some(form.to_bytes()))),
            Some(Body::Raw(bytes)) => Ok((Some(MULTIPART_FORM_DATA.to_string()), Some(bytes))),
            Some(Body::Value(_)) => Err(ApiError::Encoding(
                "multipart requests need a MultipartForm or raw bytes".to_string(),
            )),
        },
        ContentType::Custom(content_type) => match body {
            None => Ok((Some(content_type), None)),
            Some(Body::Raw(bytes)) => Ok((Some(content_type), Some(bytes))),
            Some(_) => Err(ApiError::Encoding(format!(
                "a `{content_type}` body must be supplied as raw bytes"
            ))),
        },
    }
}

// GET and DELETE: the declaration is forwarded, nothing is encoded.
fn pass_through(method: HttpMethod, declared: ContentType, body: Option<Body>) -> Result<Encoded, ApiError> {
    let content_type = match declared {
        ContentType::Default => None,
        ContentType::Json => Some(APPLICATION_JSON.to_string()),
        ContentType::Multipart => Some(MULTIPART_FORM_DATA.to_string()),
        ContentType::Custom(content_type) => Some(content_type),
    };
    match body {
        None => Ok((content_type, None)),
        Some(Body::Raw(bytes)) => Ok((content_type, Some(bytes))),
        Some(_) => Err(ApiError::Encoding(format!(
            "{method} requests only carry raw bodies"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multipart::MultipartForm;
    use serde_json::json;

    fn run(descriptor: RequestDescriptor) -> PreparedRequest {
        prepare(descriptor, ResponseMode::Json).unwrap()
    }

    #[test]
    fn post_without_content_type_is_form_encoded() {
        let req = run(RequestDescriptor::post("/api/statuses").value(json!({"name": "Open"})));
        assert_eq!(req.content_type(), Some(FORM_URLENCODED));
        assert_eq!(req.body_text().as_deref(), Some("name=Open"));
    }

    #[test]
    fn put_without_body_still_gets_form_header() {
        let req = run(RequestDescriptor::put("/api/inboxes/4/toggle"));
        assert_eq!(req.content_type(), Some(FORM_URLENCODED));
        assert_eq!(req.body, Some(Vec::new()));
    }

    #[test]
    fn explicit_json_is_serialized_not_form_encoded() {
        let req = run(RequestDescriptor::post("/api/templates").json(json!({"name": "Welcome"})));
        assert_eq!(req.content_type(), Some(APPLICATION_JSON));
        assert_eq!(req.body_text().as_deref(), Some(r#"{"name":"Welcome"}"#));
    }

    #[test]
    fn explicit_raw_json_is_byte_identical() {
        let raw = br#"{ "name" : "Welcome" }"#.to_vec();
        let req = run(
            RequestDescriptor::put("/api/templates/1")
                .body(Body::Raw(raw.clone()))
                .content_type(ContentType::Json),
        );
        assert_eq!(req.body, Some(raw));
        assert_eq!(req.content_type(), Some(APPLICATION_JSON));
    }

    #[test]
    fn multipart_body_passes_through() {
        let form = MultipartForm::with_boundary("B").text("first_name", "Ada");
        let expected = form.to_bytes();
        let req = run(RequestDescriptor::put("/api/users/me").multipart(form));
        assert_eq!(req.content_type(), Some("multipart/form-data; boundary=B"));
        assert_eq!(req.body, Some(expected));
    }

    #[test]
    fn custom_content_type_is_not_overwritten() {
        let req = run(
            RequestDescriptor::post("/api/media")
                .body(Body::Raw(b"plain".to_vec()))
                .content_type(ContentType::Custom("text/plain".to_string())),
        );
        assert_eq!(req.content_type(), Some("text/plain"));
        assert_eq!(req.body_text().as_deref(), Some("plain"));
    }

    #[test]
    fn get_never_encodes() {
        let req = run(RequestDescriptor::get("/api/statuses"));
        assert!(req.headers.is_empty());
        assert!(req.body.is_none());

        let req = run(RequestDescriptor::get("/api/statuses").content_type(ContentType::Json));
        assert_eq!(req.content_type(), Some(APPLICATION_JSON));
        assert!(req.body.is_none());
    }

    #[test]
    fn delete_with_raw_body_is_untouched() {
        let req = run(RequestDescriptor::delete("/api/tags/3").body(Body::Raw(b"a=b c".to_vec())));
        assert!(req.content_type().is_none());
        assert_eq!(req.body_text().as_deref(), Some("a=b c"));
    }

    #[test]
    fn delete_with_structured_body_is_rejected() {
        let err = prepare(
            RequestDescriptor::delete("/api/tags/3").value(json!({"force": true})),
            ResponseMode::Json,
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::Encoding(_)));
    }

    #[test]
    fn incompatible_shapes_fail_fast() {
        let cases = [
            RequestDescriptor::post("/api/media").body(Body::Multipart(MultipartForm::new())),
            RequestDescriptor::post("/api/templates")
                .body(Body::Multipart(MultipartForm::new()))
                .content_type(ContentType::Json),
            RequestDescriptor::post("/api/media").json(json!({})).content_type(ContentType::Multipart),
            RequestDescriptor::post("/api/x")
                .value(json!({"a": 1}))
                .content_type(ContentType::Custom("text/csv".to_string())),
            RequestDescriptor::post("/api/tags").value(json!("not a mapping")),
        ];
        for descriptor in cases {
            let err = prepare(descriptor, ResponseMode::Json).unwrap_err();
            assert!(matches!(err, ApiError::Encoding(_)), "{err}");
        }
    }

    #[test]
    fn query_is_folded_into_path() {
        let req = run(RequestDescriptor::get("/api/conversations/abc/messages").query("page", 2u32));
        assert_eq!(req.path, "/api/conversations/abc/messages?page=2");
    }

    #[test]
    fn response_mode_override_wins() {
        let req = prepare(
            RequestDescriptor::get("/api/lang/en").response_mode(ResponseMode::Text),
            ResponseMode::Json,
        )
        .unwrap();
        assert_eq!(req.response_mode, ResponseMode::Text);

        let req = prepare(RequestDescriptor::get("/api/lang/en"), ResponseMode::Bytes).unwrap();
        assert_eq!(req.response_mode, ResponseMode::Bytes);
    }
}
