use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Status, Template};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Deserialize the `data` field of a success envelope.
async fn body_data<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let envelope: Value = body_json(response).await;
    assert_eq!(envelope["status"], "success");
    serde_json::from_value(envelope["data"].clone()).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn form_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(body.to_string())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- statuses ---

#[tokio::test]
async fn list_statuses_empty() {
    let app = app();
    let resp = app
        .oneshot(Request::builder().uri("/api/statuses").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let statuses: Vec<Status> = body_data(resp).await;
    assert!(statuses.is_empty());
}

#[tokio::test]
async fn create_status_accepts_form_body() {
    let app = app();
    let resp = app
        .oneshot(form_request("POST", "/api/statuses", "name=Open"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let status: Status = body_data(resp).await;
    assert_eq!(status.name, "Open");
}

#[tokio::test]
async fn create_status_rejects_json_body() {
    let app = app();
    let resp = app
        .oneshot(json_request("POST", "/api/statuses", r#"{"name":"Open"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn update_status_not_found_has_error_envelope() {
    let app = app();
    let resp = app
        .oneshot(form_request("PUT", "/api/statuses/99", "name=Closed"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let envelope: Value = body_json(resp).await;
    assert_eq!(envelope["status"], "error");
    assert_eq!(envelope["message"], "Status not found");
}

#[tokio::test]
async fn delete_status_not_found() {
    let app = app();
    let resp = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/statuses/99")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- templates ---

#[tokio::test]
async fn create_template_accepts_json_body() {
    let app = app();
    let resp = app
        .oneshot(json_request("POST", "/api/templates", r#"{"name":"Welcome"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let template: Template = body_data(resp).await;
    assert_eq!(template.name, "Welcome");
}

#[tokio::test]
async fn create_template_rejects_form_body() {
    let app = app();
    let resp = app
        .oneshot(form_request("POST", "/api/templates", "name=Welcome"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

// --- messages ---

#[tokio::test]
async fn list_messages_reports_page() {
    let app = app();
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/conversations/6f1c1c3e-8f0a-4c55-9a43-0b4ab1f8d9e2/messages?page=2")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let data: Value = body_data(resp).await;
    assert_eq!(data["page"], 2);
    assert_eq!(data["conversation_uuid"], "6f1c1c3e-8f0a-4c55-9a43-0b4ab1f8d9e2");
}

#[tokio::test]
async fn list_messages_bad_uuid_returns_400() {
    let app = app();
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/conversations/not-a-uuid/messages")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- echo ---

#[tokio::test]
async fn echo_reflects_request() {
    let app = app();
    let resp = app
        .oneshot(form_request("PUT", "/api/echo/inboxes/4/toggle?x=1", "a=b"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let data: Value = body_data(resp).await;
    assert_eq!(data["method"], "PUT");
    assert_eq!(data["path"], "/api/echo/inboxes/4/toggle");
    assert_eq!(data["query"], "x=1");
    assert_eq!(data["content_type"], "application/x-www-form-urlencoded");
    assert_eq!(data["body"], "a=b");
}

// --- full status lifecycle ---

#[tokio::test]
async fn status_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(form_request("POST", "/api/statuses", "name=Open"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Status = body_data(resp).await;
    let id = created.id;

    // update
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(form_request("PUT", &format!("/api/statuses/{id}"), "name=Waiting+on+customer"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Status = body_data(resp).await;
    assert_eq!(updated.name, "Waiting on customer");

    // list
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(Request::builder().uri("/api/statuses").body(String::new()).unwrap())
        .await
        .unwrap();
    let statuses: Vec<Status> = body_data(resp).await;
    assert_eq!(statuses, vec![updated]);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            Request::builder()
                .method("DELETE")
                .uri(&format!("/api/statuses/{id}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // list after delete is empty
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(Request::builder().uri("/api/statuses").body(String::new()).unwrap())
        .await
        .unwrap();
    let statuses: Vec<Status> = body_data(resp).await;
    assert!(statuses.is_empty());
}
