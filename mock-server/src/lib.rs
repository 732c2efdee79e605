use std::{collections::BTreeMap, sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    routing::{any, get, post, put},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

/// How long `/api/slow` stalls before answering.
pub const SLOW_RESPONSE: Duration = Duration::from_secs(5);

/// Length of the `/api/big` body, past ureq's default 10 MiB read limit.
pub const BIG_RESPONSE_LEN: usize = 11 * 1024 * 1024;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Status {
    pub id: u32,
    pub name: String,
}

/// Status payload. Only accepted URL-form-encoded.
#[derive(Deserialize)]
pub struct StatusForm {
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Template {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub body: String,
}

/// Template payload. Only accepted as JSON.
#[derive(Deserialize)]
pub struct CreateTemplate {
    pub name: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Deserialize)]
pub struct MessagePage {
    pub page: Option<u32>,
}

#[derive(Default)]
pub struct Store {
    next_id: u32,
    statuses: BTreeMap<u32, Status>,
    templates: BTreeMap<u32, Template>,
}

impl Store {
    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

pub type Db = Arc<RwLock<Store>>;

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/api/statuses", get(list_statuses).post(create_status))
        .route("/api/statuses/{id}", put(update_status).delete(delete_status))
        .route("/api/templates", post(create_template))
        .route("/api/conversations/{uuid}/messages", get(list_messages))
        .route("/api/echo/{*rest}", any(echo))
        .route("/api/slow", get(slow))
        .route("/api/big", get(big))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Success envelope, as the helpdesk backend sends it.
pub fn envelope(data: impl Serialize) -> Json<Value> {
    Json(json!({ "status": "success", "data": data }))
}

/// Error envelope with the given status code.
pub fn error_envelope(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (
        status,
        Json(json!({
            "status": "error",
            "message": message,
            "error_type": "InputException",
            "data": null
        })),
    )
}

async fn list_statuses(State(db): State<Db>) -> Json<Value> {
    let store = db.read().await;
    envelope(store.statuses.values().cloned().collect::<Vec<_>>())
}

async fn create_status(State(db): State<Db>, Form(input): Form<StatusForm>) -> (StatusCode, Json<Value>) {
    let mut store = db.write().await;
    let status = Status {
        id: store.next_id(),
        name: input.name,
    };
    debug!(id = status.id, name = %status.name, "created status");
    store.statuses.insert(status.id, status.clone());
    (StatusCode::CREATED, envelope(status))
}

async fn update_status(State(db): State<Db>, Path(id): Path<u32>, Form(input): Form<StatusForm>) -> ApiResult {
    let mut store = db.write().await;
    let status = store
        .statuses
        .get_mut(&id)
        .ok_or_else(|| error_envelope(StatusCode::NOT_FOUND, "Status not found"))?;
    status.name = input.name;
    Ok(envelope(status.clone()))
}

async fn delete_status(State(db): State<Db>, Path(id): Path<u32>) -> Result<StatusCode, (StatusCode, Json<Value>)> {
    let mut store = db.write().await;
    store
        .statuses
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| error_envelope(StatusCode::NOT_FOUND, "Status not found"))
}

async fn create_template(State(db): State<Db>, Json(input): Json<CreateTemplate>) -> (StatusCode, Json<Value>) {
    let mut store = db.write().await;
    let template = Template {
        id: store.next_id(),
        name: input.name,
        body: input.body,
    };
    store.templates.insert(template.id, template.clone());
    (StatusCode::CREATED, envelope(template))
}

async fn list_messages(Path(uuid): Path<Uuid>, Query(params): Query<MessagePage>) -> Json<Value> {
    envelope(json!({
        "conversation_uuid": uuid,
        "page": params.page.unwrap_or(1),
        "results": []
    }))
}

/// Reflect the request back so tests can see exactly what arrived.
async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Value> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    envelope(json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "content_type": content_type,
        "body": String::from_utf8_lossy(&body),
    }))
}

async fn slow() -> StatusCode {
    tokio::time::sleep(SLOW_RESPONSE).await;
    StatusCode::NO_CONTENT
}

async fn big() -> ([(header::HeaderName, &'static str); 1], Vec<u8>) {
    ([(header::CONTENT_TYPE, "application/octet-stream")], vec![b'x'; BIG_RESPONSE_LEN])
}
