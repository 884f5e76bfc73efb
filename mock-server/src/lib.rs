use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use axum::{
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

/// Response header carrying a freshly rotated access token.
pub const TOKEN_HEADER: &str = "x-token";

/// How long `/slow` waits before answering.
pub const SLOW_DELAY: Duration = Duration::from_secs(2);

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct CreateItem {
    pub name: String,
    pub tag: Option<String>,
    pub meta: Option<Value>,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub q: Option<String>,
}

#[derive(Default)]
pub struct AppState {
    items: RwLock<HashMap<Uuid, Item>>,
    issued: AtomicU64,
}

impl AppState {
    fn rotate_token(&self) -> String {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        format!("token-{n}")
    }
}

pub type Db = Arc<AppState>;

pub fn app() -> Router {
    let db: Db = Arc::default();
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/{id}", delete(delete_item))
        .route("/echo", get(echo).post(echo).delete(echo))
        .route("/status/{code}", get(status))
        .route("/slow", get(slow))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_items(State(db): State<Db>, Query(params): Query<ListParams>) -> impl IntoResponse {
    let items = db.items.read().await;
    let mut found: Vec<Item> = items
        .values()
        .filter(|item| params.q.as_deref().is_none_or(|q| item.name.contains(q)))
        .cloned()
        .collect();
    found.sort_by_key(|item| item.created_at);
    ([(TOKEN_HEADER, db.rotate_token())], Json(found))
}

async fn create_item(State(db): State<Db>, Json(input): Json<CreateItem>) -> impl IntoResponse {
    let item = Item {
        id: Uuid::new_v4(),
        name: input.name,
        tag: input.tag,
        meta: input.meta,
        created_at: Utc::now(),
    };
    db.items.write().await.insert(item.id, item.clone());
    info!(id = %item.id, "item created");
    (StatusCode::CREATED, [(TOKEN_HEADER, db.rotate_token())], Json(item))
}

async fn delete_item(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<StatusCode, StatusCode> {
    let mut items = db.items.write().await;
    items.remove(&id).map(|_| StatusCode::NO_CONTENT).ok_or(StatusCode::NOT_FOUND)
}

/// Reflect the request back so callers can see exactly what went over the wire.
async fn echo(
    method: Method,
    Query(query): Query<Vec<(String, String)>>,
    body: String,
) -> Json<Value> {
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or(Value::String(body))
    };
    Json(json!({
        "method": method.as_str(),
        "query": query,
        "body": body,
    }))
}

async fn status(Path(code): Path<u16>) -> (StatusCode, Json<Value>) {
    match StatusCode::from_u16(code) {
        Ok(status) => (status, Json(json!({ "error": status.canonical_reason() }))),
        Err(_) => (StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid status code" }))),
    }
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(SLOW_DELAY).await;
    Json(json!({}))
}
