use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Item, TOKEN_HEADER};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

fn token(response: &axum::response::Response) -> Option<String> {
    response
        .headers()
        .get(TOKEN_HEADER)
        .map(|v| v.to_str().unwrap().to_string())
}

// --- list ---

#[tokio::test]
async fn list_items_empty_rotates_token() {
    let resp = app().oneshot(empty_request("GET", "/items")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(token(&resp).as_deref(), Some("token-1"));
    let items: Vec<Item> = body_json(resp).await;
    assert!(items.is_empty());
}

#[tokio::test]
async fn list_filter_is_optional() {
    use tower::Service;

    let mut app = app().into_service();
    for name in ["apple", "carrot"] {
        let body = format!(r#"{{"name":"{name}"}}"#);
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(json_request("POST", "/items", &body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    for (uri, expected) in [("/items", 2), ("/items?q=", 2), ("/items?q=rot", 1), ("/items?q=zzz", 0)] {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(empty_request("GET", uri))
            .await
            .unwrap();
        let items: Vec<Item> = body_json(resp).await;
        assert_eq!(items.len(), expected, "{uri}");
    }
}

// --- create ---

#[tokio::test]
async fn create_item_returns_201_with_timestamp() {
    let resp = app()
        .oneshot(json_request("POST", "/items", r#"{"name":"a","meta":{"y":1}}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(token(&resp).is_some());
    let body: Value = body_json(resp).await;
    assert_eq!(body["name"], "a");
    assert_eq!(body["meta"], json!({"y": 1}));
    assert!(body["createdAt"].as_str().unwrap().ends_with('Z'));
}

#[tokio::test]
async fn create_item_missing_name_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/items", r#"{"tag":"x"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- delete ---

#[tokio::test]
async fn delete_item_not_found() {
    let resp = app()
        .oneshot(empty_request("DELETE", "/items/00000000-0000-0000-0000-000000000000"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_item_bad_uuid_returns_400() {
    let resp = app()
        .oneshot(empty_request("DELETE", "/items/not-a-uuid"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- echo ---

#[tokio::test]
async fn echo_reflects_query_and_body() {
    let resp = app()
        .oneshot(json_request("POST", "/echo?a=1&ids%5B%5D=2", r#"{"name":"a"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["method"], "POST");
    assert_eq!(body["query"], json!([["a", "1"], ["ids[]", "2"]]));
    assert_eq!(body["body"], json!({"name": "a"}));
}

#[tokio::test]
async fn echo_without_body_reports_null() {
    let resp = app().oneshot(empty_request("DELETE", "/echo")).await.unwrap();

    let body: Value = body_json(resp).await;
    assert_eq!(body["method"], "DELETE");
    assert_eq!(body["query"], json!([]));
    assert!(body["body"].is_null());
}

// --- status ---

#[tokio::test]
async fn status_route_answers_with_requested_code() {
    let resp = app().oneshot(empty_request("GET", "/status/503")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "Service Unavailable");
}

#[tokio::test]
async fn status_route_rejects_invalid_code() {
    let resp = app().oneshot(empty_request("GET", "/status/42")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- full lifecycle ---

#[tokio::test]
async fn item_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/items", r#"{"name":"apple","tag":"fruit"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(token(&resp).as_deref(), Some("token-1"));
    let created: Item = body_json(resp).await;
    assert_eq!(created.name, "apple");
    assert_eq!(created.tag.as_deref(), Some("fruit"));
    let id = created.id;

    // second item that the filter should skip
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/items", r#"{"name":"carrot"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    // filtered list
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/items?q=app"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(token(&resp).as_deref(), Some("token-3"));
    let items: Vec<Item> = body_json(resp).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0], created);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &format!("/items/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(token(&resp).is_none());
    let body = body_bytes(resp).await;
    assert!(body.is_empty());

    // delete again: 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &format!("/items/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // list: only the carrot remains
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/items"))
        .await
        .unwrap();
    let items: Vec<Item> = body_json(resp).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "carrot");
}
