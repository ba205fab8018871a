use super::*;
use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Router,
};
use shared::{
    domain::{Priority, RecordId, ReleaseYear},
    error::ErrorCode,
};
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone)]
struct MockStore {
    lists: HashMap<String, String>,
    list_status: StatusCode,
    mutate_status: StatusCode,
    mutate_body: String,
    sheets_requested: Arc<Mutex<Vec<String>>>,
    posts: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockStore {
    fn ok() -> Self {
        Self {
            lists: HashMap::new(),
            list_status: StatusCode::OK,
            mutate_status: StatusCode::OK,
            mutate_body: r#"{"status":"success"}"#.to_string(),
            sheets_requested: Arc::new(Mutex::new(Vec::new())),
            posts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn with_list(mut self, sheet: &str, body: serde_json::Value) -> Self {
        self.lists.insert(sheet.to_string(), body.to_string());
        self
    }

    fn with_raw_list(mut self, sheet: &str, body: &str) -> Self {
        self.lists.insert(sheet.to_string(), body.to_string());
        self
    }

    fn with_list_status(mut self, status: StatusCode) -> Self {
        self.list_status = status;
        self
    }

    fn with_mutate_reply(mut self, status: StatusCode, body: &str) -> Self {
        self.mutate_status = status;
        self.mutate_body = body.to_string();
        self
    }
}

async fn handle_list(
    State(state): State<MockStore>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    let sheet = query.get("sheet").cloned().unwrap_or_default();
    state.sheets_requested.lock().await.push(sheet.clone());
    let body = state
        .lists
        .get(&sheet)
        .cloned()
        .unwrap_or_else(|| "[]".to_string());
    (state.list_status, body)
}

async fn handle_mutate(
    State(state): State<MockStore>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state.posts.lock().await.push((content_type, body));
    (state.mutate_status, state.mutate_body.clone())
}

async fn spawn_store(mock: MockStore) -> StoreClient {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new()
        .route("/exec", get(handle_list).post(handle_mutate))
        .with_state(mock);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    StoreClient::new(Url::parse(&format!("http://{addr}/exec")).expect("url"))
}

fn sample_record() -> Record {
    Record {
        id: RecordId(249504),
        title: "Harvest".into(),
        artist: "Neil Young".into(),
        year: ReleaseYear::Year(1972),
        cover_image: "https://img.example/harvest.jpg".into(),
        priority: Some(Priority::High),
        discogs_id: None,
    }
}

#[tokio::test]
async fn list_requests_named_sheet_and_parses_records() {
    let mock = MockStore::ok().with_list(
        "Wishlist",
        serde_json::json!([
            {"id": 1, "title": "Harvest", "artist": "Neil Young", "year": 1972,
             "cover_image": "", "priority": "Low"},
            {"id": 2, "title": "Pink Moon", "artist": "Nick Drake", "year": "N/A",
             "cover_image": "", "priority": ""}
        ]),
    );
    let sheets = mock.sheets_requested.clone();
    let client = spawn_store(mock).await;

    let records = client.list(ListKind::Wishlist).await.expect("list");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].priority, Some(Priority::Low));
    assert_eq!(records[1].priority, None);
    assert_eq!(sheets.lock().await.as_slice(), ["Wishlist".to_string()]);
}

#[tokio::test]
async fn list_fails_on_http_error() {
    let client = spawn_store(MockStore::ok().with_list_status(StatusCode::INTERNAL_SERVER_ERROR))
        .await;

    let err = client
        .list(ListKind::Inventory)
        .await
        .expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Network);
    assert!(err.message.contains("Inventory"), "unexpected: {err}");
}

#[tokio::test]
async fn list_fails_on_malformed_body() {
    let client = spawn_store(MockStore::ok().with_raw_list("Inventory", "<html>oops</html>")).await;

    let err = client
        .list(ListKind::Inventory)
        .await
        .expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Malformed);
}

#[tokio::test]
async fn mutate_posts_plain_text_envelope() {
    let mock = MockStore::ok();
    let posts = mock.posts.clone();
    let client = spawn_store(mock).await;

    let response = client
        .mutate(&StoreRequest::AddToWishlist(sample_record()))
        .await
        .expect("mutate");
    assert!(response.is_success());

    let posts = posts.lock().await;
    assert_eq!(posts.len(), 1);
    let (content_type, body) = &posts[0];
    assert_eq!(content_type, "text/plain;charset=utf-8");
    let body: serde_json::Value = serde_json::from_str(body).expect("json body");
    assert_eq!(body["action"], "ADD_TO_WISHLIST");
    assert_eq!(body["payload"]["id"], 249504);
    assert_eq!(body["payload"]["priority"], "High");
}

#[tokio::test]
async fn mutate_reports_application_level_rejection() {
    let client = spawn_store(MockStore::ok().with_mutate_reply(
        StatusCode::OK,
        r#"{"status":"error","message":"sheet locked"}"#,
    ))
    .await;

    let err = client
        .mutate(&StoreRequest::DeleteFromInventory { id: RecordId(5) })
        .await
        .expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Rejected);
    assert!(err.message.contains("sheet locked"), "unexpected: {err}");
}

#[tokio::test]
async fn mutate_reports_transport_failure_status() {
    let client = spawn_store(
        MockStore::ok().with_mutate_reply(StatusCode::BAD_GATEWAY, "upstream unavailable"),
    )
    .await;

    let err = client
        .mutate(&StoreRequest::DeleteFromInventory { id: RecordId(5) })
        .await
        .expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Network);
    assert!(err.message.contains("502"), "unexpected: {err}");
}

#[tokio::test]
async fn mutate_never_assumes_success_from_unreadable_reply() {
    let client = spawn_store(MockStore::ok().with_mutate_reply(StatusCode::OK, "")).await;

    let err = client
        .mutate(&StoreRequest::UpdatePriority {
            id: RecordId(5),
            priority: Priority::Medium,
        })
        .await
        .expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Malformed);
}
