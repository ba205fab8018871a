use super::*;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Router,
};
use serde_json::json;
use shared::error::ErrorCode;
use tokio::{net::TcpListener, sync::Mutex};

const TOKEN: &str = "test-token";

#[derive(Clone, Copy)]
enum PriceReply {
    Quote,
    Missing,
    Garbage,
}

#[derive(Clone)]
struct MockCatalog {
    search_status: StatusCode,
    release_status: StatusCode,
    price: PriceReply,
    search_hits: Arc<AtomicUsize>,
    auth_headers: Arc<Mutex<Vec<String>>>,
    price_queries: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl MockCatalog {
    fn ok() -> Self {
        Self {
            search_status: StatusCode::OK,
            release_status: StatusCode::OK,
            price: PriceReply::Quote,
            search_hits: Arc::new(AtomicUsize::new(0)),
            auth_headers: Arc::new(Mutex::new(Vec::new())),
            price_queries: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

async fn record_auth(state: &MockCatalog, headers: &HeaderMap) {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state.auth_headers.lock().await.push(value);
}

async fn handle_search(
    State(state): State<MockCatalog>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    state.search_hits.fetch_add(1, Ordering::SeqCst);
    record_auth(&state, &headers).await;
    if !state.search_status.is_success() {
        return (state.search_status, "{}".to_string());
    }
    assert_eq!(query.get("type").map(String::as_str), Some("release"));
    let body = json!({
        "results": [
            {"id": 101, "title": "Miles Davis - Kind Of Blue", "year": "1959",
             "cover_image": "https://img.example/kob.jpg"},
            {"id": 102, "title": "Untitled Bootleg"},
            {"id": 103, "title": "Various - Jazz - The Collection", "year": ""}
        ]
    });
    (StatusCode::OK, body.to_string())
}

async fn handle_release(
    State(state): State<MockCatalog>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> (StatusCode, String) {
    record_auth(&state, &headers).await;
    if !state.release_status.is_success() {
        return (state.release_status, r#"{"message":"Release not found."}"#.into());
    }
    let body = json!({
        "id": id,
        "title": "Kind Of Blue",
        "artists": [{"name": "Miles Davis"}, {"name": "John Coltrane"}],
        "year": 0,
        "images": [{"uri": "https://img.example/front.jpg"}, {"uri": "https://img.example/back.jpg"}],
        "tracklist": [
            {"position": "A1", "title": "So What", "duration": "9:22"},
            {"position": "A2", "title": "Freddie Freeloader", "duration": "9:46"}
        ],
        "formats": [{"name": "Vinyl", "qty": "1", "descriptions": ["LP", "Album", "Mono"]}],
        "country": "",
        "notes": "   "
    });
    (StatusCode::OK, body.to_string())
}

async fn handle_price(
    State(state): State<MockCatalog>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    state.price_queries.lock().await.push(query);
    match state.price {
        PriceReply::Quote => (
            StatusCode::OK,
            json!({"lowest_price": {"currency": "JPY", "value": 4500.0}, "num_for_sale": 3})
                .to_string(),
        ),
        PriceReply::Missing => (StatusCode::NOT_FOUND, "{}".to_string()),
        PriceReply::Garbage => (StatusCode::OK, "not json".to_string()),
    }
}

async fn spawn_catalog(mock: MockCatalog) -> CatalogClient {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new()
        .route("/database/search", get(handle_search))
        .route("/releases/:id", get(handle_release))
        .route("/marketplace/stats/:id", get(handle_price))
        .with_state(mock);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    CatalogClient::new(format!("http://{addr}/"), TOKEN)
}

#[tokio::test]
async fn blank_query_never_reaches_the_network() {
    let mock = MockCatalog::ok();
    let hits = mock.search_hits.clone();
    let client = spawn_catalog(mock).await;

    assert!(client.search("").await.expect("search").is_empty());
    assert!(client.search("   ").await.expect("search").is_empty());
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn search_maps_combined_titles_and_missing_years() {
    let mock = MockCatalog::ok();
    let auth = mock.auth_headers.clone();
    let client = spawn_catalog(mock).await;

    let results = client.search("kind of blue").await.expect("search");

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].id, RecordId(101));
    assert_eq!(results[0].artist, "Miles Davis");
    assert_eq!(results[0].title, "Kind Of Blue");
    assert_eq!(results[0].year.to_string(), "1959");
    assert_eq!(results[0].cover_image, "https://img.example/kob.jpg");

    assert_eq!(results[1].artist, UNKNOWN_ARTIST);
    assert_eq!(results[1].title, "Untitled Bootleg");
    assert_eq!(results[1].year, ReleaseYear::unknown());
    assert_eq!(results[1].cover_image, "");

    assert_eq!(results[2].artist, "Various");
    assert_eq!(results[2].title, "Jazz - The Collection");
    assert_eq!(results[2].year, ReleaseYear::unknown());

    assert_eq!(
        auth.lock().await.as_slice(),
        [format!("Discogs token={TOKEN}")]
    );
}

#[tokio::test]
async fn search_surfaces_http_failure() {
    let mock = MockCatalog {
        search_status: StatusCode::TOO_MANY_REQUESTS,
        ..MockCatalog::ok()
    };
    let client = spawn_catalog(mock).await;

    let err = client.search("anything").await.expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Network);
    assert!(err.message.contains("429"), "unexpected: {err}");
}

#[tokio::test]
async fn details_combine_release_and_price() {
    let mock = MockCatalog::ok();
    let price_queries = mock.price_queries.clone();
    let client = spawn_catalog(mock).await;

    let detail = client.details(RecordId(101)).await.expect("details");

    assert_eq!(detail.record.id, RecordId(101));
    assert_eq!(detail.record.artist, "Miles Davis, John Coltrane");
    assert_eq!(detail.record.year, ReleaseYear::unknown());
    assert_eq!(detail.record.cover_image, "https://img.example/front.jpg");
    assert_eq!(detail.record.discogs_id, Some(CatalogId(101)));
    assert_eq!(detail.tracklist.len(), 2);
    assert_eq!(detail.tracklist[0].title, "So What");
    assert_eq!(detail.formats[0].descriptions, vec!["LP", "Album", "Mono"]);
    assert_eq!(detail.country, UNKNOWN_COUNTRY);
    assert_eq!(detail.notes, None);

    let price = detail.price_suggestion.expect("price");
    assert_eq!(price.currency, "JPY");
    assert_eq!(price.value, 4500.0);
    let queries = price_queries.lock().await;
    assert_eq!(
        queries[0].get("curr_abbr").map(String::as_str),
        Some("JPY")
    );
}

#[tokio::test]
async fn details_survive_missing_price() {
    let mock = MockCatalog {
        price: PriceReply::Missing,
        ..MockCatalog::ok()
    };
    let client = spawn_catalog(mock).await;

    let detail = client.details(RecordId(7)).await.expect("details");
    assert_eq!(detail.record.title, "Kind Of Blue");
    assert!(detail.price_suggestion.is_none());
}

#[tokio::test]
async fn details_survive_unparsable_price() {
    let mock = MockCatalog {
        price: PriceReply::Garbage,
        ..MockCatalog::ok()
    };
    let client = spawn_catalog(mock).await;

    let detail = client.details(RecordId(7)).await.expect("details");
    assert_eq!(detail.tracklist.len(), 2);
    assert!(detail.price_suggestion.is_none());
}

#[tokio::test]
async fn details_report_unknown_release() {
    let mock = MockCatalog {
        release_status: StatusCode::NOT_FOUND,
        ..MockCatalog::ok()
    };
    let client = spawn_catalog(mock).await;

    let err = client.details(RecordId(999)).await.expect_err("should fail");
    assert_eq!(err.code, ErrorCode::NotFound);
    assert_eq!(err.message, "Record not found: 999");
}

#[tokio::test]
async fn configured_currency_is_requested() {
    let mock = MockCatalog::ok();
    let price_queries = mock.price_queries.clone();
    let client = spawn_catalog(mock).await.with_currency("EUR");

    client.details(RecordId(3)).await.expect("details");
    let queries = price_queries.lock().await;
    assert_eq!(
        queries[0].get("curr_abbr").map(String::as_str),
        Some("EUR")
    );
}

#[tokio::test]
async fn missing_catalog_is_unavailable() {
    let catalog = MissingCatalog;
    assert!(catalog.search(" ").await.expect("blank search").is_empty());

    let err = catalog.search("harvest").await.expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Unavailable);
    let err = catalog.details(RecordId(1)).await.expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Unavailable);
}

#[test]
fn split_handles_edge_shapes() {
    assert_eq!(
        split_artist_title("Neil Young - Harvest"),
        ("Neil Young".to_string(), "Harvest".to_string())
    );
    assert_eq!(
        split_artist_title(" - Harvest"),
        (UNKNOWN_ARTIST.to_string(), "Harvest".to_string())
    );
    assert_eq!(
        split_artist_title("Neil Young - "),
        ("Neil Young".to_string(), "Neil Young - ".to_string())
    );
    assert_eq!(
        split_artist_title("Harvest"),
        (UNKNOWN_ARTIST.to_string(), "Harvest".to_string())
    );
}
