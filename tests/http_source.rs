use std::time::Duration;

use httpmock::MockServer;
use reqwest::Url;

use polemap::application::source::{FetchError, PostSource};
use polemap::application::store::{LoadOrigin, PostStore};
use polemap::domain::posts::{PostId, normalize_posts};
use polemap::infra::api_client::HttpPostSource;

fn source(server: &MockServer) -> HttpPostSource {
    let base = Url::parse(&server.base_url()).expect("mock base url");
    HttpPostSource::new(&base, Duration::from_secs(5)).expect("client")
}

#[tokio::test]
async fn fetches_and_normalizes_posts() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method("GET")
                .path("/api/posts")
                .header("accept", "application/json");
            then.status(200)
                .header("content-type", "application/json")
                .body(
                    r#"[
                        {"id": 1, "name": "Pole A", "lat": 40.7128, "lng": -74.006, "status": "active"},
                        {"id": 2, "lat": 40.7138, "lng": -74.005, "status": "MAINTENANCE", "area": "Midtown"},
                        {"id": 3, "name": "No coordinates"}
                    ]"#,
                );
        })
        .await;

    let raw = source(&server).fetch_posts().await.expect("fetch succeeds");
    mock.assert_async().await;

    let normalized = normalize_posts(raw);
    assert_eq!(normalized.posts.len(), 2);
    assert_eq!(normalized.rejected.len(), 1);
    assert_eq!(normalized.posts[1].id, PostId::from(2));
    assert_eq!(normalized.posts[1].name, "Post 2");
    assert_eq!(normalized.posts[1].area.as_deref(), Some("Midtown"));
}

#[tokio::test]
async fn server_errors_surface_as_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method("GET").path("/api/posts");
            then.status(500).body("boom");
        })
        .await;

    let err = source(&server).fetch_posts().await.expect_err("500 fails");
    assert!(matches!(err, FetchError::Status(500)));
}

#[tokio::test]
async fn malformed_payload_is_a_decode_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method("GET").path("/api/posts");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"posts": []}"#);
        })
        .await;

    let err = source(&server).fetch_posts().await.expect_err("object is not a list");
    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn store_falls_back_when_remote_fails() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method("GET").path("/api/posts");
            then.status(503);
        })
        .await;

    let store = PostStore::load(&source(&server)).await;
    assert_eq!(store.origin(), LoadOrigin::Fallback);
    assert_eq!(store.posts().len(), 2);
    assert_eq!(store.posts()[0].name, "Pole A");
}

#[tokio::test]
async fn empty_list_is_not_replaced() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method("GET").path("/api/posts");
            then.status(200)
                .header("content-type", "application/json")
                .body("[]");
        })
        .await;

    let store = PostStore::load(&source(&server)).await;
    assert_eq!(store.origin(), LoadOrigin::Source);
    assert!(store.posts().is_empty());
}

#[tokio::test]
async fn unreachable_host_is_a_transport_error() {
    let base = Url::parse("http://127.0.0.1:9").expect("url");
    let source = HttpPostSource::new(&base, Duration::from_millis(500)).expect("client");
    let err = source.fetch_posts().await.expect_err("nothing listens on port 9");
    assert!(matches!(err, FetchError::Transport(_)));
}
