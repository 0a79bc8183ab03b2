// tests/platform_request_tests.rs
//
// Wire-level checks of the Helix and Data API request helpers against a
// local mock server.

use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use streambell_core::platforms::twitch::requests::stream::fetch_live_streams;
use streambell_core::platforms::twitch::requests::user::fetch_user;
use streambell_core::platforms::twitch::TwitchHelixClient;
use streambell_core::platforms::youtube::requests::{fetch_playlist_items, resolve_handle};
use streambell_core::platforms::youtube::YouTubeDataClient;
use streambell_core::Error;

#[tokio::test]
async fn streams_query_carries_auth_headers_and_parses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/streams"))
        .and(header("Client-Id", "cid"))
        .and(header("Authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [
                {"id": "s-1", "user_login": "alpha", "title": "Hi", "game_name": "Chess"},
                {"id": "s-2", "user_login": "beta"}
            ]
        })))
        .mount(&server)
        .await;

    let client = TwitchHelixClient::new("tok", "cid").with_base_url(&server.uri());
    let resp = fetch_live_streams(&client, &["alpha".to_string(), "beta".to_string()])
        .await
        .unwrap();

    assert_eq!(resp.data.len(), 2);
    assert_eq!(resp.data[0].game_name, "Chess");
    // Missing optional fields default to empty.
    assert_eq!(resp.data[1].title, "");
}

#[tokio::test]
async fn streams_http_error_surfaces_as_platform_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/streams"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let client = TwitchHelixClient::new("tok", "cid").with_base_url(&server.uri());
    let err = fetch_live_streams(&client, &["alpha".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Platform(_)));
}

#[tokio::test]
async fn unknown_user_lookup_returns_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("login", "ghost"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
        .mount(&server)
        .await;

    let client = TwitchHelixClient::new("tok", "cid").with_base_url(&server.uri());
    assert!(fetch_user(&client, "ghost").await.unwrap().is_none());
}

#[tokio::test]
async fn handle_resolution_round_trips() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/channels"))
        .and(query_param("forHandle", "creator"))
        .and(query_param("key", "yt-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{"id": "UCxyz", "snippet": {"title": "Creator"}}]
        })))
        .mount(&server)
        .await;

    let client = YouTubeDataClient::new("yt-key").with_base_url(&server.uri());
    let resolved = resolve_handle(&client, "creator").await.unwrap().unwrap();
    assert_eq!(resolved.channel_id, "UCxyz");
    assert_eq!(resolved.title, "Creator");
}

#[tokio::test]
async fn playlist_items_parse_camel_case_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("playlistId", "UUxyz"))
        .and(query_param("maxResults", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{
                "snippet": {
                    "title": "New video",
                    "description": "words",
                    "publishedAt": "2025-06-15T10:00:00Z",
                    "resourceId": {"videoId": "vid-1"}
                }
            }]
        })))
        .mount(&server)
        .await;

    let client = YouTubeDataClient::new("yt-key").with_base_url(&server.uri());
    let resp = fetch_playlist_items(&client, "UUxyz", 5).await.unwrap();
    assert_eq!(resp.items.len(), 1);
    assert_eq!(resp.items[0].snippet.resource_id.video_id, "vid-1");
    assert_eq!(resp.items[0].snippet.published_at, "2025-06-15T10:00:00Z");
}
