// tests/token_refresh_tests.rs
//
// Exercises the refresh exchange against a local mock of the OAuth endpoint.

use reqwest::Client as ReqwestClient;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use streambell_common::models::credential::{TokenFile, TwitchCredential, YouTubeCredential};
use streambell_core::auth::CredentialStore;
use streambell_core::tasks::token_refresh::run_token_refresh;

fn tokens() -> TokenFile {
    TokenFile {
        discord_token: "discord-token".to_string(),
        twitch: Some(TwitchCredential {
            client_id: "cid".to_string(),
            client_secret: "secret".to_string(),
            access_token: "old-access".to_string(),
            refresh_token: "old-refresh".to_string(),
        }),
        youtube: Some(YouTubeCredential {
            api_key: "yt-key".to_string(),
        }),
    }
}

fn store_in(dir: &tempfile::TempDir) -> CredentialStore {
    CredentialStore::from_tokens(&dir.path().join("token.json"), tokens())
}

#[tokio::test]
async fn successful_refresh_updates_store_and_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "new-access",
            "refresh_token": "new-refresh",
            "expires_in": 14124,
            "token_type": "bearer"
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    store.set_twitch_enabled(false);

    let url = format!("{}/oauth2/token", server.uri());
    run_token_refresh(&ReqwestClient::new(), &url, &store).await;

    let cred = store.twitch().await.unwrap();
    assert_eq!(cred.access_token, "new-access");
    assert_eq!(cred.refresh_token, "new-refresh");
    assert!(store.twitch_enabled());

    // The whole token file was persisted, and a reload sees the new pair.
    let reloaded = CredentialStore::load(&dir.path().join("token.json"))
        .await
        .unwrap();
    let cred = reloaded.twitch().await.unwrap();
    assert_eq!(cred.access_token, "new-access");
    assert_eq!(reloaded.youtube_api_key().await.as_deref(), Some("yt-key"));
}

#[tokio::test]
async fn http_500_leaves_tokens_untouched_and_closes_gate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream broke"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    assert!(store.twitch_enabled());

    let url = format!("{}/oauth2/token", server.uri());
    run_token_refresh(&ReqwestClient::new(), &url, &store).await;

    let cred = store.twitch().await.unwrap();
    assert_eq!(cred.access_token, "old-access");
    assert_eq!(cred.refresh_token, "old-refresh");
    assert!(!store.twitch_enabled());
}

#[tokio::test]
async fn missing_refresh_token_in_body_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "new-access"
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);

    let url = format!("{}/oauth2/token", server.uri());
    run_token_refresh(&ReqwestClient::new(), &url, &store).await;

    let cred = store.twitch().await.unwrap();
    assert_eq!(cred.access_token, "old-access");
    assert!(!store.twitch_enabled());
}

#[tokio::test]
async fn gate_reopens_after_a_later_successful_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "new-access",
            "refresh_token": "new-refresh"
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir);
    let url = format!("{}/oauth2/token", server.uri());
    let http = ReqwestClient::new();

    run_token_refresh(&http, &url, &store).await;
    assert!(!store.twitch_enabled());

    run_token_refresh(&http, &url, &store).await;
    assert!(store.twitch_enabled());
    assert_eq!(store.twitch().await.unwrap().access_token, "new-access");
}
