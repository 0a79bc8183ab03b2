// streambell-core/src/tasks/token_refresh.rs
//
// Fixed-schedule OAuth refresh. Success swaps the token pair in the store
// and persists it; anything else leaves the stored credentials untouched and
// closes the polling gate until the next successful refresh.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client as ReqwestClient;
use tokio::time::interval;
use tracing::{error, info};

use crate::auth::CredentialStore;
use crate::platforms::twitch::requests::oauth::refresh_access_token;

/// Performs one refresh attempt against `token_url`.
pub async fn run_token_refresh(http: &ReqwestClient, token_url: &str, store: &CredentialStore) {
    let Some(cred) = store.twitch().await else {
        error!("Twitch credentials not loaded; cannot refresh token.");
        return;
    };

    info!("Attempting to refresh Twitch token...");
    match refresh_access_token(http, token_url, &cred).await {
        Ok(tokens) => {
            match store
                .set_twitch_tokens(&tokens.access_token, &tokens.refresh_token)
                .await
            {
                Ok(()) => {
                    store.set_twitch_enabled(true);
                    info!("Successfully refreshed Twitch token.");
                }
                Err(e) => {
                    // The store only commits after a successful file write,
                    // so the stale pair is retried next cycle.
                    store.set_twitch_enabled(false);
                    error!("Failed to persist refreshed Twitch tokens: {e}");
                }
            }
        }
        Err(e) => {
            store.set_twitch_enabled(false);
            error!("Failed to refresh Twitch token: {e}");
        }
    }
}

/// Spawns the fixed-interval token refresher (first attempt immediately).
pub fn spawn_token_refresh_task(
    store: Arc<CredentialStore>,
    token_url: String,
    refresh_interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let http = ReqwestClient::new();
        let mut ticker = interval(refresh_interval);
        loop {
            ticker.tick().await;
            run_token_refresh(&http, &token_url, &store).await;
        }
    })
}
