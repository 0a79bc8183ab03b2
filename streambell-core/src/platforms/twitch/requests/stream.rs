// streambell-core/src/platforms/twitch/requests/stream.rs

use serde::Deserialize;

use crate::platforms::twitch::client::TwitchHelixClient;
use crate::Error;

/// Response from the "Get Streams" endpoint.
#[derive(Debug, Deserialize)]
pub struct StreamsResponse {
    pub data: Vec<StreamData>,
}

/// Single live-stream record.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamData {
    pub id: String,
    pub user_login: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub game_name: String,
}

/// Queries the currently-live streams for up to one batch of logins, joined
/// as repeated `user_login` query parameters.
pub async fn fetch_live_streams(
    client: &TwitchHelixClient,
    logins: &[String],
) -> Result<StreamsResponse, Error> {
    let query = logins
        .iter()
        .map(|l| format!("user_login={}", urlencoding::encode(l)))
        .collect::<Vec<_>>()
        .join("&");
    let url = format!("{}/streams?{}", client.base_url(), query);

    let resp = client
        .http_client()
        .get(&url)
        .header("Client-Id", client.client_id())
        .header("Authorization", format!("Bearer {}", client.bearer_token()))
        .send()
        .await
        .map_err(|e| Error::Platform(format!("get streams network error: {e}")))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Platform(format!("get streams: HTTP {status} => {body}")));
    }

    let body = resp.text().await?;
    let streams: StreamsResponse = serde_json::from_str(&body)
        .map_err(|e| Error::Platform(format!("get streams parse error: {e}")))?;
    Ok(streams)
}
