// streambell-core/src/platforms/youtube/requests.rs

use serde::Deserialize;

use crate::platforms::youtube::client::YouTubeDataClient;
use crate::Error;

/// Response from the "Channels: list" endpoint with `forHandle`.
#[derive(Debug, Deserialize)]
pub struct ChannelsResponse {
    #[serde(default)]
    pub items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
pub struct ChannelItem {
    pub id: String,
    pub snippet: ChannelSnippet,
}

#[derive(Debug, Deserialize)]
pub struct ChannelSnippet {
    pub title: String,
}

/// A handle resolved to its stable channel id and display title.
#[derive(Debug, Clone)]
pub struct ResolvedChannel {
    pub channel_id: String,
    pub title: String,
}

/// Response from the "PlaylistItems: list" endpoint.
#[derive(Debug, Deserialize)]
pub struct PlaylistItemsResponse {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    pub snippet: PlaylistItemSnippet,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemSnippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub published_at: String,
    pub resource_id: ResourceId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub video_id: String,
}

/// Resolves a handle (without the leading `@`) to a channel. `Ok(None)`
/// means the handle has no match.
pub async fn resolve_handle(
    client: &YouTubeDataClient,
    handle_name: &str,
) -> Result<Option<ResolvedChannel>, Error> {
    let url = format!(
        "{}/channels?part=id,snippet&forHandle={}&key={}",
        client.base_url(),
        urlencoding::encode(handle_name),
        client.api_key()
    );

    let resp = client
        .http_client()
        .get(&url)
        .send()
        .await
        .map_err(|e| Error::Platform(format!("resolve handle network error: {e}")))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Platform(format!(
            "resolve handle: HTTP {status} => {body}"
        )));
    }

    let body = resp.text().await?;
    let channels: ChannelsResponse = serde_json::from_str(&body)
        .map_err(|e| Error::Platform(format!("resolve handle parse error: {e}")))?;

    Ok(channels.items.into_iter().next().map(|item| ResolvedChannel {
        channel_id: item.id,
        title: item.snippet.title,
    }))
}

/// Fetches the most recent items from an uploads playlist, newest first.
pub async fn fetch_playlist_items(
    client: &YouTubeDataClient,
    playlist_id: &str,
    max_results: usize,
) -> Result<PlaylistItemsResponse, Error> {
    let url = format!(
        "{}/playlistItems?part=snippet&playlistId={}&maxResults={}&order=date&key={}",
        client.base_url(),
        urlencoding::encode(playlist_id),
        max_results,
        client.api_key()
    );

    let resp = client
        .http_client()
        .get(&url)
        .send()
        .await
        .map_err(|e| Error::Platform(format!("playlist items network error: {e}")))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Platform(format!(
            "playlist items: HTTP {status} => {body}"
        )));
    }

    let body = resp.text().await?;
    let items: PlaylistItemsResponse = serde_json::from_str(&body)
        .map_err(|e| Error::Platform(format!("playlist items parse error: {e}")))?;
    Ok(items)
}
