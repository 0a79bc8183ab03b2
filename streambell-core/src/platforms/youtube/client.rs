// streambell-core/src/platforms/youtube/client.rs

use reqwest::Client as ReqwestClient;

/// Wrapper for the YouTube Data API v3, keyed by a simple API key.
pub struct YouTubeDataClient {
    http: ReqwestClient,
    api_key: String,
    base_url: String,
}

impl YouTubeDataClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            http: ReqwestClient::new(),
            api_key: api_key.to_string(),
            base_url: "https://www.googleapis.com/youtube/v3".to_string(),
        }
    }

    /// Points the client at a different API root; used by tests.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn http_client(&self) -> &ReqwestClient {
        &self.http
    }
}

/// Derives the uploads-feed playlist id from a channel id ("UC..." => "UU...").
pub fn uploads_playlist_id(channel_id: &str) -> String {
    if channel_id.len() > 2 {
        format!("UU{}", &channel_id[2..])
    } else {
        channel_id.to_string()
    }
}
