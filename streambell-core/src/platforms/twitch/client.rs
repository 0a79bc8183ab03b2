// streambell-core/src/platforms/twitch/client.rs

use reqwest::Client as ReqwestClient;

/// A small wrapper for calling Helix endpoints with one token snapshot.
///
/// Built fresh from the credential store before each batch of calls, so a
/// mid-tick token refresh is picked up on the next batch.
pub struct TwitchHelixClient {
    http: ReqwestClient,
    bearer_token: String,
    client_id: String,
    base_url: String,
}

impl TwitchHelixClient {
    pub fn new(bearer_token: &str, client_id: &str) -> Self {
        Self {
            http: ReqwestClient::new(),
            bearer_token: bearer_token.to_string(),
            client_id: client_id.to_string(),
            base_url: "https://api.twitch.tv/helix".to_string(),
        }
    }

    /// Points the client at a different Helix root; used by tests.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn bearer_token(&self) -> &str {
        &self.bearer_token
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn http_client(&self) -> &ReqwestClient {
        &self.http
    }
}
