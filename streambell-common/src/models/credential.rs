// streambell-common/src/models/credential.rs

use serde::{Deserialize, Serialize};

/// Twitch OAuth client credentials plus the current token pair.
///
/// Mutated only by the token refresher; every poller re-reads the latest
/// value immediately before each API call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TwitchCredential {
    pub client_id: String,
    pub client_secret: String,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YouTubeCredential {
    pub api_key: String,
}

/// On-disk shape of the token file loaded at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenFile {
    pub discord_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitch: Option<TwitchCredential>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube: Option<YouTubeCredential>,
}
