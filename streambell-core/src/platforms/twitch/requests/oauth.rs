// streambell-core/src/platforms/twitch/requests/oauth.rs

use reqwest::Client as ReqwestClient;
use serde::Deserialize;

use streambell_common::models::credential::TwitchCredential;

use crate::Error;

pub const TWITCH_TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";

/// Matches Twitch's JSON from the token endpoint.
#[derive(Debug, Deserialize)]
struct TwitchTokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

/// A refreshed access/refresh token pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshedTokens {
    pub access_token: String,
    pub refresh_token: String,
}

/// Performs the refresh-token exchange against `token_url`.
///
/// Anything other than HTTP 200 with *both* tokens present in the body is an
/// error; the caller must leave the stored credentials untouched in that
/// case.
pub async fn refresh_access_token(
    http: &ReqwestClient,
    token_url: &str,
    credential: &TwitchCredential,
) -> Result<RefreshedTokens, Error> {
    let params = [
        ("grant_type", "refresh_token".to_string()),
        ("refresh_token", credential.refresh_token.clone()),
        ("client_id", credential.client_id.clone()),
        ("client_secret", credential.client_secret.clone()),
    ];

    let resp = http
        .post(token_url)
        .form(&params)
        .send()
        .await
        .map_err(|e| Error::Auth(format!("HTTP error refreshing token: {e}")))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Auth(format!(
            "token refresh failed: HTTP {status} => {body}"
        )));
    }

    let body = resp.text().await?;
    let parsed: TwitchTokenResponse = serde_json::from_str(&body)
        .map_err(|e| Error::Auth(format!("parse error on refresh JSON: {e}")))?;

    match (parsed.access_token, parsed.refresh_token) {
        (Some(access_token), Some(refresh_token)) => Ok(RefreshedTokens {
            access_token,
            refresh_token,
        }),
        _ => Err(Error::Auth(format!("missing tokens in Twitch response: {body}"))),
    }
}
