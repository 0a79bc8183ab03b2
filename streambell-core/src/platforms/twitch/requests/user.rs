// streambell-core/src/platforms/twitch/requests/user.rs

use serde::Deserialize;

use crate::platforms::twitch::client::TwitchHelixClient;
use crate::Error;

/// Response from the "Get Users" endpoint.
#[derive(Debug, Deserialize)]
pub struct UsersResponse {
    pub data: Vec<UserData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserData {
    pub display_name: String,
    pub profile_image_url: String,
}

/// Looks up one user's profile (display name + avatar). `Ok(None)` means the
/// login does not exist.
pub async fn fetch_user(
    client: &TwitchHelixClient,
    login: &str,
) -> Result<Option<UserData>, Error> {
    let url = format!(
        "{}/users?login={}",
        client.base_url(),
        urlencoding::encode(login)
    );

    let resp = client
        .http_client()
        .get(&url)
        .header("Client-Id", client.client_id())
        .header("Authorization", format!("Bearer {}", client.bearer_token()))
        .send()
        .await
        .map_err(|e| Error::Platform(format!("get users network error: {e}")))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Platform(format!("get users: HTTP {status} => {body}")));
    }

    let body = resp.text().await?;
    let users: UsersResponse = serde_json::from_str(&body)
        .map_err(|e| Error::Platform(format!("get users parse error: {e}")))?;
    Ok(users.data.into_iter().next())
}
