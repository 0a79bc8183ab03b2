// streambell-core/src/platforms/twitch/api.rs

use std::sync::Arc;

use async_trait::async_trait;

use crate::auth::CredentialStore;
use crate::platforms::twitch::client::TwitchHelixClient;
use crate::platforms::twitch::requests::stream::{fetch_live_streams, StreamsResponse};
use crate::platforms::twitch::requests::user::{fetch_user, UserData};
use crate::Error;

/// The two Helix lookups the stream poller and the register command need.
/// Faked in tests to replay canned responses.
#[async_trait]
pub trait TwitchApi: Send + Sync {
    /// Currently-live streams for one batch of logins (caller enforces the
    /// batch-size limit).
    async fn live_streams(&self, logins: &[String]) -> Result<StreamsResponse, Error>;

    /// Profile lookup; `Ok(None)` when the login does not exist.
    async fn user_profile(&self, login: &str) -> Result<Option<UserData>, Error>;
}

/// Live implementation; builds a client from the newest token snapshot
/// before every call so a mid-tick refresh is picked up immediately.
pub struct HelixApi {
    store: Arc<CredentialStore>,
}

impl HelixApi {
    pub fn new(store: Arc<CredentialStore>) -> Self {
        Self { store }
    }

    async fn client(&self) -> Result<TwitchHelixClient, Error> {
        let cred = self
            .store
            .twitch()
            .await
            .ok_or_else(|| Error::Auth("Twitch credentials not loaded".into()))?;
        Ok(TwitchHelixClient::new(&cred.access_token, &cred.client_id))
    }
}

#[async_trait]
impl TwitchApi for HelixApi {
    async fn live_streams(&self, logins: &[String]) -> Result<StreamsResponse, Error> {
        let client = self.client().await?;
        fetch_live_streams(&client, logins).await
    }

    async fn user_profile(&self, login: &str) -> Result<Option<UserData>, Error> {
        let client = self.client().await?;
        fetch_user(&client, login).await
    }
}
