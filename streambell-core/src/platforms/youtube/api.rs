// streambell-core/src/platforms/youtube/api.rs

use std::sync::Arc;

use async_trait::async_trait;

use crate::auth::CredentialStore;
use crate::platforms::youtube::client::YouTubeDataClient;
use crate::platforms::youtube::requests::{
    fetch_playlist_items, resolve_handle, PlaylistItem, ResolvedChannel,
};
use crate::Error;

/// The Data API calls the video poller needs; faked in tests.
#[async_trait]
pub trait YouTubeApi: Send + Sync {
    /// `handle_name` is the handle without its leading `@`.
    async fn resolve_handle(&self, handle_name: &str) -> Result<Option<ResolvedChannel>, Error>;

    async fn recent_uploads(
        &self,
        playlist_id: &str,
        max_results: usize,
    ) -> Result<Vec<PlaylistItem>, Error>;
}

pub struct DataApi {
    store: Arc<CredentialStore>,
}

impl DataApi {
    pub fn new(store: Arc<CredentialStore>) -> Self {
        Self { store }
    }

    async fn client(&self) -> Result<YouTubeDataClient, Error> {
        let key = self
            .store
            .youtube_api_key()
            .await
            .ok_or_else(|| Error::Auth("YouTube API key not loaded".into()))?;
        Ok(YouTubeDataClient::new(&key))
    }
}

#[async_trait]
impl YouTubeApi for DataApi {
    async fn resolve_handle(&self, handle_name: &str) -> Result<Option<ResolvedChannel>, Error> {
        let client = self.client().await?;
        resolve_handle(&client, handle_name).await
    }

    async fn recent_uploads(
        &self,
        playlist_id: &str,
        max_results: usize,
    ) -> Result<Vec<PlaylistItem>, Error> {
        let client = self.client().await?;
        let resp = fetch_playlist_items(&client, playlist_id, max_results).await?;
        Ok(resp.items)
    }
}
