// streambell-core/src/auth/mod.rs
//
// Process-wide credential store backed by the JSON token file. The token
// refresher is the only writer; pollers read the latest value immediately
// before each API call.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;
use tracing::info;

use streambell_common::models::credential::{TokenFile, TwitchCredential};

use crate::Error;

pub struct CredentialStore {
    path: PathBuf,
    inner: RwLock<TokenFile>,
    // Closed by a failed token refresh; reopened by the next successful one.
    twitch_enabled: AtomicBool,
}

impl CredentialStore {
    /// Loads the token file. A missing or unreadable file is the one fatal
    /// startup error in the system.
    pub async fn load(path: &Path) -> Result<Self, Error> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::Auth(format!("cannot read token file {}: {e}", path.display())))?;
        let tokens: TokenFile = serde_json::from_str(&raw)
            .map_err(|e| Error::Auth(format!("cannot parse token file {}: {e}", path.display())))?;

        info!("Loaded token file from {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            inner: RwLock::new(tokens),
            twitch_enabled: AtomicBool::new(true),
        })
    }

    /// Builds a store from already-parsed tokens; used by tests.
    pub fn from_tokens(path: &Path, tokens: TokenFile) -> Self {
        Self {
            path: path.to_path_buf(),
            inner: RwLock::new(tokens),
            twitch_enabled: AtomicBool::new(true),
        }
    }

    pub async fn discord_token(&self) -> String {
        self.inner.read().await.discord_token.clone()
    }

    pub async fn twitch(&self) -> Option<TwitchCredential> {
        self.inner.read().await.twitch.clone()
    }

    pub async fn youtube_api_key(&self) -> Option<String> {
        self.inner.read().await.youtube.as_ref().map(|y| y.api_key.clone())
    }

    /// Swaps in the new token pair and persists the whole token file. The
    /// in-memory record only changes once the file write has succeeded, so a
    /// failed persist leaves the prior pair fully intact.
    pub async fn set_twitch_tokens(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<(), Error> {
        let mut guard = self.inner.write().await;
        let mut updated = guard.clone();
        let twitch = updated
            .twitch
            .as_mut()
            .ok_or_else(|| Error::Auth("no Twitch credentials configured".into()))?;
        twitch.access_token = access_token.to_string();
        twitch.refresh_token = refresh_token.to_string();

        let json = serde_json::to_string_pretty(&updated)?;
        tokio::fs::write(&self.path, json).await?;
        *guard = updated;
        Ok(())
    }

    pub fn twitch_enabled(&self) -> bool {
        self.twitch_enabled.load(Ordering::SeqCst)
    }

    pub fn set_twitch_enabled(&self, enabled: bool) {
        self.twitch_enabled.store(enabled, Ordering::SeqCst);
    }
}
