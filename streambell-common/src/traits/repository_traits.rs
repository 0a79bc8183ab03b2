// streambell-common/src/traits/repository_traits.rs

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Error;
use crate::models::guild::{AnnouncePlatform, WatchedAccount, WatchedHandle};

/// Durable per-guild registration state: prefix, announcement channels,
/// watch-lists and the announced-id ledger column.
///
/// Guild rows are created lazily; every operation that touches a guild first
/// ensures its row exists.
#[async_trait]
pub trait GuildRepository: Send + Sync {
    /// Inserts the guild row with the default prefix if it is missing.
    async fn ensure_guild(&self, guild_id: &str) -> Result<(), Error>;

    async fn all_guild_ids(&self) -> Result<Vec<String>, Error>;

    async fn get_prefix(&self, guild_id: &str) -> Result<String, Error>;
    async fn set_prefix(&self, guild_id: &str, prefix: &str) -> Result<(), Error>;

    async fn announcement_channel(
        &self,
        guild_id: &str,
        platform: AnnouncePlatform,
    ) -> Result<Option<String>, Error>;
    async fn set_announcement_channel(
        &self,
        guild_id: &str,
        platform: AnnouncePlatform,
        channel_id: &str,
    ) -> Result<(), Error>;

    async fn watched_accounts(&self, guild_id: &str) -> Result<Vec<WatchedAccount>, Error>;
    /// Returns false (and stores nothing) when the username is already
    /// watched, compared case-insensitively.
    async fn add_watched_account(
        &self,
        guild_id: &str,
        account: &WatchedAccount,
    ) -> Result<bool, Error>;
    /// Returns true when an entry was removed (case-insensitive match).
    async fn remove_watched_account(&self, guild_id: &str, username: &str) -> Result<bool, Error>;

    async fn watched_handles(&self, guild_id: &str) -> Result<Vec<WatchedHandle>, Error>;
    async fn add_watched_handle(&self, guild_id: &str, handle: &WatchedHandle)
        -> Result<bool, Error>;
    async fn remove_watched_handle(&self, guild_id: &str, handle: &str) -> Result<bool, Error>;

    /// Loads every guild's announced-id list in one pass, for priming the
    /// in-memory ledger at startup. Malformed rows load as empty lists.
    async fn load_all_announced(&self) -> Result<HashMap<String, Vec<String>>, Error>;
    async fn save_announced(&self, guild_id: &str, ids: &[String]) -> Result<(), Error>;
}
