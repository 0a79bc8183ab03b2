// streambell-core/src/repositories/sqlite/guilds.rs
//
// One row per guild; watch-lists and the announced ledger live in JSON TEXT
// columns. A malformed JSON column is treated as an empty list (with a
// warning) so one corrupted guild cannot block a poll tick.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{Pool, Row, Sqlite};
use tracing::warn;

use streambell_common::error::Error;
use streambell_common::models::guild::{AnnouncePlatform, WatchedAccount, WatchedHandle};
use streambell_common::traits::repository_traits::GuildRepository;

pub const DEFAULT_PREFIX: &str = "streambell";

#[derive(Clone)]
pub struct SqliteGuildRepository {
    pool: Pool<Sqlite>,
}

impl SqliteGuildRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Parses a JSON-array column, falling back to empty on anything that is
    /// not a well-formed array of the expected shape.
    fn parse_list<T: serde::de::DeserializeOwned>(guild_id: &str, column: &str, raw: &str) -> Vec<T> {
        if raw.is_empty() {
            return Vec::new();
        }
        match serde_json::from_str::<Vec<T>>(raw) {
            Ok(list) => list,
            Err(e) => {
                warn!("Malformed {column} JSON for guild {guild_id}: {e}; treating as empty");
                Vec::new()
            }
        }
    }

    async fn read_list<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        guild_id: &str,
    ) -> Result<Vec<T>, Error> {
        let q = format!("SELECT registered FROM {table} WHERE guild_id = ?");
        let row_opt = sqlx::query(&q)
            .bind(guild_id)
            .fetch_optional(&self.pool)
            .await?;

        match row_opt {
            Some(r) => {
                let raw: String = r.try_get("registered")?;
                Ok(Self::parse_list(guild_id, table, &raw))
            }
            None => Ok(Vec::new()),
        }
    }

    async fn write_list<T: serde::Serialize>(
        &self,
        table: &str,
        guild_id: &str,
        list: &[T],
    ) -> Result<(), Error> {
        self.ensure_guild(guild_id).await?;
        let json = serde_json::to_string(list)?;
        let q = format!(
            "INSERT INTO {table} (guild_id, registered) VALUES (?, ?) \
             ON CONFLICT(guild_id) DO UPDATE SET registered = excluded.registered"
        );
        sqlx::query(&q)
            .bind(guild_id)
            .bind(json)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl GuildRepository for SqliteGuildRepository {
    async fn ensure_guild(&self, guild_id: &str) -> Result<(), Error> {
        sqlx::query(
            "INSERT INTO guilds (guild_id, prefix) VALUES (?, ?) \
             ON CONFLICT(guild_id) DO NOTHING",
        )
        .bind(guild_id)
        .bind(DEFAULT_PREFIX)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn all_guild_ids(&self) -> Result<Vec<String>, Error> {
        let rows = sqlx::query("SELECT guild_id FROM guilds ORDER BY guild_id")
            .fetch_all(&self.pool)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            out.push(r.try_get("guild_id")?);
        }
        Ok(out)
    }

    async fn get_prefix(&self, guild_id: &str) -> Result<String, Error> {
        self.ensure_guild(guild_id).await?;
        let row = sqlx::query("SELECT prefix FROM guilds WHERE guild_id = ?")
            .bind(guild_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("prefix")?)
    }

    async fn set_prefix(&self, guild_id: &str, prefix: &str) -> Result<(), Error> {
        self.ensure_guild(guild_id).await?;
        sqlx::query("UPDATE guilds SET prefix = ? WHERE guild_id = ?")
            .bind(prefix)
            .bind(guild_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn announcement_channel(
        &self,
        guild_id: &str,
        platform: AnnouncePlatform,
    ) -> Result<Option<String>, Error> {
        let q = format!(
            "SELECT {} AS channel FROM announcement_channels WHERE guild_id = ?",
            platform.as_str()
        );
        let row_opt = sqlx::query(&q)
            .bind(guild_id)
            .fetch_optional(&self.pool)
            .await?;

        match row_opt {
            Some(r) => Ok(r.try_get::<Option<String>, _>("channel")?.filter(|c| !c.is_empty())),
            None => Ok(None),
        }
    }

    async fn set_announcement_channel(
        &self,
        guild_id: &str,
        platform: AnnouncePlatform,
        channel_id: &str,
    ) -> Result<(), Error> {
        self.ensure_guild(guild_id).await?;
        let col = platform.as_str();
        let q = format!(
            "INSERT INTO announcement_channels (guild_id, {col}) VALUES (?, ?) \
             ON CONFLICT(guild_id) DO UPDATE SET {col} = excluded.{col}"
        );
        sqlx::query(&q)
            .bind(guild_id)
            .bind(channel_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn watched_accounts(&self, guild_id: &str) -> Result<Vec<WatchedAccount>, Error> {
        self.read_list("watched_accounts", guild_id).await
    }

    async fn add_watched_account(
        &self,
        guild_id: &str,
        account: &WatchedAccount,
    ) -> Result<bool, Error> {
        let mut accounts = self.watched_accounts(guild_id).await?;
        let lowered = account.username.to_lowercase();
        if accounts.iter().any(|a| a.username.to_lowercase() == lowered) {
            return Ok(false);
        }
        accounts.push(account.clone());
        self.write_list("watched_accounts", guild_id, &accounts).await?;
        Ok(true)
    }

    async fn remove_watched_account(&self, guild_id: &str, username: &str) -> Result<bool, Error> {
        let mut accounts = self.watched_accounts(guild_id).await?;
        let lowered = username.to_lowercase();
        let before = accounts.len();
        accounts.retain(|a| a.username.to_lowercase() != lowered);
        if accounts.len() == before {
            return Ok(false);
        }
        self.write_list("watched_accounts", guild_id, &accounts).await?;
        Ok(true)
    }

    async fn watched_handles(&self, guild_id: &str) -> Result<Vec<WatchedHandle>, Error> {
        self.read_list("watched_handles", guild_id).await
    }

    async fn add_watched_handle(
        &self,
        guild_id: &str,
        handle: &WatchedHandle,
    ) -> Result<bool, Error> {
        let mut handles = self.watched_handles(guild_id).await?;
        let lowered = handle.handle.to_lowercase();
        if handles.iter().any(|h| h.handle.to_lowercase() == lowered) {
            return Ok(false);
        }
        handles.push(handle.clone());
        self.write_list("watched_handles", guild_id, &handles).await?;
        Ok(true)
    }

    async fn remove_watched_handle(&self, guild_id: &str, handle: &str) -> Result<bool, Error> {
        let mut handles = self.watched_handles(guild_id).await?;
        let lowered = handle.to_lowercase();
        let before = handles.len();
        handles.retain(|h| h.handle.to_lowercase() != lowered);
        if handles.len() == before {
            return Ok(false);
        }
        self.write_list("watched_handles", guild_id, &handles).await?;
        Ok(true)
    }

    async fn load_all_announced(&self) -> Result<HashMap<String, Vec<String>>, Error> {
        let rows = sqlx::query("SELECT guild_id, announced FROM guilds")
            .fetch_all(&self.pool)
            .await?;

        let mut out = HashMap::new();
        for r in rows {
            let guild_id: String = r.try_get("guild_id")?;
            let raw: String = r.try_get("announced")?;
            let ids = Self::parse_list::<String>(&guild_id, "announced", &raw);
            out.insert(guild_id, ids);
        }
        Ok(out)
    }

    async fn save_announced(&self, guild_id: &str, ids: &[String]) -> Result<(), Error> {
        self.ensure_guild(guild_id).await?;
        let json = serde_json::to_string(ids)?;
        sqlx::query("UPDATE guilds SET announced = ? WHERE guild_id = ?")
            .bind(json)
            .bind(guild_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
