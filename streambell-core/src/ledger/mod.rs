// streambell-core/src/ledger/mod.rs
//
// In-memory mirror of the per-guild announced-id sets, primed from storage
// at startup and flushed back in one batch at the end of each poll tick. A
// crash between add() and flush() re-announces at most that one tick's
// additions.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use streambell_common::traits::repository_traits::GuildRepository;

use crate::Error;

struct LedgerState {
    // Append order preserved so the persisted JSON stays stable.
    entries: HashMap<String, Vec<String>>,
    dirty: HashSet<String>,
}

pub struct AnnouncedLedger {
    state: Mutex<LedgerState>,
}

impl AnnouncedLedger {
    /// Primes the ledger with every guild's announced set, so that dedup
    /// decisions never see a false negative on a freshly started process.
    pub async fn load(repo: &Arc<dyn GuildRepository>) -> Result<Self, Error> {
        let entries = repo.load_all_announced().await?;
        debug!("Ledger primed with {} guild(s)", entries.len());
        Ok(Self {
            state: Mutex::new(LedgerState {
                entries,
                dirty: HashSet::new(),
            }),
        })
    }

    pub async fn contains(&self, guild_id: &str, item_id: &str) -> bool {
        let state = self.state.lock().await;
        state
            .entries
            .get(guild_id)
            .is_some_and(|ids| ids.iter().any(|id| id == item_id))
    }

    /// Records an id in memory; durable only after the next flush().
    pub async fn add(&self, guild_id: &str, item_id: &str) {
        let mut state = self.state.lock().await;
        let ids = state.entries.entry(guild_id.to_string()).or_default();
        if !ids.iter().any(|id| id == item_id) {
            ids.push(item_id.to_string());
            state.dirty.insert(guild_id.to_string());
        }
    }

    /// Persists every guild touched since the last flush.
    pub async fn flush(&self, repo: &Arc<dyn GuildRepository>) -> Result<(), Error> {
        let (to_save, snapshot) = {
            let mut state = self.state.lock().await;
            let to_save: Vec<String> = state.dirty.drain().collect();
            let snapshot: Vec<(String, Vec<String>)> = to_save
                .iter()
                .filter_map(|g| state.entries.get(g).map(|ids| (g.clone(), ids.clone())))
                .collect();
            (to_save, snapshot)
        };

        if to_save.is_empty() {
            return Ok(());
        }

        for (guild_id, ids) in &snapshot {
            if let Err(e) = repo.save_announced(guild_id, ids).await {
                warn!("Failed to persist announced ids for guild {guild_id}: {e}");
                // Re-mark so the next flush retries.
                let mut state = self.state.lock().await;
                state.dirty.insert(guild_id.clone());
            }
        }
        debug!("Flushed announced ids for {} guild(s)", to_save.len());
        Ok(())
    }
}
