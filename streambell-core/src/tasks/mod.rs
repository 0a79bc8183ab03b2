// streambell-core/src/tasks/mod.rs

pub mod stream_checker;
pub mod token_refresh;
pub mod video_checker;

use std::time::Duration;

/// Poll cadences and the upstream-limit constants, overridable from the
/// server's flags instead of being hard-coded at the call sites.
#[derive(Debug, Clone)]
pub struct PollerSettings {
    pub stream_interval: Duration,
    pub video_interval: Duration,
    pub refresh_interval: Duration,

    /// Helix allows at most 100 `user_login` filters per streams query.
    pub stream_batch_size: usize,
    /// Uploads older than this are never announced, bounding the back-catalog
    /// replay after a long downtime.
    pub video_recency_window: chrono::Duration,
    pub max_feed_items: usize,
    pub description_limit: usize,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            stream_interval: Duration::from_secs(60),
            video_interval: Duration::from_secs(15 * 60),
            refresh_interval: Duration::from_secs(24 * 60 * 60),
            stream_batch_size: 100,
            video_recency_window: chrono::Duration::hours(24),
            max_feed_items: 5,
            description_limit: 200,
        }
    }
}
