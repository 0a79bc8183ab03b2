// streambell-core/src/tasks/video_checker.rs
//
// One tick: resolve every watched handle to its uploads feed, announce
// recent uploads not yet in the ledger, then flush. Every failure is scoped
// to a single handle or item.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::time::interval;
use tracing::{error, warn};

use streambell_common::models::announcement::{Announcement, ContentKind, YOUTUBE_RED};
use streambell_common::models::guild::AnnouncePlatform;
use streambell_common::traits::emitter::AnnouncementEmitter;
use streambell_common::traits::repository_traits::GuildRepository;

use crate::ledger::AnnouncedLedger;
use crate::platforms::youtube::api::YouTubeApi;
use crate::platforms::youtube::client::uploads_playlist_id;
use crate::tasks::PollerSettings;
use crate::Error;

/// True when `published` falls within `window` of `now`. Future timestamps
/// (clock skew) are announced rather than dropped.
fn within_recency(
    published: DateTime<Utc>,
    now: DateTime<Utc>,
    window: chrono::Duration,
) -> bool {
    now.signed_duration_since(published) <= window
}

/// Char-boundary-safe truncation with a trailing ellipsis.
fn truncate_description(description: &str, limit: usize) -> String {
    if description.chars().count() <= limit {
        return description.to_string();
    }
    let mut out: String = description.chars().take(limit).collect();
    out.push_str("...");
    out
}

/// Runs one full video-poll tick across all guilds.
pub async fn run_video_tick(
    api: &dyn YouTubeApi,
    repo: &Arc<dyn GuildRepository>,
    ledger: &AnnouncedLedger,
    emitter: &dyn AnnouncementEmitter,
    settings: &PollerSettings,
    now: DateTime<Utc>,
) -> Result<(), Error> {
    for guild_id in repo.all_guild_ids().await? {
        let Some(channel_id) = repo
            .announcement_channel(&guild_id, AnnouncePlatform::YouTube)
            .await?
        else {
            continue;
        };

        let handles = repo.watched_handles(&guild_id).await?;
        if handles.is_empty() {
            continue;
        }

        for watched in &handles {
            let Some(handle_name) = watched.handle.strip_prefix('@') else {
                warn!("Invalid handle format: {}", watched.handle);
                continue;
            };

            let resolved = match api.resolve_handle(handle_name).await {
                Ok(Some(channel)) => channel,
                Ok(None) => {
                    warn!("No channel found for handle {}", watched.handle);
                    continue;
                }
                Err(e) => {
                    error!("Failed to resolve handle {}: {e}", watched.handle);
                    continue;
                }
            };

            let playlist_id = uploads_playlist_id(&resolved.channel_id);
            let items = match api.recent_uploads(&playlist_id, settings.max_feed_items).await {
                Ok(items) => items,
                Err(e) => {
                    error!("Uploads fetch failed for {}: {e}", watched.handle);
                    continue;
                }
            };

            for item in &items {
                let video_id = &item.snippet.resource_id.video_id;
                if ledger.contains(&guild_id, video_id).await {
                    continue;
                }

                let published = match DateTime::parse_from_rfc3339(&item.snippet.published_at) {
                    Ok(ts) => ts.with_timezone(&Utc),
                    Err(e) => {
                        warn!(
                            "Unparseable publish timestamp '{}' for video {video_id}: {e}",
                            item.snippet.published_at
                        );
                        continue;
                    }
                };
                if !within_recency(published, now, settings.video_recency_window) {
                    continue;
                }

                let description =
                    truncate_description(&item.snippet.description, settings.description_limit);
                let video_url = format!("https://www.youtube.com/watch?v={video_id}");
                let announcement = Announcement {
                    kind: ContentKind::Video,
                    title: format!("📺 {} uploaded a new video!", resolved.title),
                    description: format!(
                        "**{}**\n\n{description}\n\n[Watch here]({video_url})",
                        item.snippet.title
                    ),
                    color: YOUTUBE_RED,
                    image_url: Some(format!(
                        "https://img.youtube.com/vi/{video_id}/maxresdefault.jpg"
                    )),
                    thumbnail_url: None,
                    footer: "YouTube Video Announcement".to_string(),
                    timestamp: Some(published),
                };

                if let Err(e) = emitter.send_announcement(&channel_id, &announcement).await {
                    error!("Failed to deliver video announcement to {channel_id}: {e}");
                }
                ledger.add(&guild_id, video_id).await;
            }
        }
    }

    ledger.flush(repo).await
}

/// Spawns the fixed-interval video checker.
pub fn spawn_video_checker_task(
    api: Arc<dyn YouTubeApi>,
    repo: Arc<dyn GuildRepository>,
    ledger: Arc<AnnouncedLedger>,
    emitter: Arc<dyn AnnouncementEmitter>,
    settings: PollerSettings,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(settings.video_interval);
        loop {
            ticker.tick().await;
            if let Err(e) = run_video_tick(
                api.as_ref(),
                &repo,
                &ledger,
                emitter.as_ref(),
                &settings,
                Utc::now(),
            )
            .await
            {
                error!("Video check tick failed: {e}");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn recency_window_boundaries() {
        let window = chrono::Duration::hours(24);
        let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();

        let just_inside = now - chrono::Duration::hours(23) - chrono::Duration::minutes(59);
        assert!(within_recency(just_inside, now, window));

        let just_outside = now - chrono::Duration::hours(24) - chrono::Duration::minutes(1);
        assert!(!within_recency(just_outside, now, window));

        // Clock skew: a slightly-future publish date still announces.
        let future = now + chrono::Duration::minutes(5);
        assert!(within_recency(future, now, window));
    }

    #[test]
    fn truncation_appends_ellipsis_only_when_needed() {
        assert_eq!(truncate_description("short", 200), "short");
        let long = "x".repeat(250);
        let truncated = truncate_description(&long, 200);
        assert_eq!(truncated.chars().count(), 203);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn truncation_is_char_safe() {
        let emoji = "🎬".repeat(10);
        let truncated = truncate_description(&emoji, 5);
        assert_eq!(truncated, format!("{}...", "🎬".repeat(5)));
    }
}
