// streambell-core/src/tasks/stream_checker.rs
//
// One tick: for every guild with a Twitch announcement channel and a
// non-empty watch-list, query live streams in batches, announce anything not
// yet in the ledger, then flush the ledger once for the whole tick.

use std::sync::Arc;

use tokio::time::interval;
use tracing::{error, info, warn};

use streambell_common::models::announcement::{Announcement, ContentKind, TWITCH_PURPLE};
use streambell_common::models::guild::AnnouncePlatform;
use streambell_common::traits::emitter::AnnouncementEmitter;
use streambell_common::traits::repository_traits::GuildRepository;

use crate::auth::CredentialStore;
use crate::ledger::AnnouncedLedger;
use crate::platforms::twitch::api::TwitchApi;
use crate::platforms::twitch::requests::stream::StreamData;
use crate::tasks::PollerSettings;
use crate::Error;

fn preview_url(login: &str) -> String {
    format!(
        "https://static-cdn.jtvnw.net/previews-ttv/live_user_{}-1920x1080.jpg",
        login.to_lowercase()
    )
}

fn build_announcement(
    stream: &StreamData,
    display_name: &str,
    profile_image_url: Option<String>,
) -> Announcement {
    let title = if stream.title.is_empty() {
        "No Title"
    } else {
        &stream.title
    };
    let game = if stream.game_name.is_empty() {
        "Unknown Game"
    } else {
        &stream.game_name
    };

    Announcement {
        kind: ContentKind::Stream,
        title: format!("🔴 {display_name} is live!"),
        description: format!(
            "**{title}**\nNow playing: {game}\n[Watch here](https://twitch.tv/{})",
            stream.user_login
        ),
        color: TWITCH_PURPLE,
        image_url: Some(preview_url(&stream.user_login)),
        thumbnail_url: profile_image_url,
        footer: "Twitch Stream Announcement".to_string(),
        timestamp: None,
    }
}

/// Runs one full stream-poll tick across all guilds.
pub async fn run_stream_tick(
    api: &dyn TwitchApi,
    repo: &Arc<dyn GuildRepository>,
    ledger: &AnnouncedLedger,
    emitter: &dyn AnnouncementEmitter,
    settings: &PollerSettings,
) -> Result<(), Error> {
    for guild_id in repo.all_guild_ids().await? {
        let Some(channel_id) = repo
            .announcement_channel(&guild_id, AnnouncePlatform::Twitch)
            .await?
        else {
            continue;
        };

        let accounts = repo.watched_accounts(&guild_id).await?;
        if accounts.is_empty() {
            continue;
        }

        let usernames: Vec<String> = accounts.into_iter().map(|a| a.username).collect();

        for batch in usernames.chunks(settings.stream_batch_size) {
            let streams = match api.live_streams(batch).await {
                Ok(resp) => resp,
                Err(e) => {
                    error!("Twitch streams query failed for guild {guild_id}: {e}");
                    continue;
                }
            };

            for stream in &streams.data {
                if ledger.contains(&guild_id, &stream.id).await {
                    continue;
                }

                // Profile lookup failure never blocks the announcement.
                let (display_name, profile_image_url) =
                    match api.user_profile(&stream.user_login).await {
                        Ok(Some(user)) => (user.display_name, Some(user.profile_image_url)),
                        Ok(None) => (stream.user_login.clone(), None),
                        Err(e) => {
                            warn!("Failed to fetch profile for {}: {e}", stream.user_login);
                            (stream.user_login.clone(), None)
                        }
                    };

                let announcement = build_announcement(stream, &display_name, profile_image_url);
                if let Err(e) = emitter.send_announcement(&channel_id, &announcement).await {
                    error!("Failed to deliver stream announcement to {channel_id}: {e}");
                }
                // Marked after an attempted delivery either way, so a broken
                // channel does not cause a retry storm.
                ledger.add(&guild_id, &stream.id).await;
            }
        }
    }

    ledger.flush(repo).await
}

/// Spawns the fixed-interval stream checker.
pub fn spawn_stream_checker_task(
    api: Arc<dyn TwitchApi>,
    repo: Arc<dyn GuildRepository>,
    ledger: Arc<AnnouncedLedger>,
    emitter: Arc<dyn AnnouncementEmitter>,
    store: Arc<CredentialStore>,
    settings: PollerSettings,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(settings.stream_interval);
        loop {
            ticker.tick().await;

            if store.twitch().await.is_none() {
                error!("Missing Twitch credentials; skipping stream check.");
                continue;
            }
            if !store.twitch_enabled() {
                info!("Twitch API calls disabled until next token refresh; skipping stream check.");
                continue;
            }

            if let Err(e) =
                run_stream_tick(api.as_ref(), &repo, &ledger, emitter.as_ref(), &settings).await
            {
                error!("Stream check tick failed: {e}");
            }
        }
    })
}
