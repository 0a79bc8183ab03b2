// tests/poller_tests.rs
//
// Drives the stream and video tick bodies with canned API responses and a
// collecting emitter, over a real in-memory SQLite repository.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use tokio::sync::Mutex;

use streambell_common::models::announcement::Announcement;
use streambell_common::models::guild::{AnnouncePlatform, WatchedAccount, WatchedHandle};
use streambell_common::traits::emitter::AnnouncementEmitter;
use streambell_common::traits::repository_traits::GuildRepository;
use streambell_core::ledger::AnnouncedLedger;
use streambell_core::platforms::twitch::api::TwitchApi;
use streambell_core::platforms::twitch::requests::stream::{StreamData, StreamsResponse};
use streambell_core::platforms::twitch::requests::user::UserData;
use streambell_core::platforms::youtube::api::YouTubeApi;
use streambell_core::platforms::youtube::requests::{
    PlaylistItem, PlaylistItemSnippet, ResolvedChannel, ResourceId,
};
use streambell_core::repositories::SqliteGuildRepository;
use streambell_core::tasks::stream_checker::run_stream_tick;
use streambell_core::tasks::video_checker::run_video_tick;
use streambell_core::tasks::PollerSettings;
use streambell_core::{Database, Error};

async fn test_repo() -> Result<(Database, Arc<dyn GuildRepository>), Error> {
    let db = Database::open_in_memory().await?;
    db.migrate().await?;
    let repo: Arc<dyn GuildRepository> = Arc::new(SqliteGuildRepository::new(db.pool().clone()));
    Ok((db, repo))
}

fn account(username: &str) -> WatchedAccount {
    WatchedAccount {
        username: username.to_string(),
        display_name: username.to_string(),
        profile_image_url: None,
        registered_at: Utc::now(),
    }
}

fn live_stream(id: &str, login: &str) -> StreamData {
    StreamData {
        id: id.to_string(),
        user_login: login.to_string(),
        title: "A title".to_string(),
        game_name: "A game".to_string(),
    }
}

fn upload(video_id: &str, published_at: &str) -> PlaylistItem {
    PlaylistItem {
        snippet: PlaylistItemSnippet {
            title: format!("Video {video_id}"),
            description: "desc".to_string(),
            published_at: published_at.to_string(),
            resource_id: ResourceId {
                video_id: video_id.to_string(),
            },
        },
    }
}

/// Replays a fixed set of live streams, returning per batch only the ones
/// whose login is in the requested batch; records every batch size.
struct FakeTwitchApi {
    live: Vec<StreamData>,
    batch_sizes: Mutex<Vec<usize>>,
}

impl FakeTwitchApi {
    fn new(live: Vec<StreamData>) -> Self {
        Self {
            live,
            batch_sizes: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TwitchApi for FakeTwitchApi {
    async fn live_streams(&self, logins: &[String]) -> Result<StreamsResponse, Error> {
        self.batch_sizes.lock().await.push(logins.len());
        let data = self
            .live
            .iter()
            .filter(|s| logins.contains(&s.user_login))
            .cloned()
            .collect();
        Ok(StreamsResponse { data })
    }

    async fn user_profile(&self, login: &str) -> Result<Option<UserData>, Error> {
        Ok(Some(UserData {
            display_name: login.to_uppercase(),
            profile_image_url: format!("https://example.invalid/{login}.png"),
        }))
    }
}

struct FakeYouTubeApi {
    channels: Vec<(String, ResolvedChannel)>,
    uploads: Vec<PlaylistItem>,
}

#[async_trait]
impl YouTubeApi for FakeYouTubeApi {
    async fn resolve_handle(&self, handle_name: &str) -> Result<Option<ResolvedChannel>, Error> {
        Ok(self
            .channels
            .iter()
            .find(|(name, _)| name == handle_name)
            .map(|(_, c)| c.clone()))
    }

    async fn recent_uploads(
        &self,
        _playlist_id: &str,
        max_results: usize,
    ) -> Result<Vec<PlaylistItem>, Error> {
        Ok(self.uploads.iter().take(max_results).cloned().collect())
    }
}

#[derive(Default)]
struct CollectingEmitter {
    sent: Mutex<Vec<(String, Announcement)>>,
    fail: bool,
}

#[async_trait]
impl AnnouncementEmitter for CollectingEmitter {
    async fn send_announcement(
        &self,
        channel_id: &str,
        announcement: &Announcement,
    ) -> Result<(), Error> {
        self.sent
            .lock()
            .await
            .push((channel_id.to_string(), announcement.clone()));
        if self.fail {
            Err(Error::Platform("channel unavailable".into()))
        } else {
            Ok(())
        }
    }
}

#[tokio::test]
async fn watch_list_of_250_splits_into_three_batches() -> Result<(), Error> {
    let (_db, repo) = test_repo().await?;
    repo.set_announcement_channel("g1", AnnouncePlatform::Twitch, "123")
        .await?;
    for i in 0..250 {
        repo.add_watched_account("g1", &account(&format!("streamer{i:03}"))).await?;
    }

    // One live stream in each batch's range, so the merge across batches is
    // observable in the emitted announcements.
    let api = FakeTwitchApi::new(vec![
        live_stream("s-a", "streamer005"),
        live_stream("s-b", "streamer150"),
        live_stream("s-c", "streamer249"),
    ]);
    let emitter = CollectingEmitter::default();
    let ledger = AnnouncedLedger::load(&repo).await?;

    run_stream_tick(&api, &repo, &ledger, &emitter, &PollerSettings::default()).await?;

    assert_eq!(*api.batch_sizes.lock().await, vec![100, 100, 50]);
    assert_eq!(emitter.sent.lock().await.len(), 3);
    Ok(())
}

#[tokio::test]
async fn replaying_the_same_response_announces_once() -> Result<(), Error> {
    let (_db, repo) = test_repo().await?;
    repo.set_announcement_channel("g1", AnnouncePlatform::Twitch, "123")
        .await?;
    repo.add_watched_account("g1", &account("streamerone")).await?;

    let api = FakeTwitchApi::new(vec![live_stream("s-1", "streamerone")]);
    let emitter = CollectingEmitter::default();
    let ledger = AnnouncedLedger::load(&repo).await?;

    run_stream_tick(&api, &repo, &ledger, &emitter, &PollerSettings::default()).await?;
    run_stream_tick(&api, &repo, &ledger, &emitter, &PollerSettings::default()).await?;

    assert_eq!(emitter.sent.lock().await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn flushed_announcements_stay_suppressed_after_restart() -> Result<(), Error> {
    let (_db, repo) = test_repo().await?;
    repo.set_announcement_channel("g1", AnnouncePlatform::Twitch, "123")
        .await?;
    repo.add_watched_account("g1", &account("streamerone")).await?;

    let api = FakeTwitchApi::new(vec![live_stream("s-1", "streamerone")]);
    let emitter = CollectingEmitter::default();

    {
        let ledger = AnnouncedLedger::load(&repo).await?;
        run_stream_tick(&api, &repo, &ledger, &emitter, &PollerSettings::default()).await?;
    }

    // Fresh ledger from storage = restarted process.
    let ledger = AnnouncedLedger::load(&repo).await?;
    run_stream_tick(&api, &repo, &ledger, &emitter, &PollerSettings::default()).await?;

    assert_eq!(emitter.sent.lock().await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn delivery_failure_still_marks_announced() -> Result<(), Error> {
    let (_db, repo) = test_repo().await?;
    repo.set_announcement_channel("g1", AnnouncePlatform::Twitch, "123")
        .await?;
    repo.add_watched_account("g1", &account("streamerone")).await?;

    let api = FakeTwitchApi::new(vec![live_stream("s-1", "streamerone")]);
    let emitter = CollectingEmitter {
        fail: true,
        ..Default::default()
    };
    let ledger = AnnouncedLedger::load(&repo).await?;

    run_stream_tick(&api, &repo, &ledger, &emitter, &PollerSettings::default()).await?;
    run_stream_tick(&api, &repo, &ledger, &emitter, &PollerSettings::default()).await?;

    // One attempt only; the failed delivery is not retried.
    assert_eq!(emitter.sent.lock().await.len(), 1);
    assert!(ledger.contains("g1", "s-1").await);
    Ok(())
}

#[tokio::test]
async fn guilds_without_channel_or_watchlist_are_skipped() -> Result<(), Error> {
    let (_db, repo) = test_repo().await?;
    // g1 has a watch-list but no channel; g2 has a channel but no accounts.
    repo.add_watched_account("g1", &account("streamerone")).await?;
    repo.set_announcement_channel("g2", AnnouncePlatform::Twitch, "123")
        .await?;

    let api = FakeTwitchApi::new(vec![live_stream("s-1", "streamerone")]);
    let emitter = CollectingEmitter::default();
    let ledger = AnnouncedLedger::load(&repo).await?;

    run_stream_tick(&api, &repo, &ledger, &emitter, &PollerSettings::default()).await?;

    assert!(api.batch_sizes.lock().await.is_empty());
    assert!(emitter.sent.lock().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn recency_window_filters_old_uploads() -> Result<(), Error> {
    let (_db, repo) = test_repo().await?;
    repo.set_announcement_channel("g1", AnnouncePlatform::YouTube, "456")
        .await?;
    repo.add_watched_handle(
        "g1",
        &WatchedHandle {
            handle: "@creator".to_string(),
            registered_at: Utc::now(),
        },
    )
    .await?;

    let now = Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap();
    let fresh = (now - Duration::hours(23) - Duration::minutes(59)).to_rfc3339();
    let stale = (now - Duration::hours(24) - Duration::minutes(1)).to_rfc3339();

    let api = FakeYouTubeApi {
        channels: vec![(
            "creator".to_string(),
            ResolvedChannel {
                channel_id: "UCxyz".to_string(),
                title: "Creator".to_string(),
            },
        )],
        uploads: vec![
            upload("vid-fresh", &fresh),
            upload("vid-stale", &stale),
            upload("vid-broken", "not-a-timestamp"),
        ],
    };
    let emitter = CollectingEmitter::default();
    let ledger = AnnouncedLedger::load(&repo).await?;

    run_video_tick(&api, &repo, &ledger, &emitter, &PollerSettings::default(), now).await?;

    let sent = emitter.sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.description.contains("vid-fresh"));
    assert!(ledger.contains("g1", "vid-fresh").await);
    assert!(!ledger.contains("g1", "vid-stale").await);
    Ok(())
}

#[tokio::test]
async fn unresolvable_handle_skips_only_itself() -> Result<(), Error> {
    let (_db, repo) = test_repo().await?;
    repo.set_announcement_channel("g1", AnnouncePlatform::YouTube, "456")
        .await?;
    for handle in ["@doesnotexist", "@resolves"] {
        repo.add_watched_handle(
            "g1",
            &WatchedHandle {
                handle: handle.to_string(),
                registered_at: Utc::now(),
            },
        )
        .await?;
    }

    let now = Utc::now();
    let api = FakeYouTubeApi {
        channels: vec![(
            "resolves".to_string(),
            ResolvedChannel {
                channel_id: "UCxyz".to_string(),
                title: "Resolves".to_string(),
            },
        )],
        uploads: vec![upload("vid-1", &(now - Duration::hours(1)).to_rfc3339())],
    };
    let emitter = CollectingEmitter::default();
    let ledger = AnnouncedLedger::load(&repo).await?;

    run_video_tick(&api, &repo, &ledger, &emitter, &PollerSettings::default(), now).await?;

    assert_eq!(emitter.sent.lock().await.len(), 1);
    Ok(())
}
