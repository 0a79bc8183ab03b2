use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use streambell_common::traits::emitter::AnnouncementEmitter;
use streambell_common::traits::repository_traits::GuildRepository;
use streambell_core::auth::CredentialStore;
use streambell_core::ledger::AnnouncedLedger;
use streambell_core::platforms::discord::DiscordPlatform;
use streambell_core::platforms::twitch::api::{HelixApi, TwitchApi};
use streambell_core::platforms::twitch::requests::oauth::TWITCH_TOKEN_URL;
use streambell_core::platforms::youtube::api::{DataApi, YouTubeApi};
use streambell_core::repositories::SqliteGuildRepository;
use streambell_core::services::CommandService;
use streambell_core::tasks::stream_checker::spawn_stream_checker_task;
use streambell_core::tasks::token_refresh::spawn_token_refresh_task;
use streambell_core::tasks::video_checker::spawn_video_checker_task;
use streambell_core::tasks::PollerSettings;
use streambell_core::{Database, Error};

#[derive(Parser, Debug, Clone)]
#[command(name = "streambell")]
#[command(author, version, about = "Announces Twitch streams and YouTube uploads to Discord")]
struct Args {
    /// SQLite database file holding guild registrations.
    #[arg(long, default_value = "streambell.db")]
    db_path: PathBuf,

    /// JSON token file with the Discord/Twitch/YouTube credentials.
    #[arg(long, default_value = "token.json")]
    token_file: PathBuf,

    /// Seconds between live-stream polls.
    #[arg(long, default_value_t = 60)]
    stream_interval_secs: u64,

    /// Seconds between upload polls.
    #[arg(long, default_value_t = 900)]
    video_interval_secs: u64,

    /// Seconds between Twitch token refreshes.
    #[arg(long, default_value_t = 86_400)]
    refresh_interval_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv::dotenv().ok();
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let settings = PollerSettings {
        stream_interval: Duration::from_secs(args.stream_interval_secs),
        video_interval: Duration::from_secs(args.video_interval_secs),
        refresh_interval: Duration::from_secs(args.refresh_interval_secs),
        ..PollerSettings::default()
    };

    // Missing or unreadable credentials are the only fatal startup error.
    let store = Arc::new(CredentialStore::load(&args.token_file).await?);

    let db = Database::open(&args.db_path).await?;
    db.migrate().await?;
    let repo: Arc<dyn GuildRepository> =
        Arc::new(SqliteGuildRepository::new(db.pool().clone()));

    let ledger = Arc::new(AnnouncedLedger::load(&repo).await?);

    let mut discord = DiscordPlatform::new(store.discord_token().await);
    discord.connect().await?;
    let discord = Arc::new(discord);
    let emitter: Arc<dyn AnnouncementEmitter> = discord.clone();

    let twitch_api: Arc<dyn TwitchApi> = Arc::new(HelixApi::new(store.clone()));
    let youtube_api: Arc<dyn YouTubeApi> = Arc::new(DataApi::new(store.clone()));

    let _refresh_task = spawn_token_refresh_task(
        store.clone(),
        TWITCH_TOKEN_URL.to_string(),
        settings.refresh_interval,
    );
    let _stream_task = spawn_stream_checker_task(
        twitch_api.clone(),
        repo.clone(),
        ledger.clone(),
        emitter.clone(),
        store.clone(),
        settings.clone(),
    );
    let _video_task = spawn_video_checker_task(
        youtube_api,
        repo.clone(),
        ledger.clone(),
        emitter.clone(),
        settings.clone(),
    );

    let commands = CommandService::new(repo.clone(), twitch_api);

    info!("streambell is up; waiting for guild messages.");
    loop {
        tokio::select! {
            evt = discord.next_message_event() => {
                match evt {
                    Some(evt) => commands.handle_message(&discord, &evt).await,
                    None => {
                        error!("Discord message stream ended; shutting down.");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received; flushing ledger and shutting down.");
                if let Err(e) = ledger.flush(&repo).await {
                    error!("Final ledger flush failed: {e}");
                }
                break;
            }
        }
    }

    Ok(())
}
