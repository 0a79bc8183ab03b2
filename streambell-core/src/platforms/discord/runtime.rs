// streambell-core/src/platforms/discord/runtime.rs

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use twilight_gateway::{
    self as gateway, CloseFrame, Config, Event, EventTypeFlags, Intents, MessageSender, Shard,
    StreamExt,
};
use twilight_http::client::ClientBuilder;
use twilight_http::Client as HttpClient;
use twilight_model::gateway::payload::incoming::MessageCreate;
use twilight_model::id::marker::ChannelMarker;
use twilight_model::id::Id;
use twilight_model::util::Timestamp;
use twilight_util::builder::embed::{EmbedBuilder, EmbedFooterBuilder, ImageSource};

use streambell_common::models::announcement::Announcement;
use streambell_common::traits::emitter::AnnouncementEmitter;

use crate::Error;

/// An inbound guild chat message, forwarded to the command dispatcher.
#[derive(Debug, Clone)]
pub struct DiscordMessageEvent {
    pub guild_id: Option<String>,
    pub channel_id: String,
    pub author_id: String,
    pub author_name: String,
    pub content: String,
}

async fn shard_runner(mut shard: Shard, tx: UnboundedSender<DiscordMessageEvent>) {
    let shard_id = shard.id().number();
    info!("(ShardRunner) Shard {shard_id} started. Listening for events.");

    while let Some(item) = shard.next_event(EventTypeFlags::all()).await {
        match item {
            Ok(Event::Ready(ready)) => {
                info!(
                    "Shard {shard_id} => READY as {} (ID={})",
                    ready.user.name, ready.user.id
                );
            }
            Ok(Event::MessageCreate(msg_create)) => {
                let msg: &MessageCreate = &msg_create;
                if msg.author.bot {
                    debug!("Ignoring bot message from {}", msg.author.name);
                    continue;
                }
                let _ = tx.send(DiscordMessageEvent {
                    guild_id: msg.guild_id.map(|g| g.to_string()),
                    channel_id: msg.channel_id.to_string(),
                    author_id: msg.author.id.to_string(),
                    author_name: msg.author.name.clone(),
                    content: msg.content.clone(),
                });
            }
            Ok(_) => {}
            Err(err) => {
                error!("Shard {shard_id} => error receiving event: {err:?}");
            }
        }
    }

    warn!("(ShardRunner) Shard {shard_id} event loop ended.");
}

/// The gateway + HTTP side of the bot. Also the concrete announcement
/// emitter the pollers deliver through.
pub struct DiscordPlatform {
    token: String,

    rx: Mutex<Option<UnboundedReceiver<DiscordMessageEvent>>>,

    shard_tasks: Vec<JoinHandle<()>>,
    shard_senders: Vec<MessageSender>,

    http: Option<Arc<HttpClient>>,
}

impl DiscordPlatform {
    pub fn new(token: String) -> Self {
        Self {
            token,
            rx: Mutex::new(None),
            shard_tasks: Vec::new(),
            shard_senders: Vec::new(),
            http: None,
        }
    }

    /// Connects to the gateway and starts one runner task per shard.
    pub async fn connect(&mut self) -> Result<(), Error> {
        if self.token.is_empty() {
            return Err(Error::Auth("Discord token is empty".into()));
        }
        if self.http.is_some() {
            info!("(DiscordPlatform) Already connected => skipping");
            return Ok(());
        }

        let (tx, rx) = unbounded_channel::<DiscordMessageEvent>();
        {
            let mut guard = self.rx.lock().await;
            *guard = Some(rx);
        }

        let http_client = Arc::new(
            ClientBuilder::new()
                .token(self.token.clone())
                .timeout(Duration::from_secs(30))
                .build(),
        );
        self.http = Some(http_client.clone());

        let config = Config::new(
            self.token.clone(),
            Intents::GUILDS | Intents::GUILD_MESSAGES | Intents::MESSAGE_CONTENT,
        );

        let shards = gateway::create_recommended(&http_client, config, |_, b| b.build())
            .await
            .map_err(|e| Error::Platform(format!("create_recommended error: {e}")))?;

        for shard in shards {
            self.shard_senders.push(shard.sender());
            let tx_for_shard = tx.clone();
            let handle = tokio::spawn(async move {
                shard_runner(shard, tx_for_shard).await;
            });
            self.shard_tasks.push(handle);
        }

        Ok(())
    }

    pub async fn disconnect(&mut self) -> Result<(), Error> {
        for sender in &self.shard_senders {
            let _ = sender.close(CloseFrame::NORMAL);
        }
        for task in &mut self.shard_tasks {
            let _ = task.await;
        }
        self.shard_senders.clear();
        self.shard_tasks.clear();

        {
            let mut guard = self.rx.lock().await;
            *guard = None;
        }
        self.http = None;
        Ok(())
    }

    /// Awaits the next inbound chat message, if connected.
    pub async fn next_message_event(&self) -> Option<DiscordMessageEvent> {
        let mut guard = self.rx.lock().await;
        match guard.as_mut() {
            Some(r) => r.recv().await,
            None => None,
        }
    }

    fn http(&self) -> Result<&Arc<HttpClient>, Error> {
        self.http
            .as_ref()
            .ok_or_else(|| Error::Platform("Discord HTTP client not connected".into()))
    }

    fn parse_channel_id(channel: &str) -> Result<Id<ChannelMarker>, Error> {
        let raw: u64 = channel
            .parse()
            .map_err(|_| Error::Platform(format!("Invalid channel ID: {channel}")))?;
        Ok(Id::<ChannelMarker>::new(raw))
    }

    /// Plain-text reply, used by the command dispatcher.
    pub async fn send_message(&self, channel: &str, message: &str) -> Result<(), Error> {
        let channel_id = Self::parse_channel_id(channel)?;
        self.http()?
            .create_message(channel_id)
            .content(message)
            .await
            .map_err(|e| Error::Platform(format!("Error sending Discord message: {e:?}")))?;
        Ok(())
    }
}

#[async_trait]
impl AnnouncementEmitter for DiscordPlatform {
    async fn send_announcement(
        &self,
        channel_id: &str,
        announcement: &Announcement,
    ) -> Result<(), Error> {
        let channel = Self::parse_channel_id(channel_id)?;

        let mut embed = EmbedBuilder::new()
            .title(&announcement.title)
            .description(&announcement.description)
            .color(announcement.color)
            .footer(EmbedFooterBuilder::new(&announcement.footer));

        if let Some(url) = &announcement.image_url {
            let source = ImageSource::url(url)
                .map_err(|e| Error::Platform(format!("bad image url: {e}")))?;
            embed = embed.image(source);
        }
        if let Some(url) = &announcement.thumbnail_url {
            let source = ImageSource::url(url)
                .map_err(|e| Error::Platform(format!("bad thumbnail url: {e}")))?;
            embed = embed.thumbnail(source);
        }
        if let Some(ts) = announcement.timestamp {
            let stamp = Timestamp::from_secs(ts.timestamp())
                .map_err(|e| Error::Platform(format!("bad timestamp: {e}")))?;
            embed = embed.timestamp(stamp);
        }

        self.http()?
            .create_message(channel)
            .embeds(&[embed.build()])
            .await
            .map_err(|e| Error::Platform(format!("Error sending Discord embed: {e:?}")))?;
        Ok(())
    }
}
