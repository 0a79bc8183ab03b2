// streambell-core/src/services/command_service.rs
//
// Per-guild prefix commands, invoked as "<prefix>, <command> [args]". This
// layer only does registration CRUD and read-only reporting; all polling
// logic lives in the tasks.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{error, info};

use streambell_common::models::guild::{AnnouncePlatform, WatchedAccount, WatchedHandle};
use streambell_common::traits::repository_traits::GuildRepository;

use crate::platforms::discord::{DiscordMessageEvent, DiscordPlatform};
use crate::platforms::twitch::api::TwitchApi;
use crate::Error;

const HELP_TEXT: &str = "Commands: ping, help, info, debug, setprefix <prefix>, \
setchannel <twitch|youtube>, register <twitch_login>, unregister <twitch_login>, \
listusers, registeryoutube <@handle>, unregisteryoutube <@handle>, listyoutube";

pub struct CommandService {
    repo: Arc<dyn GuildRepository>,
    twitch: Arc<dyn TwitchApi>,
    start_time: Instant,
}

/// A parsed "<prefix>, <command> [args]" invocation.
struct Invocation<'a> {
    command: String,
    args: Option<&'a str>,
}

/// Strips `prefix` from the front of `content`, comparing char by char with
/// case folding so the returned slice stays aligned with `content`'s own
/// byte offsets.
fn strip_prefix_ci<'a>(content: &'a str, prefix: &str) -> Option<&'a str> {
    let mut content_chars = content.char_indices();
    for p in prefix.chars() {
        let (_, c) = content_chars.next()?;
        if !p.to_lowercase().eq(c.to_lowercase()) {
            return None;
        }
    }
    Some(content_chars.as_str())
}

fn parse_invocation<'a>(content: &'a str, prefix: &str) -> Option<Invocation<'a>> {
    let rest = strip_prefix_ci(content, prefix)?.strip_prefix(',')?.trim();
    if rest.is_empty() {
        return None;
    }
    let mut parts = rest.splitn(2, char::is_whitespace);
    let command = parts.next()?.to_lowercase();
    let args = parts.next().map(str::trim).filter(|a| !a.is_empty());
    Some(Invocation { command, args })
}

impl CommandService {
    pub fn new(repo: Arc<dyn GuildRepository>, twitch: Arc<dyn TwitchApi>) -> Self {
        Self {
            repo,
            twitch,
            start_time: Instant::now(),
        }
    }

    /// Dispatches one inbound message. DM and non-command messages are
    /// ignored; command failures are logged, never fatal.
    pub async fn handle_message(&self, discord: &DiscordPlatform, evt: &DiscordMessageEvent) {
        let Some(guild_id) = evt.guild_id.as_deref() else {
            return;
        };

        let prefix = match self.repo.get_prefix(guild_id).await {
            Ok(p) => p,
            Err(e) => {
                error!("Failed to load prefix for guild {guild_id}: {e}");
                return;
            }
        };

        let Some(invocation) = parse_invocation(&evt.content, &prefix) else {
            return;
        };

        info!(
            "Command '{}' from {} in guild {guild_id}",
            invocation.command, evt.author_name
        );

        let reply = match self.dispatch(guild_id, evt, &prefix, &invocation).await {
            Ok(text) => text,
            Err(e) => {
                error!("Command '{}' failed: {e}", invocation.command);
                "Something went wrong running that command.".to_string()
            }
        };

        if let Err(e) = discord.send_message(&evt.channel_id, &reply).await {
            error!("Failed to reply in channel {}: {e}", evt.channel_id);
        }
    }

    async fn dispatch(
        &self,
        guild_id: &str,
        evt: &DiscordMessageEvent,
        prefix: &str,
        invocation: &Invocation<'_>,
    ) -> Result<String, Error> {
        match invocation.command.as_str() {
            "ping" => Ok("Pong!".to_string()),
            "help" => Ok(HELP_TEXT.to_string()),
            "info" => Ok(
                "Announces Twitch streams and YouTube uploads into your configured channels."
                    .to_string(),
            ),
            "debug" => self.debug(guild_id).await,
            "setprefix" => match invocation.args {
                Some(new_prefix) => {
                    self.repo.set_prefix(guild_id, new_prefix).await?;
                    Ok(format!("Prefix set to `{new_prefix}`."))
                }
                None => Ok(format!("Usage: {prefix}, setprefix <new_prefix>")),
            },
            "setchannel" => match invocation.args.map(str::parse::<AnnouncePlatform>) {
                Some(Ok(platform)) => {
                    self.repo
                        .set_announcement_channel(guild_id, platform, &evt.channel_id)
                        .await?;
                    Ok(format!(
                        "This channel will now receive {} announcements.",
                        platform.as_str()
                    ))
                }
                _ => Ok(format!("Usage: {prefix}, setchannel <twitch/youtube>")),
            },
            "register" => match invocation.args {
                Some(login) => self.register_account(guild_id, login).await,
                None => Ok(format!("Usage: {prefix}, register <twitch_username>")),
            },
            "unregister" => match invocation.args {
                Some(login) => {
                    if self.repo.remove_watched_account(guild_id, login).await? {
                        Ok(format!("Unregistered `{login}`."))
                    } else {
                        Ok(format!("`{login}` is not registered."))
                    }
                }
                None => Ok(format!("Usage: {prefix}, unregister <twitch_username>")),
            },
            "listusers" => {
                let accounts = self.repo.watched_accounts(guild_id).await?;
                if accounts.is_empty() {
                    Ok("No Twitch accounts registered.".to_string())
                } else {
                    let names: Vec<String> = accounts
                        .iter()
                        .map(|a| format!("{} ({})", a.display_name, a.username))
                        .collect();
                    Ok(format!("Watched Twitch accounts: {}", names.join(", ")))
                }
            }
            "registeryoutube" => match invocation.args {
                Some(handle) => self.register_handle(guild_id, handle).await,
                None => Ok(format!("Usage: {prefix}, registeryoutube <channel_handle>")),
            },
            "unregisteryoutube" => match invocation.args {
                Some(handle) => {
                    if self.repo.remove_watched_handle(guild_id, handle).await? {
                        Ok(format!("Unregistered `{handle}`."))
                    } else {
                        Ok(format!("`{handle}` is not registered."))
                    }
                }
                None => Ok(format!("Usage: {prefix}, unregisteryoutube <channel_handle>")),
            },
            "listyoutube" => {
                let handles = self.repo.watched_handles(guild_id).await?;
                if handles.is_empty() {
                    Ok("No YouTube channels registered.".to_string())
                } else {
                    let names: Vec<String> =
                        handles.iter().map(|h| h.handle.clone()).collect();
                    Ok(format!("Watched YouTube channels: {}", names.join(", ")))
                }
            }
            other => Ok(format!("Unknown command: {other}")),
        }
    }

    async fn debug(&self, guild_id: &str) -> Result<String, Error> {
        let uptime = self.start_time.elapsed();
        let guilds = self.repo.all_guild_ids().await?.len();
        let accounts = self.repo.watched_accounts(guild_id).await?.len();
        let handles = self.repo.watched_handles(guild_id).await?.len();
        Ok(format!(
            "Uptime: {}s | Known guilds: {guilds} | Watched here: {accounts} Twitch, {handles} YouTube",
            uptime.as_secs()
        ))
    }

    async fn register_account(&self, guild_id: &str, login: &str) -> Result<String, Error> {
        // Validate against the users endpoint so typos are caught at
        // registration instead of silently never announcing.
        let profile = match self.twitch.user_profile(login).await {
            Ok(Some(user)) => Some(user),
            Ok(None) => return Ok(format!("No Twitch user named `{login}` found.")),
            Err(e) => {
                error!("Profile validation failed for {login}: {e}");
                None
            }
        };

        let (display_name, profile_image_url) = match profile {
            Some(user) => (user.display_name, Some(user.profile_image_url)),
            None => (login.to_string(), None),
        };

        let account = WatchedAccount {
            username: login.to_string(),
            display_name,
            profile_image_url,
            registered_at: Utc::now(),
        };

        if self.repo.add_watched_account(guild_id, &account).await? {
            Ok(format!("Registered `{login}` for stream announcements."))
        } else {
            Ok(format!("`{login}` is already registered."))
        }
    }

    async fn register_handle(&self, guild_id: &str, handle: &str) -> Result<String, Error> {
        if !handle.starts_with('@') {
            return Ok("YouTube handles must start with `@`.".to_string());
        }

        let watched = WatchedHandle {
            handle: handle.to_string(),
            registered_at: Utc::now(),
        };

        if self.repo.add_watched_handle(guild_id, &watched).await? {
            Ok(format!("Registered `{handle}` for upload announcements."))
        } else {
            Ok(format!("`{handle}` is already registered."))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefix_and_args() {
        let inv = parse_invocation("streambell, register somestreamer", "streambell").unwrap();
        assert_eq!(inv.command, "register");
        assert_eq!(inv.args, Some("somestreamer"));
    }

    #[test]
    fn prefix_match_is_case_insensitive() {
        let inv = parse_invocation("StreamBell, Ping", "streambell").unwrap();
        assert_eq!(inv.command, "ping");
        assert_eq!(inv.args, None);
    }

    #[test]
    fn prefix_whose_lowercase_changes_byte_length_still_parses() {
        // 'İ' lowercases to a two-char sequence that is longer in bytes.
        let inv = parse_invocation("İzmir, ping", "İzmir").unwrap();
        assert_eq!(inv.command, "ping");
        assert_eq!(inv.args, None);

        let inv = parse_invocation("İzmir, register somestreamer", "İzmir").unwrap();
        assert_eq!(inv.command, "register");
        assert_eq!(inv.args, Some("somestreamer"));
    }

    #[test]
    fn ignores_unprefixed_messages() {
        assert!(parse_invocation("hello there", "streambell").is_none());
        assert!(parse_invocation("streambell register x", "streambell").is_none());
    }
}
