// streambell-common/src/models/guild.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which content platform an announcement channel belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnouncePlatform {
    Twitch,
    YouTube,
}

impl AnnouncePlatform {
    /// Column name in the `announcement_channels` table.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnouncePlatform::Twitch => "twitch",
            AnnouncePlatform::YouTube => "youtube",
        }
    }
}

impl std::str::FromStr for AnnouncePlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "twitch" => Ok(AnnouncePlatform::Twitch),
            "youtube" => Ok(AnnouncePlatform::YouTube),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

/// A Twitch login watched for live streams in one guild.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchedAccount {
    pub username: String,
    pub display_name: String,
    pub profile_image_url: Option<String>,
    pub registered_at: DateTime<Utc>,
}

/// A YouTube handle (including the leading `@`) watched for uploads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchedHandle {
    pub handle: String,
    pub registered_at: DateTime<Utc>,
}
