// streambell-common/src/models/announcement.rs

use chrono::{DateTime, Utc};

pub const TWITCH_PURPLE: u32 = 0x9146FF;
pub const YOUTUBE_RED: u32 = 0xFF0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Stream,
    Video,
}

/// A fully built announcement, ready to hand to the emitter.
///
/// The item id is not part of the payload; callers commit it to the ledger
/// separately once delivery has been attempted.
#[derive(Debug, Clone)]
pub struct Announcement {
    pub kind: ContentKind,
    pub title: String,
    pub description: String,
    pub color: u32,
    pub image_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub footer: String,
    pub timestamp: Option<DateTime<Utc>>,
}
