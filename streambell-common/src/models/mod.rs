// streambell-common/src/models/mod.rs

pub mod announcement;
pub mod credential;
pub mod guild;

pub use announcement::{Announcement, ContentKind};
pub use credential::{TokenFile, TwitchCredential, YouTubeCredential};
pub use guild::{AnnouncePlatform, WatchedAccount, WatchedHandle};
