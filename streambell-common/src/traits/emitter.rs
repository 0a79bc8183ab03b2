// streambell-common/src/traits/emitter.rs

use async_trait::async_trait;

use crate::error::Error;
use crate::models::announcement::Announcement;

/// Delivery boundary between the pollers and the chat platform.
///
/// Pollers treat delivery as fire-and-forget: a returned error is logged by
/// the caller, and the item is still committed to the ledger once delivery
/// has been attempted.
#[async_trait]
pub trait AnnouncementEmitter: Send + Sync {
    async fn send_announcement(
        &self,
        channel_id: &str,
        announcement: &Announcement,
    ) -> Result<(), Error>;
}
