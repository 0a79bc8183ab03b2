// streambell-common/src/traits/mod.rs

pub mod emitter;
pub mod repository_traits;

pub use emitter::AnnouncementEmitter;
pub use repository_traits::GuildRepository;
