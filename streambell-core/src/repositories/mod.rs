// streambell-core/src/repositories/mod.rs

pub mod sqlite;

pub use sqlite::SqliteGuildRepository;
pub use streambell_common::traits::repository_traits::GuildRepository;
