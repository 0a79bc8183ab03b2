// streambell-core/src/repositories/sqlite/mod.rs

pub mod guilds;

pub use guilds::SqliteGuildRepository;
