// streambell-core/src/platforms/twitch/requests/mod.rs

pub mod oauth;
pub mod stream;
pub mod user;
