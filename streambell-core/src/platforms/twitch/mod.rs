// streambell-core/src/platforms/twitch/mod.rs

pub mod api;
pub mod client;
pub mod requests;

pub use api::{HelixApi, TwitchApi};
pub use client::TwitchHelixClient;
