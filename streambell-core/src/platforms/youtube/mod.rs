// streambell-core/src/platforms/youtube/mod.rs

pub mod api;
pub mod client;
pub mod requests;

pub use api::{DataApi, YouTubeApi};
pub use client::YouTubeDataClient;
