// streambell-core/src/lib.rs

pub mod auth;
pub mod db;
pub mod ledger;
pub mod platforms;
pub mod repositories;
pub mod services;
pub mod tasks;

pub use db::Database;
pub use streambell_common::error::Error;
