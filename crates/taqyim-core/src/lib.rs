pub mod columns;
pub mod config;
pub mod db;
pub mod encoding;
pub mod error;
pub mod ingest;
pub mod parser;
pub mod review;
pub mod stats;
pub mod tags;
pub mod types;
pub mod users;

pub use config::IngestConfig;
pub use error::{CoreError, Result};
pub use types::{Decision, ItemStatus, Principal, Role, SessionStatus};
