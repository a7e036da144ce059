//! Shared helpers for `DCNet` game servers: Discord webhook notifications,
//! configuration loading, and status reporting.

pub mod catalog;
pub mod config;
pub mod discord;
pub mod error;
pub mod http;
pub mod status;
pub mod worker;

pub use catalog::{GameCatalog, GameCatalogEntry};
pub use config::{DiscordSettings, Paths};
pub use discord::{Dispatcher, MAX_CONCURRENT, Notification, escape};
pub use error::Error;
pub use http::{HttpClient, WebhookTransport};
pub use status::{StatusReporter, json_status};
pub use worker::report_status;
