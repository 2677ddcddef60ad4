pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliArgs, Command};

pub use adapters::{EnvCredential, OpenAiClient, SqliteTicketStore, StaticCredential};
pub use config::AppConfig;
pub use core::router::{BatchReport, RouterSettings, SupportRouter, DEFAULT_CUSTOMER_NAME};
pub use domain::model::{Category, LogEntry, Ticket, TicketId, TicketStatus};
pub use utils::error::{Result, RouterError, ServiceError};
