use crate::domain::model::{TicketId, TicketStatus};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "support-router")]
#[command(about = "Routes customer messages to feedback and ticket handlers")]
pub struct CliArgs {
    /// Path to TOML configuration file; built-in defaults are used when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Classify and handle a single message
    Process {
        #[arg(short, long)]
        message: String,

        #[arg(long, default_value = "Customer")]
        customer: String,
    },

    /// Handle every non-blank line of a file as a separate message
    Batch {
        #[arg(short, long)]
        file: PathBuf,

        #[arg(long, default_value = "Customer")]
        customer: String,
    },

    /// List tickets, newest first
    Tickets {
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show one ticket
    Show {
        #[arg(value_parser = parse_ticket_id)]
        id: TicketId,
    },

    /// Change a ticket's status
    Resolve {
        #[arg(value_parser = parse_ticket_id)]
        id: TicketId,

        #[arg(long, default_value = "resolved", value_parser = parse_status)]
        status: TicketStatus,
    },
}

fn parse_ticket_id(value: &str) -> Result<TicketId, String> {
    value.parse()
}

fn parse_status(value: &str) -> Result<TicketStatus, String> {
    value.parse()
}
