pub mod activity_log;
pub mod classifier;
pub mod feedback;
pub mod query;
pub mod router;

pub use crate::domain::model::{
    Category, ClassificationResult, ClassificationSource, HandlerKind, LogEntry, Ticket,
    TicketId, TicketStatus,
};
pub use crate::domain::ports::{CompletionRequest, CompletionService, TicketStore};
pub use crate::utils::error::Result;
