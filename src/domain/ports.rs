use crate::domain::model::{Ticket, TicketId, TicketStatus};
use crate::utils::error::{Result, ServiceError};
use async_trait::async_trait;

/// Durable ticket records. Implementations must keep ids unique under concurrent `create`.
pub trait TicketStore: Send + Sync {
    fn create(&self, description: &str)
        -> impl std::future::Future<Output = Result<TicketId>> + Send;
    fn get(&self, id: &str) -> impl std::future::Future<Output = Result<Option<Ticket>>> + Send;
    /// Newest first.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<Ticket>>> + Send;
    fn update_status(
        &self,
        id: &str,
        status: TicketStatus,
    ) -> impl std::future::Future<Output = Result<Option<Ticket>>> + Send;
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// External text-understanding service. The reply is untrusted free text.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> std::result::Result<String, ServiceError>;
}

pub trait CredentialSource: Send + Sync {
    /// Read on every call; `None` when unset or blank.
    fn api_key(&self) -> Option<String>;
}
