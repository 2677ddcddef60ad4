use crate::domain::model::Ticket;
use crate::domain::ports::{CompletionRequest, CompletionService, TicketStore};
use crate::utils::error::Result;
use regex::Regex;
use std::sync::{Arc, LazyLock};

/// Optional `#`, then exactly six digits that are not part of a longer number.
static TICKET_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^0-9])#?([0-9]{6})(?:[^0-9]|$)").expect("ticket id pattern compiles")
});

pub const MISSING_TICKET_NUMBER: &str =
    "Please provide a valid 6-digit ticket number so I can help you better.";

/// First six-digit ticket number mentioned in the message.
pub fn extract_ticket_id(message: &str) -> Option<&str> {
    TICKET_ID_PATTERN
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentSettings {
    pub enabled: bool,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 150,
            temperature: 0.7,
        }
    }
}

fn not_found_response(ticket_id: &str) -> String {
    format!(
        "I couldn't find ticket #{} in our system. Please double-check the ticket number or contact support if you need assistance.",
        ticket_id
    )
}

fn status_response(ticket: &Ticket, customer_name: &str) -> String {
    format!(
        "Hi {}, your ticket #{} regarding '{}' is currently {}. Our team is working on resolving this issue and will update you soon.",
        customer_name,
        ticket.id,
        ticket.description,
        ticket.status.as_str().to_lowercase()
    )
}

fn enrichment_prompt(ticket: &Ticket, message: &str, customer_name: &str) -> String {
    format!(
        r#"You are a helpful banking customer service agent. A customer named {name} is asking about their support ticket.

Ticket Details:
- Ticket ID: #{id}
- Status: {status}
- Original Issue: {description}
- Created: {created}

Customer Query: {message}

Provide a helpful, empathetic response that:
1. Acknowledges their concern
2. Explains the current status clearly
3. Shows understanding of their original issue
4. Offers next steps or timeline if appropriate
5. Maintains a professional but friendly tone

Keep response under 100 words."#,
        name = customer_name,
        id = ticket.id,
        status = ticket.status,
        description = ticket.description,
        created = ticket.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        message = message,
    )
}

pub struct QueryHandler<S: TicketStore, L: CompletionService> {
    store: Arc<S>,
    service: Arc<L>,
    settings: EnrichmentSettings,
}

impl<S: TicketStore, L: CompletionService> QueryHandler<S, L> {
    pub fn new(store: Arc<S>, service: Arc<L>, settings: EnrichmentSettings) -> Self {
        Self {
            store,
            service,
            settings,
        }
    }

    pub async fn handle_query(&self, message: &str, customer_name: &str) -> Result<String> {
        let Some(ticket_id) = extract_ticket_id(message) else {
            tracing::info!("🔎 No ticket number found in query");
            return Ok(MISSING_TICKET_NUMBER.to_string());
        };

        let Some(ticket) = self.store.get(ticket_id).await? else {
            tracing::info!("🔎 Ticket #{} not found", ticket_id);
            return Ok(not_found_response(ticket_id));
        };

        tracing::debug!("🔎 Ticket #{} found with status {}", ticket.id, ticket.status);
        Ok(self.respond(&ticket, message, customer_name).await)
    }

    async fn respond(&self, ticket: &Ticket, message: &str, customer_name: &str) -> String {
        if !self.settings.enabled {
            return status_response(ticket, customer_name);
        }

        let request = CompletionRequest {
            model: self.settings.model.clone(),
            prompt: enrichment_prompt(ticket, message, customer_name),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
        };

        match self.service.complete(request).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!("⚠️ Enriched reply unavailable ({}), using status template", e);
                status_response(ticket, customer_name)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{TicketId, TicketStatus};
    use crate::utils::error::{RouterError, ServiceError};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    struct MockStore {
        tickets: Mutex<HashMap<String, Ticket>>,
        reads: AtomicUsize,
        fail: bool,
    }

    impl MockStore {
        fn with(tickets: Vec<Ticket>) -> Arc<Self> {
            Arc::new(Self {
                tickets: Mutex::new(
                    tickets
                        .into_iter()
                        .map(|t| (t.id.as_str().to_string(), t))
                        .collect(),
                ),
                reads: AtomicUsize::new(0),
                fail: false,
            })
        }

        fn broken() -> Arc<Self> {
            Arc::new(Self {
                tickets: Mutex::new(HashMap::new()),
                reads: AtomicUsize::new(0),
                fail: true,
            })
        }
    }

    impl TicketStore for MockStore {
        async fn create(&self, _description: &str) -> Result<TicketId> {
            unreachable!("query handling never creates tickets")
        }

        async fn get(&self, id: &str) -> Result<Option<Ticket>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(RouterError::StorageError(rusqlite::Error::InvalidQuery));
            }
            Ok(self.tickets.lock().await.get(id).cloned())
        }

        async fn list(&self) -> Result<Vec<Ticket>> {
            Ok(self.tickets.lock().await.values().cloned().collect())
        }

        async fn update_status(&self, _id: &str, _status: TicketStatus) -> Result<Option<Ticket>> {
            Ok(None)
        }
    }

    struct FixedService(std::result::Result<String, ServiceError>);

    #[async_trait]
    impl CompletionService for FixedService {
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> std::result::Result<String, ServiceError> {
            self.0.clone()
        }
    }

    fn sample_ticket() -> Ticket {
        Ticket {
            id: "650932".parse().unwrap(),
            status: TicketStatus::Unresolved,
            description: "My debit card replacement still hasn't arrived.".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_extract_ticket_id() {
        assert_eq!(extract_ticket_id("status of ticket #650932?"), Some("650932"));
        assert_eq!(extract_ticket_id("650932"), Some("650932"));
        assert_eq!(extract_ticket_id("ticket 111111 and 222222"), Some("111111"));
        assert_eq!(extract_ticket_id("ticket 12345"), None);
        assert_eq!(extract_ticket_id("account 1234567890"), None);
        assert_eq!(extract_ticket_id("no numbers here"), None);
    }

    #[test]
    fn test_seven_digit_number_is_not_a_ticket() {
        assert_eq!(extract_ticket_id("ticket #1234567"), None);
        assert_eq!(extract_ticket_id("ticket 1234567 or #650932"), Some("650932"));
    }

    #[tokio::test]
    async fn test_missing_number_skips_store() {
        let store = MockStore::with(vec![]);
        let handler = QueryHandler::new(
            store.clone(),
            Arc::new(FixedService(Ok("unused".to_string()))),
            EnrichmentSettings::default(),
        );

        let reply = handler.handle_query("where is my ticket?", "Ana").await.unwrap();

        assert_eq!(reply, MISSING_TICKET_NUMBER);
        assert_eq!(store.reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_ticket_reports_not_found() {
        let handler = QueryHandler::new(
            MockStore::with(vec![]),
            Arc::new(FixedService(Ok("unused".to_string()))),
            EnrichmentSettings::default(),
        );

        let reply = handler
            .handle_query("What about ticket 999999?", "Customer")
            .await
            .unwrap();

        assert!(reply.starts_with("I couldn't find ticket #999999"));
    }

    #[tokio::test]
    async fn test_enriched_reply_is_returned() {
        let handler = QueryHandler::new(
            MockStore::with(vec![sample_ticket()]),
            Arc::new(FixedService(Ok("Your card is on its way.".to_string()))),
            EnrichmentSettings::default(),
        );

        let reply = handler
            .handle_query("status of ticket #650932?", "Ana")
            .await
            .unwrap();

        assert_eq!(reply, "Your card is on its way.");
    }

    #[tokio::test]
    async fn test_service_failure_degrades_to_template() {
        let handler = QueryHandler::new(
            MockStore::with(vec![sample_ticket()]),
            Arc::new(FixedService(Err(ServiceError::Transport("refused".to_string())))),
            EnrichmentSettings::default(),
        );

        let reply = handler
            .handle_query("status of ticket #650932?", "Ana")
            .await
            .unwrap();

        assert_eq!(
            reply,
            "Hi Ana, your ticket #650932 regarding 'My debit card replacement still hasn't arrived.' is currently unresolved. Our team is working on resolving this issue and will update you soon."
        );
    }

    #[tokio::test]
    async fn test_disabled_enrichment_uses_template() {
        let settings = EnrichmentSettings {
            enabled: false,
            ..EnrichmentSettings::default()
        };
        let handler = QueryHandler::new(
            MockStore::with(vec![sample_ticket()]),
            Arc::new(FixedService(Ok("should not be used".to_string()))),
            settings,
        );

        let reply = handler.handle_query("#650932", "Bo").await.unwrap();

        assert!(reply.starts_with("Hi Bo, your ticket #650932"));
    }

    #[tokio::test]
    async fn test_store_failure_is_propagated() {
        let handler = QueryHandler::new(
            MockStore::broken(),
            Arc::new(FixedService(Ok("unused".to_string()))),
            EnrichmentSettings::default(),
        );

        let err = handler
            .handle_query("status of ticket 650932", "Ana")
            .await
            .unwrap_err();

        assert!(matches!(err, RouterError::StorageError(_)));
    }
}
