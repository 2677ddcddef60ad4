use crate::core::activity_log::{ActivityLog, DEFAULT_CAPACITY};
use crate::core::classifier::{Classifier, ClassifierSettings};
use crate::core::feedback::FeedbackHandler;
use crate::core::query::{EnrichmentSettings, QueryHandler};
use crate::domain::model::{Category, HandlerKind, LogEntry};
use crate::domain::ports::{CompletionService, TicketStore};
use crate::utils::error::{RouterError, Result};
use chrono::Utc;
use std::sync::Arc;

pub const DEFAULT_CUSTOMER_NAME: &str = "Customer";

#[derive(Debug, Clone, PartialEq)]
pub struct RouterSettings {
    pub classifier: ClassifierSettings,
    pub enrichment: EnrichmentSettings,
    pub log_capacity: usize,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            classifier: ClassifierSettings::default(),
            enrichment: EnrichmentSettings::default(),
            log_capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Messages handled in order by [`SupportRouter::process_batch`].
#[derive(Debug, Default)]
pub struct BatchReport {
    pub entries: Vec<LogEntry>,
    /// Zero-based position of each message that could not be handled.
    pub failures: Vec<(usize, RouterError)>,
}

/// Classifies each message, hands it to exactly one handler and records the outcome.
pub struct SupportRouter<S: TicketStore, L: CompletionService> {
    classifier: Classifier<L>,
    feedback: FeedbackHandler<S>,
    query: QueryHandler<S, L>,
    log: ActivityLog,
}

impl<S: TicketStore, L: CompletionService> SupportRouter<S, L> {
    pub fn new(store: Arc<S>, service: Arc<L>, settings: RouterSettings) -> Self {
        Self {
            classifier: Classifier::new(Arc::clone(&service), settings.classifier),
            feedback: FeedbackHandler::new(Arc::clone(&store)),
            query: QueryHandler::new(store, service, settings.enrichment),
            log: ActivityLog::new(settings.log_capacity),
        }
    }

    pub async fn process(&self, message: &str, customer_name: Option<&str>) -> Result<LogEntry> {
        if message.trim().is_empty() {
            return Err(RouterError::ValidationError {
                message: "message cannot be empty".to_string(),
            });
        }
        let customer_name = customer_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_CUSTOMER_NAME);

        tracing::info!("📨 Processing message from {}", customer_name);
        let classification = self.classifier.classify(message).await?;

        let (agent_used, response, ticket_id) = match classification.category {
            Category::PositiveFeedback => (
                HandlerKind::FeedbackPositive,
                self.feedback.handle_positive(customer_name),
                None,
            ),
            Category::NegativeFeedback => {
                let receipt = self.feedback.handle_negative(message).await?;
                (
                    HandlerKind::FeedbackNegative,
                    receipt.response,
                    Some(receipt.ticket_id),
                )
            }
            Category::Query => (
                HandlerKind::Query,
                self.query.handle_query(message, customer_name).await?,
                None,
            ),
        };

        tracing::info!(
            "✅ {} handled {} message (service: {})",
            agent_used,
            classification.category,
            classification.used_service()
        );

        let entry = LogEntry {
            message: message.to_string(),
            classification: classification.category,
            agent_used,
            response,
            using_service: classification.used_service(),
            ticket_id,
            processed_at: Utc::now(),
        };
        self.log.append(entry.clone());

        Ok(entry)
    }

    /// Handles every message even when some of them fail.
    pub async fn process_batch<'a, I>(
        &self,
        messages: I,
        customer_name: Option<&str>,
    ) -> BatchReport
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut report = BatchReport::default();
        for (index, message) in messages.into_iter().enumerate() {
            match self.process(message, customer_name).await {
                Ok(entry) => report.entries.push(entry),
                Err(e) => {
                    tracing::warn!("⚠️ Message {} was not processed: {}", index + 1, e);
                    report.failures.push((index, e));
                }
            }
        }
        report
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::SqliteTicketStore;
    use crate::domain::ports::CompletionRequest;
    use crate::utils::error::ServiceError;
    use async_trait::async_trait;

    /// Answers classification prompts with a fixed label and everything else with `reply`.
    struct LabelService {
        label: std::result::Result<&'static str, ServiceError>,
        reply: &'static str,
    }

    #[async_trait]
    impl CompletionService for LabelService {
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> std::result::Result<String, ServiceError> {
            if request.prompt.contains("Respond with ONLY the category name") {
                self.label.clone().map(str::to_string)
            } else {
                Ok(self.reply.to_string())
            }
        }
    }

    fn build_router(
        label: std::result::Result<&'static str, ServiceError>,
    ) -> (Arc<SqliteTicketStore>, SupportRouter<SqliteTicketStore, LabelService>) {
        let store = Arc::new(SqliteTicketStore::in_memory().unwrap());
        let service = Arc::new(LabelService {
            label,
            reply: "Enriched status reply",
        });
        let router = SupportRouter::new(store.clone(), service, RouterSettings::default());
        (store, router)
    }

    #[tokio::test]
    async fn test_positive_message_creates_no_ticket() {
        let (store, router) = build_router(Ok("POSITIVE_FEEDBACK"));

        let entry = router
            .process("Thanks for resolving my credit card issue.", None)
            .await
            .unwrap();

        assert_eq!(entry.classification, Category::PositiveFeedback);
        assert_eq!(entry.agent_used, HandlerKind::FeedbackPositive);
        assert!(entry.response.contains("Thank you for your kind words, Customer!"));
        assert!(entry.using_service);
        assert!(entry.ticket_id.is_none());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_negative_message_embeds_new_ticket_id() {
        let (store, router) = build_router(Ok("NEGATIVE_FEEDBACK"));

        let entry = router
            .process("My debit card replacement still hasn't arrived.", Some("Ana"))
            .await
            .unwrap();

        let ticket_id = entry.ticket_id.clone().unwrap();
        assert_eq!(entry.agent_used, HandlerKind::FeedbackNegative);
        assert!(entry.response.contains(&format!("#{}", ticket_id)));
        assert!(store.get(ticket_id.as_str()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_query_round_trip_uses_enriched_reply() {
        let (store, router) = build_router(Ok("QUERY"));
        let id = store.create("Card blocked abroad").await.unwrap();

        let entry = router
            .process(&format!("What's the status of ticket {}?", id), None)
            .await
            .unwrap();

        assert_eq!(entry.agent_used, HandlerKind::Query);
        assert_eq!(entry.response, "Enriched status reply");
    }

    #[tokio::test]
    async fn test_blank_message_is_rejected() {
        let (_, router) = build_router(Ok("QUERY"));

        let err = router.process("   ", None).await.unwrap_err();

        assert!(matches!(err, RouterError::ValidationError { .. }));
        assert!(router.log().is_empty());
    }

    #[tokio::test]
    async fn test_fallback_classification_is_logged() {
        let (_, router) = build_router(Err(ServiceError::Timeout { seconds: 15 }));

        let entry = router.process("The app crashes constantly", None).await.unwrap();

        assert_eq!(entry.classification, Category::NegativeFeedback);
        assert!(!entry.using_service);
        assert_eq!(router.log().len(), 1);
        assert_eq!(router.log().summary().negative_feedback, 1);
    }

    #[tokio::test]
    async fn test_batch_continues_past_failed_message() {
        let (store, router) = build_router(Ok("NEGATIVE_FEEDBACK"));

        let report = router
            .process_batch(["Card declined twice", "  ", "App logs me out"], Some("Ana"))
            .await;

        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, 1);
        assert!(matches!(
            report.failures[0].1,
            RouterError::ValidationError { .. }
        ));
        assert_eq!(store.list().await.unwrap().len(), 2);
        assert_eq!(router.log().summary().total, 2);
    }

    #[tokio::test]
    async fn test_configuration_error_is_not_logged() {
        let store = Arc::new(SqliteTicketStore::in_memory().unwrap());
        let service = Arc::new(LabelService {
            label: Err(ServiceError::MissingCredential),
            reply: "",
        });
        let settings = RouterSettings {
            classifier: ClassifierSettings {
                allow_fallback: false,
                ..ClassifierSettings::default()
            },
            ..RouterSettings::default()
        };
        let router = SupportRouter::new(store, service, settings);

        let err = router.process("Thanks!", None).await.unwrap_err();

        assert!(matches!(err, RouterError::Configuration { .. }));
        assert!(router.log().is_empty());
    }
}
