use crate::core::query::extract_ticket_id;
use crate::domain::model::{Category, ClassificationResult};
use crate::domain::ports::{CompletionRequest, CompletionService};
use crate::utils::error::{RouterError, Result, ServiceError};
use std::sync::Arc;

const STRONG_NEGATIVE: &[&str] = &[
    "hate", "worst", "terrible", "awful", "crashes", "broken", "useless", "horrible", "sucks",
    "garbage",
];

const POSITIVE: &[&str] = &[
    "thank",
    "thanks",
    "great",
    "excellent",
    "good",
    "love",
    "amazing",
    "wonderful",
    "perfect",
    "smooth",
    "best",
    "always best",
    "experience",
];

const PROBLEM: &[&str] = &[
    "problem",
    "issue",
    "error",
    "not working",
    "failed",
    "trouble",
    "complaint",
    "bad",
    "hasn't arrived",
    "delayed",
];

const QUERY: &[&str] = &["status", "check", "ticket", "what is", "how is", "update"];

const QUERY_CONTEXT: &[&str] = &["ticket", "status"];

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierSettings {
    pub model: String,
    pub max_tokens: u32,
    /// When false, a missing API key is a configuration error instead of a
    /// reason to use the keyword rules.
    pub allow_fallback: bool,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: 20,
            allow_fallback: true,
        }
    }
}

/// Label recovered from free-text service output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedLabel {
    Positive,
    Negative,
    Query,
    Unparseable,
}

impl ParsedLabel {
    /// Substring match on the upper-cased reply; POSITIVE wins over NEGATIVE wins over QUERY.
    pub fn parse(reply: &str) -> Self {
        let upper = reply.trim().to_uppercase();
        if upper.contains("POSITIVE") {
            ParsedLabel::Positive
        } else if upper.contains("NEGATIVE") {
            ParsedLabel::Negative
        } else if upper.contains("QUERY") {
            ParsedLabel::Query
        } else {
            ParsedLabel::Unparseable
        }
    }

    pub fn category(&self) -> Option<Category> {
        match self {
            ParsedLabel::Positive => Some(Category::PositiveFeedback),
            ParsedLabel::Negative => Some(Category::NegativeFeedback),
            ParsedLabel::Query => Some(Category::Query),
            ParsedLabel::Unparseable => None,
        }
    }
}

pub fn classification_prompt(message: &str) -> String {
    format!(
        r#"You are a banking customer service classifier. Classify this message into EXACTLY ONE category based on PRIMARY INTENT:

POSITIVE_FEEDBACK: Customer is happy, satisfied, thanking, praising, or expressing gratitude
NEGATIVE_FEEDBACK: Customer is reporting NEW problems, issues, or complaints that need a support ticket
QUERY: Customer is asking about existing ticket status, requesting information, or checking on something (even if frustrated)

IMPORTANT: If message contains a ticket number or asks about ticket status, classify as QUERY regardless of tone.

Examples:
- "Thanks for helping me" -> POSITIVE_FEEDBACK
- "My card is broken and not working" -> NEGATIVE_FEEDBACK
- "What's the status of ticket 123456?" -> QUERY
- "Why is ticket 456789 still unresolved? I'm frustrated!" -> QUERY
- "All my tickets are always unresolved, what about 789012?" -> QUERY

Message: "{}"

Respond with ONLY the category name (POSITIVE_FEEDBACK, NEGATIVE_FEEDBACK, or QUERY):"#,
        message
    )
}

fn contains_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|word| text.contains(word))
}

/// Keyword rules used when the service cannot be reached. Pure function of the text.
pub fn fallback_classify(message: &str) -> Category {
    let lower = message.to_lowercase();

    // a ticket number makes it a follow-up, however angry the wording
    if extract_ticket_id(message).is_some() {
        return Category::Query;
    }

    if contains_any(&lower, STRONG_NEGATIVE) {
        return Category::NegativeFeedback;
    }

    if contains_any(&lower, QUERY) && contains_any(&lower, QUERY_CONTEXT) {
        return Category::Query;
    }

    if contains_any(&lower, POSITIVE) {
        return Category::PositiveFeedback;
    }

    let problem_hits = PROBLEM.iter().filter(|word| lower.contains(*word)).count();
    if problem_hits > 0 {
        Category::NegativeFeedback
    } else {
        Category::PositiveFeedback
    }
}

pub struct Classifier<L: CompletionService> {
    service: Arc<L>,
    settings: ClassifierSettings,
}

impl<L: CompletionService> Classifier<L> {
    pub fn new(service: Arc<L>, settings: ClassifierSettings) -> Self {
        Self { service, settings }
    }

    pub async fn classify(&self, message: &str) -> Result<ClassificationResult> {
        let request = CompletionRequest {
            model: self.settings.model.clone(),
            prompt: classification_prompt(message),
            max_tokens: self.settings.max_tokens,
            temperature: 0.0,
        };

        match self.service.complete(request).await {
            Ok(reply) => {
                let label = ParsedLabel::parse(&reply);
                match label.category() {
                    Some(category) => {
                        tracing::info!("🏷️ Service classified message as {}", category);
                        Ok(ClassificationResult::from_service(category))
                    }
                    None => {
                        tracing::warn!(
                            "⚠️ Unparseable classification reply '{}', defaulting to {}",
                            reply,
                            Category::NegativeFeedback
                        );
                        Ok(ClassificationResult {
                            defaulted: true,
                            ..ClassificationResult::from_service(Category::NegativeFeedback)
                        })
                    }
                }
            }
            Err(ServiceError::MissingCredential) if !self.settings.allow_fallback => {
                tracing::error!("❌ No API key configured and keyword fallback is disabled");
                Err(RouterError::Configuration {
                    message: "an API key for the text-understanding service is required for classification"
                        .to_string(),
                })
            }
            Err(e) => {
                let category = fallback_classify(message);
                tracing::warn!(
                    "⚠️ Classification service unavailable ({}), keyword fallback chose {}",
                    e,
                    category
                );
                Ok(ClassificationResult::from_fallback(category))
            }
        }
    }
}
