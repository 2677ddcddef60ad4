use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Six-digit numeric ticket identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(String);

impl TicketId {
    pub const MIN: u32 = 100_000;
    pub const MAX: u32 = 999_999;

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(Self::MIN..=Self::MAX).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TicketId {
    type Err = String;

    /// Accepts exactly six ASCII digits within `MIN..=MAX`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('#');
        let in_range = s.len() == 6
            && s.bytes().all(|b| b.is_ascii_digit())
            && s.parse::<u32>().is_ok_and(|n| (Self::MIN..=Self::MAX).contains(&n));
        if in_range {
            Ok(Self(s.to_string()))
        } else {
            Err(format!("invalid ticket number: {:?} (expected 6 digits)", s))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Unresolved,
    InProgress,
    Resolved,
}

impl TicketStatus {
    /// Stored representation, matching what dashboards read from the table.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Unresolved => "Unresolved",
            TicketStatus::InProgress => "In Progress",
            TicketStatus::Resolved => "Resolved",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['_', '-'], " ").as_str() {
            "unresolved" => Ok(TicketStatus::Unresolved),
            "in progress" => Ok(TicketStatus::InProgress),
            "resolved" => Ok(TicketStatus::Resolved),
            other => Err(format!("unknown ticket status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub(crate) id: TicketId,
    pub(crate) status: TicketStatus,
    pub(crate) description: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl Ticket {
    pub fn id(&self) -> &TicketId {
        &self.id
    }

    pub fn status(&self) -> TicketStatus {
        self.status
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    PositiveFeedback,
    NegativeFeedback,
    Query,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::PositiveFeedback => "positive_feedback",
            Category::NegativeFeedback => "negative_feedback",
            Category::Query => "query",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which path produced a classification. Observability only; never used for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationSource {
    Service,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub category: Category,
    pub source: ClassificationSource,
    /// Set when the service reply carried no recognizable label.
    pub defaulted: bool,
}

impl ClassificationResult {
    pub fn from_service(category: Category) -> Self {
        Self {
            category,
            source: ClassificationSource::Service,
            defaulted: false,
        }
    }

    pub fn from_fallback(category: Category) -> Self {
        Self {
            category,
            source: ClassificationSource::Fallback,
            defaulted: false,
        }
    }

    pub fn used_service(&self) -> bool {
        self.source == ClassificationSource::Service
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandlerKind {
    #[serde(rename = "Feedback Handler (Positive)")]
    FeedbackPositive,
    #[serde(rename = "Feedback Handler (Negative)")]
    FeedbackNegative,
    #[serde(rename = "Query Handler")]
    Query,
}

impl HandlerKind {
    pub fn label(&self) -> &'static str {
        match self {
            HandlerKind::FeedbackPositive => "Feedback Handler (Positive)",
            HandlerKind::FeedbackNegative => "Feedback Handler (Negative)",
            HandlerKind::Query => "Query Handler",
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returned by the negative-feedback path so the router can record the new ticket.
#[derive(Debug, Clone, PartialEq)]
pub struct TicketReceipt {
    pub ticket_id: TicketId,
    pub response: String,
}

/// Audit record of one processed message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub message: String,
    pub classification: Category,
    pub agent_used: HandlerKind,
    pub response: String,
    pub using_service: bool,
    pub ticket_id: Option<TicketId>,
    pub processed_at: DateTime<Utc>,
}
