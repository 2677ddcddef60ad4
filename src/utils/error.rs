use thiserror::Error;

#[derive(Error, Debug)]
pub enum RouterError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Ticket store error: {0}")]
    StorageError(#[from] rusqlite::Error),

    #[error("Could not allocate a free ticket id after {attempts} attempts")]
    TicketIdExhausted { attempts: u32 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

pub type Result<T> = std::result::Result<T, RouterError>;

/// Failures of the external text-understanding service. These never reach the
/// caller of the router directly; classifier and query handler degrade to their
/// local paths instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("no API key configured for the text-understanding service")]
    MissingCredential,

    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("service responded with HTTP {0}")]
    Status(u16),

    #[error("malformed service response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Persistence,
    Input,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code reported by the CLI.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl RouterError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            RouterError::Configuration { .. }
            | RouterError::ConfigValidationError { .. }
            | RouterError::InvalidConfigValueError { .. }
            | RouterError::MissingConfigError { .. }
            | RouterError::ApiError(_) => ErrorCategory::Configuration,
            RouterError::StorageError(_)
            | RouterError::TicketIdExhausted { .. }
            | RouterError::IoError(_) => ErrorCategory::Persistence,
            RouterError::ValidationError { .. } => ErrorCategory::Input,
            RouterError::SerializationError(_) | RouterError::InternalError { .. } => {
                ErrorCategory::Internal
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RouterError::ValidationError { .. } => ErrorSeverity::Medium,
            RouterError::TicketIdExhausted { .. } => ErrorSeverity::Medium,
            RouterError::Configuration { .. }
            | RouterError::ConfigValidationError { .. }
            | RouterError::InvalidConfigValueError { .. }
            | RouterError::MissingConfigError { .. }
            | RouterError::ApiError(_) => ErrorSeverity::High,
            RouterError::StorageError(_)
            | RouterError::IoError(_)
            | RouterError::SerializationError(_)
            | RouterError::InternalError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            RouterError::Configuration { .. } => {
                "Set the API key environment variable named in [service].api_key_env, or enable [classifier].allow_fallback".to_string()
            }
            RouterError::ConfigValidationError { .. } => {
                "Check the configuration file for TOML syntax errors".to_string()
            }
            RouterError::InvalidConfigValueError { field, .. } => {
                format!("Correct the value of '{}' in the configuration file", field)
            }
            RouterError::MissingConfigError { field } => {
                format!("Add '{}' to the configuration file", field)
            }
            RouterError::StorageError(_) | RouterError::IoError(_) => {
                "Check that the ticket database path is writable and not corrupted".to_string()
            }
            RouterError::TicketIdExhausted { .. } => {
                "The ticket id space is nearly full; retry or archive old tickets".to_string()
            }
            RouterError::ValidationError { .. } => "Provide a non-empty message".to_string(),
            RouterError::ApiError(_) => {
                "Check the service endpoint and TLS configuration".to_string()
            }
            RouterError::SerializationError(_) | RouterError::InternalError { .. } => {
                "Retry the request; report the issue if it persists".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Persistence => {
                "The ticket system is currently unavailable. Your message was not processed."
                    .to_string()
            }
            ErrorCategory::Input => format!("Invalid input: {}", self),
            ErrorCategory::Internal => format!("Unexpected internal failure: {}", self),
        }
    }
}
