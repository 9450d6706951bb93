//! Error types for the mock interview flow.

use std::time::Duration;

/// Top-level error type for the flow.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Submission error: {0}")]
    Submission(#[from] SubmissionError),

    #[error("Flow error: {0}")]
    Flow(#[from] FlowError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {key}. {hint}")]
    MissingRequired { key: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Key-value backend errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// User input that cannot advance the flow.
///
/// Always recovered locally: the page raises a destructive toast and the
/// user stays where they are.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<&'static str> },

    #[error("Invalid email address: {email}")]
    InvalidEmail { email: String },

    #[error("Interview too short: {len} messages, at least {min} required")]
    TranscriptTooShort { len: usize, min: usize },
}

/// Failures handing the completion record to the report collaborator.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("Report request failed: {0}")]
    Http(String),

    #[error("Report endpoint rejected the record with status {status}")]
    Rejected { status: u16 },

    #[error("Report request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to persist completion: {0}")]
    Persist(#[from] DatabaseError),
}

/// Actions that do not fit the current state of the flow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("No interview is in progress")]
    NoActiveInterview,

    #[error("Interview is busy ({phase}), try again shortly")]
    Busy { phase: String },

    #[error("Interview was already submitted")]
    AlreadySubmitted,
}

/// Result type alias for the flow.
pub type Result<T> = std::result::Result<T, Error>;
