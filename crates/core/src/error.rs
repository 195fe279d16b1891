//! Error types for the AgentForge domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all AgentForge operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Generation backend errors ---
    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    // --- Evaluation judge errors ---
    #[error("Judge error: {0}")]
    Judge(#[from] JudgeError),

    // --- Conversation session errors ---
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Errors from the text generation backend.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by backend, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Backend not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Errors from the conversational-quality judge.
///
/// A malformed verdict is a reportable error — the caller must never
/// coerce or silently clamp judge output (see `JudgeVerdict::validate`).
#[derive(Debug, Clone, Error)]
pub enum JudgeError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Malformed judge response: {0}")]
    Malformed(String),

    #[error("Expected exactly 3 dimensions, got {0}")]
    WrongDimensionCount(usize),

    #[error("Dimension '{name}' score {score} outside [0, 20]")]
    DimensionOutOfRange { name: String, score: i64 },

    #[error("Dynamic score {0} outside [0, 60]")]
    DynamicScoreOutOfRange(i64),

    #[error("Network error: {0}")]
    Network(String),
}

/// Errors from the per-conversation turn engine.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    /// A generation is already draining for this conversation. The send
    /// control should be disabled; nothing is queued.
    #[error("A generation is already in flight for this conversation")]
    GenerationInFlight,

    #[error("Empty utterance")]
    EmptyUtterance,
}
