//! Error types for Referat.

use thiserror::Error;

/// Library-level error type for Referat operations.
///
/// Per-meeting failures are caught by the orchestrator and recorded as
/// outcomes; only a bad configuration, a missing input root, or an
/// interrupt aborts a run.
#[derive(Error, Debug)]
pub enum ReferatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File error: {0}")]
    File(String),

    #[error("Transcript parse error: {0}")]
    Transcript(String),

    #[error("Video error: {0}")]
    Video(String),

    #[error("Summarization failed: {0}")]
    Summarization(String),

    #[error("Report generation failed: {0}")]
    Report(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Result type alias for Referat operations.
pub type Result<T> = std::result::Result<T, ReferatError>;
