//! Stable error taxonomy surfaced to agents.
//!
//! Every variant carries a `code()` that is part of the wire contract —
//! agents match on the string, not on Rust's `Debug` output.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CharlotteError {
    #[error("element '{0}' does not resolve against the current element table")]
    ElementNotFound(String),

    #[error("element '{0}' is not interactive")]
    ElementNotInteractive(String),

    #[error("navigation failed: {0}")]
    NavigationFailed(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("evaluation failed: {0}")]
    EvaluationError(String),

    #[error("session error: {0}")]
    SessionError(String),

    #[error("snapshot {0} has expired")]
    SnapshotExpired(u64),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("toml deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    #[error("toml serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl CharlotteError {
    /// The stable, user-visible snake-case code.
    pub fn code(&self) -> &'static str {
        match self {
            CharlotteError::ElementNotFound(_) => "ELEMENT_NOT_FOUND",
            CharlotteError::ElementNotInteractive(_) => "ELEMENT_NOT_INTERACTIVE",
            CharlotteError::NavigationFailed(_) => "NAVIGATION_FAILED",
            CharlotteError::Timeout(_) => "TIMEOUT",
            CharlotteError::EvaluationError(_) => "EVALUATION_ERROR",
            CharlotteError::SessionError(_) => "SESSION_ERROR",
            CharlotteError::SnapshotExpired(_) => "SNAPSHOT_EXPIRED",
            CharlotteError::Config(_) => "SESSION_ERROR",
            CharlotteError::Io(_) => "SESSION_ERROR",
            CharlotteError::Json(_) => "EVALUATION_ERROR",
            CharlotteError::TomlDeserialize(_) | CharlotteError::TomlSerialize(_) => {
                "SESSION_ERROR"
            }
        }
    }

    /// A short hint for recovery, where one is known.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            CharlotteError::ElementNotFound(_) => Some("call render to observe the current page"),
            CharlotteError::SnapshotExpired(_) => {
                Some("request a snapshot id at or above the store's oldest_id")
            }
            _ => None,
        }
    }

    /// The `{code, message, suggestion?}` envelope agents receive.
    pub fn to_envelope(&self) -> serde_json::Value {
        let mut obj = serde_json::json!({
            "code": self.code(),
            "message": self.to_string(),
        });
        if let Some(suggestion) = self.suggestion() {
            obj["suggestion"] = serde_json::Value::String(suggestion.to_string());
        }
        obj
    }
}

pub type Result<T> = std::result::Result<T, CharlotteError>;
