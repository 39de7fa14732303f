use std::time::Duration;

use thiserror::Error;

use crate::schema::SchemaError;

pub type Result<T> = std::result::Result<T, BrainFlowError>;

#[derive(Debug, Error)]
pub enum BrainFlowError {
    #[error("domain `{0}` is routable but has no registered handler")]
    UnregisteredDomain(String),
    #[error("tool `{0}` not registered")]
    ToolNotRegistered(String),
    #[error("manifest for {kind} `{name}` does not match its implementation")]
    ManifestMismatch { kind: &'static str, name: String },
    #[error("tool `{0}` registered twice in the same domain")]
    DuplicateTool(String),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("reasoning step failed: {0}")]
    Reasoning(String),
    #[error("platform request failed ({status}): {message}")]
    Platform { status: u16, message: String },
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("malformed state update: {0}")]
    MalformedUpdate(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<serde_json::Error> for BrainFlowError {
    fn from(error: serde_json::Error) -> Self {
        BrainFlowError::Serialization(error.to_string())
    }
}
