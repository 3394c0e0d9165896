//! Error kinds surfaced by the bill pipeline.

use std::path::PathBuf;

use shared::domain::BillId;
use thiserror::Error;

/// Failure reported by a [`crate::store::RemoteBillStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Erreur {status}: {body}")]
    Status { status: u16, body: String },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("Erreur 404: no bill with id {0}")]
    NotFound(BillId),
    #[error("update requires a bill identifier; the receipt was never uploaded")]
    MissingSelector,
    #[error("invalid bill payload: {0}")]
    Codec(#[from] serde_json::Error),
}

impl From<reqwest::Error> for StoreError {
    fn from(value: reqwest::Error) -> Self {
        match value.status() {
            Some(status) => StoreError::Status {
                status: status.as_u16(),
                body: value.to_string(),
            },
            None => StoreError::Transport(value.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no user session is persisted")]
    Missing,
    #[error("failed to read session file '{}': {reason}", .path.display())]
    Unreadable { path: PathBuf, reason: String },
    #[error("persisted session is malformed: {0}")]
    Malformed(String),
}

/// Rejected receipt; recoverable, shown next to the file input only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unsupported receipt format '{extension}' for '{file_name}' (expected jpg, jpeg or png)")]
    UnsupportedExtension {
        file_name: String,
        extension: String,
    },
}

/// Create/update rejection; reported, never blocks navigation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    #[error("receipt upload failed: {0}")]
    Upload(String),
    #[error("bill update failed: {0}")]
    Update(String),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// List fetch failure, classified from the store's message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetrievalError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    ServerError(String),
    #[error("{0}")]
    Other(String),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl RetrievalError {
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains("404") {
            RetrievalError::NotFound(message)
        } else if message.contains("500") {
            RetrievalError::ServerError(message)
        } else {
            RetrievalError::Other(message)
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            RetrievalError::NotFound(_) => "Page introuvable (404)",
            RetrievalError::ServerError(_) => "Erreur serveur (500)",
            RetrievalError::Other(_) => "Erreur",
            RetrievalError::Session(_) => "Session expirée",
        }
    }

    /// Error page content that replaces the bill list.
    pub fn render(&self) -> String {
        format!("{}\n{}", self.headline(), self)
    }
}
