//! Read-only access to the signed-in employee.

use std::{fs, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(rename = "type", default)]
    pub user_type: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl CurrentUser {
    pub fn employee(email: impl Into<String>) -> Self {
        Self {
            user_type: "Employee".into(),
            email: email.into(),
            status: Some("connected".into()),
        }
    }
}

pub trait SessionAccessor: Send + Sync {
    fn current_user(&self) -> Result<CurrentUser, SessionError>;
}

/// Session fixed at construction time.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    user: Option<CurrentUser>,
}

impl StaticSession {
    pub fn new(user: CurrentUser) -> Self {
        Self { user: Some(user) }
    }

    pub fn signed_out() -> Self {
        Self { user: None }
    }
}

impl SessionAccessor for StaticSession {
    fn current_user(&self) -> Result<CurrentUser, SessionError> {
        self.user.clone().ok_or(SessionError::Missing)
    }
}

/// Session persisted as the JSON `user` object in a file; re-read on every call
/// so a sign-out elsewhere is observed.
#[derive(Debug, Clone)]
pub struct PersistedSession {
    path: PathBuf,
}

impl PersistedSession {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn persist(&self, user: &CurrentUser) -> Result<(), SessionError> {
        let raw = serde_json::to_string_pretty(user)
            .map_err(|e| SessionError::Malformed(e.to_string()))?;
        fs::write(&self.path, raw).map_err(|e| SessionError::Unreadable {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }
}

impl SessionAccessor for PersistedSession {
    fn current_user(&self) -> Result<CurrentUser, SessionError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(SessionError::Missing);
            }
            Err(err) => {
                return Err(SessionError::Unreadable {
                    path: self.path.clone(),
                    reason: err.to_string(),
                });
            }
        };

        if raw.trim().is_empty() || raw.trim() == "null" {
            return Err(SessionError::Missing);
        }

        serde_json::from_str(&raw).map_err(|e| SessionError::Malformed(e.to_string()))
    }
}
