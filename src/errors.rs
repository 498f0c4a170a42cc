use thiserror::Error;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("INVALID_DATE: {0}")]
    InvalidDate(String),
    #[error("NOT_AUTHENTICATED: {0}")]
    NotAuthenticated(String),
    #[error("NETWORK_FAILURE: {0}")]
    Network(String),
    #[error("STORAGE_FAILURE: {0}")]
    Storage(String),
    #[error("AI_FAILURE: {0}")]
    Completion(String),
    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl From<std::io::Error> for JournalError {
    fn from(value: std::io::Error) -> Self {
        Self::Storage(value.to_string())
    }
}

impl From<rusqlite::Error> for JournalError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(value.to_string())
    }
}

impl From<serde_json::Error> for JournalError {
    fn from(value: serde_json::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<reqwest::Error> for JournalError {
    fn from(value: reqwest::Error) -> Self {
        Self::Network(value.to_string())
    }
}

impl From<anyhow::Error> for JournalError {
    fn from(value: anyhow::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

pub type JournalResult<T> = Result<T, JournalError>;
