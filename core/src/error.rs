use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntelError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Lead '{lead_id}' not found")]
    LeadNotFound { lead_id: String },

    #[error("Invalid command: {reason}")]
    InvalidCommand { reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type IntelResult<T> = Result<T, IntelError>;
