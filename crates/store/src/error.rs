use thiserror::Error;

/// Failure of a record store call.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success answer from the backend; `payload` is its error body.
    #[error("record store returned {status}: {payload}")]
    Api {
        status: u16,
        payload: serde_json::Value,
    },

    #[error("unexpected record store response: {0}")]
    Decode(String),

    #[error("record '{0}' does not exist")]
    RecordNotFound(String),

    #[error("record store returned no record for {0}")]
    EmptyResponse(&'static str),

    #[error("invalid record store configuration: {0}")]
    InvalidConfig(String),
}

impl StoreError {
    /// HTTP status of the backend answer, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::Api { status, .. } => Some(*status),
            StoreError::Transport(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}
