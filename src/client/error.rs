use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The server answered with a non-success status and an `{error}` body.
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },
    #[error("Security: Password Mismatch")]
    PasswordMismatch,
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Token store error: {0}")]
    Store(#[from] std::io::Error),
}

impl ClientError {
    /// Message suitable for the status panel.
    pub fn message(&self) -> String {
        match self {
            ClientError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
