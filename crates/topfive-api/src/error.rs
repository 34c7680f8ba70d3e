//! API error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// The server rejected the request with a structured, displayable message.
    #[error("Rejected by server ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected status: {0}")]
    UnexpectedStatus(u16),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// The server-provided message, when the failure was a 400-class
    /// rejection that carried one. Everything else has no message suitable
    /// for display.
    pub fn client_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { status, message } if (400..500).contains(status) => {
                Some(message.as_str())
            }
            _ => None,
        }
    }
}
