//! User-facing failure messages

use std::fmt;

use topfive_api::ApiError;

/// Display-ready explanation of a failed `login` or `register`, suitable for
/// inline rendering next to the form. Either the server's structured message
/// verbatim, or a fixed fallback when the failure had no such message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMessage(String);

impl UserMessage {
    pub(crate) fn from_api_error(err: &ApiError, fallback: &str) -> Self {
        match err.client_message() {
            Some(message) => Self(message.to_string()),
            None => Self(fallback.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
