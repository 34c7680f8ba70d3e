//! TopFive Session API
//!
//! Boundary to the remote HTTP API that owns accounts and server-side
//! sessions. The wire session rides on a cookie managed by the HTTP client;
//! callers only see typed payloads and a typed error.

mod client;
mod error;
mod types;

pub use client::{HttpSessionApi, SessionApi};
pub use error::ApiError;
pub use types::{Credentials, LoginResponse, Registration, SessionStatus, User};

pub type Result<T> = std::result::Result<T, ApiError>;
