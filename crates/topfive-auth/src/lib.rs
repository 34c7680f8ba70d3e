//! TopFive Session Management
//!
//! Owns the in-memory session (current user identity, logged-in flag) and the
//! auth operations over the remote API. Transitions go through a closed set
//! of action kinds; fallible operations report failure as a display-ready
//! `UserMessage` rather than an error type, so callers never need error
//! handling around them.

mod manager;
mod message;
mod navigator;
mod session;

pub use manager::{AuthManager, REMEMBER_DAYS, REMEMBER_FLAG};
pub use message::UserMessage;
pub use navigator::{Navigator, NullNavigator};
pub use session::{AuthAction, Session};

pub type Result<T> = std::result::Result<T, UserMessage>;
