//! TopFive Core
//!
//! Central coordination layer for the TopFive client. Owns configuration and
//! wires the storage, API, and session layers together; everything above it
//! holds a cloned `App` handle instead of reaching into globals.

mod app;
mod config;
mod error;

pub use app::App;
pub use config::Config;
pub use error::CoreError;

// Re-export core components
pub use topfive_api::{
    ApiError, Credentials, HttpSessionApi, LoginResponse, Registration, SessionApi, SessionStatus,
    User,
};
pub use topfive_auth::{
    AuthAction, AuthManager, Navigator, NullNavigator, Session, UserMessage, REMEMBER_DAYS,
    REMEMBER_FLAG,
};
pub use topfive_storage::{Database, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
