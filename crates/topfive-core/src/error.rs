//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] topfive_storage::StorageError),

    #[error("API error: {0}")]
    Api(#[from] topfive_api::ApiError),

    #[error("Configuration error: {0}")]
    Config(String),
}
