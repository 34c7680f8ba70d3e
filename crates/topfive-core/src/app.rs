//! Central client state container

use std::sync::Arc;

use topfive_api::HttpSessionApi;
use topfive_auth::{AuthManager, Navigator};
use topfive_storage::Database;

use crate::config::Config;
use crate::error::CoreError;
use crate::Result;

/// The one owner of client state. The view layer holds cloned handles; all
/// session reads and transitions go through `auth()`.
pub struct App {
    /// Configuration
    config: Config,
    /// Database
    db: Database,
    /// Session manager
    auth: AuthManager,
}

impl App {
    /// Wire up storage, the HTTP API, and the session manager.
    pub fn new(config: Config, navigator: Arc<dyn Navigator>) -> Result<Self> {
        // Ensure data directory exists
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::open(&config.database_path)?;
        let api = Arc::new(HttpSessionApi::new(&config.api_base_url)?);
        let auth = AuthManager::new(api, db.clone(), navigator);

        Ok(Self { config, db, auth })
    }

    /// Startup: probe the remote session iff a remembered login is present.
    pub async fn initialize(&self) {
        self.auth.initialize().await;
        tracing::info!("Client initialized");
    }

    pub fn auth(&self) -> &AuthManager {
        &self.auth
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl Clone for App {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            db: self.db.clone(),
            auth: self.auth.clone(),
        }
    }
}

// Implement std::io::Error conversion for fs operations
impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::Config(e.to_string())
    }
}
