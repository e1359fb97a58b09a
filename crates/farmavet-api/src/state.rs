//! Shared handler state.

use std::sync::Arc;

use farmavet_auth::{LoginThrottle, SessionStore};
use farmavet_core::FarmavetConfig;
use farmavet_storage::Database;

/// State cloned into every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Site database
    pub db: Database,
    /// Live admin sessions
    pub sessions: Arc<SessionStore>,
    /// Failed-login throttle
    pub throttle: Arc<LoginThrottle>,
    /// Loaded configuration
    pub config: Arc<FarmavetConfig>,
}

impl AppState {
    /// Build state with session store and throttle sized from `config.auth`.
    pub fn new(db: Database, config: FarmavetConfig) -> Self {
        let sessions = Arc::new(SessionStore::from_config(&config.auth));
        let throttle = Arc::new(LoginThrottle::from_config(&config.auth));
        Self::with_parts(db, config, sessions, throttle)
    }

    /// Build state from explicit parts.
    pub fn with_parts(
        db: Database,
        config: FarmavetConfig,
        sessions: Arc<SessionStore>,
        throttle: Arc<LoginThrottle>,
    ) -> Self {
        Self {
            db,
            sessions,
            throttle,
            config: Arc::new(config),
        }
    }
}
