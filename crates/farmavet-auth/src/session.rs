//! Server-side admin sessions.
//!
//! Session ids are 256-bit random hex strings handed to the browser in an
//! HTTP-only cookie. Each session carries its own CSRF token. Expiry slides
//! forward on every successful lookup.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use farmavet_core::config::AuthConfig;

use crate::clock::{Clock, SystemClock};
use crate::csrf::generate_csrf_token;
use crate::error::Result;
use crate::password::random_hex;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "farmavet_session";

const SESSION_ID_BYTES: usize = 32;

/// A live admin session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Session id (cookie value)
    pub id: String,
    /// Logged-in admin
    pub admin_id: i64,
    /// Admin username
    pub username: String,
    /// Token expected in `X-CSRF-Token`
    pub csrf_token: String,
    expires_at: Instant,
}

/// In-memory session store. Share it behind an `Arc`.
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    ttl: Duration,
    capacity: usize,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("ttl", &self.ttl)
            .field("capacity", &self.capacity)
            .field("active", &self.len())
            .finish()
    }
}

impl SessionStore {
    /// Store on the system clock.
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self::with_clock(ttl, capacity, Arc::new(SystemClock))
    }

    /// Store on an explicit clock.
    pub fn with_clock(ttl: Duration, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
            clock,
        }
    }

    /// Store configured from the `[auth]` section.
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.session_ttl(), config.session_capacity)
    }

    /// Session lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open a session for an admin.
    pub fn create(&self, admin_id: i64, username: &str) -> Result<Session> {
        let session = Session {
            id: random_hex(SESSION_ID_BYTES)?,
            admin_id,
            username: username.to_string(),
            csrf_token: generate_csrf_token()?,
            expires_at: self.clock.now() + self.ttl,
        };

        let now = self.clock.now();
        let mut sessions = self.lock();
        if sessions.len() >= self.capacity {
            sessions.retain(|_, s| s.expires_at > now);
            if sessions.len() >= self.capacity {
                let soonest = sessions
                    .values()
                    .min_by_key(|s| s.expires_at)
                    .map(|s| s.id.clone());
                if let Some(soonest) = soonest {
                    sessions.remove(&soonest);
                }
            }
        }
        sessions.insert(session.id.clone(), session.clone());
        log::debug!("Opened session for '{username}'");
        Ok(session)
    }

    /// Look up a session and extend its expiry. Expired sessions are dropped.
    pub fn touch(&self, id: &str) -> Option<Session> {
        let now = self.clock.now();
        let mut sessions = self.lock();
        match sessions.get_mut(id) {
            Some(session) if session.expires_at > now => {
                session.expires_at = now + self.ttl;
                Some(session.clone())
            }
            Some(_) => {
                sessions.remove(id);
                None
            }
            None => None,
        }
    }

    /// End a session. Returns false when it did not exist.
    pub fn remove(&self, id: &str) -> bool {
        self.lock().remove(id).is_some()
    }

    /// End every session of an admin (after a password change).
    pub fn remove_admin(&self, admin_id: i64) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, s| s.admin_id != admin_id);
        before - sessions.len()
    }

    /// Number of stored sessions, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no session is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
