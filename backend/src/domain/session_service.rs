//! Password login for the REST surface.
//!
//! A successful login issues an opaque random token that the IO layer sets as
//! a cookie. Tokens live in memory only, so a restart logs everyone out, and
//! each one expires [`SESSION_TTL`] after it was issued.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

pub const SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

#[derive(Clone)]
pub struct SessionService {
    password: Arc<String>,
    ttl: Duration,
    /// Token to issue time
    sessions: Arc<Mutex<HashMap<String, Instant>>>,
}

impl SessionService {
    pub fn new(password: impl Into<String>) -> Self {
        Self::with_ttl(password, SESSION_TTL)
    }

    pub fn with_ttl(password: impl Into<String>, ttl: Duration) -> Self {
        Self {
            password: Arc::new(password.into()),
            ttl,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<String, Instant>> {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_live(&self, issued: Instant) -> bool {
        issued.elapsed() < self.ttl
    }

    /// Returns a new session token if `password` matches. Expired sessions
    /// are swept on every successful login.
    pub fn login(&self, password: &str) -> Option<String> {
        if self.password.is_empty() || password != self.password.as_str() {
            warn!("Rejected login attempt");
            return None;
        }
        let token = uuid::Uuid::new_v4().simple().to_string();
        let mut sessions = self.sessions();
        let before = sessions.len();
        sessions.retain(|_, issued| self.is_live(*issued));
        if sessions.len() < before {
            debug!("Swept {} expired sessions", before - sessions.len());
        }
        sessions.insert(token.clone(), Instant::now());
        info!("Opened session");
        Some(token)
    }

    pub fn logout(&self, token: &str) {
        if self.sessions().remove(token).is_some() {
            info!("Closed session");
        }
    }

    pub fn is_valid(&self, token: &str) -> bool {
        let mut sessions = self.sessions();
        match sessions.get(token).map(|issued| self.is_live(*issued)) {
            Some(true) => true,
            Some(false) => {
                sessions.remove(token);
                debug!("Session expired");
                false
            }
            None => false,
        }
    }

    pub fn open_sessions(&self) -> usize {
        self.sessions().len()
    }
}
