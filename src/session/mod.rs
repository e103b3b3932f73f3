//! Client-held admin session lifecycle.
//!
//! The server never stores sessions; the client keeps `{token, expiresAt}`
//! as a single record. The session is an explicit value object behind a
//! `SessionStore`, with a `Clock` seam so expiry logic is testable without
//! sleeping.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Persisted session: an opaque token plus its absolute expiry (epoch ms).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: i64,
}

impl Session {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at
    }
}

/// Where the session lifecycle currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Authenticated(Session),
}

impl SessionState {
    pub fn is_admin(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Authenticated(session) => Some(session),
            SessionState::Unauthenticated => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Corrupt session data: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Time source seam. Production uses the system clock; tests pin it.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Persistence seam for the single session record.
pub trait SessionStore {
    fn load(&self) -> Result<Option<Session>, SessionError>;
    fn save(&self, session: &Session) -> Result<(), SessionError>;
    fn clear(&self) -> Result<(), SessionError>;
}

/// File-backed store: one JSON file holding the single session record.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default location under the user config dir, overridable for tests
    /// and alternate profiles via PORTFOLIO_CLI_CONFIG_DIR.
    pub fn default_path() -> anyhow::Result<PathBuf> {
        let config_dir = if let Ok(custom_dir) = std::env::var("PORTFOLIO_CLI_CONFIG_DIR") {
            PathBuf::from(custom_dir)
        } else {
            let home = std::env::var("HOME")
                .map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
            PathBuf::from(home).join(".config").join("portfolio").join("cli")
        };

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }

        Ok(config_dir.join("session.json"))
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        let session: Session = serde_json::from_str(&content)?;
        Ok(Some(session))
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, SessionError> {
        Ok(self.session.lock().unwrap().clone())
    }

    fn save(&self, session: &Session) -> Result<(), SessionError> {
        *self.session.lock().unwrap() = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *self.session.lock().unwrap() = None;
        Ok(())
    }
}

/// Drives the Unauthenticated -> Authenticated -> (Expired | LoggedOut)
/// lifecycle against a store and a clock.
pub struct SessionManager<S, C> {
    store: S,
    clock: C,
}

impl<S: SessionStore, C: Clock> SessionManager<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    /// Read the current state. An expired persisted session is deleted and
    /// reported as absent, regardless of any flag a caller cached earlier.
    pub fn current(&self) -> Result<SessionState, SessionError> {
        match self.store.load()? {
            None => Ok(SessionState::Unauthenticated),
            Some(session) => {
                if session.is_expired(self.clock.now_ms()) {
                    self.store.clear()?;
                    Ok(SessionState::Unauthenticated)
                } else {
                    Ok(SessionState::Authenticated(session))
                }
            }
        }
    }

    /// Persist a freshly minted session (successful key validation).
    pub fn establish(&self, session: Session) -> Result<SessionState, SessionError> {
        self.store.save(&session)?;
        Ok(SessionState::Authenticated(session))
    }

    /// Logout: purely local, no server call.
    pub fn clear(&self) -> Result<SessionState, SessionError> {
        self.store.clear()?;
        Ok(SessionState::Unauthenticated)
    }
}
