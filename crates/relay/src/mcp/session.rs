use dashmap::DashMap;
use serde_json::Value;
use std::time::{Duration, Instant};

/// Idle time after which a session is dropped when no TTL is configured.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
pub struct Session {
    pub protocol_version: String,
    pub client_info: Option<Value>,
    /// Set once the client sends `notifications/initialized`.
    pub initialized: bool,
    pub created_at: Instant,
    /// Refreshed whenever the session is looked up.
    pub last_active: Instant,
}

impl Session {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.last_active) >= ttl
    }
}

/// MCP sessions keyed by the `mcp-session-id` header value.
///
/// Clients are not obliged to send `DELETE /mcp`, so sessions idle for longer
/// than the TTL are swept on every `create_session` and by
/// [`evict_expired`](Self::evict_expired).
#[derive(Debug)]
pub struct SessionManager {
    sessions: DashMap<String, Session>,
    ttl: Duration,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Register a new session and return its 32-character id.
    pub fn create_session(&self, protocol_version: String, client_info: Option<Value>) -> String {
        self.evict_expired();

        let id = uuid::Uuid::new_v4().simple().to_string();
        let now = Instant::now();
        self.sessions.insert(
            id.clone(),
            Session {
                protocol_version,
                client_info,
                initialized: false,
                created_at: now,
                last_active: now,
            },
        );
        id
    }

    /// The live session for `id`. Expired sessions are removed and reported
    /// as missing.
    pub fn get_session(&self, id: &str) -> Option<Session> {
        let now = Instant::now();
        {
            let mut session = self.sessions.get_mut(id)?;
            if !session.is_expired(now, self.ttl) {
                session.last_active = now;
                return Some(session.value().clone());
            }
        }
        self.sessions
            .remove_if(id, |_, session| session.is_expired(now, self.ttl));
        None
    }

    /// Returns false when the session does not exist.
    pub fn mark_initialized(&self, id: &str) -> bool {
        match self.sessions.get_mut(id) {
            Some(mut session) => {
                session.initialized = true;
                session.last_active = Instant::now();
                true
            }
            None => false,
        }
    }

    pub fn remove_session(&self, id: &str) -> Option<Session> {
        self.sessions.remove(id).map(|(_, session)| session)
    }

    /// Drop every session idle for longer than the TTL; returns how many went.
    pub fn evict_expired(&self) -> usize {
        self.evict_expired_at(Instant::now())
    }

    fn evict_expired_at(&self, now: Instant) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| !session.is_expired(now, self.ttl));
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            tracing::debug!(evicted, remaining = self.sessions.len(), "Evicted idle sessions");
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
