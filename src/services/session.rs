//! Server-side session store.
//!
//! ARCHITECTURE
//! ============
//! The browser only holds an opaque random token in an HttpOnly cookie. The
//! token maps to a [`Principal`] snapshot kept in process memory, so request
//! handlers learn who is calling without a storage round-trip.
//!
//! Snapshots are never edited in place: when the underlying user changes,
//! the handler builds a new `Principal` and calls [`SessionStore::reissue`].
//! Entries expire after an idle TTL; each successful lookup extends it.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// Identity of the authenticated user, cached per session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Debug)]
struct SessionEntry {
    principal: Principal,
    expires_at: Instant,
}

/// Longest idle lifetime a store will honour; larger values are clamped.
pub const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Token → principal map shared by all request handlers.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,
    ttl: Duration,
}

impl SessionStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { sessions: Arc::new(RwLock::new(HashMap::new())), ttl: ttl.min(MAX_TTL) }
    }

    /// Start a session for `principal`, returning its token.
    pub async fn create(&self, principal: Principal) -> String {
        self.purge_expired().await;

        let token = generate_token();
        let user_id = principal.id;
        let entry = SessionEntry { principal, expires_at: Instant::now() + self.ttl };
        self.sessions.write().await.insert(token.clone(), entry);
        info!(user_id, "session created");
        token
    }

    /// Resolve a token to its principal, extending the idle deadline.
    /// Expired entries are dropped and reported as absent.
    pub async fn get(&self, token: &str) -> Option<Principal> {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        let entry = sessions.get_mut(token)?;
        if entry.expires_at <= now {
            sessions.remove(token);
            return None;
        }
        entry.expires_at = now + self.ttl;
        Some(entry.principal.clone())
    }

    /// Replace the principal stored under `token`. Returns `false` if the
    /// session no longer exists.
    pub async fn reissue(&self, token: &str, principal: Principal) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(token) {
            Some(entry) => {
                entry.principal = principal;
                true
            }
            None => false,
        }
    }

    /// End a session. Unknown tokens are ignored.
    pub async fn invalidate(&self, token: &str) {
        if let Some(entry) = self.sessions.write().await.remove(token) {
            info!(user_id = entry.principal.id, "session invalidated");
        }
    }

    /// Drop every expired entry, returning how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let now = Instant::now();
        sessions.retain(|_, entry| entry.expires_at > now);
        before - sessions.len()
    }

    /// Number of stored sessions, including ones not yet purged.
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
