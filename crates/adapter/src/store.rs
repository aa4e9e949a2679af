//! Session store - per-player game state keyed by an opaque token
//!
//! The simulation core is pure; this is where its state lives between
//! requests. Each token owns one async mutex around its [`GameSession`], and a
//! request holds that mutex for its whole read-modify-write cycle, so two
//! in-flight requests from the same player are applied one after the other
//! instead of racing. Requests for different tokens only share the brief map
//! lookup.
//!
//! A slot is only live while it is still in the map. Removal and eviction
//! drop an entry while holding (or having just won) its mutex, and
//! [`SessionStore::acquire`] re-checks liveness after locking, so a request
//! queued behind a removal moves to a fresh slot instead of writing into a
//! detached one.
//!
//! Slots idle for longer than [`StoreLimits::ttl`] are evicted, and no more
//! than [`StoreLimits::max_sessions`] are held at once.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::core::GameSession;

/// Longest token accepted from a client
pub const MAX_TOKEN_LEN: usize = 128;

/// Handle to one player's session slot
pub type SessionSlot = Arc<Mutex<GameSession>>;

/// Exclusive access to one live session
pub type SessionGuard = OwnedMutexGuard<GameSession>;

/// Bounds on what the store keeps in memory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLimits {
    /// Idle time after which a session is forgotten
    pub ttl: Duration,
    pub max_sessions: usize,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30 * 60),
            max_sessions: 10_000,
        }
    }
}

/// No room for another session, even after evicting idle ones
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreFull {
    pub max_sessions: usize,
}

impl fmt::Display for StoreFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session store full ({} sessions)", self.max_sessions)
    }
}

impl std::error::Error for StoreFull {}

#[derive(Debug)]
struct Entry {
    slot: SessionSlot,
    /// Milliseconds since the store's epoch
    last_seen: AtomicU64,
}

#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Entry>>,
    limits: StoreLimits,
    epoch: Instant,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limits(StoreLimits::default())
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: StoreLimits) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            limits,
            epoch: Instant::now(),
        }
    }

    pub fn limits(&self) -> StoreLimits {
        self.limits
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    fn is_expired(&self, entry: &Entry, now_ms: u64) -> bool {
        let idle = now_ms.saturating_sub(entry.last_seen.load(Ordering::Relaxed));
        idle >= self.limits.ttl.as_millis() as u64
    }

    /// Slot for `token`, created in the `NotStarted` state on first use.
    async fn slot(&self, token: &str) -> Result<SessionSlot, StoreFull> {
        {
            let sessions = self.sessions.read().await;
            if let Some(entry) = sessions.get(token) {
                entry.last_seen.store(self.now_ms(), Ordering::Relaxed);
                return Ok(Arc::clone(&entry.slot));
            }
        }

        let mut sessions = self.sessions.write().await;
        let now_ms = self.now_ms();
        if !sessions.contains_key(token) && sessions.len() >= self.limits.max_sessions {
            self.evict_locked(&mut sessions, now_ms);
            if sessions.len() >= self.limits.max_sessions {
                return Err(StoreFull {
                    max_sessions: self.limits.max_sessions,
                });
            }
        }

        let entry = sessions.entry(token.to_string()).or_insert_with(|| Entry {
            slot: Arc::new(Mutex::new(GameSession::NotStarted)),
            last_seen: AtomicU64::new(now_ms),
        });
        entry.last_seen.store(now_ms, Ordering::Relaxed);
        Ok(Arc::clone(&entry.slot))
    }

    /// Is `slot` still the entry stored under `token`?
    async fn is_live(&self, token: &str, slot: &SessionSlot) -> bool {
        let sessions = self.sessions.read().await;
        sessions
            .get(token)
            .is_some_and(|entry| Arc::ptr_eq(&entry.slot, slot))
    }

    /// Lock the live session for `token`, creating it on first use.
    ///
    /// The guard is held for the whole read-modify-write of one request.
    pub async fn acquire(&self, token: &str) -> Result<SessionGuard, StoreFull> {
        loop {
            let slot = self.slot(token).await?;
            let guard = Arc::clone(&slot).lock_owned().await;
            if self.is_live(token, &slot).await {
                return Ok(guard);
            }
        }
    }

    /// Copy of the stored state (`NotStarted` for unknown tokens)
    pub async fn load(&self, token: &str) -> GameSession {
        let slot = {
            let sessions = self.sessions.read().await;
            sessions.get(token).map(|entry| Arc::clone(&entry.slot))
        };
        match slot {
            Some(slot) => slot.lock().await.clone(),
            None => GameSession::NotStarted,
        }
    }

    /// Overwrite the stored state
    pub async fn save(&self, token: &str, session: GameSession) -> Result<(), StoreFull> {
        let mut guard = self.acquire(token).await?;
        *guard = session;
        Ok(())
    }

    /// Forget a session once any in-flight request on it has finished.
    /// Returns whether it existed.
    pub async fn remove(&self, token: &str) -> bool {
        loop {
            let slot = {
                let sessions = self.sessions.read().await;
                match sessions.get(token) {
                    Some(entry) => Arc::clone(&entry.slot),
                    None => return false,
                }
            };

            let _guard = slot.lock().await;
            let mut sessions = self.sessions.write().await;
            match sessions.get(token) {
                Some(entry) if Arc::ptr_eq(&entry.slot, &slot) => {
                    sessions.remove(token);
                    return true;
                }
                Some(_) => continue,
                None => return false,
            }
        }
    }

    /// Drop every session idle for at least the TTL. Sessions with a request
    /// in flight are kept. Returns how many were dropped.
    pub async fn evict_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let now_ms = self.now_ms();
        self.evict_locked(&mut sessions, now_ms)
    }

    fn evict_locked(&self, sessions: &mut HashMap<String, Entry>, now_ms: u64) -> usize {
        let before = sessions.len();
        sessions.retain(|_, entry| {
            !(self.is_expired(entry, now_ms) && entry.slot.try_lock().is_ok())
        });
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Fresh opaque session token: 32 lowercase hex characters.
pub fn mint_token() -> String {
    format!("{:032x}", rand::random::<u128>())
}

/// Is `token` acceptable as a session key?
///
/// Non-empty, at most [`MAX_TOKEN_LEN`] bytes, visible ASCII only.
pub fn is_valid_token(token: &str) -> bool {
    !token.is_empty()
        && token.len() <= MAX_TOKEN_LEN
        && token.bytes().all(|b| b.is_ascii_graphic())
}
