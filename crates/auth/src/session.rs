//! Bearer-token session cache with fixed-TTL eviction.
//!
//! Sessions expire a fixed time after creation. Reading a session never
//! extends it. Expiry is enforced by a periodic sweep, so an expired session
//! stays visible to `lookup` until the next sweep runs.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use kanelm_core::UserId;

/// A logged-in user, as cached against their bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: UserId, display_name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            created_at,
        }
    }

    /// Whether the session is at least `ttl` old at `now`.
    ///
    /// An expiry past the representable range never arrives.
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.created_at
            .checked_add_signed(ttl)
            .is_some_and(|expires_at| expires_at <= now)
    }
}

/// Eviction settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Lifetime of a session, measured from `created_at`.
    pub ttl: Duration,
    /// Time between eviction sweeps.
    pub sweep_interval: StdDuration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::minutes(90),
            sweep_interval: StdDuration::from_secs(60),
        }
    }
}

/// Token → session map shared by request handlers and the eviction task.
///
/// Insert, delete and sweep take the write lock; lookups share the read lock.
#[derive(Debug, Default)]
pub struct SessionCache {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    // Entries are plain data, so a writer that panicked cannot leave the map
    // in a state worth refusing to read.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Session>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Session>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `session` under `token`, replacing any previous entry.
    pub fn insert(&self, token: impl Into<String>, session: Session) {
        self.write().insert(token.into(), session);
    }

    pub fn lookup(&self, token: &str) -> Option<Session> {
        self.read().get(token).cloned()
    }

    pub fn user_id(&self, token: &str) -> Option<UserId> {
        self.read().get(token).map(|s| s.user_id)
    }

    /// Remove `token`. Removing an absent token is a no-op.
    pub fn delete(&self, token: &str) -> Option<Session> {
        self.write().remove(token)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Drop every session at least `ttl` old at `now`. Returns how many went.
    pub fn evict_expired(&self, now: DateTime<Utc>, ttl: Duration) -> usize {
        let mut sessions = self.write();
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now, ttl));
        before - sessions.len()
    }

    /// Spawn the background sweep on the current tokio runtime.
    ///
    /// The first sweep runs one full interval after spawning. The task stops
    /// when `shutdown` is cancelled.
    pub fn spawn_eviction(
        self: &Arc<Self>,
        config: SessionConfig,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move { cache.run_eviction_loop(config, shutdown).await })
    }

    pub async fn run_eviction_loop(&self, config: SessionConfig, shutdown: CancellationToken) {
        tracing::info!(
            ttl_secs = config.ttl.num_seconds(),
            interval_secs = config.sweep_interval.as_secs(),
            "session eviction started"
        );

        let start = tokio::time::Instant::now() + config.sweep_interval;
        let mut ticker = tokio::time::interval_at(start, config.sweep_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let evicted = self.evict_expired(Utc::now(), config.ttl);
                    tracing::debug!(evicted, remaining = self.len(), "session sweep");
                }
            }
        }

        tracing::info!("session eviction stopped");
    }
}
