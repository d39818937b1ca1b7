//! Replay protection for accepted nonces.
//!
//! [`ReplayGuard`] remembers every `(client_id, nonce)` pair that passed
//! signature verification for the length of its replay window. Entries are
//! logically absent once `now >= inserted_at + ttl`, whether or not they have
//! been physically removed yet. Expired entries are dropped lazily when read
//! and in bulk by [`ReplayGuard::purge_expired`].
//!
//! The map is a sharded `DashMap`, so unrelated clients never contend on a
//! single lock. [`ReplayGuard::record`] uses the entry API to check and insert
//! atomically, which makes it the gate that enforces at-most-one acceptance
//! per nonce.

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::trace;

use crate::clock::{Clock, SystemClock};

type ReplayKey = (String, String);

/// A remembered nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayEntry {
    /// When the nonce was accepted.
    pub inserted_at: DateTime<Utc>,
    /// How long the nonce stays blocked.
    pub ttl: TimeDelta,
}

impl ReplayEntry {
    /// Whether the entry has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.inserted_at + self.ttl
    }
}

/// Time-bounded set of accepted `(client_id, nonce)` pairs.
pub struct ReplayGuard {
    entries: DashMap<ReplayKey, ReplayEntry>,
    clock: Arc<dyn Clock>,
}

impl ReplayGuard {
    /// Create an empty guard driven by the wall clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty guard driven by `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    /// Whether `nonce` has been accepted for `client_id` and is still live.
    ///
    /// An expired entry found here is removed.
    #[must_use]
    pub fn seen(&self, client_id: &str, nonce: &str) -> bool {
        let key = replay_key(client_id, nonce);
        let now = self.clock.now();

        let live = match self.entries.get(&key) {
            Some(entry) => !entry.is_expired(now),
            None => return false,
        };

        if !live {
            self.entries.remove_if(&key, |_, entry| entry.is_expired(now));
            trace!(client_id, nonce, "evicted expired nonce on read");
        }

        live
    }

    /// Record `nonce` for `client_id` for the next `ttl`.
    ///
    /// Returns `true` if this call claimed the nonce, or `false` if a live
    /// entry already exists. An expired entry is replaced.
    pub fn record(&self, client_id: &str, nonce: &str, ttl: TimeDelta) -> bool {
        let now = self.clock.now();
        let fresh = ReplayEntry {
            inserted_at: now,
            ttl,
        };

        match self.entries.entry(replay_key(client_id, nonce)) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired(now) {
                    occupied.insert(fresh);
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(fresh);
                true
            }
        }
    }

    /// Remove every expired entry and return how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    /// Number of physically stored entries, including expired ones not yet purged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entries are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ReplayGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ReplayGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplayGuard")
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

fn replay_key(client_id: &str, nonce: &str) -> ReplayKey {
    (client_id.to_owned(), nonce.to_owned())
}
