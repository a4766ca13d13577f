use crate::types::{CommunityId, UserId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Duration;

/// Key for a live mute: one per (community, target) pair.
pub type MuteKey = (CommunityId, UserId);

// ---------------------------------------------------------------------------
// MuteTimerStore
// ---------------------------------------------------------------------------

struct Entry {
    /// Identifies which scheduled task owns this entry. A firing task only
    /// runs its callback if the entry still carries its own token, so a
    /// replaced or cancelled timer can never fire.
    token: u64,
    expires_at: DateTime<Utc>,
    handle: JoinHandle<()>,
}

/// Keyed store of auto-expiry callbacks for active mutes.
///
/// Invariants:
/// - at most one live timer per key: `schedule` cancels and replaces any
///   existing entry;
/// - a firing timer removes its own entry (claim-by-token, under the store
///   lock) before running its callback;
/// - `cancel` racing a firing timer is safe: whichever side removes the
///   entry first wins, the callback runs at most once, and "already removed"
///   counts as a successful cancel.
///
/// Entries live for the process lifetime or until fired/cancelled; there is
/// deliberately no cross-restart persistence.
#[derive(Clone, Default)]
pub struct MuteTimerStore {
    inner: Arc<Mutex<HashMap<MuteKey, Entry>>>,
    next_token: Arc<AtomicU64>,
}

impl MuteTimerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) the auto-expiry timer for `key`.
    ///
    /// After `delay`, `on_fire` runs once — unless the entry was cancelled or
    /// replaced in the meantime. Must be called from within a tokio runtime.
    pub fn schedule<F>(&self, key: MuteKey, delay: Duration, on_fire: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        // Saturate oversized delays; a wrapping cast would record a past
        // expiry.
        let delta =
            chrono::Duration::milliseconds(i64::try_from(delay.as_millis()).unwrap_or(i64::MAX));
        let expires_at = Utc::now()
            .checked_add_signed(delta)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        let inner = Arc::clone(&self.inner);

        // Hold the lock across replace + spawn + insert so that even a
        // zero-delay timer cannot attempt its claim before the entry exists.
        let mut map = self.inner.lock().expect("mute timer store lock poisoned");
        if let Some(old) = map.remove(&key) {
            old.handle.abort();
        }
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let claimed = {
                let mut map = inner.lock().expect("mute timer store lock poisoned");
                match map.get(&key) {
                    Some(entry) if entry.token == token => {
                        map.remove(&key);
                        true
                    }
                    _ => false,
                }
            };
            if claimed {
                on_fire.await;
            }
        });
        map.insert(
            key,
            Entry {
                token,
                expires_at,
                handle,
            },
        );
    }

    /// Cancel and remove the timer for `key`. No-op if absent.
    pub fn cancel(&self, key: &MuteKey) {
        let removed = self
            .inner
            .lock()
            .expect("mute timer store lock poisoned")
            .remove(key);
        if let Some(entry) = removed {
            entry.handle.abort();
        }
    }

    /// Whether a live timer exists for `key`.
    pub fn contains(&self, key: &MuteKey) -> bool {
        self.inner
            .lock()
            .expect("mute timer store lock poisoned")
            .contains_key(key)
    }

    /// Expiry instant of the live timer for `key`, if any.
    pub fn expiry(&self, key: &MuteKey) -> Option<DateTime<Utc>> {
        self.inner
            .lock()
            .expect("mute timer store lock poisoned")
            .get(key)
            .map(|e| e.expires_at)
    }

    /// Number of live timers.
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .expect("mute timer store lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
