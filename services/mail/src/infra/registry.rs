//! In-process registry of outstanding email confirmation codes.
//!
//! Each email owns at most one entry. Every entry carries a generation stamp and
//! its own cleanup task; the task only removes the slot if the stamp still
//! matches when it fires, so a replaced or consumed entry's timer can never
//! delete a newer entry for the same address.
//!
//! Codes replaced by a newer issue are remembered on the slot so that
//! presenting one reports `NotFound` rather than `Mismatch`: the old code has
//! no live entry anymore.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use chrono::Utc;
use rand::RngExt;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::debug;

use crate::domain::types::{
    CONFIRMATION_CODE_CHARSET, CONFIRMATION_CODE_LEN, ConfirmOutcome, ConfirmationEntry,
    MAX_CONFIRMATION_TTL_SECS, normalize_code,
};

/// Caller errors detected before any lookup happens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("missing {0}")]
    MissingField(&'static str),
}

/// Generate a code from the upper-case base-36 alphabet.
///
/// `rand`'s thread RNG is a CSPRNG, but the code space is only 36^6 and
/// `validate` has no attempt limit, so codes are guessable by brute force.
fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CONFIRMATION_CODE_LEN)
        .map(|_| CONFIRMATION_CODE_CHARSET[rng.random_range(0..CONFIRMATION_CODE_CHARSET.len())] as char)
        .collect()
}

/// Replaced codes remembered per slot.
const MAX_RETIRED_CODES: usize = 8;

/// Memory of superseded codes is best effort: only the last
/// `MAX_RETIRED_CODES` replacements are kept, and the list starts over when the
/// replaced entry had already expired. An older superseded code therefore
/// reports `Mismatch` instead of `NotFound`; both are rejections.
struct Slot {
    entry: ConfirmationEntry,
    cleanup: AbortHandle,
    /// Codes this entry superseded, oldest first.
    retired: Vec<String>,
}

#[derive(Default)]
struct Inner {
    slots: Mutex<HashMap<String, Slot>>,
    next_generation: AtomicU64,
}

impl Inner {
    // No critical section can panic halfway through a map update, so a
    // poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Time-bounded map from normalized email to its single outstanding code.
///
/// Cheap to clone; clones share state. Must be used inside a Tokio runtime
/// because `issue` spawns the entry's cleanup task.
#[derive(Clone)]
pub struct ConfirmationRegistry {
    inner: Arc<Inner>,
    ttl: Duration,
}

impl ConfirmationRegistry {
    /// `ttl` is capped at one day so expiry arithmetic cannot overflow.
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Inner::default()),
            ttl: ttl.min(Duration::from_secs(MAX_CONFIRMATION_TTL_SECS)),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a fresh code for `email`, replacing any outstanding one.
    ///
    /// # Panics
    ///
    /// Panics if `email` is empty; callers reject blank addresses first.
    pub fn issue(&self, email: &str) -> String {
        assert!(!email.is_empty(), "confirmation code issued for an empty email");

        let code = generate_code();
        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let now = Instant::now();
        let expires_at = now + self.ttl;
        let entry = ConfirmationEntry {
            email: email.to_owned(),
            code: code.clone(),
            generation,
            created_at: Utc::now(),
            expires_at,
        };

        let mut slots = self.inner.lock();
        let retired = match slots.remove(email) {
            Some(previous) => {
                previous.cleanup.abort();
                if previous.entry.is_live(now) {
                    retire(previous)
                } else {
                    Vec::new()
                }
            }
            None => Vec::new(),
        };
        let replaced = !retired.is_empty();
        let cleanup = spawn_cleanup(
            Arc::downgrade(&self.inner),
            email.to_owned(),
            generation,
            expires_at,
        );
        slots.insert(
            email.to_owned(),
            Slot {
                entry,
                cleanup,
                retired,
            },
        );
        debug!(email, generation, replaced, "issued confirmation code");
        code
    }

    /// Check `submitted` against the live code for `email`, consuming it on match.
    pub fn validate(&self, email: &str, submitted: &str) -> Result<ConfirmOutcome, RegistryError> {
        if email.is_empty() {
            return Err(RegistryError::MissingField("email"));
        }
        let submitted = normalize_code(submitted);
        if submitted.is_empty() {
            return Err(RegistryError::MissingField("code"));
        }

        let now = Instant::now();
        let mut slots = self.inner.lock();
        let (live, matches, retired) = match slots.get(email) {
            None => return Ok(ConfirmOutcome::NotFound),
            Some(slot) => (
                slot.entry.is_live(now),
                slot.entry.code == submitted,
                slot.retired.contains(&submitted),
            ),
        };

        if !live {
            // Cleanup task has not run yet; behave as if it had.
            if let Some(stale) = slots.remove(email) {
                stale.cleanup.abort();
            }
            return Ok(ConfirmOutcome::NotFound);
        }
        if !matches {
            return Ok(if retired {
                ConfirmOutcome::NotFound
            } else {
                ConfirmOutcome::Mismatch
            });
        }
        if let Some(consumed) = slots.remove(email) {
            consumed.cleanup.abort();
        }
        debug!(email, "confirmation code consumed");
        Ok(ConfirmOutcome::Confirmed)
    }

    /// Number of entries still within their TTL.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.inner
            .lock()
            .values()
            .filter(|slot| slot.entry.is_live(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    fn stored_slots(&self) -> usize {
        self.inner.lock().len()
    }
}

fn retire(previous: Slot) -> Vec<String> {
    let mut retired = previous.retired;
    retired.push(previous.entry.code);
    if retired.len() > MAX_RETIRED_CODES {
        retired.drain(..retired.len() - MAX_RETIRED_CODES);
    }
    retired
}

fn spawn_cleanup(
    inner: Weak<Inner>,
    email: String,
    generation: u64,
    expires_at: Instant,
) -> AbortHandle {
    tokio::spawn(async move {
        tokio::time::sleep_until(expires_at).await;
        let Some(inner) = inner.upgrade() else {
            return;
        };
        let mut slots = inner.lock();
        if slots
            .get(&email)
            .is_some_and(|slot| slot.entry.generation == generation)
        {
            slots.remove(&email);
            debug!(email = %email, generation, "confirmation code expired");
        }
    })
    .abort_handle()
}
