//! Email verification core.
//!
//! A [`CodeStore`] holds at most one pending verification code per
//! identifier (email address). Codes are transient by design: nothing is
//! persisted, and a process restart silently invalidates all pending codes,
//! which is acceptable within the 10-minute issuance window.
//!
//! The store interface is injectable so the in-process [`MemoryCodeStore`]
//! can be replaced by a shared low-latency store (e.g., an external cache)
//! for multi-instance deployments without changing issuance or verification
//! call sites.

mod memory;
mod sweeper;

pub use memory::MemoryCodeStore;
pub use sweeper::{Sweeper, DEFAULT_SWEEP_INTERVAL};

use chrono::{DateTime, Utc};
use subtle::ConstantTimeEq;

/// A pending verification code for one identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationEntry {
    /// The 6-digit code, stored as a string to preserve leading zeros.
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

/// Transient keyed storage of one pending code per identifier.
///
/// `get` performs no expiry enforcement; callers check expiry themselves at
/// consumption time. The periodic [`Sweeper`] is memory reclamation only and
/// must never be relied on for correctness.
#[async_trait::async_trait]
pub trait CodeStore: Send + Sync {
    /// Unconditional upsert: a new issuance overwrites any prior entry for
    /// the same identifier, permanently invalidating the earlier code.
    async fn put(&self, identifier: &str, code: &str, expires_at: DateTime<Utc>);

    /// Pure lookup with no side effects.
    async fn get(&self, identifier: &str) -> Option<VerificationEntry>;

    /// Remove the entry; no-op if absent.
    async fn delete(&self, identifier: &str);

    /// Atomically remove the entry iff its stored code equals `code`.
    /// Returns `true` when this call removed the entry.
    ///
    /// This is the compare-and-delete that keeps successful consumption
    /// at-most-once when verification attempts race on a multi-threaded
    /// runtime.
    async fn take_if_matches(&self, identifier: &str, code: &str) -> bool;

    /// Atomically remove the entry iff its expiry is before `now`.
    /// Returns `true` when this call removed the entry.
    ///
    /// An unconditional `delete` after observing an expired entry could
    /// instead remove a fresh code a racing reissue just stored; this
    /// re-checks expiry under the same lock as the removal.
    async fn take_if_expired(&self, identifier: &str, now: DateTime<Utc>) -> bool;

    /// Delete every entry whose expiry has passed. Returns the number of
    /// entries removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> usize;
}

/// Outcome of a single verification attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerifyOutcome {
    Valid,
    Invalid,
}

impl VerifyOutcome {
    pub fn is_valid(self) -> bool {
        matches!(self, VerifyOutcome::Valid)
    }
}

/// Evaluate `claimed` against the pending code for `identifier`.
///
/// Terminal evaluations consume the entry: a match deletes it (so a second
/// correct attempt is invalid), and a detected expiry deletes it. A wrong
/// code does NOT consume the entry — the caller may retry against the same
/// still-valid code.
pub async fn verify_code(
    store: &dyn CodeStore,
    now: DateTime<Utc>,
    identifier: &str,
    claimed: &str,
) -> VerifyOutcome {
    let Some(entry) = store.get(identifier).await else {
        return VerifyOutcome::Invalid;
    };

    if entry.expires_at < now {
        store.take_if_expired(identifier, now).await;
        return VerifyOutcome::Invalid;
    }

    let matches: bool = entry.code.as_bytes().ct_eq(claimed.as_bytes()).into();
    if !matches {
        return VerifyOutcome::Invalid;
    }

    // Consume atomically; a racing attempt that got here first wins and
    // this one observes Invalid.
    if store.take_if_matches(identifier, claimed).await {
        VerifyOutcome::Valid
    } else {
        VerifyOutcome::Invalid
    }
}
