//! In-process code store backed by a concurrent map.
//!
//! Entries are only visible within a single process. If you run multiple
//! server replicas, back [`CodeStore`] with a shared cache instead.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use subtle::ConstantTimeEq;

use crate::{CodeStore, VerificationEntry};

/// In-memory [`CodeStore`] keyed by identifier.
#[derive(Default)]
pub struct MemoryCodeStore {
    entries: DashMap<String, VerificationEntry>,
}

impl MemoryCodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pending entries (expired ones included until swept).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait::async_trait]
impl CodeStore for MemoryCodeStore {
    async fn put(&self, identifier: &str, code: &str, expires_at: DateTime<Utc>) {
        self.entries.insert(
            identifier.to_string(),
            VerificationEntry {
                code: code.to_string(),
                expires_at,
            },
        );
    }

    async fn get(&self, identifier: &str) -> Option<VerificationEntry> {
        self.entries.get(identifier).map(|e| e.clone())
    }

    async fn delete(&self, identifier: &str) {
        self.entries.remove(identifier);
    }

    async fn take_if_matches(&self, identifier: &str, code: &str) -> bool {
        // remove_if holds the shard lock across the comparison, so two
        // racing consumers cannot both observe a removal.
        self.entries
            .remove_if(identifier, |_, entry| {
                entry.code.as_bytes().ct_eq(code.as_bytes()).into()
            })
            .is_some()
    }

    async fn take_if_expired(&self, identifier: &str, now: DateTime<Utc>) -> bool {
        // Same shard-lock discipline as take_if_matches: the expiry
        // re-check and the removal are one atomic step, so a reissue
        // racing this call either lands before it (and survives, being
        // fresh) or after it.
        self.entries
            .remove_if(identifier, |_, entry| entry.expires_at < now)
            .is_some()
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at >= now);
        before - self.entries.len()
    }
}
