//! Fragment storage
//!
//! The store is the only shared mutable resource in the engine. Fragments
//! are keyed by `(subject, fragment id)`, where the fragment id already
//! carries the publisher's instance prefix, so re-publishes from the same
//! source replace their earlier fragment while fragments from different
//! sources coexist. Each mutation and the version bump are atomic per
//! subject.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::types::DialogFragment;

/// Storage collaborator consumed by the engine.
///
/// `replace` must behave as delete-then-insert observed as one operation:
/// a concurrent reader sees either the old fragment or the new one, never
/// neither. `get_and_increment_version` must likewise be an atomic
/// read-then-bump so two notifications never share a version number.
#[async_trait]
pub trait FragmentStore: Send + Sync {
    /// Remove the fragment with this id, if present. Succeeds when absent.
    async fn delete(&self, subject: &str, fragment_id: &str);

    /// Store a fragment with an expiration.
    async fn insert(&self, subject: &str, fragment: DialogFragment, ttl: Duration);

    /// Atomically remove any earlier fragment with the same id and store
    /// the new one.
    async fn replace(&self, subject: &str, fragment: DialogFragment, ttl: Duration);

    /// All live fragments for a subject, in insertion order.
    async fn fetch_all(&self, subject: &str) -> Vec<DialogFragment>;

    /// Current version counter for a subject, bumping it by one for the
    /// next call. Starts at 1 for a subject never seen before.
    async fn get_and_increment_version(&self, subject: &str) -> u64;
}

struct StoredFragment {
    fragment: DialogFragment,
    expires: DateTime<Utc>,
}

struct SubjectState {
    fragments: Vec<StoredFragment>,
    next_version: u64,
}

impl Default for SubjectState {
    fn default() -> Self {
        SubjectState {
            fragments: Vec::new(),
            next_version: 1,
        }
    }
}

/// In-memory fragment store.
///
/// Per-subject state sits behind a `DashMap` entry, so every trait
/// operation holds that subject's lock for its full duration. Expired
/// fragments are filtered on fetch and reclaimable with an explicit sweep;
/// version counters survive fragment expiry for as long as the process
/// lives.
pub struct MemoryFragmentStore {
    subjects: DashMap<String, SubjectState>,
}

impl MemoryFragmentStore {
    pub fn new() -> Self {
        MemoryFragmentStore {
            subjects: DashMap::new(),
        }
    }

    /// Drop every expired fragment, returning how many were removed.
    pub fn expire_fragments(&self) -> usize {
        let now = Utc::now();
        let mut removed = 0;
        for mut entry in self.subjects.iter_mut() {
            let before = entry.fragments.len();
            entry.fragments.retain(|stored| stored.expires > now);
            removed += before - entry.fragments.len();
        }
        removed
    }

    fn expiry(ttl: Duration) -> DateTime<Utc> {
        // clamp to chrono's representable range
        let secs = ttl.as_secs().min((i64::MAX / 1000) as u64) as i64;
        Utc::now()
            .checked_add_signed(chrono::Duration::seconds(secs))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

#[async_trait]
impl FragmentStore for MemoryFragmentStore {
    async fn delete(&self, subject: &str, fragment_id: &str) {
        if let Some(mut state) = self.subjects.get_mut(subject) {
            state
                .fragments
                .retain(|stored| stored.fragment.id != fragment_id);
        }
    }

    async fn insert(&self, subject: &str, fragment: DialogFragment, ttl: Duration) {
        self.subjects
            .entry(subject.to_string())
            .or_default()
            .fragments
            .push(StoredFragment {
                fragment,
                expires: Self::expiry(ttl),
            });
    }

    async fn replace(&self, subject: &str, fragment: DialogFragment, ttl: Duration) {
        let mut state = self.subjects.entry(subject.to_string()).or_default();
        state
            .fragments
            .retain(|stored| stored.fragment.id != fragment.id);
        state.fragments.push(StoredFragment {
            fragment,
            expires: Self::expiry(ttl),
        });
    }

    async fn fetch_all(&self, subject: &str) -> Vec<DialogFragment> {
        let now = Utc::now();
        self.subjects
            .get(subject)
            .map(|state| {
                state
                    .fragments
                    .iter()
                    .filter(|stored| stored.expires > now)
                    .map(|stored| stored.fragment.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn get_and_increment_version(&self, subject: &str) -> u64 {
        let mut state = self.subjects.entry(subject.to_string()).or_default();
        let version = state.next_version;
        state.next_version += 1;
        version
    }
}
