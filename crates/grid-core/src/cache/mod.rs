// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Concurrent memoizing cache for remote resources.
//!
//! Each locator is fetched at most once for the lifetime of the cache. Both
//! outcomes are remembered: a successful payload is served from memory from
//! then on, and a failure marks the locator as permanently unavailable so a
//! dead URL never triggers another network round trip.
//!
//! The key map is only locked long enough to find or create a key's slot. The
//! fetch itself runs inside that slot's once-cell, so concurrent callers for
//! the same key wait for the one in-flight fetch while other keys proceed.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use log::{debug, info, warn};
use thiserror::Error;

/// Shared, immutable view of a cached payload.
pub type Payload = Arc<[u8]>;

/// Reasons a fetch can fail. Every one of them is treated as permanent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("invalid resource locator: {0}")]
    InvalidLocator(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP error: {0}")]
    Status(u16),

    #[error("empty payload")]
    EmptyPayload,
}

/// Something that can retrieve the bytes behind a locator.
///
/// Implementations are expected to block until the retrieval finishes.
pub trait Fetch {
    fn fetch(&self, locator: &str) -> Result<Vec<u8>, FetchError>;
}

/// Observable state of one cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryState {
    /// Never fetched, or a fetch is still in flight.
    Unresolved,
    Resolved(Payload),
    PermanentlyFailed,
}

type Slot = Arc<OnceLock<Option<Payload>>>;

/// Locator-keyed cache with positive and negative memoization.
///
/// Cloning is cheap and clones share the same entries.
#[derive(Clone, Default)]
pub struct ResourceCache {
    entries: Arc<RwLock<HashMap<String, Slot>>>,
}

impl std::fmt::Debug for ResourceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceCache")
            .field("entries", &self.len())
            .field("resolved", &self.resolved_count())
            .field("failed", &self.failed_count())
            .finish()
    }
}

impl ResourceCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the payload for `key`, calling `fetch` only if the key has never
    /// been attempted.
    ///
    /// Returns `None` when the key is permanently failed: the fetch errored,
    /// returned no bytes, or the key was blank.
    pub fn get<F>(&self, key: &str, fetch: F) -> Option<Payload>
    where
        F: FnOnce(&str) -> Result<Vec<u8>, FetchError>,
    {
        let slot = self.slot(key);

        if let Some(outcome) = slot.get() {
            return outcome.clone();
        }

        slot.get_or_init(|| resolve(key, fetch)).clone()
    }

    /// Same as [`get`](Self::get) with a [`Fetch`] implementation.
    pub fn get_with<T>(&self, key: &str, fetcher: &T) -> Option<Payload>
    where
        T: Fetch + ?Sized,
    {
        self.get(key, |locator| fetcher.fetch(locator))
    }

    /// Inspect a key without fetching it.
    #[must_use]
    pub fn entry_state(&self, key: &str) -> EntryState {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        match entries.get(key).and_then(|slot| slot.get()) {
            None => EntryState::Unresolved,
            Some(Some(payload)) => EntryState::Resolved(Arc::clone(payload)),
            Some(None) => EntryState::PermanentlyFailed,
        }
    }

    /// Number of keys that have been requested at least once.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn resolved_count(&self) -> usize {
        self.count_where(|outcome| outcome.is_some())
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count_where(Option::is_none)
    }

    fn count_where(&self, predicate: impl Fn(&Option<Payload>) -> bool) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter_map(|slot| slot.get())
            .filter(|outcome| predicate(outcome))
            .count()
    }

    /// Find the slot for `key`, creating it if this is the first request.
    fn slot(&self, key: &str) -> Slot {
        if let Some(slot) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
        {
            return Arc::clone(slot);
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(key.to_owned()).or_default())
    }
}

/// Run the single fetch for a key and turn it into the remembered outcome.
fn resolve<F>(key: &str, fetch: F) -> Option<Payload>
where
    F: FnOnce(&str) -> Result<Vec<u8>, FetchError>,
{
    if key.trim().is_empty() {
        warn!("Refusing to fetch blank resource locator; marking it unavailable");
        return None;
    }

    debug!("Fetching {}", key);
    let result = fetch(key).and_then(|bytes| {
        if bytes.is_empty() {
            Err(FetchError::EmptyPayload)
        } else {
            Ok(bytes)
        }
    });

    match result {
        Ok(bytes) => {
            info!("Cached {} bytes for {}", bytes.len(), key);
            Some(Payload::from(bytes))
        }
        Err(e) => {
            warn!("Failed to fetch {}: {} (will not retry)", key, e);
            None
        }
    }
}
