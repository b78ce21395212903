//! In-flight Registry
//!
//! Serializes provisioning per subdomain: at most one request for a given
//! label is in progress at a time. Requests for different labels never
//! contend.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Instant;

/// Tracks which labels currently have a provisioning request in flight.
#[derive(Clone, Default)]
pub struct InFlightRegistry {
    active: Arc<DashMap<String, Instant>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `key` as in flight.
    ///
    /// Returns `None` if another request already holds it. The marker is
    /// removed when the returned guard is dropped.
    pub fn try_acquire(&self, key: &str) -> Option<InFlightGuard> {
        match self.active.entry(key.to_string()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => {
                slot.insert(Instant::now());
                Some(InFlightGuard {
                    registry: self.clone(),
                    key: key.to_string(),
                })
            }
        }
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.active.contains_key(key)
    }

    /// Number of labels currently in flight.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

/// RAII guard for an in-flight label.
pub struct InFlightGuard {
    registry: InFlightRegistry,
    key: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Some((key, started)) = self.registry.active.remove(&self.key) {
            tracing::debug!("released {} after {:?}", key, started.elapsed());
        }
    }
}
