//! TTL cache for project records.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use accesstime::chain::ChainId;
use accesstime::types::ProjectDetails;
use alloy_primitives::U256;
use tokio::sync::RwLock;

/// Cache key: chain and AccessTime id.
pub type ProjectKey = (ChainId, U256);

#[derive(Clone, Debug)]
struct CacheEntry {
    project: ProjectDetails,
    expires_at: Instant,
}

/// Project records cached per `(chain, id)` with a fixed TTL.
///
/// A zero TTL disables caching.
#[derive(Debug)]
pub struct ProjectCache {
    ttl: Duration,
    entries: RwLock<HashMap<ProjectKey, CacheEntry>>,
}

impl ProjectCache {
    /// Creates an empty cache with the given TTL.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The configured TTL.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached record if present and not expired.
    pub async fn get(&self, key: &ProjectKey) -> Option<ProjectDetails> {
        let guard = self.entries.read().await;
        let entry = guard.get(key)?;
        if Instant::now() < entry.expires_at {
            Some(entry.project.clone())
        } else {
            None
        }
    }

    /// Stores a record with the configured TTL.
    pub async fn set(&self, key: ProjectKey, project: ProjectDetails) {
        if self.ttl.is_zero() {
            return;
        }
        let mut guard = self.entries.write().await;
        guard.insert(
            key,
            CacheEntry {
                project,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Drops the record for one project.
    pub async fn invalidate(&self, key: &ProjectKey) {
        self.entries.write().await.remove(key);
    }

    /// Drops every record.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
