//! Pod sandbox bookkeeping for the in-memory backend.

use std::collections::HashMap;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::api::{
    PodSandbox, PodSandboxConfig, PodSandboxFilter, PodSandboxNetworkStatus, PodSandboxState,
    PodSandboxStatus,
};

/// A pod sandbox as recorded by the in-memory backend.
#[derive(Debug, Clone)]
pub struct SandboxRecord {
    /// Unique sandbox identifier.
    pub id: String,
    /// Config the sandbox was created with.
    pub config: PodSandboxConfig,
    /// Current state.
    pub state: PodSandboxState,
    /// Creation timestamp in nanoseconds.
    pub created_at: i64,
}

impl SandboxRecord {
    /// Full status view of this sandbox.
    pub fn to_status(&self) -> PodSandboxStatus {
        PodSandboxStatus {
            id: self.id.clone(),
            metadata: self.config.metadata.clone(),
            state: self.state.into(),
            created_at: self.created_at,
            network: Some(PodSandboxNetworkStatus { ip: String::new() }),
            linux: None,
            labels: self.config.labels.clone(),
            annotations: self.config.annotations.clone(),
        }
    }

    /// Summary view of this sandbox, as returned by listing.
    pub fn to_summary(&self) -> PodSandbox {
        PodSandbox {
            id: self.id.clone(),
            metadata: self.config.metadata.clone(),
            state: self.state.into(),
            created_at: self.created_at,
            labels: self.config.labels.clone(),
            annotations: self.config.annotations.clone(),
        }
    }

    /// Whether this sandbox satisfies every criterion set in `filter`.
    pub fn matches(&self, filter: &PodSandboxFilter) -> bool {
        if !filter.id.is_empty() && self.id != filter.id {
            return false;
        }
        if !filter.name.is_empty() {
            let name = self.config.metadata.as_ref().map(|m| m.name.as_str());
            if name != Some(filter.name.as_str()) {
                return false;
            }
        }
        if let Some(ref state) = filter.state {
            if state.state != self.state as i32 {
                return false;
            }
        }
        filter
            .label_selector
            .iter()
            .all(|(k, v)| self.config.labels.get(k) == Some(v))
    }
}

/// In-memory store for pod sandboxes.
pub struct SandboxStore {
    sandboxes: RwLock<HashMap<String, SandboxRecord>>,
}

impl SandboxStore {
    /// Create a new empty sandbox store.
    pub fn new() -> Self {
        Self {
            sandboxes: RwLock::new(HashMap::new()),
        }
    }

    /// Lock the store for reading.
    ///
    /// Callers that also touch the container store take this lock first.
    pub async fn read(&self) -> RwLockReadGuard<'_, HashMap<String, SandboxRecord>> {
        self.sandboxes.read().await
    }

    /// Lock the store for writing. Same ordering rule as [`SandboxStore::read`].
    pub async fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, SandboxRecord>> {
        self.sandboxes.write().await
    }

    /// Add a sandbox to the store.
    pub async fn add(&self, sandbox: SandboxRecord) {
        let mut store = self.sandboxes.write().await;
        store.insert(sandbox.id.clone(), sandbox);
    }

    /// Get a sandbox by ID.
    pub async fn get(&self, id: &str) -> Option<SandboxRecord> {
        let store = self.sandboxes.read().await;
        store.get(id).cloned()
    }

    /// Remove a sandbox by ID.
    pub async fn remove(&self, id: &str) -> Option<SandboxRecord> {
        let mut store = self.sandboxes.write().await;
        store.remove(id)
    }

    /// List sandboxes matching an optional filter.
    pub async fn list(&self, filter: Option<&PodSandboxFilter>) -> Vec<SandboxRecord> {
        let store = self.sandboxes.read().await;
        store
            .values()
            .filter(|sb| filter.map_or(true, |f| sb.matches(f)))
            .cloned()
            .collect()
    }

    /// Update the state of a sandbox.
    pub async fn update_state(&self, id: &str, state: PodSandboxState) -> bool {
        let mut store = self.sandboxes.write().await;
        if let Some(sb) = store.get_mut(id) {
            sb.state = state;
            true
        } else {
            false
        }
    }
}

impl Default for SandboxStore {
    fn default() -> Self {
        Self::new()
    }
}
