//! Container bookkeeping for the in-memory backend.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::api::{Container, ContainerConfig, ContainerFilter, ContainerState, ContainerStatus};
use crate::error::{GateError, Result};

/// A container as recorded by the in-memory backend.
#[derive(Debug, Clone)]
pub struct ContainerRecord {
    /// Unique container identifier.
    pub id: String,
    /// Parent sandbox identifier.
    pub pod_sandbox_id: String,
    /// Config the container was created with.
    pub config: ContainerConfig,
    /// Current state.
    pub state: ContainerState,
    /// Creation timestamp in nanoseconds.
    pub created_at: i64,
    /// Start timestamp in nanoseconds (0 if not started).
    pub started_at: i64,
    /// Finish timestamp in nanoseconds (0 if not finished).
    pub finished_at: i64,
    /// Exit code (0 if not exited).
    pub exit_code: i32,
}

impl ContainerRecord {
    fn image_ref(&self) -> String {
        self.config
            .image
            .as_ref()
            .map(|i| i.image.clone())
            .unwrap_or_default()
    }

    /// Full status view of this container.
    pub fn to_status(&self) -> ContainerStatus {
        ContainerStatus {
            id: self.id.clone(),
            metadata: self.config.metadata.clone(),
            state: self.state.into(),
            created_at: self.created_at,
            started_at: self.started_at,
            finished_at: self.finished_at,
            exit_code: self.exit_code,
            image: self.config.image.clone(),
            image_ref: self.image_ref(),
            reason: String::new(),
            message: String::new(),
            labels: self.config.labels.clone(),
            annotations: self.config.annotations.clone(),
            mounts: self.config.mounts.clone(),
        }
    }

    /// Summary view of this container, as returned by listing.
    pub fn to_summary(&self) -> Container {
        Container {
            id: self.id.clone(),
            pod_sandbox_id: self.pod_sandbox_id.clone(),
            metadata: self.config.metadata.clone(),
            image: self.config.image.clone(),
            image_ref: self.image_ref(),
            state: self.state.into(),
            created_at: self.created_at,
            labels: self.config.labels.clone(),
            annotations: self.config.annotations.clone(),
        }
    }

    /// Whether this container satisfies every criterion set in `filter`.
    pub fn matches(&self, filter: &ContainerFilter) -> bool {
        if !filter.id.is_empty() && self.id != filter.id {
            return false;
        }
        if !filter.pod_sandbox_id.is_empty() && self.pod_sandbox_id != filter.pod_sandbox_id {
            return false;
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

/// In-memory store for containers.
pub struct ContainerStore {
    containers: RwLock<HashMap<String, ContainerRecord>>,
}

impl ContainerStore {
    /// Create a new empty container store.
    pub fn new() -> Self {
        Self {
            containers: RwLock::new(HashMap::new()),
        }
    }

    /// Add a container to the store.
    pub async fn add(&self, container: ContainerRecord) {
        let mut store = self.containers.write().await;
        store.insert(container.id.clone(), container);
    }

    /// Get a container by ID.
    pub async fn get(&self, id: &str) -> Option<ContainerRecord> {
        let store = self.containers.read().await;
        store.get(id).cloned()
    }

    /// Remove a container by ID.
    pub async fn remove(&self, id: &str) -> Option<ContainerRecord> {
        let mut store = self.containers.write().await;
        store.remove(id)
    }

    /// List containers matching an optional filter.
    pub async fn list(&self, filter: Option<&ContainerFilter>) -> Vec<ContainerRecord> {
        let store = self.containers.read().await;
        store
            .values()
            .filter(|c| filter.map_or(true, |f| c.matches(f)))
            .cloned()
            .collect()
    }

    /// Move a created container to running.
    pub async fn mark_started(&self, id: &str, started_at: i64) -> Result<()> {
        let mut store = self.containers.write().await;
        let c = store
            .get_mut(id)
            .ok_or_else(|| GateError::NotFound(format!("container {} not found", id)))?;

        if c.state != ContainerState::ContainerCreated {
            return Err(GateError::FailedPrecondition(format!(
                "container {} is in state {}, expected {}",
                id,
                c.state.as_str_name(),
                ContainerState::ContainerCreated.as_str_name()
            )));
        }

        c.state = ContainerState::ContainerRunning;
        c.started_at = started_at;
        Ok(())
    }

    /// Update container timestamps and exit code when exited.
    ///
    /// Containers that already exited keep their original exit record.
    pub async fn mark_exited(&self, id: &str, finished_at: i64, exit_code: i32) -> bool {
        let mut store = self.containers.write().await;
        match store.get_mut(id) {
            Some(c) => {
                if c.state != ContainerState::ContainerExited {
                    c.state = ContainerState::ContainerExited;
                    c.finished_at = finished_at;
                    c.exit_code = exit_code;
                }
                true
            }
            None => false,
        }
    }

    /// Mark every live container of a sandbox as exited.
    pub async fn exit_by_sandbox(&self, sandbox_id: &str, finished_at: i64, exit_code: i32) {
        let mut store = self.containers.write().await;
        for c in store
            .values_mut()
            .filter(|c| c.pod_sandbox_id == sandbox_id)
            .filter(|c| c.state != ContainerState::ContainerExited)
        {
            c.state = ContainerState::ContainerExited;
            c.finished_at = finished_at;
            c.exit_code = exit_code;
        }
    }

    /// Remove all containers belonging to a sandbox.
    pub async fn remove_by_sandbox(&self, sandbox_id: &str) -> Vec<ContainerRecord> {
        let mut store = self.containers.write().await;
        let ids: Vec<String> = store
            .values()
            .filter(|c| c.pod_sandbox_id == sandbox_id)
            .map(|c| c.id.clone())
            .collect();

        ids.iter().filter_map(|id| store.remove(id)).collect()
    }
}

impl Default for ContainerStore {
    fn default() -> Self {
        Self::new()
    }
}
