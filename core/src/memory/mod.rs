//! In-memory backend.
//!
//! Keeps sandbox, container and image records in process memory and runs
//! nothing. It lets the adapter be served and exercised end to end without
//! an execution engine.

mod container;
mod image;
mod sandbox;

pub use container::{ContainerRecord, ContainerStore};
pub use image::ImageStore;
pub use sandbox::{SandboxRecord, SandboxStore};

use async_trait::async_trait;

use crate::api::{
    AuthConfig, Container, ContainerConfig, ContainerFilter, ContainerState, ContainerStatus,
    Image, ImageFilter, ImageSpec, PodSandbox, PodSandboxConfig, PodSandboxFilter,
    PodSandboxState, PodSandboxStatus,
};
use crate::backend::{ImageBackend, RuntimeBackend, RuntimeVersion};
use crate::error::{GateError, Result};

/// Runtime name reported by the in-memory backend.
pub const MEMORY_RUNTIME_NAME: &str = "podgate-memory";

/// Exit code recorded for containers killed by a sandbox stop.
const SANDBOX_STOP_EXIT_CODE: i32 = 137;

fn now_ns() -> i64 {
    chrono::Utc::now().timestamp_nanos_opt().unwrap_or(0)
}

fn image_reference(image: Option<&ImageSpec>) -> Result<&str> {
    image
        .map(|spec| spec.image.as_str())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| GateError::InvalidArgument("image spec required".to_string()))
}

/// Bookkeeping-only implementation of both backend capabilities.
pub struct MemoryBackend {
    sandboxes: SandboxStore,
    containers: ContainerStore,
    images: ImageStore,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self {
            sandboxes: SandboxStore::new(),
            containers: ContainerStore::new(),
            images: ImageStore::new(),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RuntimeBackend for MemoryBackend {
    async fn version(&self) -> Result<RuntimeVersion> {
        Ok(RuntimeVersion {
            runtime_name: MEMORY_RUNTIME_NAME.to_string(),
            runtime_version: crate::VERSION.to_string(),
            runtime_api_version: "v1alpha1".to_string(),
        })
    }

    async fn create_pod_sandbox(&self, config: Option<PodSandboxConfig>) -> Result<String> {
        let config =
            config.ok_or_else(|| GateError::InvalidArgument("sandbox config required".into()))?;
        if config.metadata.is_none() {
            return Err(GateError::InvalidArgument(
                "sandbox metadata required".to_string(),
            ));
        }

        let id = uuid::Uuid::new_v4().to_string();
        tracing::info!(sandbox_id = %id, "Created pod sandbox");

        self.sandboxes
            .add(SandboxRecord {
                id: id.clone(),
                config,
                state: PodSandboxState::SandboxReady,
                created_at: now_ns(),
            })
            .await;
        Ok(id)
    }

    async fn stop_pod_sandbox(&self, pod_sandbox_id: &str) -> Result<()> {
        // Sandbox lock before container lock, held until the containers exit.
        let mut sandboxes = self.sandboxes.write().await;
        let sandbox = sandboxes.get_mut(pod_sandbox_id).ok_or_else(|| {
            GateError::NotFound(format!("pod sandbox {} not found", pod_sandbox_id))
        })?;
        sandbox.state = PodSandboxState::SandboxNotready;

        self.containers
            .exit_by_sandbox(pod_sandbox_id, now_ns(), SANDBOX_STOP_EXIT_CODE)
            .await;
        drop(sandboxes);

        tracing::info!(sandbox_id = %pod_sandbox_id, "Stopped pod sandbox");
        Ok(())
    }

    async fn delete_pod_sandbox(&self, pod_sandbox_id: &str) -> Result<()> {
        let mut sandboxes = self.sandboxes.write().await;
        let removed = self.containers.remove_by_sandbox(pod_sandbox_id).await;
        let existed = sandboxes.remove(pod_sandbox_id).is_some();
        drop(sandboxes);

        if existed {
            tracing::info!(
                sandbox_id = %pod_sandbox_id,
                containers = removed.len(),
                "Deleted pod sandbox"
            );
        }
        Ok(())
    }

    async fn pod_sandbox_status(&self, pod_sandbox_id: &str) -> Result<PodSandboxStatus> {
        self.sandboxes
            .get(pod_sandbox_id)
            .await
            .map(|sb| sb.to_status())
            .ok_or_else(|| GateError::NotFound(format!("pod sandbox {} not found", pod_sandbox_id)))
    }

    async fn list_pod_sandbox(&self, filter: Option<PodSandboxFilter>) -> Result<Vec<PodSandbox>> {
        Ok(self
            .sandboxes
            .list(filter.as_ref())
            .await
            .iter()
            .map(SandboxRecord::to_summary)
            .collect())
    }

    async fn create_container(
        &self,
        pod_sandbox_id: &str,
        config: Option<ContainerConfig>,
        _sandbox_config: Option<PodSandboxConfig>,
    ) -> Result<String> {
        // Held across the insert so a concurrent stop or delete of the
        // sandbox either sees this container or runs first.
        let sandboxes = self.sandboxes.read().await;
        let sandbox = sandboxes.get(pod_sandbox_id).ok_or_else(|| {
            GateError::NotFound(format!("pod sandbox {} not found", pod_sandbox_id))
        })?;
        if sandbox.state != PodSandboxState::SandboxReady {
            return Err(GateError::FailedPrecondition(format!(
                "pod sandbox {} is not ready",
                pod_sandbox_id
            )));
        }

        let config =
            config.ok_or_else(|| GateError::InvalidArgument("container config required".into()))?;
        if config.metadata.is_none() {
            return Err(GateError::InvalidArgument(
                "container metadata required".to_string(),
            ));
        }

        let id = uuid::Uuid::new_v4().to_string();
        tracing::info!(
            container_id = %id,
            sandbox_id = %pod_sandbox_id,
            "Created container"
        );

        self.containers
            .add(ContainerRecord {
                id: id.clone(),
                pod_sandbox_id: pod_sandbox_id.to_string(),
                config,
                state: ContainerState::ContainerCreated,
                created_at: now_ns(),
                started_at: 0,
                finished_at: 0,
                exit_code: 0,
            })
            .await;
        drop(sandboxes);
        Ok(id)
    }

    async fn start_container(&self, container_id: &str) -> Result<()> {
        self.containers.mark_started(container_id, now_ns()).await
    }

    async fn stop_container(&self, container_id: &str, timeout: i64) -> Result<()> {
        // Nothing runs, so the grace period is never waited out.
        tracing::debug!(container_id = %container_id, timeout, "Stopping container");
        if self.containers.mark_exited(container_id, now_ns(), 0).await {
            Ok(())
        } else {
            Err(GateError::NotFound(format!(
                "container {} not found",
                container_id
            )))
        }
    }

    async fn remove_container(&self, container_id: &str) -> Result<()> {
        self.containers.remove(container_id).await;
        Ok(())
    }

    async fn list_containers(&self, filter: Option<ContainerFilter>) -> Result<Vec<Container>> {
        Ok(self
            .containers
            .list(filter.as_ref())
            .await
            .iter()
            .map(ContainerRecord::to_summary)
            .collect())
    }

    async fn container_status(&self, container_id: &str) -> Result<ContainerStatus> {
        self.containers
            .get(container_id)
            .await
            .map(|c| c.to_status())
            .ok_or_else(|| GateError::NotFound(format!("container {} not found", container_id)))
    }
}

#[async_trait]
impl ImageBackend for MemoryBackend {
    async fn list_images(&self, filter: Option<ImageFilter>) -> Result<Vec<Image>> {
        let spec = filter.and_then(|f| f.image);
        Ok(self.images.list(spec.as_ref()).await)
    }

    async fn image_status(&self, image: Option<ImageSpec>) -> Result<Option<Image>> {
        let reference = image_reference(image.as_ref())?;
        Ok(self.images.get(reference).await)
    }

    async fn pull_image(&self, image: Option<ImageSpec>, auth: Option<AuthConfig>) -> Result<()> {
        let reference = image_reference(image.as_ref())?;
        let recorded = self.images.record(reference).await;
        tracing::info!(
            image = %reference,
            id = %recorded.id,
            authenticated = auth.is_some(),
            "Pulled image"
        );
        Ok(())
    }

    async fn remove_image(&self, image: Option<ImageSpec>) -> Result<()> {
        let reference = image_reference(image.as_ref())?;
        if self.images.remove(reference).await.is_some() {
            tracing::info!(image = %reference, "Removed image");
        }
        Ok(())
    }
}
