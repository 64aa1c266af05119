//! Capability contracts a sandbox/container engine implements.
//!
//! The CRI adapter depends only on these traits; the engine is injected as
//! `Arc<dyn RuntimeBackend>` / `Arc<dyn ImageBackend>`. Implementations are
//! called concurrently, including for the same sandbox or container id, and
//! must do their own synchronization.
//!
//! Request sub-messages are handed over exactly as they arrived on the wire,
//! so an absent config or filter shows up here as `None`.

use async_trait::async_trait;

use crate::api::{
    AuthConfig, Container, ContainerConfig, ContainerFilter, ContainerStatus, Image, ImageFilter,
    ImageSpec, PodSandbox, PodSandboxConfig, PodSandboxFilter, PodSandboxStatus,
};
use crate::error::Result;

/// Identity reported by a runtime backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeVersion {
    /// Name of the container runtime.
    pub runtime_name: String,
    /// Version of the container runtime.
    pub runtime_version: String,
    /// API version of the container runtime.
    pub runtime_api_version: String,
}

/// Pod sandbox and container lifecycle.
#[async_trait]
pub trait RuntimeBackend: Send + Sync {
    /// Report the runtime name, version and API version.
    async fn version(&self) -> Result<RuntimeVersion>;

    /// Create a pod sandbox and return its id.
    async fn create_pod_sandbox(&self, config: Option<PodSandboxConfig>) -> Result<String>;

    /// Stop a pod sandbox. Whether stopping twice is an error is up to the
    /// backend.
    async fn stop_pod_sandbox(&self, pod_sandbox_id: &str) -> Result<()>;

    async fn delete_pod_sandbox(&self, pod_sandbox_id: &str) -> Result<()>;

    async fn pod_sandbox_status(&self, pod_sandbox_id: &str) -> Result<PodSandboxStatus>;

    async fn list_pod_sandbox(&self, filter: Option<PodSandboxFilter>) -> Result<Vec<PodSandbox>>;

    /// Create a container inside `pod_sandbox_id`.
    ///
    /// `sandbox_config` is the config the sandbox was created with, for
    /// backends that need it (e.g. for shared namespaces).
    async fn create_container(
        &self,
        pod_sandbox_id: &str,
        config: Option<ContainerConfig>,
        sandbox_config: Option<PodSandboxConfig>,
    ) -> Result<String>;

    async fn start_container(&self, container_id: &str) -> Result<()>;

    /// Stop a container, giving it `timeout` seconds to exit.
    async fn stop_container(&self, container_id: &str, timeout: i64) -> Result<()>;

    async fn remove_container(&self, container_id: &str) -> Result<()>;

    async fn list_containers(&self, filter: Option<ContainerFilter>) -> Result<Vec<Container>>;

    async fn container_status(&self, container_id: &str) -> Result<ContainerStatus>;
}

/// Image management.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    async fn list_images(&self, filter: Option<ImageFilter>) -> Result<Vec<Image>>;

    /// Look up an image. `Ok(None)` means the image is not present.
    async fn image_status(&self, image: Option<ImageSpec>) -> Result<Option<Image>>;

    async fn pull_image(&self, image: Option<ImageSpec>, auth: Option<AuthConfig>) -> Result<()>;

    async fn remove_image(&self, image: Option<ImageSpec>) -> Result<()>;
}
