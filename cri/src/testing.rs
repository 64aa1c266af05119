//! Backend double for dispatch tests.

use std::sync::Mutex;

use async_trait::async_trait;

use podgate_core::api::{
    AuthConfig, Container, ContainerConfig, ContainerFilter, ContainerStatus, Image, ImageFilter,
    ImageSpec, PodSandbox, PodSandboxConfig, PodSandboxFilter, PodSandboxStatus,
};
use podgate_core::{GateError, ImageBackend, Result, RuntimeBackend, RuntimeVersion};

/// One recorded backend invocation: operation name and debug-formatted args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Call {
    pub op: &'static str,
    pub args: String,
}

/// Records every call and answers with canned values, or fails every call
/// with the configured message.
#[derive(Default)]
pub(crate) struct StubBackend {
    calls: Mutex<Vec<Call>>,
    failure: Option<String>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: Some(message.to_string()),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record<T>(&self, op: &'static str, args: String, value: T) -> Result<T> {
        self.calls.lock().unwrap().push(Call { op, args });
        match &self.failure {
            Some(message) => Err(GateError::Backend(message.clone())),
            None => Ok(value),
        }
    }
}

pub(crate) fn stub_image() -> Image {
    Image {
        id: "sha256:abc".to_string(),
        repo_tags: vec!["busybox:latest".to_string()],
        repo_digests: vec![],
        size: 1024,
        uid: None,
        username: "root".to_string(),
    }
}

#[async_trait]
impl RuntimeBackend for StubBackend {
    async fn version(&self) -> Result<RuntimeVersion> {
        self.record(
            "version",
            String::new(),
            RuntimeVersion {
                runtime_name: "stub".to_string(),
                runtime_version: "9.9.9".to_string(),
                runtime_api_version: "v9".to_string(),
            },
        )
    }

    async fn create_pod_sandbox(&self, config: Option<PodSandboxConfig>) -> Result<String> {
        self.record("create_pod_sandbox", format!("{:?}", config), "sbx-1".to_string())
    }

    async fn stop_pod_sandbox(&self, pod_sandbox_id: &str) -> Result<()> {
        self.record("stop_pod_sandbox", pod_sandbox_id.to_string(), ())
    }

    async fn delete_pod_sandbox(&self, pod_sandbox_id: &str) -> Result<()> {
        self.record("delete_pod_sandbox", pod_sandbox_id.to_string(), ())
    }

    async fn pod_sandbox_status(&self, pod_sandbox_id: &str) -> Result<PodSandboxStatus> {
        let status = PodSandboxStatus {
            id: pod_sandbox_id.to_string(),
            created_at: 42,
            ..Default::default()
        };
        self.record("pod_sandbox_status", pod_sandbox_id.to_string(), status)
    }

    async fn list_pod_sandbox(&self, filter: Option<PodSandboxFilter>) -> Result<Vec<PodSandbox>> {
        let items = vec![
            PodSandbox {
                id: "sbx-1".to_string(),
                ..Default::default()
            },
            PodSandbox {
                id: "sbx-2".to_string(),
                ..Default::default()
            },
        ];
        self.record("list_pod_sandbox", format!("{:?}", filter), items)
    }

    async fn create_container(
        &self,
        pod_sandbox_id: &str,
        config: Option<ContainerConfig>,
        sandbox_config: Option<PodSandboxConfig>,
    ) -> Result<String> {
        self.record(
            "create_container",
            format!("{} {:?} {:?}", pod_sandbox_id, config, sandbox_config),
            "c-1".to_string(),
        )
    }

    async fn start_container(&self, container_id: &str) -> Result<()> {
        self.record("start_container", container_id.to_string(), ())
    }

    async fn stop_container(&self, container_id: &str, timeout: i64) -> Result<()> {
        self.record("stop_container", format!("{} {}", container_id, timeout), ())
    }

    async fn remove_container(&self, container_id: &str) -> Result<()> {
        self.record("remove_container", container_id.to_string(), ())
    }

    async fn list_containers(&self, filter: Option<ContainerFilter>) -> Result<Vec<Container>> {
        let containers = vec![Container {
            id: "c-1".to_string(),
            pod_sandbox_id: "sbx-1".to_string(),
            ..Default::default()
        }];
        self.record("list_containers", format!("{:?}", filter), containers)
    }

    async fn container_status(&self, container_id: &str) -> Result<ContainerStatus> {
        let status = ContainerStatus {
            id: container_id.to_string(),
            exit_code: 3,
            ..Default::default()
        };
        self.record("container_status", container_id.to_string(), status)
    }
}

#[async_trait]
impl ImageBackend for StubBackend {
    async fn list_images(&self, filter: Option<ImageFilter>) -> Result<Vec<Image>> {
        self.record("list_images", format!("{:?}", filter), vec![stub_image()])
    }

    async fn image_status(&self, image: Option<ImageSpec>) -> Result<Option<Image>> {
        self.record("image_status", format!("{:?}", image), Some(stub_image()))
    }

    async fn pull_image(&self, image: Option<ImageSpec>, auth: Option<AuthConfig>) -> Result<()> {
        self.record("pull_image", format!("{:?} {:?}", image, auth), ())
    }

    async fn remove_image(&self, image: Option<ImageSpec>) -> Result<()> {
        self.record("remove_image", format!("{:?}", image), ())
    }
}
