//! CRI RuntimeService dispatch.
//!
//! Each RPC logs the request, makes exactly one `RuntimeBackend` call and
//! wraps the result. Backend errors are logged and returned as-is.

use std::pin::Pin;

use tokio_stream::Stream;
use tonic::{Request, Response, Status, Streaming};

use podgate_core::api::runtime_service_server::RuntimeService;
use podgate_core::api::*;
use podgate_core::{GateError, RUNTIME_API_VERSION};

use crate::error::{backend_failure, gate_error_to_status};
use crate::manager::CriManager;

#[tonic::async_trait]
impl RuntimeService for CriManager {
    // ── Version ──────────────────────────────────────────────────────

    async fn version(
        &self,
        request: Request<VersionRequest>,
    ) -> Result<Response<VersionResponse>, Status> {
        let req = request.into_inner();
        tracing::debug!(request = ?req, "CRI Version");

        // The kubelet's requested version is not negotiated.
        let runtime = self
            .runtime
            .version()
            .await
            .map_err(|e| backend_failure("Version", e))?;

        Ok(Response::new(VersionResponse {
            version: RUNTIME_API_VERSION.to_string(),
            runtime_name: runtime.runtime_name,
            runtime_version: runtime.runtime_version,
            runtime_api_version: runtime.runtime_api_version,
        }))
    }

    // ── Pod Sandbox ──────────────────────────────────────────────────

    async fn create_pod_sandbox(
        &self,
        request: Request<CreatePodSandboxRequest>,
    ) -> Result<Response<CreatePodSandboxResponse>, Status> {
        let req = request.into_inner();
        tracing::debug!(request = ?req, "CRI CreatePodSandbox");

        let pod_sandbox_id = self
            .runtime
            .create_pod_sandbox(req.config)
            .await
            .map_err(|e| backend_failure("CreatePodSandbox", e))?;

        Ok(Response::new(CreatePodSandboxResponse { pod_sandbox_id }))
    }

    async fn stop_pod_sandbox(
        &self,
        request: Request<StopPodSandboxRequest>,
    ) -> Result<Response<StopPodSandboxResponse>, Status> {
        let req = request.into_inner();
        tracing::debug!(request = ?req, "CRI StopPodSandbox");

        self.runtime
            .stop_pod_sandbox(&req.pod_sandbox_id)
            .await
            .map_err(|e| backend_failure("StopPodSandbox", e))?;

        Ok(Response::new(StopPodSandboxResponse {}))
    }

    async fn delete_pod_sandbox(
        &self,
        request: Request<DeletePodSandboxRequest>,
    ) -> Result<Response<DeletePodSandboxResponse>, Status> {
        let req = request.into_inner();
        tracing::debug!(request = ?req, "CRI DeletePodSandbox");

        self.runtime
            .delete_pod_sandbox(&req.pod_sandbox_id)
            .await
            .map_err(|e| backend_failure("DeletePodSandbox", e))?;

        Ok(Response::new(DeletePodSandboxResponse {}))
    }

    async fn pod_sandbox_status(
        &self,
        request: Request<PodSandboxStatusRequest>,
    ) -> Result<Response<PodSandboxStatusResponse>, Status> {
        let req = request.into_inner();
        tracing::debug!(request = ?req, "CRI PodSandboxStatus");

        let status = self
            .runtime
            .pod_sandbox_status(&req.pod_sandbox_id)
            .await
            .map_err(|e| backend_failure("PodSandboxStatus", e))?;

        Ok(Response::new(PodSandboxStatusResponse {
            status: Some(status),
        }))
    }

    async fn list_pod_sandbox(
        &self,
        request: Request<ListPodSandboxRequest>,
    ) -> Result<Response<ListPodSandboxResponse>, Status> {
        let req = request.into_inner();
        tracing::debug!(request = ?req, "CRI ListPodSandbox");

        let items = self
            .runtime
            .list_pod_sandbox(req.filter)
            .await
            .map_err(|e| backend_failure("ListPodSandbox", e))?;

        Ok(Response::new(ListPodSandboxResponse { items }))
    }

    // ── Container ────────────────────────────────────────────────────

    async fn create_container(
        &self,
        request: Request<CreateContainerRequest>,
    ) -> Result<Response<CreateContainerResponse>, Status> {
        let req = request.into_inner();
        tracing::debug!(request = ?req, "CRI CreateContainer");

        let container_id = self
            .runtime
            .create_container(&req.pod_sandbox_id, req.config, req.sandbox_config)
            .await
            .map_err(|e| backend_failure("CreateContainer", e))?;

        Ok(Response::new(CreateContainerResponse { container_id }))
    }

    async fn start_container(
        &self,
        request: Request<StartContainerRequest>,
    ) -> Result<Response<StartContainerResponse>, Status> {
        let req = request.into_inner();
        tracing::debug!(request = ?req, "CRI StartContainer");

        self.runtime
            .start_container(&req.container_id)
            .await
            .map_err(|e| backend_failure("StartContainer", e))?;

        Ok(Response::new(StartContainerResponse {}))
    }

    async fn stop_container(
        &self,
        request: Request<StopContainerRequest>,
    ) -> Result<Response<StopContainerResponse>, Status> {
        let req = request.into_inner();
        tracing::debug!(request = ?req, "CRI StopContainer");

        self.runtime
            .stop_container(&req.container_id, req.timeout)
            .await
            .map_err(|e| backend_failure("StopContainer", e))?;

        Ok(Response::new(StopContainerResponse {}))
    }

    async fn remove_container(
        &self,
        request: Request<RemoveContainerRequest>,
    ) -> Result<Response<RemoveContainerResponse>, Status> {
        let req = request.into_inner();
        tracing::debug!(request = ?req, "CRI RemoveContainer");

        self.runtime
            .remove_container(&req.container_id)
            .await
            .map_err(|e| backend_failure("RemoveContainer", e))?;

        Ok(Response::new(RemoveContainerResponse {}))
    }

    async fn list_containers(
        &self,
        request: Request<ListContainersRequest>,
    ) -> Result<Response<ListContainersResponse>, Status> {
        let req = request.into_inner();
        tracing::debug!(request = ?req, "CRI ListContainers");

        let containers = self
            .runtime
            .list_containers(req.filter)
            .await
            .map_err(|e| backend_failure("ListContainers", e))?;

        Ok(Response::new(ListContainersResponse { containers }))
    }

    async fn container_status(
        &self,
        request: Request<ContainerStatusRequest>,
    ) -> Result<Response<ContainerStatusResponse>, Status> {
        let req = request.into_inner();
        tracing::debug!(request = ?req, "CRI ContainerStatus");

        let status = self
            .runtime
            .container_status(&req.container_id)
            .await
            .map_err(|e| backend_failure("ContainerStatus", e))?;

        Ok(Response::new(ContainerStatusResponse {
            status: Some(status),
        }))
    }

    // ── Exec ─────────────────────────────────────────────────────────

    type ExecStream = Pin<Box<dyn Stream<Item = Result<ExecResponse, Status>> + Send + 'static>>;

    async fn exec(
        &self,
        _request: Request<Streaming<ExecRequest>>,
    ) -> Result<Response<Self::ExecStream>, Status> {
        tracing::debug!("CRI Exec");
        Err(gate_error_to_status(GateError::Unsupported {
            operation: "Exec",
        }))
    }
}
