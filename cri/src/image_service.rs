//! CRI ImageService dispatch.

use tonic::{Request, Response, Status};

use podgate_core::api::image_service_server::ImageService;
use podgate_core::api::*;

use crate::error::{backend_failure, gate_error_to_status};
use crate::manager::CriManager;

#[tonic::async_trait]
impl ImageService for CriManager {
    async fn list_images(
        &self,
        request: Request<ListImagesRequest>,
    ) -> Result<Response<ListImagesResponse>, Status> {
        let req = request.into_inner();
        tracing::debug!(request = ?req, "CRI ListImages");

        let images = self
            .image
            .list_images(req.filter)
            .await
            .map_err(|e| backend_failure("ListImages", e))?;

        Ok(Response::new(ListImagesResponse { images }))
    }

    async fn image_status(
        &self,
        request: Request<ImageStatusRequest>,
    ) -> Result<Response<ImageStatusResponse>, Status> {
        let req = request.into_inner();
        tracing::debug!(request = ?req, "CRI ImageStatus");

        // Kubelet probes for images it expects to be missing, so a failure
        // here is routine.
        let image = self.image.image_status(req.image).await.map_err(|e| {
            tracing::info!(error = %e, "ImageStatus from backend failed");
            gate_error_to_status(e)
        })?;

        Ok(Response::new(ImageStatusResponse { image }))
    }

    async fn pull_image(
        &self,
        request: Request<PullImageRequest>,
    ) -> Result<Response<PullImageResponse>, Status> {
        let req = request.into_inner();
        tracing::debug!(image = ?req.image, has_auth = req.auth.is_some(), "CRI PullImage");

        self.image
            .pull_image(req.image, req.auth)
            .await
            .map_err(|e| backend_failure("PullImage", e))?;

        Ok(Response::new(PullImageResponse {}))
    }

    async fn remove_image(
        &self,
        request: Request<RemoveImageRequest>,
    ) -> Result<Response<RemoveImageResponse>, Status> {
        let req = request.into_inner();
        tracing::debug!(request = ?req, "CRI RemoveImage");

        self.image
            .remove_image(req.image)
            .await
            .map_err(|e| backend_failure("RemoveImage", e))?;

        Ok(Response::new(RemoveImageResponse {}))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{stub_image, StubBackend};

    fn manager(backend: Arc<StubBackend>) -> CriManager {
        CriManager::new(backend.clone(), backend)
    }

    fn busybox() -> Option<ImageSpec> {
        Some(ImageSpec {
            image: "busybox:latest".to_string(),
        })
    }

    #[tokio::test]
    async fn test_list_images_relays_backend_list() {
        let backend = Arc::new(StubBackend::new());
        let filter = ImageFilter { image: busybox() };
        let resp = manager(backend.clone())
            .list_images(Request::new(ListImagesRequest {
                filter: Some(filter.clone()),
            }))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(resp.images, vec![stub_image()]);
        assert_eq!(backend.calls()[0].args, format!("{:?}", Some(filter)));
    }

    #[tokio::test]
    async fn test_image_status_wraps_image() {
        let backend = Arc::new(StubBackend::new());
        let resp = manager(backend.clone())
            .image_status(Request::new(ImageStatusRequest { image: busybox() }))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(resp.image, Some(stub_image()));
        assert_eq!(backend.calls()[0].op, "image_status");
    }

    #[tokio::test]
    async fn test_image_status_error_is_verbatim() {
        let backend = Arc::new(StubBackend::failing("image not found"));
        let status = manager(backend)
            .image_status(Request::new(ImageStatusRequest { image: busybox() }))
            .await
            .unwrap_err();

        assert_eq!(status.message(), "image not found");
    }

    #[tokio::test]
    async fn test_pull_image_forwards_auth() {
        let backend = Arc::new(StubBackend::new());
        let auth = AuthConfig {
            username: "user".to_string(),
            password: "secret".to_string(),
            server_address: "registry.example.com".to_string(),
            ..Default::default()
        };
        let resp = manager(backend.clone())
            .pull_image(Request::new(PullImageRequest {
                image: busybox(),
                auth: Some(auth.clone()),
                sandbox_config: None,
            }))
            .await
            .unwrap()
            .into_inner();

        assert_eq!(resp, PullImageResponse {});
        assert_eq!(
            backend.calls()[0].args,
            format!("{:?} {:?}", busybox(), Some(auth))
        );
    }

    #[tokio::test]
    async fn test_remove_image_failure_passes_through() {
        let backend = Arc::new(StubBackend::failing("image in use"));
        let status = manager(backend.clone())
            .remove_image(Request::new(RemoveImageRequest { image: busybox() }))
            .await
            .unwrap_err();

        assert_eq!(status.message(), "image in use");
        assert_eq!(backend.calls().len(), 1);
    }
}
