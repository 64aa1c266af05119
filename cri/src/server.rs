//! gRPC server setup for CRI services.
//!
//! Listens on a Unix domain socket for CRI RuntimeService and ImageService RPCs.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use tonic::transport::server::Router;
use tonic::transport::Server;

use podgate_core::api::image_service_server::ImageServiceServer;
use podgate_core::api::runtime_service_server::RuntimeServiceServer;
use podgate_core::{ImageBackend, Result, RuntimeBackend};

use crate::endpoint::Endpoint;
use crate::manager::CriManager;

/// CRI gRPC server configuration.
pub struct CriServer {
    /// Path to the Unix domain socket.
    socket_path: PathBuf,
    /// Dispatch layer shared by both services.
    manager: CriManager,
}

impl CriServer {
    /// Create a new CRI server relaying to the given backends.
    pub fn new(
        socket_path: impl Into<PathBuf>,
        runtime: Arc<dyn RuntimeBackend>,
        image: Arc<dyn ImageBackend>,
    ) -> Self {
        Self {
            socket_path: socket_path.into(),
            manager: CriManager::new(runtime, image),
        }
    }

    /// Both CRI services mounted on one transport.
    fn routes(&self) -> Router {
        Server::builder()
            .add_service(RuntimeServiceServer::new(self.manager.clone()))
            .add_service(ImageServiceServer::new(self.manager.clone()))
    }

    /// Serve CRI RPCs on the Unix socket until the process is torn down.
    pub async fn serve(&self) -> Result<()> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Serve CRI RPCs on the Unix socket until `signal` resolves.
    ///
    /// Fails if the socket cannot be claimed. The socket file is removed on
    /// every exit path once it has been bound.
    pub async fn serve_with_shutdown<F>(&self, signal: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let routes = self.routes();

        let mut endpoint = Endpoint::bind(&self.socket_path).await?;
        let incoming = endpoint.incoming()?;

        tracing::info!(
            socket = %endpoint.path().display(),
            "CRI server listening"
        );

        let result = routes.serve_with_incoming_shutdown(incoming, signal).await;
        drop(endpoint);

        result?;
        tracing::info!(socket = %self.socket_path.display(), "CRI server stopped");
        Ok(())
    }
}

/// Resolve on SIGINT or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
