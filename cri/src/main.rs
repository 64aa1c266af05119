//! Podgate CRI - kubelet container runtime interface binary.
//!
//! Serves CRI RuntimeService and ImageService over a Unix domain socket,
//! relaying every call to the bundled in-memory backend.

use std::sync::Arc;

use clap::Parser;

use podgate_core::MemoryBackend;

use podgate_cri::cli::Args;
use podgate_cri::server::{shutdown_signal, CriServer};
use podgate_cri::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Args::parse().into_config()?;

    logging::init(&config.log_level, config.log_format);

    tracing::info!(
        socket = %config.socket_path.display(),
        version = podgate_core::VERSION,
        api_version = podgate_core::RUNTIME_API_VERSION,
        "Starting Podgate CRI"
    );

    let backend = Arc::new(MemoryBackend::new());
    let server = CriServer::new(config.socket_path.clone(), backend.clone(), backend);

    if let Err(e) = server.serve_with_shutdown(shutdown_signal()).await {
        tracing::error!(
            socket = %config.socket_path.display(),
            error = %e,
            "CRI server failed"
        );
        return Err(e.into());
    }

    Ok(())
}
