//! The Unix socket endpoint the CRI services listen on.
//!
//! An [`Endpoint`] owns the socket path from bind until drop. Binding clears
//! a stale socket file left behind by a previous process but refuses to take
//! over a socket that still has a live listener. Dropping the endpoint
//! removes the socket file.
//!
//! The live-listener probe and the unlink of a stale file are two steps.
//! Two processes started at the same moment on the same stale path can both
//! judge it stale, and the later one then unlinks the earlier one's fresh
//! socket. Run one adapter per socket path.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::net::{UnixListener, UnixStream};
use tokio_stream::wrappers::UnixListenerStream;

use podgate_core::{GateError, Result};

/// A bound Unix socket listener and the path it occupies.
#[derive(Debug)]
pub struct Endpoint {
    path: PathBuf,
    listener: Option<UnixListener>,
}

impl Endpoint {
    /// Claim `path` and start listening on it.
    pub async fn bind(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        // Ensure parent directory exists
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        remove_stale_socket(&path).await?;

        let listener = match UnixListener::bind(&path) {
            Ok(listener) => listener,
            Err(e) => {
                // Someone bound the path after it was cleared.
                if e.kind() == ErrorKind::AddrInUse && is_live(&path).await {
                    return Err(already_served(&path));
                }
                return Err(GateError::TransportError(format!(
                    "failed to listen on {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        tracing::debug!(socket = %path.display(), "Bound CRI socket");
        Ok(Self {
            path,
            listener: Some(listener),
        })
    }

    /// Socket path this endpoint occupies.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hand the listener over as a connection stream. Only the first call
    /// succeeds; the socket file stays owned by the endpoint.
    pub fn incoming(&mut self) -> Result<UnixListenerStream> {
        self.listener
            .take()
            .map(UnixListenerStream::new)
            .ok_or_else(|| {
                GateError::TransportError(format!(
                    "listener on {} already taken",
                    self.path.display()
                ))
            })
    }
}

impl Drop for Endpoint {
    fn drop(&mut self) {
        // Close the listener before unlinking its path.
        self.listener.take();
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(socket = %self.path.display(), "Removed CRI socket"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                socket = %self.path.display(),
                error = %e,
                "Failed to remove CRI socket"
            ),
        }
    }
}

/// Remove a leftover socket file at `path`.
///
/// Nothing at the path is fine. A path that still accepts connections
/// belongs to a running server and is an error.
async fn remove_stale_socket(path: &Path) -> Result<()> {
    match UnixStream::connect(path).await {
        Ok(_) => return Err(already_served(path)),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(_) => {}
    }

    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            tracing::info!(socket = %path.display(), "Removed stale CRI socket");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

async fn is_live(path: &Path) -> bool {
    UnixStream::connect(path).await.is_ok()
}

fn already_served(path: &Path) -> GateError {
    GateError::TransportError(format!(
        "{} is already served by a running listener",
        path.display()
    ))
}
