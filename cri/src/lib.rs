//! Podgate CRI - kubelet container runtime interface adapter.
//!
//! Serves the CRI RuntimeService and ImageService over a Unix domain socket
//! and relays every call, one to one, to an injected backend:
//! - RuntimeService → `RuntimeBackend`
//! - ImageService → `ImageBackend`

pub mod cli;
pub mod endpoint;
pub mod error;
pub mod image_service;
pub mod logging;
pub mod manager;
pub mod runtime_service;
pub mod server;

#[cfg(test)]
mod testing;

pub use manager::CriManager;
pub use server::CriServer;
