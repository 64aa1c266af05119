//! Podgate Core - Wire API, backend contracts and shared types.
//!
//! This crate holds everything the CRI adapter and its backends agree on:
//! the generated kubelet runtime API, the capability traits a backend
//! implements, and the error type that flows between them.

pub mod backend;
pub mod config;
pub mod error;
pub mod memory;

/// Generated kubelet runtime API (v1alpha1) protobuf types and services.
pub mod api {
    tonic::include_proto!("runtime");
}

// Re-export commonly used types
pub use backend::{ImageBackend, RuntimeBackend, RuntimeVersion};
pub use config::{GateConfig, LogFormat};
pub use error::{GateError, Result};
pub use memory::MemoryBackend;

/// Podgate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version of the kubelet runtime API served by the adapter.
///
/// Reported by `Version` regardless of what the backend says about itself.
pub const RUNTIME_API_VERSION: &str = "0.1.0";
