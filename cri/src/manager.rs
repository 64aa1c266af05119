//! The dispatch layer shared by both CRI services.

use std::sync::Arc;

use podgate_core::{ImageBackend, RuntimeBackend};

/// Relays CRI calls to the injected backends.
///
/// Holds no state of its own beyond the backend handles, so clones are
/// cheap and every call runs independently. Implements both the generated
/// `RuntimeService` and `ImageService` server traits.
#[derive(Clone)]
pub struct CriManager {
    pub(crate) runtime: Arc<dyn RuntimeBackend>,
    pub(crate) image: Arc<dyn ImageBackend>,
}

impl CriManager {
    /// Create a manager over the given backends.
    pub fn new(runtime: Arc<dyn RuntimeBackend>, image: Arc<dyn ImageBackend>) -> Self {
        Self { runtime, image }
    }
}
