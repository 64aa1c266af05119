//! Image bookkeeping for the in-memory backend.

use std::collections::HashMap;

use sha2::{Digest, Sha256};
use tokio::sync::RwLock;

use crate::api::{Image, ImageSpec};

/// Content-style id for an image reference.
fn image_id(reference: &str) -> String {
    format!("sha256:{}", hex::encode(Sha256::digest(reference.as_bytes())))
}

/// In-memory store for pulled images, keyed by reference.
pub struct ImageStore {
    images: RwLock<HashMap<String, Image>>,
}

impl ImageStore {
    /// Create a new empty image store.
    pub fn new() -> Self {
        Self {
            images: RwLock::new(HashMap::new()),
        }
    }

    /// Record an image reference, returning the stored image.
    ///
    /// Recording the same reference twice keeps the first entry.
    pub async fn record(&self, reference: &str) -> Image {
        let mut store = self.images.write().await;
        store
            .entry(reference.to_string())
            .or_insert_with(|| {
                let id = image_id(reference);
                Image {
                    repo_digests: vec![format!("{}@{}", reference, id)],
                    id,
                    repo_tags: vec![reference.to_string()],
                    size: 0,
                    uid: None,
                    username: String::new(),
                }
            })
            .clone()
    }

    /// Look up an image by reference or by id.
    pub async fn get(&self, reference: &str) -> Option<Image> {
        let store = self.images.read().await;
        store
            .get(reference)
            .or_else(|| store.values().find(|img| img.id == reference))
            .cloned()
    }

    /// List images, optionally restricted to one reference or id.
    pub async fn list(&self, spec: Option<&ImageSpec>) -> Vec<Image> {
        let wanted = spec.map(|s| s.image.as_str()).filter(|s| !s.is_empty());
        let store = self.images.read().await;
        store
            .iter()
            .filter(|(reference, img)| {
                wanted.map_or(true, |w| reference.as_str() == w || img.id == w)
            })
            .map(|(_, img)| img.clone())
            .collect()
    }

    /// Remove an image by reference or by id.
    pub async fn remove(&self, reference: &str) -> Option<Image> {
        let mut store = self.images.write().await;
        let key = if store.contains_key(reference) {
            reference.to_string()
        } else {
            store
                .iter()
                .find(|(_, img)| img.id == reference)
                .map(|(k, _)| k.clone())?
        };
        store.remove(&key)
    }
}

impl Default for ImageStore {
    fn default() -> Self {
        Self::new()
    }
}
