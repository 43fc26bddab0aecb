use serde::{Deserialize, Serialize};

use super::ImageCandidate;

/// Top-level describe-images document: `{"Images": [...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageCatalog {
    #[serde(rename = "Images", default)]
    images: Vec<ImageCandidate>,
}

impl ImageCatalog {
    pub fn new(images: Vec<ImageCandidate>) -> Self {
        Self { images }
    }

    /// Borrow the catalogue entries in document order.
    pub fn images(&self) -> &[ImageCandidate] {
        &self.images
    }

    pub fn into_images(self) -> Vec<ImageCandidate> {
        self.images
    }
}
