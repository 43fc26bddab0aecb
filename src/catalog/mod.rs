use std::{fs, path::Path};

use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::cloud::{ImageCandidate, ImageCatalog, SearchQuery};
use crate::resolver::{ImageProvider, ProviderError};

const USER_AGENT: &str = "cloud-image-platforms/0.1";

/// Offline image provider: answers searches from a describe-images
/// document held in memory.
#[derive(Debug, Clone, Default)]
pub struct CatalogProvider {
    images: Vec<ImageCandidate>,
}

impl CatalogProvider {
    pub fn new(images: Vec<ImageCandidate>) -> Self {
        Self { images }
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let catalog: ImageCatalog = serde_json::from_str(json).map_err(CatalogError::Json)?;
        Ok(Self::new(catalog.into_images()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&data)
    }

    /// Download the catalog document at `url`.
    pub async fn fetch(url: &Url) -> Result<Self, CatalogError> {
        let client = Client::builder().build().map_err(CatalogError::Http)?;

        let res = client
            .get(url.clone())
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(CatalogError::Http)?;

        let status = res.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = res.text().await.map_err(CatalogError::Http)?;
        debug!(%url, bytes = body.len(), "fetched image catalog");
        Self::from_json_str(&body)
    }

    /// Load from an http(s) URL or, for anything else, a file path.
    pub async fn load(source: &str) -> Result<Self, CatalogError> {
        match Url::parse(source) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::fetch(&url).await,
            _ => Self::from_path(source),
        }
    }

    pub fn images(&self) -> &[ImageCandidate] {
        &self.images
    }

    /// Every image the query matches, in catalog order.
    pub fn search(&self, query: &SearchQuery) -> Vec<ImageCandidate> {
        let matcher = query.matcher();
        self.images
            .iter()
            .filter(|image| matcher.matches(image))
            .cloned()
            .collect()
    }
}

#[async_trait::async_trait]
impl ImageProvider for CatalogProvider {
    async fn search_images(&self, query: &SearchQuery) -> Result<Vec<ImageCandidate>, ProviderError> {
        let found = self.search(query);
        debug!(filters = %query, matched = found.len(), total = self.images.len(), "searched catalog");
        Ok(found)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },
}
