use std::{fs, path::Path};

use serde::Deserialize;

use crate::cloud::SearchQuery;
use crate::families::Registry;
use crate::platform::PlatformDescriptor;
use crate::resolver::ImageRequest;

/// Driver settings for one provisioning request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriverConfig {
    #[serde(default)]
    platform: Option<String>,
    #[serde(default)]
    image_id: Option<String>,
    #[serde(default)]
    image_search: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    catalog: Option<String>,
}

/// How the driver picks its image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSelection {
    /// Use this id, no lookup.
    Fixed(String),
    Resolve(ImageRequest),
    /// Nothing to go on.
    Unspecified,
}

impl DriverConfig {
    /// Initialize from a JSON file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json_str(&data)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(ConfigError::Json)
    }

    /// Initialize from an env var containing JSON.
    pub fn from_env(var: &str) -> Result<Self, ConfigError> {
        let s = std::env::var(var).map_err(|_| ConfigError::MissingEnv(var.to_string()))?;
        Self::from_json_str(&s)
    }

    pub fn platform(&self) -> Option<&str> {
        self.platform.as_deref()
    }

    pub fn image_id(&self) -> Option<&str> {
        self.image_id.as_deref()
    }

    pub fn catalog(&self) -> Option<&str> {
        self.catalog.as_deref()
    }

    pub fn image_search(&self) -> Option<SearchQuery> {
        self.image_search.as_ref().map(SearchQuery::from_json_object)
    }

    pub fn set_platform(&mut self, platform: impl Into<String>) {
        self.platform = Some(platform.into());
    }

    pub fn set_catalog(&mut self, catalog: impl Into<String>) {
        self.catalog = Some(catalog.into());
    }

    pub fn set_image_search(&mut self, query: &SearchQuery) {
        let map = query
            .filters()
            .iter()
            .map(|filter| {
                let values = filter
                    .values()
                    .iter()
                    .cloned()
                    .map(serde_json::Value::String)
                    .collect();
                (filter.name().to_string(), serde_json::Value::Array(values))
            })
            .collect();
        self.image_search = Some(map);
    }

    /// `image_id` wins over `image_search`, which wins over `platform`.
    pub fn image_selection(&self) -> ImageSelection {
        if let Some(id) = &self.image_id {
            return ImageSelection::Fixed(id.clone());
        }
        if let Some(query) = self.image_search() {
            return ImageSelection::Resolve(ImageRequest::Search(query));
        }
        match &self.platform {
            Some(platform) => ImageSelection::Resolve(ImageRequest::Platform(platform.clone())),
            None => ImageSelection::Unspecified,
        }
    }

    /// Configured username, else the platform family's default.
    pub fn username(&self, registry: &Registry) -> Option<String> {
        if let Some(username) = &self.username {
            return Some(username.clone());
        }
        let descriptor = PlatformDescriptor::parse(self.platform.as_deref()?);
        registry
            .platform(&descriptor)
            .map(|platform| platform.username().to_string())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("missing env var: {0}")]
    MissingEnv(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
