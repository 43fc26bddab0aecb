use tracing::{debug, info, warn};

use crate::cloud::{ImageCandidate, SearchQuery};
use crate::families::{self, Platform, Registry};
use crate::platform::PlatformDescriptor;
use crate::ranker;

pub type ProviderError = Box<dyn std::error::Error + Send + Sync>;

/// The compute provider's image search. One call per resolution.
#[async_trait::async_trait]
pub trait ImageProvider: Send + Sync {
    async fn search_images(&self, query: &SearchQuery) -> Result<Vec<ImageCandidate>, ProviderError>;
}

#[async_trait::async_trait]
impl<T: ImageProvider + ?Sized> ImageProvider for &T {
    async fn search_images(&self, query: &SearchQuery) -> Result<Vec<ImageCandidate>, ProviderError> {
        (**self).search_images(query).await
    }
}

/// What the caller wants an image for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRequest {
    /// Raw platform string, eg. `centos-7.1-x86_64`.
    Platform(String),
    Descriptor(PlatformDescriptor),
    /// Caller-supplied filters, used as-is.
    Search(SearchQuery),
}

impl From<&str> for ImageRequest {
    fn from(raw: &str) -> Self {
        ImageRequest::Platform(raw.to_string())
    }
}

impl From<PlatformDescriptor> for ImageRequest {
    fn from(descriptor: PlatformDescriptor) -> Self {
        ImageRequest::Descriptor(descriptor)
    }
}

impl From<SearchQuery> for ImageRequest {
    fn from(query: SearchQuery) -> Self {
        ImageRequest::Search(query)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    #[error("image search failed for [{query}]: {source}")]
    Provider {
        query: SearchQuery,
        #[source]
        source: ProviderError,
    },
}

/// Turns platform requests into image ids, and images back into platforms.
pub struct Resolver<'r, P> {
    registry: &'r Registry,
    provider: P,
}

impl<P: ImageProvider> Resolver<'static, P> {
    /// Resolver over the process-wide family registry.
    pub fn new(provider: P) -> Self {
        Self {
            registry: families::registry(),
            provider,
        }
    }
}

impl<'r, P: ImageProvider> Resolver<'r, P> {
    pub fn with_registry(registry: &'r Registry, provider: P) -> Self {
        Self { registry, provider }
    }

    /// Bind a descriptor to its registered family, if there is one.
    pub fn platform(&self, descriptor: &PlatformDescriptor) -> Option<Platform> {
        self.registry.platform(descriptor)
    }

    /// The filters a request would send, or `None` when the family is not
    /// registered.
    pub fn search_for(&self, request: &ImageRequest) -> Option<SearchQuery> {
        match request {
            ImageRequest::Search(query) => Some(query.clone()),
            ImageRequest::Platform(raw) => self.search_for_descriptor(&PlatformDescriptor::parse(raw)),
            ImageRequest::Descriptor(descriptor) => self.search_for_descriptor(descriptor),
        }
    }

    fn search_for_descriptor(&self, descriptor: &PlatformDescriptor) -> Option<SearchQuery> {
        match self.platform(descriptor) {
            Some(platform) => Some(platform.image_search()),
            None => {
                warn!(platform = %descriptor, "no registered family for platform");
                None
            }
        }
    }

    /// Resolve a request to the best matching image id.
    ///
    /// `Ok(None)` means unresolved: the family is unknown or the search
    /// came back empty. Only provider failures are errors.
    pub async fn resolve(&self, request: impl Into<ImageRequest>) -> Result<Option<String>, ResolveError> {
        let request = request.into();
        let Some(query) = self.search_for(&request) else {
            return Ok(None);
        };

        let image = self.best_image(&query).await?;
        Ok(image.map(|image| image.id().to_string()))
    }

    /// Issue `query` and rank what comes back.
    pub async fn best_image(&self, query: &SearchQuery) -> Result<Option<ImageCandidate>, ResolveError> {
        debug!(filters = %query, "searching images");
        let candidates = self
            .provider
            .search_images(query)
            .await
            .map_err(|source| ResolveError::Provider {
                query: query.clone(),
                source,
            })?;

        let winner = ranker::best(candidates);
        match &winner {
            Some(image) => info!(image_id = image.id(), name = image.name(), "resolved image"),
            None => warn!(filters = %query, "no images matched search"),
        }
        Ok(winner)
    }

    /// Infer the platform of an image from its name. Families are tried in
    /// registry order and the first that recognises the name wins.
    pub fn infer(&self, image: &ImageCandidate) -> Option<PlatformDescriptor> {
        self.registry.iter().find_map(|(name, family)| {
            family
                .strategy()
                .match_image_name(image.name())
                .map(|found| PlatformDescriptor::new(name, found.version, None))
        })
    }

    /// Look an image up by id and infer its platform.
    pub async fn infer_image_id(&self, image_id: &str) -> Result<Option<PlatformDescriptor>, ResolveError> {
        let query = SearchQuery::new().filter("image-id", image_id);
        let images = self
            .provider
            .search_images(&query)
            .await
            .map_err(|source| ResolveError::Provider { query, source })?;

        let inferred = images.first().and_then(|image| self.infer(image));
        debug!(image_id, platform = inferred.as_ref().map(|d| d.to_string()), "inferred platform");
        Ok(inferred)
    }

    /// Default login account for a platform, `None` for unknown families.
    pub fn username(&self, descriptor: &PlatformDescriptor) -> Option<&'static str> {
        self.platform(descriptor).map(|platform| platform.username())
    }
}
