//! Resolve platform strings such as `centos-7.1-x86_64` to cloud machine
//! image ids, and infer platforms back from image names.
//!
//! ```ignore
//! let resolver = Resolver::new(CatalogProvider::from_path("images.json")?);
//! let image_id = resolver.resolve("ubuntu-16.04-x86_64").await?;
//! ```

pub mod catalog;
pub mod cloud;
pub mod config;
pub mod families;
pub mod platform;
pub mod ranker;
pub mod resolver;

pub use catalog::{CatalogError, CatalogProvider};
pub use cloud::{ImageCandidate, SearchQuery};
pub use config::{ConfigError, DriverConfig, ImageSelection};
pub use families::{Family, FamilyStrategy, Platform, Registry};
pub use platform::PlatformDescriptor;
pub use resolver::{ImageProvider, ImageRequest, ResolveError, Resolver};
