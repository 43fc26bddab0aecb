mod catalog;
mod image;
mod search;

pub use catalog::ImageCatalog;
pub use image::{BlockDeviceMapping, EbsVolume, ImageCandidate};
pub use search::{Filter, QueryMatcher, SearchQuery};
