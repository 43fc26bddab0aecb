//! Operating-system families and the rules each one uses to find images.
//!
//! Every family knows three things: how to turn a version/architecture into
//! a provider search, how to recognise one of its images by display name,
//! and which account to log in with.

mod centos;
mod debian;
mod el;
mod fedora;
mod freebsd;
mod registry;
mod ubuntu;
mod windows;

use regex::Regex;
use serde::Serialize;
use std::fmt;

use crate::cloud::SearchQuery;
use crate::platform::PlatformDescriptor;

pub use centos::Centos;
pub use debian::Debian;
pub use el::EnterpriseLinux;
pub use fedora::Fedora;
pub use freebsd::Freebsd;
pub use registry::{Registry, RegistryError, init, init_with, registry};
pub use ubuntu::Ubuntu;
pub use windows::Windows;

/// Result of recognising an image name: the version fragment, if the name
/// carried one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameMatch {
    pub version: Option<String>,
}

impl NameMatch {
    pub fn new(version: Option<String>) -> Self {
        Self { version }
    }
}

/// Per-family image lookup rules.
pub trait FamilyStrategy: Send + Sync {
    /// Registry name, eg. `centos`.
    fn name(&self) -> &'static str;

    /// Provider filters for the given version and architecture.
    fn image_search(&self, version: Option<&str>, architecture: Option<&str>) -> SearchQuery;

    /// Recognise an image of this family from its display name.
    fn match_image_name(&self, image_name: &str) -> Option<NameMatch>;

    /// Default login account.
    fn username(&self, version: Option<&str>) -> &'static str;
}

/// Closed set of supported families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    Centos,
    Debian,
    El,
    Fedora,
    Freebsd,
    Ubuntu,
    Windows,
}

impl Family {
    pub const ALL: [Family; 7] = [
        Family::Centos,
        Family::Debian,
        Family::El,
        Family::Fedora,
        Family::Freebsd,
        Family::Ubuntu,
        Family::Windows,
    ];

    pub fn strategy(self) -> &'static dyn FamilyStrategy {
        match self {
            Family::Centos => &Centos,
            Family::Debian => &Debian,
            Family::El => &EnterpriseLinux,
            Family::Fedora => &Fedora,
            Family::Freebsd => &Freebsd,
            Family::Ubuntu => &Ubuntu,
            Family::Windows => &Windows,
        }
    }

    pub fn name(self) -> &'static str {
        self.strategy().name()
    }

    /// Bind this family to a version and architecture.
    pub fn bind(self, version: Option<String>, architecture: Option<String>) -> Platform {
        Platform {
            family: self,
            version,
            architecture,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A family bound to a concrete version and architecture. Built per
/// resolution call and thrown away afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    family: Family,
    version: Option<String>,
    architecture: Option<String>,
}

impl Platform {
    pub fn family(&self) -> Family {
        self.family
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn architecture(&self) -> Option<&str> {
        self.architecture.as_deref()
    }

    pub fn image_search(&self) -> SearchQuery {
        self.family
            .strategy()
            .image_search(self.version(), self.architecture())
    }

    pub fn username(&self) -> &'static str {
        self.family.strategy().username(self.version())
    }

    pub fn descriptor(&self) -> PlatformDescriptor {
        PlatformDescriptor::new(
            self.family.name(),
            self.version.clone(),
            self.architecture.clone(),
        )
    }
}

/// Run `re` against `image_name` and take the first group as the version.
pub(crate) fn first_group_match(re: &Regex, image_name: &str) -> Option<NameMatch> {
    let caps = re.captures(image_name)?;
    Some(NameMatch::new(caps.get(1).map(|m| m.as_str().to_string())))
}

/// Leading decimal number of a version string, `0.0` when there is none.
/// `"7.1"` -> 7.1, `"6.4.1"` -> 6.4, `"stream"` -> 0.0
pub(crate) fn leading_number(version: &str) -> f64 {
    let trimmed = version.trim_start();
    let mut end = 0;
    let mut seen_dot = false;
    for (idx, ch) in trimmed.char_indices() {
        match ch {
            '0'..='9' => end = idx + 1,
            '.' if !seen_dot && end == idx && idx > 0 => seen_dot = true,
            _ => break,
        }
    }
    trimmed[..end].parse().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::{Family, leading_number};

    #[test]
    fn leading_number_reads_prefix() {
        assert_eq!(leading_number("7.1"), 7.1);
        assert_eq!(leading_number("6"), 6.0);
        assert_eq!(leading_number("6.4.1"), 6.4);
        assert_eq!(leading_number("6."), 6.0);
        assert_eq!(leading_number("stream"), 0.0);
        assert_eq!(leading_number(""), 0.0);
    }

    #[test]
    fn family_names_are_unique() {
        let mut names: Vec<&str> = Family::ALL.iter().map(|f| f.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Family::ALL.len());
    }

    #[test]
    fn bound_platform_renders_descriptor() {
        let platform = Family::Centos.bind(Some("7.1".into()), Some("x86_64".into()));
        assert_eq!(platform.descriptor().to_string(), "centos-7.1-x86_64");
        assert_eq!(platform.username(), "root");
    }
}
