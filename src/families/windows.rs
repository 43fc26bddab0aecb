use std::sync::OnceLock;

use regex::Regex;

use super::{FamilyStrategy, NameMatch};
use crate::cloud::SearchQuery;

const OWNER_ALIAS: &str = "amazon";

fn windows_regex() -> &'static Regex {
    static WINDOWS_RE: OnceLock<Regex> = OnceLock::new();
    WINDOWS_RE.get_or_init(|| Regex::new(r"(?i)windows").expect("invalid Windows name regex"))
}

/// `2012`, `2012 R2`, `2012-r2` ...
fn release_regex() -> &'static Regex {
    static RELEASE_RE: OnceLock<Regex> = OnceLock::new();
    RELEASE_RE.get_or_init(|| {
        Regex::new(r"(?i)(\b\d+)(\W*(r\d+))?\b").expect("invalid Windows release regex")
    })
}

fn revision_regex() -> &'static Regex {
    static REVISION_RE: OnceLock<Regex> = OnceLock::new();
    REVISION_RE
        .get_or_init(|| Regex::new(r"^(\d+)r(\d+)$").expect("invalid Windows revision regex"))
}

/// Version fragment of the `Windows_Server-<ver>-English-...` name pattern.
///
/// `windows-server-2012r2` and `windows-2012r2` are the same platform, so a
/// leading `server-` segment is dropped first.
pub fn release_pattern(version: Option<&str>) -> String {
    let version = match version {
        Some(v) if v.starts_with("server") => v.split_once('-').map(|(_, rest)| rest),
        other => other,
    };

    match version {
        None | Some("") => "*-RTM*".to_string(),
        Some(v) => match revision_regex().captures(v) {
            Some(caps) => format!("{}-R{}*", &caps[1], &caps[2]),
            None => format!("{v}-RTM*"),
        },
    }
}

pub struct Windows;

impl FamilyStrategy for Windows {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn image_search(&self, version: Option<&str>, architecture: Option<&str>) -> SearchQuery {
        SearchQuery::new()
            .filter("owner-alias", OWNER_ALIAS)
            .filter(
                "name",
                format!("Windows_Server-{}-English-*-Base-*", release_pattern(version)),
            )
            .with_architecture(architecture)
    }

    fn match_image_name(&self, image_name: &str) -> Option<NameMatch> {
        if !windows_regex().is_match(image_name) {
            return None;
        }

        let version = release_regex().captures(image_name).map(|caps| {
            let major = caps.get(1).map_or("", |m| m.as_str());
            let revision = caps.get(3).map_or(String::new(), |m| m.as_str().to_lowercase());
            format!("{major}{revision}")
        });

        Some(NameMatch::new(version))
    }

    fn username(&self, _version: Option<&str>) -> &'static str {
        "administrator"
    }
}

#[cfg(test)]
mod tests {
    use super::{Windows, release_pattern};
    use crate::families::FamilyStrategy;

    #[test]
    fn release_patterns() {
        assert_eq!(release_pattern(None), "*-RTM*");
        assert_eq!(release_pattern(Some("")), "*-RTM*");
        assert_eq!(release_pattern(Some("server")), "*-RTM*");
        assert_eq!(release_pattern(Some("2008")), "2008-RTM*");
        assert_eq!(release_pattern(Some("2012r2")), "2012-R2*");
        assert_eq!(release_pattern(Some("server-2012r2")), "2012-R2*");
        assert_eq!(release_pattern(Some("server-2012")), "2012-RTM*");
    }

    #[test]
    fn revision_is_lowercased_and_joined() {
        let found = Windows.match_image_name("Windows Server 2012 R2 Base");
        assert_eq!(found.unwrap().version.as_deref(), Some("2012r2"));
    }

    #[test]
    fn plain_release_number() {
        let found = Windows.match_image_name("Windows_Server-2008-SP2-English-64Bit-Base");
        assert_eq!(found.unwrap().version.as_deref(), Some("2008"));
    }

    #[test]
    fn windows_without_digits_matches_without_version() {
        let found = Windows.match_image_name("windows-base");
        assert_eq!(found.unwrap().version, None);
        assert!(Windows.match_image_name("ubuntu-14.04").is_none());
    }
}
