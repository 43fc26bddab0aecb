use std::sync::OnceLock;

use regex::Regex;

use super::{FamilyStrategy, NameMatch, first_group_match};
use crate::cloud::SearchQuery;

const OWNER_ID: &str = "379101102735";

/// Major version -> release codename. The first entry is the default.
const CODENAMES: &[(&str, &str)] = &[("8", "jessie"), ("7", "wheezy"), ("6", "squeeze")];
const DEFAULT_CODENAME: &str = "jessie";

fn image_name_regex() -> &'static Regex {
    static NAME_RE: OnceLock<Regex> = OnceLock::new();
    NAME_RE.get_or_init(|| {
        Regex::new(r"(?i)debian\D*?(\d+|(?:jessie|wheezy|squeeze)\b)")
            .expect("invalid Debian image name regex")
    })
}

fn bare_name_regex() -> &'static Regex {
    static BARE_RE: OnceLock<Regex> = OnceLock::new();
    BARE_RE.get_or_init(|| Regex::new(r"(?i)debian").expect("invalid Debian bare name regex"))
}

/// Codename used in image names for a platform version. Known majors map
/// through the table, a codename passes through as-is, and any other
/// version is used verbatim.
pub fn codename(version: Option<&str>) -> &str {
    let Some(version) = version else {
        return DEFAULT_CODENAME;
    };
    CODENAMES
        .iter()
        .find(|(major, _)| *major == version)
        .map(|(_, name)| *name)
        .unwrap_or(version)
}

pub struct Debian;

impl FamilyStrategy for Debian {
    fn name(&self) -> &'static str {
        "debian"
    }

    fn image_search(&self, version: Option<&str>, architecture: Option<&str>) -> SearchQuery {
        SearchQuery::new()
            .filter("owner-id", OWNER_ID)
            .filter("name", format!("debian-{}-*", codename(version)))
            .with_architecture(architecture)
    }

    fn match_image_name(&self, image_name: &str) -> Option<NameMatch> {
        first_group_match(image_name_regex(), image_name).or_else(|| {
            bare_name_regex()
                .is_match(image_name)
                .then(|| NameMatch::new(None))
        })
    }

    fn username(&self, _version: Option<&str>) -> &'static str {
        "admin"
    }
}

#[cfg(test)]
mod tests {
    use super::{Debian, codename};
    use crate::families::FamilyStrategy;

    #[test]
    fn codename_table() {
        assert_eq!(codename(None), "jessie");
        assert_eq!(codename(Some("8")), "jessie");
        assert_eq!(codename(Some("7")), "wheezy");
        assert_eq!(codename(Some("6")), "squeeze");
        assert_eq!(codename(Some("wheezy")), "wheezy");
        assert_eq!(codename(Some("9")), "9");
    }

    #[test]
    fn matches_codenames_and_digits() {
        let found = Debian.match_image_name("debian-jessie-amd64-hvm-2016-04-03-ebs");
        assert_eq!(found.unwrap().version.as_deref(), Some("jessie"));

        let found = Debian.match_image_name("Debian 8 x86_64");
        assert_eq!(found.unwrap().version.as_deref(), Some("8"));
    }

    #[test]
    fn bare_debian_still_matches() {
        let found = Debian.match_image_name("Debian GNU/Linux (HVM)");
        assert_eq!(found.unwrap().version, None);
        assert!(Debian.match_image_name("ubuntu-trusty").is_none());
    }
}
