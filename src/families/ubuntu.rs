use std::sync::OnceLock;

use regex::Regex;

use super::{FamilyStrategy, NameMatch, first_group_match};
use crate::cloud::SearchQuery;

/// Canonical's publishing account.
const OWNER_ID: &str = "099720109477";

fn image_name_regex() -> &'static Regex {
    static NAME_RE: OnceLock<Regex> = OnceLock::new();
    NAME_RE.get_or_init(|| {
        Regex::new(r"(?i)ubuntu\D*(\d+(\.\d+)?)?").expect("invalid Ubuntu image name regex")
    })
}

pub struct Ubuntu;

impl FamilyStrategy for Ubuntu {
    fn name(&self) -> &'static str {
        "ubuntu"
    }

    fn image_search(&self, version: Option<&str>, architecture: Option<&str>) -> SearchQuery {
        SearchQuery::new()
            .filter("owner-id", OWNER_ID)
            .filter(
                "name",
                format!("ubuntu/images/*/ubuntu-*-{}*", version.unwrap_or_default()),
            )
            .with_architecture(architecture)
    }

    fn match_image_name(&self, image_name: &str) -> Option<NameMatch> {
        first_group_match(image_name_regex(), image_name)
    }

    fn username(&self, _version: Option<&str>) -> &'static str {
        "ubuntu"
    }
}

#[cfg(test)]
mod tests {
    use super::Ubuntu;
    use crate::families::FamilyStrategy;

    #[test]
    fn version_is_taken_after_the_codename() {
        let found = Ubuntu.match_image_name("ubuntu/images/hvm/ubuntu-bionic-18.04");
        assert_eq!(found.unwrap().version.as_deref(), Some("18.04"));
    }

    #[test]
    fn name_without_version_still_matches() {
        let found = Ubuntu.match_image_name("Ubuntu minimal");
        assert_eq!(found.unwrap().version, None);
    }
}
