use std::sync::OnceLock;

use regex::Regex;

use super::{FamilyStrategy, NameMatch, first_group_match};
use crate::cloud::SearchQuery;

const OWNER_ID: &str = "118940168514";

fn image_name_regex() -> &'static Regex {
    static NAME_RE: OnceLock<Regex> = OnceLock::new();
    NAME_RE.get_or_init(|| {
        Regex::new(r"(?i)freebsd\D*(\d+(\.\d+)?)?").expect("invalid FreeBSD image name regex")
    })
}

pub struct Freebsd;

impl FamilyStrategy for Freebsd {
    fn name(&self) -> &'static str {
        "freebsd"
    }

    fn image_search(&self, version: Option<&str>, architecture: Option<&str>) -> SearchQuery {
        SearchQuery::new()
            .filter("owner-id", OWNER_ID)
            .filter(
                "name",
                format!("FreeBSD/EC2 {}*-RELEASE*", version.unwrap_or_default()),
            )
            .with_architecture(architecture)
    }

    fn match_image_name(&self, image_name: &str) -> Option<NameMatch> {
        first_group_match(image_name_regex(), image_name)
    }

    fn username(&self, _version: Option<&str>) -> &'static str {
        "ec2-user"
    }
}

#[cfg(test)]
mod tests {
    use super::Freebsd;
    use crate::families::FamilyStrategy;

    #[test]
    fn matches_release_names() {
        let found = Freebsd.match_image_name("FreeBSD 10.1-RELEASE-amd64");
        assert_eq!(found.unwrap().version.as_deref(), Some("10.1"));
    }

    #[test]
    fn first_digit_run_wins() {
        // "EC2" carries the first digits after the family name
        let found = Freebsd.match_image_name("FreeBSD/EC2 10.1-RELEASE-amd64");
        assert_eq!(found.unwrap().version.as_deref(), Some("2"));
    }
}
