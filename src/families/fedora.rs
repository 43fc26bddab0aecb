use std::sync::OnceLock;

use regex::Regex;

use super::{FamilyStrategy, NameMatch, first_group_match};
use crate::cloud::SearchQuery;

const OWNER_ID: &str = "125523088429";

fn image_name_regex() -> &'static Regex {
    static NAME_RE: OnceLock<Regex> = OnceLock::new();
    NAME_RE.get_or_init(|| {
        Regex::new(r"(?i)fedora\D*(\d+(\.\d+)?)?").expect("invalid Fedora image name regex")
    })
}

pub struct Fedora;

impl FamilyStrategy for Fedora {
    fn name(&self) -> &'static str {
        "fedora"
    }

    fn image_search(&self, version: Option<&str>, architecture: Option<&str>) -> SearchQuery {
        let name = match version {
            Some(v) => format!("Fedora-Cloud-Base-{v}-*"),
            None => "Fedora-Cloud-Base-*".to_string(),
        };

        SearchQuery::new()
            .filter("owner-id", OWNER_ID)
            .filter("name", name)
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
    use super::Fedora;
    use crate::families::FamilyStrategy;

    #[test]
    fn matches_cloud_base_names() {
        let found = Fedora.match_image_name("Fedora-Cloud-Base-23-20151030.x86_64-us-east-1-HVM-standard-0");
        assert_eq!(found.unwrap().version.as_deref(), Some("23"));
    }
}
