use std::sync::OnceLock;

use regex::Regex;

use super::{FamilyStrategy, NameMatch, first_group_match, leading_number};
use crate::cloud::SearchQuery;

const OWNER_ALIAS: &str = "aws-marketplace";

fn image_name_regex() -> &'static Regex {
    static NAME_RE: OnceLock<Regex> = OnceLock::new();
    NAME_RE.get_or_init(|| {
        Regex::new(r"(?i)centos\D*(\d+(\.\d+)?)?").expect("invalid CentOS image name regex")
    })
}

/// CentOS images published through the marketplace. Releases before 7 used
/// the `CentOS-<ver>-GA` naming, later ones `CentOS Linux <ver>`.
pub struct Centos;

impl FamilyStrategy for Centos {
    fn name(&self) -> &'static str {
        "centos"
    }

    fn image_search(&self, version: Option<&str>, architecture: Option<&str>) -> SearchQuery {
        let name = match version {
            Some(v) if leading_number(v) < 7.0 => format!("CentOS-{v}*-GA-*"),
            _ => format!("CentOS Linux {}*", version.unwrap_or_default()),
        };

        SearchQuery::new()
            .filter("owner-alias", OWNER_ALIAS)
            .filter("name", name)
            .with_architecture(architecture)
    }

    fn match_image_name(&self, image_name: &str) -> Option<NameMatch> {
        first_group_match(image_name_regex(), image_name)
    }

    fn username(&self, _version: Option<&str>) -> &'static str {
        "root"
    }
}

#[cfg(test)]
mod tests {
    use super::Centos;
    use crate::families::FamilyStrategy;

    fn name_filter(version: Option<&str>) -> String {
        Centos.image_search(version, None).filters()[1].values()[0].clone()
    }

    #[test]
    fn old_releases_use_ga_naming() {
        assert_eq!(name_filter(Some("6")), "CentOS-6*-GA-*");
        assert_eq!(name_filter(Some("6.1")), "CentOS-6.1*-GA-*");
    }

    #[test]
    fn newer_or_absent_releases_use_linux_naming() {
        assert_eq!(name_filter(Some("7.1")), "CentOS Linux 7.1*");
        assert_eq!(name_filter(Some("8")), "CentOS Linux 8*");
        assert_eq!(name_filter(None), "CentOS Linux *");
    }

    #[test]
    fn matches_image_names() {
        let found = Centos.match_image_name("CentOS Linux 7 x86_64 HVM EBS 1602");
        assert_eq!(found.unwrap().version.as_deref(), Some("7"));

        let found = Centos.match_image_name("centos-6.5-minimal");
        assert_eq!(found.unwrap().version.as_deref(), Some("6.5"));

        assert!(Centos.match_image_name("RHEL-7.2_HVM").is_none());
    }
}
