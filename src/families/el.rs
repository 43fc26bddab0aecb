use std::sync::OnceLock;

use regex::Regex;

use super::{FamilyStrategy, NameMatch, first_group_match, leading_number};
use crate::cloud::SearchQuery;

const OWNER_ID: &str = "309956199498";

fn image_name_regex() -> &'static Regex {
    static NAME_RE: OnceLock<Regex> = OnceLock::new();
    NAME_RE.get_or_init(|| {
        Regex::new(r"(?i)rhel\D*(\d+(\.\d+)?)?").expect("invalid RHEL image name regex")
    })
}

/// Red Hat Enterprise Linux, registered as `el`.
pub struct EnterpriseLinux;

impl FamilyStrategy for EnterpriseLinux {
    fn name(&self) -> &'static str {
        "el"
    }

    fn image_search(&self, version: Option<&str>, architecture: Option<&str>) -> SearchQuery {
        SearchQuery::new()
            .filter("owner-id", OWNER_ID)
            .filter("name", format!("RHEL-{}*", version.unwrap_or_default()))
            .with_architecture(architecture)
    }

    fn match_image_name(&self, image_name: &str) -> Option<NameMatch> {
        first_group_match(image_name_regex(), image_name)
    }

    // ec2-user replaced root as the login account in 6.4
    fn username(&self, version: Option<&str>) -> &'static str {
        match version {
            Some(v) if leading_number(v) < 6.4 => "root",
            _ => "ec2-user",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EnterpriseLinux;
    use crate::families::FamilyStrategy;

    #[test]
    fn username_depends_on_version() {
        assert_eq!(EnterpriseLinux.username(Some("6.3")), "root");
        assert_eq!(EnterpriseLinux.username(Some("6")), "root");
        assert_eq!(EnterpriseLinux.username(Some("6.4")), "ec2-user");
        assert_eq!(EnterpriseLinux.username(Some("7")), "ec2-user");
        assert_eq!(EnterpriseLinux.username(None), "ec2-user");
    }

    #[test]
    fn matches_rhel_names() {
        let found = EnterpriseLinux.match_image_name("RHEL-7.2_HVM_GA-20151112-x86_64-1-Hourly2-GP2");
        assert_eq!(found.unwrap().version.as_deref(), Some("7.2"));
    }
}
