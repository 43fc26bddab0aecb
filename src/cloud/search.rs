use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ImageCandidate;

/// One provider filter: a name and the values it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Filter {
    name: String,
    values: Vec<String>,
}

impl Filter {
    pub fn new<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// True when any of the filter's glob values matches the candidate's
    /// attribute. Unknown filter names match nothing.
    pub fn matches(&self, image: &ImageCandidate) -> bool {
        matches_any(&self.name, &self.compile(), image)
    }

    fn compile(&self) -> Vec<Regex> {
        self.values.iter().filter_map(|v| glob_regex(v)).collect()
    }
}

/// Image attribute values a filter name looks at; `None` for unknown names.
fn attributes<'a>(name: &str, image: &'a ImageCandidate) -> Option<Vec<&'a str>> {
    let values = match name {
        "name" => vec![image.name()],
        "image-id" => vec![image.id()],
        "architecture" => vec![image.architecture()],
        "owner-id" => image.owner_id().into_iter().collect(),
        "owner-alias" => image.owner_alias().into_iter().collect(),
        "root-device-type" => image.root_device_type().into_iter().collect(),
        "root-device-name" => image.root_device_name().into_iter().collect(),
        "virtualization-type" => image.virtualization_type().into_iter().collect(),
        "block-device-mapping.volume-type" => image
            .block_device_mappings()
            .iter()
            .filter_map(|m| m.ebs().and_then(|e| e.volume_type()))
            .collect(),
        _ => return None,
    };
    Some(values)
}

fn matches_any(name: &str, patterns: &[Regex], image: &ImageCandidate) -> bool {
    let Some(values) = attributes(name, image) else {
        return false;
    };
    patterns
        .iter()
        .any(|re| values.iter().any(|value| re.is_match(value)))
}

/// A query with its glob values compiled, for checking many images.
#[derive(Debug, Clone)]
pub struct QueryMatcher {
    filters: Vec<(String, Vec<Regex>)>,
}

impl QueryMatcher {
    /// All filters must match.
    pub fn matches(&self, image: &ImageCandidate) -> bool {
        self.filters
            .iter()
            .all(|(name, patterns)| matches_any(name, patterns, image))
    }
}

/// Ordered list of provider filters. Order is significant: it is what the
/// provider receives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchQuery {
    filters: Vec<Filter>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a filter with a single value.
    pub fn filter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push(Filter::new(name, [value.into()]));
        self
    }

    pub fn filter_values<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters.push(Filter::new(name, values));
        self
    }

    /// Append an `architecture` filter only when one was asked for; an
    /// absent architecture matches any.
    pub fn with_architecture(self, architecture: Option<&str>) -> Self {
        match architecture {
            Some(arch) => self.filter("architecture", arch),
            None => self,
        }
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Compile the glob values once, to match a whole catalog.
    pub fn matcher(&self) -> QueryMatcher {
        QueryMatcher {
            filters: self
                .filters
                .iter()
                .map(|filter| (filter.name.clone(), filter.compile()))
                .collect(),
        }
    }

    /// All filters must match.
    pub fn matches(&self, image: &ImageCandidate) -> bool {
        self.matcher().matches(image)
    }

    /// Build a query from a JSON object such as `{"name": "SuperImage"}`.
    /// Values may be scalars or arrays; every value is stringified and key
    /// order is kept.
    pub fn from_json_object(object: &serde_json::Map<String, serde_json::Value>) -> Self {
        object
            .iter()
            .fold(Self::new(), |query, (name, value)| {
                query.filter_values(name.as_str(), json_values(value))
            })
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .filters
            .iter()
            .map(|filter| format!("{}={}", filter.name, filter.values.join(",")))
            .collect();
        f.write_str(&rendered.join(" "))
    }
}

fn json_values(value: &serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Array(items) => items.iter().flat_map(json_values).collect(),
        serde_json::Value::Null => Vec::new(),
        serde_json::Value::String(s) => vec![s.clone()],
        other => vec![other.to_string()],
    }
}

/// Translate a provider glob (`*` any run, `?` one char) into an anchored
/// regex.
fn glob_regex(pattern: &str) -> Option<Regex> {
    let mut translated = String::with_capacity(pattern.len() + 8);
    translated.push_str("^(?s:");
    let mut literal = String::new();
    for ch in pattern.chars() {
        match ch {
            '*' | '?' => {
                translated.push_str(&regex::escape(&literal));
                literal.clear();
                translated.push_str(if ch == '*' { ".*" } else { "." });
            }
            other => literal.push(other),
        }
    }
    translated.push_str(&regex::escape(&literal));
    translated.push_str(")$");
    Regex::new(&translated).ok()
}

#[cfg(test)]
mod tests {
    use super::{Filter, SearchQuery, glob_regex};
    use crate::cloud::ImageCandidate;
    use serde_json::json;

    fn centos() -> ImageCandidate {
        ImageCandidate::new("ami-1", "CentOS Linux 7.1 x86_64 HVM")
            .with_architecture("x86_64")
            .with_owner(None, Some("aws-marketplace"))
            .with_root_device("/dev/sda1", "ebs", Some("gp2"))
            .with_virtualization_type("hvm")
    }

    #[test]
    fn glob_star_and_question_mark() {
        let re = glob_regex("CentOS Linux 7.?*").unwrap();
        assert!(re.is_match("CentOS Linux 7.1 x86_64"));
        assert!(!re.is_match("CentOS Linux 7"));
        assert!(!re.is_match("xCentOS Linux 7.1"));
    }

    #[test]
    fn glob_escapes_regex_metacharacters() {
        let re = glob_regex("FreeBSD/EC2 10.1*-RELEASE*").unwrap();
        assert!(re.is_match("FreeBSD/EC2 10.1-RELEASE-amd64"));
        assert!(!re.is_match("FreeBSD/EC2 1021-RELEASE"));
    }

    #[test]
    fn query_ands_filters_and_ors_values() {
        let query = SearchQuery::new()
            .filter("owner-alias", "aws-marketplace")
            .filter_values("architecture", ["i386", "x86_64"])
            .filter("name", "CentOS Linux 7.1*");
        assert!(query.matches(&centos()));

        let wrong_owner = SearchQuery::new().filter("owner-id", "309956199498");
        assert!(!wrong_owner.matches(&centos()));
    }

    #[test]
    fn volume_type_filter_looks_at_all_mappings() {
        let query = SearchQuery::new().filter("block-device-mapping.volume-type", "gp2");
        assert!(query.matches(&centos()));
    }

    #[test]
    fn globs_are_case_sensitive() {
        let query = SearchQuery::new().filter("name", "centos linux 7*");
        assert!(!query.matches(&centos()));
        assert!(SearchQuery::new().filter("name", "CentOS Linux 7*").matches(&centos()));
    }

    #[test]
    fn compiled_matcher_is_reused_across_images() {
        let matcher = SearchQuery::new()
            .filter("name", "CentOS Linux 7*")
            .filter("owner-alias", "aws-marketplace")
            .matcher();
        let other_owner = ImageCandidate::new("ami-2", "CentOS Linux 7.2")
            .with_owner(Some("123456789012"), None);
        let other_name = ImageCandidate::new("ami-3", "CentOS-6.5-GA")
            .with_owner(None, Some("aws-marketplace"));

        assert!(matcher.matches(&centos()));
        assert!(!matcher.matches(&other_owner));
        assert!(!matcher.matches(&other_name));
    }

    #[test]
    fn unknown_filter_matches_nothing() {
        let filter = Filter::new("hypervisor", ["xen"]);
        assert!(!filter.matches(&centos()));
    }

    #[test]
    fn with_architecture_skips_absent() {
        let query = SearchQuery::new().filter("name", "x").with_architecture(None);
        assert_eq!(query.filters().len(), 1);
    }

    #[test]
    fn from_json_object_stringifies_and_keeps_order() {
        let value = json!({ "name": "SuperImage", "architecture": ["x86_64", "i386"], "owner-id": 99 });
        let query = SearchQuery::from_json_object(value.as_object().unwrap());

        assert_eq!(
            query,
            SearchQuery::new()
                .filter("name", "SuperImage")
                .filter_values("architecture", ["x86_64", "i386"])
                .filter("owner-id", "99")
        );
    }

    #[test]
    fn serializes_in_provider_shape() {
        let query = SearchQuery::new().filter("name", "SuperImage");
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!([{ "Name": "name", "Values": ["SuperImage"] }])
        );
    }
}
