//! Method and class synthesis
//!
//! Groups parsed requests into one class per site, hoists headers and cookies
//! every method shares, and keeps method names unique within a class.

pub mod class;
pub mod method;

pub use class::Class;
pub use method::Method;

use indexmap::IndexMap;
use tracing::info;

use crate::capture::parse_input;
use crate::case::pascal_case;
use crate::errors::Result;
use crate::request::{Request, StringMap, Url};
use crate::strings::{is_identifier, written_leading_number};

/// Entries present with the same value in every map
///
/// Fewer than two maps share nothing.
pub fn merge_shared(maps: &[&StringMap]) -> StringMap {
    let [first, rest @ ..] = maps else {
        return StringMap::new();
    };
    if rest.is_empty() {
        return StringMap::new();
    }

    first
        .iter()
        .filter(|(k, v)| rest.iter().all(|m| m.get(*k) == Some(*v)))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Class name for a site: `4chan.org` becomes `FourChan`
pub fn class_name_for(url: &Url) -> String {
    class_name_from_label(&url.domain_name)
}

/// Turn an arbitrary label into a PascalCase Python identifier
pub fn class_name_from_label(label: &str) -> String {
    let sanitized: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect();
    let name = pascal_case(&written_leading_number(sanitized.trim_matches('_')));
    if is_identifier(&name) {
        name
    } else {
        "Client".to_string()
    }
}

/// Builds classes from a batch of requests
#[derive(Debug, Default)]
pub struct Synthesizer {
    classes: IndexMap<String, Class>,
    class_name: Option<String>,
}

impl Synthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put every request into a single class with this name
    pub fn with_class_name(name: &str) -> Self {
        Self {
            classes: IndexMap::new(),
            class_name: Some(class_name_from_label(name)),
        }
    }

    /// Wrap a request in a method and add it to its class
    pub fn add_request(&mut self, request: Request) -> Result<&Method> {
        let class_name = self
            .class_name
            .clone()
            .unwrap_or_else(|| class_name_for(&request.url));
        let method = Method::new(request, &class_name);

        let class = self
            .classes
            .entry(class_name.clone())
            .or_insert_with(|| {
                info!(class = %class_name, "Creating class");
                Class::new(class_name.clone())
            });
        class.add_method(method)
    }

    /// Parse a capture and add it; `Ok(None)` when no dialect matches
    pub fn add_text(&mut self, text: &str) -> Result<Option<&Method>> {
        match parse_input(text) {
            Some(request) => self.add_request(request).map(Some),
            None => Ok(None),
        }
    }

    pub fn classes(&self) -> impl Iterator<Item = &Class> {
        self.classes.values()
    }

    pub fn class(&self, name: &str) -> Option<&Class> {
        self.classes.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn into_classes(self) -> Vec<Class> {
        self.classes.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> StringMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_merge_shared() {
        assert!(merge_shared(&[&map(&[("a", "a")]), &map(&[("a", "b")])]).is_empty());
        assert_eq!(
            merge_shared(&[&map(&[("a", "a")]), &map(&[("a", "a")])]),
            map(&[("a", "a")])
        );
        assert!(merge_shared(&[&map(&[("a", "a")])]).is_empty());
        assert!(merge_shared(&[]).is_empty());
    }

    #[test]
    fn test_class_names() {
        let url = |u: &str| Url::parse(u).unwrap();
        assert_eq!(class_name_for(&url("https://httpbin.org/get")), "Httpbin");
        assert_eq!(class_name_for(&url("https://www.4chan.org/")), "FourChan");
        assert_eq!(class_name_for(&url("https://dev-api.impb.in/v1")), "Impb");
        assert_eq!(class_name_for(&url("https://my-site.com/")), "MySite");
        assert_eq!(class_name_for(&url("http://localhost:8000/")), "Localhost");
        assert_eq!(class_name_for(&url("http://[::1]/")), "One");
    }

    #[test]
    fn test_groups_by_site() {
        let mut synth = Synthesizer::new();
        for url in ["https://httpbin.org/get", "https://example.com/a", "https://httpbin.org/post"] {
            synth.add_request(Request::new("GET", Url::parse(url).unwrap())).unwrap();
        }
        let names: Vec<&str> = synth.classes().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Httpbin", "Example"]);
        assert_eq!(synth.class("Httpbin").unwrap().methods.len(), 2);
    }

    #[test]
    fn test_class_name_override() {
        let mut synth = Synthesizer::with_class_name("my-api");
        synth.add_request(Request::new("GET", Url::parse("https://a.io/x").unwrap())).unwrap();
        synth.add_request(Request::new("GET", Url::parse("https://b.io/y").unwrap())).unwrap();
        let classes = synth.into_classes();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].name, "MyApi");
        assert_eq!(classes[0].methods[1].class_name(), "MyApi");
    }

    #[test]
    fn test_add_text_no_match() {
        let mut synth = Synthesizer::new();
        assert!(synth.add_text("hello").unwrap().is_none());
        assert!(synth.is_empty());
    }
}
