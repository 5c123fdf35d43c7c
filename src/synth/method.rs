//! A request wrapped for code generation

use tracing::warn;

use crate::case::snake_case;
use crate::request::{Request, StringMap, Url};
use crate::strings::is_identifier;

use super::class::Class;

const FALLBACK_NAME: &str = "request";

/// One generated method
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    /// Python identifier, unique within the owning class
    pub name: String,
    pub request: Request,
    /// Name of the owning [`Class`]
    class_name: String,
}

impl Method {
    pub fn new(request: Request, class_name: &str) -> Self {
        let name = default_name(&request.url, class_name);
        Self {
            name,
            request,
            class_name: class_name.to_string(),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub(crate) fn set_class_name(&mut self, class_name: &str) {
        self.class_name = class_name.to_string();
    }

    /// Headers not already hoisted into the class's shared headers
    pub fn unshared_headers(&self, class: &Class) -> StringMap {
        debug_assert_eq!(class.name, self.class_name);
        without_keys(&self.request.headers, &class.shared_headers)
    }

    /// Cookies not already hoisted into the class's shared cookies
    pub fn unshared_cookies(&self, class: &Class) -> StringMap {
        debug_assert_eq!(class.name, self.class_name);
        without_keys(&self.request.cookies, &class.shared_cookies)
    }
}

fn without_keys(map: &StringMap, shared: &StringMap) -> StringMap {
    map.iter()
        .filter(|(k, _)| !shared.contains_key(*k))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Last path segment that makes a valid identifier, else the snake-cased class name
///
/// A class name that snake-cases to a keyword (`Is` for `is.gd`) gets a
/// trailing underscore.
pub fn default_name(url: &Url, class_name: &str) -> String {
    for segment in url.segments().rev() {
        let segment = segment.split(';').next().unwrap_or(segment);
        let candidate = snake_case(segment);
        // leading underscores could shadow the generated session attributes
        if is_identifier(&candidate) && !candidate.starts_with('_') {
            return candidate;
        }
    }

    let mut fallback = snake_case(class_name);
    if !is_identifier(&fallback) || fallback.starts_with('_') {
        fallback.push('_');
    }
    if !is_identifier(&fallback) || fallback.starts_with('_') {
        fallback = FALLBACK_NAME.to_string();
    }
    warn!(url = %url, name = %fallback, "No usable path segment, naming method after its class");
    fallback
}
