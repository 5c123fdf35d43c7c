//! Classes group the methods generated for one site

use tracing::debug;

use crate::errors::Result;
use crate::request::StringMap;
use crate::strings::unique_name;

use super::merge_shared;
use super::method::Method;

/// A generated Python class
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Class {
    pub name: String,
    /// In discovery order
    pub methods: Vec<Method>,
    /// Headers every method sends with the same value
    pub shared_headers: StringMap,
    /// Cookies every method sends with the same value
    pub shared_cookies: StringMap,
}

impl Class {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Append a method, renaming on collision and recomputing the shared maps
    pub fn add_method(&mut self, mut method: Method) -> Result<&Method> {
        method.set_class_name(&self.name);
        self.ensure_unique_name(&mut method)?;
        debug!(class = %self.name, method = %method.name, "Adding method");

        self.methods.push(method);
        self.recompute_shared();

        let index = self.methods.len() - 1;
        Ok(&self.methods[index])
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }

    fn ensure_unique_name(&mut self, method: &mut Method) -> Result<()> {
        let name = method.name.clone();
        let prefix = format!("{}_", name);
        let matching: Vec<usize> = self
            .methods
            .iter()
            .enumerate()
            .filter(|(_, m)| m.name == name || m.name.starts_with(&prefix))
            .map(|(i, _)| i)
            .collect();

        match matching.as_slice() {
            [] => {}
            [only] if self.methods[*only].name == name => {
                self.methods[*only].name = format!("{}_one", name);
                method.name = format!("{}_two", name);
            }
            _ => {
                let taken: Vec<&str> = self.methods.iter().map(|m| m.name.as_str()).collect();
                method.name = unique_name(&name, &taken)?;
            }
        }
        Ok(())
    }

    // Always rebuilt from every method's full maps, never from the previous
    // shared set.
    fn recompute_shared(&mut self) {
        let headers: Vec<&StringMap> = self.methods.iter().map(|m| &m.request.headers).collect();
        let cookies: Vec<&StringMap> = self.methods.iter().map(|m| &m.request.cookies).collect();
        self.shared_headers = merge_shared(&headers);
        self.shared_cookies = merge_shared(&cookies);
    }
}
