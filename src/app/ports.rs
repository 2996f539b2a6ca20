use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// An outbound catalog call: an upstream path plus its query parameters.
///
/// Credentials and the base URL are attached by the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRequest {
    pub path: String,
    pub params: Vec<(String, String)>,
}

impl CatalogRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    /// Replace any existing value for `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self.params.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => self.params.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn with_page(&self, page: u32) -> Self {
        let mut request = self.clone();
        request.set("page", page);
        request
    }
}

#[async_trait]
pub trait CatalogPort: Send + Sync {
    async fn fetch(&self, request: &CatalogRequest) -> Result<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_value() {
        let request = CatalogRequest::new("/discover/movie")
            .param("language", "ru-RU")
            .param("page", 1);
        let second = request.with_page(2);
        assert_eq!(request.get("page"), Some("1"));
        assert_eq!(second.get("page"), Some("2"));
        assert_eq!(second.params.len(), 2);
    }
}
