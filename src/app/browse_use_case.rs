use crate::app::ports::{CatalogPort, CatalogRequest};
use crate::constants::{
    DISCOVER_MOVIE_PATH, MAX_UPSTREAM_PAGE, PERSON_PATH, POPULAR_PERSON_PATH, SEARCH_MOVIE_PATH,
    SEARCH_PERSON_PATH,
};
use crate::error::{KinoError, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

/// Single-call passthroughs to the catalog: discover, search and actors.
pub struct BrowseUseCase {
    catalog: Arc<dyn CatalogPort>,
    language: String,
}

impl BrowseUseCase {
    pub fn new(catalog: Arc<dyn CatalogPort>, language: impl Into<String>) -> Self {
        Self {
            catalog,
            language: language.into(),
        }
    }

    /// Forward caller filters to the discover endpoint.
    #[instrument(skip(self, params))]
    pub async fn discover(&self, params: Vec<(String, String)>) -> Result<Value> {
        let mut request = CatalogRequest::new(DISCOVER_MOVIE_PATH).param("language", &self.language);
        for (key, value) in params {
            if key == "api_key" {
                continue;
            }
            if key == "page" {
                let page = parse_page(Some(&value))?.unwrap_or(1);
                request.set(key, page);
            } else {
                request.set(key, value);
            }
        }
        self.catalog.fetch(&request).await
    }

    #[instrument(skip(self))]
    pub async fn search_movies(&self, query: Option<&str>, page: Option<&str>) -> Result<Value> {
        let request = self.search_request(SEARCH_MOVIE_PATH, query, page)?;
        self.catalog.fetch(&request).await
    }

    #[instrument(skip(self))]
    pub async fn popular_actors(&self, page: Option<&str>) -> Result<Value> {
        let page = parse_page(page)?.unwrap_or(1);
        let request = CatalogRequest::new(POPULAR_PERSON_PATH)
            .param("language", &self.language)
            .param("page", page);
        self.catalog.fetch(&request).await
    }

    #[instrument(skip(self))]
    pub async fn search_actors(&self, query: Option<&str>, page: Option<&str>) -> Result<Value> {
        let request = self.search_request(SEARCH_PERSON_PATH, query, page)?;
        self.catalog.fetch(&request).await
    }

    #[instrument(skip(self))]
    pub async fn actor_details(&self, id: &str) -> Result<Value> {
        let id: u64 = id
            .trim()
            .parse()
            .map_err(|_| KinoError::BadRequest(format!("Invalid actor id '{id}'")))?;
        let request = CatalogRequest::new(format!("{PERSON_PATH}/{id}"))
            .param("language", &self.language)
            .param("append_to_response", "movie_credits");
        self.catalog.fetch(&request).await
    }

    fn search_request(
        &self,
        path: &str,
        query: Option<&str>,
        page: Option<&str>,
    ) -> Result<CatalogRequest> {
        let query = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| KinoError::BadRequest("query parameter is required".into()))?;
        let page = parse_page(page)?.unwrap_or(1);
        Ok(CatalogRequest::new(path)
            .param("language", &self.language)
            .param("query", query)
            .param("include_adult", false)
            .param("page", page))
    }
}

/// A page number within what the catalog accepts. Absent or blank is `None`.
pub fn parse_page(page: Option<&str>) -> Result<Option<u32>> {
    let Some(raw) = page.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<u32>() {
        Ok(n) if (1..=MAX_UPSTREAM_PAGE).contains(&n) => Ok(Some(n)),
        _ => Err(KinoError::BadRequest(format!(
            "page must be an integer between 1 and {MAX_UPSTREAM_PAGE}, got '{raw}'"
        ))),
    }
}
