use crate::app::ports::{CatalogPort, CatalogRequest};
use crate::config::TmdbConfig;
use crate::error::{KinoError, Result};
use crate::infra::rate_limiter::{Limits, UpstreamLimiter};
use crate::observability::metrics;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// reqwest-backed adapter for the TMDB v3 API.
#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    limiter: Option<UpstreamLimiter>,
}

impl TmdbClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            limiter: None,
        }
    }

    pub fn from_config(config: &TmdbConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| KinoError::Config("TMDB_API_KEY is not set".into()))?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        let limits = Limits {
            requests_per_min: config.requests_per_min,
            concurrency: config.max_concurrency,
        };

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            limiter: (!limits.is_unlimited()).then(|| UpstreamLimiter::new(limits)),
        })
    }

    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

/// Map a non-success upstream status to the error the routes report.
pub fn status_error(status: StatusCode, path: &str) -> KinoError {
    if status == StatusCode::NOT_FOUND {
        KinoError::NotFound(format!("{path} not found upstream"))
    } else {
        KinoError::Upstream {
            status: status.as_u16(),
            path: path.to_string(),
        }
    }
}

#[async_trait]
impl CatalogPort for TmdbClient {
    #[instrument(skip(self, request), fields(path = %request.path, page = request.get("page").unwrap_or("-")))]
    async fn fetch(&self, request: &CatalogRequest) -> Result<Value> {
        let _permit = match &self.limiter {
            Some(limiter) => Some(limiter.acquire().await),
            None => None,
        };

        let t0 = Instant::now();
        let outcome = async {
            let resp = self
                .client
                .get(self.url_for(&request.path))
                .query(&[("api_key", self.api_key.as_str())])
                .query(&request.params)
                .send()
                .await?;

            let status = resp.status();
            if !status.is_success() {
                return Err(status_error(status, &request.path));
            }
            let body = resp.json::<Value>().await?;
            Ok::<Value, KinoError>(body)
        }
        .await;
        metrics::upstream::request_duration(t0.elapsed().as_secs_f64());

        match &outcome {
            Ok(_) => {
                metrics::upstream::request_success(&request.path);
                debug!(elapsed_ms = t0.elapsed().as_millis() as u64, "Upstream request succeeded");
            }
            Err(e) => {
                metrics::upstream::request_error(&request.path);
                warn!("Upstream request failed: {}", e);
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_joins_cleanly() {
        let client = TmdbClient::new("https://api.themoviedb.org/3/", "key");
        assert_eq!(
            client.url_for("/discover/movie"),
            "https://api.themoviedb.org/3/discover/movie"
        );
        assert_eq!(client.url_for("movie/upcoming"), "https://api.themoviedb.org/3/movie/upcoming");
    }

    #[test]
    fn test_status_error_mapping() {
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "/person/1"),
            KinoError::NotFound(_)
        ));
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "/discover/movie"),
            KinoError::Upstream { status: 401, .. }
        ));
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = TmdbConfig::default();
        assert!(matches!(TmdbClient::from_config(&config), Err(KinoError::Config(_))));

        let config = TmdbConfig {
            api_key: Some("key".into()),
            max_concurrency: Some(4),
            ..TmdbConfig::default()
        };
        let client = TmdbClient::from_config(&config).unwrap();
        assert!(client.limiter.is_some());
    }
}
