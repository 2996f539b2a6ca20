use crate::constants;
use crate::error::{KinoError, Result};
use crate::releases::BoundaryMonths;
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tmdb: TmdbConfig,
    pub server: ServerConfig,
    pub releases: ReleasesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TmdbConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub language: String,
    pub original_language: String,
    pub timeout_seconds: Option<u64>,
    pub max_concurrency: Option<u32>,
    pub requests_per_min: Option<u64>,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: constants::DEFAULT_TMDB_BASE_URL.to_string(),
            language: constants::DEFAULT_LANGUAGE.to_string(),
            original_language: constants::DEFAULT_ORIGINAL_LANGUAGE.to_string(),
            timeout_seconds: None,
            max_concurrency: None,
            requests_per_min: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
    pub notification_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: constants::DEFAULT_PORT,
            notification_capacity: constants::DEFAULT_NOTIFICATION_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReleasesConfig {
    pub max_pages: u32,
    pub max_range_years: u32,
    pub default_start_date: NaiveDate,
    pub default_end_date: NaiveDate,
    pub release_types: String,
    pub boundary_months: BoundaryMonths,
}

impl Default for ReleasesConfig {
    fn default() -> Self {
        Self {
            max_pages: constants::DEFAULT_MAX_PAGES,
            max_range_years: constants::DEFAULT_MAX_RANGE_YEARS,
            default_start_date: builtin_date(constants::DEFAULT_START_DATE),
            default_end_date: builtin_date(constants::DEFAULT_END_DATE),
            release_types: constants::DEFAULT_RELEASE_TYPES.to_string(),
            boundary_months: BoundaryMonths::Clip,
        }
    }
}

impl Config {
    /// Load the TOML file when present, then apply environment overrides.
    pub fn load_from(config_path: impl AsRef<Path>) -> Result<Self> {
        dotenv::dotenv().ok();

        let path = config_path.as_ref();
        let mut config = if path.exists() {
            let config_content = fs::read_to_string(path).map_err(|e| {
                KinoError::Config(format!(
                    "Failed to read config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
            info!("Loaded configuration from {}", path.display());
            toml::from_str(&config_content)?
        } else {
            debug!("No config file at {}, using defaults", path.display());
            Config::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields from environment-style lookups.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("TMDB_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.tmdb.api_key = Some(key);
        }
        if let Some(url) = lookup("TMDB_BASE_URL") {
            self.tmdb.base_url = url;
        }
        if let Some(language) = lookup("TMDB_LANGUAGE") {
            self.tmdb.language = language;
        }
        if let Some(language) = lookup("TMDB_ORIGINAL_LANGUAGE") {
            self.tmdb.original_language = language;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = parse_var("PORT", &port)?;
        }
        if let Some(pages) = lookup("KINO_MAX_PAGES") {
            self.releases.max_pages = parse_var("KINO_MAX_PAGES", &pages)?;
        }
        if let Some(years) = lookup("KINO_MAX_RANGE_YEARS") {
            self.releases.max_range_years = parse_var("KINO_MAX_RANGE_YEARS", &years)?;
        }
        if let Some(concurrency) = lookup("KINO_MAX_CONCURRENCY") {
            self.tmdb.max_concurrency = Some(parse_var("KINO_MAX_CONCURRENCY", &concurrency)?);
        }
        if let Some(rpm) = lookup("KINO_REQUESTS_PER_MIN") {
            self.tmdb.requests_per_min = Some(parse_var("KINO_REQUESTS_PER_MIN", &rpm)?);
        }
        if let Some(timeout) = lookup("KINO_REQUEST_TIMEOUT_SECS") {
            self.tmdb.timeout_seconds = Some(parse_var("KINO_REQUEST_TIMEOUT_SECS", &timeout)?);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.releases.max_pages == 0 {
            return Err(KinoError::Config("max_pages must be at least 1".into()));
        }
        if self.releases.max_range_years == 0 {
            return Err(KinoError::Config("max_range_years must be at least 1".into()));
        }
        if self.releases.default_start_date > self.releases.default_end_date {
            return Err(KinoError::Config(
                "default_start_date must not be after default_end_date".into(),
            ));
        }
        if self.tmdb.base_url.trim().is_empty() {
            return Err(KinoError::Config("TMDB base URL is empty".into()));
        }
        Ok(())
    }
}

fn builtin_date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, constants::DATE_FORMAT).unwrap_or(NaiveDate::MIN)
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| KinoError::Config(format!("Invalid value for {name}: '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.tmdb.base_url, "https://api.themoviedb.org/3");
        assert_eq!(config.tmdb.language, "ru-RU");
        assert_eq!(config.tmdb.original_language, "en");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.releases.max_pages, 5);
        assert_eq!(config.releases.default_start_date.to_string(), "2023-01-01");
        assert_eq!(config.releases.default_end_date.to_string(), "2030-12-31");
        assert!(config.tmdb.api_key.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(env(&[
                ("TMDB_API_KEY", "secret"),
                ("PORT", "8080"),
                ("KINO_MAX_PAGES", "2"),
                ("KINO_MAX_CONCURRENCY", "16"),
                ("KINO_MAX_RANGE_YEARS", "3"),
            ]))
            .unwrap();
        assert_eq!(config.tmdb.api_key.as_deref(), Some("secret"));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.releases.max_pages, 2);
        assert_eq!(config.tmdb.max_concurrency, Some(16));
        assert_eq!(config.releases.max_range_years, 3);
        assert_eq!(config.tmdb.requests_per_min, None);
    }

    #[test]
    fn test_invalid_env_value() {
        let mut config = Config::default();
        let err = config.apply_env(env(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, KinoError::Config(_)));
    }

    #[test]
    fn test_zero_pages_rejected() {
        let mut config = Config::default();
        config.releases.max_pages = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.releases.max_range_years = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[tmdb]
language = "en-US"

[releases]
max_pages = 3
default_start_date = "2024-01-01"
boundary_months = "full_only"
"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.tmdb.language, "en-US");
        assert_eq!(config.tmdb.original_language, "en");
        assert_eq!(config.releases.max_pages, 3);
        assert_eq!(config.releases.default_start_date.to_string(), "2024-01-01");
        assert_eq!(config.releases.default_end_date.to_string(), "2030-12-31");
        assert_eq!(config.releases.boundary_months, BoundaryMonths::FullOnly);
    }
}
