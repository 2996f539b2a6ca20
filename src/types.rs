use crate::constants::DATE_FORMAT;
use crate::error::{KinoError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Inclusive calendar-day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(KinoError::BadRequest(format!(
                "start_date {} is after end_date {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Build a range from optional query strings, falling back to defaults.
    pub fn from_params(
        start: Option<&str>,
        end: Option<&str>,
        default_start: NaiveDate,
        default_end: NaiveDate,
    ) -> Result<Self> {
        let start = match start.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => parse_param_date("start_date", s)?,
            None => default_start,
        };
        let end = match end.map(str::trim).filter(|s| !s.is_empty()) {
            Some(s) => parse_param_date("end_date", s)?,
            None => default_end,
        };
        Self::new(start, end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

fn parse_param_date(name: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        KinoError::BadRequest(format!("{name} must be a YYYY-MM-DD date, got '{value}'"))
    })
}

/// One calendar month, possibly clipped to the requested range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthBucket {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// One page of an upstream list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogPage<T> {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u64,
}

/// A movie record as the catalog returns it. Only the fields the
/// aggregator reasons about are typed; the rest ride along untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct RawCatalogItem {
    pub id: u64,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub original_title: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub release_date: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub primary_release_date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Upstream sends `""` for unknown dates; treat it like null.
fn blank_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// A raw item with its effective release date resolved.
#[derive(Debug, Clone)]
pub struct NormalizedItem {
    pub raw: RawCatalogItem,
    pub title: String,
    pub normalized_release_date: NaiveDate,
}

/// What the releases endpoint returns for each movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseItem {
    pub id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    pub release_date: NaiveDate,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<NormalizedItem> for ReleaseItem {
    fn from(item: NormalizedItem) -> Self {
        Self {
            id: item.raw.id,
            title: item.title,
            original_title: item.raw.original_title,
            release_date: item.normalized_release_date,
            extra: item.raw.extra,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleasesResponse {
    pub results: Vec<ReleaseItem>,
    pub total_results: usize,
    pub total_pages: u32,
}

impl ReleasesResponse {
    pub fn single_page(results: Vec<ReleaseItem>) -> Self {
        Self {
            total_results: results.len(),
            total_pages: 1,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_range_defaults() {
        let range =
            DateRange::from_params(None, Some(""), date("2023-01-01"), date("2030-12-31")).unwrap();
        assert_eq!(range.start, date("2023-01-01"));
        assert_eq!(range.end, date("2030-12-31"));
    }

    #[test]
    fn test_range_rejects_inverted_and_malformed() {
        let defaults = (date("2023-01-01"), date("2030-12-31"));
        let inverted =
            DateRange::from_params(Some("2024-02-01"), Some("2024-01-01"), defaults.0, defaults.1);
        assert!(matches!(inverted, Err(KinoError::BadRequest(_))));

        let malformed = DateRange::from_params(Some("01/02/2024"), None, defaults.0, defaults.1);
        assert!(matches!(malformed, Err(KinoError::BadRequest(_))));
    }

    #[test]
    fn test_raw_item_blank_dates_are_none() {
        let item: RawCatalogItem = serde_json::from_value(json!({
            "id": 42,
            "title": "Dune",
            "release_date": "",
            "poster_path": "/dune.jpg"
        }))
        .unwrap();
        assert_eq!(item.release_date, None);
        assert_eq!(item.primary_release_date, None);
        assert_eq!(item.extra["poster_path"], "/dune.jpg");
    }

    #[test]
    fn test_release_item_exposes_single_date() {
        let raw: RawCatalogItem = serde_json::from_value(json!({
            "id": 7,
            "title": "Arrival",
            "release_date": "2024-05-02",
            "primary_release_date": "2024-03-01",
            "vote_average": 7.6
        }))
        .unwrap();
        let item = ReleaseItem::from(NormalizedItem {
            raw,
            title: "Arrival".into(),
            normalized_release_date: date("2024-03-01"),
        });
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["release_date"], "2024-03-01");
        assert!(value.get("primary_release_date").is_none());
        assert_eq!(value["vote_average"], 7.6);
    }
}
