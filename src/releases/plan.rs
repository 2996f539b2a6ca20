use crate::app::ports::CatalogRequest;
use crate::constants::{DATE_FORMAT, DISCOVER_MOVIE_PATH, UPCOMING_MOVIE_PATH};
use crate::types::MonthBucket;

/// Filters applied to every discover query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSettings {
    pub language: String,
    pub original_language: String,
    pub release_types: String,
}

/// The three per-month ways of asking the catalog for releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    PrimaryReleaseDate,
    ReleaseDate,
    ReleaseTypes,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [
        Strategy::PrimaryReleaseDate,
        Strategy::ReleaseDate,
        Strategy::ReleaseTypes,
    ];

    pub fn request(&self, bucket: &MonthBucket, settings: &PlanSettings) -> CatalogRequest {
        let gte = bucket.start.format(DATE_FORMAT).to_string();
        let lte = bucket.end.format(DATE_FORMAT).to_string();
        let base = discover(settings);
        match self {
            Strategy::PrimaryReleaseDate => base
                .param("primary_release_date.gte", gte)
                .param("primary_release_date.lte", lte)
                .param("sort_by", "primary_release_date.asc"),
            Strategy::ReleaseDate => base
                .param("release_date.gte", gte)
                .param("release_date.lte", lte)
                .param("sort_by", "release_date.asc"),
            Strategy::ReleaseTypes => base
                .param("release_date.gte", gte)
                .param("release_date.lte", lte)
                .param("with_release_type", &settings.release_types),
        }
    }
}

fn discover(settings: &PlanSettings) -> CatalogRequest {
    CatalogRequest::new(DISCOVER_MOVIE_PATH)
        .param("language", &settings.language)
        .param("with_original_language", &settings.original_language)
        .param("include_adult", false)
}

/// Every upstream query needed to cover the given months and years:
/// three strategies per month, one unsorted query per year, one upcoming.
pub fn plan_queries(
    buckets: &[MonthBucket],
    years: &[i32],
    settings: &PlanSettings,
) -> Vec<CatalogRequest> {
    let mut requests: Vec<CatalogRequest> = buckets
        .iter()
        .flat_map(move |bucket| Strategy::ALL.into_iter().map(move |s| s.request(bucket, settings)))
        .collect();

    requests.extend(
        years
            .iter()
            .map(|year| discover(settings).param("primary_release_year", year)),
    );

    requests.push(CatalogRequest::new(UPCOMING_MOVIE_PATH).param("language", &settings.language));
    requests
}
