use crate::app::ports::{CatalogPort, CatalogRequest};
use crate::config::Config;
use crate::error::{KinoError, Result};
use crate::observability::metrics;
use crate::releases::{assemble, month_buckets, plan_queries, years_in, BoundaryMonths, PlanSettings};
use crate::types::{CatalogPage, DateRange, RawCatalogItem, ReleasesResponse};
use chrono::{Datelike, NaiveDate};
use futures::future::try_join_all;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone)]
pub struct ReleaseSettings {
    pub max_pages: u32,
    pub max_range_years: u32,
    pub boundary: BoundaryMonths,
    pub plan: PlanSettings,
    pub default_start: NaiveDate,
    pub default_end: NaiveDate,
}

impl ReleaseSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_pages: config.releases.max_pages.max(1),
            max_range_years: config.releases.max_range_years.max(1),
            boundary: config.releases.boundary_months,
            plan: PlanSettings {
                language: config.tmdb.language.clone(),
                original_language: config.tmdb.original_language.clone(),
                release_types: config.releases.release_types.clone(),
            },
            default_start: config.releases.default_start_date,
            default_end: config.releases.default_end_date,
        }
    }
}

impl Default for ReleaseSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Aggregates every catalog release inside a date window.
///
/// All upstream queries run concurrently; the first failure cancels the rest
/// and fails the whole aggregation. No partial results are returned.
pub struct ReleasesUseCase {
    catalog: Arc<dyn CatalogPort>,
    settings: ReleaseSettings,
}

impl ReleasesUseCase {
    pub fn new(catalog: Arc<dyn CatalogPort>, settings: ReleaseSettings) -> Self {
        Self { catalog, settings }
    }

    /// Parse optional `start_date`/`end_date` strings against the defaults.
    ///
    /// Ranges touching more than `max_range_years` calendar years are refused,
    /// since every month in the range costs three upstream queries.
    pub fn resolve_range(&self, start: Option<&str>, end: Option<&str>) -> Result<DateRange> {
        let range =
            DateRange::from_params(start, end, self.settings.default_start, self.settings.default_end)?;
        let years = (range.end.year() - range.start.year() + 1) as u32;
        if years > self.settings.max_range_years {
            return Err(KinoError::BadRequest(format!(
                "date range spans {} years, at most {} allowed",
                years, self.settings.max_range_years
            )));
        }
        Ok(range)
    }

    /// Resolve optional bounds and aggregate in one go.
    pub async fn releases_between(
        &self,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<ReleasesResponse> {
        let range = self.resolve_range(start, end)?;
        self.releases(range).await
    }

    #[instrument(skip(self), fields(start = %range.start, end = %range.end))]
    pub async fn releases(&self, range: DateRange) -> Result<ReleasesResponse> {
        let buckets = month_buckets(&range, self.settings.boundary);
        let years = years_in(&range);
        let requests = plan_queries(&buckets, &years, &self.settings.plan);
        info!(
            months = buckets.len(),
            years = years.len(),
            queries = requests.len(),
            "Fetching releases"
        );
        metrics::releases::queries_planned(requests.len());

        let pages = try_join_all(requests.iter().map(|r| self.fetch_all_pages(r))).await?;
        let raw: Vec<RawCatalogItem> = pages.into_iter().flatten().collect();
        metrics::releases::items_fetched(raw.len());

        let (results, stats) = assemble(raw, &range);
        metrics::releases::duplicates_dropped(stats.duplicates);
        metrics::releases::results(results.len());
        info!(
            fetched = stats.fetched,
            unresolved = stats.unresolved,
            out_of_range = stats.out_of_range,
            duplicates = stats.duplicates,
            results = results.len(),
            "Releases assembled"
        );

        Ok(ReleasesResponse::single_page(results))
    }

    /// Page 1 first to learn the page count, then the remaining capped pages
    /// concurrently.
    async fn fetch_all_pages(&self, request: &CatalogRequest) -> Result<Vec<RawCatalogItem>> {
        let first = self.fetch_page(request, 1).await?;
        let last_page = first.total_pages.min(self.settings.max_pages);
        debug!(
            path = %request.path,
            total_pages = first.total_pages,
            fetching = last_page.max(1),
            "First page fetched"
        );

        let mut items = parse_items(first.results);
        if last_page > 1 {
            let rest = try_join_all((2..=last_page).map(|page| self.fetch_page(request, page))).await?;
            for page in rest {
                items.extend(parse_items(page.results));
            }
        }
        Ok(items)
    }

    async fn fetch_page(&self, request: &CatalogRequest, page: u32) -> Result<CatalogPage<Value>> {
        let body = self.catalog.fetch(&request.with_page(page)).await?;
        Ok(serde_json::from_value(body)?)
    }
}

/// Items that do not even carry an id are skipped rather than failing the page.
fn parse_items(values: Vec<Value>) -> Vec<RawCatalogItem> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<RawCatalogItem>(value) {
            Ok(item) => Some(item),
            Err(e) => {
                warn!("Skipping malformed catalog item: {}", e);
                None
            }
        })
        .collect()
}
