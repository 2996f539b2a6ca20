//! Prometheus metrics for upstream traffic and release aggregation.
//!
//! Recording is always safe: without an installed recorder the `metrics`
//! macros are no-ops, so library code and tests never need to initialize it.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fmt;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    UpstreamRequestsSuccess,
    UpstreamRequestsError,
    UpstreamRequestDuration,
    ReleasesQueriesPlanned,
    ReleasesItemsFetched,
    ReleasesDuplicatesDropped,
    ReleasesResults,
    NotificationsCreated,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::UpstreamRequestsSuccess => "kino_upstream_requests_success_total",
            MetricName::UpstreamRequestsError => "kino_upstream_requests_error_total",
            MetricName::UpstreamRequestDuration => "kino_upstream_request_duration_seconds",
            MetricName::ReleasesQueriesPlanned => "kino_releases_queries_planned",
            MetricName::ReleasesItemsFetched => "kino_releases_items_fetched",
            MetricName::ReleasesDuplicatesDropped => "kino_releases_duplicates_dropped_total",
            MetricName::ReleasesResults => "kino_releases_results",
            MetricName::NotificationsCreated => "kino_notifications_created_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Install the Prometheus recorder and return the handle used to render it.
pub fn init() -> Result<PrometheusHandle, Box<dyn std::error::Error + Send + Sync>> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;
    info!("Metrics recorder installed");
    Ok(handle)
}

pub mod upstream {
    use super::MetricName;

    pub fn request_success(path: &str) {
        ::metrics::counter!(MetricName::UpstreamRequestsSuccess.as_str(), "path" => path.to_string())
            .increment(1);
    }

    pub fn request_error(path: &str) {
        ::metrics::counter!(MetricName::UpstreamRequestsError.as_str(), "path" => path.to_string())
            .increment(1);
    }

    pub fn request_duration(secs: f64) {
        ::metrics::histogram!(MetricName::UpstreamRequestDuration.as_str()).record(secs);
    }
}

pub mod releases {
    use super::MetricName;

    pub fn queries_planned(count: usize) {
        ::metrics::histogram!(MetricName::ReleasesQueriesPlanned.as_str()).record(count as f64);
    }

    pub fn items_fetched(count: usize) {
        ::metrics::histogram!(MetricName::ReleasesItemsFetched.as_str()).record(count as f64);
    }

    pub fn duplicates_dropped(count: usize) {
        ::metrics::counter!(MetricName::ReleasesDuplicatesDropped.as_str()).increment(count as u64);
    }

    pub fn results(count: usize) {
        ::metrics::histogram!(MetricName::ReleasesResults.as_str()).record(count as f64);
    }
}

pub mod notifications {
    use super::MetricName;

    pub fn created() {
        ::metrics::counter!(MetricName::NotificationsCreated.as_str()).increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_are_prefixed() {
        let all = [
            MetricName::UpstreamRequestsSuccess,
            MetricName::UpstreamRequestsError,
            MetricName::UpstreamRequestDuration,
            MetricName::ReleasesQueriesPlanned,
            MetricName::ReleasesItemsFetched,
            MetricName::ReleasesDuplicatesDropped,
            MetricName::ReleasesResults,
            MetricName::NotificationsCreated,
        ];
        for name in all {
            assert!(name.as_str().starts_with("kino_"));
            assert_eq!(name.to_string(), name.as_str());
        }
    }

    #[test]
    fn test_recording_without_recorder() {
        upstream::request_success("/discover/movie");
        releases::results(3);
    }
}
