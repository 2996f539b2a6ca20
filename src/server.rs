use crate::app::{BrowseUseCase, CatalogPort, ReleasesUseCase};
use crate::app::releases_use_case::ReleaseSettings;
use crate::config::Config;
use crate::error::{ApiError, KinoError};
use crate::notifications::{NewNotification, Notification, NotificationStore};
use crate::types::ReleasesResponse;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get},
    Json, Router,
};
use hyper::Server;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

const RELEASES_ERROR: &str = "Failed to fetch movie releases";

/// Everything the handlers share.
#[derive(Clone)]
pub struct AppState {
    pub releases: Arc<ReleasesUseCase>,
    pub browse: Arc<BrowseUseCase>,
    pub notifications: NotificationStore,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(catalog: Arc<dyn CatalogPort>, config: &Config) -> Self {
        Self {
            releases: Arc::new(ReleasesUseCase::new(
                catalog.clone(),
                ReleaseSettings::from_config(config),
            )),
            browse: Arc::new(BrowseUseCase::new(catalog, config.tmdb.language.clone())),
            notifications: NotificationStore::new(config.server.notification_capacity),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

#[derive(Debug, Deserialize)]
pub struct ReleasesParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "kino-releases",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn releases(
    State(state): State<AppState>,
    params: Result<Query<ReleasesParams>, QueryRejection>,
) -> Result<Json<ReleasesResponse>, ApiError> {
    let Query(params) = params?;
    let range = state
        .releases
        .resolve_range(params.start_date.as_deref(), params.end_date.as_deref())?;
    let response = state
        .releases
        .releases(range)
        .await
        .map_err(|e| ApiError::internal(RELEASES_ERROR, e))?;
    Ok(Json(response))
}

async fn discover(
    State(state): State<AppState>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(params) = params?;
    Ok(Json(state.browse.discover(params).await?))
}

async fn search_movies(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(params) = params?;
    let body = state
        .browse
        .search_movies(params.query.as_deref(), params.page.as_deref())
        .await?;
    Ok(Json(body))
}

async fn popular_actors(
    State(state): State<AppState>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(params) = params?;
    Ok(Json(state.browse.popular_actors(params.page.as_deref()).await?))
}

async fn search_actors(
    State(state): State<AppState>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(params) = params?;
    let body = state
        .browse
        .search_actors(params.query.as_deref(), params.page.as_deref())
        .await?;
    Ok(Json(body))
}

async fn actor_details(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(id) = id?;
    Ok(Json(state.browse.actor_details(&id).await?))
}

async fn list_notifications(State(state): State<AppState>) -> Json<Vec<Notification>> {
    Json(state.notifications.list().await)
}

async fn create_notification(
    State(state): State<AppState>,
    new: Result<Json<NewNotification>, JsonRejection>,
) -> Result<(StatusCode, Json<Notification>), ApiError> {
    let Json(new) = new?;
    let created = state.notifications.create(new).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn delete_notification(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    let id = Uuid::parse_str(&id)
        .map_err(|_| KinoError::BadRequest(format!("Invalid notification id '{id}'")))?;
    state.notifications.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn render_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(render_metrics))
        .route("/api/movies/releases", get(releases))
        .route("/api/movies/discover", get(discover))
        .route("/api/movies/search", get(search_movies))
        .route("/api/actors", get(popular_actors))
        .route("/api/actors/search", get(search_actors))
        .route("/api/actors/:id", get(actor_details))
        .route(
            "/api/notifications",
            get(list_notifications).post(create_notification),
        )
        .route("/api/notifications/:id", delete(delete_notification))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

/// Start the HTTP server on the specified port
pub async fn start_server(state: AppState, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("HTTP server running on http://localhost:{port}");
    info!("Releases: http://localhost:{port}/api/movies/releases");

    Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
