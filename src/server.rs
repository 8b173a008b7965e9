use crate::config::AppConfig;
use crate::controller::{Dashboard, DashboardError};
use crate::data::Dataset;
use crate::fullscreen::StaticHost;
use crate::render::{dashboard_view, feature_collection, DashboardView};
use crate::selection::SelectError;
use crate::state::{DashboardState, Snapshot};
use crate::types::{Category, RecordId, RecordView, UnknownCategory};
use crate::view::ViewMode;
use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use geo::Point;
use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

pub struct AppState {
    pub dashboard: Dashboard,
    pub host: Arc<StaticHost>,
    pub config: AppConfig,
}

impl AppState {
    /// Start a dashboard controller with the config's initial view and host policy.
    pub fn new(config: AppConfig, dataset: Arc<Dataset>) -> Arc<Self> {
        let host = Arc::new(StaticHost::new(config.fullscreen.supported));
        let initial = DashboardState::new(ViewMode::new(config.view.chart, config.view.tile_layer));
        let dashboard = Dashboard::spawn(dataset, initial, host.clone());
        Arc::new(Self {
            dashboard,
            host,
            config,
        })
    }

    fn dataset(&self) -> &Dataset {
        self.dashboard.dataset()
    }
}

#[derive(Deserialize)]
pub struct QueryParams {
    lat: f64,
    lon: f64,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

pub struct ApiError(StatusCode, String);

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        let status = match &err {
            DashboardError::Select(SelectError::UnknownRecord(_)) => StatusCode::NOT_FOUND,
            DashboardError::Select(SelectError::NotVisible(_)) => StatusCode::CONFLICT,
            DashboardError::Closed => StatusCode::SERVICE_UNAVAILABLE,
        };
        ApiError(status, err.to_string())
    }
}

impl From<UnknownCategory> for ApiError {
    fn from(err: UnknownCategory) -> Self {
        ApiError(StatusCode::BAD_REQUEST, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(ErrorBody { error: self.1 })).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/api/state", get(state_handler))
        .route("/api/view", get(view_handler))
        .route("/api/features", get(features_handler))
        .route("/api/query", get(query_handler))
        .route("/api/filter/:category", post(filter_handler))
        .route("/api/select/:id", post(select_handler))
        .route("/api/deselect", post(deselect_handler))
        .route("/api/chart/toggle", post(chart_handler))
        .route("/api/layer/toggle", post(layer_handler))
        .route("/api/fullscreen/toggle", post(fullscreen_handler))
        .route("/api/fullscreen/exited", post(fullscreen_exited_handler))
        .route("/api/notice/dismiss", post(dismiss_handler));

    let app = match &state.config.server.static_dir {
        Some(dir) => api.fallback_service(ServeDir::new(dir)),
        None => api,
    };

    app.layer(CorsLayer::permissive()).with_state(state)
}

pub async fn start_server(config: AppConfig, dataset: Arc<Dataset>) -> Result<()> {
    let port = config.server.port;
    let state = AppState::new(config, dataset);
    let app = router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn state_handler(State(state): State<Arc<AppState>>) -> ApiResult<Snapshot> {
    Ok(Json(state.dashboard.snapshot().await?))
}

async fn view_handler(State(state): State<Arc<AppState>>) -> ApiResult<DashboardView> {
    let snapshot = state.dashboard.snapshot().await?;
    Ok(Json(dashboard_view(&state.config, state.dataset().bounds(), &snapshot)))
}

async fn features_handler(State(state): State<Arc<AppState>>) -> ApiResult<FeatureCollection> {
    let snapshot = state.dashboard.snapshot().await?;
    Ok(Json(feature_collection(&snapshot)))
}

/// Resolve a map click to the nearest visible marker.
async fn query_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryParams>,
) -> ApiResult<Option<RecordView>> {
    let snapshot = state.dashboard.snapshot().await?;
    let point = Point::new(params.lon, params.lat);
    let hit = state
        .dataset()
        .nearest_where(point, state.config.query.max_distance_deg, |r| {
            snapshot.filter.is_visible(r)
        })
        .map(RecordView::from);
    Ok(Json(hit))
}

async fn filter_handler(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> ApiResult<Snapshot> {
    let category: Category = category.parse()?;
    Ok(Json(state.dashboard.set_filter(category).await?))
}

async fn select_handler(State(state): State<Arc<AppState>>, Path(id): Path<u32>) -> ApiResult<Snapshot> {
    Ok(Json(state.dashboard.select(RecordId(id)).await?))
}

async fn deselect_handler(State(state): State<Arc<AppState>>) -> ApiResult<Snapshot> {
    Ok(Json(state.dashboard.deselect().await?))
}

async fn chart_handler(State(state): State<Arc<AppState>>) -> ApiResult<Snapshot> {
    Ok(Json(state.dashboard.toggle_chart_kind().await?))
}

async fn layer_handler(State(state): State<Arc<AppState>>) -> ApiResult<Snapshot> {
    Ok(Json(state.dashboard.toggle_tile_layer().await?))
}

async fn fullscreen_handler(State(state): State<Arc<AppState>>) -> ApiResult<Snapshot> {
    Ok(Json(state.dashboard.toggle_fullscreen().await?))
}

/// The browser left fullscreen without going through the dashboard.
async fn fullscreen_exited_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    state.host.notify_exited();
    StatusCode::ACCEPTED
}

async fn dismiss_handler(State(state): State<Arc<AppState>>) -> ApiResult<Snapshot> {
    Ok(Json(state.dashboard.dismiss_notice().await?))
}
