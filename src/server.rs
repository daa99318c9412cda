//! REST API over the assembled report view models.
//!
//! A thin BFF in front of the MEPA backend: payloads are fetched through
//! the tag-invalidated cache, assembled once and served ready to render.
//! Upstream failures map to 502 so callers can tell "still loading" apart
//! from "the fetch failed".

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::config::Config;
use crate::issues::RoutedIssue;
use crate::payload::cache::{CacheTag, PayloadCache};
use crate::payload::fetch::PayloadSource;
use crate::payload::RecommendationSettings;
use crate::report::assembler::build_report;
use crate::report::{ReportViewModel, SummaryView, TariffRowView};

#[derive(Clone)]
struct ApiState {
    config: Config,
    source: Arc<dyn PayloadSource>,
    cache: Arc<PayloadCache>,
    settings: RecommendationSettings,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    ok: bool,
    data: T,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// The upstream payload fetch failed — an explicit error state, never
    /// conflated with a pending load.
    fn bad_gateway(error: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            ok: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<ApiResponse<T>>, ApiError>;

#[derive(Debug, Clone, Default, Deserialize)]
struct ReportQuery {
    consumer_unit: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct InvalidateRequest {
    tags: Vec<CacheTag>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct IssuesResponse {
    consumer_unit: u64,
    issues: Vec<RoutedIssue>,
}

#[derive(Debug, Serialize)]
struct TariffsResponse {
    consumer_unit: u64,
    tariffs: Vec<TariffRowView>,
}

#[derive(Debug, Serialize)]
struct InvalidateResponse {
    dropped: usize,
}

pub async fn run_server(
    config: Config,
    source: Arc<dyn PayloadSource>,
    settings: RecommendationSettings,
    bind: SocketAddr,
) -> Result<()> {
    let state = ApiState {
        config,
        source,
        cache: Arc::new(PayloadCache::new()),
        settings,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(health))
        .route("/v1/report", get(report))
        .route("/v1/summary", get(summary))
        .route("/v1/issues", get(issues))
        .route("/v1/tariffs", get(tariffs))
        .route("/v1/invalidate", post(invalidate))
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("REST API listening on http://{bind}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<ApiResponse<HealthResponse>> {
    ok(HealthResponse { status: "ok" })
}

async fn report(
    State(state): State<ApiState>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<ReportViewModel> {
    let (_, report) = assemble(&state, &query).await?;
    Ok(ok(report))
}

async fn summary(
    State(state): State<ApiState>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<SummaryView> {
    let (_, report) = assemble(&state, &query).await?;
    Ok(ok(report.summary()))
}

async fn issues(
    State(state): State<ApiState>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<IssuesResponse> {
    let (consumer_unit, report) = assemble(&state, &query).await?;
    Ok(ok(IssuesResponse {
        consumer_unit,
        issues: report.issues,
    }))
}

async fn tariffs(
    State(state): State<ApiState>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<TariffsResponse> {
    let (consumer_unit, report) = assemble(&state, &query).await?;
    Ok(ok(TariffsResponse {
        consumer_unit,
        tariffs: report.tariffs_table,
    }))
}

async fn invalidate(
    State(state): State<ApiState>,
    Json(request): Json<InvalidateRequest>,
) -> ApiResult<InvalidateResponse> {
    if request.tags.is_empty() {
        return Err(ApiError::bad_request("tag list cannot be empty"));
    }
    let mut dropped = 0;
    for tag in request.tags {
        dropped += state.cache.invalidate(tag);
    }
    Ok(ok(InvalidateResponse { dropped }))
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { ok: true, data })
}

async fn assemble(
    state: &ApiState,
    query: &ReportQuery,
) -> std::result::Result<(u64, ReportViewModel), ApiError> {
    let consumer_unit = resolve_consumer_unit(query.consumer_unit, &state.config)?;
    let cached = state
        .cache
        .get_or_fetch(consumer_unit, state.source.as_ref())
        .await
        .map_err(|error| {
            warn!("payload fetch failed for consumer unit {consumer_unit}: {error:#}");
            ApiError::bad_gateway(error)
        })?;
    Ok((
        consumer_unit,
        build_report(&cached.payload, &state.settings),
    ))
}

fn resolve_consumer_unit(
    requested: Option<u64>,
    config: &Config,
) -> std::result::Result<u64, ApiError> {
    requested
        .or(config.consumer_unit.default_id)
        .ok_or_else(|| {
            ApiError::bad_request("consumer_unit is required (no default configured)")
        })
}

#[cfg(test)]
mod tests {
    use super::resolve_consumer_unit;
    use crate::config::Config;

    #[test]
    fn resolves_explicit_unit_over_default() {
        let mut config = Config::default();
        config.consumer_unit.default_id = Some(3);
        assert_eq!(resolve_consumer_unit(Some(7), &config).unwrap(), 7);
        assert_eq!(resolve_consumer_unit(None, &config).unwrap(), 3);
    }

    #[test]
    fn missing_unit_is_a_client_error() {
        let config = Config::default();
        assert!(resolve_consumer_unit(None, &config).is_err());
    }
}
