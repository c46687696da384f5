//! レポート生成を起動するHTTPエンドポイント

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::date_filter::DateRange;
use crate::error::Error;
use crate::pipeline::{ReportOutcome, ReportSettings, generate_report};
use crate::source::TrackerSource;
use crate::storage::ObjectSink;

/// ハンドラ間で共有する状態
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn TrackerSource>,
    pub sink: Arc<dyn ObjectSink>,
    pub settings: Arc<ReportSettings>,
}

impl AppState {
    pub fn new(
        source: Arc<dyn TrackerSource>,
        sink: Arc<dyn ObjectSink>,
        settings: ReportSettings,
    ) -> Self {
        Self {
            source,
            sink,
            settings: Arc::new(settings),
        }
    }
}

/// クエリ文字列またはJSON本文で受け取る期間
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RangeParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(trigger_from_query).post(trigger_from_body))
        .route("/healthz", get(health_check))
        .with_state(state)
}

async fn health_check() -> &'static str {
    "ok"
}

async fn trigger_from_query(
    State(state): State<AppState>,
    Query(params): Query<RangeParams>,
) -> Response {
    run_report(&state, params).await
}

async fn trigger_from_body(
    State(state): State<AppState>,
    Json(params): Json<RangeParams>,
) -> Response {
    run_report(&state, params).await
}

async fn run_report(state: &AppState, params: RangeParams) -> Response {
    let result = match DateRange::from_optional(params.start_date.as_deref(), params.end_date.as_deref()) {
        Ok(range) => {
            info!(start = %range.start, end = %range.end, "report requested");
            generate_report(
                state.source.as_ref(),
                state.sink.as_ref(),
                &state.settings,
                &range,
            )
            .await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(outcome) => (StatusCode::OK, success_message(&outcome)).into_response(),
        Err(e) => {
            let status = status_for(&e);
            error!(status = status.as_u16(), error = %e, "report generation failed");
            (status, e.to_string()).into_response()
        }
    }
}

pub fn success_message(outcome: &ReportOutcome) -> String {
    format!(
        "Report generated and uploaded to {}\nRows: {}",
        outcome.location, outcome.row_count
    )
}

/// エラー種別からHTTPステータスへの対応
pub fn status_for(error: &Error) -> StatusCode {
    match error {
        Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        Error::SourceUnavailable { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
