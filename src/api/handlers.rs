//! API Request Handlers

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::middleware::RateLimiter;
use super::types::*;
use crate::core::estimator::Estimator;
use crate::models::errors::{AppError, ErrorCode};
use crate::utils::constants::APP_VERSION;
use crate::utils::telemetry::TelemetryCollector;

/// Shared application state
pub struct AppState {
    pub estimator: Estimator,
    pub telemetry: Arc<TelemetryCollector>,
    pub rate_limiter: Arc<RateLimiter>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(estimator: Estimator, telemetry: Arc<TelemetryCollector>) -> Self {
        Self {
            estimator,
            telemetry,
            rate_limiter: Arc::new(RateLimiter::default()),
            start_time: Instant::now(),
        }
    }

    pub fn with_rate_limiter(mut self, rate_limiter: Arc<RateLimiter>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

type ErrorResponse = (StatusCode, Json<ApiResponse<()>>);

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn error_response(err: &AppError, start: Instant) -> ErrorResponse {
    let status =
        StatusCode::from_u16(err.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ApiResponse::error(ApiError::from(err), elapsed_ms(start))),
    )
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();
    let predictor = state.estimator.predictor();

    let data = HealthData {
        status: "healthy".to_string(),
        version: APP_VERSION.to_string(),
        uptime_seconds: state.uptime_seconds(),
        model_name: predictor.model_name().to_string(),
        model_version: predictor.model_version().to_string(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Estimate
// ============================================

pub async fn estimate_price(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EstimateApiRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<EstimateData>>, ErrorResponse> {
    let start = Instant::now();
    let request_id = Uuid::new_v4().to_string();

    let Json(req) = payload.map_err(|rejection| {
        warn!(request_id = %request_id, "Malformed estimate request: {}", rejection.body_text());
        state
            .telemetry
            .record_rejection(ErrorCode::ApiBadRequest, start.elapsed().as_micros() as u64);
        (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(
                ApiError::bad_request(rejection.body_text()),
                elapsed_ms(start),
            )),
        )
    })?;

    match state.estimator.estimate(&req.into()) {
        Ok(estimate) => {
            let latency_us = start.elapsed().as_micros() as u64;
            state
                .telemetry
                .record_estimate(estimate.estimated_price, latency_us);
            info!(request_id = %request_id, price = %estimate.formatted_price, "Estimate returned");

            let predictor = state.estimator.predictor();
            let data = EstimateData::new(
                request_id,
                estimate,
                predictor.model_name(),
                predictor.model_version(),
            );
            Ok(Json(ApiResponse::success(data, elapsed_ms(start))))
        }
        Err(e) => {
            state
                .telemetry
                .record_rejection(e.code, start.elapsed().as_micros() as u64);
            if e.is_user_facing() {
                warn!(request_id = %request_id, code = e.code_str(), "{}", e.message);
            } else {
                error!(request_id = %request_id, code = e.code_str(), "Estimate failed: {}", e);
            }
            Err(error_response(&e, start))
        }
    }
}

// ============================================
// Options
// ============================================

pub async fn get_options(State(state): State<Arc<AppState>>) -> Json<ApiResponse<OptionsData>> {
    let start = Instant::now();
    let data = OptionsData::from(state.estimator.catalog());
    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Stats
// ============================================

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsData>> {
    let start = Instant::now();
    let stats = state.telemetry.get_stats();

    let data = StatsData {
        total_requests: stats.total_requests,
        total_estimates: stats.total_estimates,
        total_rejected: stats.total_rejected,
        rejected_by_code: stats.rejected_by_code,
        avg_latency_ms: stats.avg_latency_ms,
        mean_estimated_price: stats.mean_estimated_price,
        uptime_seconds: state.uptime_seconds(),
        api_version: APP_VERSION.to_string(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}
