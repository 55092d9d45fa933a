//! API Request/Response Types

use serde::{Deserialize, Serialize};

use crate::core::estimator::{Estimate, EstimateRequest};
use crate::models::catalog::{OptionCatalog, YearRange};
use crate::models::errors::AppError;
use crate::models::types::FeatureRecord;

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(error: ApiError, latency_ms: f64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            latency_ms,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// API Error
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn rate_limited(retry_after: u64) -> Self {
        Self {
            code: "RATE_LIMITED".to_string(),
            message: format!("Rate limit exceeded. Retry after {} seconds", retry_after),
            details: Some(format!("retry_after: {}", retry_after)),
        }
    }
}

impl From<&AppError> for ApiError {
    fn from(err: &AppError) -> Self {
        // Internal faults keep their detail out of the message
        let message = if err.is_user_facing() {
            err.message.clone()
        } else {
            "Unable to estimate a price for this flat".to_string()
        };
        Self {
            code: err.code_str().to_string(),
            message,
            details: None,
        }
    }
}

// ============================================
// Estimate
// ============================================

/// Floor area as sent by a client: form text or a JSON number
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum FloorAreaInput {
    Number(f64),
    Text(String),
}

impl FloorAreaInput {
    /// Text form handed to the floor-area validator
    pub fn into_text(self) -> String {
        match self {
            FloorAreaInput::Number(v) => v.to_string(),
            FloorAreaInput::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EstimateApiRequest {
    pub year: i32,
    pub town: String,
    pub flat_type: String,
    pub flat_model: String,
    pub storey_range: String,
    pub floor_area_sqm: FloorAreaInput,
    pub lease_commence_date: i32,
}

impl From<EstimateApiRequest> for EstimateRequest {
    fn from(req: EstimateApiRequest) -> Self {
        Self {
            year: req.year,
            town: req.town,
            flat_type: req.flat_type,
            flat_model: req.flat_model,
            storey_range: req.storey_range,
            floor_area_sqm: req.floor_area_sqm.into_text(),
            lease_commence_date: req.lease_commence_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EstimateData {
    pub request_id: String,
    pub estimated_price: f64,
    pub formatted_price: String,
    pub features: FeatureRecord,
    pub model_name: String,
    pub model_version: String,
}

impl EstimateData {
    pub fn new(request_id: String, estimate: Estimate, model_name: &str, model_version: &str) -> Self {
        Self {
            request_id,
            estimated_price: estimate.estimated_price,
            formatted_price: estimate.formatted_price,
            features: estimate.features,
            model_name: model_name.to_string(),
            model_version: model_version.to_string(),
        }
    }
}

// ============================================
// Options
// ============================================

#[derive(Debug, Serialize)]
pub struct OptionsData {
    pub towns: Vec<String>,
    pub flat_types: Vec<String>,
    pub flat_models: Vec<String>,
    pub storey_ranges: Vec<String>,
    pub sale_years: YearRange,
    pub lease_commence_years: YearRange,
}

impl From<&OptionCatalog> for OptionsData {
    fn from(catalog: &OptionCatalog) -> Self {
        Self {
            towns: catalog.towns.clone(),
            flat_types: catalog.flat_types.clone(),
            flat_models: catalog.flat_models.clone(),
            storey_ranges: catalog.storey_ranges.clone(),
            sale_years: catalog.sale_years,
            lease_commence_years: catalog.lease_commence_years,
        }
    }
}

// ============================================
// Stats / Telemetry
// ============================================

#[derive(Debug, Serialize)]
pub struct StatsData {
    pub total_requests: u64,
    pub total_estimates: u64,
    pub total_rejected: u64,
    pub rejected_by_code: std::collections::HashMap<String, u64>,
    pub avg_latency_ms: f64,
    pub mean_estimated_price: f64,
    pub uptime_seconds: u64,
    pub api_version: String,
}

// ============================================
// Health Check
// ============================================

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub model_name: String,
    pub model_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_area_accepts_text_or_number() {
        let text: FloorAreaInput = serde_json::from_str(r#""90.0""#).unwrap();
        assert_eq!(text.into_text(), "90.0");

        let number: FloorAreaInput = serde_json::from_str("92.5").unwrap();
        assert_eq!(number.into_text(), "92.5");
    }

    #[test]
    fn test_internal_errors_are_masked() {
        let api: ApiError = (&AppError::schema("column 3 mismatch")).into();
        assert_eq!(api.code, "SCHEMA_ERROR");
        assert!(!api.message.contains("column 3"));

        let api: ApiError = (&AppError::validation("Unknown town 'X'")).into();
        assert_eq!(api.code, "VALIDATION_ERROR");
        assert_eq!(api.message, "Unknown town 'X'");
    }
}
