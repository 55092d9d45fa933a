//! Centralized Error Handling Module
//!
//! Every failure carries a unique error code so that a rejected estimate can
//! be traced in logs and mapped to an HTTP status without string matching.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - VALIDATION_xxx / PARSE_xxx: request input errors (recoverable)
//! - SCHEMA_xxx / INFERENCE_xxx: model contract errors (fatal to the request)
//! - ARTIFACT_xxx / CFG_xxx: startup errors (fatal to the process)
//! - API_xxx: API errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }

    /// Whether this error is a user-facing warning rather than a fault
    pub fn is_user_facing(&self) -> bool {
        matches!(self.code, ErrorCode::Validation | ErrorCode::StoreyRangeParse)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Request Input Errors (1xx)
    // ============================================
    /// Floor area unparseable/out of range, or a field outside the option catalog
    Validation,
    /// Storey range did not split into two integers
    StoreyRangeParse,

    // ============================================
    // Model Errors (2xx)
    // ============================================
    /// Feature row does not match the model's expected schema
    Schema,
    /// Model artifact missing, unreadable or corrupt
    ArtifactLoad,
    /// Model produced no usable prediction
    Inference,

    // ============================================
    // API Errors (3xx)
    // ============================================
    /// Invalid request format
    ApiBadRequest,
    /// Rate limit exceeded
    ApiRateLimited,
    /// Internal server error
    ApiInternalError,

    // ============================================
    // Configuration Errors (4xx)
    // ============================================
    /// Invalid configuration value
    ConfigInvalidValue,

    // ============================================
    // Generic Errors (9xx)
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "VALIDATION_ERROR",
            Self::StoreyRangeParse => "PARSE_ERROR",

            Self::Schema => "SCHEMA_ERROR",
            Self::ArtifactLoad => "ARTIFACT_LOAD_FAILED",
            Self::Inference => "INFERENCE_FAILED",

            Self::ApiBadRequest => "API_BAD_REQUEST",
            Self::ApiRateLimited => "API_RATE_LIMITED",
            Self::ApiInternalError => "API_INTERNAL_ERROR",

            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",

            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation | Self::StoreyRangeParse | Self::ApiBadRequest => 400,
            Self::ApiRateLimited => 429,
            _ => 500,
        }
    }

    /// Whether the process can keep serving after this error
    pub fn is_fatal_to_process(&self) -> bool {
        matches!(self, Self::ArtifactLoad | Self::ConfigInvalidValue)
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Request input rejected
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Validation, msg)
    }

    /// Malformed storey range
    pub fn storey_range_parse(range: &str) -> Self {
        Self::new(
            ErrorCode::StoreyRangeParse,
            format!("Storey range '{}' is not of the form '<low> TO <high>'", range),
        )
    }

    /// Feature row / model schema mismatch
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Schema, msg)
    }

    /// Model artifact could not be loaded
    pub fn artifact_load(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ArtifactLoad, msg)
    }

    /// Model inference failed
    pub fn inference(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Inference, msg)
    }

    /// Invalid configuration value
    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalidValue, msg)
    }

    /// API bad request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiBadRequest, msg)
    }

    /// API internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiInternalError, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::Unknown, "IO error", err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::Unknown, "JSON parse error", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::storey_range_parse("10-12");
        assert_eq!(err.code, ErrorCode::StoreyRangeParse);
        assert_eq!(err.code_str(), "PARSE_ERROR");
        assert!(err.to_string().contains("10-12"));
    }

    #[test]
    fn test_http_status() {
        assert_eq!(ErrorCode::Validation.http_status(), 400);
        assert_eq!(ErrorCode::StoreyRangeParse.http_status(), 400);
        assert_eq!(ErrorCode::ApiRateLimited.http_status(), 429);
        assert_eq!(ErrorCode::Schema.http_status(), 500);
    }

    #[test]
    fn test_fatality() {
        assert!(ErrorCode::ArtifactLoad.is_fatal_to_process());
        assert!(!ErrorCode::Schema.is_fatal_to_process());
        assert!(AppError::validation("bad").is_user_facing());
        assert!(!AppError::schema("bad").is_user_facing());
    }

    #[test]
    fn test_source_is_preserved() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = AppError::with_source(ErrorCode::ArtifactLoad, "cannot open model", io);
        assert!(std::error::Error::source(&err).is_some());
    }
}
