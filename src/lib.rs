//! HDB Resale Price Estimator Library
//!
//! Estimates the resale price of a Singapore HDB flat from a handful of
//! listing attributes:
//! - validates the request against the option catalog
//! - derives lease and storey features
//! - scores a single-row feature table with a trained price model
//!
//! The same pipeline backs the CLI (`resale_estimator`) and the REST API
//! (`resale_api`).

pub mod api;
pub mod core;
pub mod models;
pub mod utils;

pub use crate::core::{
    derive, parse_storey_range, validate_floor_area, Estimate, EstimateRequest, Estimator,
    LeaseFeatures, LinearPriceModel, ModelStore, PriceModel, Predictor, SharedModel,
};
pub use models::{
    AppConfig, AppError, AppResult, ErrorCode, FeatureRecord, OptionCatalog, RawInput, YearRange,
};
pub use utils::{format_price, TelemetryCollector, TelemetryStats};
