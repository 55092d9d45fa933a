//! Estimator - the single "estimate" action
//!
//! Flow for one request:
//! 1. Floor area text validated (warning, no prediction on failure)
//! 2. Years and categorical fields checked against the option catalog
//! 3. Features derived
//! 4. Model invoked once
//! 5. Price formatted for display
//!
//! A request either yields one price or one error. Nothing is retried.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

use crate::core::features::derive;
use crate::core::predictor::Predictor;
use crate::core::validator::validate_floor_area;
use crate::models::catalog::OptionCatalog;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::{FeatureRecord, RawInput};
use crate::utils::format::format_price;

/// An estimate request as typed by the user (floor area still free text)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateRequest {
    pub year: i32,
    pub town: String,
    pub flat_type: String,
    pub flat_model: String,
    pub storey_range: String,
    pub floor_area_sqm: String,
    pub lease_commence_date: i32,
}

/// Successful estimate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub estimated_price: f64,
    /// e.g. "$456,789.13"
    pub formatted_price: String,
    pub features: FeatureRecord,
}

/// Validates, derives and predicts for one request
#[derive(Clone)]
pub struct Estimator {
    catalog: Arc<OptionCatalog>,
    predictor: Predictor,
}

impl Estimator {
    pub fn new(catalog: Arc<OptionCatalog>, predictor: Predictor) -> Self {
        Self { catalog, predictor }
    }

    pub fn catalog(&self) -> &OptionCatalog {
        &self.catalog
    }

    pub fn predictor(&self) -> &Predictor {
        &self.predictor
    }

    /// Run one estimate.
    pub fn estimate(&self, request: &EstimateRequest) -> AppResult<Estimate> {
        let start = Instant::now();

        let (features, estimated_price) = match self.derive_and_predict(request) {
            Ok(result) => result,
            Err(e) => {
                if e.is_user_facing() {
                    warn!(code = e.code_str(), reason = %e.message, "Estimate rejected");
                } else {
                    error!(code = e.code_str(), reason = %e, "Estimate rejected");
                }
                return Err(e);
            }
        };
        let formatted_price = format_price(estimated_price);

        info!(
            town = %features.town,
            flat_type = %features.flat_type,
            price = %formatted_price,
            latency_us = start.elapsed().as_micros() as u64,
            "Estimate served"
        );

        Ok(Estimate {
            estimated_price,
            formatted_price,
            features,
        })
    }

    fn derive_and_predict(&self, request: &EstimateRequest) -> AppResult<(FeatureRecord, f64)> {
        let raw = self.validate(request)?;
        let features = derive(&raw)?;
        let price = self.predictor.predict(&features)?;
        Ok((features, price))
    }

    /// Request-boundary checks; produces a [`RawInput`] ready for derivation.
    pub fn validate(&self, request: &EstimateRequest) -> AppResult<RawInput> {
        let floor_area_sqm = validate_floor_area(&request.floor_area_sqm)?;
        let catalog = &self.catalog;

        if !catalog.sale_years.contains(request.year) {
            return Err(AppError::validation(format!(
                "Year of sale must be between {} and {}",
                catalog.sale_years.min, catalog.sale_years.max
            )));
        }
        if !catalog.lease_commence_years.contains(request.lease_commence_date) {
            return Err(AppError::validation(format!(
                "Lease commence date must be between {} and {}",
                catalog.lease_commence_years.min, catalog.lease_commence_years.max
            )));
        }
        if !catalog.has_town(&request.town) {
            return Err(AppError::validation(format!("Unknown town '{}'", request.town)));
        }
        if !catalog.has_flat_type(&request.flat_type) {
            return Err(AppError::validation(format!(
                "Unknown flat type '{}'",
                request.flat_type
            )));
        }
        if !catalog.has_flat_model(&request.flat_model) {
            return Err(AppError::validation(format!(
                "Unknown flat model '{}'",
                request.flat_model
            )));
        }
        if !catalog.has_storey_range(&request.storey_range) {
            return Err(AppError::validation(format!(
                "Unknown storey range '{}'",
                request.storey_range
            )));
        }

        Ok(RawInput {
            year: request.year,
            town: request.town.trim().to_string(),
            flat_type: request.flat_type.trim().to_string(),
            flat_model: request.flat_model.trim().to_string(),
            storey_range: request.storey_range.trim().to_string(),
            floor_area_sqm,
            lease_commence_date: request.lease_commence_date,
        })
    }
}
