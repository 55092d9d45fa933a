//! Feature Derivation Module
//!
//! Turns a [`RawInput`] into the exact feature record the model was trained on:
//! - flat type and flat model upper-cased to the training vocabulary
//! - storey range split into numeric lower/upper bounds
//! - lease features computed against the fixed reference year
//!
//! Pure and deterministic. Category membership is NOT checked here; the
//! request boundary does that against the option catalog.

use tracing::debug;

use crate::models::errors::{AppError, AppResult};
use crate::models::types::{FeatureRecord, RawInput};
use crate::utils::constants::{REFERENCE_YEAR, STOREY_RANGE_SEPARATOR, TOTAL_LEASE_YEARS};

/// Lease-derived features for a sale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaseFeatures {
    pub remaining_lease: i32,
    pub current_remaining_lease: i32,
    pub years_holding: i32,
}

impl LeaseFeatures {
    /// Compute lease features for a sale in `year` of a flat whose lease began in `lease_commence_date`.
    ///
    /// Years far enough apart to overflow `i32` are a validation error.
    pub fn compute(year: i32, lease_commence_date: i32) -> AppResult<Self> {
        let out_of_range = || {
            AppError::validation(format!(
                "Year of sale {} and lease commence date {} are out of range",
                year, lease_commence_date
            ))
        };

        let years_holding = year.checked_sub(lease_commence_date).ok_or_else(out_of_range)?;
        let remaining_lease = TOTAL_LEASE_YEARS
            .checked_sub(years_holding)
            .ok_or_else(out_of_range)?;
        let current_remaining_lease = REFERENCE_YEAR
            .checked_sub(year)
            .and_then(|elapsed| remaining_lease.checked_sub(elapsed))
            .ok_or_else(out_of_range)?;

        Ok(Self {
            remaining_lease,
            current_remaining_lease,
            years_holding,
        })
    }
}

/// Split "10 TO 12" into `(10, 12)`.
///
/// Exactly one separator and two base-10 integers are required. Bounds are
/// returned as written; `lower > upper` is passed through.
pub fn parse_storey_range(storey_range: &str) -> AppResult<(i32, i32)> {
    let mut parts = storey_range.split(STOREY_RANGE_SEPARATOR);
    let (Some(low), Some(high), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(AppError::storey_range_parse(storey_range));
    };

    let parse = |token: &str| token.trim().parse::<i32>();
    match (parse(low), parse(high)) {
        (Ok(low), Ok(high)) => Ok((low, high)),
        _ => Err(AppError::storey_range_parse(storey_range)),
    }
}

/// Derive the model feature record from raw user input.
pub fn derive(raw: &RawInput) -> AppResult<FeatureRecord> {
    let (lower_bound, upper_bound) = parse_storey_range(&raw.storey_range)?;
    let lease = LeaseFeatures::compute(raw.year, raw.lease_commence_date)?;

    let record = FeatureRecord {
        year: raw.year,
        town: raw.town.clone(),
        flat_type: raw.flat_type.to_uppercase(),
        flat_model: raw.flat_model.to_uppercase(),
        storey_range: raw.storey_range.clone(),
        floor_area_sqm: raw.floor_area_sqm,
        lease_commence_date: raw.lease_commence_date,
        remaining_lease: lease.remaining_lease,
        current_remaining_lease: lease.current_remaining_lease,
        years_holding: lease.years_holding,
        lower_bound,
        upper_bound,
    };

    debug!(
        remaining_lease = record.remaining_lease,
        current_remaining_lease = record.current_remaining_lease,
        years_holding = record.years_holding,
        lower_bound,
        upper_bound,
        "Derived features"
    );

    Ok(record)
}
