//! Request boundary validation for free-text inputs

use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::{FLOOR_AREA_WARNING, MAX_FLOOR_AREA_SQM, MIN_FLOOR_AREA_SQM};

/// Parse and bound-check a floor area typed by the user.
///
/// Returns the parsed value unchanged when it lies in [10, 1000] sqm.
/// Anything else is a validation error carrying the user-facing warning;
/// callers must not attempt a prediction in that case.
pub fn validate_floor_area(text: &str) -> AppResult<f64> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| AppError::validation(FLOOR_AREA_WARNING))?;

    check_floor_area(value)
}

/// Bound-check an already numeric floor area.
pub fn check_floor_area(value: f64) -> AppResult<f64> {
    // NaN fails the range check as well
    if (MIN_FLOOR_AREA_SQM..=MAX_FLOOR_AREA_SQM).contains(&value) {
        Ok(value)
    } else {
        Err(AppError::validation(FLOOR_AREA_WARNING))
    }
}
