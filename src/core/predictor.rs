//! Predictor
//!
//! Wraps a shared model handle given at construction. Each call lays a
//! [`FeatureRecord`] out as a single-row table, runs inference once and
//! returns the scalar. No retries, no batching.

use tracing::debug;

use crate::core::model::check_row_schema;
use crate::core::store::SharedModel;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::FeatureRecord;

/// Resale price predictor
#[derive(Clone)]
pub struct Predictor {
    model: SharedModel,
}

impl Predictor {
    pub fn new(model: SharedModel) -> Self {
        Self { model }
    }

    /// Predict the resale price for one feature record.
    ///
    /// A row that disagrees with the model schema fails with `SCHEMA_ERROR`
    /// before the model is invoked; a non-finite output fails with
    /// `INFERENCE_FAILED`.
    pub fn predict(&self, record: &FeatureRecord) -> AppResult<f64> {
        let row = record.to_row();
        check_row_schema(self.model.schema(), &row)?;

        let price = self.model.predict_row(&row)?;
        if !price.is_finite() {
            return Err(AppError::inference(format!(
                "Model {} returned non-finite price {}",
                self.model.name(),
                price
            )));
        }

        debug!(model = %self.model.name(), price, "Prediction complete");
        Ok(price)
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn model_version(&self) -> &str {
        self.model.version()
    }
}
