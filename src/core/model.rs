//! Price Model Module
//!
//! The trained regressor is an opaque collaborator behind [`PriceModel`]:
//! given a single-row feature table it returns one price.
//!
//! [`LinearPriceModel`] is the on-disk artifact format: a linear regression
//! over numeric columns plus one-hot encoded categorical columns, serialized
//! as JSON together with the input schema it was trained on.
//!
//! Scoring:
//! - `intercept + Σ numeric[col] * value + Σ categorical[col][value]`
//! - categories unseen at training time contribute 0
//! - `target = "log"` models predict log-price; output is `exp()`-ed

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::types::{feature_schema, ColumnKind, ColumnSpec, FeatureRow, FeatureValue};

/// Interface for the trained resale price model
pub trait PriceModel: Send + Sync {
    /// Input schema the model was trained on, in column order
    fn schema(&self) -> &[ColumnSpec];

    /// Predict the price for a single row
    fn predict_row(&self, row: &FeatureRow) -> AppResult<f64>;

    /// Get model name
    fn name(&self) -> &str;

    /// Get model version
    fn version(&self) -> &str;
}

impl std::fmt::Debug for dyn PriceModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriceModel")
            .field("name", &self.name())
            .field("version", &self.version())
            .finish()
    }
}

/// Check a row against a model schema: same names, same order, same kinds.
pub fn check_row_schema(expected: &[ColumnSpec], row: &FeatureRow) -> AppResult<()> {
    if expected.len() != row.len() {
        return Err(AppError::schema(format!(
            "Feature row has {} columns, model expects {}",
            row.len(),
            expected.len()
        )));
    }

    for (i, (spec, cell)) in expected.iter().zip(&row.cells).enumerate() {
        if spec.name != cell.name {
            return Err(AppError::schema(format!(
                "Column {} is '{}', model expects '{}'",
                i, cell.name, spec.name
            )));
        }
        if spec.kind != cell.value.kind() {
            return Err(AppError::schema(format!(
                "Column '{}' is {}, model expects {}",
                spec.name,
                cell.value.kind().as_str(),
                spec.kind.as_str()
            )));
        }
    }
    Ok(())
}

/// Transform applied to the linear output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetTransform {
    /// Model predicts price directly
    #[default]
    Identity,
    /// Model predicts ln(price)
    Log,
}

/// Linear regression artifact over one-hot encoded categoricals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearPriceModel {
    pub name: String,
    pub version: String,
    /// Input schema, in column order
    pub columns: Vec<ColumnSpec>,
    pub intercept: f64,
    /// Coefficient per numeric column; absent means 0
    #[serde(default)]
    pub numeric: HashMap<String, f64>,
    /// Coefficient per (categorical column, category value)
    #[serde(default)]
    pub categorical: HashMap<String, HashMap<String, f64>>,
    #[serde(default)]
    pub target: TargetTransform,
}

impl LinearPriceModel {
    /// Load a model artifact from a JSON file.
    ///
    /// Fails with `ARTIFACT_LOAD_FAILED` if the file is missing or corrupt and
    /// with `SCHEMA_ERROR` if its columns differ from the feature schema.
    pub fn load(path: &Path) -> AppResult<Self> {
        info!(path = %path.display(), "Loading model artifact");

        let data = std::fs::read_to_string(path).map_err(|e| {
            AppError::with_source(
                ErrorCode::ArtifactLoad,
                format!("Cannot read model artifact {}", path.display()),
                e,
            )
        })?;

        let model: LinearPriceModel = serde_json::from_str(&data).map_err(|e| {
            AppError::with_source(
                ErrorCode::ArtifactLoad,
                format!("Model artifact {} is corrupt", path.display()),
                e,
            )
        })?;

        model.check_consistency()?;

        info!(
            name = %model.name,
            version = %model.version,
            columns = model.columns.len(),
            "Model artifact loaded"
        );
        Ok(model)
    }

    /// Verify the artifact agrees with the feature schema and with itself.
    fn check_consistency(&self) -> AppResult<()> {
        let expected = feature_schema();
        if self.columns != expected {
            let got: Vec<&str> = self.columns.iter().map(|c| c.name.as_str()).collect();
            return Err(AppError::schema(format!(
                "Model artifact columns {:?} do not match feature schema",
                got
            )));
        }

        for name in self.numeric.keys() {
            if !self.has_column(name, ColumnKind::Numeric) {
                return Err(AppError::schema(format!(
                    "Numeric coefficient for unknown column '{}'",
                    name
                )));
            }
        }
        for name in self.categorical.keys() {
            if !self.has_column(name, ColumnKind::Categorical) {
                return Err(AppError::schema(format!(
                    "Categorical coefficients for unknown column '{}'",
                    name
                )));
            }
        }

        let all_finite = self.intercept.is_finite()
            && self.numeric.values().all(|c| c.is_finite())
            && self
                .categorical
                .values()
                .flat_map(|m| m.values())
                .all(|c| c.is_finite());
        if !all_finite {
            return Err(AppError::artifact_load("Model artifact has non-finite coefficients"));
        }
        Ok(())
    }

    fn has_column(&self, name: &str, kind: ColumnKind) -> bool {
        self.columns.iter().any(|c| c.name == name && c.kind == kind)
    }
}

impl PriceModel for LinearPriceModel {
    fn schema(&self) -> &[ColumnSpec] {
        &self.columns
    }

    fn predict_row(&self, row: &FeatureRow) -> AppResult<f64> {
        check_row_schema(&self.columns, row)?;

        let mut linear = self.intercept;
        for cell in &row.cells {
            match &cell.value {
                FeatureValue::Numeric(v) => {
                    if let Some(coef) = self.numeric.get(&cell.name) {
                        linear += coef * v;
                    }
                }
                FeatureValue::Categorical(v) => {
                    let coef = self
                        .categorical
                        .get(&cell.name)
                        .and_then(|levels| levels.get(v));
                    match coef {
                        Some(coef) => linear += coef,
                        None => debug!(column = %cell.name, value = %v, "Unseen category, contributes 0"),
                    }
                }
            }
        }

        let price = match self.target {
            TargetTransform::Identity => linear,
            TargetTransform::Log => linear.exp(),
        };
        Ok(price)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn version(&self) -> &str {
        &self.version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::types::FeatureRecord;

    fn record() -> FeatureRecord {
        FeatureRecord {
            year: 2020,
            town: "BEDOK".to_string(),
            flat_type: "4 ROOM".to_string(),
            flat_model: "IMPROVED".to_string(),
            storey_range: "10 TO 12".to_string(),
            floor_area_sqm: 90.0,
            lease_commence_date: 1990,
            remaining_lease: 69,
            current_remaining_lease: 65,
            years_holding: 30,
            lower_bound: 10,
            upper_bound: 12,
        }
    }

    fn model() -> LinearPriceModel {
        let mut numeric = HashMap::new();
        numeric.insert("floor_area_sqm".to_string(), 4000.0);
        numeric.insert("current_remaining_lease".to_string(), 1000.0);

        let mut towns = HashMap::new();
        towns.insert("BEDOK".to_string(), -20000.0);
        let mut categorical = HashMap::new();
        categorical.insert("town".to_string(), towns);

        LinearPriceModel {
            name: "test-linear".to_string(),
            version: "1".to_string(),
            columns: feature_schema(),
            intercept: 50000.0,
            numeric,
            categorical,
            target: TargetTransform::Identity,
        }
    }

    #[test]
    fn test_linear_prediction() {
        let price = model().predict_row(&record().to_row()).unwrap();
        // 50000 + 4000*90 + 1000*65 - 20000
        assert!((price - 455_000.0).abs() < 1e-6, "got {}", price);
    }

    #[test]
    fn test_unseen_category_contributes_zero() {
        let mut r = record();
        r.town = "PUNGGOL".to_string();
        let price = model().predict_row(&r.to_row()).unwrap();
        assert!((price - 475_000.0).abs() < 1e-6, "got {}", price);
    }

    #[test]
    fn test_log_target() {
        let mut m = model();
        m.intercept = 13.0;
        m.numeric.clear();
        m.categorical.clear();
        m.target = TargetTransform::Log;
        let price = m.predict_row(&record().to_row()).unwrap();
        assert!((price - 13.0_f64.exp()).abs() < 1e-6);
    }

    #[test]
    fn test_row_schema_mismatch() {
        let mut row = record().to_row();
        row.cells.swap(0, 1);
        let err = model().predict_row(&row).unwrap_err();
        assert_eq!(err.code, ErrorCode::Schema);

        let mut row = record().to_row();
        row.cells.pop();
        assert_eq!(model().predict_row(&row).unwrap_err().code, ErrorCode::Schema);

        let mut row = record().to_row();
        row.cells[1].value = FeatureValue::Numeric(1.0);
        assert_eq!(model().predict_row(&row).unwrap_err().code, ErrorCode::Schema);
    }

    #[test]
    fn test_load_missing_file() {
        let err = LinearPriceModel::load(Path::new("/nonexistent/best_model.json")).unwrap_err();
        assert_eq!(err.code, ErrorCode::ArtifactLoad);
    }

    #[test]
    fn test_load_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(LinearPriceModel::load(&path).unwrap_err().code, ErrorCode::ArtifactLoad);
    }

    #[test]
    fn test_load_rejects_reordered_columns() {
        let mut m = model();
        m.columns.swap(2, 3);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, serde_json::to_string(&m).unwrap()).unwrap();
        assert_eq!(LinearPriceModel::load(&path).unwrap_err().code, ErrorCode::Schema);
    }

    #[test]
    fn test_load_rejects_coefficient_for_unknown_column() {
        let mut m = model();
        m.numeric.insert("town".to_string(), 1.0);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, serde_json::to_string(&m).unwrap()).unwrap();
        assert_eq!(LinearPriceModel::load(&path).unwrap_err().code, ErrorCode::Schema);
    }

    #[test]
    fn test_load_roundtrip() {
        let m = model();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, serde_json::to_string_pretty(&m).unwrap()).unwrap();
        let loaded = LinearPriceModel::load(&path).unwrap();
        assert_eq!(loaded, m);
        assert_eq!(loaded.name(), "test-linear");
    }
}
