//! Integration tests for the estimation pipeline

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use resale_estimator::core::model::TargetTransform;
use resale_estimator::models::types::feature_schema;
use resale_estimator::{
    EstimateRequest, Estimator, ErrorCode, LinearPriceModel, ModelStore, OptionCatalog, Predictor,
};
use tempfile::TempDir;

/// price = 50,000 + 4,000/sqm + 1,000/year of current lease (+10,000 in Ang Mo Kio)
fn linear_model() -> LinearPriceModel {
    let mut numeric = HashMap::new();
    numeric.insert("floor_area_sqm".to_string(), 4000.0);
    numeric.insert("current_remaining_lease".to_string(), 1000.0);

    let mut towns = HashMap::new();
    towns.insert("ANG MO KIO".to_string(), 10000.0);
    let mut categorical = HashMap::new();
    categorical.insert("town".to_string(), towns);

    LinearPriceModel {
        name: "resale-linear".to_string(),
        version: "2024.1".to_string(),
        columns: feature_schema(),
        intercept: 50000.0,
        numeric,
        categorical,
        target: TargetTransform::Identity,
    }
}

fn write_artifact(dir: &Path, model: &LinearPriceModel) -> std::path::PathBuf {
    let path = dir.join("best_model.json");
    std::fs::write(&path, serde_json::to_string_pretty(model).unwrap()).unwrap();
    path
}

fn estimator_from(path: &Path) -> Estimator {
    let model = ModelStore::new(path).get().unwrap();
    Estimator::new(Arc::new(OptionCatalog::default()), Predictor::new(model))
}

fn request() -> EstimateRequest {
    EstimateRequest {
        year: 2020,
        town: "ANG MO KIO".to_string(),
        flat_type: "4 ROOM".to_string(),
        flat_model: "New Generation".to_string(),
        storey_range: "07 TO 09".to_string(),
        floor_area_sqm: "90".to_string(),
        lease_commence_date: 1990,
    }
}

#[test]
fn test_end_to_end_estimate() {
    let dir = TempDir::new().unwrap();
    let path = write_artifact(dir.path(), &linear_model());
    let estimator = estimator_from(&path);

    let estimate = estimator.estimate(&request()).unwrap();

    let features = &estimate.features;
    assert_eq!(features.remaining_lease, 69);
    assert_eq!(features.current_remaining_lease, 65);
    assert_eq!(features.years_holding, 30);
    assert_eq!((features.lower_bound, features.upper_bound), (7, 9));
    assert_eq!(features.flat_model, "NEW GENERATION");

    // 50,000 + 90 * 4,000 + 65 * 1,000 + 10,000
    assert!((estimate.estimated_price - 485000.0).abs() < 1e-6);
    assert_eq!(estimate.formatted_price, "$485,000.00");
}

#[test]
fn test_invalid_floor_area_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_artifact(dir.path(), &linear_model());
    let estimator = estimator_from(&path);

    for bad in ["abc", "", "5", "1500"] {
        let mut req = request();
        req.floor_area_sqm = bad.to_string();
        let err = estimator.estimate(&req).unwrap_err();
        assert_eq!(err.code, ErrorCode::Validation, "input {:?}", bad);
    }
}

#[test]
fn test_unknown_town_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_artifact(dir.path(), &linear_model());
    let estimator = estimator_from(&path);

    let mut req = request();
    req.town = "ATLANTIS".to_string();
    let err = estimator.estimate(&req).unwrap_err();
    assert_eq!(err.code, ErrorCode::Validation);
}

#[test]
fn test_missing_artifact_fails_at_load() {
    let dir = TempDir::new().unwrap();
    let err = ModelStore::new(dir.path().join("missing.json"))
        .get()
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ArtifactLoad);
    assert!(err.code.is_fatal_to_process());
}

#[test]
fn test_artifact_with_foreign_schema_fails_at_load() {
    let dir = TempDir::new().unwrap();
    let mut model = linear_model();
    model.columns.reverse();
    let path = write_artifact(dir.path(), &model);

    let err = ModelStore::new(path).get().unwrap_err();
    assert_eq!(err.code, ErrorCode::Schema);
}

#[test]
fn test_bedok_sale_in_reference_year() {
    let dir = TempDir::new().unwrap();
    let path = write_artifact(dir.path(), &linear_model());
    let estimator = estimator_from(&path);

    let req = EstimateRequest {
        year: 2024,
        town: "BEDOK".to_string(),
        flat_type: "4 ROOM".to_string(),
        flat_model: "IMPROVED".to_string(),
        storey_range: "07 TO 09".to_string(),
        floor_area_sqm: "90.0".to_string(),
        lease_commence_date: 1990,
    };
    let estimate = estimator.estimate(&req).unwrap();

    let features = &estimate.features;
    assert_eq!(features.remaining_lease, 65);
    assert_eq!(features.current_remaining_lease, 65);
    assert_eq!(features.years_holding, 34);
    assert_eq!((features.lower_bound, features.upper_bound), (7, 9));
    assert!(estimate.estimated_price.is_finite());
}
