//! Option Catalog
//!
//! The enumerated values a user may pick for each categorical field, plus the
//! selectable sale-year and lease-commencement ranges. Injected into the
//! estimator so tests can substitute small fixtures.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;
use tracing::info;

use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::utils::constants::{
    DEFAULT_FLAT_MODELS, DEFAULT_FLAT_TYPES, DEFAULT_STOREY_RANGES, DEFAULT_TOWNS,
    MAX_LEASE_COMMENCE_YEAR, MAX_SALE_YEAR, MIN_LEASE_COMMENCE_YEAR, MIN_SALE_YEAR,
};

/// Inclusive year bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, year: i32) -> bool {
        self.as_range().contains(&year)
    }

    pub fn as_range(&self) -> RangeInclusive<i32> {
        self.min..=self.max
    }
}

/// Allowed values for every categorical input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionCatalog {
    pub towns: Vec<String>,
    pub flat_types: Vec<String>,
    pub flat_models: Vec<String>,
    pub storey_ranges: Vec<String>,
    pub sale_years: YearRange,
    pub lease_commence_years: YearRange,
}

impl Default for OptionCatalog {
    fn default() -> Self {
        Self {
            towns: to_owned_list(&DEFAULT_TOWNS),
            flat_types: to_owned_list(&DEFAULT_FLAT_TYPES),
            flat_models: to_owned_list(&DEFAULT_FLAT_MODELS),
            storey_ranges: to_owned_list(&DEFAULT_STOREY_RANGES),
            sale_years: YearRange::new(MIN_SALE_YEAR, MAX_SALE_YEAR),
            lease_commence_years: YearRange::new(MIN_LEASE_COMMENCE_YEAR, MAX_LEASE_COMMENCE_YEAR),
        }
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl OptionCatalog {
    /// Load a catalog from a JSON file.
    pub fn load(path: &Path) -> AppResult<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            AppError::with_source(
                ErrorCode::ConfigInvalidValue,
                format!("Cannot read option catalog {}", path.display()),
                e,
            )
        })?;
        let catalog: OptionCatalog = serde_json::from_str(&data).map_err(|e| {
            AppError::with_source(
                ErrorCode::ConfigInvalidValue,
                format!("Option catalog {} is not valid JSON", path.display()),
                e,
            )
        })?;
        catalog.check()?;
        info!(
            path = %path.display(),
            towns = catalog.towns.len(),
            flat_types = catalog.flat_types.len(),
            flat_models = catalog.flat_models.len(),
            storey_ranges = catalog.storey_ranges.len(),
            "Loaded option catalog"
        );
        Ok(catalog)
    }

    /// Reject catalogs that could never accept a request.
    fn check(&self) -> AppResult<()> {
        let lists = [
            ("towns", &self.towns),
            ("flat_types", &self.flat_types),
            ("flat_models", &self.flat_models),
            ("storey_ranges", &self.storey_ranges),
        ];
        for (name, list) in lists {
            if list.is_empty() {
                return Err(AppError::config(format!("Option catalog has no {}", name)));
            }
        }
        if self.sale_years.min > self.sale_years.max
            || self.lease_commence_years.min > self.lease_commence_years.max
        {
            return Err(AppError::config("Option catalog year range is inverted"));
        }
        Ok(())
    }

    pub fn has_town(&self, town: &str) -> bool {
        contains_exact(&self.towns, town)
    }

    /// Case-insensitive: the feature deriver upper-cases flat types anyway
    pub fn has_flat_type(&self, flat_type: &str) -> bool {
        contains_ignore_case(&self.flat_types, flat_type)
    }

    /// Case-insensitive: the feature deriver upper-cases flat models anyway
    pub fn has_flat_model(&self, flat_model: &str) -> bool {
        contains_ignore_case(&self.flat_models, flat_model)
    }

    pub fn has_storey_range(&self, storey_range: &str) -> bool {
        contains_exact(&self.storey_ranges, storey_range)
    }
}

fn contains_exact(list: &[String], value: &str) -> bool {
    let value = value.trim();
    list.iter().any(|item| item == value)
}

fn contains_ignore_case(list: &[String], value: &str) -> bool {
    let value = value.trim().to_uppercase();
    list.iter().any(|item| item.to_uppercase() == value)
}
