//! Type definitions for the resale estimator
//! Raw request input, the derived feature record and the single-row feature table

use serde::{Deserialize, Serialize};

use crate::utils::constants::{
    COL_CURRENT_REMAINING_LEASE, COL_FLAT_MODEL, COL_FLAT_TYPE, COL_FLOOR_AREA_SQM,
    COL_LEASE_COMMENCE_DATE, COL_LOWER_BOUND, COL_REMAINING_LEASE, COL_STOREY_RANGE, COL_TOWN,
    COL_UPPER_BOUND, COL_YEAR, COL_YEARS_HOLDING, FEATURE_COLUMNS, is_categorical_column,
};

/// Attributes of a flat as supplied by a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawInput {
    /// Year of sale
    pub year: i32,
    pub town: String,
    pub flat_type: String,
    pub flat_model: String,
    /// Banded floor level, e.g. "10 TO 12"
    pub storey_range: String,
    /// Already validated floor area in square metres
    pub floor_area_sqm: f64,
    pub lease_commence_date: i32,
}

/// Model-ready features derived from a [`RawInput`]
///
/// Produced fresh for every request and discarded after one prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub year: i32,
    pub town: String,
    /// Upper-cased
    pub flat_type: String,
    /// Upper-cased
    pub flat_model: String,
    pub storey_range: String,
    pub floor_area_sqm: f64,
    pub lease_commence_date: i32,
    /// Years left on the 99-year lease as of the sale year
    pub remaining_lease: i32,
    /// Remaining lease as of the model's reference year
    pub current_remaining_lease: i32,
    pub years_holding: i32,
    pub lower_bound: i32,
    pub upper_bound: i32,
}

impl FeatureRecord {
    /// Lay the record out as a single-row table in model column order.
    pub fn to_row(&self) -> FeatureRow {
        let cells = vec![
            FeatureCell::numeric(COL_YEAR, self.year as f64),
            FeatureCell::categorical(COL_TOWN, &self.town),
            FeatureCell::categorical(COL_FLAT_TYPE, &self.flat_type),
            FeatureCell::categorical(COL_FLAT_MODEL, &self.flat_model),
            FeatureCell::categorical(COL_STOREY_RANGE, &self.storey_range),
            FeatureCell::numeric(COL_FLOOR_AREA_SQM, self.floor_area_sqm),
            FeatureCell::numeric(COL_LEASE_COMMENCE_DATE, self.lease_commence_date as f64),
            FeatureCell::numeric(COL_REMAINING_LEASE, self.remaining_lease as f64),
            FeatureCell::numeric(COL_CURRENT_REMAINING_LEASE, self.current_remaining_lease as f64),
            FeatureCell::numeric(COL_YEARS_HOLDING, self.years_holding as f64),
            FeatureCell::numeric(COL_LOWER_BOUND, self.lower_bound as f64),
            FeatureCell::numeric(COL_UPPER_BOUND, self.upper_bound as f64),
        ];
        FeatureRow { cells }
    }
}

/// Kind of a model input column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Categorical => "categorical",
        }
    }
}

/// Name and kind of one column in the model's input schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// The schema every [`FeatureRecord`] row is laid out in
pub fn feature_schema() -> Vec<ColumnSpec> {
    FEATURE_COLUMNS
        .iter()
        .map(|name| {
            let kind = if is_categorical_column(name) {
                ColumnKind::Categorical
            } else {
                ColumnKind::Numeric
            };
            ColumnSpec::new(*name, kind)
        })
        .collect()
}

/// A single typed value in a feature row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Numeric(f64),
    Categorical(String),
}

impl FeatureValue {
    pub fn kind(&self) -> ColumnKind {
        match self {
            FeatureValue::Numeric(_) => ColumnKind::Numeric,
            FeatureValue::Categorical(_) => ColumnKind::Categorical,
        }
    }
}

/// Named value in a feature row
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCell {
    pub name: String,
    pub value: FeatureValue,
}

impl FeatureCell {
    pub fn numeric(name: &str, value: f64) -> Self {
        Self {
            name: name.to_string(),
            value: FeatureValue::Numeric(value),
        }
    }

    pub fn categorical(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: FeatureValue::Categorical(value.to_string()),
        }
    }
}

/// Single-row feature table handed to the model
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    pub cells: Vec<FeatureCell>,
}

impl FeatureRow {
    /// Column specs of this row, in order
    pub fn schema(&self) -> Vec<ColumnSpec> {
        self.cells
            .iter()
            .map(|c| ColumnSpec::new(c.name.clone(), c.value.kind()))
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&FeatureValue> {
        self.cells.iter().find(|c| c.name == name).map(|c| &c.value)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
