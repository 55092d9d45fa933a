//! Constants Module - Single Source of Truth
//!
//! All constants, default option lists and feature-schema names used across
//! the estimator are defined here. No hardcoded values in other modules.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "ResaleEstimator";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default model artifact path (relative to the working directory)
pub const DEFAULT_MODEL_PATH: &str = "best_model.json";

/// Default API port
pub const DEFAULT_PORT: u16 = 8080;

/// Default API host
pub const DEFAULT_HOST: &str = "0.0.0.0";

// ============================================
// LEASE & FEATURE DERIVATION
// ============================================

/// Length of an HDB land lease in years
pub const TOTAL_LEASE_YEARS: i32 = 99;

/// "Now" as seen by the model at training time.
///
/// Must stay fixed for the lifetime of a deployed model, otherwise the
/// derived `current_remaining_lease` no longer means what it meant in the
/// training data.
pub const REFERENCE_YEAR: i32 = 2024;

/// Separator between the two bounds of a storey range ("10 TO 12")
pub const STOREY_RANGE_SEPARATOR: &str = " TO ";

// ============================================
// FLOOR AREA BOUNDS
// ============================================

/// Smallest accepted floor area (sqm, inclusive)
pub const MIN_FLOOR_AREA_SQM: f64 = 10.0;

/// Largest accepted floor area (sqm, inclusive)
pub const MAX_FLOOR_AREA_SQM: f64 = 1000.0;

/// Warning surfaced when the floor area is rejected
pub const FLOOR_AREA_WARNING: &str = "Please enter a valid floor area between 10 and 1000 sqm.";

// ============================================
// SELECTABLE YEAR RANGES
// ============================================

pub const MIN_SALE_YEAR: i32 = 1990;
pub const MAX_SALE_YEAR: i32 = 2024;

pub const MIN_LEASE_COMMENCE_YEAR: i32 = 1960;
pub const MAX_LEASE_COMMENCE_YEAR: i32 = 2024;

// ============================================
// FEATURE SCHEMA
// ============================================

pub const COL_YEAR: &str = "year";
pub const COL_TOWN: &str = "town";
pub const COL_FLAT_TYPE: &str = "flat_type";
pub const COL_FLAT_MODEL: &str = "flat_model";
pub const COL_STOREY_RANGE: &str = "storey_range";
pub const COL_FLOOR_AREA_SQM: &str = "floor_area_sqm";
pub const COL_LEASE_COMMENCE_DATE: &str = "lease_commence_date";
pub const COL_REMAINING_LEASE: &str = "remaining_lease";
pub const COL_CURRENT_REMAINING_LEASE: &str = "current_remaining_lease";
pub const COL_YEARS_HOLDING: &str = "years_holding";
pub const COL_LOWER_BOUND: &str = "lower_bound";
pub const COL_UPPER_BOUND: &str = "upper_bound";

/// Column order of the single-row table handed to the model
pub const FEATURE_COLUMNS: [&str; 12] = [
    COL_YEAR,
    COL_TOWN,
    COL_FLAT_TYPE,
    COL_FLAT_MODEL,
    COL_STOREY_RANGE,
    COL_FLOOR_AREA_SQM,
    COL_LEASE_COMMENCE_DATE,
    COL_REMAINING_LEASE,
    COL_CURRENT_REMAINING_LEASE,
    COL_YEARS_HOLDING,
    COL_LOWER_BOUND,
    COL_UPPER_BOUND,
];

/// Columns one-hot encoded by the model
pub const CATEGORICAL_COLUMNS: [&str; 4] =
    [COL_TOWN, COL_FLAT_TYPE, COL_FLAT_MODEL, COL_STOREY_RANGE];

/// Check whether a feature column is categorical
#[inline]
pub fn is_categorical_column(name: &str) -> bool {
    CATEGORICAL_COLUMNS.contains(&name)
}

// ============================================
// DEFAULT OPTION LISTS
// ============================================

pub const DEFAULT_TOWNS: [&str; 27] = [
    "ANG MO KIO",
    "BEDOK",
    "BISHAN",
    "BUKIT BATOK",
    "BUKIT MERAH",
    "BUKIT PANJANG",
    "BUKIT TIMAH",
    "CENTRAL AREA",
    "CHOA CHU KANG",
    "CLEMENTI",
    "GEYLANG",
    "HOUGANG",
    "JURONG EAST",
    "JURONG WEST",
    "KALLANG/WHAMPOA",
    "LIM CHU KANG",
    "MARINE PARADE",
    "PASIR RIS",
    "PUNGGOL",
    "QUEENSTOWN",
    "SEMBAWANG",
    "SENGKANG",
    "SERANGOON",
    "TAMPINES",
    "TOA PAYOH",
    "WOODLANDS",
    "YISHUN",
];

pub const DEFAULT_FLAT_TYPES: [&str; 9] = [
    "1 ROOM",
    "2 ROOM",
    "3 ROOM",
    "4 ROOM",
    "5 ROOM",
    "EXECUTIVE",
    "MULTI GENERATION",
    "MULTI-GENERATION",
    "3Gen",
];

pub const DEFAULT_FLAT_MODELS: [&str; 21] = [
    "ADJOINED FLAT",
    "APARTMENT",
    "DBSS",
    "IMPROVED",
    "IMPROVED-MAISONETTE",
    "MAISONETTE",
    "MODEL A",
    "MODEL A2",
    "NEW GENERATION",
    "PREMIUM APARTMENT",
    "PREMIUM APARTMENT LOFT",
    "SIMPLIFIED",
    "STUDIO APARTMENT",
    "TERRACE",
    "TYPE S1",
    "TYPE S2",
    "Model A-Maisonette",
    "Multi Generation",
    "Premium Maisonette",
    "Standard",
    "2-room",
];

pub const DEFAULT_STOREY_RANGES: [&str; 25] = [
    "01 TO 03",
    "04 TO 06",
    "07 TO 09",
    "10 TO 12",
    "13 TO 15",
    "16 TO 18",
    "19 TO 21",
    "22 TO 24",
    "25 TO 27",
    "28 TO 30",
    "31 TO 33",
    "34 TO 36",
    "37 TO 39",
    "40 TO 42",
    "43 TO 45",
    "46 TO 48",
    "49 TO 51",
    "06 TO 10",
    "01 TO 05",
    "11 TO 15",
    "16 TO 20",
    "21 TO 25",
    "26 TO 30",
    "36 TO 40",
    "31 TO 35",
];
