//! Models Module - Data Structures & Configuration
//!
//! Input and feature types, the option catalog, runtime configuration
//! and the error taxonomy.

pub mod catalog;
pub mod config;
pub mod errors;
pub mod types;

pub use catalog::*;
pub use config::*;
pub use errors::*;
pub use types::*;
