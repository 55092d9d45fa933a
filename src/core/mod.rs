//! Core Module - Estimation Pipeline
//!
//! Request validation, feature derivation, the price model seam and the
//! estimator that ties them together.

pub mod estimator;
pub mod features;
pub mod model;
pub mod predictor;
pub mod store;
pub mod validator;

pub use estimator::*;
pub use features::*;
pub use model::*;
pub use predictor::*;
pub use store::*;
pub use validator::*;
