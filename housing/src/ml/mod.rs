//! Feature preprocessing, ridge regression and scoring.
//!
//! Everything here is pure computation over in-memory rows; the stages own
//! all file IO. A fitted [`Preprocessor`] and [`RidgeRegression`] are bundled
//! into a [`HousingEstimator`], which is the object deployed for serving.

mod error;
mod estimator;
mod linear;
mod metrics;
mod preprocessing;

pub use error::ModelError;
pub use estimator::HousingEstimator;
pub use linear::RidgeRegression;
pub use metrics::{harmonic_mean, r2_score, rmse};
pub use preprocessing::{targets, Preprocessor, DERIVED_COLUMNS};
