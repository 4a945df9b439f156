//! Serving predictions from the newest deployed model.

mod data;
mod service;

pub use data::{HousingData, INPUT_COLUMNS};
pub use service::HousingPredictor;
