//! HTTP surface: the prediction form, the retraining trigger and the
//! experiment history.

mod handlers;
mod render;

pub use handlers::{ALREADY_RUNNING_MESSAGE, STARTED_MESSAGE};
pub use render::{format_currency, html_escape};

use crate::pipeline::Pipeline;
use crate::predictor::HousingPredictor;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The retraining orchestrator.
    pub pipeline: Arc<Pipeline>,
    /// The prediction service.
    pub predictor: Arc<HousingPredictor>,
}

impl AppState {
    /// Creates the state.
    #[must_use]
    pub fn new(pipeline: Arc<Pipeline>, predictor: Arc<HousingPredictor>) -> Self {
        Self { pipeline, predictor }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index).post(handlers::predict))
        .route("/retrain", get(handlers::retrain_status).post(handlers::retrain))
        .route("/experiments", get(handlers::experiments))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
