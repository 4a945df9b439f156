//! HTTP server for housing price prediction and model retraining.

use anyhow::Context;
use housing::config::AppSettings;
use housing::observability::init_tracing;
use housing::pipeline::{ExperimentTracker, HousingPipelineFactory, Pipeline};
use housing::predictor::HousingPredictor;
use housing::web::{router, AppState};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = AppSettings::from_env().context("invalid server settings")?;
    init_tracing(settings.log_format);

    let factory = HousingPipelineFactory::new(&settings.root_dir, &settings.config_path);
    let configuration = factory.validate().with_context(|| {
        format!(
            "invalid pipeline configuration '{}'",
            settings.config_path.display()
        )
    })?;
    let history_path = configuration.training_pipeline_config().experiment_file_path();
    let model_dir = configuration
        .saved_models_dir()
        .context("pipeline configuration has no saved models directory")?;

    let tracker = Arc::new(ExperimentTracker::with_history(history_path));
    let pipeline = Arc::new(Pipeline::new(Arc::new(factory), tracker));
    let predictor = Arc::new(HousingPredictor::new(&model_dir));
    let app = router(AppState::new(pipeline, predictor));

    let address = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;
    info!(
        address = %address,
        root_dir = %settings.root_dir.display(),
        model_dir = %model_dir.display(),
        "Housing server listening"
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
