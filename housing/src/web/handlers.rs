//! Request handlers.

use super::render::{error_page, form_page, prediction_page, retrain_page};
use super::AppState;
use crate::errors::{HousingError, PredictionError};
use crate::predictor::HousingData;
use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Response};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Notice shown when a retraining trigger arrives during a run.
pub const ALREADY_RUNNING_MESSAGE: &str = "The model retraining process is already running.";
/// Notice shown when a retraining run was started.
pub const STARTED_MESSAGE: &str = "The model retraining process has started.";

fn prediction_status(err: &PredictionError) -> StatusCode {
    match err {
        PredictionError::ModelNotFound { .. } => StatusCode::SERVICE_UNAVAILABLE,
        PredictionError::InvalidInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PredictionError::ModelLoad { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn prediction_error(err: &PredictionError) -> Response {
    let status = prediction_status(err);
    if status.is_server_error() {
        error!(error = %err, "Prediction failed");
    } else {
        warn!(error = %err, "Prediction rejected");
    }
    (status, Html(error_page(&err.to_string()))).into_response()
}

/// `GET /`: the empty form.
pub async fn index() -> Html<String> {
    Html(form_page(None))
}

/// `POST /`: scores the submitted row.
pub async fn predict(
    State(state): State<AppState>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let data = match HousingData::from_form(&form) {
        Ok(data) => data,
        Err(err) => return prediction_error(&err),
    };

    let predictor = Arc::clone(&state.predictor);
    let input = data.clone();
    let result = match tokio::task::spawn_blocking(move || predictor.predict(&input)).await {
        Ok(result) => result,
        Err(err) => {
            error!(error = %err, "Prediction task failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(error_page("Prediction task failed")),
            )
                .into_response();
        }
    };

    match result {
        Ok(value) => Html(prediction_page(&data, value)).into_response(),
        Err(err) => prediction_error(&err),
    }
}

/// `GET /retrain`: the current experiment record.
pub async fn retrain_status(State(state): State<AppState>) -> Html<String> {
    Html(retrain_page(&state.pipeline.experiment(), None))
}

/// `POST /retrain`: starts a run unless one is in flight.
pub async fn retrain(State(state): State<AppState>) -> Response {
    let notice = match state.pipeline.start() {
        Ok(_worker) => {
            info!("Retraining triggered");
            STARTED_MESSAGE
        }
        Err(HousingError::AlreadyRunning) => {
            info!("Retraining trigger ignored, run in progress");
            ALREADY_RUNNING_MESSAGE
        }
        Err(err) => {
            error!(error = %err, "Failed to start retraining");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(error_page(&err.to_string())),
            )
                .into_response();
        }
    };
    Html(retrain_page(&state.pipeline.experiment(), Some(notice))).into_response()
}

/// `GET /experiments`: the experiment history as JSON.
pub async fn experiments(State(state): State<AppState>) -> Response {
    match state.pipeline.history() {
        Ok(history) => Json(json!({
            "current": state.pipeline.experiment(),
            "history": history,
        }))
        .into_response(),
        Err(err) => {
            error!(error = %err, "Failed to read experiment history");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::{targets, HousingEstimator, Preprocessor, RidgeRegression};
    use crate::pipeline::{ExperimentTracker, Pipeline};
    use crate::predictor::HousingPredictor;
    use crate::testing::fixtures::{ocean_proximity_domain, synthetic_records};
    use crate::testing::{Gate, MockPipelineFactory};
    use crate::web::router;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use std::path::Path;
    use tower::ServiceExt;

    const SCENARIO_FORM: &str = "longitude=-122.23&latitude=37.88&housing_median_age=41\
        &total_rooms=880&total_bedrooms=129&population=322&households=126\
        &median_income=8.3252&ocean_proximity=NEAR+BAY";

    fn deploy_model(model_dir: &Path) {
        let records = synthetic_records(300, 11);
        let pre = Preprocessor::fit(&records, true, &ocean_proximity_domain()).unwrap();
        let x = pre.transform(&records).unwrap();
        let y = targets(&records).unwrap();
        let model = RidgeRegression::fit(x.view(), y.view(), 1.0).unwrap();
        HousingEstimator::new("ridge", 0.95, pre, model)
            .unwrap()
            .save(&model_dir.join("20240101000000/model.json"))
            .unwrap();
    }

    fn state(factory: MockPipelineFactory, model_dir: &Path) -> AppState {
        let pipeline = Pipeline::new(Arc::new(factory), Arc::new(ExperimentTracker::new()));
        AppState::new(Arc::new(pipeline), Arc::new(HousingPredictor::new(model_dir)))
    }

    async fn body_text(response: Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn post_form(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_index_serves_form() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(state(MockPipelineFactory::new(), dir.path()));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("<form method=\"post\" action=\"/\">"));
    }

    #[tokio::test]
    async fn test_prediction_page_shows_currency() {
        let dir = tempfile::tempdir().unwrap();
        deploy_model(dir.path());
        let app = router(state(MockPipelineFactory::new(), dir.path()));

        let response = app.oneshot(post_form("/", SCENARIO_FORM)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("NEAR BAY"));
        assert!(html.contains("8.3252"));

        let start = html.find("<p class=\"prediction\">").unwrap() + "<p class=\"prediction\">".len();
        let end = start + html[start..].find("</p>").unwrap();
        let price = &html[start..end];
        assert!(price.starts_with('$'), "{price}");
        let (whole, cents) = price[1..].split_once('.').unwrap();
        assert_eq!(cents.len(), 2);
        assert!(whole.contains(','), "{price}");
        assert!(whole.chars().all(|c| c.is_ascii_digit() || c == ','));
    }

    #[tokio::test]
    async fn test_prediction_without_model_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(state(MockPipelineFactory::new(), &dir.path().join("saved_models")));

        let response = app.oneshot(post_form("/", SCENARIO_FORM)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(body_text(response).await.contains("No deployed model found"));
    }

    #[tokio::test]
    async fn test_malformed_input_is_unprocessable() {
        let dir = tempfile::tempdir().unwrap();
        deploy_model(dir.path());
        let app = router(state(MockPipelineFactory::new(), dir.path()));

        let body = SCENARIO_FORM.replace("latitude=37.88", "latitude=north");
        let response = app.oneshot(post_form("/", &body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body_text(response).await.contains("latitude"));
    }

    #[tokio::test]
    async fn test_overflowing_input_is_unprocessable() {
        let dir = tempfile::tempdir().unwrap();
        deploy_model(dir.path());
        let app = router(state(MockPipelineFactory::new(), dir.path()));

        let body = "longitude=1e308&latitude=1e308&housing_median_age=1e308\
            &total_rooms=1e308&total_bedrooms=1e308&population=1e308&households=1e308\
            &median_income=1e308&ocean_proximity=INLAND";
        let response = app.oneshot(post_form("/", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(!body_text(response).await.contains("$NaN"));
    }

    #[tokio::test]
    async fn test_retrain_while_running_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let gate = Gate::new();
        let factory = Arc::new(MockPipelineFactory::gated(gate.clone()));
        let pipeline = Arc::new(
            Pipeline::new(factory.clone(), Arc::new(ExperimentTracker::new())),
        );
        let app = router(AppState::new(
            Arc::clone(&pipeline),
            Arc::new(HousingPredictor::new(dir.path())),
        ));

        let first = app.clone().oneshot(post_form("/retrain", "")).await.unwrap();
        assert!(body_text(first).await.contains(STARTED_MESSAGE));
        assert!(pipeline.is_running());

        let second = app.clone().oneshot(post_form("/retrain", "")).await.unwrap();
        assert_eq!(second.status(), StatusCode::OK);
        assert!(body_text(second).await.contains(ALREADY_RUNNING_MESSAGE));
        assert_eq!(factory.build_count(), 1);

        let status = app
            .oneshot(Request::builder().uri("/retrain").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(body_text(status).await.contains("<strong>running</strong>"));

        gate.open();
    }

    #[tokio::test]
    async fn test_experiments_returns_json() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(state(MockPipelineFactory::new(), dir.path()));

        let response = app
            .oneshot(Request::builder().uri("/experiments").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let value: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(value["history"], json!([]));
        assert_eq!(value["current"]["state"], "idle");
    }
}
