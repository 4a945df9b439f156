//! Runs the training pipeline and keeps the experiment record current.

use super::factory::PipelineFactory;
use super::tracker::{ExperimentTracker, RunGuard};
use crate::core::{Experiment, ModelPusherArtifact};
use crate::errors::{HousingError, HousingResult};
use crate::events::{EventSink, LoggingEventSink, PIPELINE_COMPLETED, PIPELINE_FAILED, PIPELINE_STARTED};
use crate::observability::SpanTimer;
use crate::stages::{StageRecord, StageRunner};
use crate::utils::current_time_stamp;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{error, info};

/// Name of the worker thread that runs a retraining pipeline.
pub const RETRAIN_THREAD_NAME: &str = "housing-retrain";

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// The finished experiment record.
    pub experiment: Experiment,
    /// One record per executed stage, in order.
    pub stages: Vec<StageRecord>,
    pub artifact: ModelPusherArtifact,
}

/// Orchestrates retraining runs.
pub struct Pipeline {
    factory: Arc<dyn PipelineFactory>,
    tracker: Arc<ExperimentTracker>,
    event_sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("tracker", &self.tracker)
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Creates a pipeline that logs its events.
    #[must_use]
    pub fn new(factory: Arc<dyn PipelineFactory>, tracker: Arc<ExperimentTracker>) -> Self {
        Self {
            factory,
            tracker,
            event_sink: Arc::new(LoggingEventSink::default()),
        }
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, event_sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = event_sink;
        self
    }

    /// Returns a snapshot of the current experiment record.
    #[must_use]
    pub fn experiment(&self) -> Experiment {
        self.tracker.experiment()
    }

    /// Returns true while a run is in flight.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.tracker.is_running()
    }

    /// Returns every finished run recorded in the history file.
    pub fn history(&self) -> HousingResult<Vec<Experiment>> {
        self.tracker.history()
    }

    /// Starts a run on a new worker thread.
    ///
    /// The run slot is claimed before the thread is spawned, so the record
    /// reads as running as soon as this returns. Fails with
    /// [`HousingError::AlreadyRunning`] if a run is in flight.
    pub fn start(self: &Arc<Self>) -> HousingResult<JoinHandle<HousingResult<RunSummary>>> {
        let time_stamp = current_time_stamp();
        let guard = self.tracker.try_begin(&time_stamp)?;
        let pipeline = Arc::clone(self);

        thread::Builder::new()
            .name(RETRAIN_THREAD_NAME.to_string())
            .spawn(move || pipeline.execute(guard, &time_stamp))
            .map_err(HousingError::Io)
    }

    /// Runs the pipeline on the calling thread.
    pub fn run(&self) -> HousingResult<RunSummary> {
        let time_stamp = current_time_stamp();
        let guard = self.tracker.try_begin(&time_stamp)?;
        self.execute(guard, &time_stamp)
    }

    fn execute(&self, guard: RunGuard, time_stamp: &str) -> HousingResult<RunSummary> {
        let experiment_id = self.tracker.experiment().experiment_id;
        let timer = SpanTimer::start("pipeline");
        info!(?experiment_id, time_stamp, "Pipeline started");
        self.event_sink.emit(
            PIPELINE_STARTED,
            Some(json!({ "experiment_id": experiment_id, "time_stamp": time_stamp })),
        );

        let runner = StageRunner::new(Arc::clone(&self.event_sink));
        let result = self
            .factory
            .build(time_stamp)
            .and_then(|pipeline| pipeline.execute((), &runner).map_err(HousingError::from));
        let duration_ms = timer.elapsed_ms();

        match result {
            Ok(artifact) => {
                let experiment = guard.succeed(&artifact);
                info!(
                    ?experiment_id,
                    duration_ms,
                    model_pushed = artifact.is_model_pushed,
                    "Pipeline completed"
                );
                self.event_sink.emit(
                    PIPELINE_COMPLETED,
                    Some(json!({
                        "experiment_id": experiment_id,
                        "duration_ms": duration_ms,
                        "model_pushed": artifact.is_model_pushed,
                    })),
                );
                Ok(RunSummary {
                    experiment,
                    stages: runner.records(),
                    artifact,
                })
            }
            Err(err) => {
                let message = err.to_string();
                guard.fail(message.clone());
                error!(?experiment_id, duration_ms, error = %message, "Pipeline failed");
                self.event_sink.emit(
                    PIPELINE_FAILED,
                    Some(json!({
                        "experiment_id": experiment_id,
                        "duration_ms": duration_ms,
                        "stage": err.failed_stage(),
                        "error": message,
                    })),
                );
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RunOutcome, StageName, StageStatus};
    use crate::events::CollectingEventSink;
    use crate::testing::{Gate, MockPipelineFactory};

    fn pipeline(factory: Arc<MockPipelineFactory>) -> (Arc<Pipeline>, Arc<CollectingEventSink>) {
        let sink = Arc::new(CollectingEventSink::new());
        let pipeline = Pipeline::new(factory, Arc::new(ExperimentTracker::new()))
            .with_event_sink(sink.clone());
        (Arc::new(pipeline), sink)
    }

    #[test]
    fn test_run_executes_every_stage_in_order() {
        let factory = Arc::new(MockPipelineFactory::new());
        let (pipeline, sink) = pipeline(factory.clone());

        let summary = pipeline.run().unwrap();
        let expected: Vec<String> = StageName::ALL.iter().map(|s| s.as_str().to_string()).collect();
        assert_eq!(factory.calls(), expected);
        assert_eq!(summary.stages.len(), 6);
        assert!(summary.stages.iter().all(|s| s.status == StageStatus::Completed));
        assert_eq!(summary.experiment.outcome, Some(RunOutcome::Succeeded));
        assert_eq!(summary.experiment.model_accuracy, Some(0.9));

        let types = sink.event_types();
        assert_eq!(types.first().map(String::as_str), Some(PIPELINE_STARTED));
        assert_eq!(types.last().map(String::as_str), Some(PIPELINE_COMPLETED));
        assert_eq!(sink.events_of_type("stage.completed").len(), 6);
    }

    #[test]
    fn test_failure_stops_later_stages_and_is_recorded() {
        let factory = Arc::new(MockPipelineFactory::failing_at(StageName::DataTransformation));
        let (pipeline, sink) = pipeline(factory.clone());

        let err = pipeline.run().unwrap_err();
        assert_eq!(err.failed_stage(), Some("data_transformation"));
        assert_eq!(
            factory.calls(),
            vec!["data_ingestion", "data_validation", "data_transformation"]
        );

        let record = pipeline.experiment();
        assert!(!pipeline.is_running());
        assert_eq!(record.outcome, Some(RunOutcome::Failed));
        assert!(record.message.contains("data_transformation"));
        assert_eq!(sink.events_of_type(PIPELINE_FAILED).len(), 1);
    }

    #[test]
    fn test_config_error_runs_no_stage() {
        let factory = Arc::new(MockPipelineFactory::broken());
        let (pipeline, _sink) = pipeline(factory.clone());

        let err = pipeline.run().unwrap_err();
        assert!(err.is_config());
        assert!(factory.calls().is_empty());
        assert!(!pipeline.is_running());
    }

    #[test]
    fn test_start_reports_running_until_worker_finishes() {
        let gate = Gate::new();
        let factory = Arc::new(MockPipelineFactory::gated(gate.clone()));
        let (pipeline, _sink) = pipeline(factory.clone());

        let handle = pipeline.start().unwrap();
        assert!(pipeline.is_running());
        assert!(pipeline.experiment().is_running());
        assert_eq!(handle.thread().name(), Some(RETRAIN_THREAD_NAME));

        assert!(matches!(pipeline.start(), Err(HousingError::AlreadyRunning)));

        gate.open();
        let summary = handle.join().unwrap().unwrap();
        assert!(!pipeline.is_running());
        assert!(summary.experiment.execution_time.unwrap() >= 0.0);
        assert_eq!(factory.build_count(), 1);
    }

    #[test]
    fn test_runs_can_follow_each_other() {
        let factory = Arc::new(MockPipelineFactory::new());
        let (pipeline, _sink) = pipeline(factory.clone());

        pipeline.start().unwrap().join().unwrap().unwrap();
        pipeline.run().unwrap();
        assert_eq!(factory.build_count(), 2);
    }
}
