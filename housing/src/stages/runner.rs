//! Executes stages one at a time and records what happened.

use super::Stage;
use crate::core::StageStatus;
use crate::errors::StageError;
use crate::events::{EventSink, STAGE_COMPLETED, STAGE_FAILED, STAGE_STARTED};
use crate::observability::SpanTimer;
use crate::utils::timestamps::{now_utc, Timestamp};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

/// Outcome of one stage execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    /// Stage name.
    pub name: String,
    pub status: StageStatus,
    pub started_at: Timestamp,
    pub finished_at: Option<Timestamp>,
    pub duration_ms: Option<f64>,
    /// Error message if the stage failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs stages and keeps a [`StageRecord`] for each.
///
/// One runner is created per pipeline run.
pub struct StageRunner {
    event_sink: Arc<dyn EventSink>,
    records: Mutex<Vec<StageRecord>>,
}

impl std::fmt::Debug for StageRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageRunner")
            .field("records", &self.records.lock().len())
            .finish()
    }
}

impl StageRunner {
    /// Creates a runner that reports to `event_sink`.
    #[must_use]
    pub fn new(event_sink: Arc<dyn EventSink>) -> Self {
        Self {
            event_sink,
            records: Mutex::new(Vec::new()),
        }
    }

    /// Runs one stage, wrapping any failure with the stage name.
    pub fn run_stage<S: Stage>(&self, stage: &S, input: S::Input) -> Result<S::Output, StageError> {
        let name = stage.name().to_string();
        let started_at = now_utc();
        let timer = SpanTimer::start(&name);

        info!(stage = %name, "Stage started");
        self.event_sink
            .emit(STAGE_STARTED, Some(json!({ "stage": name })));

        let result = stage.run(input);
        let duration_ms = timer.elapsed_ms();
        let mut record = StageRecord {
            name: name.clone(),
            status: StageStatus::Completed,
            started_at,
            finished_at: Some(now_utc()),
            duration_ms: Some(duration_ms),
            error: None,
        };

        match result {
            Ok(output) => {
                info!(stage = %name, duration_ms, "Stage completed");
                self.event_sink.emit(
                    STAGE_COMPLETED,
                    Some(json!({ "stage": name, "duration_ms": duration_ms })),
                );
                self.records.lock().push(record);
                Ok(output)
            }
            Err(err) => {
                let err = StageError::new(name.clone(), err);
                let message = err.cause().to_string();
                error!(stage = %name, duration_ms, error = %message, "Stage failed");
                self.event_sink.emit(
                    STAGE_FAILED,
                    Some(json!({ "stage": name, "duration_ms": duration_ms, "error": message })),
                );
                record.status = StageStatus::Failed;
                record.error = Some(message);
                self.records.lock().push(record);
                Err(err)
            }
        }
    }

    /// Records of every stage run so far, in execution order.
    #[must_use]
    pub fn records(&self) -> Vec<StageRecord> {
        self.records.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HousingError;
    use crate::events::CollectingEventSink;
    use crate::stages::FnStage;

    #[test]
    fn test_records_success() {
        let sink = Arc::new(CollectingEventSink::new());
        let runner = StageRunner::new(sink.clone());

        let out = runner
            .run_stage(&FnStage::new("double", |n: u32| Ok(n * 2)), 4)
            .unwrap();
        assert_eq!(out, 8);

        let records = runner.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, StageStatus::Completed);
        assert!(records[0].duration_ms.unwrap() >= 0.0);
        assert_eq!(sink.event_types(), vec![STAGE_STARTED, STAGE_COMPLETED]);
    }

    #[test]
    fn test_records_failure() {
        let sink = Arc::new(CollectingEventSink::new());
        let runner = StageRunner::new(sink.clone());
        let stage = FnStage::new("broken", |(): ()| -> Result<(), HousingError> {
            Err(HousingError::Internal("boom".into()))
        });

        let err = runner.run_stage(&stage, ()).unwrap_err();
        assert_eq!(err.stage, "broken");
        assert!(matches!(err.cause(), HousingError::Internal(_)));

        let records = runner.records();
        assert_eq!(records[0].status, StageStatus::Failed);
        assert_eq!(records[0].error.as_deref(), Some("Internal error: boom"));
        assert_eq!(sink.event_types(), vec![STAGE_STARTED, STAGE_FAILED]);
    }
}
