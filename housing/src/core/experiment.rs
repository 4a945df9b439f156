//! The experiment status record.

use super::status::{RunOutcome, RunState};
use crate::utils::timestamps::{elapsed_seconds, now_utc, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of the current or most recent retraining run.
///
/// One record is held by the experiment tracker for the life of the process.
/// Finished records are also appended to the experiment history file, so the
/// type round-trips through CSV: every field is a scalar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    /// Identifier of the run, absent before the first run.
    pub experiment_id: Option<Uuid>,
    /// Timestamp naming the run's artifact directories.
    pub artifact_time_stamp: Option<String>,
    pub state: RunState,
    pub start_time: Option<Timestamp>,
    pub stop_time: Option<Timestamp>,
    /// Wall-clock duration in seconds, set when the run stops.
    pub execution_time: Option<f64>,
    pub message: String,
    pub outcome: Option<RunOutcome>,
    /// Accuracy of the model trained by the run, if training completed.
    pub model_accuracy: Option<f64>,
    pub is_model_accepted: Option<bool>,
}

impl Default for Experiment {
    fn default() -> Self {
        Self::idle()
    }
}

impl Experiment {
    /// The record held before any run has started.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            experiment_id: None,
            artifact_time_stamp: None,
            state: RunState::Idle,
            start_time: None,
            stop_time: None,
            execution_time: None,
            message: "No retraining run has started".to_string(),
            outcome: None,
            model_accuracy: None,
            is_model_accepted: None,
        }
    }

    /// A fresh running record for the run namespaced by `time_stamp`.
    #[must_use]
    pub fn started(time_stamp: impl Into<String>) -> Self {
        Self {
            experiment_id: Some(Uuid::new_v4()),
            artifact_time_stamp: Some(time_stamp.into()),
            state: RunState::Running,
            start_time: Some(now_utc()),
            stop_time: None,
            execution_time: None,
            message: "Pipeline started".to_string(),
            outcome: None,
            model_accuracy: None,
            is_model_accepted: None,
        }
    }

    /// Marks the record finished, filling stop time and duration.
    pub fn finish(&mut self, outcome: RunOutcome, message: impl Into<String>) {
        let stop = now_utc();
        self.execution_time = self.start_time.map(|start| elapsed_seconds(&start, &stop));
        self.stop_time = Some(stop);
        self.state = RunState::Idle;
        self.outcome = Some(outcome);
        self.message = message.into();
    }

    /// Returns true while the run is active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }
}
