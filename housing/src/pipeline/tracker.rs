//! The experiment status record and the single-run guard.

use crate::core::{Experiment, ModelPusherArtifact, RunOutcome};
use crate::errors::{HousingError, HousingResult};
use crate::utils::fs::ensure_parent;
use csv::{ReaderBuilder, WriterBuilder};
use parking_lot::RwLock;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Message recorded when a run ends without reporting an outcome.
const ABORTED_MESSAGE: &str = "Pipeline aborted before reporting an outcome";

/// Holds the current experiment record and admits one run at a time.
///
/// The running flag is claimed with a compare-and-swap, so two triggers
/// racing each other cannot both start a run. Readers always see a
/// consistent snapshot of the record.
#[derive(Debug, Default)]
pub struct ExperimentTracker {
    current: RwLock<Experiment>,
    running: AtomicBool,
    history_path: Option<PathBuf>,
}

impl ExperimentTracker {
    /// Creates a tracker that keeps no history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tracker that appends finished runs to a CSV file.
    #[must_use]
    pub fn with_history(path: impl Into<PathBuf>) -> Self {
        Self {
            history_path: Some(path.into()),
            ..Self::default()
        }
    }

    /// Returns a snapshot of the current record.
    #[must_use]
    pub fn experiment(&self) -> Experiment {
        self.current.read().clone()
    }

    /// Returns true while a run holds the slot.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Claims the run slot for the run namespaced by `time_stamp`.
    ///
    /// Fails with [`HousingError::AlreadyRunning`] if another run holds it.
    pub fn try_begin(self: &Arc<Self>, time_stamp: &str) -> HousingResult<RunGuard> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(HousingError::AlreadyRunning);
        }

        let record = Experiment::started(time_stamp);
        info!(
            experiment_id = ?record.experiment_id,
            time_stamp,
            "Experiment started"
        );
        *self.current.write() = record;
        Ok(RunGuard {
            tracker: Arc::clone(self),
            done: false,
        })
    }

    /// Reads every finished run from the history file, oldest first.
    pub fn history(&self) -> HousingResult<Vec<Experiment>> {
        match &self.history_path {
            Some(path) if path.is_file() => {
                let mut reader = ReaderBuilder::new().from_path(path)?;
                Ok(reader.deserialize().collect::<Result<Vec<_>, _>>()?)
            }
            _ => Ok(Vec::new()),
        }
    }

    fn complete<F>(&self, outcome: RunOutcome, message: String, update: F) -> Experiment
    where
        F: FnOnce(&mut Experiment),
    {
        let finished = {
            let mut record = self.current.write();
            update(&mut *record);
            record.finish(outcome, message);
            record.clone()
        };

        if let Some(path) = &self.history_path {
            if let Err(err) = append_history(path, &finished) {
                warn!(path = %path.display(), error = %err, "Failed to append experiment history");
            }
        }
        info!(
            experiment_id = ?finished.experiment_id,
            outcome = ?finished.outcome,
            execution_time = ?finished.execution_time,
            "Experiment finished"
        );

        self.running.store(false, Ordering::Release);
        finished
    }
}

fn append_history(path: &Path, experiment: &Experiment) -> HousingResult<()> {
    ensure_parent(path)?;
    let is_new = !path.is_file() || path.metadata()?.len() == 0;
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = WriterBuilder::new().has_headers(is_new).from_writer(file);
    writer.serialize(experiment)?;
    writer.flush()?;
    Ok(())
}

/// Proof that the holder owns the run slot.
///
/// Dropping the guard without reporting an outcome (including while
/// unwinding from a panic) records the run as failed and frees the slot.
#[derive(Debug)]
pub struct RunGuard {
    tracker: Arc<ExperimentTracker>,
    done: bool,
}

impl RunGuard {
    /// Records a successful run and frees the slot.
    pub fn succeed(mut self, artifact: &ModelPusherArtifact) -> Experiment {
        self.done = true;
        self.tracker.complete(
            RunOutcome::Succeeded,
            artifact.message.clone(),
            |record| {
                record.model_accuracy = Some(artifact.model_accuracy);
                record.is_model_accepted = Some(artifact.is_model_pushed);
            },
        )
    }

    /// Records a failed run and frees the slot.
    pub fn fail(mut self, message: impl Into<String>) -> Experiment {
        self.done = true;
        self.tracker.complete(RunOutcome::Failed, message.into(), |_| {})
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        if !self.done {
            self.tracker
                .complete(RunOutcome::Failed, ABORTED_MESSAGE.to_string(), |_| {});
        }
    }
}
