//! Mock stages and pipeline factories for testing.

use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::{ModelPusherArtifact, StageName};
use crate::errors::{ConfigError, HousingError, HousingResult};
use crate::pipeline::{PipelineFactory, TrainingPipeline};
use crate::stages::{Stage, StageChain};

/// Longest time a [`Gate`] holds a waiting stage.
const GATE_TIMEOUT: Duration = Duration::from_secs(10);

/// A one-shot latch that holds stages until a test releases them.
#[derive(Debug, Default)]
pub struct Gate {
    open: Mutex<bool>,
    opened: Condvar,
}

impl Gate {
    /// Creates a closed gate.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Opens the gate, releasing every waiter.
    pub fn open(&self) {
        *self.open.lock() = true;
        self.opened.notify_all();
    }

    /// Blocks until the gate opens or [`GATE_TIMEOUT`] passes.
    pub fn wait(&self) {
        let deadline = Instant::now() + GATE_TIMEOUT;
        let mut open = self.open.lock();
        while !*open {
            if self.opened.wait_until(&mut open, deadline).timed_out() {
                break;
            }
        }
    }
}

/// A stage that appends its name to a shared call log and returns a fixed
/// output.
pub struct RecordingStage<I, O> {
    name: String,
    calls: Arc<Mutex<Vec<String>>>,
    output: O,
    fail: bool,
    gate: Option<Arc<Gate>>,
    _input: PhantomData<fn(I)>,
}

impl<I, O> RecordingStage<I, O> {
    /// Creates a stage that logs to `calls` and returns `output`.
    #[must_use]
    pub fn new(name: impl Into<String>, calls: Arc<Mutex<Vec<String>>>, output: O) -> Self {
        Self {
            name: name.into(),
            calls,
            output,
            fail: false,
            gate: None,
            _input: PhantomData,
        }
    }

    /// Makes the stage fail after logging the call.
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Makes the stage wait on `gate` before doing anything.
    #[must_use]
    pub fn gated(mut self, gate: Arc<Gate>) -> Self {
        self.gate = Some(gate);
        self
    }
}

impl<I, O> fmt::Debug for RecordingStage<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingStage")
            .field("name", &self.name)
            .field("fail", &self.fail)
            .finish_non_exhaustive()
    }
}

impl<I, O> Stage for RecordingStage<I, O>
where
    O: Clone + Send + Sync,
{
    type Input = I;
    type Output = O;

    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, _input: I) -> HousingResult<O> {
        if let Some(gate) = &self.gate {
            gate.wait();
        }
        self.calls.lock().push(self.name.clone());
        if self.fail {
            return Err(HousingError::Internal(format!("{} failed", self.name)));
        }
        Ok(self.output.clone())
    }
}

/// A stage that always fails with an internal error.
pub struct FailingStage<T> {
    name: String,
    error: String,
    _types: PhantomData<fn(T) -> T>,
}

impl<T> FailingStage<T> {
    /// Creates a new failing stage.
    #[must_use]
    pub fn new(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            error: error.into(),
            _types: PhantomData,
        }
    }
}

impl<T> fmt::Debug for FailingStage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FailingStage")
            .field("name", &self.name)
            .field("error", &self.error)
            .finish()
    }
}

impl<T> Stage for FailingStage<T> {
    type Input = T;
    type Output = T;

    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, _input: T) -> HousingResult<T> {
        Err(HousingError::Internal(self.error.clone()))
    }
}

/// A factory that builds six recording stages named after the real ones.
#[derive(Debug, Default)]
pub struct MockPipelineFactory {
    calls: Arc<Mutex<Vec<String>>>,
    time_stamps: Mutex<Vec<String>>,
    builds: AtomicUsize,
    fail_at: Option<StageName>,
    gate: Option<Arc<Gate>>,
    broken: bool,
}

impl MockPipelineFactory {
    /// A factory whose pipelines always succeed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory whose pipelines fail at `stage`.
    #[must_use]
    pub fn failing_at(stage: StageName) -> Self {
        Self {
            fail_at: Some(stage),
            ..Self::default()
        }
    }

    /// A factory whose pipelines hold their first stage until `gate` opens.
    #[must_use]
    pub fn gated(gate: Arc<Gate>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    /// A factory that cannot build, as if the configuration were invalid.
    #[must_use]
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    /// Stage names executed so far, across every build.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Number of pipelines built.
    #[must_use]
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    /// Timestamps passed to [`PipelineFactory::build`].
    #[must_use]
    pub fn time_stamps(&self) -> Vec<String> {
        self.time_stamps.lock().clone()
    }

    fn stage<O>(&self, name: StageName, output: O) -> RecordingStage<(), O> {
        let mut stage = RecordingStage::new(name.as_str(), Arc::clone(&self.calls), output);
        if self.fail_at == Some(name) {
            stage = stage.failing();
        }
        if let (StageName::DataIngestion, Some(gate)) = (name, &self.gate) {
            stage = stage.gated(Arc::clone(gate));
        }
        stage
    }
}

impl PipelineFactory for MockPipelineFactory {
    fn build(&self, time_stamp: &str) -> HousingResult<TrainingPipeline> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        self.time_stamps.lock().push(time_stamp.to_string());
        if self.broken {
            return Err(ConfigError::missing_key("data_ingestion_config", "dataset_download_url").into());
        }

        let pushed = ModelPusherArtifact {
            is_model_pushed: true,
            export_model_file_path: None,
            checksum: None,
            model_accuracy: 0.9,
            message: "mock push".to_string(),
        };
        let chain = StageChain::new(self.stage(StageName::DataIngestion, ()))
            .then(self.stage(StageName::DataValidation, ()))
            .then(self.stage(StageName::DataTransformation, ()))
            .then(self.stage(StageName::ModelTrainer, ()))
            .then(self.stage(StageName::ModelEvaluation, ()))
            .then(self.stage(StageName::ModelPusher, pushed));
        Ok(Box::new(chain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NoOpEventSink;
    use crate::stages::{StageRunner, StageSequence};

    #[test]
    fn test_mock_factory_runs_stages_in_order() {
        let factory = MockPipelineFactory::new();
        let pipeline = factory.build("20240101000000").unwrap();
        let artifact = pipeline
            .execute((), &StageRunner::new(Arc::new(NoOpEventSink)))
            .unwrap();

        assert!(artifact.is_model_pushed);
        let expected: Vec<String> = StageName::ALL.iter().map(|s| s.as_str().to_string()).collect();
        assert_eq!(factory.calls(), expected);
        assert_eq!(pipeline.stage_names(), expected);
        assert_eq!(factory.build_count(), 1);
    }

    #[test]
    fn test_failing_stage_always_errors() {
        let stage = FailingStage::<u8>::new("boom", "kaboom");
        assert!(matches!(stage.run(1), Err(HousingError::Internal(ref m)) if m == "kaboom"));
    }

    #[test]
    fn test_gate_releases_waiters() {
        let gate = Gate::new();
        let waiter = {
            let gate = Arc::clone(&gate);
            std::thread::spawn(move || gate.wait())
        };
        gate.open();
        waiter.join().unwrap();
    }
}
