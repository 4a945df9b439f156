//! Stage trait, typed stage chains and the concrete pipeline stages.
//!
//! A stage consumes the artifact of the stage before it and produces its own.
//! Stages are composed with [`StageChain`]; the compiler checks that each
//! link's output type is the next link's input type, so a chain cannot be
//! assembled out of order.

mod evaluation;
mod fetcher;
mod ingestion;
mod pusher;
mod runner;
mod trainer;
mod transformation;
mod validation;

pub use evaluation::{EvaluatedModel, EvaluationRecord, ModelEvaluation};
pub use fetcher::{DatasetFetcher, UrlFetcher};
pub use ingestion::DataIngestion;
pub use pusher::ModelPusher;
pub use runner::{StageRecord, StageRunner};
pub use trainer::{ModelCandidate, ModelCatalog, ModelTrainer, MAX_TRAIN_TEST_GAP};
pub use transformation::DataTransformation;
pub use validation::{ColumnDrift, DataValidation, DriftReport, DRIFT_THRESHOLD};

#[cfg(test)]
pub use fetcher::MockDatasetFetcher;

use crate::errors::{HousingResult, StageError};
use std::fmt::{self, Debug};
use std::marker::PhantomData;

/// Trait for pipeline stages.
///
/// Stages run synchronously on the pipeline's worker thread and may block on
/// IO or model fitting.
pub trait Stage: Send + Sync {
    /// Artifact consumed from the previous stage.
    type Input;
    /// Artifact handed to the next stage.
    type Output;

    /// Returns the name of the stage.
    fn name(&self) -> &str;

    /// Executes the stage.
    fn run(&self, input: Self::Input) -> HousingResult<Self::Output>;
}

/// A runnable sequence of stages from `I` to `O`.
///
/// Object safe, so a factory can hand out a boxed pipeline whose concrete
/// chain type is not named.
pub trait StageSequence<I, O>: Send + Sync {
    /// Runs every stage in order through `runner`, stopping at the first
    /// failure.
    fn execute(&self, input: I, runner: &StageRunner) -> Result<O, StageError>;

    /// Names of the stages in execution order.
    fn stage_names(&self) -> Vec<String>;
}

/// The first link of a chain.
#[derive(Debug)]
pub struct StageChain<S> {
    stage: S,
}

impl<S: Stage> StageChain<S> {
    /// Starts a chain with `stage`.
    #[must_use]
    pub fn new(stage: S) -> Self {
        Self { stage }
    }

    /// Appends a stage that consumes this chain's output.
    #[must_use]
    pub fn then<N>(self, next: N) -> Then<Self, N>
    where
        N: Stage<Input = S::Output>,
    {
        Then { first: self, next }
    }
}

impl<S: Stage> StageSequence<S::Input, S::Output> for StageChain<S> {
    fn execute(&self, input: S::Input, runner: &StageRunner) -> Result<S::Output, StageError> {
        runner.run_stage(&self.stage, input)
    }

    fn stage_names(&self) -> Vec<String> {
        vec![self.stage.name().to_string()]
    }
}

/// A chain followed by one more stage.
#[derive(Debug)]
pub struct Then<A, B> {
    first: A,
    next: B,
}

impl<A, B: Stage> Then<A, B> {
    /// Appends a stage that consumes this chain's output.
    #[must_use]
    pub fn then<N>(self, next: N) -> Then<Self, N>
    where
        N: Stage<Input = B::Output>,
    {
        Then { first: self, next }
    }
}

impl<I, A, B> StageSequence<I, B::Output> for Then<A, B>
where
    A: StageSequence<I, B::Input>,
    B: Stage,
{
    fn execute(&self, input: I, runner: &StageRunner) -> Result<B::Output, StageError> {
        let intermediate = self.first.execute(input, runner)?;
        runner.run_stage(&self.next, intermediate)
    }

    fn stage_names(&self) -> Vec<String> {
        let mut names = self.first.stage_names();
        names.push(self.next.name().to_string());
        names
    }
}

/// A stage backed by a closure.
pub struct FnStage<I, O, F> {
    name: String,
    func: F,
    _types: PhantomData<fn(I) -> O>,
}

impl<I, O, F> FnStage<I, O, F>
where
    F: Fn(I) -> HousingResult<O> + Send + Sync,
{
    /// Creates a new function-based stage.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
            _types: PhantomData,
        }
    }
}

impl<I, O, F> Debug for FnStage<I, O, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnStage").field("name", &self.name).finish()
    }
}

impl<I, O, F> Stage for FnStage<I, O, F>
where
    F: Fn(I) -> HousingResult<O> + Send + Sync,
{
    type Input = I;
    type Output = O;

    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, input: I) -> HousingResult<O> {
        (self.func)(input)
    }
}
