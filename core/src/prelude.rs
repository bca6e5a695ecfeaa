use std::num::ParseIntError;
use std::time::Duration;

/// Shared configuration for the gating stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Inclusive lower bound on the envelope for a candidate.
    pub trigger_threshold: i64,
    /// Minimum interval between two emitted actions.
    pub cooldown: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            trigger_threshold: 22,
            cooldown: Duration::from_secs(1),
        }
    }
}

/// One `signal,envelope` pair read from the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub signal: i64,
    pub envelope: i64,
}

impl Sample {
    pub fn new(signal: i64, envelope: i64) -> Self {
        Self { signal, envelope }
    }
}

/// Decision attached to a sample as it moves through the stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pending,
    BelowThreshold,
    Candidate,
    Fire,
    Suppressed { since_last: Duration },
}

impl Verdict {
    pub fn fires(&self) -> bool {
        matches!(self, Verdict::Fire)
    }
}

/// Payload handed from one stage to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub sample: Sample,
    /// Arrival time, measured from the clock's origin.
    pub timestamp: Duration,
    pub verdict: Verdict,
}

impl Evaluation {
    pub fn new(sample: Sample, timestamp: Duration) -> Self {
        Self {
            sample,
            timestamp,
            verdict: Verdict::Pending,
        }
    }
}

/// A received line that could not be turned into a [`Sample`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SampleError {
    #[error("expected 2 comma-separated fields, found {found} in {line:?}")]
    FieldCount { line: String, found: usize },
    #[error("invalid integer {token:?} in {line:?}: {source}")]
    InvalidInteger {
        line: String,
        token: String,
        #[source]
        source: ParseIntError,
    },
    #[error("line is not valid UTF-8: {0}")]
    Encoding(String),
}

/// Failure of the serial connection itself. Always fatal to the loop.
#[derive(thiserror::Error, Debug)]
pub enum LinkError {
    #[error("unable to open {port}: {reason}")]
    Open { port: String, reason: String },
    #[error("read failed: {0}")]
    Read(#[from] std::io::Error),
    #[error("device error: {0}")]
    Device(String),
}

/// Common error type for stage execution.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum StageError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type StageResult<T> = Result<T, StageError>;

/// Anything that stops the trigger loop with an error.
#[derive(thiserror::Error, Debug)]
pub enum LoopError {
    #[error(transparent)]
    Link(#[from] LinkError),
    #[error(transparent)]
    Stage(#[from] StageError),
}

/// A single step of the gating pipeline.
pub trait TriggerStage {
    fn initialize(&mut self, config: &GateConfig) -> StageResult<()>;
    fn execute(&mut self, input: Evaluation) -> StageResult<Evaluation>;
    fn cleanup(&mut self);
}
