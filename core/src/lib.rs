//! Core trigger logic for the serial envelope trigger.
//!
//! Samples arrive as `signal,envelope` text lines, pass through a threshold
//! gate and a cooldown filter, and promoted samples fire a single media
//! play/pause action. Hardware access sits behind the traits in [`interface`]
//! so the loop can be driven by scripted sources in tests.

pub mod interface;
pub mod prelude;
pub mod processing;
pub mod session;
pub mod telemetry;

pub use prelude::{Evaluation, GateConfig, Sample, TriggerStage, Verdict};
pub use session::{run_session, LoopExit, Outcome, TriggerLoop};
