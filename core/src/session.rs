//! The trigger loop and the scoped session around it.
//!
//! ```text
//!   SerialLink ──▶ decode/parse ──▶ ThresholdGate ──▶ CooldownFilter ──▶ ActionSink
//! ```

use crate::interface::{ActionSink, Clock, LineRead, LinkConnector, LinkGuard, SerialLink};
use crate::prelude::{GateConfig, LoopError, Sample, SampleError, StageResult, Verdict};
use crate::processing::{decode_line, parse_sample, TriggerPipeline};
use crate::telemetry::{LogManager, MetricsRecorder, MetricsSnapshot};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// How a run ended when no fatal error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    Interrupted,
    SourceExhausted,
}

/// Result of handling one received line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Skipped,
    Discarded(SampleError),
    Evaluated(Sample, Verdict),
}

pub struct TriggerLoop<A, C> {
    pipeline: TriggerPipeline,
    cooldown: Duration,
    sink: A,
    clock: C,
    idle_pause: Duration,
    logger: LogManager,
    metrics: MetricsRecorder,
}

impl<A: ActionSink, C: Clock> TriggerLoop<A, C> {
    pub fn new(config: &GateConfig, sink: A, clock: C) -> StageResult<Self> {
        Ok(Self {
            pipeline: TriggerPipeline::new(config)?,
            cooldown: config.cooldown,
            sink,
            clock,
            idle_pause: Duration::ZERO,
            logger: LogManager::new(),
            metrics: MetricsRecorder::new(),
        })
    }

    /// Sleep between polls that find no input. Zero spins.
    pub fn with_idle_pause(mut self, idle_pause: Duration) -> Self {
        self.idle_pause = idle_pause;
        self
    }

    /// Handles one raw line. Malformed input is logged and reported in the
    /// outcome; only stage misuse is an error.
    pub fn step(&mut self, raw: &[u8]) -> StageResult<Outcome> {
        self.metrics.record_line();

        let parsed = decode_line(raw).and_then(|line| {
            if line.is_empty() {
                Ok(None)
            } else {
                parse_sample(line).map(Some)
            }
        });

        let sample = match parsed {
            Ok(Some(sample)) => sample,
            Ok(None) => {
                self.logger.skipped();
                return Ok(Outcome::Skipped);
            }
            Err(err) => {
                self.logger.malformed(&err);
                self.metrics.record_malformed();
                return Ok(Outcome::Discarded(err));
            }
        };

        self.logger.sample(&sample);
        let now = self.clock.now();
        let verdict = self.pipeline.evaluate(sample, now)?;
        self.metrics.record_verdict(&verdict);

        match verdict {
            Verdict::Fire => {
                self.logger.fired(now);
                self.sink.play_pause();
            }
            Verdict::Suppressed { since_last } => self.logger.suppressed(since_last, self.cooldown),
            _ => {}
        }

        Ok(Outcome::Evaluated(sample, verdict))
    }

    /// Polls `link` until `shutdown` is raised, the source ends, or the link
    /// fails. The flag is checked before every poll, so the read timeout
    /// bounds how late an interrupt is noticed.
    pub fn run<L: SerialLink>(
        &mut self,
        link: &mut L,
        shutdown: &AtomicBool,
    ) -> Result<LoopExit, LoopError> {
        loop {
            if shutdown.load(Ordering::SeqCst) {
                self.logger.record("Exiting...");
                return Ok(LoopExit::Interrupted);
            }

            if !link.data_waiting()? {
                if !self.idle_pause.is_zero() {
                    thread::sleep(self.idle_pause);
                }
                continue;
            }

            match link.read_line()? {
                LineRead::Line(raw) => {
                    self.step(&raw)?;
                }
                LineRead::Idle => {}
                LineRead::Eof => {
                    self.logger
                        .record(&format!("{} reported end of stream", link.describe()));
                    return Ok(LoopExit::SourceExhausted);
                }
            }
        }
    }

    pub fn last_trigger(&self) -> Option<Duration> {
        self.pipeline.last_trigger()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

/// Opens a link through `connector`, runs `trigger` on it and releases the
/// link exactly once on every exit path. A failed open returns before any
/// link exists, so there is nothing to release.
pub fn run_session<K, A, C>(
    connector: &mut K,
    trigger: &mut TriggerLoop<A, C>,
    shutdown: &AtomicBool,
) -> Result<LoopExit, LoopError>
where
    K: LinkConnector,
    A: ActionSink,
    C: Clock,
{
    let mut guard = LinkGuard::new(connector.open()?);
    let outcome = trigger.run(guard.link_mut(), shutdown);
    guard.release();
    outcome
}
