use crate::prelude::{Sample, SampleError};
use log::{debug, info, warn};
use std::time::Duration;

/// Operator-facing diagnostics for each loop event.
pub struct LogManager;

impl LogManager {
    pub fn new() -> Self {
        Self
    }

    pub fn record(&self, message: &str) {
        info!("{}", message);
    }

    pub fn sample(&self, sample: &Sample) {
        info!("Signal: {}, Envelope: {}", sample.signal, sample.envelope);
    }

    pub fn malformed(&self, err: &SampleError) {
        warn!("Invalid data received: {}", err);
    }

    pub fn fired(&self, at: Duration) {
        info!("Playing or pausing the audio (t={:.3}s)", at.as_secs_f64());
    }

    pub fn suppressed(&self, since_last: Duration, cooldown: Duration) {
        info!(
            "Cooldown in effect, no trigger ({:.3}s of {:.3}s elapsed).",
            since_last.as_secs_f64(),
            cooldown.as_secs_f64()
        );
    }

    pub fn skipped(&self) {
        debug!("Skipping blank line");
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
