use crate::prelude::Verdict;

/// Per-run event counters for the trigger loop.
#[derive(Debug, Default)]
pub struct MetricsRecorder {
    inner: MetricsSnapshot,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub lines: usize,
    pub samples: usize,
    pub malformed: usize,
    pub candidates: usize,
    pub fired: usize,
    pub suppressed: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_line(&mut self) {
        self.inner.lines += 1;
    }

    pub fn record_malformed(&mut self) {
        self.inner.malformed += 1;
    }

    pub fn record_verdict(&mut self, verdict: &Verdict) {
        self.inner.samples += 1;
        match verdict {
            Verdict::Fire => {
                self.inner.candidates += 1;
                self.inner.fired += 1;
            }
            Verdict::Suppressed { .. } => {
                self.inner.candidates += 1;
                self.inner.suppressed += 1;
            }
            Verdict::Candidate => self.inner.candidates += 1,
            Verdict::Pending | Verdict::BelowThreshold => {}
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner
    }
}
