use crate::prelude::{Evaluation, GateConfig, Sample, StageResult, TriggerStage, Verdict};
use crate::processing::cooldown::CooldownFilter;
use crate::processing::threshold::ThresholdGate;
use std::time::Duration;

/// Threshold gate followed by the cooldown filter.
pub struct TriggerPipeline {
    gate: ThresholdGate,
    cooldown: CooldownFilter,
}

impl TriggerPipeline {
    pub fn new(config: &GateConfig) -> StageResult<Self> {
        let mut gate = ThresholdGate::new();
        gate.initialize(config)?;
        let mut cooldown = CooldownFilter::new();
        cooldown.initialize(config)?;
        Ok(Self { gate, cooldown })
    }

    pub fn evaluate(&mut self, sample: Sample, now: Duration) -> StageResult<Verdict> {
        let gated = self.gate.execute(Evaluation::new(sample, now))?;
        let filtered = self.cooldown.execute(gated)?;
        Ok(filtered.verdict)
    }

    pub fn last_trigger(&self) -> Option<Duration> {
        self.cooldown.last_trigger()
    }
}

impl Drop for TriggerPipeline {
    fn drop(&mut self) {
        self.gate.cleanup();
        self.cooldown.cleanup();
    }
}
