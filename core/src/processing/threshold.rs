use crate::prelude::{Evaluation, GateConfig, StageError, StageResult, TriggerStage, Verdict};

/// Marks samples whose envelope reaches the trigger threshold as candidates.
pub struct ThresholdGate {
    threshold: Option<i64>,
}

impl ThresholdGate {
    pub fn new() -> Self {
        Self { threshold: None }
    }
}

impl Default for ThresholdGate {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerStage for ThresholdGate {
    fn initialize(&mut self, config: &GateConfig) -> StageResult<()> {
        self.threshold = Some(config.trigger_threshold);
        Ok(())
    }

    fn execute(&mut self, mut input: Evaluation) -> StageResult<Evaluation> {
        let threshold = self
            .threshold
            .ok_or_else(|| StageError::Internal("threshold gate not initialized".into()))?;

        if input.verdict != Verdict::Pending {
            return Err(StageError::InvalidInput(format!(
                "threshold gate expects a pending sample, got {:?}",
                input.verdict
            )));
        }

        input.verdict = if input.sample.envelope >= threshold {
            Verdict::Candidate
        } else {
            Verdict::BelowThreshold
        };
        Ok(input)
    }

    fn cleanup(&mut self) {
        self.threshold = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::Sample;
    use std::time::Duration;

    fn initialized_gate(threshold: i64) -> ThresholdGate {
        let mut gate = ThresholdGate::new();
        gate.initialize(&GateConfig {
            trigger_threshold: threshold,
            cooldown: Duration::from_secs(1),
        })
        .unwrap();
        gate
    }

    #[test]
    fn threshold_is_inclusive() {
        let mut gate = initialized_gate(22);
        let at = gate
            .execute(Evaluation::new(Sample::new(0, 22), Duration::ZERO))
            .unwrap();
        assert_eq!(at.verdict, Verdict::Candidate);

        let below = gate
            .execute(Evaluation::new(Sample::new(0, 21), Duration::ZERO))
            .unwrap();
        assert_eq!(below.verdict, Verdict::BelowThreshold);
    }

    #[test]
    fn signal_field_is_ignored() {
        let mut gate = initialized_gate(22);
        let output = gate
            .execute(Evaluation::new(Sample::new(1000, 5), Duration::ZERO))
            .unwrap();
        assert_eq!(output.verdict, Verdict::BelowThreshold);
    }

    #[test]
    fn uninitialized_gate_reports_error() {
        let mut gate = ThresholdGate::new();
        let err = gate
            .execute(Evaluation::new(Sample::new(0, 30), Duration::ZERO))
            .unwrap_err();
        assert!(matches!(err, StageError::Internal(_)));

        let mut gate = initialized_gate(22);
        gate.cleanup();
        assert!(gate
            .execute(Evaluation::new(Sample::new(0, 30), Duration::ZERO))
            .is_err());
    }
}
