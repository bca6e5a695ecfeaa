use crate::prelude::{Evaluation, GateConfig, StageError, StageResult, TriggerStage, Verdict};
use std::time::Duration;

/// Debounces candidates: at most one promotion per cooldown window.
///
/// The window is measured from the last *promoted* sample. Suppressed
/// candidates never move it, and nothing is queued.
pub struct CooldownFilter {
    cooldown: Option<Duration>,
    last_trigger: Option<Duration>,
}

impl CooldownFilter {
    pub fn new() -> Self {
        Self {
            cooldown: None,
            last_trigger: None,
        }
    }

    /// Timestamp of the most recent promotion, `None` until the first one.
    pub fn last_trigger(&self) -> Option<Duration> {
        self.last_trigger
    }
}

impl Default for CooldownFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerStage for CooldownFilter {
    fn initialize(&mut self, config: &GateConfig) -> StageResult<()> {
        self.cooldown = Some(config.cooldown);
        Ok(())
    }

    fn execute(&mut self, mut input: Evaluation) -> StageResult<Evaluation> {
        let cooldown = self
            .cooldown
            .ok_or_else(|| StageError::Internal("cooldown filter not initialized".into()))?;

        match input.verdict {
            Verdict::Candidate => {}
            Verdict::BelowThreshold => return Ok(input),
            other => {
                return Err(StageError::InvalidInput(format!(
                    "cooldown filter expects a gated sample, got {:?}",
                    other
                )))
            }
        }

        let now = input.timestamp;
        input.verdict = match self.last_trigger {
            Some(last) if now.saturating_sub(last) <= cooldown => Verdict::Suppressed {
                since_last: now.saturating_sub(last),
            },
            _ => {
                // Recorded before the caller emits, so a second candidate
                // at the same instant is already inside the window.
                self.last_trigger = Some(now);
                Verdict::Fire
            }
        };
        Ok(input)
    }

    fn cleanup(&mut self) {
        self.cooldown = None;
        self.last_trigger = None;
    }
}
