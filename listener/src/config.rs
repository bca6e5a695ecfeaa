use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use triggercore::prelude::GateConfig;

/// Longest accepted per-line read timeout. The loop only notices an
/// interrupt between reads.
const MAX_READ_TIMEOUT_MS: u64 = 60 * 60 * 1_000;

#[cfg(windows)]
const DEFAULT_PORT: &str = "COM3";
#[cfg(not(windows))]
const DEFAULT_PORT: &str = "/dev/ttyACM0";

/// Static settings for one run. Every field has a built-in default, so a
/// config file only needs the values it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    pub port: String,
    pub baud_rate: u32,
    pub read_timeout_ms: u64,
    /// Wait after opening the port while the board resets.
    pub settle_delay_ms: u64,
    /// Sleep between polls that find no input.
    pub idle_pause_ms: u64,
    pub trigger_threshold: i64,
    pub cooldown_ms: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rate: 115_200,
            read_timeout_ms: 1_000,
            settle_delay_ms: 2_000,
            idle_pause_ms: 1,
            trigger_threshold: 22,
            cooldown_ms: 1_000,
        }
    }
}

impl ListenerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading listener config {}", path_ref.display()))?;
        let config: ListenerConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing listener config {}", path_ref.display()))?;
        config
            .validate()
            .with_context(|| format!("checking listener config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.read_timeout_ms > MAX_READ_TIMEOUT_MS {
            anyhow::bail!(
                "read_timeout_ms {} exceeds the maximum of {}",
                self.read_timeout_ms,
                MAX_READ_TIMEOUT_MS
            );
        }
        Ok(())
    }

    pub fn with_overrides(mut self, port: Option<String>, baud_rate: Option<u32>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(baud_rate) = baud_rate {
            self.baud_rate = baud_rate;
        }
        self
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn idle_pause(&self) -> Duration {
        Duration::from_millis(self.idle_pause_ms)
    }

    pub fn to_gate_config(&self) -> GateConfig {
        GateConfig {
            trigger_threshold: self.trigger_threshold,
            cooldown: Duration::from_millis(self.cooldown_ms),
        }
    }
}
