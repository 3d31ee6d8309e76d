use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// LoRaWAN port the device firmware listens on for timeserver answers (TIMEPORT).
pub const DEFAULT_ANSWER_PORT: u8 = 9;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeserverConfig {
    pub tolerance_ms: u32,          // max age of a gateway timestamp relative to server time
    pub end_of_sync_seq_no: u8,     // device marks the end of a handshake with this sequence number
    pub answer_port: u8,
    pub confirmed_downlink: bool,
}

impl Default for TimeserverConfig {
    fn default() -> Self {
        TimeserverConfig {
            tolerance_ms: 1000,
            end_of_sync_seq_no: 255,
            answer_port: DEFAULT_ANSWER_PORT,
            confirmed_downlink: false,
        }
    }
}

impl TimeserverConfig {
    /// Load a JSON config file. Fields missing from the file keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: TimeserverConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tolerance_ms == 0 {
            return Err(anyhow!("tolerance_ms must be greater than zero"));
        }
        // FPort 0 carries MAC commands, 224..=255 are reserved
        if self.answer_port == 0 || self.answer_port >= 224 {
            return Err(anyhow!(
                "answer_port {} is not a valid application port (1..=223)",
                self.answer_port
            ));
        }
        Ok(())
    }
}
