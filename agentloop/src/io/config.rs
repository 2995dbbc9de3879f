//! Loop configuration stored in `agentloop.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Tunables for the cycle loop (TOML).
///
/// The file is optional and intended to be edited by humans; missing fields
/// default to the values the loop ships with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoopConfig {
    /// Agent executable invoked once per cycle.
    pub agent_bin: String,

    /// Hard wall-clock ceiling for one agent invocation, in seconds.
    pub agent_timeout_secs: u64,

    /// Truncate captured agent stdout/stderr beyond this many bytes.
    pub output_limit_bytes: usize,

    /// Chance that a cycle draws from the follow-up pool (after the first).
    pub followup_probability: f64,

    /// Chance that a generated instruction receives a single typo.
    pub typo_probability: f64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            agent_bin: "agent".to_string(),
            agent_timeout_secs: 300,
            output_limit_bytes: 100_000,
            followup_probability: 0.25,
            typo_probability: 0.3,
        }
    }
}

impl LoopConfig {
    pub fn validate(&self) -> Result<()> {
        if self.agent_bin.trim().is_empty() {
            return Err(anyhow!("agent_bin must be non-empty"));
        }
        if self.agent_timeout_secs == 0 {
            return Err(anyhow!("agent_timeout_secs must be > 0"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        for (name, value) in [
            ("followup_probability", self.followup_probability),
            ("typo_probability", self.typo_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(anyhow!("{name} must be within [0, 1], got {value}"));
            }
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// A missing file yields `LoopConfig::default()`.
pub fn load_config(path: &Path) -> Result<LoopConfig> {
    if !path.exists() {
        let cfg = LoopConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: LoopConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
