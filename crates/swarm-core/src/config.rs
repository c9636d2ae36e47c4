//! Mission configuration: the plain-text `key=value` file format of
//! spec.md §6. Loading is out of scope as a "hard part" per spec.md §1
//! but the loader itself is ambient plumbing every repo needs
//! (SPEC_FULL.md §1), so it lives here rather than being assumed away.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MissionConfig {
    /// Per-tick defence hit probability, percent (0..=100).
    pub defence_hit_pct: u8,
    /// Per-second link-loss probability, percent (0..=100).
    pub link_loss_pct: u8,
    /// Seconds of continuous link outage before LinkLost.
    pub reconnect_timeout_secs: u64,
    /// Max step magnitude per tick.
    pub speed: i32,
    /// Initial fuel per drone.
    pub fuel: i64,
    /// Advisory simulation tick budget.
    pub ticks: u64,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            defence_hit_pct: 30,
            link_loss_pct: 10,
            reconnect_timeout_secs: 4,
            speed: 2,
            fuel: 100,
            ticks: 1000,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl MissionConfig {
    /// Loads a config file. A missing file is not an error - spec.md
    /// §6 mandates falling back to defaults, and spec.md §7 classifies
    /// "file open failure when explicitly requested" as a logged,
    /// non-fatal configuration error.
    pub fn load_file(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents),
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %path.display(), error = %err, "could not read config file, using defaults");
                } else {
                    tracing::info!(path = %path.display(), "no config file found, using defaults");
                }
                Self::default()
            }
        }
    }

    /// Parses `key=value` lines per spec.md §6. Unknown keys are
    /// ignored; unparseable numeric values keep the prior (default)
    /// value; all recognised values are clamped to their stated range.
    pub fn parse(contents: &str) -> Self {
        let mut cfg = Self::default();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "W" => apply(value, &mut cfg.defence_hit_pct, |v: i64| v.clamp(0, 100) as u8),
                "Q" => apply(value, &mut cfg.link_loss_pct, |v: i64| v.clamp(0, 100) as u8),
                "Z" => apply(value, &mut cfg.reconnect_timeout_secs, |v: i64| v.clamp(1, 60) as u64),
                "speed" => apply(value, &mut cfg.speed, |v: i64| v.max(1) as i32),
                "fuel" => apply(value, &mut cfg.fuel, |v: i64| v.max(0)),
                "ticks" => apply(value, &mut cfg.ticks, |v: i64| v.max(0) as u64),
                _ => tracing::debug!(key, "ignoring unknown config key"),
            }
        }
        cfg
    }
}

fn apply<T>(raw: &str, field: &mut T, clamp: impl Fn(i64) -> T) {
    match raw.parse::<i64>() {
        Ok(v) => *field = clamp(v),
        Err(_) => tracing::warn!(value = raw, "unparseable config value, keeping default"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_keep_defaults() {
        let cfg = MissionConfig::parse("");
        assert_eq!(cfg, MissionConfig::default());
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let cfg = MissionConfig::parse("W=500\nQ=-10\nZ=0\n");
        assert_eq!(cfg.defence_hit_pct, 100);
        assert_eq!(cfg.link_loss_pct, 0);
        assert_eq!(cfg.reconnect_timeout_secs, 1);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let cfg = MissionConfig::parse("bogus=1\nW=40\n");
        assert_eq!(cfg.defence_hit_pct, 40);
    }

    #[test]
    fn unparseable_numeric_value_keeps_default() {
        let cfg = MissionConfig::parse("speed=fast\n");
        assert_eq!(cfg.speed, MissionConfig::default().speed);
    }
}
