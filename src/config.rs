// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Experiment configuration.
//!
//! [`AnalysisSettings`] holds the tunables that may come from a JSON
//! settings file; [`ExperimentConfig`] is the validated, mode-specific
//! configuration handed to the orchestrator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{AnalysisError, Result};

pub const DEFAULT_SEED: u64 = 123_456_789;
pub const DEFAULT_ALPHA: f64 = 0.05;
/// Simulated time at which each finite-horizon replication stops.
pub const FINITE_STOP_TIME: f64 = 20_000.0;
/// Simulated time of the single steady-state run.
pub const INFINITE_STOP_TIME: f64 = 2_000_000.0;
pub const DEFAULT_BATCH_SIZE: usize = 128;

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    Finite,
    Infinite,
}

impl FromStr for ModeKind {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "finite" => Ok(Self::Finite),
            "infinite" => Ok(Self::Infinite),
            other => Err(AnalysisError::invalid(format!(
                "unknown mode '{}', expected 'finite' or 'infinite'",
                other
            ))),
        }
    }
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite => write!(f, "finite"),
            Self::Infinite => write!(f, "infinite"),
        }
    }
}

/// Experimental design, fixed for the whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum HorizonMode {
    /// Independent replications, each stopped at `stop_time`.
    Finite { replications: usize, stop_time: f64 },
    /// One long run reduced to batch means by the engine.
    Infinite { stop_time: f64, batch_size: usize },
}

impl HorizonMode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Self::Finite { .. } => ModeKind::Finite,
            Self::Infinite { .. } => ModeKind::Infinite,
        }
    }
}

// ---------------------------------------------------------------------------
// ExperimentConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    pub seed: u64,
    /// Two-sided significance level of every reported interval.
    pub alpha: f64,
    pub horizon: HorizonMode,
}

impl ExperimentConfig {
    pub fn finite(replications: usize) -> Self {
        AnalysisSettings::default().experiment(ModeKind::Finite, replications)
    }

    pub fn infinite() -> Self {
        AnalysisSettings::default().experiment(ModeKind::Infinite, 0)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(AnalysisError::invalid(format!(
                "alpha must lie in (0, 1), got {}",
                self.alpha
            )));
        }
        let stop_time = match self.horizon {
            HorizonMode::Finite { replications, stop_time } => {
                if replications == 0 {
                    return Err(AnalysisError::invalid("replication count must be at least 1"));
                }
                stop_time
            }
            HorizonMode::Infinite { stop_time, batch_size } => {
                if batch_size == 0 {
                    return Err(AnalysisError::invalid("batch size must be at least 1"));
                }
                stop_time
            }
        };
        if !(stop_time.is_finite() && stop_time > 0.0) {
            return Err(AnalysisError::invalid(format!(
                "stop time must be positive, got {}",
                stop_time
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// AnalysisSettings
// ---------------------------------------------------------------------------

/// Settings file contents. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub seed: u64,
    pub alpha: f64,
    pub finite_stop_time: f64,
    pub infinite_stop_time: f64,
    pub batch_size: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            alpha: DEFAULT_ALPHA,
            finite_stop_time: FINITE_STOP_TIME,
            infinite_stop_time: INFINITE_STOP_TIME,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl AnalysisSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Build the configuration for `mode`. `replications` is only used by
    /// the finite horizon.
    pub fn experiment(&self, mode: ModeKind, replications: usize) -> ExperimentConfig {
        let horizon = match mode {
            ModeKind::Finite => HorizonMode::Finite {
                replications,
                stop_time: self.finite_stop_time,
            },
            ModeKind::Infinite => HorizonMode::Infinite {
                stop_time: self.infinite_stop_time,
                batch_size: self.batch_size,
            },
        };
        ExperimentConfig { seed: self.seed, alpha: self.alpha, horizon }
    }
}
