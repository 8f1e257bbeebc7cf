// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Grouped interval report, printable and serialisable.

use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::config::{ExperimentConfig, HorizonMode, ModeKind};
use crate::error::{AnalysisError, Result};
use crate::types::{ConfidenceEstimate, Facility, Metric};

// ─── Per-Metric Estimate ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct MetricEstimate {
    pub metric: Metric,
    pub symbol: &'static str,
    #[serde(flatten)]
    pub estimate: ConfidenceEstimate,
}

impl MetricEstimate {
    pub fn new(metric: Metric, estimate: ConfidenceEstimate) -> Self {
        Self { metric, symbol: metric.symbol(), estimate }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FacilityReport {
    pub facility: Facility,
    pub metrics: Vec<MetricEstimate>,
}

/// A finite-horizon replication the engine failed to complete.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedReplication {
    /// 1-based replication number.
    pub index: usize,
    pub reason: String,
}

// ─── Experiment Report ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ExperimentReport {
    pub mode: ModeKind,
    pub seed: u64,
    pub alpha: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_replications: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
    pub failed_replications: Vec<FailedReplication>,
    pub facilities: Vec<FacilityReport>,
}

impl ExperimentReport {
    /// Group estimates by facility, keeping the order they were given in.
    pub fn new(
        config: &ExperimentConfig,
        estimates: Vec<MetricEstimate>,
        failed_replications: Vec<FailedReplication>,
    ) -> Self {
        let (requested_replications, batch_size) = match config.horizon {
            HorizonMode::Finite { replications, .. } => (Some(replications), None),
            HorizonMode::Infinite { batch_size, .. } => (None, Some(batch_size)),
        };

        let facilities = Facility::ALL
            .iter()
            .map(|&facility| FacilityReport {
                facility,
                metrics: estimates
                    .iter()
                    .filter(|e| e.metric.facility() == facility)
                    .cloned()
                    .collect(),
            })
            .collect();

        Self {
            mode: config.horizon.kind(),
            seed: config.seed,
            alpha: config.alpha,
            requested_replications,
            batch_size,
            failed_replications,
            facilities,
        }
    }

    pub fn estimate(&self, metric: Metric) -> Option<&ConfidenceEstimate> {
        self.facilities
            .iter()
            .flat_map(|f| f.metrics.iter())
            .find(|e| e.metric == metric)
            .map(|e| &e.estimate)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| AnalysisError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|e| AnalysisError::io(path, e))
    }
}

impl fmt::Display for ExperimentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let confidence = (1.0 - self.alpha) * 100.0;
        match (self.requested_replications, self.batch_size) {
            (Some(requested), _) => writeln!(
                f,
                "Finite horizon: {} replication(s) requested, {} failed, {:.0}% confidence",
                requested,
                self.failed_replications.len(),
                confidence
            )?,
            (None, Some(b)) => writeln!(
                f,
                "Infinite horizon: batch size {}, {:.0}% confidence",
                b, confidence
            )?,
            (None, None) => {}
        }

        for facility in &self.facilities {
            writeln!(f, "{}", facility.facility.title())?;
            for m in &facility.metrics {
                writeln!(
                    f,
                    "  {:<7}= {:.6} +/- {:.6}  (n = {})",
                    m.symbol, m.estimate.mean, m.estimate.half_width, m.estimate.n
                )?;
            }
        }
        Ok(())
    }
}
