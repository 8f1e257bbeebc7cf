// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Per-metric sample collection owned by the orchestrator.
//!
//! Created empty at experiment start, filled once per completed replication
//! (finite horizon) or once from the engine's batches (infinite horizon),
//! then consumed by [`MetricAggregator::into_series`].

use crate::engine::EngineFailure;
use crate::types::{BatchedMetrics, Metric, ObservationSeries, ReplicationSummary, METRIC_COUNT};

#[derive(Debug, Clone)]
pub struct MetricAggregator {
    samples: [Vec<f64>; METRIC_COUNT],
    completed: usize,
}

impl Default for MetricAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricAggregator {
    pub fn new() -> Self {
        Self { samples: std::array::from_fn(|_| Vec::new()), completed: 0 }
    }

    /// Append one value per metric. All nine series grow together, so each
    /// stays exactly as long as the number of completed replications.
    pub fn record_replication(&mut self, summary: &ReplicationSummary) {
        for metric in Metric::ALL {
            self.samples[metric.index()].push(summary.get(metric));
        }
        self.completed += 1;
    }

    /// Take over the engine's batched series. Every fixed key must be present;
    /// keys outside the fixed set are ignored.
    pub fn extend_batched(&mut self, mut batches: BatchedMetrics) -> Result<(), EngineFailure> {
        let mut taken: [Option<Vec<f64>>; METRIC_COUNT] = std::array::from_fn(|_| None);
        for metric in Metric::ALL {
            let series = batches.remove(metric.key()).ok_or_else(|| {
                EngineFailure::new(format!("batched output is missing key '{}'", metric.key()))
            })?;
            taken[metric.index()] = Some(series);
        }
        for (slot, series) in self.samples.iter_mut().zip(taken) {
            slot.extend(series.into_iter().flatten());
        }
        Ok(())
    }

    pub fn completed_replications(&self) -> usize {
        self.completed
    }

    pub fn series(&self, metric: Metric) -> &[f64] {
        &self.samples[metric.index()]
    }

    pub fn into_series(self) -> Vec<ObservationSeries> {
        Metric::ALL
            .into_iter()
            .zip(self.samples)
            .map(|(metric, values)| ObservationSeries::new(metric, values))
            .collect()
    }
}
