// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Trace replay engine.
//!
//! Replays the output the external simulator recorded to a JSON file:
//!
//! ```text
//! {
//!   "seed": 123456789,
//!   "replications": [ { "monitor_response_times": [..], .., "rho_plan": 0.41 },
//!                     { "failure": "event list exhausted" } ],
//!   "steady_state": { "monitor_response_times": [..raw observations..], .. }
//! }
//! ```
//!
//! Replications are handed out in recorded order. The steady-state section
//! holds unbatched observations; batch means are taken on request.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

use crate::batch_means::{discarded, reduce};
use crate::engine::{EngineFailure, SimulationEngine};
use crate::error::{AnalysisError, Result};
use crate::types::{BatchedMetrics, Metric, ReplicationResult};

/// One recorded replication: either its output or the fault it raised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TracedReplication {
    Failed { failure: String },
    Completed(ReplicationResult),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    /// Seed the simulator was run with, if recorded.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub replications: Vec<TracedReplication>,
    /// Raw steady-state observations keyed like the batched output.
    #[serde(default)]
    pub steady_state: Option<BTreeMap<String, Vec<f64>>>,
}

pub struct TraceEngine {
    trace: Trace,
    cursor: usize,
}

impl TraceEngine {
    pub fn new(trace: Trace) -> Self {
        Self { trace, cursor: 0 }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
        let engine = Self::from_json(&text)?;
        debug!(
            path = %path.display(),
            replications = engine.trace.replications.len(),
            steady_state = engine.trace.steady_state.is_some(),
            "trace loaded"
        );
        Ok(engine)
    }

    pub fn remaining(&self) -> usize {
        self.trace.replications.len().saturating_sub(self.cursor)
    }
}

impl SimulationEngine for TraceEngine {
    /// Rewinds to the first recorded replication.
    fn plant_seeds(&mut self, seed: u64) {
        if let Some(recorded) = self.trace.seed {
            if recorded != seed {
                warn!(recorded, planted = seed, "trace was recorded under a different seed");
            }
        }
        self.cursor = 0;
    }

    fn simulate(&mut self, stop_time: f64) -> std::result::Result<ReplicationResult, EngineFailure> {
        let recorded = self.trace.replications.get(self.cursor).cloned().ok_or_else(|| {
            EngineFailure::new(format!(
                "trace holds only {} replication(s)",
                self.trace.replications.len()
            ))
        })?;
        self.cursor += 1;
        debug!(replication = self.cursor, stop_time, "replaying replication");

        match recorded {
            TracedReplication::Completed(result) => Ok(result),
            TracedReplication::Failed { failure } => Err(EngineFailure::new(failure)),
        }
    }

    fn simulate_batched(
        &mut self,
        stop_time: f64,
        batch_size: usize,
    ) -> std::result::Result<BatchedMetrics, EngineFailure> {
        let raw = self
            .trace
            .steady_state
            .as_ref()
            .ok_or_else(|| EngineFailure::new("trace has no steady-state run"))?;
        debug!(stop_time, batch_size, "replaying steady-state run");
        for key in raw.keys().filter(|k| Metric::from_key(k).is_none()) {
            warn!(key = key.as_str(), "steady-state series matches no tracked metric");
        }

        raw.iter()
            .map(|(key, observations)| -> std::result::Result<_, EngineFailure> {
                let batches = reduce(observations, batch_size)
                    .map_err(|e| EngineFailure::new(e.to_string()))?;
                debug!(
                    key = key.as_str(),
                    observations = observations.len(),
                    batches = batches.len(),
                    discarded = discarded(observations.len(), batch_size),
                    "batched"
                );
                Ok((key.clone(), batches))
            })
            .collect()
    }
}
