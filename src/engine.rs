// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Contract with the external simulation engine.
//!
//! The engine owns the queueing model and every random stream. This layer
//! plants one seed, asks for runs, and treats each call as synchronous and
//! fallible.

use crate::types::{BatchedMetrics, ReplicationResult};

/// Fault raised by the engine for a single call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct EngineFailure {
    pub message: String,
}

impl EngineFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// A seeded discrete-event simulation of the Monitor/Plan system.
///
/// Implementations must be fully repeatable given the planted seed: the
/// same seed followed by the same sequence of calls yields the same output.
pub trait SimulationEngine {
    /// Seed the shared random stream. Called once per experiment, before
    /// any run; per-replication streams are derived by the engine.
    fn plant_seeds(&mut self, seed: u64);

    /// One finite-horizon replication stopped at `stop_time` simulated time.
    fn simulate(&mut self, stop_time: f64) -> Result<ReplicationResult, EngineFailure>;

    /// One long steady-state run, already reduced to batch means of
    /// `batch_size` observations per metric key.
    fn simulate_batched(
        &mut self,
        stop_time: f64,
        batch_size: usize,
    ) -> Result<BatchedMetrics, EngineFailure>;
}

impl<E: SimulationEngine + ?Sized> SimulationEngine for &mut E {
    fn plant_seeds(&mut self, seed: u64) {
        (**self).plant_seeds(seed)
    }

    fn simulate(&mut self, stop_time: f64) -> Result<ReplicationResult, EngineFailure> {
        (**self).simulate(stop_time)
    }

    fn simulate_batched(
        &mut self,
        stop_time: f64,
        batch_size: usize,
    ) -> Result<BatchedMetrics, EngineFailure> {
        (**self).simulate_batched(stop_time, batch_size)
    }
}
