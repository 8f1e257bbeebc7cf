// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Two-Centre Output Analysis ("Monitor" and "Plan" service centres)

//! Output analysis for a two-centre discrete-event simulation.
//!
//! Raw observations come from an external engine ([`SimulationEngine`]).
//! The [`ExperimentOrchestrator`] runs either many finite-horizon
//! replications or one batched steady-state run and reports Student-t
//! confidence intervals for every tracked metric.

pub mod types;
pub mod error;
pub mod config;
pub mod estimator;
pub mod batch_means;
pub mod cumulative;
pub mod aggregator;
pub mod engine;
pub mod trace;
pub mod orchestrator;
pub mod report;
pub mod artifacts;

pub use types::*;
pub use error::{AnalysisError, Result};
pub use config::{AnalysisSettings, ExperimentConfig, HorizonMode, ModeKind};
pub use estimator::{estimate, ConfidenceEstimator};
pub use engine::{EngineFailure, SimulationEngine};
pub use trace::TraceEngine;
pub use orchestrator::{ExperimentOrchestrator, ExperimentOutcome, SteadyStateDiagnostics};
pub use report::ExperimentReport;
