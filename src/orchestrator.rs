// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Experiment orchestration.
//!
//! Drives the engine under one of two designs and turns its output into a
//! [`ExperimentReport`]:
//!
//! - **Finite horizon**: `n` independent replications. A replication the
//!   engine fails to complete is skipped and recorded; the intervals use the
//!   number of replications that actually completed.
//! - **Infinite horizon**: one long run the engine reduces to batch means.
//!   Any engine failure aborts the run. Running means of the response and
//!   waiting times are produced for convergence plots.

use tracing::{debug, info, warn};

use crate::aggregator::MetricAggregator;
use crate::config::{ExperimentConfig, HorizonMode};
use crate::cumulative::{combined, cumulative};
use crate::engine::SimulationEngine;
use crate::error::{AnalysisError, Result};
use crate::estimator::ConfidenceEstimator;
use crate::report::{ExperimentReport, FailedReplication, MetricEstimate};
use crate::types::{Metric, ObservationSeries, ReplicationSummary};

// ─── Outcome Types ───────────────────────────────────────────────────────────

/// Result of one finite-horizon replication attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplicationOutcome {
    Completed(ReplicationSummary),
    Failed(FailedReplication),
}

/// A running-mean curve and the grand mean it should settle on.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvergenceTrace {
    /// File stem of the rendered plot.
    pub name: &'static str,
    pub label: &'static str,
    pub title: &'static str,
    pub running_mean: Vec<f64>,
    pub reference: f64,
}

/// Side outputs of an infinite-horizon run.
#[derive(Debug, Clone, PartialEq)]
pub struct SteadyStateDiagnostics {
    pub traces: Vec<ConvergenceTrace>,
    /// Batched Monitor response-time-1 series, persisted as-is.
    pub response_time_1: Vec<f64>,
}

impl SteadyStateDiagnostics {
    pub fn trace(&self, name: &str) -> Option<&ConvergenceTrace> {
        self.traces.iter().find(|t| t.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct ExperimentOutcome {
    pub report: ExperimentReport,
    /// Present for infinite-horizon runs only.
    pub diagnostics: Option<SteadyStateDiagnostics>,
}

/// Series plotted as running means: (metric, file stem, axis label, title).
const CONVERGENCE_PLOTS: [(Metric, &str, &str, &str); 5] = [
    (
        Metric::MonitorResponseTime,
        "cumulative_response_time_monitor",
        "Cumulative Mean Response Time (Monitor)",
        "Cumulative Mean Response Time over Batches (Monitor Centre)",
    ),
    (
        Metric::MonitorResponseTime1,
        "cumulative_response_time1_monitor",
        "Cumulative Mean Response Time 1 (Monitor)",
        "Cumulative Mean Response Time 1 over Batches (Monitor Centre)",
    ),
    (
        Metric::MonitorWaitingTime,
        "cumulative_waiting_time_monitor",
        "Cumulative Mean Waiting Time (Monitor)",
        "Cumulative Mean Waiting Time over Batches (Monitor Centre)",
    ),
    (
        Metric::PlanResponseTime,
        "cumulative_response_time_plan",
        "Cumulative Mean Response Time (Plan)",
        "Cumulative Mean Response Time over Batches (Plan Centre)",
    ),
    (
        Metric::PlanWaitingTime,
        "cumulative_waiting_time_plan",
        "Cumulative Mean Waiting Time (Plan)",
        "Cumulative Mean Waiting Time over Batches (Plan Centre)",
    ),
];

// ─── Orchestrator ────────────────────────────────────────────────────────────

pub struct ExperimentOrchestrator<E> {
    engine: E,
    config: ExperimentConfig,
    estimator: ConfidenceEstimator,
}

impl<E: SimulationEngine> ExperimentOrchestrator<E> {
    /// Validates the configuration before the engine is touched.
    pub fn new(engine: E, config: ExperimentConfig) -> Result<Self> {
        config.validate()?;
        let estimator = ConfidenceEstimator::new(config.alpha)?;
        Ok(Self { engine, config, estimator })
    }

    /// Run the configured experiment once.
    pub fn run(mut self) -> Result<ExperimentOutcome> {
        info!(
            mode = %self.config.horizon.kind(),
            seed = self.config.seed,
            alpha = self.config.alpha,
            "starting experiment"
        );
        self.engine.plant_seeds(self.config.seed);

        match self.config.horizon {
            HorizonMode::Finite { replications, stop_time } => {
                self.run_finite(replications, stop_time)
            }
            HorizonMode::Infinite { stop_time, batch_size } => {
                self.run_infinite(stop_time, batch_size)
            }
        }
    }

    fn run_finite(&mut self, replications: usize, stop_time: f64) -> Result<ExperimentOutcome> {
        let mut aggregator = MetricAggregator::new();
        let mut failed = Vec::new();

        for index in 1..=replications {
            match self.run_replication(index, stop_time) {
                ReplicationOutcome::Completed(summary) => aggregator.record_replication(&summary),
                ReplicationOutcome::Failed(failure) => failed.push(failure),
            }
        }

        let completed = aggregator.completed_replications();
        info!(requested = replications, completed, failed = failed.len(), "replications finished");
        if completed == 0 {
            return Err(AnalysisError::invalid(format!(
                "all {} replication(s) failed; nothing to estimate",
                replications
            )));
        }

        let (estimates, _) = self.estimate_all(aggregator)?;
        Ok(ExperimentOutcome {
            report: ExperimentReport::new(&self.config, estimates, failed),
            diagnostics: None,
        })
    }

    /// One replication. Only engine faults are absorbed here; they never
    /// abort the experiment.
    pub fn run_replication(&mut self, index: usize, stop_time: f64) -> ReplicationOutcome {
        let result = self.engine.simulate(stop_time).and_then(|r| r.summarize());
        match result {
            Ok(summary) => {
                debug!(replication = index, "replication completed");
                ReplicationOutcome::Completed(summary)
            }
            Err(failure) => {
                warn!(replication = index, error = %failure, "replication failed, skipping");
                ReplicationOutcome::Failed(FailedReplication {
                    index,
                    reason: failure.message,
                })
            }
        }
    }

    fn run_infinite(&mut self, stop_time: f64, batch_size: usize) -> Result<ExperimentOutcome> {
        let batches = self.engine.simulate_batched(stop_time, batch_size)?;

        let mut aggregator = MetricAggregator::new();
        aggregator.extend_batched(batches)?;
        for metric in Metric::ALL {
            debug!(metric = %metric, batches = aggregator.series(metric).len(), "batched series received");
        }

        let (estimates, series) = self.estimate_all(aggregator)?;
        let diagnostics = steady_state_diagnostics(&series, &estimates);
        info!(traces = diagnostics.traces.len(), "convergence diagnostics computed");

        Ok(ExperimentOutcome {
            report: ExperimentReport::new(&self.config, estimates, Vec::new()),
            diagnostics: Some(diagnostics),
        })
    }

    /// Consume the aggregator: one estimate per metric, n taken from the
    /// accumulated length of each series.
    fn estimate_all(
        &self,
        aggregator: MetricAggregator,
    ) -> Result<(Vec<MetricEstimate>, Vec<ObservationSeries>)> {
        let series = aggregator.into_series();
        let estimates = series
            .iter()
            .map(|s| {
                self.estimator
                    .estimate(&s.values)
                    .map(|e| MetricEstimate::new(s.metric, e))
                    .map_err(|e| match e {
                        AnalysisError::InvalidInput(msg) => {
                            AnalysisError::InvalidInput(format!("{}: {}", s.metric, msg))
                        }
                        other => other,
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok((estimates, series))
    }
}

fn series_values(series: &[ObservationSeries], metric: Metric) -> &[f64] {
    series
        .iter()
        .find(|s| s.metric == metric)
        .map(|s| s.values.as_slice())
        .unwrap_or(&[])
}

fn grand_mean(estimates: &[MetricEstimate], metric: Metric) -> f64 {
    estimates
        .iter()
        .find(|e| e.metric == metric)
        .map(|e| e.estimate.mean)
        .unwrap_or(0.0)
}

fn steady_state_diagnostics(
    series: &[ObservationSeries],
    estimates: &[MetricEstimate],
) -> SteadyStateDiagnostics {
    let values = |metric: Metric| series_values(series, metric);
    let reference = |metric: Metric| grand_mean(estimates, metric);

    let mut traces: Vec<ConvergenceTrace> = CONVERGENCE_PLOTS
        .iter()
        .map(|&(metric, name, label, title)| ConvergenceTrace {
            name,
            label,
            title,
            running_mean: cumulative(values(metric)),
            reference: reference(metric),
        })
        .collect();

    let running = |metric: Metric| cumulative(values(metric));
    traces.push(ConvergenceTrace {
        name: "qos1",
        label: "Cumulative Mean Response Time (Monitor + Plan)",
        title: "QoS 1: End-to-End Response Time over Batches",
        running_mean: combined(
            &running(Metric::MonitorResponseTime),
            &running(Metric::PlanResponseTime),
        ),
        reference: reference(Metric::MonitorResponseTime) + reference(Metric::PlanResponseTime),
    });
    traces.push(ConvergenceTrace {
        name: "qos2",
        label: "Cumulative Mean Response Time 1 (Monitor) + Response Time (Plan)",
        title: "QoS 2: End-to-End Response Time 1 over Batches",
        running_mean: combined(
            &running(Metric::MonitorResponseTime1),
            &running(Metric::PlanResponseTime),
        ),
        reference: reference(Metric::MonitorResponseTime1) + reference(Metric::PlanResponseTime),
    });

    SteadyStateDiagnostics {
        traces,
        response_time_1: values(Metric::MonitorResponseTime1).to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineFailure;
    use crate::types::{BatchedMetrics, ReplicationResult};

    /// Replays a fixed script of outcomes; counts calls.
    struct ScriptedEngine {
        runs: Vec<std::result::Result<ReplicationResult, EngineFailure>>,
        batched: Option<BatchedMetrics>,
        seeds: Vec<u64>,
        calls: usize,
    }

    impl ScriptedEngine {
        fn finite(runs: Vec<std::result::Result<ReplicationResult, EngineFailure>>) -> Self {
            Self { runs, batched: None, seeds: Vec::new(), calls: 0 }
        }
    }

    impl SimulationEngine for ScriptedEngine {
        fn plant_seeds(&mut self, seed: u64) {
            self.seeds.push(seed);
        }

        fn simulate(&mut self, _stop_time: f64) -> std::result::Result<ReplicationResult, EngineFailure> {
            let r = self.runs[self.calls].clone();
            self.calls += 1;
            r
        }

        fn simulate_batched(
            &mut self,
            _stop_time: f64,
            _batch_size: usize,
        ) -> std::result::Result<BatchedMetrics, EngineFailure> {
            self.calls += 1;
            self.batched.clone().ok_or_else(|| EngineFailure::new("no steady-state run"))
        }
    }

    fn run(x: f64) -> ReplicationResult {
        ReplicationResult {
            monitor_response_times: vec![x, x + 2.0],
            monitor_response_times_1: vec![x],
            monitor_waiting_times: vec![x / 2.0],
            plan_response_times: vec![2.0 * x],
            plan_waiting_times: vec![x / 4.0],
            rho_monitor: [0.5, 0.6, 0.7],
            rho_plan: 0.8,
        }
    }

    #[test]
    fn finite_uses_completed_count() {
        let mut engine = ScriptedEngine::finite(vec![
            Ok(run(1.0)),
            Ok(run(2.0)),
            Err(EngineFailure::new("deadlock")),
            Ok(run(3.0)),
            Ok(run(4.0)),
        ]);
        let orch = ExperimentOrchestrator::new(&mut engine, ExperimentConfig::finite(5)).unwrap();
        let outcome = orch.run().unwrap();

        assert_eq!(engine.calls, 5);
        assert_eq!(engine.seeds, vec![123456789]);

        let report = outcome.report;
        assert_eq!(report.requested_replications, Some(5));
        assert_eq!(
            report.failed_replications,
            vec![FailedReplication { index: 3, reason: "deadlock".into() }]
        );
        for m in Metric::ALL {
            assert_eq!(report.estimate(m).unwrap().n, 4, "{}", m);
        }
        // Per-run means of Monitor RT over completed runs: 2, 3, 4, 5
        assert_eq!(report.estimate(Metric::MonitorResponseTime).unwrap().mean, 3.5);
        assert!(outcome.diagnostics.is_none());
    }

    #[test]
    fn empty_replication_counts_as_failure() {
        let mut broken = run(1.0);
        broken.plan_response_times.clear();
        let mut engine = ScriptedEngine::finite(vec![Ok(run(1.0)), Ok(broken), Ok(run(2.0))]);
        let outcome = ExperimentOrchestrator::new(&mut engine, ExperimentConfig::finite(3))
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(outcome.report.failed_replications.len(), 1);
        assert_eq!(outcome.report.failed_replications[0].index, 2);
        assert_eq!(outcome.report.estimate(Metric::PlanUtilization).unwrap().n, 2);
    }

    #[test]
    fn all_failures_is_an_error() {
        let mut engine = ScriptedEngine::finite(vec![
            Err(EngineFailure::new("a")),
            Err(EngineFailure::new("b")),
        ]);
        let err = ExperimentOrchestrator::new(&mut engine, ExperimentConfig::finite(2))
            .unwrap()
            .run()
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }

    #[test]
    fn single_completed_replication_has_zero_width() {
        let mut engine = ScriptedEngine::finite(vec![Err(EngineFailure::new("x")), Ok(run(1.0))]);
        let outcome = ExperimentOrchestrator::new(&mut engine, ExperimentConfig::finite(2))
            .unwrap()
            .run()
            .unwrap();
        let e = outcome.report.estimate(Metric::MonitorWaitingTime).unwrap();
        assert_eq!(e.n, 1);
        assert_eq!(e.half_width, 0.0);
    }

    #[test]
    fn invalid_config_never_reaches_engine() {
        let mut engine = ScriptedEngine::finite(Vec::new());
        assert!(ExperimentOrchestrator::new(&mut engine, ExperimentConfig::finite(0)).is_err());
        assert!(engine.seeds.is_empty());
        assert_eq!(engine.calls, 0);
    }

    #[test]
    fn infinite_failure_is_fatal() {
        let mut engine = ScriptedEngine::finite(Vec::new());
        let err = ExperimentOrchestrator::new(&mut engine, ExperimentConfig::infinite())
            .unwrap()
            .run()
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Engine(_)));
        assert_eq!(engine.calls, 1);
    }

    #[test]
    fn infinite_estimates_and_diagnostics() {
        let mut batched: BatchedMetrics = Metric::ALL
            .iter()
            .map(|m| (m.key().to_string(), vec![1.0, 2.0, 3.0, 4.0]))
            .collect();
        batched.insert("plan_response_times".into(), vec![10.0, 20.0, 30.0]);

        let mut engine = ScriptedEngine { batched: Some(batched), ..ScriptedEngine::finite(Vec::new()) };
        let outcome = ExperimentOrchestrator::new(&mut engine, ExperimentConfig::infinite())
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(engine.calls, 1);

        let report = &outcome.report;
        assert_eq!(report.batch_size, Some(128));
        assert_eq!(report.estimate(Metric::MonitorResponseTime).unwrap().n, 4);
        assert_eq!(report.estimate(Metric::PlanResponseTime).unwrap().n, 3);
        assert_eq!(report.estimate(Metric::PlanResponseTime).unwrap().mean, 20.0);

        let diag = outcome.diagnostics.unwrap();
        assert_eq!(diag.traces.len(), 7);
        assert_eq!(diag.response_time_1, vec![1.0, 2.0, 3.0, 4.0]);

        let monitor = diag.trace("cumulative_response_time_monitor").unwrap();
        assert_eq!(monitor.running_mean, vec![1.0, 1.5, 2.0, 2.5]);
        assert_eq!(monitor.reference, 2.5);

        // Truncated to the shorter Plan series.
        let qos1 = diag.trace("qos1").unwrap();
        assert_eq!(qos1.running_mean, vec![11.0, 16.5, 22.0]);
        assert_eq!(qos1.reference, 22.5);
        assert_eq!(diag.trace("qos2").unwrap().running_mean.len(), 3);
    }

    #[test]
    fn infinite_empty_series_is_invalid_input() {
        let mut batched: BatchedMetrics =
            Metric::ALL.iter().map(|m| (m.key().to_string(), vec![1.0])).collect();
        batched.insert("rho_plan".into(), Vec::new());
        let mut engine = ScriptedEngine { batched: Some(batched), ..ScriptedEngine::finite(Vec::new()) };
        let err = ExperimentOrchestrator::new(&mut engine, ExperimentConfig::infinite())
            .unwrap()
            .run()
            .unwrap_err();
        match err {
            AnalysisError::InvalidInput(msg) => assert!(msg.contains("Plan utilization"), "{}", msg),
            other => panic!("unexpected {:?}", other),
        }
    }
}
