// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Two-Centre Output Analysis - Type Definitions

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::engine::EngineFailure;
use crate::estimator::mean;

// ─── Facility ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Facility {
    Monitor,
    Plan,
}

impl Facility {
    pub const ALL: [Facility; 2] = [Facility::Monitor, Facility::Plan];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Monitor => "Monitor Centre",
            Self::Plan => "Plan Centre",
        }
    }
}

impl fmt::Display for Facility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Monitor => write!(f, "Monitor"),
            Self::Plan => write!(f, "Plan"),
        }
    }
}

// ─── Metric ──────────────────────────────────────────────────────────────────

pub const METRIC_COUNT: usize = 9;

/// One of the nine tracked quantities. Declaration order is report order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    MonitorWaitingTime = 0,
    MonitorResponseTime = 1,
    /// Second Monitor response-time signal; semantics owned by the engine.
    MonitorResponseTime1 = 2,
    MonitorUtilization1 = 3,
    MonitorUtilization2 = 4,
    MonitorUtilization3 = 5,
    PlanWaitingTime = 6,
    PlanResponseTime = 7,
    PlanUtilization = 8,
}

impl Metric {
    pub const ALL: [Metric; METRIC_COUNT] = [
        Metric::MonitorWaitingTime,
        Metric::MonitorResponseTime,
        Metric::MonitorResponseTime1,
        Metric::MonitorUtilization1,
        Metric::MonitorUtilization2,
        Metric::MonitorUtilization3,
        Metric::PlanWaitingTime,
        Metric::PlanResponseTime,
        Metric::PlanUtilization,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Fixed key used by the engine's batched (infinite-horizon) output.
    pub fn key(&self) -> &'static str {
        match self {
            Self::MonitorResponseTime => "monitor_response_times",
            Self::MonitorResponseTime1 => "response_times_monitor_1",
            Self::MonitorWaitingTime => "monitor_waiting_times",
            Self::PlanResponseTime => "plan_response_times",
            Self::PlanWaitingTime => "plan_waiting_times",
            Self::MonitorUtilization1 => "rho1_mon",
            Self::MonitorUtilization2 => "rho2_mon",
            Self::MonitorUtilization3 => "rho3_mon",
            Self::PlanUtilization => "rho_plan",
        }
    }

    pub fn from_key(key: &str) -> Option<Metric> {
        Self::ALL.iter().copied().find(|m| m.key() == key)
    }

    pub fn facility(&self) -> Facility {
        match self {
            Self::PlanWaitingTime | Self::PlanResponseTime | Self::PlanUtilization => Facility::Plan,
            _ => Facility::Monitor,
        }
    }

    /// Short label used in the printed report.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::MonitorWaitingTime | Self::PlanWaitingTime => "E[Tq]",
            Self::MonitorResponseTime | Self::PlanResponseTime => "E[Ts]",
            Self::MonitorResponseTime1 => "E[Ts1]",
            Self::MonitorUtilization1 => "rho1",
            Self::MonitorUtilization2 => "rho2",
            Self::MonitorUtilization3 => "rho3",
            Self::PlanUtilization => "rho",
        }
    }

    pub fn is_utilization(&self) -> bool {
        matches!(
            self,
            Self::MonitorUtilization1
                | Self::MonitorUtilization2
                | Self::MonitorUtilization3
                | Self::PlanUtilization
        )
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self {
            Self::MonitorWaitingTime | Self::PlanWaitingTime => "waiting time",
            Self::MonitorResponseTime | Self::PlanResponseTime => "response time",
            Self::MonitorResponseTime1 => "response time 1",
            Self::MonitorUtilization1 => "utilization 1",
            Self::MonitorUtilization2 => "utilization 2",
            Self::MonitorUtilization3 => "utilization 3",
            Self::PlanUtilization => "utilization",
        };
        write!(f, "{} {}", self.facility(), what)
    }
}

// ─── Observation Series ──────────────────────────────────────────────────────

/// Ordered observations of one metric, in chronological order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationSeries {
    pub metric: Metric,
    pub values: Vec<f64>,
}

impl ObservationSeries {
    pub fn new(metric: Metric, values: Vec<f64>) -> Self {
        Self { metric, values }
    }
}

// ─── Replication Result (finite horizon) ─────────────────────────────────────

/// Output of one finite-horizon run as handed over by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicationResult {
    pub monitor_response_times: Vec<f64>,
    pub monitor_response_times_1: Vec<f64>,
    pub monitor_waiting_times: Vec<f64>,
    pub plan_response_times: Vec<f64>,
    pub plan_waiting_times: Vec<f64>,
    /// Busy fraction of each of the three Monitor servers.
    pub rho_monitor: [f64; 3],
    pub rho_plan: f64,
}

impl ReplicationResult {
    /// Collapse the per-job series to per-run means.
    ///
    /// A run that observed no jobs for some series has nothing to average,
    /// and a non-finite mean or utilization cannot enter an interval. Both
    /// are engine-output faults, not analysis errors.
    pub fn summarize(&self) -> Result<ReplicationSummary, EngineFailure> {
        let avg = |metric: Metric, series: &[f64]| {
            mean(series).ok_or_else(|| {
                EngineFailure::new(format!("replication recorded no {} observations", metric))
            })
        };

        let mut values = [0.0; METRIC_COUNT];
        values[Metric::MonitorResponseTime.index()] =
            avg(Metric::MonitorResponseTime, &self.monitor_response_times)?;
        values[Metric::MonitorResponseTime1.index()] =
            avg(Metric::MonitorResponseTime1, &self.monitor_response_times_1)?;
        values[Metric::MonitorWaitingTime.index()] =
            avg(Metric::MonitorWaitingTime, &self.monitor_waiting_times)?;
        values[Metric::PlanResponseTime.index()] =
            avg(Metric::PlanResponseTime, &self.plan_response_times)?;
        values[Metric::PlanWaitingTime.index()] =
            avg(Metric::PlanWaitingTime, &self.plan_waiting_times)?;
        values[Metric::MonitorUtilization1.index()] = self.rho_monitor[0];
        values[Metric::MonitorUtilization2.index()] = self.rho_monitor[1];
        values[Metric::MonitorUtilization3.index()] = self.rho_monitor[2];
        values[Metric::PlanUtilization.index()] = self.rho_plan;

        if let Some(metric) = Metric::ALL.into_iter().find(|m| !values[m.index()].is_finite()) {
            return Err(EngineFailure::new(format!(
                "replication produced a non-finite {} ({})",
                metric,
                values[metric.index()]
            )));
        }

        Ok(ReplicationSummary(values))
    }
}

/// One scalar per metric for a single completed replication.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplicationSummary([f64; METRIC_COUNT]);

impl ReplicationSummary {
    pub fn get(&self, metric: Metric) -> f64 {
        self.0[metric.index()]
    }
}

// ─── Batched Output (infinite horizon) ───────────────────────────────────────

/// Engine output of a batched steady-state run, keyed by [`Metric::key`].
pub type BatchedMetrics = BTreeMap<String, Vec<f64>>;

// ─── Confidence Estimate ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceEstimate {
    pub mean: f64,
    pub half_width: f64,
    /// Two-sided significance level.
    pub alpha: f64,
    /// Sample count the interval was computed from.
    pub n: usize,
}

impl ConfidenceEstimate {
    pub fn degrees_of_freedom(&self) -> usize {
        self.n.saturating_sub(1)
    }
}

impl fmt::Display for ConfidenceEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} +/- {}", self.mean, self.half_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replication() -> ReplicationResult {
        ReplicationResult {
            monitor_response_times: vec![1.0, 3.0],
            monitor_response_times_1: vec![2.0],
            monitor_waiting_times: vec![0.5, 0.5, 2.0],
            plan_response_times: vec![4.0, 6.0],
            plan_waiting_times: vec![1.0],
            rho_monitor: [0.1, 0.2, 0.3],
            rho_plan: 0.9,
        }
    }

    #[test]
    fn metric_keys_round_trip() {
        for m in Metric::ALL {
            assert_eq!(Metric::from_key(m.key()), Some(m));
        }
        assert_eq!(Metric::from_key("rho4_mon"), None);
    }

    #[test]
    fn metric_indices_match_declaration_order() {
        for (i, m) in Metric::ALL.iter().enumerate() {
            assert_eq!(m.index(), i);
        }
    }

    #[test]
    fn facility_split() {
        let monitor = Metric::ALL.iter().filter(|m| m.facility() == Facility::Monitor).count();
        let plan = Metric::ALL.iter().filter(|m| m.facility() == Facility::Plan).count();
        assert_eq!(monitor, 6);
        assert_eq!(plan, 3);
        assert_eq!(Metric::ALL.iter().filter(|m| m.is_utilization()).count(), 4);
    }

    #[test]
    fn summarize_takes_per_run_means() {
        let s = replication().summarize().unwrap();
        assert_eq!(s.get(Metric::MonitorResponseTime), 2.0);
        assert_eq!(s.get(Metric::MonitorResponseTime1), 2.0);
        assert_eq!(s.get(Metric::MonitorWaitingTime), 1.0);
        assert_eq!(s.get(Metric::PlanResponseTime), 5.0);
        assert_eq!(s.get(Metric::PlanWaitingTime), 1.0);
        assert_eq!(s.get(Metric::MonitorUtilization3), 0.3);
        assert_eq!(s.get(Metric::PlanUtilization), 0.9);
    }

    #[test]
    fn summarize_rejects_empty_series() {
        let mut r = replication();
        r.plan_waiting_times.clear();
        let err = r.summarize().unwrap_err();
        assert!(err.to_string().contains("Plan waiting time"), "{}", err);
    }

    #[test]
    fn summarize_rejects_non_finite_values() {
        let mut r = replication();
        r.rho_plan = f64::NAN;
        let err = r.summarize().unwrap_err();
        assert!(err.to_string().contains("Plan utilization"), "{}", err);

        let mut r = replication();
        r.monitor_waiting_times.push(f64::INFINITY);
        let err = r.summarize().unwrap_err();
        assert!(err.to_string().contains("Monitor waiting time"), "{}", err);
    }

    #[test]
    fn estimate_degrees_of_freedom() {
        let e = ConfidenceEstimate { mean: 3.0, half_width: 0.5, alpha: 0.05, n: 5 };
        assert_eq!(e.degrees_of_freedom(), 4);
        assert_eq!(ConfidenceEstimate { n: 0, ..e }.degrees_of_freedom(), 0);
    }
}
