// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Student-t confidence intervals.
//!
//! Given samples `x_1..x_n` and a two-sided significance level `alpha`:
//!
//! ```text
//! mean       = sum(x) / n
//! sigma      = sqrt(sum((x - mean)^2) / (n - 1))
//! t          = T_{n-1}^{-1}(1 - alpha / 2)
//! half_width = t * sigma / sqrt(n - 1)
//! ```
//!
//! A single sample carries no variance information, so `n = 1` yields a
//! zero half-width rather than an error.

use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::{AnalysisError, Result};
use crate::types::ConfidenceEstimate;

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Sample standard deviation with the unbiased `n - 1` divisor.
pub fn sample_std_dev(samples: &[f64], mean: f64) -> f64 {
    let n = samples.len();
    if n < 2 {
        return 0.0;
    }
    let ss = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>();
    (ss / (n - 1) as f64).sqrt()
}

/// Computes interval estimates at a fixed significance level.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceEstimator {
    alpha: f64,
}

impl ConfidenceEstimator {
    pub fn new(alpha: f64) -> Result<Self> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(AnalysisError::invalid(format!(
                "alpha must lie in (0, 1), got {}",
                alpha
            )));
        }
        Ok(Self { alpha })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn estimate(&self, samples: &[f64]) -> Result<ConfidenceEstimate> {
        if samples.iter().any(|x| !x.is_finite()) {
            return Err(AnalysisError::invalid("samples contain a non-finite value"));
        }
        let mean = mean(samples)
            .ok_or_else(|| AnalysisError::invalid("cannot estimate from an empty sample"))?;
        let n = samples.len();

        let half_width = if n > 1 {
            let sigma = sample_std_dev(samples, mean);
            let t = self.t_quantile(n - 1)?;
            t * sigma / ((n - 1) as f64).sqrt()
        } else {
            0.0
        };

        Ok(ConfidenceEstimate { mean, half_width, alpha: self.alpha, n })
    }

    /// Critical value `x` with `P(T <= x) = 1 - alpha/2` for `df` degrees of freedom.
    pub fn t_quantile(&self, df: usize) -> Result<f64> {
        let dist = StudentsT::new(0.0, 1.0, df as f64)
            .map_err(|e| AnalysisError::invalid(format!("student-t with {} df: {}", df, e)))?;
        Ok(dist.inverse_cdf(1.0 - self.alpha / 2.0))
    }
}

/// One-shot form of [`ConfidenceEstimator::estimate`].
pub fn estimate(alpha: f64, samples: &[f64]) -> Result<ConfidenceEstimate> {
    ConfidenceEstimator::new(alpha)?.estimate(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_point_scenario() {
        let e = estimate(0.05, &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(e.mean, 3.0);
        assert_eq!(e.n, 5);

        let sigma = sample_std_dev(&[1.0, 2.0, 3.0, 4.0, 5.0], 3.0);
        assert!((sigma - 1.5811).abs() < 1e-4, "sigma = {}", sigma);

        let t = ConfidenceEstimator::new(0.05).unwrap().t_quantile(4).unwrap();
        assert!((t - 2.7764).abs() < 1e-3, "t = {}", t);

        // t * sigma / sqrt(n - 1)
        let expected = 2.776445 * 1.581139 / 2.0;
        assert!((e.half_width - expected).abs() < 1e-3, "half_width = {}", e.half_width);
    }

    #[test]
    fn single_sample_has_zero_half_width() {
        for alpha in [0.01, 0.05, 0.5, 0.99] {
            for x in [-3.5, 0.0, 42.0] {
                let e = estimate(alpha, &[x]).unwrap();
                assert_eq!(e.mean, x);
                assert_eq!(e.half_width, 0.0);
                assert_eq!(e.degrees_of_freedom(), 0);
            }
        }
    }

    #[test]
    fn empty_sample_is_invalid() {
        let err = estimate(0.05, &[]).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidInput(_)));
    }

    #[test]
    fn alpha_out_of_range_is_invalid() {
        for alpha in [0.0, 1.0, -0.1, 1.5, f64::NAN] {
            assert!(
                matches!(ConfidenceEstimator::new(alpha), Err(AnalysisError::InvalidInput(_))),
                "alpha {} accepted",
                alpha
            );
        }
    }

    #[test]
    fn non_finite_sample_is_invalid() {
        assert!(estimate(0.05, &[1.0, f64::NAN]).is_err());
        assert!(estimate(0.05, &[1.0, f64::INFINITY]).is_err());
    }

    #[test]
    fn constant_samples_have_zero_width() {
        let e = estimate(0.05, &[2.5; 10]).unwrap();
        assert_eq!(e.mean, 2.5);
        assert_eq!(e.half_width, 0.0);
    }

    #[test]
    fn half_width_shrinks_with_more_samples() {
        // Same spread pattern repeated: variance stays put while n grows.
        let pattern = [1.0, 2.0, 3.0, 4.0, 5.0];
        let small: Vec<f64> = pattern.iter().cycle().take(10).copied().collect();
        let large: Vec<f64> = pattern.iter().cycle().take(100).copied().collect();
        let hs = estimate(0.05, &small).unwrap().half_width;
        let hl = estimate(0.05, &large).unwrap().half_width;
        assert!(hs > 0.0 && hl > 0.0);
        assert!(hl < hs, "{} !< {}", hl, hs);
    }

    #[test]
    fn wider_confidence_means_wider_interval() {
        let data = [3.1, 2.7, 3.4, 2.9, 3.3, 3.0];
        let h90 = estimate(0.10, &data).unwrap().half_width;
        let h99 = estimate(0.01, &data).unwrap().half_width;
        assert!(h99 > h90);
    }

    #[test]
    fn estimate_is_order_independent() {
        let a = estimate(0.05, &[0.2, 0.9, 0.4, 0.7]).unwrap();
        let b = estimate(0.05, &[0.7, 0.4, 0.9, 0.2]).unwrap();
        assert!((a.mean - b.mean).abs() < 1e-12);
        assert!((a.half_width - b.half_width).abs() < 1e-12);
    }
}
