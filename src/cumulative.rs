// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Running means for convergence diagnostics.
//!
//! Neighbouring running means share almost all of their inputs, so the
//! output must never be handed to the confidence estimator as if it were a
//! sample of independent observations.

/// Position `i` holds the mean of `data[..=i]`.
pub fn cumulative(data: &[f64]) -> Vec<f64> {
    let mut sum = 0.0;
    data.iter()
        .enumerate()
        .map(|(i, x)| {
            sum += x;
            sum / (i + 1) as f64
        })
        .collect()
}

/// Elementwise sum of two aligned series, truncated to the shorter one.
///
/// Adding the running means of the two centres gives the end-to-end
/// quality-of-service signal.
pub fn combined(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x + y).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::mean;

    #[test]
    fn running_means() {
        assert_eq!(cumulative(&[2.0, 4.0, 6.0, 8.0]), vec![2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn last_value_is_grand_mean() {
        let data = [0.31, 1.7, 2.25, 0.004, 9.1, 3.3, 0.6];
        let cum = cumulative(&data);
        assert_eq!(cum.len(), data.len());
        let last = *cum.last().unwrap();
        assert!((last - mean(&data).unwrap()).abs() < 1e-12);
    }

    #[test]
    fn deterministic_across_calls() {
        let data = [5.0, 1.0, 3.0, 3.0];
        assert_eq!(cumulative(&data), cumulative(&data));
    }

    #[test]
    fn empty_input() {
        assert!(cumulative(&[]).is_empty());
    }

    #[test]
    fn combined_truncates_to_shorter() {
        let a = [1.0, 2.0, 3.0];
        let b = [10.0, 20.0];
        assert_eq!(combined(&a, &b), vec![11.0, 22.0]);
        assert_eq!(combined(&b, &a), vec![11.0, 22.0]);
        assert!(combined(&a, &[]).is_empty());
    }
}
