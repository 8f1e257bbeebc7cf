// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Batch means reduction of a long, serially correlated trace.
//!
//! The trace is cut into consecutive, non-overlapping windows of exactly
//! `batch_size` observations and each window is replaced by its mean. The
//! window means are closer to independent than the raw observations, which
//! is what the Student-t interval assumes.
//!
//! A trailing window shorter than `batch_size` is dropped. It is never
//! padded, averaged on its own, or carried into a later call.

use crate::error::{AnalysisError, Result};

/// Reduce `data` to `floor(data.len() / batch_size)` window means.
pub fn reduce(data: &[f64], batch_size: usize) -> Result<Vec<f64>> {
    if batch_size == 0 {
        return Err(AnalysisError::invalid("batch size must be at least 1"));
    }

    Ok(data
        .chunks_exact(batch_size)
        .map(|window| window.iter().sum::<f64>() / batch_size as f64)
        .collect())
}

/// Observations discarded by [`reduce`] for this length and batch size.
pub fn discarded(len: usize, batch_size: usize) -> usize {
    if batch_size == 0 {
        return len;
    }
    len % batch_size
}
