// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Files written after an infinite-horizon run: the response-time-1 series
//! and one convergence plot per running-mean trace.

use plotters::prelude::*;
use std::error::Error;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{AnalysisError, Result};
use crate::orchestrator::{ConvergenceTrace, SteadyStateDiagnostics};

const ORANGE: RGBColor = RGBColor(255, 165, 0);

/// Where the steady-state artifacts go.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    /// Created on demand.
    pub plot_dir: PathBuf,
    /// Single-column series file, overwritten on every run.
    pub series_file: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self { plot_dir: PathBuf::from("plots"), series_file: PathBuf::from("acs.dat") }
    }
}

/// Write `values` one per line, replacing any previous file.
pub fn write_series(path: &Path, values: &[f64]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| AnalysisError::io(parent, e))?;
    }
    let file = std::fs::File::create(path).map_err(|e| AnalysisError::io(path, e))?;
    let mut out = BufWriter::new(file);
    for v in values {
        writeln!(out, "{}", v).map_err(|e| AnalysisError::io(path, e))?;
    }
    out.flush().map_err(|e| AnalysisError::io(path, e))
}

/// Persist the series file and render every trace. A plot that fails to
/// render is logged and skipped; file-system errors are returned.
pub fn write_steady_state_artifacts(
    diagnostics: &SteadyStateDiagnostics,
    paths: &ArtifactPaths,
) -> Result<Vec<PathBuf>> {
    write_series(&paths.series_file, &diagnostics.response_time_1)?;
    info!(
        path = %paths.series_file.display(),
        values = diagnostics.response_time_1.len(),
        "response-time-1 series written"
    );

    std::fs::create_dir_all(&paths.plot_dir).map_err(|e| AnalysisError::io(&paths.plot_dir, e))?;

    let mut written = Vec::new();
    for trace in &diagnostics.traces {
        if trace.running_mean.is_empty() {
            warn!(plot = trace.name, "no batches to plot");
            continue;
        }
        match plot_convergence(trace, &paths.plot_dir) {
            Ok(path) => written.push(path),
            Err(e) => warn!(plot = trace.name, error = %e, "failed to render plot"),
        }
    }
    info!(dir = %paths.plot_dir.display(), plots = written.len(), "convergence plots written");
    Ok(written)
}

/// Running-mean curve with a horizontal line at the grand mean.
pub fn plot_convergence(
    trace: &ConvergenceTrace,
    dir: &Path,
) -> std::result::Result<PathBuf, Box<dyn Error>> {
    let path = dir.join(format!("{}.png", trace.name));
    let x_max = trace.running_mean.len().max(1) as f64;
    let (y_lo, y_hi) = y_range(&trace.running_mean, trace.reference);

    {
        let root = BitMapBackend::new(&path, (1000, 600)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(trace.title, ("sans-serif", 20))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(0.0..x_max, y_lo..y_hi)?;

        chart
            .configure_mesh()
            .x_desc("Batch Number")
            .y_desc(trace.label)
            .draw()?;

        let curve = trace.running_mean.iter().enumerate().map(|(i, &y)| (i as f64, y));
        chart
            .draw_series(LineSeries::new(curve, BLUE))?
            .label(trace.label)
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));

        chart
            .draw_series(LineSeries::new(
                vec![(0.0, trace.reference), (x_max, trace.reference)],
                ORANGE,
            ))?
            .label("Mean of means")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], ORANGE));

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
    }
    Ok(path)
}

/// Vertical extent covering the curve and the reference line, padded 5%.
fn y_range(values: &[f64], reference: f64) -> (f64, f64) {
    let (lo, hi) = values
        .iter()
        .copied()
        .chain(std::iter::once(reference))
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    let pad = if hi > lo { (hi - lo) * 0.05 } else { lo.abs().max(1.0) * 0.05 };
    (lo - pad, hi + pad)
}
