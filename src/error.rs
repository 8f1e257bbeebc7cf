// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Error types shared by the analysis layer.

use crate::engine::EngineFailure;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors surfaced by estimation, orchestration and artifact output.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Malformed arguments, empty sample sets, zero batch size.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("engine failure: {0}")]
    Engine(#[from] EngineFailure),

    #[error("i/o error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalysisError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io { path: path.display().to_string(), source }
    }
}
