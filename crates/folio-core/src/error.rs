// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Folio.

use thiserror::Error;

/// Top-level error type for all Folio operations.
///
/// Only a handful of these ever escape the export and compositing pipelines:
/// malformed leaves, unknown node kinds, and out-of-range overlays are
/// recovered inside the pipeline and never surface here.
#[derive(Debug, Error)]
pub enum FolioError {
    // -- Input errors --
    #[error("invalid document tree: {0}")]
    InvalidTree(String),

    #[error("invalid data URI: {0}")]
    InvalidDataUri(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    // -- Assembly errors --
    #[error("package assembly failed: {0}")]
    Package(String),

    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FolioError {
    /// Whether this error came from the package or PDF writer rejecting the
    /// structure it was handed. These are the only failures the pipelines
    /// treat as fatal.
    pub fn is_assembly_failure(&self) -> bool {
        matches!(self, Self::Package(_) | Self::PdfError(_))
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FolioError>;
