// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// folio-document — Document pipelines for Folio.
//
// Exports rich-text document trees as word-processor packages (numbering,
// runs, blocks, tables, embedded images) and bakes raster signature overlays
// into existing PDFs at page-relative positions.

pub mod docx;
pub mod image;
pub mod pdf;

// Re-export the primary entry points so callers can use `folio_document::export_docx` etc.
pub use docx::{PackageAssembler, export_docx, inspect_package};
pub use pdf::{PdfReader, SignatureCompositor, bake_signatures};
