// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Word-processor package export — numbering, runs, blocks, assembly, and a
// read-back inspector for produced packages.

pub mod blocks;
pub mod model;
pub mod numbering;
pub mod package;
pub mod reader;
pub mod runs;
mod xml;

pub use blocks::{BlockSerializer, SerializedDocument};
pub use numbering::{NumberingAllocator, NumberingDefinition, NumberingId, collect_numberings};
pub use package::PackageAssembler;
pub use reader::{InspectedBlock, InspectedPackage, InspectedParagraph, inspect_package};
pub use runs::InlineRunBuilder;

use folio_core::{DocumentNode, ExportConfig, Result};
use tracing::{info, instrument};

/// Export a document tree as package bytes.
///
/// Each call owns its numbering counter, so concurrent exports never share
/// ids. The only error is an assembly failure from the package writer.
#[instrument(skip_all, fields(root = root.kind.tag()))]
pub fn export_docx(root: &DocumentNode, config: &ExportConfig) -> Result<Vec<u8>> {
    let document = BlockSerializer::new(config).serialize(root);
    let bytes = PackageAssembler::new(config).assemble(&document)?;
    info!(bytes = bytes.len(), "Export complete");
    Ok(bytes)
}
