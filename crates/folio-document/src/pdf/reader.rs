// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open existing PDF documents with `lopdf`, inspect their page
// tree, and resolve page bounds for overlay placement.

use std::path::Path;

use folio_core::{FolioError, PageBounds, Result};
use lopdf::{Document, Object, ObjectId};
use tracing::{debug, info, instrument, warn};

/// Page-tree hops followed when looking for an inherited `/MediaBox`.
const MAX_INHERIT_DEPTH: usize = 32;

/// Reads an existing PDF and resolves page geometry.
///
/// Wraps `lopdf::Document`; the compositor mutates the same document through
/// [`PdfReader::document_mut`] and re-serialises it with
/// [`PdfReader::into_bytes`].
pub struct PdfReader {
    /// The underlying lopdf document.
    document: Document,
    /// Source path, if opened from a file (useful for diagnostics).
    source_path: Option<String>,
}

impl PdfReader {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            FolioError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded");

        Ok(Self {
            document,
            source_path: Some(path_ref.display().to_string()),
        })
    }

    /// Create a reader from raw PDF bytes already in memory.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            FolioError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;

        debug!(pages = document.get_pages().len(), "PDF loaded from bytes");

        Ok(Self {
            document,
            source_path: None,
        })
    }

    // -- Inspection -----------------------------------------------------------

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Return the source path if the reader was created via [`PdfReader::open`].
    pub fn source_path(&self) -> Option<&str> {
        self.source_path.as_deref()
    }

    /// Object id of the page at zero-based `index`, if it exists.
    pub fn page_id(&self, index: usize) -> Option<ObjectId> {
        let number = u32::try_from(index).ok()?.checked_add(1)?;
        self.document.get_pages().get(&number).copied()
    }

    /// Bounds of the page at zero-based `index`, in points.
    ///
    /// Uses the page's `/MediaBox`, inherited from the page tree when the page
    /// has none of its own. A page without any usable box is treated as US
    /// Letter.
    pub fn page_bounds(&self, index: usize) -> Result<PageBounds> {
        let page_id = self.page_id(index).ok_or_else(|| {
            FolioError::PdfError(format!(
                "page index {} out of range (document has {} pages)",
                index,
                self.page_count()
            ))
        })?;

        match self.media_box(page_id) {
            Some(bounds) => Ok(bounds),
            None => {
                warn!(index, "Page has no usable MediaBox, assuming Letter");
                Ok(PageBounds::LETTER)
            }
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    // -- Output ---------------------------------------------------------------

    /// Serialise the (possibly modified) document.
    pub fn into_bytes(mut self) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.document.save_to(&mut output).map_err(|err| {
            FolioError::PdfError(format!("failed to serialise PDF: {}", err))
        })?;
        debug!(output_bytes = output.len(), "PDF serialised");
        Ok(output)
    }

    // -- Helpers --------------------------------------------------------------

    fn media_box(&self, page_id: ObjectId) -> Option<PageBounds> {
        let mut node = Some(page_id);
        for _ in 0..MAX_INHERIT_DEPTH {
            let dict = self.document.get_dictionary(node?).ok()?;
            if let Ok(value) = dict.get(b"MediaBox") {
                return self.rectangle(value);
            }
            node = dict.get(b"Parent").and_then(Object::as_reference).ok();
        }
        None
    }

    /// Read a `[llx lly urx ury]` rectangle, resolving indirect entries.
    fn rectangle(&self, value: &Object) -> Option<PageBounds> {
        let (_, value) = self.document.dereference(value).ok()?;
        let items = value.as_array().ok()?;
        if items.len() != 4 {
            return None;
        }

        let mut corners = [0.0_f64; 4];
        for (slot, item) in corners.iter_mut().zip(items) {
            let (_, item) = self.document.dereference(item).ok()?;
            *slot = number(item)?;
        }
        let [x0, y0, x1, y1] = corners;

        let bounds = PageBounds {
            origin_x: x0.min(x1),
            origin_y: y0.min(y1),
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
        };
        (bounds.width > 0.0 && bounds.height > 0.0).then_some(bounds)
    }
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}
