// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Signature compositing — draws user-placed raster overlays onto the pages of
// an existing PDF.

use folio_core::{FolioError, Result, SignatureOverlay};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use super::embed::ImageXObject;
use super::placement::{Placement, place_overlay};
use super::reader::PdfReader;
use crate::image::{ImageDataUri, RasterImage};

/// Page-tree hops followed when looking for inherited `/Resources`.
const MAX_INHERIT_DEPTH: usize = 32;

/// Why an overlay was left out.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    PageOutOfRange { page: i64, page_count: usize },
    UndecodablePayload { detail: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedOverlay {
    pub id: String,
    /// 1-indexed page number.
    pub page: usize,
    pub placement: Placement,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedOverlay {
    pub id: String,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// What happened to each overlay, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompositeReport {
    pub applied: Vec<AppliedOverlay>,
    pub skipped: Vec<SkippedOverlay>,
}

/// The composited document and its report.
#[derive(Debug, Clone)]
pub struct Composite {
    pub bytes: Vec<u8>,
    pub report: CompositeReport,
}

/// Draws signature overlays into one loaded document.
///
/// Overlays are applied independently in the order given; a later overlay
/// may cover an earlier one but never changes its placement.
pub struct SignatureCompositor {
    reader: PdfReader,
    report: CompositeReport,
    /// Counter for generated XObject resource names.
    next_name: usize,
}

impl SignatureCompositor {
    pub fn from_bytes(pdf: &[u8]) -> Result<Self> {
        Ok(Self {
            reader: PdfReader::from_bytes(pdf)?,
            report: CompositeReport::default(),
            next_name: 1,
        })
    }

    /// Load `pdf`, draw every overlay, and serialise the result.
    #[instrument(skip_all, fields(bytes_len = pdf.len(), overlays = overlays.len()))]
    pub fn apply(pdf: &[u8], overlays: &[SignatureOverlay]) -> Result<Composite> {
        let mut compositor = Self::from_bytes(pdf)?;
        for overlay in overlays {
            compositor.apply_overlay(overlay)?;
        }
        compositor.finish()
    }

    /// Draw one overlay.
    ///
    /// Overlays on pages that do not exist, or whose payload cannot be decoded
    /// as PNG or JPEG, are recorded as skipped. Errors are reserved for the
    /// document itself rejecting the change.
    pub fn apply_overlay(&mut self, overlay: &SignatureOverlay) -> Result<()> {
        let page_count = self.reader.page_count();
        let Some(index) = page_index(overlay.page, page_count) else {
            warn!(id = %overlay.id, page = overlay.page, page_count, "Skipping overlay outside document");
            self.skip(overlay, SkipReason::PageOutOfRange {
                page: overlay.page,
                page_count,
            });
            return Ok(());
        };

        let raster = match ImageDataUri::parse(&overlay.data_url).and_then(RasterImage::from_data_uri)
        {
            Ok(raster) => raster,
            Err(err) => {
                warn!(id = %overlay.id, %err, "Skipping overlay with undecodable payload");
                self.skip(overlay, SkipReason::UndecodablePayload {
                    detail: err.to_string(),
                });
                return Ok(());
            }
        };
        let xobject = match ImageXObject::from_raster(&raster) {
            Ok(xobject) => xobject,
            Err(err) => {
                warn!(id = %overlay.id, %err, "Skipping overlay whose pixels cannot be decoded");
                self.skip(overlay, SkipReason::UndecodablePayload {
                    detail: err.to_string(),
                });
                return Ok(());
            }
        };

        let bounds = self.reader.page_bounds(index)?;
        let placement = place_overlay(
            bounds,
            overlay.x,
            overlay.y,
            overlay.width,
            (raster.width(), raster.height()),
        );
        let page_id = self.reader.page_id(index).ok_or_else(|| {
            FolioError::PdfError(format!("page {} vanished from the page tree", overlay.page))
        })?;

        let name = self.draw(page_id, xobject, placement)?;
        debug!(id = %overlay.id, page = index + 1, %name, ?placement, "Overlay drawn");

        self.report.applied.push(AppliedOverlay {
            id: overlay.id.clone(),
            page: index + 1,
            placement,
        });
        Ok(())
    }

    /// Serialise the document with every applied overlay.
    pub fn finish(self) -> Result<Composite> {
        let bytes = self.reader.into_bytes()?;
        info!(
            applied = self.report.applied.len(),
            skipped = self.report.skipped.len(),
            output_bytes = bytes.len(),
            "Signatures composited"
        );
        Ok(Composite {
            bytes,
            report: self.report,
        })
    }

    fn skip(&mut self, overlay: &SignatureOverlay, reason: SkipReason) {
        self.report.skipped.push(SkippedOverlay {
            id: overlay.id.clone(),
            reason,
        });
    }

    // -- Page mutation --------------------------------------------------------

    fn draw(&mut self, page_id: ObjectId, xobject: ImageXObject, at: Placement) -> Result<String> {
        let doc = self.reader.document_mut();
        let image_id = xobject.add_to(doc);

        // Resources may be shared with other pages; give this page its own copy.
        let mut resources = inherited_resources(doc, page_id).unwrap_or_default();
        let mut xobjects = resources
            .get(b"XObject")
            .ok()
            .and_then(|obj| doc.dereference(obj).ok())
            .and_then(|(_, obj)| obj.as_dict().ok())
            .cloned()
            .unwrap_or_default();

        let name = loop {
            let candidate = format!("FolioSig{}", self.next_name);
            self.next_name += 1;
            if !xobjects.has(candidate.as_bytes()) {
                break candidate;
            }
        };
        xobjects.set(name.as_bytes(), image_id);
        resources.set("XObject", xobjects);

        let existing = page_contents(doc, page_id);
        let save = doc.add_object(Stream::new(dictionary! {}, b"q\n".to_vec()));
        let draw = doc.add_object(Stream::new(dictionary! {}, draw_operations(&name, at)?));

        let mut contents = Vec::with_capacity(existing.len() + 2);
        contents.push(Object::Reference(save));
        contents.extend(existing);
        contents.push(Object::Reference(draw));

        let page = doc
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|err| FolioError::PdfError(format!("cannot update page {page_id:?}: {err}")))?;
        page.set("Resources", resources);
        page.set("Contents", contents);

        Ok(name)
    }
}

/// Load `pdf`, draw `overlays`, and return only the new bytes.
pub fn bake_signatures(pdf: &[u8], overlays: &[SignatureOverlay]) -> Result<Vec<u8>> {
    SignatureCompositor::apply(pdf, overlays).map(|composite| composite.bytes)
}

/// Zero-based page index for a 1-indexed page number, if the page exists.
fn page_index(page: i64, page_count: usize) -> Option<usize> {
    let index = usize::try_from(page.checked_sub(1)?).ok()?;
    (index < page_count).then_some(index)
}

/// Restore the state saved before the existing content, then draw the image
/// scaled into its rectangle.
fn draw_operations(name: &str, at: Placement) -> Result<Vec<u8>> {
    let content = Content {
        operations: vec![
            Operation::new("Q", vec![]),
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    (at.width as f32).into(),
                    0.into(),
                    0.into(),
                    (at.height as f32).into(),
                    (at.x as f32).into(),
                    (at.y as f32).into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    content
        .encode()
        .map_err(|err| FolioError::PdfError(format!("failed to encode overlay content: {err}")))
}

/// The page's `/Resources`, or the nearest ancestor's.
fn inherited_resources(doc: &Document, page_id: ObjectId) -> Option<Dictionary> {
    let mut node = Some(page_id);
    for _ in 0..MAX_INHERIT_DEPTH {
        let dict = doc.get_dictionary(node?).ok()?;
        if let Ok(resources) = dict.get(b"Resources") {
            let (_, resources) = doc.dereference(resources).ok()?;
            return resources.as_dict().ok().cloned();
        }
        node = dict.get(b"Parent").and_then(Object::as_reference).ok();
    }
    None
}

/// The page's content stream references, in drawing order.
fn page_contents(doc: &Document, page_id: ObjectId) -> Vec<Object> {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return Vec::new();
    };
    match page.get(b"Contents") {
        Ok(Object::Array(items)) => items.clone(),
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::raster::tests::{jpeg_bytes, png_bytes};
    use crate::pdf::reader::tests::letter_pdf;
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;

    fn data_url(subtype: &str, bytes: &[u8]) -> String {
        format!("data:image/{subtype};base64,{}", STANDARD.encode(bytes))
    }

    fn overlay(id: &str, page: i64, data_url: String) -> SignatureOverlay {
        SignatureOverlay {
            id: id.into(),
            page,
            x: 10.0,
            y: 20.0,
            width: 20.0,
            data_url,
        }
    }

    fn operators(doc: &Document, page: u32) -> Vec<String> {
        let page_id = doc.get_pages()[&page];
        let content = doc.get_page_content(page_id).unwrap();
        Content::decode(&content)
            .unwrap()
            .operations
            .into_iter()
            .map(|op| op.operator)
            .collect()
    }

    fn page_xobjects(doc: &Document, page: u32) -> Dictionary {
        let page_id = doc.get_pages()[&page];
        inherited_resources(doc, page_id)
            .and_then(|res| res.get(b"XObject").ok().cloned())
            .and_then(|obj| obj.as_dict().ok().cloned())
            .unwrap_or_default()
    }

    /// Places a PNG overlay where the page-space formulas say and embeds it
    /// with an alpha mask.
    #[test]
    fn draws_png_overlay() {
        let png = data_url("png", &png_bytes(100, 50));
        let composite =
            SignatureCompositor::apply(&letter_pdf(1), &[overlay("sig-1", 1, png)]).unwrap();

        let applied = &composite.report.applied[0];
        assert_eq!(applied.page, 1);
        assert!((applied.placement.width - 122.4).abs() < 1e-9);
        assert!((applied.placement.y - 572.4).abs() < 1e-9);

        let doc = Document::load_mem(&composite.bytes).unwrap();
        let ops = operators(&doc, 1);
        assert!(ops.iter().any(|op| op == "Do"));
        assert!(ops.iter().any(|op| op == "Tj"), "original content kept");
        assert_eq!(
            ops.iter().filter(|op| *op == "q").count(),
            ops.iter().filter(|op| *op == "Q").count()
        );

        let xobjects = page_xobjects(&doc, 1);
        let image_id = xobjects.get(b"FolioSig1").unwrap().as_reference().unwrap();
        let image = doc.get_object(image_id).unwrap().as_stream().unwrap();
        assert!(image.dict.get(b"SMask").is_ok());
    }

    /// JPEG payloads are embedded as DCT images.
    #[test]
    fn draws_jpeg_overlay() {
        let jpeg = data_url("jpg", &jpeg_bytes(40, 20));
        let composite =
            SignatureCompositor::apply(&letter_pdf(1), &[overlay("j", 1, jpeg)]).unwrap();

        let doc = Document::load_mem(&composite.bytes).unwrap();
        let image_id = page_xobjects(&doc, 1)
            .get(b"FolioSig1")
            .unwrap()
            .as_reference()
            .unwrap();
        let image = doc.get_object(image_id).unwrap().as_stream().unwrap();
        assert_eq!(
            image.dict.get(b"Filter").unwrap().as_name().unwrap(),
            b"DCTDecode"
        );
    }

    /// Out-of-range pages are skipped without disturbing other overlays.
    #[test]
    fn out_of_range_pages_are_skipped() {
        let png = data_url("png", &png_bytes(100, 50));
        let overlays = [
            overlay("zero", 0, png.clone()),
            overlay("ok", 2, png.clone()),
            overlay("past-end", 3, png.clone()),
        ];
        let composite = SignatureCompositor::apply(&letter_pdf(2), &overlays).unwrap();

        assert_eq!(composite.report.applied.len(), 1);
        assert_eq!(composite.report.applied[0].id, "ok");
        assert!((composite.report.applied[0].placement.x - 61.2).abs() < 1e-9);
        assert_eq!(
            composite.report.skipped[1],
            SkippedOverlay {
                id: "past-end".into(),
                reason: SkipReason::PageOutOfRange {
                    page: 3,
                    page_count: 2
                },
            }
        );
    }

    /// Bad and unsupported payloads are skipped, not fatal.
    #[test]
    fn undecodable_payloads_are_skipped() {
        let overlays = [
            overlay("remote", 1, "https://example.com/sig.png".into()),
            overlay("gif", 1, data_url("gif", b"GIF89a")),
            overlay("lying", 1, data_url("png", &jpeg_bytes(4, 4))),
        ];
        let composite = SignatureCompositor::apply(&letter_pdf(1), &overlays).unwrap();

        assert!(composite.report.applied.is_empty());
        assert_eq!(composite.report.skipped.len(), 3);
        assert!(
            composite
                .report
                .skipped
                .iter()
                .all(|s| matches!(s.reason, SkipReason::UndecodablePayload { .. }))
        );
    }

    /// Overlays only touch their own page, even with shared resources.
    #[test]
    fn shared_resources_are_not_modified() {
        let png = data_url("png", &png_bytes(10, 10));
        let bytes = bake_signatures(&letter_pdf(2), &[overlay("a", 1, png)]).unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        assert!(page_xobjects(&doc, 1).has(b"FolioSig1"));
        assert!(!page_xobjects(&doc, 2).has(b"FolioSig1"));
        assert!(!operators(&doc, 2).iter().any(|op| op == "Do"));
    }

    /// Stacked overlays on one page get distinct names and balanced state.
    #[test]
    fn stacked_overlays_get_distinct_names() {
        let png = data_url("png", &png_bytes(10, 10));
        let overlays = [overlay("a", 1, png.clone()), overlay("b", 1, png)];
        let bytes = bake_signatures(&letter_pdf(1), &overlays).unwrap();

        let doc = Document::load_mem(&bytes).unwrap();
        let xobjects = page_xobjects(&doc, 1);
        assert!(xobjects.has(b"FolioSig1") && xobjects.has(b"FolioSig2"));

        let ops = operators(&doc, 1);
        assert_eq!(ops.iter().filter(|op| *op == "Do").count(), 2);
        assert_eq!(
            ops.iter().filter(|op| *op == "q").count(),
            ops.iter().filter(|op| *op == "Q").count()
        );
    }

    #[test]
    fn page_index_bounds() {
        assert_eq!(page_index(1, 1), Some(0));
        assert_eq!(page_index(0, 1), None);
        assert_eq!(page_index(-3, 1), None);
        assert_eq!(page_index(2, 1), None);
        assert_eq!(page_index(i64::MIN, 1), None);
    }

    /// Bytes that are not a PDF are a fatal PDF error.
    #[test]
    fn non_pdf_input_is_an_error() {
        let err = bake_signatures(b"not a pdf", &[]).unwrap_err();
        assert!(err.is_assembly_failure());
    }
}
