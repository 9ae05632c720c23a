// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image embedding — turns raster payloads into PDF image XObjects.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use folio_core::{FolioError, Result};
use lopdf::{Document, ObjectId, Stream, dictionary};
use tracing::debug;

use crate::image::{RasterFormat, RasterImage};

/// An image XObject and its optional alpha mask, not yet added to a document.
pub struct ImageXObject {
    image: Stream,
    soft_mask: Option<Stream>,
}

impl ImageXObject {
    /// Build the XObject for `raster`.
    ///
    /// JPEG payloads are embedded as-is with `DCTDecode`. PNG payloads are
    /// decoded to 8-bit RGB and compressed with `FlateDecode`; an alpha
    /// channel becomes a separate `/SMask` image.
    pub fn from_raster(raster: &RasterImage) -> Result<Self> {
        match raster.format() {
            RasterFormat::Jpeg => Ok(Self::jpeg(raster)),
            RasterFormat::Png => Self::png(raster),
        }
    }

    pub fn has_soft_mask(&self) -> bool {
        self.soft_mask.is_some()
    }

    /// Add the image (and its mask) to `doc`, returning the image's object id.
    pub fn add_to(self, doc: &mut Document) -> ObjectId {
        let mut image = self.image;
        if let Some(mask) = self.soft_mask {
            let mask_id = doc.add_object(mask);
            image.dict.set("SMask", mask_id);
        }
        doc.add_object(image)
    }

    fn jpeg(raster: &RasterImage) -> Self {
        let color_space = match jpeg_components(raster.encoded()) {
            Some(1) => "DeviceGray",
            Some(4) => "DeviceCMYK",
            _ => "DeviceRGB",
        };
        debug!(color_space, "Embedding JPEG without re-encoding");

        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(raster.width()),
            "Height" => i64::from(raster.height()),
            "ColorSpace" => color_space,
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        };
        Self {
            image: Stream::new(dict, raster.encoded().to_vec()),
            soft_mask: None,
        }
    }

    fn png(raster: &RasterImage) -> Result<Self> {
        let decoded = raster.decode()?;
        let (width, height) = (i64::from(raster.width()), i64::from(raster.height()));

        let rgb = decoded.to_rgb8();
        let image = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => width,
                "Height" => height,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            deflate(rgb.as_raw())?,
        );

        let soft_mask = if decoded.color().has_alpha() {
            let alpha: Vec<u8> = decoded.to_rgba8().pixels().map(|p| p[3]).collect();
            Some(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => width,
                    "Height" => height,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                    "Filter" => "FlateDecode",
                },
                deflate(&alpha)?,
            ))
        } else {
            None
        };

        Ok(Self { image, soft_mask })
    }
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| FolioError::ImageError(format!("deflate failed: {e}")))?;
    encoder
        .finish()
        .map_err(|e| FolioError::ImageError(format!("deflate failed: {e}")))
}

/// Colour component count from the first start-of-frame marker.
fn jpeg_components(data: &[u8]) -> Option<u8> {
    if data.len() < 4 || data[0] != 0xFF || data[1] != 0xD8 {
        return None;
    }

    let mut pos = 2;
    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }
        let marker = data[pos + 1];
        pos += 2;

        // Fill bytes and standalone markers carry no length.
        if marker == 0xFF || marker == 0x00 || (0xD0..=0xD8).contains(&marker) {
            continue;
        }
        if matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC) {
            // length(2) precision(1) height(2) width(2) components(1)
            return data.get(pos + 7).copied();
        }

        let length = usize::from(u16::from_be_bytes([*data.get(pos)?, *data.get(pos + 1)?]));
        pos += length;
    }
    None
}
