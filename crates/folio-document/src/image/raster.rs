// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raster payloads — validated PNG/JPEG bytes with their pixel dimensions,
// ready to be embedded into a page.

use std::io::Cursor;

use folio_core::error::{FolioError, Result};
use image::{DynamicImage, ImageFormat, ImageReader};
use tracing::{debug, instrument};

use super::data_uri::{ImageDataUri, ImageSubtype};

/// Encodings the compositor can embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    Jpeg,
}

impl RasterFormat {
    fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
        }
    }
}

/// An encoded raster image whose header has been read and validated.
///
/// The encoded bytes are kept as-is: JPEG payloads can be embedded without
/// re-encoding, and PNG payloads are only decoded when actually drawn.
#[derive(Debug, Clone)]
pub struct RasterImage {
    format: RasterFormat,
    encoded: Vec<u8>,
    width: u32,
    height: u32,
}

impl RasterImage {
    /// Wrap encoded bytes of a known format, reading the pixel size from the
    /// image header.
    #[instrument(skip(encoded), fields(bytes_len = encoded.len()))]
    pub fn from_bytes(encoded: Vec<u8>, format: RasterFormat) -> Result<Self> {
        let (width, height) =
            ImageReader::with_format(Cursor::new(encoded.as_slice()), format.image_format())
                .into_dimensions()
                .map_err(|err| {
                    FolioError::ImageError(format!("failed to read {format:?} header: {err}"))
                })?;

        if width == 0 || height == 0 {
            return Err(FolioError::ImageError(format!(
                "{format:?} image has empty dimensions {width}x{height}"
            )));
        }

        debug!(width, height, ?format, "Raster header read");
        Ok(Self {
            format,
            encoded,
            width,
            height,
        })
    }

    /// Build from a decoded data URI. Only PNG and JPEG payloads are
    /// accepted; other subtypes are reported as unsupported.
    pub fn from_data_uri(uri: ImageDataUri) -> Result<Self> {
        let format = match uri.subtype {
            ImageSubtype::Png => RasterFormat::Png,
            ImageSubtype::Jpeg | ImageSubtype::Jpg => RasterFormat::Jpeg,
            other => {
                return Err(FolioError::ImageError(format!(
                    "{other:?} payloads cannot be embedded, expected PNG or JPEG"
                )));
            }
        };
        Self::from_bytes(uri.bytes, format)
    }

    // -- Accessors ------------------------------------------------------------

    pub fn format(&self) -> RasterFormat {
        self.format
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }

    /// Fully decode the pixel data.
    pub fn decode(&self) -> Result<DynamicImage> {
        image::load_from_memory_with_format(&self.encoded, self.format.image_format()).map_err(
            |err| FolioError::ImageError(format!("failed to decode {:?}: {err}", self.format)),
        )
    }
}
