// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Base64 image data URIs, as embedded by the editing surface and the
// signature pad.

use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use folio_core::error::{FolioError, Result};
use regex::Regex;

static IMAGE_DATA_URI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:image/(png|jpeg|jpg|gif|bmp|svg\+xml);base64,(.+)$")
        .expect("static data URI pattern is valid")
});

/// Image subtype named in the data URI's media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSubtype {
    Png,
    Jpeg,
    /// `image/jpg`, a common non-standard alias of `image/jpeg`.
    Jpg,
    Gif,
    Bmp,
    Svg,
}

impl ImageSubtype {
    fn from_media_suffix(suffix: &str) -> Option<Self> {
        match suffix {
            "png" => Some(Self::Png),
            "jpeg" => Some(Self::Jpeg),
            "jpg" => Some(Self::Jpg),
            "gif" => Some(Self::Gif),
            "bmp" => Some(Self::Bmp),
            "svg+xml" => Some(Self::Svg),
            _ => None,
        }
    }

    pub fn is_jpeg(&self) -> bool {
        matches!(self, Self::Jpeg | Self::Jpg)
    }
}

/// A decoded image data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDataUri {
    pub subtype: ImageSubtype,
    pub bytes: Vec<u8>,
}

impl ImageDataUri {
    /// Parse `data:image/<subtype>;base64,<payload>`.
    ///
    /// Fails when the URI does not match the supported pattern or when the
    /// payload is not valid base64.
    pub fn parse(src: &str) -> Result<Self> {
        let captures = IMAGE_DATA_URI.captures(src.trim()).ok_or_else(|| {
            FolioError::InvalidDataUri(format!("unsupported image source: {}", preview(src)))
        })?;

        let subtype = ImageSubtype::from_media_suffix(&captures[1]).ok_or_else(|| {
            FolioError::InvalidDataUri(format!("unsupported image subtype {}", &captures[1]))
        })?;

        let bytes = STANDARD
            .decode(captures[2].trim_end())
            .map_err(|err| FolioError::InvalidDataUri(format!("bad base64 payload: {err}")))?;

        Ok(Self { subtype, bytes })
    }
}

/// Short prefix of a possibly huge URI, for error messages.
fn preview(src: &str) -> String {
    src.chars().take(40).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_png_payload() {
        let uri = ImageDataUri::parse("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(uri.subtype, ImageSubtype::Png);
        assert_eq!(uri.bytes, b"hello");
    }

    #[test]
    fn jpeg_aliases_are_recognised() {
        let jpg = ImageDataUri::parse("data:image/jpg;base64,AAAA").unwrap();
        let jpeg = ImageDataUri::parse("data:image/jpeg;base64,AAAA").unwrap();
        assert!(jpg.subtype.is_jpeg());
        assert!(jpeg.subtype.is_jpeg());
    }

    #[test]
    fn svg_subtype_strips_xml_suffix() {
        let uri = ImageDataUri::parse("data:image/svg+xml;base64,PHN2Zy8+").unwrap();
        assert_eq!(uri.subtype, ImageSubtype::Svg);
        assert!(!uri.subtype.is_jpeg());
    }

    #[test]
    fn rejects_remote_urls_and_unknown_types() {
        for src in [
            "https://example.com/cat.png",
            "data:image/webp;base64,AAAA",
            "data:image/png,rawbytes",
            "data:image/png;base64,",
        ] {
            let err = ImageDataUri::parse(src).unwrap_err();
            assert!(matches!(err, FolioError::InvalidDataUri(_)), "{src}");
        }
    }

    #[test]
    fn rejects_corrupt_base64() {
        let err = ImageDataUri::parse("data:image/png;base64,@@@@").unwrap_err();
        assert!(err.to_string().contains("base64"));
    }
}
