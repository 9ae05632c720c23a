// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Export configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result};

/// Tunables for the word-processor package exporter.
///
/// Lengths are in twentieths of a point (twips) and font sizes in half-points,
/// the units the package format itself uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Font used for inline code and code blocks.
    pub monospace_font: String,
    /// Code block font size in half-points.
    pub code_font_size: u32,
    /// Line spacing for code block paragraphs (240 = single).
    pub code_line_spacing: u32,
    /// Image size in device-independent pixels when the node carries none.
    pub default_image_width: u32,
    pub default_image_height: u32,
    /// Left indent added per list nesting level.
    pub list_indent_step: u32,
    /// Hanging indent for list labels.
    pub list_hanging_indent: u32,
    /// Left indent added by each enclosing blockquote.
    pub blockquote_indent: u32,
    /// Blockquote left border colour (6 hex digits) and width in eighths of a point.
    pub blockquote_border_color: String,
    pub blockquote_border_size: u32,
    /// Horizontal rule bottom border colour and width.
    pub rule_border_color: String,
    pub rule_border_size: u32,
    /// Highlight token used when a highlight mark names no colour.
    pub default_highlight: String,
    /// Optional package metadata.
    pub title: Option<String>,
    pub creator: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            monospace_font: "Courier New".into(),
            code_font_size: 20,
            code_line_spacing: 240,
            default_image_width: 400,
            default_image_height: 300,
            list_indent_step: 720,
            list_hanging_indent: 360,
            blockquote_indent: 720,
            blockquote_border_color: "999999".into(),
            blockquote_border_size: 6,
            rule_border_color: "000000".into(),
            rule_border_size: 6,
            default_highlight: "yellow".into(),
            title: None,
            creator: None,
        }
    }
}

impl ExportConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| FolioError::Config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("blockquote_border_color", &self.blockquote_border_color),
            ("rule_border_color", &self.rule_border_color),
        ] {
            if value.len() != 6 || !value.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(FolioError::Config(format!(
                    "{field} must be 6 hex digits, got {value:?}"
                )));
            }
        }
        if self.monospace_font.trim().is_empty() {
            return Err(FolioError::Config("monospace_font must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = ExportConfig::from_json_str(r#"{"monospace_font": "Consolas"}"#).unwrap();
        assert_eq!(config.monospace_font, "Consolas");
        assert_eq!(config.default_image_width, 400);
        assert_eq!(config.default_highlight, "yellow");
    }

    #[test]
    fn rejects_malformed_border_colour() {
        let err = ExportConfig::from_json_str(r##"{"rule_border_color": "#000"}"##).unwrap_err();
        assert!(matches!(err, FolioError::Config(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"title": "Minutes", "code_font_size": 18}}"#).unwrap();

        let config = ExportConfig::load(file.path()).unwrap();
        assert_eq!(config.title.as_deref(), Some("Minutes"));
        assert_eq!(config.code_font_size, 18);
    }
}
