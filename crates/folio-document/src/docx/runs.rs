// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Inline runs — text leaves with their marks, embedded images, and hard
// breaks turned into paragraph content.

use folio_core::{DocumentNode, ExportConfig, Mark, MarkKind, NodeKind};
use tracing::{debug, warn};

use super::model::{Highlight, Hyperlink, ImageKind, ImageRun, Inline, Rgb, RunFormat, TextRun};
use crate::image::ImageDataUri;

/// Highlight tokens the package format accepts by name.
const HIGHLIGHT_TOKENS: &[&str] = &[
    "black",
    "blue",
    "cyan",
    "green",
    "magenta",
    "red",
    "yellow",
    "white",
    "darkBlue",
    "darkCyan",
    "darkGreen",
    "darkMagenta",
    "darkRed",
    "darkYellow",
    "darkGray",
    "lightGray",
];

/// Builds paragraph content from inline nodes.
pub struct InlineRunBuilder<'a> {
    config: &'a ExportConfig,
}

impl<'a> InlineRunBuilder<'a> {
    pub fn new(config: &'a ExportConfig) -> Self {
        Self { config }
    }

    /// Convert a sequence of inline nodes into runs, in order.
    ///
    /// Images whose payload cannot be decoded are dropped on their own; the
    /// rest of the sequence is unaffected. Unknown inline wrappers contribute
    /// their children.
    pub fn build(&self, nodes: &[DocumentNode]) -> Vec<Inline> {
        let mut inlines = Vec::with_capacity(nodes.len());
        for node in nodes {
            self.push_node(node, &mut inlines);
        }
        inlines
    }

    fn push_node(&self, node: &DocumentNode, out: &mut Vec<Inline>) {
        match &node.kind {
            NodeKind::Text => out.push(self.text_inline(node)),
            NodeKind::Image => {
                if let Some(image) = self.image_run(node) {
                    out.push(Inline::Image(image));
                }
            }
            NodeKind::HardBreak => out.push(Inline::Break),
            other => {
                debug!(kind = other.tag(), "Flattening unexpected inline node");
                for child in &node.content {
                    self.push_node(child, out);
                }
            }
        }
    }

    fn text_inline(&self, node: &DocumentNode) -> Inline {
        let text = node.text.clone().unwrap_or_default();
        let mut format = self.format_from_marks(&node.marks);

        let href = node
            .marks
            .iter()
            .find(|mark| mark.kind == MarkKind::Hyperlink)
            .and_then(|mark| mark.attr_str("href"));

        match href {
            Some(url) => {
                format.style = Some("Hyperlink".into());
                Inline::Hyperlink(Hyperlink {
                    url: url.to_owned(),
                    run: TextRun { text, format },
                })
            }
            None => Inline::Text(TextRun { text, format }),
        }
    }

    /// Fold a mark sequence into run formatting. Later marks of the same kind
    /// override earlier ones.
    pub fn format_from_marks(&self, marks: &[Mark]) -> RunFormat {
        marks.iter().fold(RunFormat::default(), |mut format, mark| {
            match &mark.kind {
                MarkKind::Bold => format.bold = true,
                MarkKind::Italic => format.italic = true,
                MarkKind::Underline => format.underline = true,
                MarkKind::Strike => format.strike = true,
                MarkKind::InlineCode => format.font = Some(self.config.monospace_font.clone()),
                MarkKind::TextColor => {
                    if let Some(color) = mark.attr_str("color").and_then(Rgb::parse) {
                        format.color = Some(color);
                    }
                }
                MarkKind::Highlight => {
                    format.highlight = Some(self.highlight(mark.attr_str("color")));
                }
                MarkKind::Hyperlink | MarkKind::Other(_) => {}
            }
            format
        })
    }

    fn highlight(&self, color: Option<&str>) -> Highlight {
        let Some(color) = color else {
            return Highlight::Named(self.config.default_highlight.clone());
        };
        if let Some(token) = HIGHLIGHT_TOKENS
            .iter()
            .find(|token| token.eq_ignore_ascii_case(color))
        {
            return Highlight::Named((*token).to_owned());
        }
        match Rgb::parse(color) {
            Some(rgb) => Highlight::Shade(rgb),
            None => Highlight::Named(self.config.default_highlight.clone()),
        }
    }

    fn image_run(&self, node: &DocumentNode) -> Option<ImageRun> {
        let Some(src) = node.attr_str("src") else {
            debug!("Dropping image without a source");
            return None;
        };

        let uri = match ImageDataUri::parse(src) {
            Ok(uri) => uri,
            Err(err) => {
                warn!(%err, "Dropping image with undecodable source");
                return None;
            }
        };

        let kind = if uri.subtype.is_jpeg() {
            ImageKind::Jpeg
        } else {
            ImageKind::Png
        };

        Some(ImageRun {
            data: uri.bytes,
            kind,
            width: positive_dimension(node.attr_f64("width"))
                .unwrap_or(self.config.default_image_width),
            height: positive_dimension(node.attr_f64("height"))
                .unwrap_or(self.config.default_image_height),
        })
    }
}

/// Rounded pixel size; zero, negative, and non-finite sizes count as unset.
fn positive_dimension(value: Option<f64>) -> Option<u32> {
    value
        .filter(|v| v.is_finite() && *v >= 1.0)
        .map(|v| v.round().min(f64::from(u32::MAX)) as u32)
}
