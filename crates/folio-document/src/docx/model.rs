// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Package-level block model: paragraphs, runs, and tables as the word
// processor sees them, before being written out as XML parts.

use super::numbering::NumberingId;

/// A body-level element.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

impl Block {
    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match self {
            Self::Paragraph(paragraph) => Some(paragraph),
            Self::Table(_) => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Self::Table(table) => Some(table),
            Self::Paragraph(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    /// Map the editor's `textAlign` attribute. `left` and anything unknown
    /// yield `None`, leaving the paragraph at its default alignment.
    pub fn from_text_align(value: Option<&str>) -> Option<Self> {
        match value? {
            "center" => Some(Self::Center),
            "right" => Some(Self::Right),
            "justify" => Some(Self::Justify),
            _ => None,
        }
    }

    pub fn jc_value(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
            Self::Justify => "both",
        }
    }
}

/// A single border line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Border {
    /// Width in eighths of a point.
    pub size: u32,
    /// 6 hex digits.
    pub color: String,
}

/// Numbering attached to a list paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMembership {
    pub id: NumberingId,
    /// Logical nesting depth, unbounded. The written level is clamped to the
    /// deepest template the numbering definition carries.
    pub level: u8,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub inlines: Vec<Inline>,
    /// Heading level 1–6.
    pub heading: Option<u8>,
    pub alignment: Option<Alignment>,
    pub list: Option<ListMembership>,
    /// Left indent in twips.
    pub indent_left: Option<u32>,
    /// Hanging indent in twips, written alongside `indent_left`.
    pub indent_hanging: Option<u32>,
    pub border_left: Option<Border>,
    pub border_bottom: Option<Border>,
    /// Line spacing in 240ths of a line.
    pub line_spacing: Option<u32>,
}

impl Paragraph {
    pub fn new(inlines: Vec<Inline>) -> Self {
        Self {
            inlines,
            ..Self::default()
        }
    }

    /// Plain text of the paragraph, line breaks as `\n`.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for inline in &self.inlines {
            match inline {
                Inline::Text(run) => out.push_str(&run.text),
                Inline::Hyperlink(link) => out.push_str(&link.run.text),
                Inline::Break => out.push('\n'),
                Inline::Image(_) => {}
            }
        }
        out
    }
}

/// Paragraph content.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(TextRun),
    Image(ImageRun),
    Hyperlink(Hyperlink),
    /// Forced line break.
    Break,
}

/// 24-bit colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parse `#rrggbb`, `rrggbb`, `#rgb`, or `rgb(r, g, b)`.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if let Some(args) = value
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let mut channels = args.split(',').map(|c| c.trim().parse::<u8>().ok());
            let rgb = Self {
                r: channels.next()??,
                g: channels.next()??,
                b: channels.next()??,
            };
            return channels.next().is_none().then_some(rgb);
        }

        let hex = value.strip_prefix('#').unwrap_or(value);
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            6 => Some(Self {
                r: channel(&hex[0..2])?,
                g: channel(&hex[2..4])?,
                b: channel(&hex[4..6])?,
            }),
            3 => {
                let doubled: String = hex.chars().flat_map(|c| [c, c]).collect();
                Self::parse(&doubled)
            }
            _ => None,
        }
    }

    /// Six uppercase hex digits, no leading `#`.
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Background highlight of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Highlight {
    /// One of the word processor's fixed highlight tokens.
    Named(String),
    /// Arbitrary colour, written as run shading.
    Shade(Rgb),
}

/// Character formatting of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunFormat {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    pub font: Option<String>,
    /// Size in half-points.
    pub size: Option<u32>,
    pub color: Option<Rgb>,
    pub highlight: Option<Highlight>,
    /// Character style id, e.g. `Hyperlink`.
    pub style: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub format: RunFormat,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: RunFormat::default(),
        }
    }
}

/// How an embedded image is typed inside the package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
}

impl ImageKind {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRun {
    pub data: Vec<u8>,
    pub kind: ImageKind,
    /// Display size in device-independent pixels.
    pub width: u32,
    pub height: u32,
}

/// A run wrapped in an external link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hyperlink {
    pub url: String,
    pub run: TextRun,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Table width as a percentage of the text area.
    pub width_pct: f64,
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Widest row, in cells.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(|row| row.cells.len()).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    /// Cell width as a percentage of the table width.
    pub width_pct: f64,
    pub blocks: Vec<Block>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_colour_notations() {
        let red = Rgb { r: 255, g: 0, b: 0 };
        assert_eq!(Rgb::parse("#ff0000"), Some(red));
        assert_eq!(Rgb::parse("FF0000"), Some(red));
        assert_eq!(Rgb::parse("#f00"), Some(red));
        assert_eq!(Rgb::parse("rgb(255, 0, 0)"), Some(red));
        assert_eq!(red.to_hex(), "FF0000");
    }

    #[test]
    fn rejects_unparseable_colours() {
        for value in ["red", "#ff00", "rgb(300, 0, 0)", "rgb(1, 2)", "#gg0000", ""] {
            assert_eq!(Rgb::parse(value), None, "{value}");
        }
    }

    #[test]
    fn left_and_unknown_alignment_stay_default() {
        assert_eq!(Alignment::from_text_align(Some("left")), None);
        assert_eq!(Alignment::from_text_align(Some("diagonal")), None);
        assert_eq!(Alignment::from_text_align(None), None);
        assert_eq!(
            Alignment::from_text_align(Some("justify")),
            Some(Alignment::Justify)
        );
    }

    #[test]
    fn paragraph_text_includes_links_and_breaks() {
        let paragraph = Paragraph::new(vec![
            Inline::Text(TextRun::plain("see ")),
            Inline::Hyperlink(Hyperlink {
                url: "https://example.com".into(),
                run: TextRun::plain("here"),
            }),
            Inline::Break,
            Inline::Text(TextRun::plain("done")),
        ]);
        assert_eq!(paragraph.text(), "see here\ndone");
    }
}
