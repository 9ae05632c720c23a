// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Package assembly — writes the serialised blocks, numbering table, styles,
// media, and metadata as a zipped WordprocessingML package.

use std::collections::HashMap;
use std::io::{Cursor, Write};

use chrono::{DateTime, SecondsFormat, Utc};
use folio_core::{ExportConfig, FolioError, Result};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::blocks::SerializedDocument;
use super::model::{
    Block, Border, Highlight, Hyperlink, ImageKind, ImageRun, Inline, Paragraph, RunFormat, Table,
    TextRun,
};
use super::numbering::{MAX_TEMPLATE_LEVEL, NumberingDefinition};
use super::xml::PartWriter;

// -- Namespaces and relationship types ----------------------------------------

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
const NS_RELS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_CORE: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
const REL_APP: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
const REL_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const REL_NUMBERING: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/numbering";
const REL_HYPERLINK: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
const REL_IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

// -- Page geometry (twips) ----------------------------------------------------

const PAGE_WIDTH: u32 = 12_240;
const PAGE_HEIGHT: u32 = 15_840;
const PAGE_MARGIN: u32 = 1_440;
/// Text area width on a Letter page with 1in margins.
const TEXT_WIDTH: u32 = PAGE_WIDTH - 2 * PAGE_MARGIN;

/// English Metric Units per device-independent pixel.
const EMU_PER_PX: u64 = 9_525;

/// Half-point sizes for Heading1..Heading6.
const HEADING_SIZES: [u32; 6] = [32, 28, 26, 24, 22, 22];

/// Writes a [`SerializedDocument`] out as package bytes.
pub struct PackageAssembler<'a> {
    config: &'a ExportConfig,
    timestamp: Option<DateTime<Utc>>,
}

impl<'a> PackageAssembler<'a> {
    pub fn new(config: &'a ExportConfig) -> Self {
        Self {
            config,
            timestamp: None,
        }
    }

    /// Use a fixed creation time instead of the current clock.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Build the complete package.
    ///
    /// Fails only when the XML or zip writer rejects a part, which is an
    /// assembly failure for the whole export.
    #[instrument(skip_all, fields(blocks = document.blocks.len(), lists = document.numbering.len()))]
    pub fn assemble(&self, document: &SerializedDocument) -> Result<Vec<u8>> {
        let mut body = DocumentWriter::new()?;
        body.write_document(&document.blocks)?;
        let DocumentWriter { xml, rels, .. } = body;
        let document_xml = xml.finish();

        let timestamp = self.timestamp.unwrap_or_else(Utc::now);

        let mut parts: Vec<(String, Vec<u8>, CompressionMethod)> = vec![
            (
                "[Content_Types].xml".into(),
                content_types(&rels.media)?,
                CompressionMethod::Deflated,
            ),
            ("_rels/.rels".into(), package_rels()?, CompressionMethod::Deflated),
            (
                "docProps/core.xml".into(),
                self.core_properties(timestamp)?,
                CompressionMethod::Deflated,
            ),
            ("docProps/app.xml".into(), app_properties()?, CompressionMethod::Deflated),
            ("word/document.xml".into(), document_xml, CompressionMethod::Deflated),
            ("word/styles.xml".into(), styles()?, CompressionMethod::Deflated),
            (
                "word/numbering.xml".into(),
                self.numbering(&document.numbering)?,
                CompressionMethod::Deflated,
            ),
            (
                "word/_rels/document.xml.rels".into(),
                rels.to_xml()?,
                CompressionMethod::Deflated,
            ),
        ];
        for media in &rels.media {
            // Already compressed formats; store as-is.
            parts.push((
                format!("word/media/{}", media.name),
                media.data.to_vec(),
                CompressionMethod::Stored,
            ));
        }

        let bytes = zip_parts(&parts)?;
        info!(
            bytes = bytes.len(),
            media = rels.media.len(),
            links = rels.links.len(),
            "Package assembled"
        );
        Ok(bytes)
    }

    // -- Numbering ------------------------------------------------------------

    fn numbering(&self, definitions: &[NumberingDefinition]) -> Result<Vec<u8>> {
        let mut xml = PartWriter::new()?;
        xml.start("w:numbering", &[("xmlns:w", NS_W)])?;

        // All abstract definitions precede all instances.
        for def in definitions {
            let abstract_id = def.id.abstract_id().to_string();
            xml.start("w:abstractNum", &[("w:abstractNumId", &abstract_id)])?;
            xml.empty("w:multiLevelType", &[("w:val", "hybridMultilevel")])?;
            for level in def.levels(self.config) {
                let ilvl = level.level.to_string();
                let left = level.indent_left.to_string();
                let hanging = level.hanging.to_string();
                xml.start("w:lvl", &[("w:ilvl", &ilvl)])?;
                xml.empty("w:start", &[("w:val", "1")])?;
                xml.empty("w:numFmt", &[("w:val", level.format.num_fmt())])?;
                xml.empty("w:lvlText", &[("w:val", &level.text)])?;
                xml.empty("w:lvlJc", &[("w:val", "left")])?;
                xml.start("w:pPr", &[])?;
                xml.empty("w:ind", &[("w:left", &left), ("w:hanging", &hanging)])?;
                xml.end("w:pPr")?;
                xml.end("w:lvl")?;
            }
            xml.end("w:abstractNum")?;
        }
        for def in definitions {
            let num_id = def.id.get().to_string();
            let abstract_id = def.id.abstract_id().to_string();
            xml.start("w:num", &[("w:numId", &num_id)])?;
            xml.empty("w:abstractNumId", &[("w:val", &abstract_id)])?;
            xml.end("w:num")?;
        }

        xml.end("w:numbering")?;
        debug!(definitions = definitions.len(), "Numbering part written");
        Ok(xml.finish())
    }

    // -- Metadata -------------------------------------------------------------

    fn core_properties(&self, timestamp: DateTime<Utc>) -> Result<Vec<u8>> {
        let stamp = timestamp.to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut xml = PartWriter::new()?;
        xml.start(
            "cp:coreProperties",
            &[
                (
                    "xmlns:cp",
                    "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
                ),
                ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
                ("xmlns:dcterms", "http://purl.org/dc/terms/"),
                ("xmlns:dcmitype", "http://purl.org/dc/dcmitype/"),
                ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
            ],
        )?;
        if let Some(title) = &self.config.title {
            xml.text_element("dc:title", &[], title)?;
        }
        if let Some(creator) = &self.config.creator {
            xml.text_element("dc:creator", &[], creator)?;
        }
        let w3cdtf = [("xsi:type", "dcterms:W3CDTF")];
        xml.text_element("dcterms:created", &w3cdtf, &stamp)?;
        xml.text_element("dcterms:modified", &w3cdtf, &stamp)?;
        xml.end("cp:coreProperties")?;
        Ok(xml.finish())
    }
}

// -- Relationships ------------------------------------------------------------

struct Relationship {
    id: String,
    kind: &'static str,
    target: String,
    external: bool,
}

struct MediaPart<'a> {
    name: String,
    kind: ImageKind,
    data: &'a [u8],
}

/// Relationships of `word/document.xml`, registered as the body is written.
struct DocumentRelationships<'a> {
    entries: Vec<Relationship>,
    /// URL -> relationship id.
    links: HashMap<String, String>,
    media: Vec<MediaPart<'a>>,
    /// SHA-256 of the payload -> relationship id.
    media_by_digest: HashMap<String, String>,
}

impl<'a> DocumentRelationships<'a> {
    fn new() -> Self {
        let mut rels = Self {
            entries: Vec::new(),
            links: HashMap::new(),
            media: Vec::new(),
            media_by_digest: HashMap::new(),
        };
        rels.push(REL_STYLES, "styles.xml".into(), false);
        rels.push(REL_NUMBERING, "numbering.xml".into(), false);
        rels
    }

    fn push(&mut self, kind: &'static str, target: String, external: bool) -> String {
        let id = format!("rId{}", self.entries.len() + 1);
        self.entries.push(Relationship {
            id: id.clone(),
            kind,
            target,
            external,
        });
        id
    }

    fn hyperlink(&mut self, url: &str) -> String {
        if let Some(id) = self.links.get(url) {
            return id.clone();
        }
        let id = self.push(REL_HYPERLINK, url.to_owned(), true);
        self.links.insert(url.to_owned(), id.clone());
        id
    }

    /// Register an image payload; identical payloads share one media part.
    fn image(&mut self, image: &'a ImageRun) -> String {
        let digest = hex::encode(Sha256::digest(&image.data));
        if let Some(id) = self.media_by_digest.get(&digest) {
            return id.clone();
        }
        let name = format!("image{}.{}", self.media.len() + 1, image.kind.extension());
        let id = self.push(REL_IMAGE, format!("media/{name}"), false);
        self.media.push(MediaPart {
            name,
            kind: image.kind,
            data: &image.data,
        });
        self.media_by_digest.insert(digest, id.clone());
        id
    }

    fn to_xml(&self) -> Result<Vec<u8>> {
        let mut xml = PartWriter::new()?;
        xml.start("Relationships", &[("xmlns", NS_RELS)])?;
        for rel in &self.entries {
            let mut attrs = vec![
                ("Id", rel.id.as_str()),
                ("Type", rel.kind),
                ("Target", rel.target.as_str()),
            ];
            if rel.external {
                attrs.push(("TargetMode", "External"));
            }
            xml.empty("Relationship", &attrs)?;
        }
        xml.end("Relationships")?;
        Ok(xml.finish())
    }
}

// -- Document body ------------------------------------------------------------

struct DocumentWriter<'a> {
    xml: PartWriter,
    rels: DocumentRelationships<'a>,
    /// Drawing object ids, unique within the document.
    next_drawing_id: u32,
}

impl<'a> DocumentWriter<'a> {
    fn new() -> Result<Self> {
        Ok(Self {
            xml: PartWriter::new()?,
            rels: DocumentRelationships::new(),
            next_drawing_id: 1,
        })
    }

    fn write_document(&mut self, blocks: &'a [Block]) -> Result<()> {
        self.xml.start(
            "w:document",
            &[
                ("xmlns:w", NS_W),
                ("xmlns:r", NS_R),
                ("xmlns:wp", NS_WP),
                ("xmlns:a", NS_A),
                ("xmlns:pic", NS_PIC),
            ],
        )?;
        self.xml.start("w:body", &[])?;
        for block in blocks {
            self.write_block(block)?;
        }
        self.write_section()?;
        self.xml.end("w:body")?;
        self.xml.end("w:document")
    }

    /// The single section wrapping the whole body.
    fn write_section(&mut self) -> Result<()> {
        let width = PAGE_WIDTH.to_string();
        let height = PAGE_HEIGHT.to_string();
        let margin = PAGE_MARGIN.to_string();
        self.xml.start("w:sectPr", &[])?;
        self.xml
            .empty("w:pgSz", &[("w:w", &width), ("w:h", &height)])?;
        self.xml.empty(
            "w:pgMar",
            &[
                ("w:top", &margin),
                ("w:right", &margin),
                ("w:bottom", &margin),
                ("w:left", &margin),
                ("w:header", "720"),
                ("w:footer", "720"),
                ("w:gutter", "0"),
            ],
        )?;
        self.xml.end("w:sectPr")
    }

    fn write_block(&mut self, block: &'a Block) -> Result<()> {
        match block {
            Block::Paragraph(paragraph) => self.write_paragraph(paragraph),
            Block::Table(table) => self.write_table(table),
        }
    }

    // -- Paragraphs -----------------------------------------------------------

    fn write_paragraph(&mut self, paragraph: &'a Paragraph) -> Result<()> {
        self.xml.start("w:p", &[])?;
        self.write_paragraph_properties(paragraph)?;
        for inline in &paragraph.inlines {
            self.write_inline(inline)?;
        }
        self.xml.end("w:p")
    }

    fn write_paragraph_properties(&mut self, p: &Paragraph) -> Result<()> {
        let has_properties = p.heading.is_some()
            || p.list.is_some()
            || p.border_left.is_some()
            || p.border_bottom.is_some()
            || p.line_spacing.is_some()
            || p.indent_left.is_some()
            || p.alignment.is_some();
        if !has_properties {
            return Ok(());
        }

        self.xml.start("w:pPr", &[])?;
        if let Some(level) = p.heading {
            let style = format!("Heading{level}");
            self.xml.empty("w:pStyle", &[("w:val", &style)])?;
        }
        if let Some(list) = p.list {
            let ilvl = list.level.min(MAX_TEMPLATE_LEVEL).to_string();
            let num_id = list.id.get().to_string();
            self.xml.start("w:numPr", &[])?;
            self.xml.empty("w:ilvl", &[("w:val", &ilvl)])?;
            self.xml.empty("w:numId", &[("w:val", &num_id)])?;
            self.xml.end("w:numPr")?;
        }
        if p.border_left.is_some() || p.border_bottom.is_some() {
            self.xml.start("w:pBdr", &[])?;
            if let Some(border) = &p.border_left {
                self.write_border("w:left", border)?;
            }
            if let Some(border) = &p.border_bottom {
                self.write_border("w:bottom", border)?;
            }
            self.xml.end("w:pBdr")?;
        }
        if let Some(line) = p.line_spacing {
            let line = line.to_string();
            self.xml.empty(
                "w:spacing",
                &[("w:before", "0"), ("w:after", "0"), ("w:line", &line), ("w:lineRule", "auto")],
            )?;
        }
        if let Some(left) = p.indent_left {
            let left = left.to_string();
            match p.indent_hanging {
                Some(hanging) => {
                    let hanging = hanging.to_string();
                    self.xml
                        .empty("w:ind", &[("w:left", &left), ("w:hanging", &hanging)])?;
                }
                None => self.xml.empty("w:ind", &[("w:left", &left)])?,
            }
        }
        if let Some(alignment) = p.alignment {
            self.xml.empty("w:jc", &[("w:val", alignment.jc_value())])?;
        }
        self.xml.end("w:pPr")
    }

    fn write_border(&mut self, side: &str, border: &Border) -> Result<()> {
        let size = border.size.to_string();
        self.xml.empty(
            side,
            &[
                ("w:val", "single"),
                ("w:sz", &size),
                ("w:space", "4"),
                ("w:color", &border.color),
            ],
        )
    }

    // -- Runs -----------------------------------------------------------------

    fn write_inline(&mut self, inline: &'a Inline) -> Result<()> {
        match inline {
            Inline::Text(run) => self.write_text_run(run),
            Inline::Hyperlink(link) => self.write_hyperlink(link),
            Inline::Image(image) => self.write_image(image),
            Inline::Break => {
                self.xml.start("w:r", &[])?;
                self.xml.empty("w:br", &[])?;
                self.xml.end("w:r")
            }
        }
    }

    fn write_text_run(&mut self, run: &TextRun) -> Result<()> {
        self.xml.start("w:r", &[])?;
        self.write_run_properties(&run.format)?;
        self.xml
            .text_element("w:t", &[("xml:space", "preserve")], &run.text)?;
        self.xml.end("w:r")
    }

    fn write_run_properties(&mut self, format: &RunFormat) -> Result<()> {
        if *format == RunFormat::default() {
            return Ok(());
        }

        let xml = &mut self.xml;
        xml.start("w:rPr", &[])?;
        if let Some(style) = &format.style {
            xml.empty("w:rStyle", &[("w:val", style)])?;
        }
        if let Some(font) = &format.font {
            xml.empty(
                "w:rFonts",
                &[("w:ascii", font), ("w:hAnsi", font), ("w:cs", font)],
            )?;
        }
        if format.bold {
            xml.empty("w:b", &[])?;
        }
        if format.italic {
            xml.empty("w:i", &[])?;
        }
        if format.strike {
            xml.empty("w:strike", &[])?;
        }
        if let Some(color) = format.color {
            xml.empty("w:color", &[("w:val", &color.to_hex())])?;
        }
        if let Some(size) = format.size {
            let size = size.to_string();
            xml.empty("w:sz", &[("w:val", &size)])?;
            xml.empty("w:szCs", &[("w:val", &size)])?;
        }
        if let Some(Highlight::Named(token)) = &format.highlight {
            xml.empty("w:highlight", &[("w:val", token)])?;
        }
        if format.underline {
            xml.empty("w:u", &[("w:val", "single")])?;
        }
        if let Some(Highlight::Shade(rgb)) = &format.highlight {
            xml.empty(
                "w:shd",
                &[("w:val", "clear"), ("w:color", "auto"), ("w:fill", &rgb.to_hex())],
            )?;
        }
        xml.end("w:rPr")
    }

    fn write_hyperlink(&mut self, link: &Hyperlink) -> Result<()> {
        let id = self.rels.hyperlink(&link.url);
        self.xml
            .start("w:hyperlink", &[("r:id", &id), ("w:history", "1")])?;
        self.write_text_run(&link.run)?;
        self.xml.end("w:hyperlink")
    }

    fn write_image(&mut self, image: &'a ImageRun) -> Result<()> {
        let rel_id = self.rels.image(image);
        let drawing_id = self.next_drawing_id;
        self.next_drawing_id += 1;

        let id = drawing_id.to_string();
        let name = format!("Picture {drawing_id}");
        let file_name = format!("image{drawing_id}.{}", image.kind.extension());
        let cx = (u64::from(image.width) * EMU_PER_PX).to_string();
        let cy = (u64::from(image.height) * EMU_PER_PX).to_string();

        let xml = &mut self.xml;
        xml.start("w:r", &[])?;
        xml.start("w:drawing", &[])?;
        xml.start(
            "wp:inline",
            &[("distT", "0"), ("distB", "0"), ("distL", "0"), ("distR", "0")],
        )?;
        xml.empty("wp:extent", &[("cx", &cx), ("cy", &cy)])?;
        xml.empty("wp:docPr", &[("id", &id), ("name", &name)])?;
        xml.start("wp:cNvGraphicFramePr", &[])?;
        xml.empty("a:graphicFrameLocks", &[("noChangeAspect", "1")])?;
        xml.end("wp:cNvGraphicFramePr")?;
        xml.start("a:graphic", &[])?;
        xml.start("a:graphicData", &[("uri", NS_PIC)])?;
        xml.start("pic:pic", &[])?;
        xml.start("pic:nvPicPr", &[])?;
        xml.empty("pic:cNvPr", &[("id", &id), ("name", &file_name)])?;
        xml.empty("pic:cNvPicPr", &[])?;
        xml.end("pic:nvPicPr")?;
        xml.start("pic:blipFill", &[])?;
        xml.empty("a:blip", &[("r:embed", &rel_id)])?;
        xml.start("a:stretch", &[])?;
        xml.empty("a:fillRect", &[])?;
        xml.end("a:stretch")?;
        xml.end("pic:blipFill")?;
        xml.start("pic:spPr", &[])?;
        xml.start("a:xfrm", &[])?;
        xml.empty("a:off", &[("x", "0"), ("y", "0")])?;
        xml.empty("a:ext", &[("cx", &cx), ("cy", &cy)])?;
        xml.end("a:xfrm")?;
        xml.start("a:prstGeom", &[("prst", "rect")])?;
        xml.empty("a:avLst", &[])?;
        xml.end("a:prstGeom")?;
        xml.end("pic:spPr")?;
        xml.end("pic:pic")?;
        xml.end("a:graphicData")?;
        xml.end("a:graphic")?;
        xml.end("wp:inline")?;
        xml.end("w:drawing")?;
        xml.end("w:r")
    }

    // -- Tables ---------------------------------------------------------------

    fn write_table(&mut self, table: &'a Table) -> Result<()> {
        let columns = table.column_count().max(1);
        let table_width = pct_fiftieths(table.width_pct);
        let grid_width = (TEXT_WIDTH / columns as u32).to_string();

        self.xml.start("w:tbl", &[])?;
        self.xml.start("w:tblPr", &[])?;
        self.xml
            .empty("w:tblW", &[("w:w", &table_width), ("w:type", "pct")])?;
        self.xml.start("w:tblBorders", &[])?;
        for side in ["w:top", "w:left", "w:bottom", "w:right", "w:insideH", "w:insideV"] {
            self.xml.empty(
                side,
                &[("w:val", "single"), ("w:sz", "4"), ("w:space", "0"), ("w:color", "auto")],
            )?;
        }
        self.xml.end("w:tblBorders")?;
        self.xml.end("w:tblPr")?;

        self.xml.start("w:tblGrid", &[])?;
        for _ in 0..columns {
            self.xml.empty("w:gridCol", &[("w:w", &grid_width)])?;
        }
        self.xml.end("w:tblGrid")?;

        for row in &table.rows {
            self.xml.start("w:tr", &[])?;
            if row.cells.is_empty() {
                self.write_cell(100.0, &[])?;
            }
            for cell in &row.cells {
                self.write_cell(cell.width_pct, &cell.blocks)?;
            }
            self.xml.end("w:tr")?;
        }
        self.xml.end("w:tbl")
    }

    fn write_cell(&mut self, width_pct: f64, blocks: &'a [Block]) -> Result<()> {
        let width = pct_fiftieths(width_pct);
        self.xml.start("w:tc", &[])?;
        self.xml.start("w:tcPr", &[])?;
        self.xml
            .empty("w:tcW", &[("w:w", &width), ("w:type", "pct")])?;
        self.xml.end("w:tcPr")?;
        for block in blocks {
            self.write_block(block)?;
        }
        // A cell must end with a paragraph.
        if !matches!(blocks.last(), Some(Block::Paragraph(_))) {
            self.xml.empty("w:p", &[])?;
        }
        self.xml.end("w:tc")
    }
}

/// Percentage as fiftieths of a percent, the unit of `pct` widths.
fn pct_fiftieths(pct: f64) -> String {
    ((pct * 50.0).round() as i64).to_string()
}

// -- Fixed parts --------------------------------------------------------------

fn content_types(media: &[MediaPart<'_>]) -> Result<Vec<u8>> {
    let mut xml = PartWriter::new()?;
    xml.start("Types", &[("xmlns", NS_TYPES)])?;
    xml.empty(
        "Default",
        &[
            ("Extension", "rels"),
            ("ContentType", "application/vnd.openxmlformats-package.relationships+xml"),
        ],
    )?;
    xml.empty(
        "Default",
        &[("Extension", "xml"), ("ContentType", "application/xml")],
    )?;
    for kind in [ImageKind::Png, ImageKind::Jpeg] {
        if media.iter().any(|m| m.kind == kind) {
            xml.empty(
                "Default",
                &[("Extension", kind.extension()), ("ContentType", kind.content_type())],
            )?;
        }
    }

    let overrides = [
        (
            "/word/document.xml",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml",
        ),
        (
            "/word/styles.xml",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml",
        ),
        (
            "/word/numbering.xml",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.numbering+xml",
        ),
        (
            "/docProps/core.xml",
            "application/vnd.openxmlformats-package.core-properties+xml",
        ),
        (
            "/docProps/app.xml",
            "application/vnd.openxmlformats-officedocument.extended-properties+xml",
        ),
    ];
    for (part, content_type) in overrides {
        xml.empty("Override", &[("PartName", part), ("ContentType", content_type)])?;
    }
    xml.end("Types")?;
    Ok(xml.finish())
}

fn package_rels() -> Result<Vec<u8>> {
    let mut xml = PartWriter::new()?;
    xml.start("Relationships", &[("xmlns", NS_RELS)])?;
    for (id, kind, target) in [
        ("rId1", REL_OFFICE_DOCUMENT, "word/document.xml"),
        ("rId2", REL_CORE, "docProps/core.xml"),
        ("rId3", REL_APP, "docProps/app.xml"),
    ] {
        xml.empty(
            "Relationship",
            &[("Id", id), ("Type", kind), ("Target", target)],
        )?;
    }
    xml.end("Relationships")?;
    Ok(xml.finish())
}

fn app_properties() -> Result<Vec<u8>> {
    let mut xml = PartWriter::new()?;
    xml.start(
        "Properties",
        &[
            (
                "xmlns",
                "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties",
            ),
            (
                "xmlns:vt",
                "http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes",
            ),
        ],
    )?;
    xml.text_element("Application", &[], "Folio")?;
    xml.text_element("AppVersion", &[], env!("CARGO_PKG_VERSION"))?;
    xml.end("Properties")?;
    Ok(xml.finish())
}

fn styles() -> Result<Vec<u8>> {
    let mut xml = PartWriter::new()?;
    xml.start("w:styles", &[("xmlns:w", NS_W)])?;

    xml.start("w:docDefaults", &[])?;
    xml.start("w:rPrDefault", &[])?;
    xml.start("w:rPr", &[])?;
    xml.empty(
        "w:rFonts",
        &[("w:ascii", "Calibri"), ("w:hAnsi", "Calibri"), ("w:cs", "Calibri")],
    )?;
    xml.empty("w:sz", &[("w:val", "22")])?;
    xml.empty("w:szCs", &[("w:val", "22")])?;
    xml.end("w:rPr")?;
    xml.end("w:rPrDefault")?;
    xml.start("w:pPrDefault", &[])?;
    xml.start("w:pPr", &[])?;
    xml.empty(
        "w:spacing",
        &[("w:after", "160"), ("w:line", "259"), ("w:lineRule", "auto")],
    )?;
    xml.end("w:pPr")?;
    xml.end("w:pPrDefault")?;
    xml.end("w:docDefaults")?;

    xml.start(
        "w:style",
        &[("w:type", "paragraph"), ("w:default", "1"), ("w:styleId", "Normal")],
    )?;
    xml.empty("w:name", &[("w:val", "Normal")])?;
    xml.empty("w:qFormat", &[])?;
    xml.end("w:style")?;

    for (index, size) in HEADING_SIZES.iter().enumerate() {
        let level = index + 1;
        let id = format!("Heading{level}");
        let name = format!("heading {level}");
        let outline = index.to_string();
        let size = size.to_string();
        xml.start("w:style", &[("w:type", "paragraph"), ("w:styleId", &id)])?;
        xml.empty("w:name", &[("w:val", &name)])?;
        xml.empty("w:basedOn", &[("w:val", "Normal")])?;
        xml.empty("w:next", &[("w:val", "Normal")])?;
        xml.empty("w:qFormat", &[])?;
        xml.start("w:pPr", &[])?;
        xml.empty("w:keepNext", &[])?;
        xml.empty("w:spacing", &[("w:before", "240"), ("w:after", "80")])?;
        xml.empty("w:outlineLvl", &[("w:val", &outline)])?;
        xml.end("w:pPr")?;
        xml.start("w:rPr", &[])?;
        xml.empty("w:b", &[])?;
        xml.empty("w:sz", &[("w:val", &size)])?;
        xml.empty("w:szCs", &[("w:val", &size)])?;
        xml.end("w:rPr")?;
        xml.end("w:style")?;
    }

    xml.start("w:style", &[("w:type", "character"), ("w:styleId", "Hyperlink")])?;
    xml.empty("w:name", &[("w:val", "Hyperlink")])?;
    xml.start("w:rPr", &[])?;
    xml.empty("w:color", &[("w:val", "0563C1")])?;
    xml.empty("w:u", &[("w:val", "single")])?;
    xml.end("w:rPr")?;
    xml.end("w:style")?;

    xml.end("w:styles")?;
    Ok(xml.finish())
}

fn zip_parts(parts: &[(String, Vec<u8>, CompressionMethod)]) -> Result<Vec<u8>> {
    let package_err = |e: zip::result::ZipError| FolioError::Package(format!("zip write failed: {e}"));

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, bytes, method) in parts {
        let options = SimpleFileOptions::default().compression_method(*method);
        zip.start_file(name.as_str(), options).map_err(package_err)?;
        zip.write_all(bytes)
            .map_err(|e| FolioError::Package(format!("failed to write {name}: {e}")))?;
    }
    let cursor = zip.finish().map_err(package_err)?;
    Ok(cursor.into_inner())
}
