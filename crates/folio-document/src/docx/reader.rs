// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Package inspection — reads back the body structure of a package written by
// the assembler. Only what the exporter produces is recognised.

use std::io::{Cursor, Read};

use folio_core::{FolioError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde::Serialize;
use tracing::{debug, instrument};
use zip::ZipArchive;
use zip::result::ZipError;

/// A run as read back: its text and the toggles set on it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InspectedRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InspectedParagraph {
    /// Paragraph style id, e.g. `Heading2`.
    pub style: Option<String>,
    pub num_id: Option<u32>,
    pub level: Option<u8>,
    pub runs: Vec<InspectedRun>,
}

impl InspectedParagraph {
    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InspectedTable {
    /// Cell count of each row.
    pub rows: Vec<usize>,
}

/// Top-level body element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InspectedBlock {
    Paragraph(InspectedParagraph),
    Table(InspectedTable),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InspectedPackage {
    pub blocks: Vec<InspectedBlock>,
    /// Numbering instance ids declared in the numbering part.
    pub numbering_ids: Vec<u32>,
    /// Media part names, e.g. `word/media/image1.png`.
    pub media: Vec<String>,
}

impl InspectedPackage {
    /// Top-level paragraphs in body order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &InspectedParagraph> {
        self.blocks.iter().filter_map(|block| match block {
            InspectedBlock::Paragraph(paragraph) => Some(paragraph),
            InspectedBlock::Table(_) => None,
        })
    }

    pub fn tables(&self) -> impl Iterator<Item = &InspectedTable> {
        self.blocks.iter().filter_map(|block| match block {
            InspectedBlock::Table(table) => Some(table),
            InspectedBlock::Paragraph(_) => None,
        })
    }
}

/// Read the body, numbering ids, and media list from package bytes.
#[instrument(skip_all, fields(bytes = bytes.len()))]
pub fn inspect_package(bytes: &[u8]) -> Result<InspectedPackage> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| FolioError::Package(format!("not a zip package: {e}")))?;

    let document = read_part(&mut archive, "word/document.xml")?.ok_or_else(|| {
        FolioError::Package("package has no word/document.xml part".into())
    })?;
    let blocks = walk_body(&document)?;

    let numbering_ids = match read_part(&mut archive, "word/numbering.xml")? {
        Some(numbering) => numbering_ids(&numbering)?,
        None => Vec::new(),
    };

    let media = archive
        .file_names()
        .filter(|name| name.starts_with("word/media/"))
        .map(str::to_owned)
        .collect();

    debug!(blocks = blocks.len(), lists = numbering_ids.len(), "Package inspected");
    Ok(InspectedPackage {
        blocks,
        numbering_ids,
        media,
    })
}

fn read_part(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> Result<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(FolioError::Package(format!("failed to open {name}: {e}"))),
    };
    let mut xml = String::new();
    file.read_to_string(&mut xml)
        .map_err(|e| FolioError::Package(format!("failed to read {name}: {e}")))?;
    Ok(Some(xml))
}

// -- XML helpers --------------------------------------------------------------

fn xml_err(e: quick_xml::Error) -> FolioError {
    FolioError::Package(format!("malformed package XML: {e}"))
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

/// Whether a toggle element such as `<w:b w:val="0"/>` switches formatting off.
fn toggle_off(e: &BytesStart<'_>) -> bool {
    matches!(attr(e, b"w:val").as_deref(), Some("0" | "false" | "none"))
}

fn numbering_ids(xml: &str) -> Result<Vec<u32>> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut ids = Vec::new();
    loop {
        match reader.read_event_into(&mut buf).map_err(xml_err)? {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"w:num" => {
                if let Some(id) = attr(&e, b"w:numId").and_then(|v| v.parse().ok()) {
                    ids.push(id);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(ids)
}

// -- Body walk ----------------------------------------------------------------

#[derive(Default)]
struct BodyWalker {
    blocks: Vec<InspectedBlock>,
    /// Nesting depth of `w:tbl`; paragraphs inside tables are not collected.
    table_depth: usize,
    table: Option<InspectedTable>,
    paragraph: Option<InspectedParagraph>,
    run: Option<InspectedRun>,
    in_text: bool,
}

impl BodyWalker {
    fn start(&mut self, e: &BytesStart<'_>, empty: bool) {
        match e.name().as_ref() {
            b"w:tbl" if !empty => {
                if self.table_depth == 0 {
                    self.table = Some(InspectedTable::default());
                }
                self.table_depth += 1;
            }
            b"w:tr" if self.table_depth == 1 => {
                if let Some(table) = &mut self.table {
                    table.rows.push(0);
                }
            }
            b"w:tc" if self.table_depth == 1 => {
                if let Some(count) = self.table.as_mut().and_then(|t| t.rows.last_mut()) {
                    *count += 1;
                }
            }
            b"w:p" if self.table_depth == 0 => {
                if empty {
                    self.blocks
                        .push(InspectedBlock::Paragraph(InspectedParagraph::default()));
                } else {
                    self.paragraph = Some(InspectedParagraph::default());
                }
            }
            b"w:pStyle" => {
                if let Some(p) = &mut self.paragraph {
                    p.style = attr(e, b"w:val");
                }
            }
            b"w:numId" => {
                if let Some(p) = &mut self.paragraph {
                    p.num_id = attr(e, b"w:val").and_then(|v| v.parse().ok());
                }
            }
            b"w:ilvl" => {
                if let Some(p) = &mut self.paragraph {
                    p.level = attr(e, b"w:val").and_then(|v| v.parse().ok());
                }
            }
            b"w:r" if !empty && self.paragraph.is_some() => {
                self.run = Some(InspectedRun::default());
            }
            b"w:b" => self.toggle(|run| &mut run.bold, e),
            b"w:i" => self.toggle(|run| &mut run.italic, e),
            b"w:u" => self.toggle(|run| &mut run.underline, e),
            b"w:strike" => self.toggle(|run| &mut run.strike, e),
            b"w:t" if !empty => self.in_text = true,
            b"w:br" => {
                if let Some(run) = &mut self.run {
                    run.text.push('\n');
                }
            }
            _ => {}
        }
    }

    fn toggle(&mut self, field: impl FnOnce(&mut InspectedRun) -> &mut bool, e: &BytesStart<'_>) {
        if let Some(run) = &mut self.run {
            *field(run) = !toggle_off(e);
        }
    }

    fn end(&mut self, name: &[u8]) {
        match name {
            b"w:tbl" => {
                self.table_depth = self.table_depth.saturating_sub(1);
                if self.table_depth == 0 {
                    if let Some(table) = self.table.take() {
                        self.blocks.push(InspectedBlock::Table(table));
                    }
                }
            }
            b"w:p" => {
                if let Some(paragraph) = self.paragraph.take() {
                    self.blocks.push(InspectedBlock::Paragraph(paragraph));
                }
            }
            b"w:r" => {
                if let (Some(run), Some(paragraph)) = (self.run.take(), &mut self.paragraph) {
                    paragraph.runs.push(run);
                }
            }
            b"w:t" => self.in_text = false,
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if !self.in_text {
            return;
        }
        if let Some(run) = &mut self.run {
            run.text.push_str(text);
        }
    }
}

fn walk_body(xml: &str) -> Result<Vec<InspectedBlock>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);
    let mut buf = Vec::new();
    let mut walker = BodyWalker::default();

    loop {
        match reader.read_event_into(&mut buf).map_err(xml_err)? {
            Event::Start(e) => walker.start(&e, false),
            Event::Empty(e) => walker.start(&e, true),
            Event::End(e) => walker.end(e.name().as_ref()),
            Event::Text(t) => {
                let text = t.unescape().map_err(xml_err)?;
                walker.text(&text);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(walker.blocks)
}
