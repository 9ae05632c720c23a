// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Block serialisation — paragraphs, headings, lists, quotes, code, rules and
// tables from the document tree become package blocks.

use std::slice;

use folio_core::{DocumentNode, ExportConfig, NodeKind};
use tracing::{debug, info, instrument};

use super::model::{
    Alignment, Block, Border, Inline, ListMembership, Paragraph, RunFormat, Table, TableCell,
    TableRow, TextRun,
};
use super::numbering::{
    LevelTemplate, ListKind, NumberingAllocator, NumberingDefinition, NumberingId,
};
use super::runs::InlineRunBuilder;

/// Result of serialising one document tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SerializedDocument {
    pub blocks: Vec<Block>,
    /// One definition per list node, in document order.
    pub numbering: Vec<NumberingDefinition>,
}

/// Converts a document tree into package blocks in a single traversal.
///
/// Numbering ids are allocated as lists are reached, so every list paragraph
/// refers to a definition that the same pass produced.
pub struct BlockSerializer<'a> {
    config: &'a ExportConfig,
    runs: InlineRunBuilder<'a>,
    numbering: NumberingAllocator,
}

impl<'a> BlockSerializer<'a> {
    pub fn new(config: &'a ExportConfig) -> Self {
        Self {
            config,
            runs: InlineRunBuilder::new(config),
            numbering: NumberingAllocator::new(),
        }
    }

    /// Serialise `root`, consuming the serialiser together with its counter.
    #[instrument(skip_all, fields(root = root.kind.tag()))]
    pub fn serialize(mut self, root: &DocumentNode) -> SerializedDocument {
        let blocks = self.convert_node(root);
        let numbering = self.numbering.into_definitions();

        info!(
            blocks = blocks.len(),
            lists = numbering.len(),
            "Document tree serialised"
        );

        SerializedDocument { blocks, numbering }
    }

    // -- Dispatch -------------------------------------------------------------

    fn convert_node(&mut self, node: &DocumentNode) -> Vec<Block> {
        match &node.kind {
            NodeKind::Paragraph => vec![Block::Paragraph(self.paragraph(node, None))],
            NodeKind::Heading => vec![Block::Paragraph(self.heading(node))],
            NodeKind::BulletList | NodeKind::OrderedList => self.list(node, 0),
            NodeKind::Blockquote => self.blockquote(node),
            NodeKind::CodeBlock => self.code_block(node),
            NodeKind::HorizontalRule => vec![Block::Paragraph(self.horizontal_rule())],
            NodeKind::Table => self.table(node),
            NodeKind::Text | NodeKind::Image | NodeKind::HardBreak => {
                // Stray inline content at block level gets a paragraph of its own.
                let inlines = self.runs.build(slice::from_ref(node));
                if inlines.is_empty() {
                    Vec::new()
                } else {
                    vec![Block::Paragraph(Paragraph::new(inlines))]
                }
            }
            NodeKind::Doc => self.flatten(node),
            other => {
                debug!(kind = other.tag(), "Flattening node into its children");
                self.flatten(node)
            }
        }
    }

    fn flatten(&mut self, node: &DocumentNode) -> Vec<Block> {
        let mut blocks = Vec::new();
        for child in &node.content {
            blocks.extend(self.convert_node(child));
        }
        blocks
    }

    // -- Paragraphs -----------------------------------------------------------

    fn paragraph(&self, node: &DocumentNode, list: Option<ListMembership>) -> Paragraph {
        Paragraph {
            alignment: Alignment::from_text_align(node.attr_str("textAlign")),
            list,
            ..Paragraph::new(self.inline_content(node))
        }
    }

    fn heading(&self, node: &DocumentNode) -> Paragraph {
        let level = node
            .attr_f64("level")
            .filter(|level| level.fract() == 0.0 && (1.0..=6.0).contains(level))
            .map_or(1, |level| level as u8);

        Paragraph {
            heading: Some(level),
            ..self.paragraph(node, None)
        }
    }

    /// Paragraph content; an empty paragraph still carries one empty run.
    fn inline_content(&self, node: &DocumentNode) -> Vec<Inline> {
        if node.content.is_empty() {
            vec![Inline::Text(TextRun::plain(""))]
        } else {
            self.runs.build(&node.content)
        }
    }

    // -- Lists ----------------------------------------------------------------

    fn list(&mut self, node: &DocumentNode, level: u8) -> Vec<Block> {
        let Some(kind) = ListKind::from_node_kind(&node.kind) else {
            return self.flatten(node);
        };
        let id = self.numbering.allocate(kind);
        debug!(id = id.get(), level, ?kind, "List numbering allocated");

        let mut blocks = Vec::new();
        for item in &node.content {
            if item.kind == NodeKind::ListItem {
                for child in &item.content {
                    self.list_item_child(child, id, level, &mut blocks);
                }
            } else {
                // Malformed list: treat the node itself as the item's content.
                self.list_item_child(item, id, level, &mut blocks);
            }
        }
        blocks
    }

    fn list_item_child(
        &mut self,
        child: &DocumentNode,
        id: NumberingId,
        level: u8,
        blocks: &mut Vec<Block>,
    ) {
        match &child.kind {
            NodeKind::Paragraph => {
                let membership = ListMembership { id, level };
                blocks.push(Block::Paragraph(self.paragraph(child, Some(membership))));
            }
            NodeKind::BulletList | NodeKind::OrderedList => {
                blocks.extend(self.list(child, level.saturating_add(1)));
            }
            _ => blocks.extend(self.convert_node(child)),
        }
    }

    // -- Quotes, code, rules --------------------------------------------------

    fn blockquote(&mut self, node: &DocumentNode) -> Vec<Block> {
        let mut blocks = Vec::new();
        for child in &node.content {
            for block in self.convert_node(child) {
                match block {
                    Block::Paragraph(mut paragraph) => {
                        // A direct indent replaces the numbering one, so list
                        // items restate their level's indent and hang first.
                        let template = self.list_template(paragraph.list);
                        let base = match (paragraph.indent_left, template) {
                            (Some(left), _) => left,
                            (None, Some(template)) => {
                                paragraph.indent_hanging = Some(template.hanging);
                                template.indent_left
                            }
                            (None, None) => 0,
                        };
                        paragraph.indent_left = Some(base + self.config.blockquote_indent);
                        paragraph.border_left = Some(Border {
                            size: self.config.blockquote_border_size,
                            color: self.config.blockquote_border_color.clone(),
                        });
                        blocks.push(Block::Paragraph(paragraph));
                    }
                    table => blocks.push(table),
                }
            }
        }
        blocks
    }

    fn list_template(&self, list: Option<ListMembership>) -> Option<LevelTemplate> {
        let list = list?;
        self.numbering
            .definitions()
            .iter()
            .find(|def| def.id == list.id)
            .map(|def| def.level(list.level, self.config))
    }

    /// One monospace paragraph per line; blank lines stay as empty paragraphs.
    fn code_block(&self, node: &DocumentNode) -> Vec<Block> {
        let text = node.text_content();
        let format = RunFormat {
            font: Some(self.config.monospace_font.clone()),
            size: Some(self.config.code_font_size),
            ..RunFormat::default()
        };

        text.split('\n')
            .map(|line| {
                Block::Paragraph(Paragraph {
                    line_spacing: Some(self.config.code_line_spacing),
                    ..Paragraph::new(vec![Inline::Text(TextRun {
                        text: line.strip_suffix('\r').unwrap_or(line).to_owned(),
                        format: format.clone(),
                    })])
                })
            })
            .collect()
    }

    fn horizontal_rule(&self) -> Paragraph {
        Paragraph {
            border_bottom: Some(Border {
                size: self.config.rule_border_size,
                color: self.config.rule_border_color.clone(),
            }),
            ..Paragraph::default()
        }
    }

    // -- Tables ---------------------------------------------------------------

    fn table(&mut self, node: &DocumentNode) -> Vec<Block> {
        if node.content.is_empty() {
            debug!("Skipping table without rows");
            return Vec::new();
        }

        let mut rows = Vec::with_capacity(node.content.len());
        for row in &node.content {
            let width_pct = 100.0 / row.content.len().max(1) as f64;
            let mut cells = Vec::with_capacity(row.content.len());
            for cell in &row.content {
                let mut blocks = Vec::new();
                for child in &cell.content {
                    blocks.extend(self.convert_node(child));
                }
                if blocks.is_empty() {
                    blocks.push(Block::Paragraph(Paragraph::new(vec![Inline::Text(
                        TextRun::plain(""),
                    )])));
                }
                cells.push(TableCell { width_pct, blocks });
            }
            rows.push(TableRow { cells });
        }

        vec![Block::Table(Table {
            width_pct: 100.0,
            rows,
        })]
    }
}
