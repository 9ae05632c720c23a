// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// List numbering — one numbering definition per list node, allocated from a
// counter owned by a single export call.

use std::fmt;

use folio_core::{DocumentNode, ExportConfig, NodeKind};

/// Deepest level that carries its own template. Deeper list paragraphs reuse
/// this level's glyph and indent.
pub const MAX_TEMPLATE_LEVEL: u8 = 2;

const BULLET_GLYPHS: [&str; 3] = ["\u{2022}", "\u{25E6}", "\u{25AA}"];

/// Identifier of a numbering definition, unique within one export.
///
/// Ids start at 1 and are handed out in allocation order; the package
/// writer uses the value directly as the numbering instance id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NumberingId(u32);

impl NumberingId {
    pub fn get(self) -> u32 {
        self.0
    }

    /// Zero-based id of the abstract definition backing this instance.
    pub fn abstract_id(self) -> u32 {
        self.0 - 1
    }
}

/// Whether a list is bulleted or numbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bullet,
    Ordered,
}

impl ListKind {
    pub fn from_node_kind(kind: &NodeKind) -> Option<Self> {
        match kind {
            NodeKind::BulletList => Some(Self::Bullet),
            NodeKind::OrderedList => Some(Self::Ordered),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelFormat {
    Decimal,
    Bullet,
}

impl LevelFormat {
    pub fn num_fmt(&self) -> &'static str {
        match self {
            Self::Decimal => "decimal",
            Self::Bullet => "bullet",
        }
    }
}

/// Glyph and indentation of one nesting level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelTemplate {
    pub level: u8,
    pub format: LevelFormat,
    /// Level text, e.g. `%2.` or a bullet glyph.
    pub text: String,
    /// Left indent in twips.
    pub indent_left: u32,
    /// Hanging indent in twips.
    pub hanging: u32,
}

/// One logical list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberingDefinition {
    pub id: NumberingId,
    pub kind: ListKind,
}

impl NumberingDefinition {
    /// Human-readable reference such as `bullet-3`.
    pub fn reference(&self) -> String {
        self.to_string()
    }

    /// Template for `level`. Levels past [`MAX_TEMPLATE_LEVEL`] get exactly
    /// the deepest template.
    pub fn level(&self, level: u8, config: &ExportConfig) -> LevelTemplate {
        let level = level.min(MAX_TEMPLATE_LEVEL);
        let (format, text) = match self.kind {
            ListKind::Ordered => (LevelFormat::Decimal, format!("%{}.", level + 1)),
            ListKind::Bullet => (
                LevelFormat::Bullet,
                BULLET_GLYPHS[usize::from(level)].to_owned(),
            ),
        };
        LevelTemplate {
            level,
            format,
            text,
            indent_left: config.list_indent_step * (u32::from(level) + 1),
            hanging: config.list_hanging_indent,
        }
    }

    /// Every template the definition declares, levels 0 through
    /// [`MAX_TEMPLATE_LEVEL`].
    pub fn levels(&self, config: &ExportConfig) -> Vec<LevelTemplate> {
        (0..=MAX_TEMPLATE_LEVEL)
            .map(|level| self.level(level, config))
            .collect()
    }
}

impl fmt::Display for NumberingDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.kind {
            ListKind::Bullet => "bullet",
            ListKind::Ordered => "ordered",
        };
        write!(f, "{}-{}", prefix, self.id.0)
    }
}

/// Hands out numbering ids for one export call.
///
/// Each export owns its allocator, so concurrent exports never share a
/// counter.
#[derive(Debug, Default)]
pub struct NumberingAllocator {
    definitions: Vec<NumberingDefinition>,
}

impl NumberingAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new list and return its id.
    pub fn allocate(&mut self, kind: ListKind) -> NumberingId {
        let id = NumberingId(self.definitions.len() as u32 + 1);
        self.definitions.push(NumberingDefinition { id, kind });
        id
    }

    pub fn definitions(&self) -> &[NumberingDefinition] {
        &self.definitions
    }

    pub fn into_definitions(self) -> Vec<NumberingDefinition> {
        self.definitions
    }
}

/// Discover every list in `root`, depth-first in document order, and give
/// each its own numbering definition.
///
/// The walk visits block structure exactly as the block serialiser does, so
/// the returned definitions are the ones the serialiser allocates for the
/// same tree.
pub fn collect_numberings(root: &DocumentNode) -> Vec<NumberingDefinition> {
    let mut allocator = NumberingAllocator::new();
    walk_blocks(root, &mut allocator);
    allocator.into_definitions()
}

fn walk_blocks(node: &DocumentNode, allocator: &mut NumberingAllocator) {
    if let Some(kind) = ListKind::from_node_kind(&node.kind) {
        allocator.allocate(kind);
    }

    match &node.kind {
        // Inline containers and leaves: no block structure below.
        NodeKind::Paragraph | NodeKind::Heading | NodeKind::CodeBlock => {}
        _ if node.kind.is_leaf() => {}
        // Rows and cells are positional; only cell content is block content.
        NodeKind::Table => {
            for row in &node.content {
                for cell in &row.content {
                    for child in &cell.content {
                        walk_blocks(child, allocator);
                    }
                }
            }
        }
        _ => {
            for child in &node.content {
                walk_blocks(child, allocator);
            }
        }
    }
}
