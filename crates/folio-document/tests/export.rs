// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end export tests: document tree in, package bytes out, read back
// with the package inspector.

mod common;

use std::collections::HashSet;

use chrono::{TimeZone, Utc};
use folio_core::{DocumentNode, ExportConfig, Mark, NodeKind};
use folio_document::docx::{
    BlockSerializer, InspectedBlock, InspectedPackage, PackageAssembler, collect_numberings,
    export_docx, inspect_package,
};

fn node(kind: NodeKind, children: Vec<DocumentNode>) -> DocumentNode {
    DocumentNode::new(kind).with_content(children)
}

fn para(text: &str) -> DocumentNode {
    node(NodeKind::Paragraph, vec![DocumentNode::text(text)])
}

fn item(children: Vec<DocumentNode>) -> DocumentNode {
    node(NodeKind::ListItem, children)
}

fn export(root: &DocumentNode) -> InspectedPackage {
    let bytes = export_docx(root, &ExportConfig::default()).unwrap();
    inspect_package(&bytes).unwrap()
}

/// Bold+italic "Hello" survives export and read-back with both toggles.
#[test]
fn bold_italic_hello_round_trips() {
    let root = node(
        NodeKind::Doc,
        vec![node(
            NodeKind::Paragraph,
            vec![
                DocumentNode::text("Hello")
                    .with_mark(Mark::bold())
                    .with_mark(Mark::italic()),
            ],
        )],
    );

    let package = export(&root);
    let paragraph = package.paragraphs().next().unwrap();
    assert_eq!(paragraph.text(), "Hello");
    assert!(paragraph.runs[0].bold);
    assert!(paragraph.runs[0].italic);
}

/// N list nodes yield N distinct definitions, and every list paragraph
/// points at one of them.
#[test]
fn every_list_node_has_its_own_numbering() {
    let root = node(
        NodeKind::Doc,
        vec![
            node(
                NodeKind::BulletList,
                vec![item(vec![
                    para("a"),
                    node(
                        NodeKind::OrderedList,
                        vec![item(vec![para("a.1")]), item(vec![para("a.2")])],
                    ),
                ])],
            ),
            para("between"),
            node(NodeKind::BulletList, vec![item(vec![para("b")])]),
            node(NodeKind::OrderedList, vec![item(vec![para("c")])]),
        ],
    );

    let package = export(&root);
    assert_eq!(package.numbering_ids, [1, 2, 3, 4]);
    assert_eq!(collect_numberings(&root).len(), 4);

    let declared: HashSet<u32> = package.numbering_ids.iter().copied().collect();
    let referenced: Vec<u32> = package.paragraphs().filter_map(|p| p.num_id).collect();
    assert_eq!(referenced, [1, 2, 2, 3, 4]);
    assert!(referenced.iter().all(|id| declared.contains(id)));
}

/// Serialiser and collector agree on definitions for the same tree.
#[test]
fn serializer_numbering_matches_collector() {
    let json = r#"{"type":"doc","content":[
        {"type":"orderedList","content":[
            {"type":"listItem","content":[
                {"type":"paragraph","content":[{"type":"text","text":"one"}]},
                {"type":"bulletList","content":[
                    {"type":"listItem","content":[{"type":"paragraph","content":[{"type":"text","text":"nested"}]}]}
                ]}
            ]}
        ]},
        {"type":"table","content":[{"type":"tableRow","content":[
            {"type":"tableCell","content":[{"type":"bulletList","content":[
                {"type":"listItem","content":[{"type":"paragraph"}]}
            ]}]}
        ]}]}
    ]}"#;
    let root = DocumentNode::from_json_str(json).unwrap();
    let config = ExportConfig::default();

    let serialized = BlockSerializer::new(&config).serialize(&root);
    assert_eq!(serialized.numbering, collect_numberings(&root));
    assert_eq!(serialized.numbering.len(), 3);
}

/// A 3×4 table reads back as three rows of four cells.
#[test]
fn table_keeps_rows_and_columns() {
    let row = || {
        node(
            NodeKind::TableRow,
            (0..4)
                .map(|c| node(NodeKind::TableCell, vec![para(&format!("cell {c}"))]))
                .collect(),
        )
    };
    let root = node(NodeKind::Table, vec![row(), row(), row()]);

    let package = export(&root);
    let table = package.tables().next().unwrap();
    assert_eq!(table.rows, [4, 4, 4]);
}

/// "a\n\nb" in a code block gives three paragraphs, the middle one empty.
#[test]
fn code_block_blank_line_is_its_own_paragraph() {
    let root = node(NodeKind::CodeBlock, vec![DocumentNode::text("a\n\nb")]);
    let package = export(&root);
    let texts: Vec<String> = package.paragraphs().map(|p| p.text()).collect();
    assert_eq!(texts, ["a", "", "b"]);
}

/// Four nested bullet lists export without error; the deepest writes level 2.
#[test]
fn four_level_nesting_clamps_to_level_two() {
    let mut list = node(NodeKind::BulletList, vec![item(vec![para("4")])]);
    for label in ["3", "2", "1"] {
        list = node(NodeKind::BulletList, vec![item(vec![para(label), list])]);
    }

    let package = export(&list);
    let levels: Vec<Option<u8>> = package.paragraphs().map(|p| p.level).collect();
    assert_eq!(levels, [Some(0), Some(1), Some(2), Some(2)]);
    assert_eq!(package.numbering_ids.len(), 4);
}

/// Headings, links, images, rules, and quotes from editor JSON.
#[test]
fn editor_json_document_exports() {
    let json = format!(
        r#"{{"type":"doc","content":[
            {{"type":"heading","attrs":{{"level":2}},"content":[{{"type":"text","text":"Minutes"}}]}},
            {{"type":"paragraph","content":[
                {{"type":"text","text":"see "}},
                {{"type":"text","text":"the site","marks":[{{"type":"link","attrs":{{"href":"https://example.com"}}}}]}}
            ]}},
            {{"type":"horizontalRule"}},
            {{"type":"blockquote","content":[{{"type":"paragraph","content":[{{"type":"text","text":"quoted"}}]}}]}},
            {{"type":"paragraph","content":[{{"type":"image","attrs":{{"src":"{}","width":64}}}}]}},
            {{"type":"callout","content":[{{"type":"paragraph","content":[{{"type":"text","text":"promoted"}}]}}]}}
        ]}}"#,
        common::png_data_url(8, 8)
    );
    let root = DocumentNode::from_json_str(&json).unwrap();
    let package = export(&root);

    let paragraphs: Vec<_> = package.paragraphs().collect();
    assert_eq!(paragraphs[0].style.as_deref(), Some("Heading2"));
    assert_eq!(paragraphs[1].text(), "see the site");
    assert_eq!(paragraphs[3].text(), "quoted");
    assert_eq!(paragraphs[5].text(), "promoted");
    assert_eq!(package.media, ["word/media/image1.png"]);
    assert!(
        package
            .blocks
            .iter()
            .all(|b| matches!(b, InspectedBlock::Paragraph(_)))
    );
}

/// Concurrent exports of the same tree produce identical packages.
#[test]
fn concurrent_exports_do_not_share_counters() {
    let root = node(
        NodeKind::Doc,
        vec![
            node(NodeKind::BulletList, vec![item(vec![para("x")])]),
            node(NodeKind::OrderedList, vec![item(vec![para("y")])]),
        ],
    );
    let config = ExportConfig::default();
    let stamp = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();

    let outputs: Vec<Vec<u8>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    let document = BlockSerializer::new(&config).serialize(&root);
                    PackageAssembler::new(&config)
                        .with_timestamp(stamp)
                        .assemble(&document)
                        .unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for output in &outputs[1..] {
        assert_eq!(output, &outputs[0]);
    }
    assert_eq!(inspect_package(&outputs[0]).unwrap().numbering_ids, [1, 2]);
}

/// The inspection summary serialises as tagged JSON.
#[test]
fn inspection_serialises_to_json() {
    let package = export(&para("json"));
    let value = serde_json::to_value(&package).unwrap();
    assert_eq!(value["blocks"][0]["kind"], "paragraph");
    assert_eq!(value["blocks"][0]["runs"][0]["text"], "json");
}
