use std::io::Cursor;

use docsmith::dom::{
    Alignment, DocumentTree, ParagraphNode, RunNode, TableCellNode, TableNode, TableRowNode,
    VMerge,
};
use docsmith::extract::{ContentBlock, extract_content};
use docsmith::io::{read_document_from, write_document_to};

fn roundtrip(tree: &DocumentTree) -> DocumentTree {
    let mut buffer = Cursor::new(Vec::new());
    write_document_to(tree, &mut buffer).expect("document writes to memory");
    buffer.set_position(0);
    read_document_from(buffer).expect("written document reads back")
}

#[test]
fn paragraph_content_survives_a_save_load_cycle() {
    let tree = DocumentTree::new()
        .add_paragraph(ParagraphNode::with_text("Title").style("Heading 1"))
        .add_paragraph(
            ParagraphNode::new()
                .align(Alignment::Center)
                .page_break_before(true)
                .add_run(RunNode {
                    text: "formatted".to_string(),
                    bold: true,
                    italic: true,
                    underline: true,
                    font: Some("Georgia".to_string()),
                    east_asia_font: Some("Georgia".to_string()),
                    size: Some(14.0),
                    color: Some("336699".to_string()),
                    ..RunNode::default()
                })
                .add_run(RunNode::text(" plain")),
        );

    let reloaded = roundtrip(&tree);
    let blocks = extract_content(&reloaded);

    assert!(matches!(
        &blocks[0],
        ContentBlock::Heading { level: 1, style: Some(style), .. } if style == "Heading 1"
    ));
    let ContentBlock::Paragraph { alignment, page_break_before, runs, .. } = &blocks[1] else {
        panic!("expected paragraph, got {:?}", blocks[1]);
    };
    assert_eq!(*alignment, Some(Alignment::Center));
    assert!(*page_break_before);
    assert_eq!(runs.len(), 2);
    assert!(runs[0].bold && runs[0].italic && runs[0].underline);
    assert_eq!(runs[0].font.as_deref(), Some("Georgia"));
    assert_eq!(runs[0].size, Some(14.0));
    assert_eq!(runs[0].color.as_deref(), Some("336699"));
    assert_eq!(runs[1].text, " plain");
}

#[test]
fn merge_descriptors_survive_a_save_load_cycle() {
    let table = TableNode::new(2)
        .add_row(TableRowNode::new(vec![
            TableCellNode::with_text("tall").v_merge(VMerge::Restart),
            TableCellNode::with_text("r0c1"),
        ]))
        .add_row(TableRowNode::new(vec![
            TableCellNode::new().v_merge(VMerge::Continue),
            TableCellNode::with_text("r1c1"),
        ]));
    let tree = DocumentTree::new().add_table(table);

    let reloaded = roundtrip(&tree);
    let blocks = extract_content(&reloaded);

    assert!(matches!(
        blocks[0],
        ContentBlock::TableMetadata { rows: 2, cols: 2, .. }
    ));
    let cells: Vec<_> = blocks
        .iter()
        .filter_map(|block| match block {
            ContentBlock::TableCell { row, col, row_span, col_span, text, .. } => {
                Some((*row, *col, *row_span, *col_span, text.clone()))
            }
            _ => None,
        })
        .collect();
    assert_eq!(cells.len(), 3, "the merged pair collapses to one block");
    assert!(cells.contains(&(0, 0, 2, 1, "tall".to_string())));
}

#[test]
fn extraction_is_stable_across_the_cycle() {
    let tree = DocumentTree::new()
        .add_paragraph(ParagraphNode::with_text("Heading here").style("Heading 2"))
        .add_paragraph(ParagraphNode::with_text("body text"))
        .add_table(
            TableNode::new(2)
                .add_row(TableRowNode::new(vec![
                    TableCellNode::with_text("a"),
                    TableCellNode::with_text("b"),
                ]))
                .add_row(TableRowNode::new(vec![
                    TableCellNode::with_text("c"),
                    TableCellNode::with_text("d"),
                ])),
        );

    let first = extract_content(&roundtrip(&tree));
    let second = extract_content(&roundtrip(&roundtrip(&tree)));
    assert_eq!(first, second, "save/load reaches a fixed point");
}
