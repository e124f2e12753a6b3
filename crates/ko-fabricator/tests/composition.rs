/*
 * composition.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Building chunks out of other chunks and querying the result.
 */

use ko_fabricator::{Chunk, Lookup, MappingSpec, Side};
use ko_source_map::Span;
use pretty_assertions::assert_eq;

fn offsets(range: ko_source_map::Range) -> (usize, usize) {
    (range.start.offset, range.end.offset)
}

#[test]
fn test_insert_before_open_mapping() {
    let mut chunk = Chunk::new();
    chunk.append("Hi ");
    let id = chunk.open_mapping(MappingSpec::mirror(Span::empty(0)));
    chunk.append("World");
    chunk.insert(3, "Beautiful ");
    chunk.close_mapping(id);

    let snapshot = chunk.snapshot("");
    assert_eq!(snapshot.generated(), "Hi Beautiful World");

    let mapping = &snapshot.mappings()[0];
    assert_eq!(offsets(mapping.generated), (13, 18));
    assert_eq!(offsets(mapping.original), (0, 0));
    assert!(mapping.bidirectional);
}

#[test]
fn test_snapshot_closes_open_mappings() {
    let mut chunk = Chunk::with_mapping(MappingSpec::new(0..4).named("root"));
    chunk.append("text");

    let snapshot = chunk.snapshot("root");
    let mapping = &snapshot.mappings()[0];
    assert_eq!(offsets(mapping.generated), (0, 4));
    assert_eq!(mapping.name.as_deref(), Some("root"));

    // The chunk keeps going after a snapshot
    chunk.append("!");
    assert_eq!(offsets(chunk.snapshot("root").mappings()[0].generated), (0, 5));
}

#[test]
fn test_marker_inside_added_chunk() {
    let mut sub = Chunk::new();
    sub.append("ab").marker("inside").append("cd");

    let mut chunk = Chunk::new();
    chunk.append("prefix: ");
    let k = chunk.len();
    chunk.add(&sub);

    assert_eq!(chunk.marker_offset("inside"), Some(k + 2));

    let snapshot = chunk.snapshot("");
    let marker = snapshot.marker("inside").unwrap();
    assert_eq!(marker.position.offset, k + 2);
    assert_eq!(marker.side, Side::Generated);
}

#[test]
fn test_nested_additions_keep_offsets() {
    let mut leaf = Chunk::new();
    leaf.append_mapped("name", MappingSpec::mirror(9..13));

    let mut middle = Chunk::new();
    middle.append("(").add(&leaf).append(")");

    let mut root = Chunk::new();
    root.append("print").add(&middle).append(";");

    let original = "<p>text: name</p>";
    let snapshot = root.snapshot(original);
    assert_eq!(snapshot.generated(), "print(name);");

    let mapping = &snapshot.mappings()[0];
    assert_eq!(offsets(mapping.generated), (6, 10));

    let position = snapshot.generated_position(8).unwrap();
    assert_eq!(snapshot.mirror(Lookup::Generated(position)).unwrap().offset, 11);
}

#[test]
fn test_add_all_and_forks() {
    let mut item = Chunk::new();
    item.append_mapped("item", MappingSpec::new(0..4));

    let mut first = item.clone();
    first.append(",");
    let mut second = item.clone();
    second.insert(0, "...");

    let mut list = Chunk::new();
    list.append("[").add_all([&first, &second]).append("]");

    assert_eq!(list.text(), "[item,...item]");
    let snapshot = list.snapshot("item");
    let generated: Vec<(usize, usize)> = snapshot
        .mappings()
        .iter()
        .map(|mapping| offsets(mapping.generated))
        .collect();
    assert_eq!(generated, vec![(1, 5), (9, 13)]);
}

#[test]
fn test_blame_through_generated_block() {
    let original = "<!-- ko if: visible -->\n<b>hi</b>\n<!-- /ko -->";
    let condition = original.find("visible").unwrap();
    let block_end = original.len();

    let mut chunk = Chunk::new();
    chunk.map(MappingSpec::new(0..block_end), |chunk| {
        chunk
            .append("if (")
            .append_mapped("visible", MappingSpec::mirror(condition..condition + 7))
            .append(") {")
            .indent(1)
            .append("\nrender();")
            .dedent(1)
            .append("\n}");
    });

    let snapshot = chunk.snapshot(original);
    insta::assert_snapshot!(snapshot.generated(), @r"
    if (visible) {
      render();
    }
    ");

    // Inside the condition, the condition itself is the smallest region
    let position = snapshot.generated_position(6).unwrap();
    let range = snapshot.blame(Lookup::Generated(position)).unwrap();
    assert_eq!(offsets(range), (condition, condition + 7));

    // Elsewhere, the whole block is blamed
    let position = snapshot.generated_position(18).unwrap();
    let range = snapshot.blame(Lookup::Generated(position)).unwrap();
    assert_eq!(offsets(range), (0, block_end));
    assert_eq!(range.end.line, 2);

    // And only the condition mirrors
    let position = snapshot.original_position(condition + 3).unwrap();
    let mirrored = snapshot.mirror(Lookup::Original(position)).unwrap();
    assert_eq!(mirrored.offset, 7);
    let position = snapshot.original_position(30).unwrap();
    assert_eq!(snapshot.mirror(Lookup::Original(position)), None);
}

#[test]
fn test_snapshot_serializes_texts_and_mappings() {
    let mut chunk = Chunk::new();
    chunk.append_mapped("x", MappingSpec::mirror(1..2)).marker("end");

    let snapshot = chunk.snapshot("(x)");
    let json = serde_json::to_value(&snapshot).unwrap();

    assert_eq!(json["original"], "(x)");
    assert_eq!(json["generated"], "x");
    assert_eq!(json["mappings"][0]["original"]["start"]["offset"], 1);
    assert_eq!(json["mappings"][0]["bidirectional"], true);
    assert_eq!(json["markers"][0]["id"], "end");
    assert_eq!(json["markers"][0]["side"], "Generated");
    assert!(json.get("original_index").is_none());
}

#[test]
fn test_mixed_edits_keep_mappings_in_order() {
    let mut chunk = Chunk::new();
    for (idx, word) in ["alpha", "beta", "gamma", "delta"].into_iter().enumerate() {
        chunk.append_mapped(word, MappingSpec::new(idx..idx + 1)).append(" ");
    }
    chunk
        .insert(6, "big ")
        .update(0, 5, "a")
        .remove(11, 17)
        .append_mapped("omega", MappingSpec::new(4..5))
        .insert(0, ">");

    let snapshot = chunk.snapshot("abcde");
    assert_eq!(snapshot.generated(), ">a big beta delta omega");

    let generated: Vec<(usize, usize)> = snapshot
        .mappings()
        .iter()
        .map(|mapping| offsets(mapping.generated))
        .collect();
    assert_eq!(generated, vec![(1, 2), (7, 11), (12, 12), (12, 17), (18, 23)]);
    assert!(generated.windows(2).all(|pair| pair[0].1 <= pair[1].0));

    let texts: Vec<&str> = generated
        .iter()
        .map(|&(start, end)| &snapshot.generated()[start..end])
        .collect();
    assert_eq!(texts, vec!["a", "beta", "", "delta", "omega"]);
}
