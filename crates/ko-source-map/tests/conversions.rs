/*
 * conversions.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Round-trip properties of the public conversion functions.
 */

use ko_source_map::{
    position_from_line_column, position_from_offset, range_from_offsets, LineIndex,
    LocationError, Newline, Position,
};
use pretty_assertions::assert_eq;

const TEMPLATE: &str = "<ul data-bind=\"foreach: items\">\r\n  <li>\r\n    <!-- ko text: name --><!-- /ko -->\r\n  </li>\r\n</ul>";

#[test]
fn test_every_offset_round_trips() {
    for offset in 0..=TEMPLATE.len() {
        let position = position_from_offset(offset, TEMPLATE).unwrap();
        assert_eq!(position.offset, offset);

        let rebuilt = position_from_line_column(position.line, position.column, TEMPLATE).unwrap();
        assert_eq!(rebuilt, position);
    }
}

#[test]
fn test_index_matches_free_functions() {
    let index = LineIndex::new(TEMPLATE);
    assert_eq!(index.newline(), Some(Newline::CrLf));
    assert_eq!(index.line_count(), 5);

    for offset in [0, 31, 33, 40, 83, 93, TEMPLATE.len()] {
        assert_eq!(
            index.position_at(offset).unwrap(),
            position_from_offset(offset, TEMPLATE).unwrap()
        );
    }
}

#[test]
fn test_lines_start_after_crlf() {
    // "  <li>" starts right after the first "\r\n"
    let li = TEMPLATE.find("  <li>").unwrap();
    assert_eq!(position_from_offset(li, TEMPLATE).unwrap(), Position::new(1, 0, li));

    let ul_close = TEMPLATE.rfind("</ul>").unwrap();
    let position = position_from_offset(ul_close, TEMPLATE).unwrap();
    assert_eq!((position.line, position.column), (4, 0));
}

#[test]
fn test_range_from_offsets_spans_lines() {
    let start = TEMPLATE.find("<li>").unwrap();
    let end = TEMPLATE.find("</li>").unwrap() + "</li>".len();
    let range = range_from_offsets(start, end, TEMPLATE).unwrap();

    assert_eq!(range.start.line, 1);
    assert_eq!(range.end.line, 3);
    assert_eq!(&TEMPLATE[range.start.offset..range.end.offset][..4], "<li>");
}

#[test]
fn test_out_of_bounds_is_an_error() {
    let length = TEMPLATE.len();
    assert_eq!(
        position_from_offset(length + 1, TEMPLATE),
        Err(LocationError::OffsetOutOfBounds {
            offset: (length + 1) as isize,
            length
        })
    );
    assert!(matches!(
        position_from_line_column(9, 0, TEMPLATE),
        Err(LocationError::LineOutOfBounds { line: 9, .. })
    ));
}
