/*
 * snapshot.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The closed, queryable result of a [`crate::Chunk`].

use crate::mapping::{Mapping, MappingSpec, Marker, Side};
use ko_source_map::{LineIndex, Position, Range, Span};
use serde::{Deserialize, Serialize};

/// A position or range, tagged with the text it refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lookup<T> {
    Original(T),
    Generated(T),
}

impl<T> Lookup<T> {
    pub fn side(&self) -> Side {
        match self {
            Lookup::Original(_) => Side::Original,
            Lookup::Generated(_) => Side::Generated,
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Lookup::Original(value) | Lookup::Generated(value) => value,
        }
    }
}

/// Immutable pairing of original and generated text with their mappings
///
/// Every mapping range and marker position is valid against the text it
/// refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    original: String,
    generated: String,
    mappings: Vec<Mapping>,
    markers: Vec<Marker>,
    #[serde(skip)]
    original_index: LineIndex,
    #[serde(skip)]
    generated_index: LineIndex,
}

/// Largest char boundary of `text` not after `offset`
fn floor_boundary(text: &str, offset: usize) -> usize {
    let mut offset = offset.min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

fn resolve(index: &LineIndex, text: &str, span: Span) -> Range {
    let start = floor_boundary(text, span.start);
    let end = floor_boundary(text, span.end).max(start);
    index.range_at(start, end).unwrap_or_default()
}

impl Snapshot {
    pub(crate) fn build(
        original: String,
        generated: String,
        mappings: Vec<(MappingSpec, Span)>,
        markers: Vec<(String, usize, Side)>,
    ) -> Self {
        let original_index = LineIndex::new(&original);
        let generated_index = LineIndex::new(&generated);

        let mappings: Vec<Mapping> = mappings
            .into_iter()
            .map(|(spec, generated_span)| {
                if spec.original.end > original.len() {
                    tracing::warn!(
                        start = spec.original.start,
                        end = spec.original.end,
                        length = original.len(),
                        "Mapping extends past the original text, clamping"
                    );
                }
                Mapping {
                    original: resolve(&original_index, &original, spec.original),
                    generated: resolve(&generated_index, &generated, generated_span),
                    bidirectional: spec.bidirectional,
                    name: spec.name,
                }
            })
            .collect();

        let markers: Vec<Marker> = markers
            .into_iter()
            .map(|(id, offset, side)| {
                let (index, text) = match side {
                    Side::Original => (&original_index, &original),
                    Side::Generated => (&generated_index, &generated),
                };
                let position = index
                    .position_at(floor_boundary(text, offset))
                    .unwrap_or_default();
                Marker { id, position, side }
            })
            .collect();

        tracing::debug!(
            original = original.len(),
            generated = generated.len(),
            mappings = mappings.len(),
            markers = markers.len(),
            "Closed chunk into snapshot"
        );

        Snapshot {
            original,
            generated,
            mappings,
            markers,
            original_index,
            generated_index,
        }
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn generated(&self) -> &str {
        &self.generated
    }

    pub fn mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn marker(&self, id: &str) -> Option<&Marker> {
        self.markers.iter().find(|marker| marker.id == id)
    }

    /// Position of a byte offset in the original text
    pub fn original_position(&self, offset: usize) -> Option<Position> {
        self.original_index.position_at(offset).ok()
    }

    /// Position of a byte offset in the generated text
    pub fn generated_position(&self, offset: usize) -> Option<Position> {
        self.generated_index.position_at(offset).ok()
    }

    fn index(&self, side: Side) -> &LineIndex {
        match side {
            Side::Original => &self.original_index,
            Side::Generated => &self.generated_index,
        }
    }

    /// Smallest mapping whose `side` range satisfies `contains`
    ///
    /// Ties go to the mapping recorded first.
    fn enclosing(
        &self,
        side: Side,
        bidirectional_only: bool,
        contains: impl Fn(&Range) -> bool,
    ) -> Option<&Mapping> {
        let mut best: Option<&Mapping> = None;
        for mapping in &self.mappings {
            if bidirectional_only && !mapping.bidirectional {
                continue;
            }
            let range = mapping.range(side);
            if !contains(range) {
                continue;
            }
            match best {
                Some(current) if current.range(side).size() <= range.size() => {}
                _ => best = Some(mapping),
            }
        }
        best
    }

    /// The range on the other side of the smallest mapping around a position
    ///
    /// Containment is inclusive of both ends. A miss is `None`, not an error.
    pub fn blame(&self, lookup: Lookup<Position>) -> Option<Range> {
        let side = lookup.side();
        let offset = lookup.value().offset;
        self.enclosing(side, false, |range| range.contains(offset))
            .map(|mapping| *mapping.range(side.opposite()))
    }

    /// The exact counterpart of a position inside a bidirectional mapping
    pub fn mirror(&self, lookup: Lookup<Position>) -> Option<Position> {
        let side = lookup.side();
        let offset = lookup.value().offset;
        let mapping = self.enclosing(side, true, |range| range.contains(offset))?;
        self.mirror_offset(mapping, side, offset)
    }

    /// The exact counterpart of a range inside one bidirectional mapping
    pub fn mirror_range(&self, lookup: Lookup<Range>) -> Option<Range> {
        let side = lookup.side();
        let query = *lookup.value();
        let mapping = self.enclosing(side, true, |range| range.contains_range(&query))?;
        let start = self.mirror_offset(mapping, side, query.start.offset)?;
        let end = self.mirror_offset(mapping, side, query.end.offset)?;
        Some(Range::new(start, end))
    }

    fn mirror_offset(&self, mapping: &Mapping, side: Side, offset: usize) -> Option<Position> {
        let source = mapping.range(side);
        let target = mapping.range(side.opposite());
        let delta = offset.checked_sub(source.start.offset)?;
        let mirrored = (target.start.offset + delta).min(target.end.offset);

        let text = match side.opposite() {
            Side::Original => &self.original,
            Side::Generated => &self.generated,
        };
        self.index(side.opposite())
            .position_at(floor_boundary(text, mirrored))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(mappings: Vec<(MappingSpec, Span)>) -> Snapshot {
        Snapshot::build(
            "0123456789abcdef".to_string(),
            "ABCDEFGHIJKLMNOP".to_string(),
            mappings,
            vec![],
        )
    }

    fn generated(snapshot: &Snapshot, offset: usize) -> Lookup<Position> {
        Lookup::Generated(snapshot.generated_position(offset).unwrap())
    }

    #[test]
    fn test_blame_prefers_smallest_enclosing() {
        let snapshot = snapshot(vec![
            (MappingSpec::new(0..10), Span::new(2, 8)),
            (MappingSpec::new(11..12), Span::new(4, 6)),
        ]);

        let range = snapshot.blame(generated(&snapshot, 5)).unwrap();
        assert_eq!((range.start.offset, range.end.offset), (11, 12));

        let range = snapshot.blame(generated(&snapshot, 3)).unwrap();
        assert_eq!((range.start.offset, range.end.offset), (0, 10));

        assert_eq!(snapshot.blame(generated(&snapshot, 12)), None);
    }

    #[test]
    fn test_blame_ties_go_to_first_mapping() {
        let snapshot = snapshot(vec![
            (MappingSpec::new(0..1), Span::new(4, 6)),
            (MappingSpec::new(8..9), Span::new(4, 6)),
        ]);

        let range = snapshot.blame(generated(&snapshot, 4)).unwrap();
        assert_eq!(range.start.offset, 0);
    }

    #[test]
    fn test_blame_from_original_side() {
        let snapshot = snapshot(vec![(MappingSpec::new(3..5), Span::new(10, 14))]);

        let position = snapshot.original_position(5).unwrap();
        let range = snapshot.blame(Lookup::Original(position)).unwrap();
        assert_eq!((range.start.offset, range.end.offset), (10, 14));
    }

    #[test]
    fn test_mirror_clamps_to_target_end() {
        let snapshot = snapshot(vec![(MappingSpec::mirror(4..6), Span::new(5, 7))]);

        let position = snapshot.mirror(generated(&snapshot, 6)).unwrap();
        assert_eq!(position.offset, 5);

        let range = Range::new(
            snapshot.generated_position(5).unwrap(),
            snapshot.generated_position(7).unwrap(),
        );
        let mirrored = snapshot.mirror_range(Lookup::Generated(range)).unwrap();
        assert_eq!((mirrored.start.offset, mirrored.end.offset), (4, 6));
    }

    #[test]
    fn test_mirror_clamps_longer_source() {
        let snapshot = snapshot(vec![(MappingSpec::mirror(4..5), Span::new(5, 9))]);

        let position = snapshot.mirror(generated(&snapshot, 8)).unwrap();
        assert_eq!(position.offset, 5);
    }

    #[test]
    fn test_mirror_ignores_one_way_mappings() {
        let snapshot = snapshot(vec![(MappingSpec::new(4..6), Span::new(5, 7))]);

        assert!(snapshot.blame(generated(&snapshot, 6)).is_some());
        assert_eq!(snapshot.mirror(generated(&snapshot, 6)), None);
    }

    #[test]
    fn test_mirror_range_requires_containment() {
        let snapshot = snapshot(vec![(MappingSpec::mirror(4..6), Span::new(5, 7))]);

        let range = Range::new(
            snapshot.generated_position(5).unwrap(),
            snapshot.generated_position(9).unwrap(),
        );
        assert_eq!(snapshot.mirror_range(Lookup::Generated(range)), None);
    }

    #[test]
    fn test_out_of_bounds_spans_are_clamped() {
        let snapshot = snapshot(vec![(MappingSpec::new(10..40), Span::new(0, 2))]);

        let mapping = &snapshot.mappings()[0];
        assert_eq!(mapping.original.start.offset, 10);
        assert_eq!(mapping.original.end.offset, 16);
    }

    #[test]
    fn test_markers_resolve_on_their_side() {
        let snapshot = Snapshot::build(
            "ab\ncd".to_string(),
            "x\ny\nz".to_string(),
            vec![],
            vec![
                ("generated".to_string(), 4, Side::Generated),
                ("original".to_string(), 4, Side::Original),
            ],
        );

        let marker = snapshot.marker("generated").unwrap();
        assert_eq!(marker.position, Position::new(2, 0, 4));
        let marker = snapshot.marker("original").unwrap();
        assert_eq!(marker.position, Position::new(1, 1, 4));
        assert!(snapshot.marker("missing").is_none());
    }
}
