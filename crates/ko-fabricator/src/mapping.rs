/*
 * mapping.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Mapping types shared by [`crate::Chunk`] and [`crate::Snapshot`]

use ko_source_map::{Range, Span};
use serde::{Deserialize, Serialize};

/// What a generated region corresponds to in the original text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingSpec {
    /// Byte span in the original text
    pub original: Span,
    /// Whether positions inside the region translate 1:1 in both directions
    pub bidirectional: bool,
    /// Optional label, carried through to the snapshot
    pub name: Option<String>,
}

impl MappingSpec {
    pub fn new(original: impl Into<Span>) -> Self {
        MappingSpec {
            original: original.into(),
            bidirectional: false,
            name: None,
        }
    }

    /// A bidirectional mapping, for text copied verbatim from the original
    pub fn mirror(original: impl Into<Span>) -> Self {
        MappingSpec {
            bidirectional: true,
            ..MappingSpec::new(original)
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Handle to a mapping recorded in a [`crate::Chunk`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MappingId(pub(crate) usize);

/// Generated side of a mapping while the chunk is still being written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MappingState {
    /// Generated text from `start` onwards belongs to the mapping
    Open { start: usize },
    Closed(Span),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OffsetMapping {
    pub spec: MappingSpec,
    pub state: MappingState,
}

impl OffsetMapping {
    /// Generated span, with open mappings running to `end`
    pub fn generated(&self, end: usize) -> Span {
        match self.state {
            MappingState::Open { start } => Span::new(start, end.max(start)),
            MappingState::Closed(span) => span,
        }
    }

    pub fn close(&mut self, end: usize) {
        if let MappingState::Open { start } = self.state {
            self.state = MappingState::Closed(Span::new(start, end.max(start)));
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, MappingState::Open { .. })
    }
}

/// A resolved correspondence between original and generated text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    pub original: Range,
    pub generated: Range,
    pub bidirectional: bool,
    pub name: Option<String>,
}

/// Which text a position or range refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Original,
    Generated,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Original => Side::Generated,
            Side::Generated => Side::Original,
        }
    }
}

impl Mapping {
    pub fn range(&self, side: Side) -> &Range {
        match side {
            Side::Original => &self.original,
            Side::Generated => &self.generated,
        }
    }
}

/// A named position recorded while generating
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub id: String,
    pub position: ko_source_map::Position,
    /// The text `position` refers to
    pub side: Side,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_builders() {
        let spec = MappingSpec::mirror(2..5).named("binding");
        assert_eq!(spec.original, Span::new(2, 5));
        assert!(spec.bidirectional);
        assert_eq!(spec.name.as_deref(), Some("binding"));

        assert!(!MappingSpec::new(0..0).bidirectional);
    }

    #[test]
    fn test_open_mapping_resolves_and_closes() {
        let mut mapping = OffsetMapping {
            spec: MappingSpec::new(0..1),
            state: MappingState::Open { start: 3 },
        };
        assert!(mapping.is_open());
        assert_eq!(mapping.generated(10), Span::new(3, 10));

        mapping.close(7);
        assert!(!mapping.is_open());
        assert_eq!(mapping.generated(10), Span::new(3, 7));

        // Closing twice keeps the first end
        mapping.close(9);
        assert_eq!(mapping.generated(10), Span::new(3, 7));
    }
}
