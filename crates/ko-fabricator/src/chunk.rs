/*
 * chunk.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The generated-text builder.
//!
//! A [`Chunk`] accumulates generated text while recording which regions of it
//! correspond to regions of the original template. Edits other than appends
//! run through [`Edit`] so no recorded offset is left pointing at the wrong
//! text. Closing a chunk with [`Chunk::snapshot`] resolves everything against
//! the final texts.

use crate::mapping::{MappingId, MappingSpec, MappingState, OffsetMapping, Side};
use crate::snapshot::Snapshot;
use crate::translate::{Bias, Edit};
use ko_source_map::Span;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Formatting settings for a [`Chunk`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChunkOptions {
    /// Text repeated once per indentation level
    pub indent_unit: String,
    /// Line terminator written for every newline in appended text
    pub eol: String,
}

impl Default for ChunkOptions {
    fn default() -> Self {
        ChunkOptions {
            indent_unit: "  ".to_string(),
            eol: "\n".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MarkerEntry {
    offset: usize,
    side: Side,
}

/// Mutable builder for generated text with traceable provenance
///
/// `Clone` produces an independent deep copy: text, mappings, locators and
/// markers are all duplicated.
///
/// # Example
///
/// ```rust
/// use ko_fabricator::{Chunk, Lookup, MappingSpec};
///
/// let original = "<p data-bind=\"text: name\"></p>";
/// let mut chunk = Chunk::new();
/// chunk
///     .append("const value = ")
///     .append_mapped("name", MappingSpec::mirror(20..24))
///     .append(";");
///
/// let snapshot = chunk.snapshot(original);
/// assert_eq!(snapshot.generated(), "const value = name;");
///
/// let position = snapshot.generated_position(16).unwrap();
/// let mirrored = snapshot.mirror(Lookup::Generated(position)).unwrap();
/// assert_eq!(mirrored.offset, 22);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Chunk {
    text: String,
    indentation: usize,
    /// The buffer ends with a newline whose indentation is not written yet
    at_line_start: bool,
    /// Extra levels owed to that line by an added chunk that ended on it
    carried: usize,
    options: ChunkOptions,
    mappings: Vec<OffsetMapping>,
    locators: BTreeMap<String, Vec<Span>>,
    markers: BTreeMap<String, MarkerEntry>,
}

impl Chunk {
    pub fn new() -> Self {
        Chunk::default()
    }

    pub fn with_options(options: ChunkOptions) -> Self {
        Chunk {
            options,
            ..Chunk::default()
        }
    }

    /// A chunk whose whole content maps to `spec`
    ///
    /// The mapping stays open until it is closed explicitly, the chunk is
    /// added to another chunk, or the chunk is snapshotted.
    pub fn with_mapping(spec: MappingSpec) -> Self {
        let mut chunk = Chunk::new();
        chunk.open_mapping(spec);
        chunk
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn indentation(&self) -> usize {
        self.indentation
    }

    pub fn options(&self) -> &ChunkOptions {
        &self.options
    }

    // ------------------------------------------------------------------
    // Writing
    // ------------------------------------------------------------------

    /// Append `text`, indenting every line after the first to the current
    /// indentation level
    pub fn append(&mut self, text: &str) -> &mut Self {
        self.push_text(text);
        self
    }

    /// Append `text` and map exactly the appended text to `spec`
    pub fn append_mapped(&mut self, text: &str, spec: MappingSpec) -> &mut Self {
        let id = self.open_mapping(spec);
        self.push_text(text);
        self.close_mapping(id)
    }

    /// Start a mapping at the current end of the buffer
    pub fn open_mapping(&mut self, spec: MappingSpec) -> MappingId {
        let id = MappingId(self.mappings.len());
        self.mappings.push(OffsetMapping {
            spec,
            state: MappingState::Open {
                start: self.text.len(),
            },
        });
        id
    }

    /// End a mapping at the current end of the buffer
    ///
    /// Closing a mapping that is already closed has no effect.
    pub fn close_mapping(&mut self, id: MappingId) -> &mut Self {
        let end = self.text.len();
        if let Some(mapping) = self.mappings.get_mut(id.0) {
            mapping.close(end);
        }
        self
    }

    /// Map everything `write` appends to `spec`
    pub fn map(&mut self, spec: MappingSpec, write: impl FnOnce(&mut Chunk)) -> &mut Self {
        let id = self.open_mapping(spec);
        write(self);
        self.close_mapping(id)
    }

    pub fn indent(&mut self, levels: usize) -> &mut Self {
        self.indentation += levels;
        self
    }

    pub fn dedent(&mut self, levels: usize) -> &mut Self {
        self.indentation = self.indentation.saturating_sub(levels);
        self
    }

    fn indent_text(&self) -> String {
        self.options.indent_unit.repeat(self.indentation)
    }

    /// Write the indentation of the line the buffer ends on
    fn write_pending_indent(&mut self) {
        self.at_line_start = false;
        let levels = self.indentation + std::mem::take(&mut self.carried);
        let indent = self.options.indent_unit.repeat(levels);
        if !indent.is_empty() {
            let end = self.text.len();
            self.splice(end, end, &indent);
        }
    }

    fn push_text(&mut self, text: &str) {
        let mut pieces = text.split('\n').peekable();
        let mut first = true;

        while let Some(piece) = pieces.next() {
            if !first {
                let eol = self.options.eol.clone();
                self.text.push_str(&eol);
                self.at_line_start = true;
                self.carried = 0;
            }
            first = false;

            let piece = match pieces.peek() {
                Some(_) => piece.strip_suffix('\r').unwrap_or(piece),
                None => piece,
            };
            if piece.is_empty() {
                continue;
            }
            if self.at_line_start {
                self.write_pending_indent();
            }
            self.text.push_str(piece);
        }
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    /// Insert `text` at `offset` in the generated buffer
    ///
    /// Mappings, locators and markers after the insertion point move with the
    /// text. Ranges ending exactly at `offset` do not grow.
    pub fn insert(&mut self, offset: usize, text: &str) -> &mut Self {
        let offset = self.clamp(offset);
        self.text.insert_str(offset, text);
        self.translate(Edit::insertion(offset, text.len()));
        self
    }

    /// Replace the generated text between `start` and `end`
    ///
    /// Ranges covering the replaced text cover the replacement afterwards.
    pub fn update(&mut self, start: usize, end: usize, text: &str) -> &mut Self {
        let (start, end) = (self.clamp(start), self.clamp(end));
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        self.splice(start, end, text);
        self
    }

    pub fn remove(&mut self, start: usize, end: usize) -> &mut Self {
        self.update(start, end, "")
    }

    fn clamp(&self, offset: usize) -> usize {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        offset
    }

    fn splice(&mut self, start: usize, end: usize, text: &str) {
        self.text.replace_range(start..end, text);
        self.translate(Edit::replacement(start, end, text.len()));
    }

    fn translate(&mut self, edit: Edit) {
        if edit.is_noop() {
            return;
        }
        // An empty span on an insertion point stays inside a range ending there
        let empty = if edit.removed == 0 && self.range_ends_at(edit.at) {
            Bias::Before
        } else {
            Bias::After
        };

        for mapping in &mut self.mappings {
            mapping.state = match mapping.state {
                MappingState::Open { start } => MappingState::Open {
                    start: edit.apply(start, Bias::After),
                },
                MappingState::Closed(span) => MappingState::Closed(edit.apply_span(span, empty)),
            };
        }
        for spans in self.locators.values_mut() {
            for span in spans.iter_mut() {
                *span = edit.apply_span(*span, empty);
            }
        }
        for marker in self.markers.values_mut() {
            if marker.side == Side::Generated {
                marker.offset = edit.apply(marker.offset, Bias::After);
            }
        }
    }

    /// Whether a closed mapping or locator with content ends at `offset`
    fn range_ends_at(&self, offset: usize) -> bool {
        let closed = self.mappings.iter().filter_map(|mapping| match mapping.state {
            MappingState::Closed(span) => Some(span),
            MappingState::Open { .. } => None,
        });
        closed
            .chain(self.locators.values().flatten().copied())
            .any(|span| !span.is_empty() && span.end == offset)
    }

    // ------------------------------------------------------------------
    // Locators and markers
    // ------------------------------------------------------------------

    /// Record the generated span written by `write` under `name`
    pub fn locate(&mut self, name: &str, write: impl FnOnce(&mut Chunk)) -> &mut Self {
        let start = self.text.len();
        write(self);
        let span = Span::new(start, self.text.len());
        self.locators.entry(name.to_string()).or_default().push(span);
        self
    }

    /// Every span recorded under any of `names`, in buffer order
    pub fn occurrences(&self, names: &[&str]) -> Vec<Span> {
        let mut spans: Vec<Span> = names
            .iter()
            .filter_map(|name| self.locators.get(*name))
            .flatten()
            .copied()
            .collect();
        spans.sort();
        spans
    }

    /// Record the current end of the buffer under `name`
    ///
    /// The marker follows later edits. Recording a name twice keeps the last
    /// position.
    pub fn marker(&mut self, name: &str) -> &mut Self {
        let offset = self.text.len();
        self.markers.insert(
            name.to_string(),
            MarkerEntry {
                offset,
                side: Side::Generated,
            },
        );
        self
    }

    /// Record an offset in the original text under `name`
    pub fn original_marker(&mut self, name: &str, offset: usize) -> &mut Self {
        self.markers.insert(
            name.to_string(),
            MarkerEntry {
                offset,
                side: Side::Original,
            },
        );
        self
    }

    /// Current generated offset of a marker recorded with [`Chunk::marker`]
    pub fn marker_offset(&self, name: &str) -> Option<usize> {
        self.markers
            .get(name)
            .filter(|marker| marker.side == Side::Generated)
            .map(|marker| marker.offset)
    }

    // ------------------------------------------------------------------
    // Composition
    // ------------------------------------------------------------------

    /// Append a copy of `other` at the current end of the buffer
    ///
    /// Lines of `other` after its first are indented to this chunk's level.
    /// When `other` ends on a new line, the next text written here is indented
    /// to both levels. Mappings still open in `other` are closed at its end. `other` itself is
    /// left untouched.
    pub fn add(&mut self, other: &Chunk) -> &mut Self {
        let mut sub = other.clone();
        let sub_end = sub.text.len();
        for mapping in &mut sub.mappings {
            mapping.close(sub_end);
        }

        let indent = self.indent_text();
        if !indent.is_empty() {
            for line_start in content_line_starts(&sub.text).into_iter().rev() {
                sub.splice(line_start, line_start, &indent);
            }
        }

        if self.at_line_start && starts_with_content(&sub.text) {
            self.write_pending_indent();
        }

        let base = self.text.len();
        tracing::trace!(
            base,
            length = sub.text.len(),
            mappings = sub.mappings.len(),
            "Adding chunk"
        );

        self.text.push_str(&sub.text);
        self.mappings
            .extend(sub.mappings.into_iter().map(|mut mapping| {
                if let MappingState::Closed(span) = mapping.state {
                    mapping.state = MappingState::Closed(span.shifted(base));
                }
                mapping
            }));
        for (name, spans) in sub.locators {
            self.locators
                .entry(name)
                .or_default()
                .extend(spans.into_iter().map(|span| span.shifted(base)));
        }
        for (name, mut marker) in sub.markers {
            if marker.side == Side::Generated {
                marker.offset += base;
            }
            self.markers.insert(name, marker);
        }
        if !sub.text.is_empty() {
            // A line `other` left unindented is owed its indentation on top
            // of this chunk's
            self.at_line_start = sub.at_line_start;
            self.carried = if sub.at_line_start {
                sub.indentation + sub.carried
            } else {
                0
            };
        }
        self
    }

    /// [`Chunk::add`] each chunk in order
    pub fn add_all<'a>(&mut self, chunks: impl IntoIterator<Item = &'a Chunk>) -> &mut Self {
        for chunk in chunks {
            self.add(chunk);
        }
        self
    }

    // ------------------------------------------------------------------
    // Closing
    // ------------------------------------------------------------------

    /// Close the chunk against the original text it was generated from
    ///
    /// Open mappings end at the end of the buffer. The chunk stays usable.
    pub fn snapshot(&self, original: &str) -> Snapshot {
        let end = self.text.len();
        let open = self.mappings.iter().filter(|mapping| mapping.is_open()).count();
        if open > 0 {
            tracing::debug!(open, end, "Closing open mappings at end of buffer");
        }
        let mappings = self
            .mappings
            .iter()
            .map(|mapping| (mapping.spec.clone(), mapping.generated(end)))
            .collect();
        let markers = self
            .markers
            .iter()
            .map(|(name, marker)| (name.clone(), marker.offset, marker.side))
            .collect();

        Snapshot::build(original.to_string(), self.text.clone(), mappings, markers)
    }
}

/// Offsets right after each newline that starts a non-empty line
fn content_line_starts(text: &str) -> Vec<usize> {
    text.match_indices('\n')
        .map(|(idx, _)| idx + 1)
        .filter(|&start| starts_with_content(&text[start..]))
        .collect()
}

fn starts_with_content(text: &str) -> bool {
    !(text.is_empty() || text.starts_with('\n') || text.starts_with("\r\n"))
}
