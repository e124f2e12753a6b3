/*
 * translate.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Moving recorded offsets across edits of the generated buffer.
//!
//! Every chunk mutation that changes the buffer other than by appending is
//! described as an [`Edit`] and every recorded offset goes through
//! [`Edit::apply`]. The mapping is monotonic: offsets never change order.

use ko_source_map::Span;

/// Which side of a pure insertion a boundary sitting on it ends up on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Bias {
    /// Stay in front of the inserted text (range ends)
    Before,
    /// Move past the inserted text (range starts, markers, open mappings)
    After,
}

/// Replacement of `removed` bytes at `at` by `inserted` bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Edit {
    pub at: usize,
    pub removed: usize,
    pub inserted: usize,
}

impl Edit {
    pub fn insertion(at: usize, inserted: usize) -> Self {
        Edit {
            at,
            removed: 0,
            inserted,
        }
    }

    pub fn replacement(start: usize, end: usize, inserted: usize) -> Self {
        Edit {
            at: start,
            removed: end - start,
            inserted,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.removed == 0 && self.inserted == 0
    }

    pub fn apply(&self, offset: usize, bias: Bias) -> usize {
        let old_end = self.at + self.removed;

        if offset < self.at {
            offset
        } else if offset > old_end {
            offset - self.removed + self.inserted
        } else if self.removed == 0 {
            // Sitting exactly on a pure insertion point
            match bias {
                Bias::Before => offset,
                Bias::After => offset + self.inserted,
            }
        } else if offset == old_end {
            self.at + self.inserted
        } else if offset == self.at {
            self.at
        } else {
            // Strictly inside the replaced text
            offset.min(self.at + self.inserted)
        }
    }

    /// Starts move after a coinciding insertion and ends stay before it, so a
    /// range touching the edit point never grows to swallow the new text.
    /// Empty spans move as a whole, to the side given by `empty`.
    pub fn apply_span(&self, span: Span, empty: Bias) -> Span {
        if span.is_empty() {
            return Span::empty(self.apply(span.start, empty));
        }
        let start = self.apply(span.start, Bias::After);
        let end = self.apply(span.end, Bias::Before).max(start);
        Span::new(start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insertion_shifts_following_offsets() {
        let edit = Edit::insertion(3, 10);

        assert_eq!(edit.apply(2, Bias::After), 2);
        assert_eq!(edit.apply(4, Bias::Before), 14);
        assert_eq!(edit.apply(3, Bias::Before), 3);
        assert_eq!(edit.apply(3, Bias::After), 13);
    }

    #[test]
    fn test_insertion_at_span_boundaries() {
        let edit = Edit::insertion(3, 10);

        // Span starting at the edit point moves past the insertion
        assert_eq!(edit.apply_span(Span::new(3, 8), Bias::After), Span::new(13, 18));
        // Span ending at the edit point does not grow
        assert_eq!(edit.apply_span(Span::new(0, 3), Bias::After), Span::new(0, 3));
        // Span around the edit point grows
        assert_eq!(edit.apply_span(Span::new(1, 5), Bias::After), Span::new(1, 15));
        // Empty span moves as a whole, to either side
        assert_eq!(edit.apply_span(Span::empty(3), Bias::After), Span::empty(13));
        assert_eq!(edit.apply_span(Span::empty(3), Bias::Before), Span::empty(3));
        assert_eq!(edit.apply_span(Span::empty(5), Bias::Before), Span::empty(15));
    }

    #[test]
    fn test_removal_collapses_removed_offsets() {
        let edit = Edit::replacement(2, 6, 0);

        assert_eq!(edit.apply(1, Bias::After), 1);
        assert_eq!(edit.apply(2, Bias::After), 2);
        assert_eq!(edit.apply(4, Bias::After), 2);
        assert_eq!(edit.apply(6, Bias::Before), 2);
        assert_eq!(edit.apply(9, Bias::Before), 5);

        assert_eq!(edit.apply_span(Span::new(3, 9), Bias::After), Span::new(2, 5));
        assert_eq!(edit.apply_span(Span::new(2, 6), Bias::After), Span::empty(2));
    }

    #[test]
    fn test_replacement_keeps_covering_spans_covering() {
        // "Hi World" -> "Hi Universe"
        let edit = Edit::replacement(3, 8, 8);

        assert_eq!(edit.apply_span(Span::new(3, 8), Bias::After), Span::new(3, 11));
        assert_eq!(edit.apply_span(Span::new(0, 8), Bias::After), Span::new(0, 11));
        // Inside the old text, clamped into the new text
        assert_eq!(edit.apply(5, Bias::After), 5);
        assert_eq!(Edit::replacement(3, 8, 1).apply(6, Bias::After), 4);
    }

    #[test]
    fn test_apply_is_monotonic() {
        let edits = [
            Edit::insertion(4, 3),
            Edit::replacement(2, 7, 1),
            Edit::replacement(2, 4, 9),
            Edit::replacement(0, 10, 0),
        ];

        for edit in edits {
            for bias in [Bias::Before, Bias::After] {
                let moved: Vec<usize> = (0..=12).map(|offset| edit.apply(offset, bias)).collect();
                assert!(
                    moved.windows(2).all(|pair| pair[0] <= pair[1]),
                    "{edit:?} with {bias:?} is not monotonic: {moved:?}"
                );
            }
        }
    }

    #[test]
    fn test_noop_edit() {
        let edit = Edit::insertion(5, 0);
        assert!(edit.is_noop());
        for offset in 0..10 {
            assert_eq!(edit.apply(offset, Bias::After), offset);
        }
    }
}
