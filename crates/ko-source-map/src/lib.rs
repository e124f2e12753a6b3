/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Location model for knockout template tooling
//!
//! This crate provides the position types every other part of the tooling is
//! built on: immutable [`Position`] and [`Range`] values that carry a line, a
//! column and an absolute byte offset, and a [`LineIndex`] that converts
//! between the two representations for one text.
//!
//! # Overview
//!
//! - [`Position`]: line, column and byte offset, all 0-indexed
//! - [`Range`]: a start and end [`Position`]
//! - [`Span`]: an offset-only range, for text that is still being written
//! - [`LineIndex`]: precomputed line starts for fast conversions
//! - [`Newline`]: the line terminator style detected for a text
//!
//! # Example
//!
//! ```rust
//! use ko_source_map::{position_from_offset, range_from_offsets};
//!
//! let text = "<div>\n  <span></span>\n</div>";
//! let position = position_from_offset(8, text).unwrap();
//! assert_eq!((position.line, position.column), (1, 2));
//!
//! let range = range_from_offsets(8, 21, text).unwrap();
//! assert_eq!(range.size(), 13);
//! assert!(range.contains(10));
//! ```

pub mod error;
pub mod line_index;
pub mod newline;
pub mod types;
pub mod utils;

// Re-export main types
pub use error::{LocationError, Result};
pub use line_index::LineIndex;
pub use newline::Newline;
pub use types::{Position, Range, Span};
pub use utils::{position_from_line_column, position_from_offset, range_from_offsets, translate};
