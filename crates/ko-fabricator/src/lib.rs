/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Generated-text builder with bidirectional source mapping
//!
//! Code generators write derived text into a [`Chunk`], attaching
//! [`MappingSpec`]s that point back at ranges of the original template.
//! Closing the chunk produces a [`Snapshot`] that answers two questions:
//!
//! - [`Snapshot::blame`]: which region on the other side is responsible for
//!   this position?
//! - [`Snapshot::mirror`]: where exactly does this position land on the other
//!   side? Only regions flagged bidirectional answer.
//!
//! ```rust
//! use ko_fabricator::{Chunk, Lookup, MappingSpec};
//!
//! let mut chunk = Chunk::new();
//! chunk.append("Hi ");
//! let id = chunk.open_mapping(MappingSpec::mirror(0..5));
//! chunk.append("World");
//! chunk.close_mapping(id);
//! chunk.insert(3, "Beautiful ");
//!
//! let snapshot = chunk.snapshot("World");
//! let mapping = &snapshot.mappings()[0];
//! assert_eq!(mapping.generated.start.offset, 13);
//! assert_eq!(mapping.generated.end.offset, 18);
//! ```

pub mod chunk;
pub mod mapping;
pub mod snapshot;
mod translate;

pub use chunk::{Chunk, ChunkOptions};
pub use mapping::{Mapping, MappingId, MappingSpec, Marker, Side};
pub use snapshot::{Lookup, Snapshot};
