//! Chunk-level byte streams.
//!
//! - [`ChunkReader`] - Typed async reads over a [`futures_core::Stream`] of
//!   byte chunks, pulling more chunks only when a read runs short
//! - [`ChunkWriter`] - Typed writes, each pushed to a [`ChunkSink`] as its
//!   own chunk

mod reader;
mod writer;

pub use reader::ChunkReader;
pub use writer::{ChunkSink, ChunkWriter};
