//! PNG encoding.
//!
//! - [`PngEncoder`] - Frames PNG chunks into a [`ChunkSink`](crate::ChunkSink)
//! - [`PngHeader`] - The `IHDR` payload, with builder-style setters
//! - [`PngChunkType`] - Four-letter chunk type tags
//!
//! Every chunk is framed as a big-endian length, the type tag, the payload
//! and a big-endian CRC-32 over type and payload.

mod encoder;
mod header;

pub use encoder::PngEncoder;
pub use header::{
    CompressionMethod, FilterMethod, FilterType, InterlaceMethod, PNG_SIGNATURE, PngBitDepth,
    PngChunkType, PngColorType, PngHeader,
};
