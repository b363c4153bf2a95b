//! Targa to PNG transcoding sessions.
//!
//! - [`Transcoder`] - Chunk-callback driven session (`on_start`, `on_chunk`,
//!   `on_finish`) running the pipeline as a tokio task
//! - [`transcode_chunks`] - One-shot helper over an in-memory chunk sequence
//!
//! The pipeline writes the PNG signature, decodes the Targa header, writes
//! `IHDR`, then converts each BGR scanline to an unfiltered RGB row and
//! feeds it to the [`Compressor`](crate::Compressor). Compressed blocks
//! become `IDAT` chunks as they are produced; `IEND` closes the stream.

mod pipeline;
mod transcoder;

pub(crate) use pipeline::run_pipeline;
pub use transcoder::{Transcoder, TranscoderState, transcode_chunks};
