//! Transcoding from async readers.
//!
//! Uses the `futures-io::AsyncRead` trait, so it works with tokio (through
//! `tokio-util`'s compat layer), async-std, smol and other runtimes.
//!
//! - [`read_chunks`] - Turns an async reader into a stream of byte chunks
//! - [`transcode_async`] - Transcodes a whole Targa image from an async reader
//!
//! This module requires the `async-io` feature to be enabled.

mod stream;

pub use stream::{ReadChunks, read_chunks, transcode_async};
