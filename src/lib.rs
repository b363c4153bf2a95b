//! tgapng
//!
//! Streaming Targa (TGA) to PNG transcoding for Rust.
//!
//! `tgapng` turns a Targa image that arrives as arbitrary byte chunks into a
//! PNG byte stream that leaves as chunks, holding one scanline in memory at
//! a time. It is built for places where an image passes through rather
//! than sits on disk:
//!
//! - HTTP proxies and response rewriting
//! - upload pipelines
//! - asset conversion over sockets or pipes
//!
//! The crate intentionally:
//! - does NOT open files or sockets
//! - does NOT buffer whole images
//! - does NOT decode compressed, paletted or non-24-bit Targa images
//!
//! It only does one thing: **Targa chunks in → PNG chunks out**
//!
//! The building blocks are public too: a cursor buffer ([`ByteBuffer`]),
//! typed chunk readers and writers ([`ChunkReader`], [`ChunkWriter`]), a
//! push/pull queue ([`BridgeQueue`]), the Targa decoder and the PNG chunk
//! encoder.
//!
//! # Chunk callbacks
//!
//! ```
//! use bytes::Bytes;
//! use futures_util::StreamExt;
//! use tgapng::{CodecError, TargaHeader, Transcoder, ZlibCompressor};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), CodecError> {
//! let mut tga = TargaHeader::bgr24(2, 2).to_bytes().to_vec();
//! tga.extend_from_slice(&[0; 12]);
//!
//! let mut transcoder = Transcoder::new(ZlibCompressor::default());
//! let mut output = transcoder.output();
//!
//! transcoder.on_start()?;
//! for chunk in tga.chunks(4) {
//!     transcoder.on_chunk(Bytes::copy_from_slice(chunk))?;
//! }
//! transcoder.on_finish().await?;
//!
//! while let Some(chunk) = output.next().await {
//!     println!("png chunk {} bytes", chunk?.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Async reader (feature = "async-io")
//!
//! ```ignore
//! use futures_io::AsyncRead;
//! use tgapng::{TranscodeConfig, transcode_async};
//!
//! async fn demo<R: AsyncRead + Unpin>(reader: R) -> Result<(), tgapng::CodecError> {
//!     let png = transcode_async(reader, TranscodeConfig::default()).await?;
//!     println!("png {} bytes", png.len());
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod buffer;
mod compress;
mod config;
mod crc;
mod error;
mod png;
mod queue;
mod stream;
mod targa;
mod transcode;

mod util; // internal helpers

#[cfg(feature = "async-io")]
mod async_stream;

pub use buffer::{ByteBuffer, DEFAULT_CAPACITY};
pub use compress::Compressor;
pub use config::TranscodeConfig;
pub use crc::{CRC_TABLE, crc32, crc32_update};
pub use error::{CodecError, Operation};
pub use png::{
    CompressionMethod, FilterMethod, FilterType, InterlaceMethod, PNG_SIGNATURE, PngBitDepth,
    PngChunkType, PngColorType, PngEncoder, PngHeader,
};
pub use queue::{BridgeQueue, Next, QueueState, QueueStream, Step};
pub use stream::{ChunkReader, ChunkSink, ChunkWriter};
pub use targa::{TARGA_HEADER_SIZE, TargaDecoder, TargaHeader, TargaType};
pub use transcode::{Transcoder, TranscoderState, transcode_chunks};

#[cfg(feature = "zlib")]
pub use compress::ZlibCompressor;

#[cfg(feature = "async-io")]
pub use async_stream::{ReadChunks, read_chunks, transcode_async};
