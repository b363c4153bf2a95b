//! Typed reads over a stream of byte chunks.
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use tgapng::{BridgeQueue, ChunkReader};
//!
//! # tokio_test::block_on(async {
//! let queue = BridgeQueue::new();
//! queue.enqueue(Bytes::from_static(&[0x00, 0x00]))?;
//! queue.enqueue(Bytes::from_static(&[0x00, 0x2A]))?;
//! queue.flush();
//!
//! let mut reader = ChunkReader::new(queue.stream());
//! assert_eq!(reader.read_u32().await?, 42);
//! assert!(reader.read_u8().await.is_err());
//! # Ok::<(), tgapng::CodecError>(())
//! # }).unwrap();
//! ```

use std::future::poll_fn;
use std::pin::Pin;

use bytes::{Buf, Bytes};
use futures_core::Stream;
use log::trace;

use crate::error::CodecError;
use crate::util::combine_bytes;

/// Reads fixed-size values from a chunk source whose chunk boundaries are
/// arbitrary.
///
/// The reader keeps one window of bytes and a cursor into it. When a read
/// needs more bytes than the window still holds, the next chunk is pulled,
/// appended to the unread tail and the cursor reset. Pulling is the only
/// point where a read suspends.
///
/// Multi-byte integers are big-endian unless the method carries an `_le`
/// suffix.
#[derive(Debug)]
pub struct ChunkReader<S> {
    source: S,
    window: Bytes,
    cursor: usize,
    consumed: u64,
    closed: bool,
}

impl<S, E> ChunkReader<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Into<CodecError>,
{
    /// Creates a reader pulling chunks from `source`.
    pub fn new(source: S) -> Self {
        Self {
            source,
            window: Bytes::new(),
            cursor: 0,
            consumed: 0,
            closed: false,
        }
    }

    /// Returns the number of unread bytes in the current window.
    pub fn available(&self) -> usize {
        self.window.len() - self.cursor
    }

    /// Returns the unread bytes of the current window.
    pub fn remaining(&self) -> &[u8] {
        &self.window[self.cursor..]
    }

    /// Returns the total number of bytes consumed so far.
    pub fn bytes_read(&self) -> u64 {
        self.consumed
    }

    /// Consumes the reader and returns the chunk source.
    ///
    /// Unread window bytes are dropped.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// Makes sure at least `bytes` unread bytes are in the window, pulling
    /// chunks as needed.
    ///
    /// Fails with [`CodecError::StreamClosed`] if the source ends first.
    pub async fn ensure_available(&mut self, bytes: usize) -> Result<(), CodecError> {
        while self.available() < bytes {
            let missing = bytes - self.available();
            if self.closed {
                return Err(CodecError::StreamClosed { missing });
            }

            let pulled = poll_fn(|cx| Pin::new(&mut self.source).poll_next(cx)).await;
            match pulled {
                None => {
                    self.closed = true;
                    return Err(CodecError::StreamClosed { missing });
                }
                Some(Err(e)) => return Err(e.into()),
                Some(Ok(chunk)) => {
                    trace!("pulled chunk of {} bytes", chunk.len());
                    let tail = self.window.slice(self.cursor..);
                    self.window = combine_bytes(tail, chunk);
                    self.cursor = 0;
                }
            }
        }
        Ok(())
    }

    /// Reads a signed 8 bit integer.
    pub async fn read_i8(&mut self) -> Result<i8, CodecError> {
        Ok(self.take(1).await?.get_i8())
    }

    /// Reads an unsigned 8 bit integer.
    pub async fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1).await?.get_u8())
    }

    /// Reads a big-endian signed 16 bit integer.
    pub async fn read_i16(&mut self) -> Result<i16, CodecError> {
        Ok(self.take(2).await?.get_i16())
    }

    /// Reads a little-endian signed 16 bit integer.
    pub async fn read_i16_le(&mut self) -> Result<i16, CodecError> {
        Ok(self.take(2).await?.get_i16_le())
    }

    /// Reads a big-endian unsigned 16 bit integer.
    pub async fn read_u16(&mut self) -> Result<u16, CodecError> {
        Ok(self.take(2).await?.get_u16())
    }

    /// Reads a little-endian unsigned 16 bit integer.
    pub async fn read_u16_le(&mut self) -> Result<u16, CodecError> {
        Ok(self.take(2).await?.get_u16_le())
    }

    /// Reads a big-endian signed 32 bit integer.
    pub async fn read_i32(&mut self) -> Result<i32, CodecError> {
        Ok(self.take(4).await?.get_i32())
    }

    /// Reads a little-endian signed 32 bit integer.
    pub async fn read_i32_le(&mut self) -> Result<i32, CodecError> {
        Ok(self.take(4).await?.get_i32_le())
    }

    /// Reads a big-endian unsigned 32 bit integer.
    pub async fn read_u32(&mut self) -> Result<u32, CodecError> {
        Ok(self.take(4).await?.get_u32())
    }

    /// Reads a little-endian unsigned 32 bit integer.
    pub async fn read_u32_le(&mut self) -> Result<u32, CodecError> {
        Ok(self.take(4).await?.get_u32_le())
    }

    /// Reads a boolean stored as one byte; any non-zero value is true.
    pub async fn read_bool(&mut self) -> Result<bool, CodecError> {
        Ok(self.read_u8().await? > 0)
    }

    /// Reads `byte_length` bytes.
    ///
    /// The returned bytes share memory with the window when they lie within
    /// a single pulled chunk.
    pub async fn read_bytes(&mut self, byte_length: usize) -> Result<Bytes, CodecError> {
        self.take(byte_length).await
    }

    /// Skips `bytes` bytes.
    pub async fn skip(&mut self, bytes: usize) -> Result<(), CodecError> {
        self.take(bytes).await?;
        Ok(())
    }

    async fn take(&mut self, bytes: usize) -> Result<Bytes, CodecError> {
        self.ensure_available(bytes).await?;
        let out = self.window.slice(self.cursor..self.cursor + bytes);
        self.cursor += bytes;
        self.consumed += bytes as u64;
        Ok(out)
    }
}
