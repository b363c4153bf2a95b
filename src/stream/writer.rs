//! Typed writes that each emit one discrete chunk.

use bytes::{BufMut, Bytes, BytesMut};
use log::trace;

use crate::buffer::ByteBuffer;
use crate::error::CodecError;
use crate::queue::BridgeQueue;

/// Destination for outgoing byte chunks.
pub trait ChunkSink {
    /// Accepts one chunk. Must not block.
    fn push_chunk(&mut self, chunk: Bytes) -> Result<(), CodecError>;
}

impl ChunkSink for Vec<Bytes> {
    fn push_chunk(&mut self, chunk: Bytes) -> Result<(), CodecError> {
        self.push(chunk);
        Ok(())
    }
}

impl ChunkSink for BridgeQueue<Bytes> {
    fn push_chunk(&mut self, chunk: Bytes) -> Result<(), CodecError> {
        self.enqueue(chunk)
    }
}

impl<K: ChunkSink + ?Sized> ChunkSink for &mut K {
    fn push_chunk(&mut self, chunk: Bytes) -> Result<(), CodecError> {
        (**self).push_chunk(chunk)
    }
}

/// Serializes values into a [`ChunkSink`], one chunk per call.
///
/// Nothing is buffered across calls: each write allocates a chunk of
/// exactly the value's size and pushes it right away.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use tgapng::ChunkWriter;
///
/// let mut writer = ChunkWriter::new(Vec::<Bytes>::new());
/// writer.write_u32(13)?;
/// writer.write_fixed_ascii("IHDR", 4)?;
///
/// let chunks = writer.into_inner();
/// assert_eq!(chunks.len(), 2);
/// assert_eq!(&chunks[0][..], &[0, 0, 0, 13]);
/// assert_eq!(&chunks[1][..], b"IHDR");
/// # Ok::<(), tgapng::CodecError>(())
/// ```
#[derive(Debug)]
pub struct ChunkWriter<K> {
    sink: K,
    written: u64,
    chunks: u64,
}

impl<K: ChunkSink> ChunkWriter<K> {
    /// Creates a writer pushing into `sink`.
    pub fn new(sink: K) -> Self {
        Self {
            sink,
            written: 0,
            chunks: 0,
        }
    }

    /// Returns a reference to the sink.
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Consumes the writer and returns the sink.
    pub fn into_inner(self) -> K {
        self.sink
    }

    /// Returns the total number of bytes pushed.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Returns the number of chunks pushed.
    pub fn chunks_written(&self) -> u64 {
        self.chunks
    }

    /// Writes a signed 8 bit integer.
    pub fn write_i8(&mut self, value: i8) -> Result<(), CodecError> {
        self.write_data(1, |c| c.put_i8(value))
    }

    /// Writes an unsigned 8 bit integer.
    pub fn write_u8(&mut self, value: u8) -> Result<(), CodecError> {
        self.write_data(1, |c| c.put_u8(value))
    }

    /// Writes a big-endian signed 16 bit integer.
    pub fn write_i16(&mut self, value: i16) -> Result<(), CodecError> {
        self.write_data(2, |c| c.put_i16(value))
    }

    /// Writes a little-endian signed 16 bit integer.
    pub fn write_i16_le(&mut self, value: i16) -> Result<(), CodecError> {
        self.write_data(2, |c| c.put_i16_le(value))
    }

    /// Writes a big-endian unsigned 16 bit integer.
    pub fn write_u16(&mut self, value: u16) -> Result<(), CodecError> {
        self.write_data(2, |c| c.put_u16(value))
    }

    /// Writes a little-endian unsigned 16 bit integer.
    pub fn write_u16_le(&mut self, value: u16) -> Result<(), CodecError> {
        self.write_data(2, |c| c.put_u16_le(value))
    }

    /// Writes a big-endian signed 32 bit integer.
    pub fn write_i32(&mut self, value: i32) -> Result<(), CodecError> {
        self.write_data(4, |c| c.put_i32(value))
    }

    /// Writes a little-endian signed 32 bit integer.
    pub fn write_i32_le(&mut self, value: i32) -> Result<(), CodecError> {
        self.write_data(4, |c| c.put_i32_le(value))
    }

    /// Writes a big-endian unsigned 32 bit integer.
    pub fn write_u32(&mut self, value: u32) -> Result<(), CodecError> {
        self.write_data(4, |c| c.put_u32(value))
    }

    /// Writes a little-endian unsigned 32 bit integer.
    pub fn write_u32_le(&mut self, value: u32) -> Result<(), CodecError> {
        self.write_data(4, |c| c.put_u32_le(value))
    }

    /// Writes a boolean as one byte (1 or 0).
    pub fn write_bool(&mut self, value: bool) -> Result<(), CodecError> {
        self.write_u8(u8::from(value))
    }

    /// Writes exactly `fixed_length` bytes of ASCII text.
    ///
    /// Characters are masked to 8 bits; short text is zero-padded.
    pub fn write_fixed_ascii(&mut self, value: &str, fixed_length: usize) -> Result<(), CodecError> {
        self.write_data(fixed_length, |c| {
            let mut chars = value.chars();
            for _ in 0..fixed_length {
                c.put_u8(chars.next().map_or(0, |ch| (u32::from(ch) & 0xFF) as u8));
            }
        })
    }

    /// Writes a copy of `bytes` as one chunk.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), CodecError> {
        self.write_data(bytes.len(), |c| c.put_slice(bytes))
    }

    /// Writes the active region of `buffer` as one chunk.
    pub fn write_buffer(&mut self, buffer: &ByteBuffer) -> Result<(), CodecError> {
        self.write_bytes(buffer.as_slice())
    }

    /// Writes `bytes` zero bytes as one chunk.
    pub fn skip(&mut self, bytes: usize) -> Result<(), CodecError> {
        self.write_data(bytes, |c| c.put_bytes(0, bytes))
    }

    fn write_data(&mut self, len: usize, fill: impl FnOnce(&mut BytesMut)) -> Result<(), CodecError> {
        let mut chunk = BytesMut::with_capacity(len);
        fill(&mut chunk);
        debug_assert_eq!(chunk.len(), len);

        self.sink.push_chunk(chunk.freeze())?;
        self.written += len as u64;
        self.chunks += 1;
        trace!("pushed chunk of {} bytes", len);
        Ok(())
    }
}
