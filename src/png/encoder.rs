//! Streaming PNG chunk framing.

use log::{debug, trace};

use super::header::{PNG_SIGNATURE, PngChunkType, PngHeader};
use crate::buffer::ByteBuffer;
use crate::error::CodecError;
use crate::stream::{ChunkSink, ChunkWriter};

/// Writes a PNG stream chunk by chunk into a [`ChunkSink`].
///
/// All chunk kinds go through [`write_chunk`](Self::write_chunk). Nothing
/// is buffered between calls, so image data can be emitted as soon as the
/// compressor hands over a block.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use tgapng::{PngEncoder, PngHeader};
///
/// let mut encoder = PngEncoder::new(Vec::<Bytes>::new());
/// encoder.write_signature()?;
/// encoder.write_header(&PngHeader::new(1, 1))?;
/// encoder.write_end()?;
///
/// let png: Vec<u8> = encoder.into_inner().concat();
/// assert_eq!(png.len(), 8 + 25 + 12);
/// # Ok::<(), tgapng::CodecError>(())
/// ```
#[derive(Debug)]
pub struct PngEncoder<K> {
    writer: ChunkWriter<K>,
}

impl<K: ChunkSink> PngEncoder<K> {
    /// Creates an encoder pushing into `sink`.
    pub fn new(sink: K) -> Self {
        Self {
            writer: ChunkWriter::new(sink),
        }
    }

    /// Returns the underlying writer.
    pub fn writer(&self) -> &ChunkWriter<K> {
        &self.writer
    }

    /// Consumes the encoder and returns the sink.
    pub fn into_inner(self) -> K {
        self.writer.into_inner()
    }

    /// Returns the number of bytes emitted so far.
    pub fn bytes_written(&self) -> u64 {
        self.writer.bytes_written()
    }

    /// Writes the 8-byte PNG signature.
    pub fn write_signature(&mut self) -> Result<(), CodecError> {
        self.writer.write_bytes(&PNG_SIGNATURE)
    }

    /// Writes the `IHDR` chunk.
    pub fn write_header(&mut self, header: &PngHeader) -> Result<(), CodecError> {
        debug!(
            "writing png header {}x{} {:?}",
            header.width, header.height, header.color_type
        );
        self.write_chunk(PngChunkType::IHDR, Some(&header.to_bytes()))
    }

    /// Writes one `IDAT` chunk of already compressed image data.
    ///
    /// May be called any number of times; each call is its own chunk.
    pub fn write_data(&mut self, data: &[u8]) -> Result<(), CodecError> {
        self.write_chunk(PngChunkType::IDAT, Some(data))
    }

    /// Writes the empty `IEND` chunk.
    pub fn write_end(&mut self) -> Result<(), CodecError> {
        self.write_chunk(PngChunkType::IEND, None)
    }

    /// Frames `payload` as a chunk of type `chunk_type`.
    ///
    /// Emits the big-endian payload length, then type and payload as one
    /// unit, then the big-endian CRC-32 of type and payload.
    pub fn write_chunk(
        &mut self,
        chunk_type: PngChunkType,
        payload: Option<&[u8]>,
    ) -> Result<(), CodecError> {
        let payload = payload.unwrap_or_default();
        let length = u32::try_from(payload.len()).map_err(|_| CodecError::ChunkTooLarge {
            actual: payload.len(),
            max: u32::MAX as usize,
        })?;

        let mut scratch = ByteBuffer::allocate(4 + payload.len());
        scratch
            .write_bytes(chunk_type.as_bytes())?
            .write_bytes(payload)?;
        scratch.flip();
        let crc = scratch.crc32();

        self.writer.write_u32(length)?;
        self.writer.write_buffer(&scratch)?;
        self.writer.write_u32(crc)?;

        trace!(
            "framed {} chunk: length={}, crc={:#010x}",
            chunk_type, length, crc
        );
        Ok(())
    }
}
