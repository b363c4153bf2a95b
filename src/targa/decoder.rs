//! Streaming Targa decoder.

use bytes::Bytes;
use futures_core::Stream;
use log::debug;

use super::header::{TargaHeader, TargaType};
use crate::error::CodecError;
use crate::stream::ChunkReader;

/// Reads a Targa image from a chunk stream, one scanline at a time.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use futures_util::stream;
/// use tgapng::{TargaDecoder, TargaHeader};
///
/// # tokio_test::block_on(async {
/// let mut image = TargaHeader::bgr24(2, 1).to_bytes().to_vec();
/// image.extend_from_slice(&[1, 2, 3, 4, 5, 6]);
/// let chunks = stream::iter(vec![Ok::<_, tgapng::CodecError>(Bytes::from(image))]);
///
/// let mut decoder = TargaDecoder::from_stream(chunks);
/// let header = decoder.read_header().await?;
/// assert_eq!((header.width, header.height), (2, 1));
///
/// let row = decoder.read_scanline().await?.unwrap();
/// assert_eq!(&row[..], &[1, 2, 3, 4, 5, 6]);
/// assert!(decoder.read_scanline().await?.is_none());
/// # Ok::<(), tgapng::CodecError>(())
/// # }).unwrap();
/// ```
#[derive(Debug)]
pub struct TargaDecoder<S> {
    reader: ChunkReader<S>,
    header: Option<TargaHeader>,
    rows_read: u16,
}

impl<S, E> TargaDecoder<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Into<CodecError>,
{
    /// Creates a decoder on top of an existing reader.
    pub fn new(reader: ChunkReader<S>) -> Self {
        Self {
            reader,
            header: None,
            rows_read: 0,
        }
    }

    /// Creates a decoder pulling chunks from `source`.
    pub fn from_stream(source: S) -> Self {
        Self::new(ChunkReader::new(source))
    }

    /// Returns the header once [`read_header`](Self::read_header) succeeded.
    pub fn header(&self) -> Option<&TargaHeader> {
        self.header.as_ref()
    }

    /// Returns the number of scanlines read so far.
    pub fn rows_read(&self) -> u16 {
        self.rows_read
    }

    /// Returns the underlying reader, e.g. to read pixel data directly.
    pub fn reader_mut(&mut self) -> &mut ChunkReader<S> {
        &mut self.reader
    }

    /// Consumes the decoder and returns the underlying reader.
    pub fn into_inner(self) -> ChunkReader<S> {
        self.reader
    }

    /// Reads and validates the header.
    ///
    /// On success the reader is positioned on the first pixel, past the
    /// image ID and the palette.
    pub async fn read_header(&mut self) -> Result<TargaHeader, CodecError> {
        let header = self.read_header_block().await?;
        debug!("read targa header: {:?}", header);

        header.validate()?;

        self.reader.skip(usize::from(header.id_length)).await?;
        self.reader.skip(usize::from(header.palette_length)).await?;

        self.header = Some(header);
        Ok(header)
    }

    /// Reads the next row of BGR pixel bytes, top row first.
    ///
    /// Returns `None` once every row was read.
    pub async fn read_scanline(&mut self) -> Result<Option<Bytes>, CodecError> {
        let header = self.header.ok_or(CodecError::InvalidState {
            expected: "header read",
            actual: "no header",
        })?;
        if self.rows_read >= header.height {
            return Ok(None);
        }

        let row = self.reader.read_bytes(header.scanline_len()).await?;
        self.rows_read += 1;
        Ok(Some(row))
    }

    async fn read_header_block(&mut self) -> Result<TargaHeader, CodecError> {
        let id_length = self.reader.read_u8().await?;
        let has_palette = self.reader.read_bool().await?;
        let image_type = TargaType::try_from(self.reader.read_u8().await?)?;

        let palette_start = self.reader.read_u16_le().await?;
        let palette_length = self.reader.read_u16_le().await?;
        let bits_per_palette = self.reader.read_u8().await?;

        let left = self.reader.read_u16_le().await?;
        let top = self.reader.read_u16_le().await?;
        let width = self.reader.read_u16_le().await?;
        let height = self.reader.read_u16_le().await?;
        let bit_depth = self.reader.read_u8().await?;

        let (attrib_per_pixel, starts_right, starts_top) =
            TargaHeader::unpack_descriptor(self.reader.read_u8().await?);

        Ok(TargaHeader {
            id_length,
            has_palette,
            image_type,
            palette_start,
            palette_length,
            bits_per_palette,
            left,
            top,
            width,
            height,
            bit_depth,
            attrib_per_pixel,
            starts_right,
            starts_top,
        })
    }
}
