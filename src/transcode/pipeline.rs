//! The decode, convert, compress and encode loop of one session.

use bytes::Bytes;
use futures_core::Stream;
use log::debug;

use crate::compress::Compressor;
use crate::error::CodecError;
use crate::png::{FilterType, PngEncoder, PngHeader};
use crate::stream::ChunkSink;
use crate::targa::TargaDecoder;
use crate::util::swap_red_blue;

/// Transcodes the Targa image arriving on `input` into PNG chunks pushed to
/// `sink`.
///
/// The signature goes out before the Targa header is read, so a failing
/// session may already have emitted it. Every compressed block becomes one
/// `IDAT` chunk as soon as the compressor yields it.
pub(crate) async fn run_pipeline<S, E, C, K>(
    input: S,
    sink: K,
    mut compressor: C,
) -> Result<(), CodecError>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Into<CodecError>,
    C: Compressor,
    K: ChunkSink,
{
    let mut encoder = PngEncoder::new(sink);
    encoder.write_signature()?;

    let mut decoder = TargaDecoder::from_stream(input);
    let header = decoder.read_header().await?;
    encoder.write_header(&PngHeader::new(
        u32::from(header.width),
        u32::from(header.height),
    ))?;

    let mut row = Vec::with_capacity(1 + header.scanline_len());
    while let Some(pixels) = decoder.read_scanline().await? {
        row.clear();
        row.push(FilterType::None as u8);
        row.extend_from_slice(&pixels);
        swap_red_blue(&mut row[1..]);

        let last = decoder.rows_read() == header.height;
        compressor.push(&row, last, &mut |block| encoder.write_data(&block))?;
    }

    if header.height == 0 {
        compressor.push(&[], true, &mut |block| encoder.write_data(&block))?;
    }

    encoder.write_end()?;
    debug!(
        "transcoded {}x{} image: {} bytes in, {} bytes out",
        header.width,
        header.height,
        decoder.reader_mut().bytes_read(),
        encoder.bytes_written()
    );
    Ok(())
}
