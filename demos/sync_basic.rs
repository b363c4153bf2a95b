//! Synchronous building blocks: cursor buffer, CRC-32 and PNG framing.
//!
//! Builds a PNG by hand with a stored (uncompressed) deflate block, without
//! any runtime.
//!
//! Run with:
//!     cargo run --example sync_basic

use bytes::Bytes;
use tgapng::{ByteBuffer, PngEncoder, PngHeader, crc32};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (width, height) = (4u32, 2u32);

    // Raw scanlines: filter byte followed by RGB pixels
    let stride = 1 + width as usize * 3;
    let mut raw = ByteBuffer::allocate(stride * height as usize);
    for y in 0..height {
        raw.write_u8(0)?;
        for x in 0..width {
            raw.write_u8((x * 60) as u8)?
                .write_u8((y * 120) as u8)?
                .write_u8(200)?;
        }
    }
    raw.flip();
    println!("raw image data: {} bytes", raw.len());

    // zlib stream holding a single stored deflate block
    let mut zlib = ByteBuffer::allocate(2 + 5 + raw.len() + 4);
    let len = raw.len() as u16;
    zlib.write_u8(0x78)?
        .write_u8(0x01)?
        .write_u8(0x01)?
        .write_u16_le(len)?
        .write_u16_le(!len)?
        .write_buffer(&raw)?
        .write_u32(adler32(raw.as_slice()))?;
    zlib.flip();

    let mut encoder = PngEncoder::new(Vec::<Bytes>::new());
    encoder.write_signature()?;
    encoder.write_header(&PngHeader::new(width, height))?;
    encoder.write_data(zlib.as_slice())?;
    encoder.write_end()?;

    println!(
        "emitted {} chunks, {} bytes",
        encoder.writer().chunks_written(),
        encoder.bytes_written()
    );

    let png = encoder.into_inner().concat();
    println!("IEND crc: {:#010x}", crc32(b"IEND"));
    println!("PNG starts with {:02X?}", &png[..8]);

    Ok(())
}

fn adler32(data: &[u8]) -> u32 {
    let (mut a, mut b) = (1u32, 0u32);
    for &byte in data {
        a = (a + u32::from(byte)) % 65521;
        b = (b + a) % 65521;
    }
    (b << 16) | a
}
