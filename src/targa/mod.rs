//! Targa (TGA) decoding.
//!
//! - [`TargaHeader`] - The 18-byte header block, with subset validation
//! - [`TargaType`] - Image data encodings
//! - [`TargaDecoder`] - Header parsing and scanline access over a chunk stream
//!
//! Only uncompressed 24-bit BGR images without a palette, stored from the
//! top-left corner, pass validation.

mod decoder;
mod header;

pub use decoder::TargaDecoder;
pub use header::{TARGA_HEADER_SIZE, TargaHeader, TargaType};
