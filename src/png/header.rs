//! PNG signature, chunk types and header fields.

use std::fmt;

/// The eight magic bytes every PNG stream starts with.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// A four-letter PNG chunk type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PngChunkType(pub [u8; 4]);

impl PngChunkType {
    /// Image header.
    pub const IHDR: PngChunkType = PngChunkType(*b"IHDR");
    /// Compressed image data.
    pub const IDAT: PngChunkType = PngChunkType(*b"IDAT");
    /// Image trailer.
    pub const IEND: PngChunkType = PngChunkType(*b"IEND");

    /// Returns the raw type bytes.
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for PngChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            write!(f, "{}", char::from(b))?;
        }
        Ok(())
    }
}

/// Bits per sample (or per palette index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum PngBitDepth {
    /// 1 bit.
    One = 1,
    /// 2 bits.
    Two = 2,
    /// 4 bits.
    Four = 4,
    /// 8 bits.
    #[default]
    Eight = 8,
    /// 16 bits.
    Sixteen = 16,
}

/// How samples make up a pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum PngColorType {
    /// One gray sample.
    Grayscale = 0,
    /// Red, green and blue samples.
    #[default]
    Rgb = 2,
    /// One palette index.
    Indexed = 3,
    /// Gray and alpha samples.
    GrayscaleAlpha = 4,
    /// Red, green, blue and alpha samples.
    Rgba = 6,
}

/// Compression method of the image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum CompressionMethod {
    /// zlib-wrapped deflate.
    #[default]
    Deflate = 0,
}

/// Filter method of the image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum FilterMethod {
    /// Per-scanline adaptive filtering with the five [`FilterType`]s.
    #[default]
    Adaptive = 0,
}

/// Interlace method of the image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum InterlaceMethod {
    /// Rows in order.
    #[default]
    None = 0,
    /// Seven-pass Adam7 interlacing.
    Adam7 = 1,
}

/// Filter applied to one scanline, stored as the row's first byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum FilterType {
    /// Bytes are stored as is.
    #[default]
    None = 0,
    /// Difference to the byte one pixel to the left.
    Sub = 1,
    /// Difference to the byte above.
    Up = 2,
    /// Difference to the mean of left and above.
    Average = 3,
    /// Difference to the Paeth predictor.
    Paeth = 4,
}

/// Fields of the `IHDR` chunk.
///
/// Everything except width and height has a default: 8 bit RGB, deflate
/// compression, adaptive filtering, no interlacing.
///
/// ```
/// use tgapng::{InterlaceMethod, PngColorType, PngHeader};
///
/// let header = PngHeader::new(640, 480)
///     .with_color_type(PngColorType::Rgba)
///     .with_interlace(InterlaceMethod::Adam7);
/// assert_eq!(header.to_bytes()[8..], [8, 6, 0, 0, 1]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PngHeader {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Bits per sample.
    pub bit_depth: PngBitDepth,
    /// Sample layout.
    pub color_type: PngColorType,
    /// Compression method.
    pub compression: CompressionMethod,
    /// Filter method.
    pub filter: FilterMethod,
    /// Interlace method.
    pub interlace: InterlaceMethod,
}

impl PngHeader {
    /// Size of the `IHDR` payload in bytes.
    pub const SIZE: usize = 13;

    /// Creates a header with default fields.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bit_depth: PngBitDepth::default(),
            color_type: PngColorType::default(),
            compression: CompressionMethod::default(),
            filter: FilterMethod::default(),
            interlace: InterlaceMethod::default(),
        }
    }

    /// Sets the bit depth.
    pub fn with_bit_depth(mut self, bit_depth: PngBitDepth) -> Self {
        self.bit_depth = bit_depth;
        self
    }

    /// Sets the color type.
    pub fn with_color_type(mut self, color_type: PngColorType) -> Self {
        self.color_type = color_type;
        self
    }

    /// Sets the compression method.
    pub fn with_compression(mut self, compression: CompressionMethod) -> Self {
        self.compression = compression;
        self
    }

    /// Sets the filter method.
    pub fn with_filter(mut self, filter: FilterMethod) -> Self {
        self.filter = filter;
        self
    }

    /// Sets the interlace method.
    pub fn with_interlace(mut self, interlace: InterlaceMethod) -> Self {
        self.interlace = interlace;
        self
    }

    /// Serializes the fields into the 13-byte `IHDR` payload.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0; Self::SIZE];
        out[0..4].copy_from_slice(&self.width.to_be_bytes());
        out[4..8].copy_from_slice(&self.height.to_be_bytes());
        out[8] = self.bit_depth as u8;
        out[9] = self.color_type as u8;
        out[10] = self.compression as u8;
        out[11] = self.filter as u8;
        out[12] = self.interlace as u8;
        out
    }
}
