//! The Targa header block.

use crate::error::CodecError;

/// Size of the fixed Targa header block in bytes.
pub const TARGA_HEADER_SIZE: usize = 18;

const ATTRIB_BITS_MASK: u8 = 0b0000_1111;
const STARTS_RIGHT_BIT: u8 = 0b0001_0000;
const STARTS_TOP_BIT: u8 = 0b0010_0000;

/// How pixel data is encoded in the image data block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TargaType {
    /// No image data.
    NoData = 0,
    /// Palette indices.
    Indexed = 1,
    /// Blue, green, red (and optional alpha) samples.
    Bgr = 2,
    /// Grayscale samples.
    Gray = 3,
    /// Run-length encoded palette indices.
    IndexedCompressed = 9,
    /// Run-length encoded BGR samples.
    BgrCompressed = 10,
    /// Run-length encoded grayscale samples.
    GrayCompressed = 11,
}

impl TryFrom<u8> for TargaType {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => TargaType::NoData,
            1 => TargaType::Indexed,
            2 => TargaType::Bgr,
            3 => TargaType::Gray,
            9 => TargaType::IndexedCompressed,
            10 => TargaType::BgrCompressed,
            11 => TargaType::GrayCompressed,
            other => return Err(CodecError::IllegalImageType(other)),
        })
    }
}

/// A parsed Targa header. Numeric fields are little-endian on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargaHeader {
    /// Length of the image ID field following the header.
    pub id_length: u8,
    /// Whether a color palette follows the image ID.
    pub has_palette: bool,
    /// Encoding of the image data.
    pub image_type: TargaType,
    /// First palette index.
    pub palette_start: u16,
    /// Length of the palette.
    pub palette_length: u16,
    /// Bits per palette entry.
    pub bits_per_palette: u8,
    /// Horizontal origin.
    pub left: u16,
    /// Vertical origin.
    pub top: u16,
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
    /// Bits per pixel.
    pub bit_depth: u8,
    /// Attribute (alpha) bits per pixel.
    pub attrib_per_pixel: u8,
    /// Pixels run right to left.
    pub starts_right: bool,
    /// Rows run top to bottom.
    pub starts_top: bool,
}

impl TargaHeader {
    /// Creates the header of an uncompressed, top-left-origin 24-bit BGR
    /// image without ID or palette.
    pub fn bgr24(width: u16, height: u16) -> Self {
        Self {
            id_length: 0,
            has_palette: false,
            image_type: TargaType::Bgr,
            palette_start: 0,
            palette_length: 0,
            bits_per_palette: 0,
            left: 0,
            top: 0,
            width,
            height,
            bit_depth: 24,
            attrib_per_pixel: 0,
            starts_right: false,
            starts_top: true,
        }
    }

    /// Decodes the packed image descriptor byte.
    ///
    /// Returns `(attrib_per_pixel, starts_right, starts_top)`.
    pub fn unpack_descriptor(descriptor: u8) -> (u8, bool, bool) {
        (
            descriptor & ATTRIB_BITS_MASK,
            descriptor & STARTS_RIGHT_BIT != 0,
            descriptor & STARTS_TOP_BIT != 0,
        )
    }

    /// Packs the attribute bits and origin flags into the descriptor byte.
    pub fn descriptor(&self) -> u8 {
        let mut descriptor = self.attrib_per_pixel & ATTRIB_BITS_MASK;
        if self.starts_right {
            descriptor |= STARTS_RIGHT_BIT;
        }
        if self.starts_top {
            descriptor |= STARTS_TOP_BIT;
        }
        descriptor
    }

    /// Serializes the header into its 18-byte wire form.
    pub fn to_bytes(&self) -> [u8; TARGA_HEADER_SIZE] {
        let mut out = [0; TARGA_HEADER_SIZE];
        out[0] = self.id_length;
        out[1] = u8::from(self.has_palette);
        out[2] = self.image_type as u8;
        out[3..5].copy_from_slice(&self.palette_start.to_le_bytes());
        out[5..7].copy_from_slice(&self.palette_length.to_le_bytes());
        out[7] = self.bits_per_palette;
        out[8..10].copy_from_slice(&self.left.to_le_bytes());
        out[10..12].copy_from_slice(&self.top.to_le_bytes());
        out[12..14].copy_from_slice(&self.width.to_le_bytes());
        out[14..16].copy_from_slice(&self.height.to_le_bytes());
        out[16] = self.bit_depth;
        out[17] = self.descriptor();
        out
    }

    /// Returns the number of bytes in one row of pixel data.
    pub fn scanline_len(&self) -> usize {
        usize::from(self.width) * usize::from(self.bit_depth / 8)
    }

    /// Checks that the image is uncompressed 24-bit BGR without a palette,
    /// stored top-left first.
    pub fn validate(&self) -> Result<(), CodecError> {
        if self.has_palette {
            return Err(CodecError::Unsupported(
                "targa images using palettes are not supported",
            ));
        }

        if self.image_type != TargaType::Bgr || self.bit_depth != 24 {
            return Err(CodecError::Unsupported(
                "only uncompressed 24 bit BGR encoded targa images are supported",
            ));
        }

        if !self.starts_top || self.starts_right {
            return Err(CodecError::Unsupported(
                "only targa images starting on the top left are supported",
            ));
        }

        Ok(())
    }
}
