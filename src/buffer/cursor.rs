//! Fixed-capacity byte region with a read/write cursor.

use bytes::Bytes;

use crate::crc::crc32;
use crate::error::{CodecError, Operation};

/// Default buffer capacity (64 KiB).
pub const DEFAULT_CAPACITY: usize = 64 * 1024;

#[derive(Debug, Clone)]
enum Storage {
    Owned(Vec<u8>),
    Shared(Bytes),
}

impl Storage {
    fn as_slice(&self) -> &[u8] {
        match self {
            Storage::Owned(data) => data,
            Storage::Shared(data) => data,
        }
    }
}

/// A byte buffer with a `position` and a `limit` cursor.
///
/// The buffer always satisfies `0 <= position <= limit <= capacity`. Reads
/// and writes happen at `position` and advance it; neither may cross
/// `limit`. A failed call leaves the buffer untouched.
///
/// Multi-byte integers are big-endian unless the method carries an `_le`
/// suffix, following the naming of [`bytes::Buf`].
///
/// # Example
///
/// ```
/// use tgapng::ByteBuffer;
///
/// let mut buf = ByteBuffer::allocate(8);
/// buf.write_u32(42)?.write_u16_le(7)?;
/// buf.flip();
///
/// assert_eq!(buf.len(), 6);
/// assert_eq!(buf.read_u32()?, 42);
/// assert_eq!(buf.read_u16_le()?, 7);
/// # Ok::<(), tgapng::CodecError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ByteBuffer {
    storage: Storage,
    position: usize,
    limit: usize,
}

impl ByteBuffer {
    /// Creates a zeroed buffer with [`DEFAULT_CAPACITY`].
    pub fn new() -> Self {
        Self::allocate(DEFAULT_CAPACITY)
    }

    /// Creates a zeroed buffer of exactly `capacity` bytes.
    pub fn allocate(capacity: usize) -> Self {
        Self {
            storage: Storage::Owned(vec![0; capacity]),
            position: 0,
            limit: capacity,
        }
    }

    /// Wraps an existing byte vector without copying.
    ///
    /// The buffer is writable; position starts at 0 and limit at the end.
    pub fn wrap(data: Vec<u8>) -> Self {
        let limit = data.len();
        Self {
            storage: Storage::Owned(data),
            position: 0,
            limit,
        }
    }

    /// Wraps shared bytes as a read-only view without copying.
    ///
    /// Every write fails with [`CodecError::ReadOnly`].
    pub fn wrap_read_only(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let limit = data.len();
        Self {
            storage: Storage::Shared(data),
            position: 0,
            limit,
        }
    }

    /// Returns the total size of the backing region.
    pub fn capacity(&self) -> usize {
        self.storage.as_slice().len()
    }

    /// Returns the cursor position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the limit.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns the number of bytes between position and limit.
    pub fn len(&self) -> usize {
        self.limit - self.position
    }

    /// Returns true if position has reached the limit.
    pub fn is_empty(&self) -> bool {
        self.position == self.limit
    }

    /// Returns true if the buffer wraps shared, read-only bytes.
    pub fn is_read_only(&self) -> bool {
        matches!(self.storage, Storage::Shared(_))
    }

    /// Returns the active region, from position up to the limit.
    pub fn as_slice(&self) -> &[u8] {
        &self.storage.as_slice()[self.position..self.limit]
    }

    /// Computes the CRC-32 of the active region without consuming it.
    pub fn crc32(&self) -> u32 {
        crc32(self.as_slice())
    }

    /// Advances the position by `bytes` without touching memory.
    pub fn skip(&mut self, bytes: usize) -> Result<&mut Self, CodecError> {
        self.ensure_within_limit(bytes, Operation::Skipping)?;
        self.position += bytes;
        Ok(self)
    }

    /// Resets position to 0 and limit to the capacity.
    pub fn clear(&mut self) -> &mut Self {
        self.position = 0;
        self.limit = self.capacity();
        self
    }

    /// Resets position to 0, keeping the limit.
    pub fn rewind(&mut self) -> &mut Self {
        self.position = 0;
        self
    }

    /// Sets the limit to the position and resets position to 0.
    ///
    /// Switches a buffer that was just written into reading what was written.
    pub fn flip(&mut self) -> &mut Self {
        self.limit = self.position;
        self.position = 0;
        self
    }

    /// Reads a signed 8 bit integer.
    pub fn read_i8(&mut self) -> Result<i8, CodecError> {
        self.read_array().map(i8::from_be_bytes)
    }

    /// Reads an unsigned 8 bit integer.
    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        self.read_array().map(u8::from_be_bytes)
    }

    /// Reads a big-endian signed 16 bit integer.
    pub fn read_i16(&mut self) -> Result<i16, CodecError> {
        self.read_array().map(i16::from_be_bytes)
    }

    /// Reads a little-endian signed 16 bit integer.
    pub fn read_i16_le(&mut self) -> Result<i16, CodecError> {
        self.read_array().map(i16::from_le_bytes)
    }

    /// Reads a big-endian unsigned 16 bit integer.
    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        self.read_array().map(u16::from_be_bytes)
    }

    /// Reads a little-endian unsigned 16 bit integer.
    pub fn read_u16_le(&mut self) -> Result<u16, CodecError> {
        self.read_array().map(u16::from_le_bytes)
    }

    /// Reads a big-endian signed 32 bit integer.
    pub fn read_i32(&mut self) -> Result<i32, CodecError> {
        self.read_array().map(i32::from_be_bytes)
    }

    /// Reads a little-endian signed 32 bit integer.
    pub fn read_i32_le(&mut self) -> Result<i32, CodecError> {
        self.read_array().map(i32::from_le_bytes)
    }

    /// Reads a big-endian unsigned 32 bit integer.
    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        self.read_array().map(u32::from_be_bytes)
    }

    /// Reads a little-endian unsigned 32 bit integer.
    pub fn read_u32_le(&mut self) -> Result<u32, CodecError> {
        self.read_array().map(u32::from_le_bytes)
    }

    /// Reads a boolean stored as one byte; any non-zero value is true.
    pub fn read_bool(&mut self) -> Result<bool, CodecError> {
        self.read_u8().map(|b| b > 0)
    }

    /// Writes a signed 8 bit integer.
    pub fn write_i8(&mut self, value: i8) -> Result<&mut Self, CodecError> {
        self.write_slice(&value.to_be_bytes())
    }

    /// Writes an unsigned 8 bit integer.
    pub fn write_u8(&mut self, value: u8) -> Result<&mut Self, CodecError> {
        self.write_slice(&[value])
    }

    /// Writes a big-endian signed 16 bit integer.
    pub fn write_i16(&mut self, value: i16) -> Result<&mut Self, CodecError> {
        self.write_slice(&value.to_be_bytes())
    }

    /// Writes a little-endian signed 16 bit integer.
    pub fn write_i16_le(&mut self, value: i16) -> Result<&mut Self, CodecError> {
        self.write_slice(&value.to_le_bytes())
    }

    /// Writes a big-endian unsigned 16 bit integer.
    pub fn write_u16(&mut self, value: u16) -> Result<&mut Self, CodecError> {
        self.write_slice(&value.to_be_bytes())
    }

    /// Writes a little-endian unsigned 16 bit integer.
    pub fn write_u16_le(&mut self, value: u16) -> Result<&mut Self, CodecError> {
        self.write_slice(&value.to_le_bytes())
    }

    /// Writes a big-endian signed 32 bit integer.
    pub fn write_i32(&mut self, value: i32) -> Result<&mut Self, CodecError> {
        self.write_slice(&value.to_be_bytes())
    }

    /// Writes a little-endian signed 32 bit integer.
    pub fn write_i32_le(&mut self, value: i32) -> Result<&mut Self, CodecError> {
        self.write_slice(&value.to_le_bytes())
    }

    /// Writes a big-endian unsigned 32 bit integer.
    pub fn write_u32(&mut self, value: u32) -> Result<&mut Self, CodecError> {
        self.write_slice(&value.to_be_bytes())
    }

    /// Writes a little-endian unsigned 32 bit integer.
    pub fn write_u32_le(&mut self, value: u32) -> Result<&mut Self, CodecError> {
        self.write_slice(&value.to_le_bytes())
    }

    /// Writes a boolean as one byte (1 or 0).
    pub fn write_bool(&mut self, value: bool) -> Result<&mut Self, CodecError> {
        self.write_u8(u8::from(value))
    }

    /// Reads exactly `fixed_length` bytes as ASCII text.
    ///
    /// Each byte becomes one character.
    pub fn read_fixed_ascii(&mut self, fixed_length: usize) -> Result<String, CodecError> {
        let bytes = self.take(fixed_length, Operation::Reading)?;
        Ok(bytes.iter().map(|&b| char::from(b)).collect())
    }

    /// Writes exactly `fixed_length` bytes of ASCII text.
    ///
    /// Every character is masked to its low 8 bits; text shorter than
    /// `fixed_length` is padded with zero bytes, longer text is cut.
    pub fn write_fixed_ascii(
        &mut self,
        value: &str,
        fixed_length: usize,
    ) -> Result<&mut Self, CodecError> {
        self.ensure_writable(fixed_length)?;
        let mut chars = value.chars();
        let target = self.region_mut(fixed_length)?;
        for slot in target.iter_mut() {
            *slot = chars.next().map_or(0, |c| (u32::from(c) & 0xFF) as u8);
        }
        self.position += fixed_length;
        Ok(self)
    }

    /// Reads ASCII text prefixed by its length as a big-endian u32.
    pub fn read_ascii(&mut self) -> Result<String, CodecError> {
        let length = self.read_u32()? as usize;
        self.read_fixed_ascii(length)
    }

    /// Reads ASCII text prefixed by its length as a little-endian u32.
    pub fn read_ascii_le(&mut self) -> Result<String, CodecError> {
        let length = self.read_u32_le()? as usize;
        self.read_fixed_ascii(length)
    }

    /// Writes ASCII text prefixed by its length as a big-endian u32.
    pub fn write_ascii(&mut self, value: &str) -> Result<&mut Self, CodecError> {
        let length = value.chars().count();
        let prefix = self.ascii_prefix(length)?;
        self.write_u32(prefix)?;
        self.write_fixed_ascii(value, length)
    }

    /// Writes ASCII text prefixed by its length as a little-endian u32.
    pub fn write_ascii_le(&mut self, value: &str) -> Result<&mut Self, CodecError> {
        let length = value.chars().count();
        let prefix = self.ascii_prefix(length)?;
        self.write_u32_le(prefix)?;
        self.write_fixed_ascii(value, length)
    }

    /// Copies `byte_length` bytes out of the buffer.
    pub fn read_bytes(&mut self, byte_length: usize) -> Result<Vec<u8>, CodecError> {
        self.take(byte_length, Operation::Reading).map(<[u8]>::to_vec)
    }

    /// Copies `bytes` into the buffer at the cursor.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self, CodecError> {
        self.write_slice(bytes)
    }

    /// Copies the active region of `other` into this buffer.
    ///
    /// `other` is not consumed.
    pub fn write_buffer(&mut self, other: &ByteBuffer) -> Result<&mut Self, CodecError> {
        self.write_slice(other.as_slice())
    }

    fn ensure_within_limit(&self, bytes: usize, operation: Operation) -> Result<(), CodecError> {
        match self.position.checked_add(bytes) {
            Some(end) if end <= self.limit => Ok(()),
            _ => Err(CodecError::LimitExceeded {
                limit: self.limit,
                requested: bytes,
                operation,
            }),
        }
    }

    fn ensure_writable(&self, bytes: usize) -> Result<(), CodecError> {
        if self.is_read_only() {
            return Err(CodecError::ReadOnly);
        }
        self.ensure_within_limit(bytes, Operation::Writing)
    }

    /// Checks room for a prefixed string of `length` characters and returns
    /// the prefix value.
    fn ascii_prefix(&self, length: usize) -> Result<u32, CodecError> {
        let prefix = u32::try_from(length).map_err(|_| CodecError::LimitExceeded {
            limit: self.limit,
            requested: length,
            operation: Operation::Writing,
        })?;
        self.ensure_writable(length.saturating_add(4))?;
        Ok(prefix)
    }

    fn take(&mut self, bytes: usize, operation: Operation) -> Result<&[u8], CodecError> {
        self.ensure_within_limit(bytes, operation)?;
        let start = self.position;
        self.position += bytes;
        Ok(&self.storage.as_slice()[start..start + bytes])
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let mut out = [0; N];
        out.copy_from_slice(self.take(N, Operation::Reading)?);
        Ok(out)
    }

    /// Returns the writable region of `bytes` at the cursor without moving it.
    fn region_mut(&mut self, bytes: usize) -> Result<&mut [u8], CodecError> {
        let start = self.position;
        match &mut self.storage {
            Storage::Owned(data) => Ok(&mut data[start..start + bytes]),
            Storage::Shared(_) => Err(CodecError::ReadOnly),
        }
    }

    fn write_slice(&mut self, bytes: &[u8]) -> Result<&mut Self, CodecError> {
        self.ensure_writable(bytes.len())?;
        self.region_mut(bytes.len())?.copy_from_slice(bytes);
        self.position += bytes.len();
        Ok(self)
    }
}

impl Default for ByteBuffer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_capacity() {
        let buf = ByteBuffer::default();
        assert_eq!(buf.capacity(), DEFAULT_CAPACITY);
        assert_eq!(buf.position(), 0);
        assert_eq!(buf.limit(), DEFAULT_CAPACITY);
        assert_eq!(buf.len(), DEFAULT_CAPACITY);
    }

    #[test]
    fn test_typed_round_trip() {
        let mut buf = ByteBuffer::allocate(32);
        buf.write_i8(-5)
            .unwrap()
            .write_u8(200)
            .unwrap()
            .write_i16(-1234)
            .unwrap()
            .write_u16_le(0xBEEF)
            .unwrap()
            .write_i32_le(-70_000)
            .unwrap()
            .write_u32(0xDEAD_BEEF)
            .unwrap()
            .write_bool(true)
            .unwrap()
            .write_bool(false)
            .unwrap();
        let written = buf.position();
        buf.flip();

        assert_eq!(buf.len(), written);
        assert_eq!(buf.read_i8().unwrap(), -5);
        assert_eq!(buf.read_u8().unwrap(), 200);
        assert_eq!(buf.read_i16().unwrap(), -1234);
        assert_eq!(buf.read_u16_le().unwrap(), 0xBEEF);
        assert_eq!(buf.read_i32_le().unwrap(), -70_000);
        assert_eq!(buf.read_u32().unwrap(), 0xDEAD_BEEF);
        assert!(buf.read_bool().unwrap());
        assert!(!buf.read_bool().unwrap());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_big_endian_layout() {
        let mut buf = ByteBuffer::allocate(4);
        buf.write_u32(42).unwrap();
        buf.flip();
        assert_eq!(buf.as_slice(), &[0, 0, 0, 42]);
    }

    #[test]
    fn test_bool_reads_any_nonzero_as_true() {
        let mut buf = ByteBuffer::wrap(vec![0, 1, 7]);
        assert!(!buf.read_bool().unwrap());
        assert!(buf.read_bool().unwrap());
        assert!(buf.read_bool().unwrap());
    }

    #[test]
    fn test_read_past_limit_leaves_position() {
        let mut buf = ByteBuffer::wrap(vec![1, 2, 3]);
        buf.skip(2).unwrap();

        let err = buf.read_u16().unwrap_err();
        assert!(matches!(
            err,
            CodecError::LimitExceeded {
                limit: 3,
                requested: 2,
                operation: Operation::Reading
            }
        ));
        assert_eq!(buf.position(), 2);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_ascii_prefix_beyond_u32_is_refused() {
        let buf = ByteBuffer::allocate(16);
        let length = u32::MAX as usize + 1;
        let err = buf.ascii_prefix(length).unwrap_err();
        assert!(matches!(
            err,
            CodecError::LimitExceeded { requested, operation: Operation::Writing, .. }
                if requested == length
        ));
        assert_eq!(buf.ascii_prefix(3).unwrap(), 3);
        assert!(buf.ascii_prefix(13).is_err());
    }

    #[test]
    fn test_write_past_limit_leaves_position() {
        let mut buf = ByteBuffer::allocate(3);
        buf.write_u8(1).unwrap();

        let err = buf.write_u32(5).unwrap_err();
        assert!(matches!(
            err,
            CodecError::LimitExceeded {
                operation: Operation::Writing,
                ..
            }
        ));
        assert_eq!(buf.position(), 1);

        assert!(buf.write_bytes(&[0; 3]).is_err());
        assert_eq!(buf.position(), 1);
    }

    #[test]
    fn test_skip_past_limit() {
        let mut buf = ByteBuffer::allocate(4);
        let err = buf.skip(5).unwrap_err();
        assert!(err.to_string().contains("skipping 5 bytes"));
        assert_eq!(buf.position(), 0);
    }

    #[test]
    fn test_clear_rewind_flip() {
        let mut buf = ByteBuffer::allocate(8);
        buf.write_u16(1).unwrap().write_u16(2).unwrap();

        buf.flip();
        assert_eq!((buf.position(), buf.limit()), (0, 4));

        buf.skip(2).unwrap();
        buf.rewind();
        assert_eq!((buf.position(), buf.limit()), (0, 4));

        buf.clear();
        assert_eq!((buf.position(), buf.limit()), (0, 8));
    }

    #[test]
    fn test_fixed_ascii() {
        let mut buf = ByteBuffer::allocate(8);
        buf.write_fixed_ascii("IDAT", 4).unwrap();
        buf.write_fixed_ascii("ab", 4).unwrap();
        buf.flip();

        assert_eq!(buf.as_slice(), b"IDATab\0\0");
        assert_eq!(buf.read_fixed_ascii(4).unwrap(), "IDAT");
    }

    #[test]
    fn test_fixed_ascii_masks_code_points() {
        let mut buf = ByteBuffer::allocate(1);
        // U+0141 masks down to 0x41
        buf.write_fixed_ascii("\u{141}", 1).unwrap();
        buf.flip();
        assert_eq!(buf.read_u8().unwrap(), 0x41);
    }

    #[test]
    fn test_length_prefixed_ascii() {
        let mut buf = ByteBuffer::allocate(16);
        buf.write_ascii("hello").unwrap();
        buf.write_ascii_le("hi").unwrap();
        buf.flip();

        assert_eq!(&buf.as_slice()[..4], &[0, 0, 0, 5]);
        assert_eq!(buf.read_ascii().unwrap(), "hello");
        assert_eq!(buf.read_ascii_le().unwrap(), "hi");
    }

    #[test]
    fn test_length_prefixed_ascii_too_long_is_atomic() {
        let mut buf = ByteBuffer::allocate(6);
        assert!(buf.write_ascii("hello").is_err());
        assert_eq!(buf.position(), 0);
    }

    #[test]
    fn test_raw_bytes() {
        let mut buf = ByteBuffer::allocate(6);
        buf.write_bytes(&[1, 2, 3, 4]).unwrap();
        buf.flip();

        assert_eq!(buf.read_bytes(3).unwrap(), vec![1, 2, 3]);
        assert_eq!(buf.position(), 3);
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn test_write_buffer_does_not_consume_source() {
        let mut src = ByteBuffer::allocate(4);
        src.write_u16(0x0102).unwrap();
        src.flip();

        let mut dst = ByteBuffer::allocate(4);
        dst.write_buffer(&src).unwrap();
        assert_eq!(dst.position(), 2);
        assert_eq!(src.len(), 2);
    }

    #[test]
    fn test_crc32_covers_active_region() {
        let mut buf = ByteBuffer::allocate(16);
        buf.write_bytes(b"xxIEND").unwrap();
        buf.flip();
        buf.skip(2).unwrap();

        assert_eq!(buf.crc32(), crc32(b"IEND"));
        assert_eq!(buf.position(), 2);
    }

    #[test]
    fn test_read_only_view() {
        let mut buf = ByteBuffer::wrap_read_only(Bytes::from_static(&[0, 0, 0, 42]));
        assert!(buf.is_read_only());
        assert!(matches!(buf.write_u8(1), Err(CodecError::ReadOnly)));
        assert_eq!(buf.read_u32().unwrap(), 42);
    }

    #[test]
    fn test_wrap_is_writable() {
        let mut buf = ByteBuffer::wrap(vec![0; 2]);
        buf.write_u16(0xABCD).unwrap();
        buf.rewind();
        assert_eq!(buf.read_u16().unwrap(), 0xABCD);
    }
}
