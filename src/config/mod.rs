//! Configuration for transcoding sessions.
//!
//! - [`TranscodeConfig`] - Input read size, deflate level and compressed
//!   block size
//!
//! # Example
//!
//! ```
//! use tgapng::TranscodeConfig;
//!
//! // Custom values
//! let config = TranscodeConfig::new(4096, 9, 16 * 1024)?;
//!
//! // Builder pattern
//! let config = TranscodeConfig::default().with_compression_level(1);
//! # Ok::<(), tgapng::CodecError>(())
//! ```

use crate::error::CodecError;

/// Default size of chunks pulled from an input reader (8 KiB).
pub const DEFAULT_READ_CHUNK_SIZE: usize = 8 * 1024;

/// Default deflate level.
pub const DEFAULT_COMPRESSION_LEVEL: u8 = 6;

/// Highest accepted deflate level.
pub const MAX_COMPRESSION_LEVEL: u8 = 10;

/// Default size of the compressor's output block (32 KiB).
pub const DEFAULT_OUTPUT_BLOCK_SIZE: usize = 32 * 1024;

/// Smallest accepted output block size.
pub const MIN_OUTPUT_BLOCK_SIZE: usize = 64;

/// Settings for one transcoding session.
///
/// - `read_chunk_size` - Bytes requested per read when pulling input from an
///   `AsyncRead`; must be non-zero
/// - `compression_level` - Deflate level, `0..=10`
/// - `output_block_size` - Largest compressed block handed to the PNG
///   encoder at once, which bounds the size of each `IDAT` chunk; at least
///   64 bytes
///
/// # Example
///
/// ```
/// use tgapng::TranscodeConfig;
///
/// let config = TranscodeConfig::default()
///     .with_read_chunk_size(1024)
///     .with_output_block_size(4096);
/// assert_eq!(config.compression_level(), 6);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TranscodeConfig {
    read_chunk_size: usize,
    compression_level: u8,
    output_block_size: usize,
}

impl TranscodeConfig {
    /// Creates a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidConfig`] if:
    /// - `read_chunk_size` is zero
    /// - `compression_level` is above 10
    /// - `output_block_size` is below 64
    pub fn new(
        read_chunk_size: usize,
        compression_level: u8,
        output_block_size: usize,
    ) -> Result<Self, CodecError> {
        if read_chunk_size == 0 {
            return Err(CodecError::InvalidConfig {
                message: "read_chunk_size must be non-zero",
            });
        }

        if compression_level > MAX_COMPRESSION_LEVEL {
            return Err(CodecError::InvalidConfig {
                message: "compression_level must be in 0..=10",
            });
        }

        if output_block_size < MIN_OUTPUT_BLOCK_SIZE {
            return Err(CodecError::InvalidConfig {
                message: "output_block_size must be at least 64 bytes",
            });
        }

        Ok(Self {
            read_chunk_size,
            compression_level,
            output_block_size,
        })
    }

    /// Sets the read chunk size. Not validated until [`validate`](Self::validate).
    pub fn with_read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size;
        self
    }

    /// Sets the deflate level. Not validated until [`validate`](Self::validate).
    pub fn with_compression_level(mut self, level: u8) -> Self {
        self.compression_level = level;
        self
    }

    /// Sets the output block size. Not validated until [`validate`](Self::validate).
    pub fn with_output_block_size(mut self, size: usize) -> Self {
        self.output_block_size = size;
        self
    }

    /// Returns the read chunk size.
    pub fn read_chunk_size(&self) -> usize {
        self.read_chunk_size
    }

    /// Returns the deflate level.
    pub fn compression_level(&self) -> u8 {
        self.compression_level
    }

    /// Returns the output block size.
    pub fn output_block_size(&self) -> usize {
        self.output_block_size
    }

    /// Validates the current configuration.
    ///
    /// ```
    /// use tgapng::TranscodeConfig;
    ///
    /// let config = TranscodeConfig::default().with_compression_level(11);
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), CodecError> {
        Self::new(
            self.read_chunk_size,
            self.compression_level,
            self.output_block_size,
        )
        .map(|_| ())
    }
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            output_block_size: DEFAULT_OUTPUT_BLOCK_SIZE,
        }
    }
}
