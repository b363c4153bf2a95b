//! zlib compressor backed by `miniz_oxide`.

use std::fmt;

use bytes::Bytes;
use log::trace;
use miniz_oxide::deflate::core::{CompressorOxide, create_comp_flags_from_zip_params};
use miniz_oxide::deflate::stream::deflate;
use miniz_oxide::{MZError, MZFlush, MZStatus};

use super::Compressor;
use crate::config::{DEFAULT_COMPRESSION_LEVEL, DEFAULT_OUTPUT_BLOCK_SIZE, TranscodeConfig};
use crate::error::CodecError;

// Positive window bits select the zlib wrapper
const ZLIB_WINDOW_BITS: i32 = 15;
const DEFAULT_STRATEGY: i32 = 0;

/// Streaming deflate in zlib framing, as PNG image data requires.
///
/// Compressed output is collected in a scratch block of fixed size; a block
/// is emitted whenever it fills up and once more at the end of the stream.
///
/// # Example
///
/// ```
/// use tgapng::{Compressor, ZlibCompressor};
///
/// let mut compressor = ZlibCompressor::new(6);
/// let mut out = Vec::new();
/// compressor.push(b"hello ", false, &mut |block| { out.extend_from_slice(&block); Ok(()) })?;
/// compressor.push(b"world", true, &mut |block| { out.extend_from_slice(&block); Ok(()) })?;
///
/// let plain = miniz_oxide::inflate::decompress_to_vec_zlib(&out).unwrap();
/// assert_eq!(plain, b"hello world");
/// # Ok::<(), tgapng::CodecError>(())
/// ```
pub struct ZlibCompressor {
    state: Box<CompressorOxide>,
    scratch: Vec<u8>,
    level: u8,
    finished: bool,
    consumed: u64,
    produced: u64,
}

impl ZlibCompressor {
    /// Creates a compressor with the given deflate level (clamped to 10)
    /// and the default output block size.
    pub fn new(level: u8) -> Self {
        Self::with_block_size(level, DEFAULT_OUTPUT_BLOCK_SIZE)
    }

    /// Creates a compressor emitting blocks of at most `block_size` bytes.
    ///
    /// A `block_size` of zero is raised to one byte.
    pub fn with_block_size(level: u8, block_size: usize) -> Self {
        let level = level.min(crate::config::MAX_COMPRESSION_LEVEL);
        let flags =
            create_comp_flags_from_zip_params(i32::from(level), ZLIB_WINDOW_BITS, DEFAULT_STRATEGY);
        Self {
            state: Box::new(CompressorOxide::new(flags)),
            scratch: vec![0; block_size.max(1)],
            level,
            finished: false,
            consumed: 0,
            produced: 0,
        }
    }

    /// Creates a compressor from a session configuration.
    pub fn from_config(config: &TranscodeConfig) -> Self {
        Self::with_block_size(config.compression_level(), config.output_block_size())
    }

    /// Returns the deflate level.
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Returns true once the final push completed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Returns the number of input bytes consumed.
    pub fn total_in(&self) -> u64 {
        self.consumed
    }

    /// Returns the number of compressed bytes emitted.
    pub fn total_out(&self) -> u64 {
        self.produced
    }
}

impl Default for ZlibCompressor {
    fn default() -> Self {
        Self::new(DEFAULT_COMPRESSION_LEVEL)
    }
}

impl fmt::Debug for ZlibCompressor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZlibCompressor")
            .field("level", &self.level)
            .field("block_size", &self.scratch.len())
            .field("finished", &self.finished)
            .field("total_in", &self.consumed)
            .field("total_out", &self.produced)
            .finish()
    }
}

impl Compressor for ZlibCompressor {
    fn push(
        &mut self,
        input: &[u8],
        last: bool,
        emit: &mut dyn FnMut(Bytes) -> Result<(), CodecError>,
    ) -> Result<(), CodecError> {
        if self.finished {
            return Err(CodecError::Compressor(
                "cannot push to a compressor that has already finished".to_string(),
            ));
        }

        let flush = if last { MZFlush::Finish } else { MZFlush::None };
        let mut input = input;

        loop {
            let result = deflate(&mut *self.state, input, &mut self.scratch, flush);
            input = &input[result.bytes_consumed..];
            self.consumed += result.bytes_consumed as u64;

            if result.bytes_written > 0 {
                self.produced += result.bytes_written as u64;
                trace!("compressed block of {} bytes", result.bytes_written);
                emit(Bytes::copy_from_slice(&self.scratch[..result.bytes_written]))?;
            }

            match result.status {
                Ok(MZStatus::StreamEnd) => {
                    self.finished = true;
                    return Ok(());
                }
                Ok(MZStatus::Ok) => {
                    let scratch_full = result.bytes_written == self.scratch.len();
                    if !last && input.is_empty() && !scratch_full {
                        return Ok(());
                    }
                }
                // Nothing left to do until more input arrives
                Err(MZError::Buf) if !last && input.is_empty() => return Ok(()),
                Ok(status) => {
                    return Err(CodecError::Compressor(format!(
                        "unexpected deflate status: {:?}",
                        status
                    )));
                }
                Err(e) => {
                    return Err(CodecError::Compressor(format!("deflate failed: {:?}", e)));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miniz_oxide::inflate::decompress_to_vec_zlib;

    fn collect(
        compressor: &mut ZlibCompressor,
        pushes: &[(&[u8], bool)],
    ) -> Result<Vec<Bytes>, CodecError> {
        let mut blocks = Vec::new();
        for &(input, last) in pushes {
            compressor.push(input, last, &mut |block| {
                blocks.push(block);
                Ok(())
            })?;
        }
        Ok(blocks)
    }

    #[test]
    fn test_round_trip() {
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let mut compressor = ZlibCompressor::default();
        let blocks = collect(&mut compressor, &[(&data[..5000], false), (&data[5000..], true)]).unwrap();

        assert!(compressor.is_finished());
        assert_eq!(compressor.total_in(), 10_000);
        assert_eq!(decompress_to_vec_zlib(&blocks.concat()).unwrap(), data);
    }

    #[test]
    fn test_empty_final_push() {
        let mut compressor = ZlibCompressor::new(1);
        let blocks = collect(&mut compressor, &[(b"abc".as_slice(), false), (&[] as &[u8], true)]).unwrap();
        assert_eq!(decompress_to_vec_zlib(&blocks.concat()).unwrap(), b"abc");
    }

    #[test]
    fn test_small_blocks_are_bounded() {
        let data: Vec<u8> = (0..4096u32).map(|i| (i * 7919 % 256) as u8).collect();
        let mut compressor = ZlibCompressor::with_block_size(0, 64);
        let blocks = collect(&mut compressor, &[(&data, true)]).unwrap();

        assert!(blocks.len() > 1);
        assert!(blocks.iter().all(|b| b.len() <= 64));
        assert_eq!(decompress_to_vec_zlib(&blocks.concat()).unwrap(), data);
        assert_eq!(compressor.total_out(), blocks.iter().map(|b| b.len() as u64).sum::<u64>());
    }

    #[test]
    fn test_push_after_finish_fails() {
        let mut compressor = ZlibCompressor::default();
        collect(&mut compressor, &[(b"x".as_slice(), true)]).unwrap();
        let err = collect(&mut compressor, &[(b"y".as_slice(), false)]).unwrap_err();
        assert!(err.to_string().contains("already finished"));
    }

    #[test]
    fn test_emit_error_is_passed_through() {
        let mut compressor = ZlibCompressor::default();
        let err = compressor
            .push(b"data", true, &mut |_| Err(CodecError::AlreadyFlushed))
            .unwrap_err();
        assert!(matches!(err, CodecError::AlreadyFlushed));
    }

    #[test]
    fn test_deflate_state_lives_on_the_heap() {
        assert!(std::mem::size_of::<ZlibCompressor>() < 1024);
    }

    #[test]
    fn test_level_is_clamped() {
        assert_eq!(ZlibCompressor::new(200).level(), 10);
        let config = TranscodeConfig::default().with_compression_level(3);
        assert_eq!(ZlibCompressor::from_config(&config).level(), 3);
    }
}
