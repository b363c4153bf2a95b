//! Streaming compression of PNG image data.
//!
//! - [`Compressor`] - Push raw bytes in, receive compressed blocks through a
//!   callback
//! - [`ZlibCompressor`] - zlib-wrapped deflate backed by `miniz_oxide`
//!   (feature `zlib`)

#[cfg(feature = "zlib")]
mod zlib;

#[cfg(feature = "zlib")]
pub use zlib::ZlibCompressor;

use bytes::Bytes;

use crate::error::CodecError;

/// A streaming compressor.
///
/// Input is pushed in order. Whenever the compressor has a block of output
/// ready it hands it to `emit` before returning, so blocks reach the caller
/// in the order they were produced. A push with `last` set flushes all
/// remaining output; once it returns `Ok` the stream is finished and further
/// pushes fail.
pub trait Compressor {
    /// Feeds `input` to the compressor.
    ///
    /// An error returned by `emit` aborts the push and is passed through.
    fn push(
        &mut self,
        input: &[u8],
        last: bool,
        emit: &mut dyn FnMut(Bytes) -> Result<(), CodecError>,
    ) -> Result<(), CodecError>;
}

impl<C: Compressor + ?Sized> Compressor for Box<C> {
    fn push(
        &mut self,
        input: &[u8],
        last: bool,
        emit: &mut dyn FnMut(Bytes) -> Result<(), CodecError>,
    ) -> Result<(), CodecError> {
        (**self).push(input, last, emit)
    }
}
