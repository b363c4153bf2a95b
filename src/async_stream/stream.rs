//! Async reader adapter.
//!
//! # Example
//!
//! ```ignore
//! use tgapng::{TranscodeConfig, transcode_async};
//! use futures_io::AsyncRead;
//!
//! async fn demo<R: AsyncRead + Unpin>(reader: R) -> Result<(), tgapng::CodecError> {
//!     let png = transcode_async(reader, TranscodeConfig::default()).await?;
//!     println!("PNG: {} bytes", png.len());
//!     Ok(())
//! }
//! ```

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::Stream;
use futures_io::AsyncRead;
use log::trace;
use pin_project_lite::pin_project;

use crate::compress::ZlibCompressor;
use crate::config::TranscodeConfig;
use crate::error::CodecError;
use crate::transcode::run_pipeline;

pin_project! {
    /// A stream of the byte chunks read from an async reader.
    ///
    /// Each successful read becomes one chunk of at most the configured
    /// size. The stream ends when the reader reports end of file and ends
    /// after yielding the first read error.
    pub struct ReadChunks<R> {
        #[pin]
        reader: R,
        buffer: Vec<u8>,
        total: u64,
        finished: bool,
    }
}

impl<R> ReadChunks<R> {
    /// Creates a chunk stream reading up to `chunk_size` bytes at a time.
    ///
    /// A `chunk_size` of zero is raised to one byte.
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            buffer: vec![0; chunk_size.max(1)],
            total: 0,
            finished: false,
        }
    }

    /// Returns the number of bytes read so far.
    pub fn bytes_read(&self) -> u64 {
        self.total
    }

    /// Consumes the stream and returns the reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: AsyncRead> Stream for ReadChunks<R> {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        if *this.finished {
            return Poll::Ready(None);
        }

        loop {
            match this.reader.as_mut().poll_read(cx, &mut this.buffer[..]) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Err(e)) if e.kind() == io::ErrorKind::Interrupted => continue,
                Poll::Ready(Err(e)) => {
                    *this.finished = true;
                    return Poll::Ready(Some(Err(e)));
                }
                Poll::Ready(Ok(0)) => {
                    *this.finished = true;
                    trace!("reader finished after {} bytes", this.total);
                    return Poll::Ready(None);
                }
                Poll::Ready(Ok(n)) => {
                    *this.total += n as u64;
                    return Poll::Ready(Some(Ok(Bytes::copy_from_slice(&this.buffer[..n]))));
                }
            }
        }
    }
}

/// Creates a stream of byte chunks from an async reader.
pub fn read_chunks<R: AsyncRead>(reader: R, chunk_size: usize) -> ReadChunks<R> {
    ReadChunks::new(reader, chunk_size)
}

/// Transcodes the Targa image read from `reader` into a PNG byte vector.
///
/// Runs on the calling task without spawning, so any executor can drive it.
///
/// # Errors
///
/// Returns [`CodecError::InvalidConfig`] for an invalid `config`,
/// [`CodecError::Io`] when reading fails and any decoding or compression
/// error of the image itself.
pub async fn transcode_async<R>(reader: R, config: TranscodeConfig) -> Result<Vec<u8>, CodecError>
where
    R: AsyncRead + Unpin,
{
    config.validate()?;

    let input = read_chunks(reader, config.read_chunk_size());
    let mut chunks: Vec<Bytes> = Vec::new();
    run_pipeline(input, &mut chunks, ZlibCompressor::from_config(&config)).await?;

    Ok(chunks.concat())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::png::PNG_SIGNATURE;
    use crate::targa::TargaHeader;
    use futures_util::StreamExt;

    fn tga(width: u16, height: u16) -> Vec<u8> {
        let mut data = TargaHeader::bgr24(width, height).to_bytes().to_vec();
        data.extend((0..usize::from(width) * usize::from(height) * 3).map(|i| i as u8));
        data
    }

    #[tokio::test]
    async fn test_read_chunks_sizes() {
        let data = [7u8; 10];
        let chunks: Vec<_> = read_chunks(&data[..], 4).collect().await;
        let sizes: Vec<usize> = chunks.into_iter().map(|c| c.unwrap().len()).collect();
        assert_eq!(sizes, vec![4, 4, 2]);
    }

    #[tokio::test]
    async fn test_read_chunks_counts_bytes() {
        let data = [1u8; 5];
        let mut stream = read_chunks(&data[..], 0);
        while stream.next().await.is_some() {}
        assert_eq!(stream.bytes_read(), 5);
    }

    #[tokio::test]
    async fn test_transcode_async() {
        let data = tga(3, 2);
        let config = TranscodeConfig::default().with_read_chunk_size(7);
        let png = transcode_async(&data[..], config).await.unwrap();

        assert_eq!(&png[..8], &PNG_SIGNATURE);
        assert_eq!(&png[png.len() - 8..png.len() - 4], b"IEND");
    }

    #[tokio::test]
    async fn test_transcode_async_invalid_config() {
        let data = tga(1, 1);
        let config = TranscodeConfig::default().with_read_chunk_size(0);
        assert!(matches!(
            transcode_async(&data[..], config).await,
            Err(CodecError::InvalidConfig { .. })
        ));
    }

    #[tokio::test]
    async fn test_transcode_async_truncated() {
        let data = tga(2, 2);
        let result = transcode_async(&data[..data.len() - 1], TranscodeConfig::default()).await;
        assert!(matches!(result, Err(CodecError::StreamClosed { missing: 1 })));
    }
}
