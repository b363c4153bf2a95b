//! Session lifecycle around the background pipeline.

use std::fmt;
use std::future::poll_fn;
use std::pin::Pin;

use bytes::Bytes;
use futures_core::Stream;
use log::{debug, warn};
use tokio::task::JoinHandle;

use super::run_pipeline;
use crate::compress::Compressor;
use crate::error::CodecError;
use crate::queue::{BridgeQueue, QueueStream};

/// Lifecycle of a [`Transcoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscoderState {
    /// Constructed, not started.
    Idle,
    /// Accepting input chunks; the pipeline is running.
    Running,
    /// The pipeline completed or failed.
    Finished,
}

impl TranscoderState {
    fn as_str(&self) -> &'static str {
        match self {
            TranscoderState::Idle => "idle",
            TranscoderState::Running => "running",
            TranscoderState::Finished => "finished",
        }
    }
}

impl fmt::Display for TranscoderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One Targa to PNG transcoding session driven by chunk callbacks.
///
/// The surrounding transport calls [`on_start`](Self::on_start) once, then
/// [`on_chunk`](Self::on_chunk) for every input chunk and finally
/// [`on_finish`](Self::on_finish). The pipeline runs as a tokio task and
/// pulls input on demand; PNG chunks appear on [`output`](Self::output) as
/// soon as they are produced.
///
/// On success the output stream ends normally. On failure it yields a
/// [`CodecError::Rejected`] carrying the error message, and `on_finish`
/// returns the original error. Output already emitted is not retracted.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use futures_util::StreamExt;
/// use tgapng::{TargaHeader, Transcoder, ZlibCompressor};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), tgapng::CodecError> {
/// let mut transcoder = Transcoder::new(ZlibCompressor::default());
/// let mut output = transcoder.output();
///
/// transcoder.on_start()?;
/// transcoder.on_chunk(Bytes::copy_from_slice(&TargaHeader::bgr24(1, 1).to_bytes()))?;
/// transcoder.on_chunk(Bytes::from_static(&[0x00, 0x00, 0xFF]))?;
/// transcoder.on_finish().await?;
///
/// let mut png = Vec::new();
/// while let Some(chunk) = output.next().await {
///     png.extend_from_slice(&chunk?);
/// }
/// assert_eq!(&png[1..4], b"PNG");
/// # Ok(())
/// # }
/// ```
pub struct Transcoder<C> {
    state: TranscoderState,
    input: BridgeQueue<Bytes>,
    output: BridgeQueue<Bytes>,
    compressor: Option<C>,
    task: Option<JoinHandle<Result<(), CodecError>>>,
    bytes_in: u64,
}

impl<C> Transcoder<C>
where
    C: Compressor + Send + 'static,
{
    /// Creates an idle session that compresses image data with `compressor`.
    pub fn new(compressor: C) -> Self {
        Self {
            state: TranscoderState::Idle,
            input: BridgeQueue::new(),
            output: BridgeQueue::new(),
            compressor: Some(compressor),
            task: None,
            bytes_in: 0,
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> TranscoderState {
        self.state
    }

    /// Returns the number of input bytes accepted so far.
    pub fn bytes_in(&self) -> u64 {
        self.bytes_in
    }

    /// Returns a stream of the PNG output chunks.
    ///
    /// Every call returns a handle to the same output; each chunk is
    /// delivered to exactly one pull.
    pub fn output(&self) -> QueueStream<Bytes> {
        self.output.stream()
    }

    /// Launches the pipeline on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime.
    pub fn on_start(&mut self) -> Result<(), CodecError> {
        self.expect_state(TranscoderState::Idle)?;
        let compressor = self.compressor.take().ok_or(CodecError::InvalidState {
            expected: "idle",
            actual: "started",
        })?;

        let input = self.input.clone();
        let output = self.output.clone();
        self.task = Some(tokio::spawn(async move {
            let result = run_pipeline(input.stream(), output.clone(), compressor).await;
            match &result {
                Ok(()) => output.flush(),
                Err(e) => {
                    warn!("transcode failed: {}", e);
                    // Nothing reads the input anymore
                    input.force_terminate(None);
                    output.reject(e.to_string());
                }
            }
            result
        }));

        self.transition(TranscoderState::Running);
        Ok(())
    }

    /// Forwards an input chunk to the pipeline. Never blocks.
    ///
    /// Fails with [`CodecError::AlreadyFlushed`] once the pipeline has
    /// stopped reading, including after it failed.
    pub fn on_chunk(&mut self, chunk: Bytes) -> Result<(), CodecError> {
        self.expect_state(TranscoderState::Running)?;
        self.bytes_in += chunk.len() as u64;
        self.input.enqueue(chunk)
    }

    /// Signals the end of input and waits for the pipeline to complete.
    ///
    /// Returns the pipeline's error if it failed.
    pub async fn on_finish(&mut self) -> Result<(), CodecError> {
        self.expect_state(TranscoderState::Running)?;
        self.input.flush();

        let result = match self.task.take() {
            Some(task) => match task.await {
                Ok(result) => result,
                Err(e) => {
                    let err = CodecError::TaskFailed(e.to_string());
                    self.output.reject(err.to_string());
                    Err(err)
                }
            },
            None => Err(CodecError::InvalidState {
                expected: "running",
                actual: "detached",
            }),
        };

        self.transition(TranscoderState::Finished);
        debug!("session finished after {} input bytes", self.bytes_in);
        result
    }

    /// Terminates the input early.
    ///
    /// The pipeline sees the end of the stream on its next read and fails
    /// with [`CodecError::StreamClosed`]; `on_finish` still has to be called
    /// to collect that result.
    pub fn cancel(&self) {
        self.input.force_terminate(None);
    }

    fn expect_state(&self, expected: TranscoderState) -> Result<(), CodecError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(CodecError::InvalidState {
                expected: expected.as_str(),
                actual: self.state.as_str(),
            })
        }
    }

    fn transition(&mut self, next: TranscoderState) {
        debug!("transcoder {} -> {}", self.state, next);
        self.state = next;
    }
}

impl<C> Drop for Transcoder<C> {
    fn drop(&mut self) {
        // Let a still running pipeline observe the end of input and exit
        if self.state == TranscoderState::Running {
            self.input.force_terminate(None);
        }
    }
}

impl<C> fmt::Debug for Transcoder<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transcoder")
            .field("state", &self.state)
            .field("bytes_in", &self.bytes_in)
            .field("input", &self.input)
            .field("output", &self.output)
            .finish()
    }
}

/// Runs a whole session over an in-memory chunk sequence and collects the
/// PNG output chunks.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use tgapng::{TargaHeader, ZlibCompressor, transcode_chunks};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), tgapng::CodecError> {
/// let mut tga = TargaHeader::bgr24(2, 1).to_bytes().to_vec();
/// tga.extend_from_slice(&[255, 0, 0, 0, 0, 255]);
///
/// let chunks = tga.chunks(5).map(Bytes::copy_from_slice);
/// let png: Vec<u8> = transcode_chunks(chunks, ZlibCompressor::default()).await?.concat();
/// assert_eq!(&png[12..16], b"IHDR");
/// # Ok(())
/// # }
/// ```
pub async fn transcode_chunks<I, C>(chunks: I, compressor: C) -> Result<Vec<Bytes>, CodecError>
where
    I: IntoIterator<Item = Bytes>,
    C: Compressor + Send + 'static,
{
    let mut transcoder = Transcoder::new(compressor);
    let mut output = transcoder.output();

    transcoder.on_start()?;
    for chunk in chunks {
        transcoder.on_chunk(chunk)?;
    }
    transcoder.on_finish().await?;

    let mut collected = Vec::new();
    while let Some(chunk) = poll_fn(|cx| Pin::new(&mut output).poll_next(cx)).await {
        collected.push(chunk?);
    }
    Ok(collected)
}
