//! Error types for tgapng.

use std::fmt;

/// The cursor operation that ran into a buffer limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Reading bytes at the cursor.
    Reading,
    /// Writing bytes at the cursor.
    Writing,
    /// Advancing the cursor without touching memory.
    Skipping,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Reading => "reading",
            Operation::Writing => "writing",
            Operation::Skipping => "skipping",
        })
    }
}

/// Errors that can occur while decoding, encoding or transcoding.
#[derive(Debug)]
pub enum CodecError {
    /// A read, write or skip would cross the buffer's limit.
    LimitExceeded {
        /// The limit of the buffer at the time of the call.
        limit: usize,
        /// The number of bytes the call needed.
        requested: usize,
        /// What the call was doing.
        operation: Operation,
    },

    /// A write was attempted on a read-only buffer.
    ReadOnly,

    /// An item was enqueued after the queue had been flushed.
    AlreadyFlushed,

    /// A pending pull was rejected with an out-of-band failure.
    Rejected(String),

    /// The chunk source ended before enough bytes arrived.
    StreamClosed {
        /// How many bytes were still missing.
        missing: usize,
    },

    /// The Targa image type byte is not a known image type.
    IllegalImageType(u8),

    /// The Targa image is valid but outside the supported subset.
    Unsupported(&'static str),

    /// A PNG chunk payload does not fit into the length field.
    ChunkTooLarge {
        /// The actual size that was attempted.
        actual: usize,
        /// The maximum allowed size.
        max: usize,
    },

    /// The compressor reported a failure.
    Compressor(String),

    /// Invalid configuration parameter.
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// A transcoder lifecycle call was made in the wrong state.
    InvalidState {
        /// The state the call requires.
        expected: &'static str,
        /// The state the transcoder was in.
        actual: &'static str,
    },

    /// An I/O error occurred while reading input data.
    Io(std::io::Error),

    /// The background pipeline task did not run to completion.
    TaskFailed(String),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::LimitExceeded {
                limit,
                requested,
                operation,
            } => write!(
                f,
                "reached limit of {} bytes while {} {} bytes",
                limit, operation, requested
            ),
            CodecError::ReadOnly => write!(f, "cannot write to a read-only buffer"),
            CodecError::AlreadyFlushed => write!(
                f,
                "cannot enqueue value as queue has already been flushed"
            ),
            CodecError::Rejected(reason) => write!(f, "pull rejected: {}", reason),
            CodecError::StreamClosed { missing } => write!(
                f,
                "cannot read {} bytes of data because stream is closed",
                missing
            ),
            CodecError::IllegalImageType(ty) => write!(f, "found illegal image type: {}", ty),
            CodecError::Unsupported(message) => write!(f, "unsupported format: {}", message),
            CodecError::ChunkTooLarge { actual, max } => {
                write!(f, "chunk too large: {} bytes (max {})", actual, max)
            }
            CodecError::Compressor(message) => write!(f, "compressor error: {}", message),
            CodecError::InvalidConfig { message } => {
                write!(f, "invalid config: {}", message)
            }
            CodecError::InvalidState { expected, actual } => write!(
                f,
                "invalid transcoder state: expected {}, found {}",
                expected, actual
            ),
            CodecError::Io(e) => write!(f, "io error: {}", e),
            CodecError::TaskFailed(message) => write!(f, "pipeline task failed: {}", message),
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CodecError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CodecError {
    fn from(e: std::io::Error) -> Self {
        CodecError::Io(e)
    }
}
