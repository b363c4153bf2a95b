//! Cursor-addressed byte buffers.
//!
//! - [`ByteBuffer`] - Fixed-capacity region with `position`/`limit` cursors,
//!   typed reads and writes, and a CRC-32 over the unread bytes
//!
//! The PNG encoder stages chunk bodies in a [`ByteBuffer`] before framing
//! them.

mod cursor;

pub use cursor::{ByteBuffer, DEFAULT_CAPACITY};
