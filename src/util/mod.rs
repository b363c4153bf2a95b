//! Internal utility functions and helpers.
//!
//! This module contains small helper functions used throughout the crate.
//! It is an implementation detail and not part of the public API.

use bytes::{BufMut, Bytes, BytesMut};

/// Appends `b` to the unread bytes `a`.
///
/// Used when the reader's window runs short and a newly pulled chunk has to
/// be joined with the leftover tail. Either side being empty costs no copy.
pub(crate) fn combine_bytes(a: Bytes, b: Bytes) -> Bytes {
    if b.is_empty() {
        return a;
    }
    if a.is_empty() {
        return b;
    }
    let mut combined = BytesMut::with_capacity(a.len() + b.len());
    combined.put(a);
    combined.put(b);
    combined.freeze()
}

/// Swaps the first and third byte of every 3-byte pixel in place.
///
/// Turns BGR triples into RGB triples and back. A trailing partial pixel is
/// left alone.
pub(crate) fn swap_red_blue(pixels: &mut [u8]) {
    for pixel in pixels.chunks_exact_mut(3) {
        pixel.swap(0, 2);
    }
}
