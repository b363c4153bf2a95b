//! CRC-32 as used by PNG chunk framing.
//!
//! The lookup table is built at compile time from the reflected polynomial
//! `0xEDB88320` and shared by every checksum computation.

/// Precomputed CRC-32 lookup table.
pub const CRC_TABLE: [u32; 256] = build_table();

const fn build_table() -> [u32; 256] {
    let mut table = [0_u32; 256];
    let mut n = 0;
    while n < 256 {
        let mut c = n as u32;
        let mut k = 0;
        while k < 8 {
            if (c & 1) != 0 {
                c = 0xEDB8_8320 ^ (c >> 1);
            } else {
                c >>= 1;
            }
            k += 1;
        }
        table[n] = c;
        n += 1;
    }
    table
}

/// Folds `bytes` into a running (non-complemented) CRC register.
///
/// Start with `u32::MAX` and complement the final value, or use [`crc32`]
/// for one-shot computation.
#[inline]
pub fn crc32_update(mut crc: u32, bytes: &[u8]) -> u32 {
    for &byte in bytes {
        crc = (crc >> 8) ^ CRC_TABLE[((crc ^ u32::from(byte)) & 0xFF) as usize];
    }
    crc
}

/// Computes the CRC-32 of `bytes`.
///
/// # Example
///
/// ```
/// assert_eq!(tgapng::crc32(&[]), 0);
/// assert_eq!(tgapng::crc32(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]), 622_876_539);
/// ```
#[inline]
pub fn crc32(bytes: &[u8]) -> u32 {
    crc32_update(u32::MAX, bytes) ^ u32::MAX
}
