//! # Checksum Function
//!
//! Single-character base-36 check digit over an uppercase alphanumeric
//! payload. Each character maps to its index in `0-9A-Z`; the check value is
//! the position-weighted sum (1-indexed) modulo 36.
//!
//! The schema normalizes every field to uppercase alphanumerics before this
//! is called. Characters outside the alphabet contribute nothing.

/// The 36-character check alphabet.
pub const ALPHABET: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Compute the check character for `payload`.
///
/// ```
/// use sfid_core::checksum::checksum;
///
/// // 1*1 + 2*2 + 3*3 = 14 -> 'E'
/// assert_eq!(checksum("123"), 'E');
/// ```
pub fn checksum(payload: &str) -> char {
    let total = payload
        .bytes()
        .zip(1usize..)
        .fold(0usize, |acc, (byte, position)| {
            (acc + position * char_value(byte)) % 36
        });
    char::from(ALPHABET[total])
}

/// Map an alphabet byte to its value 0-35; anything else maps to 0.
fn char_value(byte: u8) -> usize {
    match byte {
        b'0'..=b'9' => usize::from(byte - b'0'),
        b'A'..=b'Z' => usize::from(byte - b'A') + 10,
        _ => 0,
    }
}
