//! Conversions for character buffers filled by native calls.

use alloc::{string::String, vec::Vec};
use core::ffi::c_char;

/// Converts a buffer of C characters into a [`String`].
///
/// The buffer ends at the first null terminator, if any. Invalid
/// UTF-8 is replaced with `U+FFFD`.
///
/// ```rust
/// use core::ffi::c_char;
///
/// use handlegen_core::text::from_c_chars;
///
/// let buf: [c_char; 4] = [b'x' as _, b'r' as _, 0, b'!' as _];
/// assert_eq!(from_c_chars(&buf), "xr");
/// ```
pub fn from_c_chars(buf: &[c_char]) -> String {
    let end = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    #[allow(clippy::cast_sign_loss, reason = "`c_char` is a byte")]
    let bytes = buf[..end].iter().map(|&c| c as u8).collect::<Vec<u8>>();
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}
