//! Display-safe fingerprint of a sensitive identifier.
//!
//! This is a 31-multiplier rolling hash over UTF-16 code units with 32-bit
//! wraparound, rendered as the hex of its absolute value. It masks the raw
//! identifier on screen and nothing more: collisions are expected and the
//! input is trivially brute-forced from the output.

/// Fingerprint `raw` into a short lowercase hex token. Empty input is `"0"`.
#[must_use]
pub fn fingerprint(raw: &str) -> String {
    let hash = raw
        .encode_utf16()
        .fold(0i32, |hash, unit| {
            hash.wrapping_mul(31).wrapping_add(i32::from(unit))
        });

    format!("{:x}", hash.unsigned_abs())
}
