//! Decoding of the backing record.
//!
//! The record holds the decimal form of the count. Anything that does not
//! decode to a non-negative integer is treated as an uninitialized counter.

/// Value reported for missing, empty, or corrupt records.
pub const DEFAULT_COUNT: u64 = 0;

/// Parse record bytes into a count, falling back to [`DEFAULT_COUNT`].
///
/// Surrounding whitespace is ignored. Non-UTF-8 input, signs, fractions and
/// values that overflow `u64` all yield the default.
pub fn parse_or_default(bytes: &[u8]) -> u64 {
    let Ok(s) = std::str::from_utf8(bytes) else {
        return DEFAULT_COUNT;
    };
    let s = s.trim();
    // `u64::from_str` accepts a leading '+'; the record format does not.
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return DEFAULT_COUNT;
    }
    s.parse::<u64>().unwrap_or(DEFAULT_COUNT)
}

/// Encode a count as record bytes.
pub(crate) fn encode(count: u64) -> String {
    count.to_string()
}
