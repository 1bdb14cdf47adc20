/// 32-bit rolling hash over the UTF-16 code units of `input`.
///
/// For each code unit `c`: `h = ((h << 5) - h) + c`, truncated to a signed
/// 32-bit integer at every step. Empty input hashes to 0. The result is
/// stable bit-for-bit across platforms; fingerprints derived from it are
/// treated as opaque by everything downstream.
pub fn content_fingerprint(input: &str) -> i32 {
    let mut hash: i32 = 0;
    for unit in input.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit));
    }
    hash
}

/// Decimal rendering of [`content_fingerprint`], possibly negative.
pub fn fingerprint_string(input: &str) -> String {
    content_fingerprint(input).to_string()
}
