//! Content fingerprints for raw response payloads.
//!
//! The fingerprint is FNV-1a with a 128-bit state, computed over the bytes
//! exactly as they were received. It detects "the reply changed", not
//! semantic equality: reordering keys or reformatting whitespace yields a
//! different value.

const FNV128_OFFSET_BASIS: u128 = 0x6c62_272e_07bb_0142_62b8_2175_6295_c58d;
const FNV128_PRIME: u128 = 0x0000_0000_0100_0000_0000_0000_0000_013b;

/// Hash bytes with FNV-1a/128.
pub fn fnv128a(bytes: &[u8]) -> u128 {
    let mut hash = FNV128_OFFSET_BASIS;
    for &b in bytes {
        hash ^= u128::from(b);
        hash = hash.wrapping_mul(FNV128_PRIME);
    }
    hash
}

/// Hash bytes with FNV-1a/128 and render the digest as 32 lowercase hex digits.
pub fn fnv128a_hex(bytes: &[u8]) -> String {
    format!("{:032x}", fnv128a(bytes))
}
