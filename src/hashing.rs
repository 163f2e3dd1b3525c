//! FNV-1a fingerprint primitives shared by the frontier and the duplicate
//! detector. Both functions are pure and bit-identical across platforms;
//! the durable URL store keys on these values, so they must never change.

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a 64-bit hash over a byte sequence.
pub fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// FNV-1a 64-bit hash of a string's UTF-8 encoding.
pub fn fnv1a_64_str(s: &str) -> u64 {
    fnv1a_64(s.as_bytes())
}

/// Number of differing bits between two 64-bit fingerprints.
pub fn hamming_distance(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv1a_reference_vectors() {
        // Published FNV-1a 64 test vectors.
        assert_eq!(fnv1a_64(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a_64(b"a"), 0xaf63_dc4c_8601_ec8c);
        assert_eq!(fnv1a_64(b"foobar"), 0x8594_4171_f739_67e8);
    }

    #[test]
    fn fnv1a_is_deterministic() {
        let url = "http://ics.uci.edu/about?x=1";
        assert_eq!(fnv1a_64_str(url), fnv1a_64_str(url));
        assert_ne!(fnv1a_64_str(url), fnv1a_64_str("http://ics.uci.edu/about"));
    }

    #[test]
    fn hamming_counts_bit_flips() {
        assert_eq!(hamming_distance(0, 0), 0);
        assert_eq!(hamming_distance(0, u64::MAX), 64);
        assert_eq!(hamming_distance(0b1011, 0b0010), 2);
        assert_eq!(hamming_distance(1 << 63, 0), 1);
    }
}
