//! Rolling subtraction checksum for sector and payload validation
//!
//! The checksum is the accumulated difference of the little-endian 32-bit
//! words of a byte range, starting from zero. It detects accidental
//! corruption (a flipped bit always changes the result) but is not a
//! cryptographic integrity check.

/// Word size the checksum operates on
pub const WORD_SIZE: usize = 4;

/// Calculate the checksum of `data`
///
/// Only whole words are processed; a trailing partial word is ignored.
/// Callers that need it covered must pad to a word boundary first (see
/// [`checksum_padded`]).
///
/// # Example
///
/// ```
/// use sprinkler_core::checksum::checksum;
///
/// assert_eq!(checksum(&[]), 0);
/// assert_eq!(checksum(&1u32.to_le_bytes()), u32::MAX);
/// ```
pub fn checksum(data: &[u8]) -> u32 {
    data.chunks_exact(WORD_SIZE).fold(0u32, |acc, word| {
        acc.wrapping_sub(u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
    })
}

/// Calculate the checksum of `data`, zero-filling the trailing partial word
///
/// Used for payloads whose length is not a multiple of the word size.
pub fn checksum_padded(data: &[u8]) -> u32 {
    let whole = data.len() - data.len() % WORD_SIZE;
    let acc = checksum(&data[..whole]);

    let tail = &data[whole..];
    if tail.is_empty() {
        return acc;
    }

    let mut word = [0u8; WORD_SIZE];
    word[..tail.len()].copy_from_slice(tail);
    acc.wrapping_sub(u32::from_le_bytes(word))
}

/// Validate `data` against an expected checksum
pub fn validate_checksum(data: &[u8], expected: u32) -> bool {
    checksum(data) == expected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_known_values() {
        let test_cases: [(&[u8], u32); 4] = [
            (&[], 0),
            (&[1, 0, 0, 0], 0xFFFF_FFFF),
            (&[1, 0, 0, 0, 2, 0, 0, 0], 0xFFFF_FFFD),
            (&[0xFF, 0xFF, 0xFF, 0xFF], 1),
        ];

        for (data, expected) in test_cases {
            assert_eq!(checksum(data), expected);
        }
    }

    #[test]
    fn test_checksum_ignores_partial_word() {
        assert_eq!(checksum(&[5, 0, 0, 0, 0xAA]), checksum(&[5, 0, 0, 0]));
    }

    #[test]
    fn test_checksum_padded_covers_tail() {
        let data = [5, 0, 0, 0, 0xAA];
        assert_eq!(checksum_padded(&data), checksum(&[5, 0, 0, 0, 0xAA, 0, 0, 0]));
        assert_ne!(checksum_padded(&data), checksum(&data));

        // Aligned input is unaffected by padding
        assert_eq!(checksum_padded(&[1, 2, 3, 4]), checksum(&[1, 2, 3, 4]));
    }

    #[test]
    fn test_checksum_detects_single_bit_flip() {
        let mut data = [0x5Au8; 64];
        let expected = checksum(&data);

        for byte in 0..data.len() {
            for bit in 0..8 {
                data[byte] ^= 1 << bit;
                assert!(!validate_checksum(&data, expected));
                data[byte] ^= 1 << bit;
            }
        }

        assert!(validate_checksum(&data, expected));
    }

    #[test]
    fn test_erased_sector_checksum() {
        // 1023 erased words: -(1023 * 0xFFFFFFFF) == 1023
        let erased = [0xFFu8; 4092];
        assert_eq!(checksum(&erased), 1023);
    }
}
