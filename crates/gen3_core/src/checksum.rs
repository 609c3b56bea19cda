//! Sector checksum: a 32-bit wrapping sum of little-endian words folded
//! into 16 bits, matching the console's save routine.

pub fn checksum(payload: &[u8]) -> u16 {
    let mut sum = 0u32;
    let mut words = payload.chunks_exact(4);
    for word in &mut words {
        sum = sum.wrapping_add(u32::from_le_bytes([word[0], word[1], word[2], word[3]]));
    }

    let rest = words.remainder();
    if !rest.is_empty() {
        let mut tail = [0u8; 4];
        tail[..rest.len()].copy_from_slice(rest);
        sum = sum.wrapping_add(u32::from_le_bytes(tail));
    }

    fold(sum)
}

fn fold(sum: u32) -> u16 {
    ((sum >> 16) as u16).wrapping_add(sum as u16)
}

/// Checks `stored` against the checksum of `data[..payload_len]`.
/// A length past the end of `data` never verifies.
pub fn verify(data: &[u8], payload_len: usize, stored: u16) -> bool {
    data.get(..payload_len)
        .is_some_and(|payload| checksum(payload) == stored)
}

/// Shortest prefix of `data` whose checksum equals `stored`, found in one
/// running pass over every length from 1 to `data.len()`.
pub fn matching_prefix_len(data: &[u8], stored: u16) -> Option<usize> {
    let mut sum = 0u32;
    for (word_index, chunk) in data.chunks(4).enumerate() {
        let mut word = [0u8; 4];
        for (i, &byte) in chunk.iter().enumerate() {
            word[i] = byte;
            if fold(sum.wrapping_add(u32::from_le_bytes(word))) == stored {
                return Some(word_index * 4 + i + 1);
            }
        }
        sum = sum.wrapping_add(u32::from_le_bytes(word));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::{checksum, matching_prefix_len, verify};

    #[test]
    fn folds_carry_into_low_half() {
        // 0xFFFF_FFFF + 0x0000_0002 wraps to 1; fold(1) == 1.
        let mut payload = Vec::new();
        payload.extend_from_slice(&0xFFFF_FFFFu32.to_le_bytes());
        payload.extend_from_slice(&2u32.to_le_bytes());
        assert_eq!(checksum(&payload), 1);

        // 0x0001_FFFF folds to 0x0001 + 0xFFFF = 0x10000 -> 0.
        assert_eq!(checksum(&0x0001_FFFFu32.to_le_bytes()), 0);
        assert_eq!(checksum(&0x1234_0001u32.to_le_bytes()), 0x1235);
    }

    #[test]
    fn empty_payload_is_zero() {
        assert_eq!(checksum(&[]), 0);
    }

    #[test]
    fn verify_rejects_out_of_bounds_length() {
        let data = [1u8, 0, 0, 0];
        assert!(verify(&data, 4, 1));
        assert!(!verify(&data, 8, 1));
    }

    #[test]
    fn prefix_scan_finds_the_covered_length() {
        let data: Vec<u8> = (1..=40u8).collect();
        for len in [3, 4, 17, 40] {
            let found = matching_prefix_len(&data, checksum(&data[..len])).expect("length");
            assert_eq!(checksum(&data[..found]), checksum(&data[..len]));
            assert!(found <= len);
        }
        assert_eq!(matching_prefix_len(&[0x01, 0, 0, 0], 0x7777), None);
    }
}
