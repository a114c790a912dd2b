use crate::charset::encode_char;
use crate::{EOT_BYTE, EOT_REPEAT, SYNC_BYTE, SYNC_REPEAT};

/// Append the 8 bits of `byte`, MSB first
pub fn push_byte(bits: &mut Vec<bool>, byte: u8) {
    for i in (0..8).rev() {
        bits.push((byte >> i) & 1 == 1);
    }
}

/// Read up to 8 bits as a big-endian byte
pub fn bits_to_byte<'a, I>(bits: I) -> u8
where
    I: IntoIterator<Item = &'a bool>,
{
    bits.into_iter()
        .take(8)
        .fold(0u8, |acc, &bit| (acc << 1) | bit as u8)
}

/// Serialize text into the transmitted bit stream:
/// SYNC x3, one code per character, EOT x3, then zero bits until the length
/// is a multiple of `track_count`.
///
/// Empty text yields an empty stream.
pub fn build_bits(text: &str, track_count: usize) -> Vec<bool> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut bits = Vec::with_capacity((SYNC_REPEAT + text.len() + EOT_REPEAT) * 8 + track_count);
    for _ in 0..SYNC_REPEAT {
        push_byte(&mut bits, SYNC_BYTE);
    }
    for c in text.chars() {
        push_byte(&mut bits, encode_char(c));
    }
    for _ in 0..EOT_REPEAT {
        push_byte(&mut bits, EOT_BYTE);
    }

    if track_count > 1 {
        let remainder = bits.len() % track_count;
        if remainder != 0 {
            bits.resize(bits.len() + track_count - remainder, false);
        }
    }

    bits
}

/// Number of bits `build_bits` produces without building them
pub fn frame_bit_len(text: &str, track_count: usize) -> usize {
    if text.is_empty() {
        return 0;
    }
    let raw = (SYNC_REPEAT + text.chars().count() + EOT_REPEAT) * 8;
    let track_count = track_count.max(1);
    raw.div_ceil(track_count) * track_count
}

/// Distribute bits round-robin: track `i` carries bits `i, i+T, i+2T, ...`
pub fn split_tracks(bits: &[bool], track_count: usize) -> Vec<Vec<bool>> {
    (0..track_count)
        .map(|track| bits.iter().skip(track).step_by(track_count).copied().collect())
        .collect()
}
