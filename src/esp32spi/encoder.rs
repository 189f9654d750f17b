//! Wire byte order helpers
//!
//! Display controllers take command and colour words most significant byte
//! first. These helpers produce that order on any host.

/// `value` as two bytes, MSB first
pub const fn encode16(value: u16) -> [u8; 2] {
    value.to_be_bytes()
}

/// `value` as four bytes, MSB first
pub const fn encode32(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

pub const fn decode16(bytes: [u8; 2]) -> u16 {
    u16::from_be_bytes(bytes)
}

pub const fn decode32(bytes: [u8; 4]) -> u32 {
    u32::from_be_bytes(bytes)
}

/// Encode as many whole words of `words` as fit into `out`.
///
/// Returns the number of words consumed; `out` receives twice as many bytes.
pub fn encode_words16_into(words: &[u16], out: &mut [u8]) -> usize {
    let mut count = 0;
    for (chunk, word) in out.chunks_exact_mut(2).zip(words) {
        chunk.copy_from_slice(&encode16(*word));
        count += 1;
    }
    count
}

/// Low `bits` bits of `word` left-aligned in a four byte buffer, MSB first.
///
/// This is the layout the SPI unit expects for frames that are not a whole
/// number of bytes: it clocks out the first `bits` bits of the buffer. `None`
/// when `bits` is outside `1..=32`.
pub const fn encode_frame(word: u32, bits: u8) -> Option<[u8; 4]> {
    if bits == 0 || bits > 32 {
        return None;
    }
    let mask = if bits == 32 { u32::MAX } else { (1 << bits) - 1 };
    Some(((word & mask) << (32 - bits)).to_be_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msb_first() {
        assert_eq!(encode16(0x1234), [0x12, 0x34]);
        assert_eq!(encode32(0xAABB_CCDD), [0xAA, 0xBB, 0xCC, 0xDD]);
        assert_eq!(decode16([0xF8, 0x00]), 0xF800);
        assert_eq!(decode32([0xDE, 0xAD, 0xBE, 0xEF]), 0xDEAD_BEEF);
    }

    #[test]
    fn words_stop_at_the_shorter_side() {
        let mut out = [0u8; 5];
        let used = encode_words16_into(&[0x0102, 0x0304, 0x0506], &mut out);
        assert_eq!(used, 2);
        assert_eq!(out, [0x01, 0x02, 0x03, 0x04, 0x00]);

        let mut out = [0u8; 8];
        assert_eq!(encode_words16_into(&[0xABCD], &mut out), 1);
        assert_eq!(&out[..2], &[0xAB, 0xCD]);
    }

    #[test]
    fn nine_bit_frame_is_left_aligned() {
        // D/C flag 1, then 0x2A
        assert_eq!(encode_frame(0x12A, 9), Some([0x95, 0x00, 0x00, 0x00]));
        assert_eq!(encode_frame(0x02A, 9), Some([0x15, 0x00, 0x00, 0x00]));
        // bits above the frame width are dropped
        assert_eq!(encode_frame(0xFFFF_F12A, 9), Some([0x95, 0x00, 0x00, 0x00]));
    }

    #[test]
    fn frame_width_limits() {
        assert_eq!(encode_frame(1, 1), Some([0x80, 0, 0, 0]));
        assert_eq!(encode_frame(0xDEAD_BEEF, 32), Some([0xDE, 0xAD, 0xBE, 0xEF]));
        assert_eq!(encode_frame(0x1FF, 0), None);
        assert_eq!(encode_frame(0x1FF, 33), None);
    }
}
