//! Match-length quantization tables.
//!
//! A raw match length in [3, 256] is first rounded down to one of the 32
//! representable values {3..29, 35, 48, 72, 128, 256}. The short backref
//! encodings carry the quantized length directly; the 3-byte encoding stores
//! a 5-bit class index, mapped back through [`decode_length_class`].

/// Rounds a raw match length down to the nearest representable value.
/// Lengths below 3 map to 0, meaning "no match".
#[cfg(feature = "alloc")]
const LENGTH_QUANT: [u16; 257] = [
    0, 0, 0, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15,
    16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 29, 29,
    29, 29, 29, 35, 35, 35, 35, 35, 35, 35, 35, 35, 35, 35, 35, 35,
    48, 48, 48, 48, 48, 48, 48, 48, 48, 48, 48, 48, 48, 48, 48, 48,
    48, 48, 48, 48, 48, 48, 48, 48, 72, 72, 72, 72, 72, 72, 72, 72,
    72, 72, 72, 72, 72, 72, 72, 72, 72, 72, 72, 72, 72, 72, 72, 72,
    72, 72, 72, 72, 72, 72, 72, 72, 72, 72, 72, 72, 72, 72, 72, 72,
    72, 72, 72, 72, 72, 72, 72, 72, 72, 72, 72, 72, 72, 72, 72, 72,
    128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128,
    128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128,
    128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128,
    128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128,
    128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128,
    128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128,
    128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128,
    128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128, 128,
    256,
];

/// Maps a quantized length to its 5-bit class index. Entries below 3 are
/// unused (no match shorter than 3 bytes is ever encoded).
#[cfg(feature = "alloc")]
const LENGTH_ENCODE: [u8; 257] = [
    255, 255, 255, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12,
    13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 26, 26,
    26, 26, 26, 27, 27, 27, 27, 27, 27, 27, 27, 27, 27, 27, 27, 27,
    28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28,
    28, 28, 28, 28, 28, 28, 28, 28, 29, 29, 29, 29, 29, 29, 29, 29,
    29, 29, 29, 29, 29, 29, 29, 29, 29, 29, 29, 29, 29, 29, 29, 29,
    29, 29, 29, 29, 29, 29, 29, 29, 29, 29, 29, 29, 29, 29, 29, 29,
    29, 29, 29, 29, 29, 29, 29, 29, 29, 29, 29, 29, 29, 29, 29, 29,
    30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30,
    31,
];

/// Maps a 5-bit class index back to the quantized length.
const LENGTH_DECODE: [u16; 32] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18,
    19, 20, 21, 22, 23, 24, 25, 26, 27, 28, 29, 35, 48, 72, 128, 256,
];

#[cfg(feature = "alloc")]
pub(crate) fn quantize(raw_len: usize) -> usize {
    LENGTH_QUANT[raw_len] as usize
}

#[cfg(feature = "alloc")]
pub(crate) fn encode_length_class(quantized: usize) -> u8 {
    LENGTH_ENCODE[quantized]
}

pub(crate) fn decode_length_class(class: u8) -> usize {
    LENGTH_DECODE[(class & 0x1F) as usize] as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize_spot_values() {
        assert_eq!(quantize(0), 0);
        assert_eq!(quantize(1), 0);
        assert_eq!(quantize(2), 0);
        assert_eq!(quantize(3), 3);
        assert_eq!(quantize(29), 29);
        assert_eq!(quantize(30), 29);
        assert_eq!(quantize(34), 29);
        assert_eq!(quantize(35), 35);
        assert_eq!(quantize(47), 35);
        assert_eq!(quantize(48), 48);
        assert_eq!(quantize(71), 48);
        assert_eq!(quantize(72), 72);
        assert_eq!(quantize(127), 72);
        assert_eq!(quantize(128), 128);
        assert_eq!(quantize(255), 128);
        assert_eq!(quantize(256), 256);
    }

    #[test]
    fn test_quantize_never_exceeds_raw() {
        for n in 3..=256 {
            let q = quantize(n);
            assert!(q >= 3 && q <= n, "quantize({}) = {}", n, q);
        }
    }

    #[test]
    fn test_class_spot_values() {
        assert_eq!(encode_length_class(3), 0);
        assert_eq!(encode_length_class(29), 26);
        assert_eq!(encode_length_class(35), 27);
        assert_eq!(encode_length_class(48), 28);
        assert_eq!(encode_length_class(72), 29);
        assert_eq!(encode_length_class(128), 30);
        assert_eq!(encode_length_class(256), 31);
    }

    #[test]
    fn test_class_roundtrip() {
        // every length the quantizer can produce must survive the 5-bit class
        for n in 3..=256 {
            let q = quantize(n);
            assert_eq!(decode_length_class(encode_length_class(q)), q);
        }
    }
}
