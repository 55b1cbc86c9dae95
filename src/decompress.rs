use core::fmt;

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

use crate::tables;
use crate::util::{read_u32_be, DECODED_SIZE_OFFSET, HEADER_SIZE, MAGIC};

/// Decompression errors
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecompressError {
    /// The input ended before the stream did.
    InputTruncated,
    /// The container does not start with the expected magic tag.
    BadMagic,
    /// The output buffer is smaller than the size the header declares, or a
    /// corrupt stream produced more data than declared.
    OutputTooSmall,
    /// A backref points before the start of the output.
    InvalidBackreference,
    /// The output buffer could not be allocated.
    AllocationFailed,
    /// A block container's offset table or block contents are inconsistent.
    InvalidBlockLayout,
}

impl fmt::Display for DecompressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecompressError::InputTruncated => write!(f, "input was truncated"),
            DecompressError::BadMagic => write!(f, "bad magic tag"),
            DecompressError::OutputTooSmall => write!(f, "output buffer was insufficient"),
            DecompressError::InvalidBackreference => write!(f, "invalid backreference"),
            DecompressError::AllocationFailed => write!(f, "output allocation failed"),
            DecompressError::InvalidBlockLayout => write!(f, "inconsistent block layout"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecompressError {}

/// Replays `len` bytes from `dist` back in the already-decoded output.
///
/// The copy must run forward one byte at a time: when `dist < len` the
/// source overlaps the destination, which is how runs are extended.
fn copy_backref(
    outp: &mut [u8],
    dst: usize,
    dist: usize,
    len: usize,
) -> Result<usize, DecompressError> {
    if dist == 0 || dist > dst {
        return Err(DecompressError::InvalidBackreference);
    }
    if len > outp.len() - dst {
        return Err(DecompressError::OutputTooSmall);
    }
    for i in 0..len {
        outp[dst + i] = outp[dst - dist + i];
    }
    Ok(dst + len)
}

/// Decompress a single-stream container into a preallocated buffer.
///
/// The buffer must be at least as large as the size declared in the header.
/// Returns the decoded size.
pub fn decompress_to_buf(inp: &[u8], outp: &mut [u8]) -> Result<usize, DecompressError> {
    if inp.len() < HEADER_SIZE {
        return Err(DecompressError::InputTruncated);
    }
    if inp[..4] != MAGIC {
        return Err(DecompressError::BadMagic);
    }
    if outp.len() < read_u32_be(&inp[DECODED_SIZE_OFFSET..]) as usize {
        return Err(DecompressError::OutputTooSmall);
    }

    let mut src = HEADER_SIZE;
    let mut dst = 0;

    loop {
        let symbol = *inp.get(src).ok_or(DecompressError::InputTruncated)?;
        src += 1;

        match symbol >> 6 {
            0 => {
                let len = (symbol & 0x3F) as usize + 1;
                let lits = inp
                    .get(src..src + len)
                    .ok_or(DecompressError::InputTruncated)?;
                outp.get_mut(dst..dst + len)
                    .ok_or(DecompressError::OutputTooSmall)?
                    .copy_from_slice(lits);
                src += len;
                dst += len;
            }
            1 => {
                let dist = (symbol & 0x1F) as usize;
                if dist == 0 {
                    // end-of-stream sentinel
                    return Ok(dst);
                }
                let len = 3 + ((symbol >> 5) & 0x01) as usize;
                dst = copy_backref(outp, dst, dist, len)?;
            }
            2 => {
                let lo = *inp.get(src).ok_or(DecompressError::InputTruncated)? as usize;
                src += 1;
                let len = 3 + ((symbol >> 3) & 0x07) as usize;
                let dist = ((symbol & 0x07) as usize) << 8 | lo;
                dst = copy_backref(outp, dst, dist, len)?;
            }
            _ => {
                let hi = *inp.get(src).ok_or(DecompressError::InputTruncated)? as usize;
                let lo = *inp.get(src + 1).ok_or(DecompressError::InputTruncated)? as usize;
                src += 2;
                let len = tables::decode_length_class((symbol >> 1) & 0x1F);
                let dist = ((symbol & 0x01) as usize) << 16 | hi << 8 | lo;
                dst = copy_backref(outp, dst, dist, len)?;
            }
        }
    }
}

/// Decompress a single-stream container into a [Vec](alloc::vec::Vec) sized
/// from the header's declared size.
#[cfg(feature = "alloc")]
pub fn decompress_to_vec(inp: &[u8]) -> Result<alloc::vec::Vec<u8>, DecompressError> {
    if inp.len() < HEADER_SIZE {
        return Err(DecompressError::InputTruncated);
    }
    let declared = crate::util::decoded_size(inp).ok_or(DecompressError::BadMagic)? as usize;

    let mut out = alloc::vec::Vec::new();
    out.try_reserve_exact(declared)
        .map_err(|_| DecompressError::AllocationFailed)?;
    out.resize(declared, 0);

    let size = decompress_to_buf(inp, &mut out)?;
    out.truncate(size);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_validation() {
        let mut out = [0u8; 16];
        assert_eq!(
            decompress_to_buf(b"FC8_\x00\x00\x00", &mut out),
            Err(DecompressError::InputTruncated)
        );
        assert_eq!(
            decompress_to_buf(b"LZG_\x00\x00\x00\x00\x40", &mut out),
            Err(DecompressError::BadMagic)
        );
        // declared size exceeds the buffer
        assert_eq!(
            decompress_to_buf(b"FC8_\x00\x00\x00\x20\x40", &mut out),
            Err(DecompressError::OutputTooSmall)
        );
    }

    #[test]
    fn test_empty_stream() {
        let mut out = [0u8; 4];
        assert_eq!(
            decompress_to_buf(b"FC8_\x00\x00\x00\x00\x40", &mut out),
            Ok(0)
        );
    }

    #[test]
    fn test_known_stream() {
        // "abca" as literals, then distance 3 length 8
        let inp = [
            b'F', b'C', b'8', b'_', 0, 0, 0, 12, 0x03, b'a', b'b', b'c', b'a', 0xA8, 0x03, 0x40,
        ];
        let mut out = [0u8; 12];
        assert_eq!(decompress_to_buf(&inp, &mut out), Ok(12));
        assert_eq!(out, *b"abcabcabcabc");
    }

    #[test]
    fn test_overlapping_copy_extends_run() {
        // one literal then distance 1 length 8: the self-overlapping copy
        // must replicate the byte
        let inp = [
            b'F', b'C', b'8', b'_', 0, 0, 0, 9, 0x00, b'x', 0xA8, 0x01, 0x40,
        ];
        let mut out = [0u8; 9];
        assert_eq!(decompress_to_buf(&inp, &mut out), Ok(9));
        assert_eq!(out, *b"xxxxxxxxx");
    }

    #[test]
    fn test_all_tiers_decode() {
        // literals "ab", BR0 (distance 2, length 3), BR1 (distance 2,
        // length 5), BR2 (distance 1, class 0 = length 3)
        let inp = [
            b'F', b'C', b'8', b'_', 0, 0, 0, 13, // header
            0x01, b'a', b'b', // literals
            0x42, // BR0
            0x90, 0x02, // BR1
            0xC0, 0x00, 0x01, // BR2
            0x40,
        ];
        let mut out = [0u8; 13];
        assert_eq!(decompress_to_buf(&inp, &mut out), Ok(13));
        assert_eq!(out, *b"abababababbbb");
    }

    #[test]
    fn test_backref_before_start_rejected() {
        let inp = [
            b'F', b'C', b'8', b'_', 0, 0, 0, 4, 0x00, b'x', 0xA8, 0x05, 0x40,
        ];
        let mut out = [0u8; 4];
        assert_eq!(
            decompress_to_buf(&inp, &mut out),
            Err(DecompressError::InvalidBackreference)
        );
    }

    #[test]
    fn test_truncated_stream_rejected() {
        // literal run claims 5 bytes but only 2 follow
        let inp = [b'F', b'C', b'8', b'_', 0, 0, 0, 5, 0x04, b'x', b'y'];
        let mut out = [0u8; 5];
        assert_eq!(
            decompress_to_buf(&inp, &mut out),
            Err(DecompressError::InputTruncated)
        );
        // missing end-of-stream sentinel
        let inp = [b'F', b'C', b'8', b'_', 0, 0, 0, 2, 0x01, b'x', b'y'];
        let mut out = [0u8; 2];
        assert_eq!(
            decompress_to_buf(&inp, &mut out),
            Err(DecompressError::InputTruncated)
        );
    }

    #[test]
    fn test_corrupt_stream_overrunning_output_rejected() {
        // declares 4 bytes but the stream produces more
        let inp = [
            b'F', b'C', b'8', b'_', 0, 0, 0, 4, 0x00, b'x', 0xA8, 0x01, 0x40,
        ];
        let mut out = [0u8; 4];
        assert_eq!(
            decompress_to_buf(&inp, &mut out),
            Err(DecompressError::OutputTooSmall)
        );
    }
}
