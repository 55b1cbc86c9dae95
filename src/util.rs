//! Container-format constants and byte-order helpers shared by the codec,
//! the block wrapper, and the CLI.

/// Magic tag opening a single-stream container.
pub const MAGIC: [u8; 4] = *b"FC8_";
/// Magic tag opening a block container.
pub const BLOCK_MAGIC: [u8; 4] = *b"FC8b";

/// Single-stream container header: magic + big-endian decoded size.
pub const HEADER_SIZE: usize = 8;
pub(crate) const DECODED_SIZE_OFFSET: usize = 4;

/// Block container header: magic + big-endian total size + big-endian block size.
pub const BLOCK_HEADER_SIZE: usize = 12;
#[cfg(feature = "alloc")]
pub(crate) const BLOCK_SIZE_OFFSET: usize = 8;

pub(crate) fn read_u32_be(buf: &[u8]) -> u32 {
    u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]])
}

#[cfg(feature = "alloc")]
pub(crate) fn write_u32_be(buf: &mut [u8], val: u32) {
    buf[..4].copy_from_slice(&val.to_be_bytes());
}

/// Read the decoded size recorded in a single-stream container header.
///
/// Returns `None` if the input is too short to hold a header or the magic
/// tag does not match.
pub fn decoded_size(inp: &[u8]) -> Option<u32> {
    if inp.len() < HEADER_SIZE || inp[..4] != MAGIC {
        return None;
    }
    Some(read_u32_be(&inp[DECODED_SIZE_OFFSET..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u32_roundtrip() {
        let mut buf = [0u8; 4];
        write_u32_be(&mut buf, 0x01020304);
        assert_eq!(buf, [1, 2, 3, 4]);
        assert_eq!(read_u32_be(&buf), 0x01020304);
    }

    #[test]
    fn test_decoded_size() {
        assert_eq!(decoded_size(b"FC8_\x00\x00\x01\x00"), Some(256));
        assert_eq!(decoded_size(b"FC8_\x00\x00\x01"), None);
        assert_eq!(decoded_size(b"FC8b\x00\x00\x01\x00"), None);
    }
}
