//! FC8b block container: the input is split into fixed-size blocks, each
//! compressed as an independent single-stream container, with an offset
//! index so any block can be located (and decoded) on its own.
//!
//! Layout: `FC8b` magic, big-endian total uncompressed size, big-endian
//! block size, one big-endian 4-byte absolute start offset per block, then
//! the concatenated per-block streams.

extern crate alloc;

use alloc::vec::Vec;

use crate::compress::{compress_to_buf, max_compressed_size, CompressError};
use crate::decompress::{decompress_to_buf, DecompressError};
use crate::util::{read_u32_be, BLOCK_HEADER_SIZE, BLOCK_MAGIC, BLOCK_SIZE_OFFSET};

fn try_vec(len: usize) -> Result<Vec<u8>, CompressError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| CompressError::AllocationFailed)?;
    v.resize(len, 0);
    Ok(v)
}

/// Compress the input as a block container with the given block size.
///
/// Each block is compressed independently; no match may cross a block
/// boundary. The block size must be nonzero unless the input is empty.
pub fn compress_blocks(inp: &[u8], block_size: usize) -> Result<Vec<u8>, CompressError> {
    if inp.len() > u32::MAX as usize || block_size > u32::MAX as usize {
        return Err(CompressError::InputTooLarge);
    }
    if block_size == 0 && !inp.is_empty() {
        return Err(CompressError::InvalidBlockSize);
    }

    let num_blocks = if inp.is_empty() {
        0
    } else {
        inp.len().div_ceil(block_size)
    };

    let mut out = Vec::new();
    out.try_reserve(BLOCK_HEADER_SIZE + num_blocks * 4 + max_compressed_size(inp.len()))
        .map_err(|_| CompressError::AllocationFailed)?;
    out.extend_from_slice(&BLOCK_MAGIC);
    out.extend_from_slice(&(inp.len() as u32).to_be_bytes());
    out.extend_from_slice(&(block_size as u32).to_be_bytes());
    // offset table, patched as each block lands
    out.resize(BLOCK_HEADER_SIZE + num_blocks * 4, 0);

    let mut scratch = try_vec(max_compressed_size(usize::min(inp.len(), block_size)))?;
    for (i, chunk) in inp.chunks(block_size.max(1)).enumerate() {
        let size = compress_to_buf(chunk, &mut scratch)?;
        let offset =
            u32::try_from(out.len()).map_err(|_| CompressError::InputTooLarge)?;

        let at = BLOCK_HEADER_SIZE + i * 4;
        out[at..at + 4].copy_from_slice(&offset.to_be_bytes());
        out.extend_from_slice(&scratch[..size]);
    }

    Ok(out)
}

/// Decompress a block container produced by [`compress_blocks`].
pub fn decompress_blocks(inp: &[u8]) -> Result<Vec<u8>, DecompressError> {
    if inp.len() < BLOCK_HEADER_SIZE {
        return Err(DecompressError::InputTruncated);
    }
    if inp[..4] != BLOCK_MAGIC {
        return Err(DecompressError::BadMagic);
    }
    let total = read_u32_be(&inp[4..]) as usize;
    let block_size = read_u32_be(&inp[BLOCK_SIZE_OFFSET..]) as usize;
    if total == 0 {
        return Ok(Vec::new());
    }
    if block_size == 0 {
        return Err(DecompressError::InvalidBlockLayout);
    }

    let num_blocks = total.div_ceil(block_size);
    let table_end = BLOCK_HEADER_SIZE + num_blocks * 4;
    if inp.len() < table_end {
        return Err(DecompressError::InputTruncated);
    }

    let mut out = Vec::new();
    out.try_reserve_exact(total)
        .map_err(|_| DecompressError::AllocationFailed)?;
    out.resize(total, 0);

    for i in 0..num_blocks {
        let offset = read_u32_be(&inp[BLOCK_HEADER_SIZE + i * 4..]) as usize;
        if offset < table_end || offset > inp.len() {
            return Err(DecompressError::InvalidBlockLayout);
        }

        let start = i * block_size;
        let expect = usize::min(block_size, total - start);
        let size = decompress_to_buf(&inp[offset..], &mut out[start..start + expect])?;
        if size != expect {
            return Err(DecompressError::InvalidBlockLayout);
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let inp: Vec<u8> = b"hello hello hello world world world "
            .iter()
            .cycle()
            .take(1000)
            .copied()
            .collect();

        let out = compress_blocks(&inp, 256).unwrap();
        assert_eq!(out[..4], *b"FC8b");
        assert_eq!(read_u32_be(&out[4..]), 1000);
        assert_eq!(read_u32_be(&out[8..]), 256);
        // four blocks; the first stream starts right after the offset table
        assert_eq!(read_u32_be(&out[12..]), 12 + 4 * 4);
        assert_eq!(out[28..32], *b"FC8_");

        assert_eq!(decompress_blocks(&out).unwrap(), inp);
    }

    #[test]
    fn test_single_block() {
        let inp = b"abcabcabcabc";
        let out = compress_blocks(inp, 4096).unwrap();
        assert_eq!(decompress_blocks(&out).unwrap(), inp);
    }

    #[test]
    fn test_empty_input() {
        let out = compress_blocks(&[], 64).unwrap();
        assert_eq!(out.len(), BLOCK_HEADER_SIZE);
        assert!(decompress_blocks(&out).unwrap().is_empty());
    }

    #[test]
    fn test_zero_block_size_rejected() {
        assert_eq!(
            compress_blocks(b"abc", 0),
            Err(CompressError::InvalidBlockSize)
        );
        // but an empty input tolerates any block size
        compress_blocks(&[], 0).unwrap();
    }

    #[test]
    fn test_bad_container_rejected() {
        assert_eq!(
            decompress_blocks(b"FC8_\x00\x00\x00\x04\x00\x00\x00\x04"),
            Err(DecompressError::BadMagic)
        );
        assert_eq!(
            decompress_blocks(b"FC8b\x00\x00"),
            Err(DecompressError::InputTruncated)
        );
        // nonzero total with a zero block size
        assert_eq!(
            decompress_blocks(b"FC8b\x00\x00\x00\x04\x00\x00\x00\x00"),
            Err(DecompressError::InvalidBlockLayout)
        );
        // offset table truncated
        assert_eq!(
            decompress_blocks(b"FC8b\x00\x00\x00\x04\x00\x00\x00\x04"),
            Err(DecompressError::InputTruncated)
        );
    }

    #[test]
    fn test_offset_out_of_range_rejected() {
        let mut out = compress_blocks(b"abcdef", 6).unwrap();
        // point the only block past the end of the container
        let bogus = (out.len() as u32 + 1).to_be_bytes();
        out[12..16].copy_from_slice(&bogus);
        assert_eq!(
            decompress_blocks(&out),
            Err(DecompressError::InvalidBlockLayout)
        );
    }
}
