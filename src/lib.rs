//! Pure-Rust implementation of the FC8 compression format: an LZ77-family
//! codec with three tiers of backreference encoding and a 128 KiB sliding
//! window, tuned for small targets.
//!
//! Compression needs the `alloc` feature (the search accelerator lives on
//! the heap); buffer-to-buffer decompression works without it.

#![no_std]

mod tables;
mod util;

#[cfg(feature = "alloc")]
mod accel;
#[cfg(feature = "alloc")]
mod block;
#[cfg(feature = "alloc")]
mod compress;
mod decompress;

#[cfg(feature = "alloc")]
pub use block::{compress_blocks, decompress_blocks};
#[cfg(feature = "alloc")]
pub use compress::{compress_to_buf, compress_to_vec, max_compressed_size, CompressError};
#[cfg(feature = "alloc")]
pub use decompress::decompress_to_vec;
pub use decompress::{decompress_to_buf, DecompressError};
pub use util::{decoded_size, BLOCK_HEADER_SIZE, BLOCK_MAGIC, HEADER_SIZE, MAGIC};
