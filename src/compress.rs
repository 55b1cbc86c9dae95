use core::fmt;

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

use alloc::vec::Vec;

use crate::accel::{SearchAccel, WINDOW_SIZE};
use crate::tables;
use crate::util::{write_u32_be, DECODED_SIZE_OFFSET, HEADER_SIZE, MAGIC};

/// Longest match any backref encoding can carry.
const MAX_MATCH_LEN: usize = 256;
/// Cap on chain links followed per position, bounding worst-case search cost.
const MAX_CHAIN_WALK: usize = 128 * 1024;
/// A literal run carries at most this many bytes.
const LONGEST_LITERAL_RUN: usize = 64;
/// End-of-stream sentinel: a tier-0 backref with distance 0.
const EOS: u8 = 0x40;

/// Compression errors
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum CompressError {
    /// The output buffer cannot hold the header plus the input, or was
    /// exhausted mid-encode. No partial output is usable.
    OutputTooSmall,
    /// The search accelerator tables could not be allocated.
    AllocationFailed,
    /// The input exceeds the 2^32-1 byte limit of the size header.
    InputTooLarge,
    /// A block size of 0 was requested for a nonempty input.
    InvalidBlockSize,
}
impl fmt::Display for CompressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressError::OutputTooSmall => write!(f, "output buffer was insufficient"),
            CompressError::AllocationFailed => write!(f, "search table allocation failed"),
            CompressError::InputTooLarge => write!(f, "input exceeds 4 GiB size field"),
            CompressError::InvalidBlockSize => write!(f, "block size must be nonzero"),
        }
    }
}
#[cfg(feature = "std")]
impl std::error::Error for CompressError {}

struct BufOutput<'a> {
    pos: usize,
    buf: &'a mut [u8],
}
impl<'a> BufOutput<'a> {
    fn putc(&mut self, c: u8) -> Result<(), CompressError> {
        if self.pos < self.buf.len() {
            self.buf[self.pos] = c;
            self.pos += 1;
            Ok(())
        } else {
            Err(CompressError::OutputTooSmall)
        }
    }
}

/// An open literal run: the index of the reserved count byte, back-patched
/// when the run closes, and the literals written since.
struct RunBuilder {
    count_idx: usize,
    len: usize,
}
impl RunBuilder {
    fn open(out: &mut BufOutput) -> Result<Self, CompressError> {
        let count_idx = out.pos;
        out.putc(0)?;
        Ok(RunBuilder { count_idx, len: 0 })
    }

    /// Appends one literal. Returns true once the run is at capacity.
    fn push(&mut self, out: &mut BufOutput, byte: u8) -> Result<bool, CompressError> {
        out.putc(byte)?;
        self.len += 1;
        Ok(self.len == LONGEST_LITERAL_RUN)
    }

    /// Writes the count byte. Must be called on every path that ends a run.
    fn finish(self, out: &mut BufOutput) {
        out.buf[self.count_idx] = (self.len - 1) as u8;
    }
}

/// Bytes needed to encode a backref, or None if it fits no tier.
fn backref_size(dist: usize, len: usize) -> Option<usize> {
    if dist <= 31 && len <= 4 {
        Some(1)
    } else if dist <= 0x7FF && len <= 10 {
        Some(2)
    } else if dist <= 0x1FFFF && len <= MAX_MATCH_LEN {
        Some(3)
    } else {
        None
    }
}

fn emit_backref(out: &mut BufOutput, dist: usize, len: usize) -> Result<(), CompressError> {
    // LIT = 00aaaaaa  next aaaaaa+1 bytes are literals
    // BR0 = 01baaaaa  distance aaaaa, length b+3
    // BR1 = 10bbbaaa'aaaaaaaa  distance aaa'aaaaaaaa, length bbb+3
    // BR2 = 11bbbbba'aaaaaaaa'aaaaaaaa  distance a'aaaaaaaa'aaaaaaaa,
    //       length decoded from class bbbbb
    // EOS = 01x00000
    match backref_size(dist, len) {
        Some(1) => out.putc(0x40 | (((len - 3) << 5) | dist) as u8),
        Some(2) => {
            out.putc(0x80 | ((len - 3) << 3) as u8 | (dist >> 8) as u8)?;
            out.putc(dist as u8)
        }
        Some(3) => {
            out.putc(0xC0 | (tables::encode_length_class(len) << 1) | (dist >> 16) as u8)?;
            out.putc((dist >> 8) as u8)?;
            out.putc(dist as u8)
        }
        // the match finder rejects anything that fits no tier
        _ => unreachable!("backreference fits no tier"),
    }
}

/// Walks the prefix chain for `pos` and returns the (quantized length,
/// distance) pair with the greatest win over emitting literals, or None if
/// nothing found would actually shrink the output.
///
/// `symbol_cost` is the price of the byte at `pos` as a literal: 2 when a
/// fresh run header would be needed, 1 when a run is already open.
fn find_best_match(
    sa: &SearchAccel,
    input: &[u8],
    pos: usize,
    symbol_cost: usize,
) -> Option<(usize, usize)> {
    let min_pos = pos.saturating_sub(WINDOW_SIZE);
    let end_str = usize::min(pos + MAX_MATCH_LEN, input.len());

    let mut best_len = 2;
    let mut best_dist = 0;
    let mut best_win = 0;

    let mut link = sa.chain_prev(pos);
    let mut budget = MAX_CHAIN_WALK;

    while let Some(prev) = link {
        // links at or below min_pos are outside the window, or stale ring
        // entries shadowed by a later lap; either way the walk ends
        if prev <= min_pos || budget == 0 {
            break;
        }
        budget -= 1;

        // cheap reject: a candidate that can't beat the current best
        // differs at the best-length offset
        if input.get(pos + best_len) == input.get(prev + best_len) {
            // the chain guarantees the first 3 bytes match
            let mut end = pos + 3;
            while end < end_str && input[end] == input[prev + (end - pos)] {
                end += 1;
            }

            let len = tables::quantize(end - pos);
            let dist = pos - prev;

            if let Some(size) = backref_size(dist, len) {
                let win = len + symbol_cost - 1 - size;
                if win > best_win {
                    best_win = win;
                    best_len = len;
                    best_dist = dist;

                    // no longer match is possible
                    if len >= MAX_MATCH_LEN || end >= end_str {
                        break;
                    }
                }
            }
        }

        link = sa.chain_prev(prev);
    }

    if best_win > 0 {
        Some((best_len, best_dist))
    } else {
        None
    }
}

/// Compress the input into a preallocated buffer.
///
/// The buffer must hold at least `HEADER_SIZE + inp.len()` bytes; the true
/// worst case is [`max_compressed_size`]. Returns the compressed size on
/// success. On error the buffer contents are unspecified.
pub fn compress_to_buf(inp: &[u8], outp: &mut [u8]) -> Result<usize, CompressError> {
    if inp.len() > u32::MAX as usize {
        return Err(CompressError::InputTooLarge);
    }
    if outp.len() < HEADER_SIZE + inp.len() {
        return Err(CompressError::OutputTooSmall);
    }

    let mut sa = SearchAccel::new()?;
    let mut out = BufOutput {
        pos: HEADER_SIZE,
        buf: outp,
    };
    let mut run: Option<RunBuilder> = None;
    let mut src = 0;

    while src < inp.len() {
        // the last two bytes can never start a match
        let best = if inp.len() - src >= 3 {
            sa.record_position(inp, src);
            let symbol_cost = if run.is_some() { 1 } else { 2 };
            find_best_match(&sa, inp, src, symbol_cost)
        } else {
            None
        };

        match best {
            Some((len, dist)) => {
                if let Some(r) = run.take() {
                    r.finish(&mut out);
                }
                emit_backref(&mut out, dist, len)?;

                // positions inside the match still feed future searches
                for i in 1..len {
                    if src + i + 3 <= inp.len() {
                        sa.record_position(inp, src + i);
                    }
                }
                src += len;
            }
            None => {
                let mut r = match run.take() {
                    Some(r) => r,
                    None => RunBuilder::open(&mut out)?,
                };
                let full = r.push(&mut out, inp[src])?;
                if full {
                    r.finish(&mut out);
                } else {
                    run = Some(r);
                }
                src += 1;
            }
        }
    }

    if let Some(r) = run.take() {
        r.finish(&mut out);
    }
    out.putc(EOS)?;

    let size = out.pos;
    out.buf[..4].copy_from_slice(&MAGIC);
    write_u32_be(&mut out.buf[DECODED_SIZE_OFFSET..], inp.len() as u32);
    Ok(size)
}

/// Worst-case compressed size for an input of `input_len` bytes.
///
/// An input that never compresses is emitted as literal runs of up to 64
/// bytes, each costing one count byte, plus the header and the end
/// sentinel: `8 + n + ceil(n/64) + 1`, bounded by `8 + n + n/64 + 2`.
pub fn max_compressed_size(input_len: usize) -> usize {
    HEADER_SIZE + input_len + input_len / 64 + 2
}

/// Compress the input into a [Vec](alloc::vec::Vec) sized to the worst case
/// and truncated to the result.
pub fn compress_to_vec(inp: &[u8]) -> Result<Vec<u8>, CompressError> {
    let bound = max_compressed_size(inp.len());
    let mut out = Vec::new();
    out.try_reserve_exact(bound)
        .map_err(|_| CompressError::AllocationFailed)?;
    out.resize(bound, 0);

    let size = compress_to_buf(inp, &mut out)?;
    out.truncate(size);
    Ok(out)
}
