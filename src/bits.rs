//! Sequential bit-precision reader over an in-memory codestream.
//!
//! JPEG XL bit order: LSB-first within each byte, little-endian across
//! bytes. Reads past the end of the input produce zero bits and set a
//! sticky out-of-bounds flag instead of failing immediately; the flag is
//! surfaced once, when the reader is closed.

use alloc::vec::Vec;

use crate::error::JxlError;

/// Bounds-checked bit cursor over an immutable byte span.
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Bit position from the start of `data`. Monotonically non-decreasing.
    pos: u64,
    out_of_bounds: bool,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            out_of_bounds: false,
        }
    }

    /// Read the next `n` bits (`n <= 56`) as an unsigned value.
    ///
    /// Bits beyond the end of the input read as zero and mark the reader
    /// out of bounds; decoding continues so truncated files can still be
    /// tolerated when the caller opts in.
    pub fn read_bits(&mut self, n: u32) -> u64 {
        debug_assert!(n <= 56);
        let mut value = 0u64;
        for i in 0..u64::from(n) {
            let bit_index = self.pos + i;
            let byte = (bit_index / 8) as usize;
            if byte < self.data.len() {
                let bit = (self.data[byte] >> (bit_index % 8)) & 1;
                value |= u64::from(bit) << i;
            } else {
                self.out_of_bounds = true;
            }
        }
        self.pos += u64::from(n);
        value
    }

    /// Read `n` whole bytes. The cursor must be byte-aligned; bytes past
    /// the end of the input read as zero and mark the reader out of bounds.
    pub fn read_bytes(&mut self, n: usize) -> Vec<u8> {
        debug_assert_eq!(self.pos % 8, 0, "read_bytes requires byte alignment");
        let start = ((self.pos / 8) as usize).min(self.data.len());
        let end = start.saturating_add(n).min(self.data.len());
        let mut out = Vec::with_capacity(n);
        out.extend_from_slice(&self.data[start..end]);
        if out.len() < n {
            self.out_of_bounds = true;
            out.resize(n, 0);
        }
        self.pos += 8 * n as u64;
        out
    }

    pub fn skip_bits(&mut self, n: u64) {
        self.pos += n;
        if self.pos > self.total_bits() {
            self.out_of_bounds = true;
        }
    }

    /// Advance to the next byte boundary. Idempotent: a second call in a
    /// row does not move the cursor.
    pub fn align_to_byte(&mut self) {
        self.pos = self.pos.next_multiple_of(8);
    }

    /// Total bits consumed so far, including any past the end of the input.
    pub fn consumed_bits(&self) -> u64 {
        self.pos
    }

    pub fn total_bits(&self) -> u64 {
        8 * self.data.len() as u64
    }

    /// Whole bytes remaining from the current position.
    pub fn remaining_bytes(&self) -> usize {
        self.data.len().saturating_sub(self.pos.div_ceil(8) as usize)
    }

    pub fn all_reads_within_bounds(&self) -> bool {
        !self.out_of_bounds
    }

    /// Finalize the reader. Fails if any read ran past the end of the
    /// input; callers tolerating partial files discard this error.
    pub fn close(self) -> Result<(), JxlError> {
        if self.out_of_bounds {
            return Err(JxlError::UnexpectedEof);
        }
        Ok(())
    }
}

// ── Variable-width integer encodings ────────────────────────────────

/// One of the four distributions a `U32` field may choose from.
#[derive(Clone, Copy, Debug)]
pub enum U32Spec {
    /// A constant; consumes no bits.
    Val(u32),
    /// A raw `bits`-bit value.
    Bits(u32),
    /// A raw `bits`-bit value plus `offset`.
    BitsOffset { bits: u32, offset: u32 },
}

impl U32Spec {
    fn read(self, reader: &mut BitReader<'_>) -> u32 {
        match self {
            U32Spec::Val(v) => v,
            U32Spec::Bits(bits) => reader.read_bits(bits) as u32,
            U32Spec::BitsOffset { bits, offset } => {
                offset.wrapping_add(reader.read_bits(bits) as u32)
            }
        }
    }
}

/// Read a `U32` field: a 2-bit selector picks one of four distributions.
pub fn read_u32(reader: &mut BitReader<'_>, specs: [U32Spec; 4]) -> u32 {
    let selector = reader.read_bits(2) as usize;
    specs[selector].read(reader)
}

/// Read a `U64` field: 2-bit selector, then 0 bits / 4 bits + 1 /
/// 8 bits + 17 / 12 bits with 8-bit continuation groups (4 bits in the
/// final group at shift 60).
pub fn read_u64(reader: &mut BitReader<'_>) -> u64 {
    match reader.read_bits(2) {
        0 => 0,
        1 => 1 + reader.read_bits(4),
        2 => 17 + reader.read_bits(8),
        _ => {
            let mut value = reader.read_bits(12);
            let mut shift = 12;
            while reader.read_bits(1) == 1 {
                if shift == 60 {
                    value |= reader.read_bits(4) << shift;
                    break;
                }
                value |= reader.read_bits(8) << shift;
                shift += 8;
            }
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_lsb_first() {
        // 0b1011_0010: bits come out 0,1,0,0, 1,1,0,1 from the LSB.
        let data = [0b1011_0010u8, 0xFF];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bits(1), 0);
        assert_eq!(reader.read_bits(3), 0b001);
        assert_eq!(reader.read_bits(4), 0b1011);
        assert_eq!(reader.consumed_bits(), 8);
        assert_eq!(reader.read_bits(8), 0xFF);
        reader.close().unwrap();
    }

    #[test]
    fn spans_byte_boundaries() {
        let data = [0xAB, 0xCD];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bits(16), 0xCDAB);
        reader.close().unwrap();
    }

    #[test]
    fn out_of_bounds_zero_fills_and_fails_close() {
        let data = [0xFF];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bits(12), 0x0FF);
        assert!(!reader.all_reads_within_bounds());
        assert_eq!(reader.consumed_bits(), 12);
        assert!(matches!(reader.close(), Err(JxlError::UnexpectedEof)));
    }

    #[test]
    fn alignment_is_idempotent() {
        let data = [0u8; 4];
        let mut reader = BitReader::new(&data);
        reader.read_bits(3);
        reader.align_to_byte();
        assert_eq!(reader.consumed_bits(), 8);
        reader.align_to_byte();
        assert_eq!(reader.consumed_bits(), 8);
    }

    #[test]
    fn read_bytes_after_align() {
        let data = [0x00, 0x12, 0x34, 0x56];
        let mut reader = BitReader::new(&data);
        reader.read_bits(5);
        reader.align_to_byte();
        assert_eq!(reader.read_bytes(2), alloc::vec![0x12, 0x34]);
        assert_eq!(reader.remaining_bytes(), 1);
        reader.close().unwrap();
    }

    #[test]
    fn read_bytes_past_end_pads_with_zeros() {
        let data = [0xAA];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bytes(3), alloc::vec![0xAA, 0, 0]);
        assert!(!reader.all_reads_within_bounds());
    }

    #[test]
    fn u32_selector_picks_distribution() {
        // selector 0 -> Val(8): no further bits.
        let data = [0b0000_0000u8];
        let mut reader = BitReader::new(&data);
        let v = read_u32(
            &mut reader,
            [
                U32Spec::Val(8),
                U32Spec::Val(10),
                U32Spec::Val(12),
                U32Spec::BitsOffset { bits: 6, offset: 1 },
            ],
        );
        assert_eq!(v, 8);
        assert_eq!(reader.consumed_bits(), 2);

        // selector 3 -> 6 bits + 1.
        let data = [0b0001_0111u8];
        let mut reader = BitReader::new(&data);
        let v = read_u32(
            &mut reader,
            [
                U32Spec::Val(8),
                U32Spec::Val(10),
                U32Spec::Val(12),
                U32Spec::BitsOffset { bits: 6, offset: 1 },
            ],
        );
        assert_eq!(v, 0b000101 + 1);
        assert_eq!(reader.consumed_bits(), 8);
    }

    #[test]
    fn u64_small_selectors() {
        // selector 0 -> 0
        let mut reader = BitReader::new(&[0b0000_0000]);
        assert_eq!(read_u64(&mut reader), 0);
        assert_eq!(reader.consumed_bits(), 2);

        // selector 1, 4-bit payload 0b1010 -> 10 + 1
        let mut reader = BitReader::new(&[0b0010_1001]);
        assert_eq!(read_u64(&mut reader), 11);

        // selector 2, 8-bit payload 0xFF -> 255 + 17
        let mut reader = BitReader::new(&[0b1111_1110, 0b0000_0011]);
        assert_eq!(read_u64(&mut reader), 272);
    }

    #[test]
    fn u64_large_with_continuation() {
        // selector 3, 12-bit payload = 0xFFF, one continuation group 0x01,
        // then stop bit.
        let mut bits: Vec<(u64, u32)> = Vec::new();
        bits.push((3, 2)); // selector
        bits.push((0xFFF, 12));
        bits.push((1, 1)); // continue
        bits.push((0x01, 8));
        bits.push((0, 1)); // stop
        let mut acc = 0u64;
        let mut len = 0u32;
        let mut out = Vec::new();
        for (v, n) in bits {
            acc |= v << len;
            len += n;
            while len >= 8 {
                out.push((acc & 0xFF) as u8);
                acc >>= 8;
                len -= 8;
            }
        }
        if len > 0 {
            out.push(acc as u8);
        }
        let mut reader = BitReader::new(&out);
        assert_eq!(read_u64(&mut reader), 0xFFF | (0x01 << 12));
    }
}
