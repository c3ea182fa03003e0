//! Bit packing and unpacking.
//!
//! Bits are grouped MSB-first (most significant bit first) into bytes.
//!
//! # Padding Rules
//! - BitWriter: pads the final partial byte with trailing zeros
//! - BitReader: yields padding bits like any other bits
//!
//! Packed output is therefore not self-delimiting. The padding is
//! indistinguishable from zero-valued code bits, so a decoder has to know
//! when to stop from something other than the byte count (the Huffman
//! decoder stops after the tree's root weight worth of symbols).
//!
//! # Example
//! ```
//! use catc_core::bitio::{pack, unpack, BitReader};
//!
//! let bytes = pack(&[true, false, true, true, true]);
//! assert_eq!(bytes, vec![0b1011_1000]);
//! assert_eq!(unpack(&bytes).len(), 8);
//!
//! let ones = BitReader::new(&bytes).bits().filter(|&b| b).count();
//! assert_eq!(ones, 4);
//! ```

/// Pack a sequence of bits into bytes, MSB-first, zero-padding the last byte.
pub fn pack(bits: &[bool]) -> Vec<u8> {
    let mut writer = BitWriter::with_capacity(bits.len().div_ceil(8));
    for &bit in bits {
        writer.write_bit(bit);
    }
    writer.finish()
}

/// Expand every byte into its 8 bits, MSB first, in byte order.
pub fn unpack(bytes: &[u8]) -> Vec<bool> {
    BitReader::new(bytes).bits().collect()
}

/// Writes bits MSB-first into a byte buffer.
///
/// # Invariants
/// - `bit_count` is always < 8
/// - unused low bits of `bit_buffer` are zero
#[derive(Debug, Clone)]
pub struct BitWriter {
    /// Completed bytes
    bytes: Vec<u8>,
    /// Accumulator for the current partial byte (MSB-aligned)
    bit_buffer: u8,
    /// Number of bits in bit_buffer (0-7)
    bit_count: u8,
}

impl BitWriter {
    /// Create a writer that expects roughly `bytes` bytes of output.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
            bit_buffer: 0,
            bit_count: 0,
        }
    }

    /// Append a single bit.
    pub fn write_bit(&mut self, bit: bool) {
        if bit {
            self.bit_buffer |= 0x80 >> self.bit_count;
        }
        self.bit_count += 1;

        if self.bit_count == 8 {
            self.bytes.push(self.bit_buffer);
            self.bit_buffer = 0;
            self.bit_count = 0;
        }
    }

    /// Append every bit of a code in order.
    pub fn write_code(&mut self, code: &[bool]) {
        for &bit in code {
            self.write_bit(bit);
        }
    }

    /// Finish writing and return the output bytes.
    ///
    /// A partial final byte is emitted with its low bits zeroed.
    pub fn finish(mut self) -> Vec<u8> {
        if self.bit_count > 0 {
            self.bytes.push(self.bit_buffer);
        }
        self.bytes
    }
}

/// Reads bits MSB-first from a byte buffer.
///
/// # Invariants
/// - `bit_position` never exceeds `data.len() * 8`
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    /// Source data
    data: &'a [u8],
    /// Current bit position (0 = MSB of first byte)
    bit_position: usize,
}

impl<'a> BitReader<'a> {
    /// Create a new BitReader for the given data.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            bit_position: 0,
        }
    }

    /// Read a single bit, or `None` at end of buffer.
    pub fn next_bit(&mut self) -> Option<bool> {
        let byte = *self.data.get(self.bit_position / 8)?;
        let bit = (byte >> (7 - self.bit_position % 8)) & 1 == 1;
        self.bit_position += 1;
        Some(bit)
    }

    /// Iterate over the remaining bits.
    pub fn bits(self) -> Bits<'a> {
        Bits { reader: self }
    }

    /// Return the number of bits remaining in the buffer.
    pub fn bits_remaining(&self) -> usize {
        self.data.len() * 8 - self.bit_position
    }
}

/// Iterator over the bits of a [`BitReader`].
#[derive(Debug, Clone)]
pub struct Bits<'a> {
    reader: BitReader<'a>,
}

impl Iterator for Bits<'_> {
    type Item = bool;

    fn next(&mut self) -> Option<bool> {
        self.reader.next_bit()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.reader.bits_remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for Bits<'_> {}
