//! Huffman block codec.
//!
//! `encode` turns a byte slice into a [`CompressedBlock`]: the packed code
//! bits plus the tree needed to walk them back. The block is
//! self-sufficient; there is no shared or static code table.
//!
//! # Decode Termination
//!
//! Packed bits are zero-padded to a byte boundary, and padding looks like
//! code bits. The decoder therefore stops after `tree.weight()` symbols, the
//! number of symbols that went in. If the bits run out first, the in-flight
//! walk is dropped without emitting a partial symbol and decode fails.
//!
//! # Single-Symbol Input
//!
//! One distinct symbol gives a bare-leaf tree whose code is empty. Such a
//! block stores no packed bytes at all: the leaf already records the symbol
//! and its count, and decode repeats it.
//!
//! # Size Limit
//!
//! A block holds at most [`MAX_BLOCK_LEN`] symbols. `encode` refuses larger
//! input, `from_bytes` rejects trees claiming more, and `decode` checks again
//! before allocating, so a forged count cannot trigger a huge allocation.
//!
//! # Block Format
//!
//! ```text
//! +------------------+
//! | tree_len (2)     |  u16 little-endian
//! +------------------+
//! | tree             |  pre-order tree encoding (see `tree`)
//! +------------------+
//! | packed_len (4)   |  u32 little-endian
//! +------------------+
//! | packed           |  code bits, MSB-first, zero padded
//! +------------------+
//! ```
//!
//! # Example
//! ```
//! use catc_core::codec::{decode, encode};
//!
//! let block = encode(b"abracadabra").unwrap();
//! assert_eq!(block.len(), 11);
//! assert_eq!(decode(&block).unwrap(), b"abracadabra");
//! ```

use crate::bitio::BitReader;
use crate::code_table::CodeTable;
use crate::error::{ContainerError, HuffmanError, Result};
use crate::tree::{FrequencyTable, HuffmanTree};

/// Size of the fixed length fields in a serialized block.
const LENGTH_FIELDS_SIZE: usize = 2 + 4;

/// Largest number of symbols (decoded bytes) one block may hold: 1 GiB.
pub const MAX_BLOCK_LEN: u64 = 1 << 30;

/// Packed code bits together with the tree that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedBlock {
    /// Code bits, MSB-first, zero padded to a byte boundary
    pub packed: Vec<u8>,

    /// Tree for decoding; its root weight is the symbol count
    pub tree: HuffmanTree,
}

impl CompressedBlock {
    /// Number of symbols (bytes) the block decodes to.
    pub fn len(&self) -> u64 {
        self.tree.weight()
    }

    /// Always false: encode refuses empty input.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the serialized block in bytes.
    pub fn wire_len(&self) -> usize {
        LENGTH_FIELDS_SIZE + self.tree.serialized_len() + self.packed.len()
    }

    /// Serialize the block for framing or for writing to a file.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let tree = self.tree.to_bytes();
        let tree_len = u16::try_from(tree.len()).map_err(|_| ContainerError::TooLarge {
            what: "tree",
            len: tree.len(),
        })?;
        let packed_len =
            u32::try_from(self.packed.len()).map_err(|_| ContainerError::TooLarge {
                what: "packed payload",
                len: self.packed.len(),
            })?;

        let mut out = Vec::with_capacity(LENGTH_FIELDS_SIZE + tree.len() + self.packed.len());
        out.extend_from_slice(&tree_len.to_le_bytes());
        out.extend_from_slice(&tree);
        out.extend_from_slice(&packed_len.to_le_bytes());
        out.extend_from_slice(&self.packed);
        Ok(out)
    }

    /// Parse and validate a block written by [`CompressedBlock::to_bytes`].
    ///
    /// Besides the tree checks, the packed length must equal
    /// `ceil(sum(depth * weight) / 8)`, which guarantees decode never runs
    /// out of bits.
    ///
    /// # Errors
    /// `Error::CorruptContainer` for any inconsistency.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (tree_len, rest) = split_array(bytes, "block tree length")?;
        let tree_len = u16::from_le_bytes(*tree_len) as usize;

        let (tree_bytes, rest) = split_field(rest, tree_len, "block tree")?;
        let tree = HuffmanTree::from_bytes(tree_bytes)?;
        if tree.weight() > MAX_BLOCK_LEN {
            return Err(ContainerError::TooManySymbols {
                count: tree.weight(),
                max: MAX_BLOCK_LEN,
            }
            .into());
        }

        let (packed_len, rest) = split_array(rest, "block packed length")?;
        let packed_len = u32::from_le_bytes(*packed_len) as usize;

        let (packed, rest) = split_field(rest, packed_len, "block payload")?;
        if !rest.is_empty() {
            return Err(ContainerError::TrailingBytes {
                what: "block",
                count: rest.len(),
            }
            .into());
        }

        if tree.is_leaf() {
            if !packed.is_empty() {
                return Err(ContainerError::UnexpectedPayload(packed.len()).into());
            }
        } else {
            let bits = tree
                .encoded_bit_len()
                .ok_or(ContainerError::InvalidWeight)?;
            let expected = bits.div_ceil(8);
            if expected != packed.len() as u64 {
                return Err(ContainerError::PackedLengthMismatch {
                    expected,
                    actual: packed.len() as u64,
                }
                .into());
            }
        }

        Ok(Self {
            packed: packed.to_vec(),
            tree,
        })
    }
}

/// Split `n` bytes off the front of `bytes`.
pub(crate) fn split_field<'a>(
    bytes: &'a [u8],
    n: usize,
    what: &'static str,
) -> Result<(&'a [u8], &'a [u8])> {
    if bytes.len() < n {
        return Err(ContainerError::Truncated {
            what,
            required: n,
            actual: bytes.len(),
        }
        .into());
    }
    Ok(bytes.split_at(n))
}

/// Split a fixed-size field off the front of `bytes`.
pub(crate) fn split_array<'a, const N: usize>(
    bytes: &'a [u8],
    what: &'static str,
) -> Result<(&'a [u8; N], &'a [u8])> {
    bytes.split_first_chunk::<N>().ok_or_else(|| {
        ContainerError::Truncated {
            what,
            required: N,
            actual: bytes.len(),
        }
        .into()
    })
}

/// Empty output buffer for a block of `len` symbols with room for `reserve`.
///
/// # Errors
/// `HuffmanError::BlockTooLarge` if `len` exceeds [`MAX_BLOCK_LEN`] or the
/// reservation cannot be made.
fn output_buffer(len: u64, reserve: u64) -> Result<Vec<u8>> {
    let too_large = || HuffmanError::BlockTooLarge {
        len,
        max: MAX_BLOCK_LEN,
    };
    if len > MAX_BLOCK_LEN {
        return Err(too_large().into());
    }

    let reserve = usize::try_from(reserve).map_err(|_| too_large())?;
    let mut output = Vec::new();
    output.try_reserve_exact(reserve).map_err(|_| too_large())?;
    Ok(output)
}

/// Compress `data` into a self-contained block.
///
/// # Errors
/// - `HuffmanError::EmptyInput` if `data` is empty
/// - `HuffmanError::BlockTooLarge` if `data` is longer than [`MAX_BLOCK_LEN`]
pub fn encode(data: &[u8]) -> Result<CompressedBlock> {
    if data.len() as u64 > MAX_BLOCK_LEN {
        return Err(HuffmanError::BlockTooLarge {
            len: data.len() as u64,
            max: MAX_BLOCK_LEN,
        }
        .into());
    }

    let freqs = FrequencyTable::from_bytes(data);
    let tree = HuffmanTree::from_frequencies(&freqs)?;

    if tree.is_leaf() {
        log::debug!("single-symbol input: {} bytes stored as symbol + count", data.len());
        return Ok(CompressedBlock {
            packed: Vec::new(),
            tree,
        });
    }

    let table = CodeTable::from_tree(&tree);
    let packed = table.encode(data)?;

    log::debug!(
        "encoded {} bytes ({} symbols) into {} packed bytes",
        data.len(),
        table.len(),
        packed.len()
    );

    Ok(CompressedBlock { packed, tree })
}

/// Decompress a block back into the original bytes.
///
/// # Errors
/// - `HuffmanError::TruncatedStream` if the packed bits end before every
///   symbol has been decoded
/// - `HuffmanError::BlockTooLarge` if the tree claims more than
///   [`MAX_BLOCK_LEN`] symbols
pub fn decode(block: &CompressedBlock) -> Result<Vec<u8>> {
    let expected = block.len();

    let root = match &block.tree {
        HuffmanTree::Leaf { symbol, weight } => {
            let mut output = output_buffer(*weight, *weight)?;
            // output_buffer reserved exactly this many bytes, so it fits in usize
            output.resize(*weight as usize, *symbol);
            return Ok(output);
        }
        root => root,
    };

    // Every symbol takes at least one bit
    let bits_available = block.packed.len() as u64 * 8;
    let mut output = output_buffer(expected, expected.min(bits_available))?;
    let mut node = root;

    for bit in BitReader::new(&block.packed).bits() {
        if output.len() as u64 == expected {
            break;
        }

        let HuffmanTree::Internal { left, right, .. } = node else {
            unreachable!("walk restarts at the root after every leaf");
        };
        node = if bit { right.as_ref() } else { left.as_ref() };

        if let HuffmanTree::Leaf { symbol, .. } = node {
            output.push(*symbol);
            node = root;
        }
    }

    if (output.len() as u64) < expected {
        return Err(HuffmanError::TruncatedStream {
            expected,
            decoded: output.len() as u64,
        }
        .into());
    }

    Ok(output)
}
