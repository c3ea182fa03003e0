//! Frequency analysis and Huffman tree construction.
//!
//! The tree is a plain sum type: a node is either a `Leaf` carrying one
//! symbol, or an `Internal` node owning exactly two children. Every node
//! carries the summed weight of the leaves beneath it, so the root weight is
//! the number of symbols that were encoded.
//!
//! # Construction
//!
//! Leaves are pushed onto a min-heap in ascending symbol order. The two
//! lightest nodes are popped (first popped is the left child) and merged
//! until one node is left. Equal weights pop in insertion order, which makes
//! the tree a pure function of the frequency table.
//!
//! # Wire Format
//!
//! ```text
//! pre-order walk
//!   0x00                      Internal, followed by left then right subtree
//!   0x01 symbol(1) weight(8)  Leaf, weight u64 little-endian
//! ```
//!
//! Internal weights are not stored; they are recomputed on parse.

use crate::codec::split_array;
use crate::error::{ContainerError, HuffmanError, Result};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

const TAG_INTERNAL: u8 = 0x00;
const TAG_LEAF: u8 = 0x01;

/// Serialized size of a leaf node.
const LEAF_SIZE: usize = 1 + 1 + 8;

/// No Huffman tree over 256 symbols is deeper than 255 edges.
pub const MAX_DEPTH: usize = 256;

/// Occurrence count of every byte value in one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u64; 256],
}

impl FrequencyTable {
    /// Count every byte in `data`.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut counts = [0u64; 256];
        for &byte in data {
            counts[byte as usize] += 1;
        }
        Self { counts }
    }

    /// Occurrences of `symbol` (0 if absent).
    pub fn count(&self, symbol: u8) -> u64 {
        self.counts[symbol as usize]
    }

    /// Number of distinct symbols present.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }

    /// Total number of symbols counted.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.distinct() == 0
    }

    /// Present symbols and their counts, in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c > 0)
            .map(|(s, &c)| (s as u8, c))
    }
}

/// A binary prefix-code tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffmanTree {
    Leaf {
        symbol: u8,
        weight: u64,
    },
    Internal {
        weight: u64,
        left: Box<HuffmanTree>,
        right: Box<HuffmanTree>,
    },
}

impl HuffmanTree {
    /// Build a tree from a frequency table.
    ///
    /// # Errors
    /// `HuffmanError::EmptyInput` if the table has no symbols.
    pub fn from_frequencies(freqs: &FrequencyTable) -> Result<Self> {
        let mut heap = BinaryHeap::new();
        let mut seq = 0u64;

        for (symbol, weight) in freqs.iter() {
            heap.push(HeapEntry {
                seq,
                node: HuffmanTree::Leaf { symbol, weight },
            });
            seq += 1;
        }

        // Pop two, merge, push back; a lone survivor is the root
        loop {
            let Some(left) = heap.pop() else {
                return Err(HuffmanError::EmptyInput.into());
            };
            let Some(right) = heap.pop() else {
                return Ok(left.node);
            };
            heap.push(HeapEntry {
                seq,
                node: HuffmanTree::merge(left.node, right.node),
            });
            seq += 1;
        }
    }

    /// Combine two subtrees under a new internal node.
    pub fn merge(left: HuffmanTree, right: HuffmanTree) -> Self {
        HuffmanTree::Internal {
            weight: left.weight() + right.weight(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Summed leaf weight beneath (and including) this node.
    pub fn weight(&self) -> u64 {
        match self {
            HuffmanTree::Leaf { weight, .. } | HuffmanTree::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, HuffmanTree::Leaf { .. })
    }

    /// Number of leaves, i.e. distinct symbols.
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                HuffmanTree::Leaf { .. } => count += 1,
                HuffmanTree::Internal { left, right, .. } => {
                    stack.push(right.as_ref());
                    stack.push(left.as_ref());
                }
            }
        }
        count
    }

    /// Size of [`HuffmanTree::to_bytes`] output without building it.
    pub fn serialized_len(&self) -> usize {
        let leaves = self.leaf_count();
        leaves * LEAF_SIZE + (leaves - 1)
    }

    /// Total encoded length in bits: sum of leaf depth times leaf weight.
    ///
    /// Returns `None` on overflow, which only a forged tree can trigger.
    pub fn encoded_bit_len(&self) -> Option<u64> {
        let mut total = 0u64;
        let mut stack = vec![(self, 0u64)];
        while let Some((node, depth)) = stack.pop() {
            match node {
                HuffmanTree::Leaf { weight, .. } => {
                    total = total.checked_add(depth.checked_mul(*weight)?)?;
                }
                HuffmanTree::Internal { left, right, .. } => {
                    stack.push((right.as_ref(), depth + 1));
                    stack.push((left.as_ref(), depth + 1));
                }
            }
        }
        Some(total)
    }

    /// Serialize the tree shape, symbols and leaf weights.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.leaf_count() * LEAF_SIZE);
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match node {
                HuffmanTree::Leaf { symbol, weight } => {
                    out.push(TAG_LEAF);
                    out.push(*symbol);
                    out.extend_from_slice(&weight.to_le_bytes());
                }
                HuffmanTree::Internal { left, right, .. } => {
                    out.push(TAG_INTERNAL);
                    stack.push(right.as_ref());
                    stack.push(left.as_ref());
                }
            }
        }
        out
    }

    /// Parse a tree written by [`HuffmanTree::to_bytes`].
    ///
    /// The buffer must hold exactly one tree.
    ///
    /// # Errors
    /// `Error::CorruptContainer` on unknown tags, truncation, trailing bytes,
    /// duplicate symbols, zero or overflowing weights, or excessive depth.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut parser = TreeParser {
            bytes,
            pos: 0,
            seen: [false; 256],
        };
        let tree = parser.node(0)?;

        if parser.pos != bytes.len() {
            return Err(ContainerError::TrailingBytes {
                what: "tree",
                count: bytes.len() - parser.pos,
            }
            .into());
        }

        Ok(tree)
    }
}

/// Recursive-descent reader for the pre-order tree encoding.
///
/// Recursion is bounded by `MAX_DEPTH`.
struct TreeParser<'a> {
    bytes: &'a [u8],
    pos: usize,
    seen: [bool; 256],
}

impl TreeParser<'_> {
    fn node(&mut self, depth: usize) -> Result<HuffmanTree> {
        if depth > MAX_DEPTH {
            return Err(ContainerError::TreeTooDeep { max: MAX_DEPTH }.into());
        }

        let [tag] = self.take::<1>()?;
        match tag {
            TAG_LEAF => {
                let [symbol] = self.take::<1>()?;
                let weight = u64::from_le_bytes(self.take::<8>()?);

                if weight == 0 {
                    return Err(ContainerError::InvalidWeight.into());
                }
                if std::mem::replace(&mut self.seen[symbol as usize], true) {
                    return Err(ContainerError::DuplicateSymbol(symbol).into());
                }

                Ok(HuffmanTree::Leaf { symbol, weight })
            }
            TAG_INTERNAL => {
                let left = self.node(depth + 1)?;
                let right = self.node(depth + 1)?;
                let weight = left
                    .weight()
                    .checked_add(right.weight())
                    .ok_or(ContainerError::InvalidWeight)?;

                Ok(HuffmanTree::Internal {
                    weight,
                    left: Box::new(left),
                    right: Box::new(right),
                })
            }
            tag => Err(ContainerError::UnknownNodeTag(tag).into()),
        }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let bytes = self.bytes;
        let (field, _) = split_array::<N>(&bytes[self.pos..], "tree")?;
        self.pos += N;
        Ok(*field)
    }
}

/// Heap slot ordered so `BinaryHeap` pops the lightest, oldest node first.
#[derive(Debug)]
struct HeapEntry {
    seq: u64,
    node: HuffmanTree,
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap
        other
            .node
            .weight()
            .cmp(&self.node.weight())
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}
