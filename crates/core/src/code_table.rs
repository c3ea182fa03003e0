//! Symbol-to-code mapping derived from a Huffman tree.
//!
//! Codes are read off a depth-first walk: a left edge appends `0`, a right
//! edge appends `1`. The walk uses an explicit stack, so very unbalanced
//! trees cost heap memory rather than call-stack depth.
//!
//! A tree that is a single leaf yields one empty code. That table can
//! describe the alphabet but cannot encode anything (`DegenerateAlphabet`);
//! the codec stores such input as symbol + count instead.

use crate::bitio::BitWriter;
use crate::error::{HuffmanError, Result};
use crate::tree::HuffmanTree;

/// Mapping from symbol to its bit-string code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable {
    codes: Vec<Option<Vec<bool>>>,
}

impl CodeTable {
    /// Walk `tree` and record the path to every leaf.
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        let mut codes = vec![None; 256];
        let mut stack = vec![(tree, Vec::new())];

        while let Some((node, path)) = stack.pop() {
            match node {
                HuffmanTree::Leaf { symbol, .. } => {
                    codes[*symbol as usize] = Some(path);
                }
                HuffmanTree::Internal { left, right, .. } => {
                    let mut right_path = path.clone();
                    right_path.push(true);
                    let mut left_path = path;
                    left_path.push(false);

                    stack.push((right.as_ref(), right_path));
                    stack.push((left.as_ref(), left_path));
                }
            }
        }

        Self { codes }
    }

    /// Code for `symbol`, if it is in the alphabet.
    pub fn code(&self, symbol: u8) -> Option<&[bool]> {
        self.codes[symbol as usize].as_deref()
    }

    /// Number of symbols with a code.
    pub fn len(&self) -> usize {
        self.codes.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Symbols with their codes, in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &[bool])> + '_ {
        self.codes
            .iter()
            .enumerate()
            .filter_map(|(s, code)| code.as_deref().map(|c| (s as u8, c)))
    }

    /// Concatenate the code of every byte in `data` and pack the result.
    ///
    /// # Errors
    /// - `HuffmanError::DegenerateAlphabet` if the only code is empty
    /// - `HuffmanError::UnknownSymbol` if a byte has no code
    pub fn encode(&self, data: &[u8]) -> Result<Vec<u8>> {
        if let Some((symbol, _)) = self.iter().find(|(_, code)| code.is_empty()) {
            return Err(HuffmanError::DegenerateAlphabet { symbol }.into());
        }

        let mut writer = BitWriter::with_capacity(data.len());
        for &byte in data {
            let code = self.code(byte).ok_or(HuffmanError::UnknownSymbol(byte))?;
            writer.write_code(code);
        }

        Ok(writer.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::tree::FrequencyTable;

    fn table_for(data: &[u8]) -> CodeTable {
        let tree = HuffmanTree::from_frequencies(&FrequencyTable::from_bytes(data)).unwrap();
        CodeTable::from_tree(&tree)
    }

    fn bits(s: &str) -> Vec<bool> {
        s.chars().map(|c| c == '1').collect()
    }

    #[test]
    fn test_abracadabra_codes() {
        let table = table_for(b"abracadabra");
        assert_eq!(table.len(), 5);
        assert_eq!(table.code(b'a'), Some(bits("0").as_slice()));
        assert_eq!(table.code(b'c'), Some(bits("100").as_slice()));
        assert_eq!(table.code(b'd'), Some(bits("101").as_slice()));
        assert_eq!(table.code(b'b'), Some(bits("110").as_slice()));
        assert_eq!(table.code(b'r'), Some(bits("111").as_slice()));
        assert_eq!(table.code(b'x'), None);
    }

    #[test]
    fn test_prefix_free() {
        let table = table_for(b"it was the best of times, it was the worst of times");
        let codes: Vec<&[bool]> = table.iter().map(|(_, c)| c).collect();
        for (i, a) in codes.iter().enumerate() {
            for (j, b) in codes.iter().enumerate() {
                if i != j {
                    assert!(!b.starts_with(a), "code {i} is a prefix of code {j}");
                }
            }
        }
    }

    #[test]
    fn test_single_leaf_gets_empty_code() {
        let table = table_for(b"zzzz");
        assert_eq!(table.len(), 1);
        assert_eq!(table.code(b'z'), Some(&[][..]));
    }

    #[test]
    fn test_degenerate_table_refuses_encode() {
        let result = table_for(b"zzzz").encode(b"zz");
        assert!(matches!(
            result,
            Err(Error::Huffman(HuffmanError::DegenerateAlphabet { symbol: b'z' }))
        ));
    }

    #[test]
    fn test_unknown_symbol() {
        let result = table_for(b"ab").encode(b"abc");
        assert!(matches!(
            result,
            Err(Error::Huffman(HuffmanError::UnknownSymbol(b'c')))
        ));
    }

    #[test]
    fn test_encode_packs_codes() {
        // a=0 b=110 r=111 -> 0 110 111 0 = 01101110
        let packed = table_for(b"abracadabra").encode(b"abra").unwrap();
        assert_eq!(packed, vec![0b01101110]);
    }
}
