//! Container framing: many named blocks in one blob.
//!
//! Each entry becomes one self-contained record, and every record is
//! followed by the separator token. Records carry their own lengths, so the
//! parser never scans for the separator and a separator-shaped byte run
//! inside a name or payload cannot split a record.
//!
//! # Container Format
//!
//! ```text
//! record_1 || SEPARATOR || record_2 || SEPARATOR || ... || record_n || SEPARATOR
//! ```
//!
//! # Record Format
//!
//! ```text
//! +------------------+
//! | Magic (4 bytes)  |  0x43 0x41 0x54 0x52 ("CATR")
//! +------------------+
//! | name_len (2)     |  u16 little-endian
//! +------------------+
//! | block_len (4)    |  u32 little-endian
//! +------------------+
//! | name             |  UTF-8 (name_len bytes)
//! +------------------+
//! | block            |  compressed block (block_len bytes)
//! +------------------+
//! ```

use crate::codec::{self, split_array, split_field, CompressedBlock};
use crate::error::{ContainerError, Result};

/// Token written after every record.
pub const SEPARATOR: &[u8; 14] = b"FILE_SEPARATOR";

/// Magic number for records: "CATR"
const MAGIC: [u8; 4] = [0x43, 0x41, 0x54, 0x52];

/// Size of a record header in bytes
const HEADER_SIZE: usize = 10;

/// One named compressed block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerEntry {
    /// Original file name
    pub name: String,

    /// Compressed contents
    pub block: CompressedBlock,
}

impl ContainerEntry {
    pub fn new(name: impl Into<String>, block: CompressedBlock) -> Self {
        Self {
            name: name.into(),
            block,
        }
    }

    /// Compress `data` into a new entry.
    pub fn compress(name: impl Into<String>, data: &[u8]) -> Result<Self> {
        Ok(Self::new(name, codec::encode(data)?))
    }

    /// Decompress this entry's block.
    pub fn decompress(&self) -> Result<Vec<u8>> {
        codec::decode(&self.block)
    }

    fn to_record(&self) -> Result<Vec<u8>> {
        let name = self.name.as_bytes();
        let block = self.block.to_bytes()?;

        let name_len = u16::try_from(name.len()).map_err(|_| ContainerError::TooLarge {
            what: "entry name",
            len: name.len(),
        })?;
        let block_len = u32::try_from(block.len()).map_err(|_| ContainerError::TooLarge {
            what: "block",
            len: block.len(),
        })?;

        let mut record = Vec::with_capacity(HEADER_SIZE + name.len() + block.len());
        record.extend_from_slice(&MAGIC);
        record.extend_from_slice(&name_len.to_le_bytes());
        record.extend_from_slice(&block_len.to_le_bytes());
        record.extend_from_slice(name);
        record.extend_from_slice(&block);
        Ok(record)
    }
}

/// Ordered collection of uniquely named entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Container {
    entries: Vec<ContainerEntry>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a container from entries, in order.
    ///
    /// # Errors
    /// Same as [`Container::push`].
    pub fn from_entries(entries: impl IntoIterator<Item = ContainerEntry>) -> Result<Self> {
        let mut container = Self::new();
        for entry in entries {
            container.push(entry)?;
        }
        Ok(container)
    }

    /// Append an entry.
    ///
    /// # Errors
    /// - `ContainerError::InvalidEntryName` for an empty name or one longer
    ///   than `u16::MAX` bytes
    /// - `ContainerError::DuplicateName` if the name is already present
    pub fn push(&mut self, entry: ContainerEntry) -> Result<()> {
        if entry.name.is_empty() {
            return Err(ContainerError::InvalidEntryName {
                name: entry.name,
                reason: "name is empty",
            }
            .into());
        }
        if entry.name.len() > u16::MAX as usize {
            return Err(ContainerError::InvalidEntryName {
                name: entry.name,
                reason: "name is longer than 65535 bytes",
            }
            .into());
        }
        if self.get(&entry.name).is_some() {
            return Err(ContainerError::DuplicateName(entry.name).into());
        }

        self.entries.push(entry);
        Ok(())
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&ContainerEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ContainerEntry> {
        self.entries.iter()
    }

    /// Entry names in container order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize every entry, each record followed by [`SEPARATOR`].
    pub fn frame(&self) -> Result<Vec<u8>> {
        frame(&self.entries)
    }

    /// Parse a framed container.
    ///
    /// # Errors
    /// Same as [`unframe`], plus `ContainerError::DuplicateName`.
    pub fn unframe(bytes: &[u8]) -> Result<Self> {
        Self::from_entries(unframe(bytes)?)
    }
}

impl<'a> IntoIterator for &'a Container {
    type Item = &'a ContainerEntry;
    type IntoIter = std::slice::Iter<'a, ContainerEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Serialize entries in order, each record followed by [`SEPARATOR`].
pub fn frame(entries: &[ContainerEntry]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for entry in entries {
        out.extend_from_slice(&entry.to_record()?);
        out.extend_from_slice(SEPARATOR);
    }

    log::debug!("framed {} entries into {} bytes", entries.len(), out.len());
    Ok(out)
}

/// Parse a framed blob back into its entries, in order.
///
/// Empty fragments (a separator with nothing in front of it) are skipped.
///
/// # Errors
/// `Error::CorruptContainer` on a bad magic, truncated header or body,
/// missing separator, non-UTF-8 name, or a block that fails to parse.
pub fn unframe(bytes: &[u8]) -> Result<Vec<ContainerEntry>> {
    let mut entries = Vec::new();
    let mut rest = bytes;

    loop {
        while let Some(after) = rest.strip_prefix(SEPARATOR.as_slice()) {
            rest = after;
        }
        if rest.is_empty() {
            break;
        }

        let offset = bytes.len() - rest.len();
        let (entry, after) = parse_record(rest)?;
        rest = after
            .strip_prefix(SEPARATOR.as_slice())
            .ok_or(ContainerError::MissingSeparator { offset })?;
        entries.push(entry);
    }

    log::debug!("unframed {} entries from {} bytes", entries.len(), bytes.len());
    Ok(entries)
}

/// Parse one record from the front of `bytes`, returning what follows it.
fn parse_record(bytes: &[u8]) -> Result<(ContainerEntry, &[u8])> {
    let (header, rest) = split_array::<HEADER_SIZE>(bytes, "record header")?;
    let (magic, lengths) = split_array::<4>(header, "record magic")?;
    if *magic != MAGIC {
        return Err(ContainerError::InvalidMagic {
            expected: MAGIC,
            actual: *magic,
        }
        .into());
    }

    let (name_len, block_len) = split_array::<2>(lengths, "record name length")?;
    let name_len = u16::from_le_bytes(*name_len) as usize;
    let (block_len, _) = split_array::<4>(block_len, "record block length")?;
    let block_len = u32::from_le_bytes(*block_len) as usize;

    let (name, rest) = split_field(rest, name_len, "entry name")?;
    let (block, rest) = split_field(rest, block_len, "entry block")?;

    let name = std::str::from_utf8(name).map_err(|_| ContainerError::InvalidName)?;
    let block = CompressedBlock::from_bytes(block)?;

    Ok((ContainerEntry::new(name, block), rest))
}
