//! Error types for the catc codec and container layers.
//!
//! All operations return structured errors rather than panicking, so a
//! batch run can log a failed file and move on to the next one.

use thiserror::Error;

/// Top-level error type for all operations in the system.
///
/// Each variant corresponds to a specific failure domain:
/// - Huffman: tree construction, encode or decode failures
/// - Container: framed records that fail to parse (corrupt container)
/// - Carrier: locating the attached payload inside a carrier file
/// - I/O: file system operations
#[derive(Debug, Error)]
pub enum Error {
    /// Huffman codec error (e.g., empty input, truncated stream)
    #[error("huffman codec error: {0}")]
    Huffman(#[from] HuffmanError),

    /// A container, record or block failed to deserialize
    #[error("corrupt container: {0}")]
    CorruptContainer(#[from] ContainerError),

    /// Carrier attachment error
    #[error("carrier error: {0}")]
    Carrier(#[from] CarrierError),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True if this error means the input had no bytes to encode.
    pub fn is_empty_input(&self) -> bool {
        matches!(self, Error::Huffman(HuffmanError::EmptyInput))
    }

    /// True if this error means a carrier had no attachment marker.
    pub fn is_marker_not_found(&self) -> bool {
        matches!(self, Error::Carrier(CarrierError::MarkerNotFound))
    }
}

/// Huffman codec errors.
#[derive(Debug, Error)]
pub enum HuffmanError {
    /// Encode was called on zero-length data
    #[error("empty input: no symbols to build a tree from")]
    EmptyInput,

    /// Only one distinct symbol, so its code is the empty bit-string
    #[error("degenerate alphabet: symbol {symbol:#04x} is the only symbol and has an empty code")]
    DegenerateAlphabet { symbol: u8 },

    /// A byte to encode has no code in the table
    #[error("symbol {0:#04x} has no code in this table")]
    UnknownSymbol(u8),

    /// The bit stream ran out before every symbol was decoded
    #[error("truncated bit stream: expected {expected} symbols, decoded {decoded}")]
    TruncatedStream { expected: u64, decoded: u64 },

    /// A block would hold more than `max` symbols
    #[error("block of {len} symbols exceeds the {max} symbol limit")]
    BlockTooLarge { len: u64, max: u64 },
}

/// Reasons a framed container, record or compressed block is rejected.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Invalid magic number in a record header
    #[error("invalid record magic: expected {expected:?}, got {actual:?}")]
    InvalidMagic { expected: [u8; 4], actual: [u8; 4] },

    /// Buffer is too short for the field being read
    #[error("truncated {what}: need {required} bytes, got {actual}")]
    Truncated {
        what: &'static str,
        required: usize,
        actual: usize,
    },

    /// A record was not followed by the separator token
    #[error("missing separator after record at offset {offset}")]
    MissingSeparator { offset: usize },

    /// Entry name is not valid UTF-8
    #[error("entry name is not valid UTF-8")]
    InvalidName,

    /// Bytes left over after a block or tree was fully parsed
    #[error("{count} trailing bytes after {what}")]
    TrailingBytes { what: &'static str, count: usize },

    /// Unknown node tag in a serialized tree
    #[error("unknown tree node tag {0:#04x}")]
    UnknownNodeTag(u8),

    /// Tree deeper than any Huffman tree over a byte alphabet can be
    #[error("tree depth exceeds {max}")]
    TreeTooDeep { max: usize },

    /// A symbol appears in more than one leaf
    #[error("symbol {0:#04x} appears in more than one leaf")]
    DuplicateSymbol(u8),

    /// A leaf carries zero weight, or weights overflow
    #[error("invalid leaf weight")]
    InvalidWeight,

    /// Packed payload length disagrees with the tree's code lengths
    #[error("packed length mismatch: tree needs {expected} bytes, block has {actual}")]
    PackedLengthMismatch { expected: u64, actual: u64 },

    /// A field is too large for its length prefix
    #[error("{what} of {len} bytes is too large to frame")]
    TooLarge { what: &'static str, len: usize },

    /// A serialized tree claims more symbols than a block may hold
    #[error("tree claims {count} symbols, limit is {max}")]
    TooManySymbols { count: u64, max: u64 },

    /// A bare-leaf block carries packed bytes
    #[error("single-symbol block carries {0} packed bytes")]
    UnexpectedPayload(usize),

    /// Two entries share a name
    #[error("duplicate entry name {0:?}")]
    DuplicateName(String),

    /// Entry name is empty or too long to frame
    #[error("invalid entry name {name:?}: {reason}")]
    InvalidEntryName { name: String, reason: &'static str },
}

/// Carrier attachment errors.
#[derive(Debug, Error)]
pub enum CarrierError {
    /// The carrier does not contain the attachment marker
    #[error("attachment marker not found in carrier")]
    MarkerNotFound,
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;
