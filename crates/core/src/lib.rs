//! catc-core: Huffman block codec, container framing and carrier attachment
//!
//! This library provides the core components for a tool that:
//! - Compresses files with per-file Huffman coding
//! - Frames many compressed files into one container blob
//! - Hides the blob at the end of a carrier file (e.g. a PNG)
//! - Extracts and decompresses it again
//!
//! # Architecture
//!
//! The system is designed around clear module boundaries:
//! - `bitio`: Bit packing and unpacking
//! - `tree`: Frequency table and Huffman tree construction
//! - `code_table`: Symbol-to-code mapping
//! - `codec`: Block encode/decode and block wire format
//! - `container`: Named block framing
//! - `carrier`: Attach/extract behind a marker
//! - `metrics`: Observable batch behavior
//!
//! # Example
//!
//! ```
//! use catc_core::{carrier, Container, ContainerEntry};
//!
//! let container = Container::from_entries([
//!     ContainerEntry::compress("x.txt", b"hello").unwrap(),
//!     ContainerEntry::compress("y.txt", b"world").unwrap(),
//! ])
//! .unwrap();
//!
//! let image = carrier::attach(b"\x89PNG...", &container.frame().unwrap());
//! let recovered = Container::unframe(carrier::extract(&image).unwrap()).unwrap();
//! assert_eq!(recovered.get("y.txt").unwrap().decompress().unwrap(), b"world");
//! ```
//!
//! # Design Principles
//!
//! - **No panics**: All errors are structured and recoverable
//! - **In memory**: Layers hand buffers to each other, never temp files
//! - **Deterministic**: Identical input gives identical bytes

pub mod bitio;
pub mod carrier;
pub mod code_table;
pub mod codec;
pub mod container;
pub mod error;
pub mod metrics;
pub mod tree;

// Re-export commonly used types
pub use codec::{decode, encode, CompressedBlock};
pub use container::{Container, ContainerEntry};
pub use error::{Error, Result};
pub use tree::{FrequencyTable, HuffmanTree};
