//! # Localization Container Format Documentation
//!
//! This crate reads and writes the **localization string containers** of *Frostbite* games. A
//! container maps hashed string identifiers to texts. Every text is compressed with a single
//! Huffman code shared by the whole container, so the container carries the symbol frequencies the
//! code is derived from.
//!
//! ## File Structure
//!
//! A container consists of a header, followed by the symbol histogram, the key index, and the
//! encoded strings.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: `00 90 03 00`                                     |
//! | 0x0004         | Version                | 4 bytes: Always 1                                          |
//! | 0x0008         | Entry Count            | 4 bytes: The number of strings in this container           |
//! | 0x000C         | Symbol Count           | 4 bytes: The number of distinct bytes in the histogram     |
//!
//! ### Histogram
//!
//! After the header come `Symbol Count` records in ascending symbol order:
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Symbol                 | 1 byte: The byte value                                  |
//! | 0x0001         | Frequency              | 4 bytes: Occurrences of the byte in all strings         |
//!
//! The prefix code is rebuilt from these records on open. Equal weights are merged in a fixed
//! order, so every reader derives the same codewords.
//!
//! ### Index
//!
//! `Entry Count` records sorted ascending by key:
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Key                    | 4 or 8 bytes: Hash of the identifier                    |
//! | +0x0000        | Offset                 | 4 bytes: Start of the bitstream within the blob         |
//! | +0x0004        | Bit Length             | 4 bytes: Meaningful bits in the bitstream               |
//! | +0x0008        | Decoded Length         | 4 bytes: Bytes the bitstream decodes to                 |
//!
//! The key width follows from the [`HashVariant`] the container was built with and is not stored
//! in the file.
//!
//! ### Blob
//!
//! The bitstreams, back to back and each padded to a whole byte, run to the end of the file.
//!
//! ## Additional Information
//!
//! - **Endianness**: Little-endian for all multi-byte integers
//! - **Bit order**: Codewords are packed most significant bit first
//! - **Text**: UTF-8
//!

pub mod binary;
pub mod code;
pub mod codec;
pub mod error;
pub mod histogram;
pub mod index;
#[cfg(feature = "serde")]
mod serde;
pub mod table;
pub mod types;
pub mod write;

pub use binary::{DuplicatePolicy, LocalizationBinary, LocalizationOptions};
pub use code::CodeTable;
pub use fb_hash::{HashKey, HashVariant};
pub use histogram::Histogram;
pub use index::{ContainerIndex, IndexEntry};
pub use table::StringTable;
pub use write::LocalizationWriter;
