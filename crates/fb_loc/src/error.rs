//! Error types that can be emitted from this library

use fb_hash::HashKey;
use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// Transparent warpper for [`std::string::FromUtf8Error`]
    #[error(transparent)]
    UTF8Error(#[from] std::string::FromUtf8Error),

    /// file is not a localization container this library understands
    #[error("invalid localization container")]
    InvalidFormat(#[from] InvalidFormatError),

    /// a declared size runs past the end of the buffer
    #[error("container is truncated: needs {expected} bytes, found {actual}")]
    Truncated { expected: u64, actual: u64 },

    /// encoded string data could not be decoded
    #[error("corrupt bitstream")]
    CorruptBitstream(#[from] CorruptBitstreamError),

    /// no string is stored under the requested key
    #[error("unable to find requested string")]
    KeyNotFound(#[from] KeyNotFoundError),

    /// two entries resolve to the same hash key
    #[error("duplicate hash key {0}")]
    DuplicateKey(HashKey),

    /// a symbol table cannot be derived from zero bytes
    #[error("cannot build a histogram from empty input")]
    EmptyInput,

    /// the byte has no codeword in the code table
    #[error("byte {0:#04X} has no codeword")]
    MissingSymbol(u8),

    /// the raw key does not fit the key width of the container
    #[error("key {0} does not fit the configured key width")]
    KeyOutOfRange(HashKey),

    /// a size does not fit the 32 bit field it is stored in
    #[error("{0} exceeds the container limit")]
    CapacityExceeded(&'static str),
}

/// Further information on why a container was rejected
#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
pub enum InvalidFormatError {
    /// bad magic {0:02X?}
    #[error("bad magic {0:02X?}")]
    Magic([u8; 4]),

    /// unsupported version {0}
    #[error("unsupported version {0}")]
    Version(u32),

    /// histogram lists more symbols than a byte alphabet has
    #[error("histogram declares {0} symbols")]
    SymbolCount(u32),

    /// histogram lists a symbol twice
    #[error("histogram lists symbol {0:#04X} twice")]
    DuplicateSymbol(u8),

    /// histogram lists a symbol that never occurs
    #[error("histogram lists symbol {0:#04X} with zero frequency")]
    ZeroFrequency(u8),

    /// index is not sorted by key
    #[error("index entry {0} is out of key order")]
    UnsortedIndex(usize),

    /// entry claims more decoded bytes than it has bits
    #[error("entry {key} decodes {decoded_length} bytes from {bit_length} bits")]
    EntryLength {
        key: HashKey,
        bit_length: u32,
        decoded_length: u32,
    },
}

/// Further information on why a bitstream could not be decoded
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum CorruptBitstreamError {
    /// ran out of bits after {decoded} of {expected} symbols
    #[error("ran out of bits after {decoded} of {expected} symbols")]
    Exhausted { decoded: usize, expected: usize },

    /// bits ending at {0} match no codeword
    #[error("bits ending at offset {0} match no codeword")]
    InvalidCodeword(u64),
}

/// Error type to provide further information when a string has not been found
#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
pub enum KeyNotFoundError {
    /// by identifier {0}
    #[error("by identifier {0}")]
    Identifier(String),

    /// by key {0}
    #[error("by key {0}")]
    Key(HashKey),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
