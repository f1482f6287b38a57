//! Fixed layout records of the container.

use binrw::{BinRead, BinWrite};

/// Magic bytes every container starts with (`0x00039000`, little endian)
pub const MAGIC: [u8; 4] = [0x00, 0x90, 0x03, 0x00];

/// The only container version this library reads and writes
pub const FORMAT_VERSION: u32 = 1;

/// Size of [`LocHeader`] on disk, magic included
pub const HEADER_SIZE: usize = 16;

/// Size of [`SymbolFrequency`] on disk
pub const SYMBOL_SIZE: usize = 5;

/// Container header
///
/// Starts with [`MAGIC`] followed by the format version and the counts needed to size the
/// histogram and index sections. All data is stored in little endian format.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq, Eq)]
#[brw(magic = b"\x00\x90\x03\x00", little)]
pub struct LocHeader {
    /// Version of the container layout
    pub version: u32,

    /// The number of index entries stored in the file
    pub entries: u32,

    /// The number of (symbol, frequency) pairs in the histogram
    pub symbols: u32,
}

impl Default for LocHeader {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            entries: Default::default(),
            symbols: Default::default(),
        }
    }
}

/// A persisted histogram pair
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[brw(little)]
pub struct SymbolFrequency {
    /// Byte value
    pub symbol: u8,

    /// Number of times the byte occurs across every encoded string
    pub frequency: u32,
}
