//! Sorted key index of a container.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use derive_more::derive::{Constructor, Deref, IntoIterator};
use fb_hash::{HashKey, KeyWidth};

use crate::error::{Error, InvalidFormatError, Result};

/// Location of one encoded string inside the blob
#[derive(Constructor, Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Hash of the string's identifier
    pub key: HashKey,

    /// Byte offset of the bitstream from the start of the blob
    pub offset: u32,

    /// Number of meaningful bits in the bitstream
    pub bit_length: u32,

    /// Number of bytes the bitstream decodes to
    pub decoded_length: u32,
}

impl IndexEntry {
    /// Size of an entry on disk for the given key width
    pub const fn size(width: KeyWidth) -> usize {
        width.bytes() + 12
    }

    /// Number of blob bytes the bitstream occupies
    pub const fn byte_length(&self) -> u32 {
        self.bit_length.div_ceil(8)
    }

    /// Offset one past the last blob byte of the bitstream
    pub const fn end(&self) -> u64 {
        self.offset as u64 + self.byte_length() as u64
    }

    /// Read a single entry with keys of `width`.
    pub fn read<R: Read>(reader: &mut R, width: KeyWidth) -> Result<IndexEntry> {
        let key = match width {
            KeyWidth::Bits32 => HashKey::from(reader.read_u32::<LittleEndian>()?),
            KeyWidth::Bits64 => HashKey::from(reader.read_u64::<LittleEndian>()?),
        };

        Ok(IndexEntry {
            key,
            offset: reader.read_u32::<LittleEndian>()?,
            bit_length: reader.read_u32::<LittleEndian>()?,
            decoded_length: reader.read_u32::<LittleEndian>()?,
        })
    }

    /// Write this entry with keys of `width`.
    pub fn write<W: Write>(&self, writer: &mut W, width: KeyWidth) -> Result<()> {
        match width {
            KeyWidth::Bits32 => writer.write_u32::<LittleEndian>(
                u32::try_from(self.key.get()).map_err(|_| Error::KeyOutOfRange(self.key))?,
            )?,
            KeyWidth::Bits64 => writer.write_u64::<LittleEndian>(self.key.get())?,
        }
        writer.write_u32::<LittleEndian>(self.offset)?;
        writer.write_u32::<LittleEndian>(self.bit_length)?;
        writer.write_u32::<LittleEndian>(self.decoded_length)?;
        Ok(())
    }
}

/// Entries ordered ascending by key
///
/// Lookups are a binary search. [`ContainerIndex::insert`] refuses a key that is already present,
/// while an index read from a file may carry repeated keys; those are kept in file order, reported
/// by [`ContainerIndex::collisions`], and a lookup resolves to the first of them.
#[derive(Deref, IntoIterator, Debug, Clone, Default, PartialEq, Eq)]
#[into_iterator(owned, ref)]
pub struct ContainerIndex {
    entries: Vec<IndexEntry>,
}

impl ContainerIndex {
    /// Wrap entries that are already sorted by key.
    pub fn from_sorted(entries: Vec<IndexEntry>) -> Result<ContainerIndex> {
        if let Some(position) = entries.windows(2).position(|pair| pair[0].key > pair[1].key) {
            return Err(InvalidFormatError::UnsortedIndex(position + 1).into());
        }
        Ok(ContainerIndex { entries })
    }

    /// Add an entry at its sorted position.
    ///
    /// Fails with [`Error::DuplicateKey`] when the key is already present, leaving the index
    /// unchanged. Whether that rejects the whole build is up to the caller.
    pub fn insert(&mut self, entry: IndexEntry) -> Result<()> {
        let position = self.partition(entry.key);
        if self
            .entries
            .get(position)
            .is_some_and(|existing| existing.key == entry.key)
        {
            return Err(Error::DuplicateKey(entry.key));
        }
        self.entries.insert(position, entry);
        Ok(())
    }

    /// Find the entry stored under `key`.
    pub fn lookup(&self, key: HashKey) -> Option<&IndexEntry> {
        self.entries
            .get(self.partition(key))
            .filter(|entry| entry.key == key)
    }

    /// Remove the first entry stored under `key`.
    pub fn remove(&mut self, key: HashKey) -> Option<IndexEntry> {
        let position = self.partition(key);
        match self.entries.get(position) {
            Some(entry) if entry.key == key => Some(self.entries.remove(position)),
            _ => None,
        }
    }

    /// Keys that appear more than once
    pub fn collisions(&self) -> Vec<HashKey> {
        let mut keys = self
            .entries
            .windows(2)
            .filter(|pair| pair[0].key == pair[1].key)
            .map(|pair| pair[0].key)
            .collect::<Vec<_>>();
        keys.dedup();
        keys
    }

    /// Read `count` entries, rejecting an index that is out of key order.
    pub fn read<R: Read>(reader: &mut R, count: u32, width: KeyWidth) -> Result<ContainerIndex> {
        let entries = (0..count)
            .map(|_| IndexEntry::read(reader, width))
            .collect::<Result<Vec<_>>>()?;
        ContainerIndex::from_sorted(entries)
    }

    /// Write every entry in key order.
    pub fn write<W: Write>(&self, writer: &mut W, width: KeyWidth) -> Result<()> {
        for entry in &self.entries {
            entry.write(writer, width)?;
        }
        Ok(())
    }

    fn partition(&self, key: HashKey) -> usize {
        self.entries.partition_point(|entry| entry.key < key)
    }
}
