//! Types for creating and editing localization containers
//!

use fb_hash::HashKey;
use indexmap::{map::Entry, IndexMap};
use tracing::{debug, instrument, trace, warn};

use crate::{
    binary::{derive_code_table, DuplicatePolicy, LocalizationBinary, LocalizationOptions},
    codec,
    error::{Error, Result},
    histogram::Histogram,
    index::{ContainerIndex, IndexEntry},
};

/// Collects strings and packs them into a [`LocalizationBinary`]
///
/// Strings keep the order they were inserted in; that order decides their layout in the blob.
///
/// ```
/// # fn doit() -> fb_loc::error::Result<()>
/// # {
/// use fb_loc::{LocalizationOptions, LocalizationWriter};
///
/// let mut writer = LocalizationWriter::new(LocalizationOptions::default());
/// writer.insert("ID_M_PLAY", "Play")?;
/// writer.insert("ID_M_QUIT", "Quit")?;
///
/// let binary = writer.finish()?;
/// assert_eq!(binary.lookup_string("ID_M_PLAY")?, "Play");
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct LocalizationWriter {
    options: LocalizationOptions,
    strings: IndexMap<HashKey, String>,
}

impl LocalizationWriter {
    pub fn new(options: LocalizationOptions) -> LocalizationWriter {
        LocalizationWriter {
            options,
            strings: IndexMap::new(),
        }
    }

    /// Start an edit of an existing container.
    ///
    /// Strings are taken in blob order, so finishing without changes reproduces the same bytes.
    /// Where the container repeats a key only the string a lookup would return is kept.
    #[instrument(skip_all, err, fields(entries = binary.len()))]
    pub fn from_binary(binary: &LocalizationBinary) -> Result<LocalizationWriter> {
        let mut writer = LocalizationWriter::new(binary.options());

        // Lookups resolve to the first of a run of equal keys; the rest are unreachable.
        let mut entries = binary
            .index()
            .iter()
            .enumerate()
            .filter(|&(position, entry)| {
                let shadowed = position > 0 && binary.index()[position - 1].key == entry.key;
                if shadowed {
                    warn!(key = %entry.key, "dropping shadowed duplicate");
                }
                !shadowed
            })
            .map(|(_, entry)| entry)
            .collect::<Vec<_>>();

        // Empty strings share an offset with their successor.
        entries.sort_by_key(|entry| (entry.offset, entry.byte_length()));

        for entry in entries {
            let text = binary.decode_entry(entry)?;
            writer.strings.insert(entry.key, text);
        }

        Ok(writer)
    }

    /// Options the container will be built with
    pub fn options(&self) -> LocalizationOptions {
        self.options
    }

    /// Number of strings collected so far
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Whether no strings have been collected
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Whether a string is stored under `key`
    pub fn contains_key(&self, key: HashKey) -> bool {
        self.strings.contains_key(&key)
    }

    /// Add a string under the key of `identifier`.
    pub fn insert(&mut self, identifier: impl AsRef<str>, text: impl Into<String>) -> Result<()> {
        let key = self.options.hash.hash(identifier.as_ref());
        self.insert_key(key, text)
    }

    /// Add a string under an already computed key.
    ///
    /// A key that is already present is handled according to [`DuplicatePolicy`].
    pub fn insert_key(&mut self, key: HashKey, text: impl Into<String>) -> Result<()> {
        if !key.fits(self.options.hash.width()) {
            return Err(Error::KeyOutOfRange(key));
        }

        match self.strings.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(text.into());
                Ok(())
            }
            Entry::Occupied(_) => match self.options.duplicates {
                DuplicatePolicy::Reject => Err(Error::DuplicateKey(key)),
                DuplicatePolicy::KeepFirst => {
                    warn!(%key, "skipping duplicate key");
                    Ok(())
                }
            },
        }
    }

    /// Set the string of `identifier`, returning the text it replaced.
    pub fn replace(
        &mut self,
        identifier: impl AsRef<str>,
        text: impl Into<String>,
    ) -> Result<Option<String>> {
        let key = self.options.hash.hash(identifier.as_ref());
        self.replace_key(key, text)
    }

    /// Set the string stored under `key`, returning the text it replaced.
    ///
    /// A replaced string keeps its position in the blob.
    pub fn replace_key(&mut self, key: HashKey, text: impl Into<String>) -> Result<Option<String>> {
        if !key.fits(self.options.hash.width()) {
            return Err(Error::KeyOutOfRange(key));
        }
        Ok(self.strings.insert(key, text.into()))
    }

    /// Remove the string of `identifier`.
    pub fn remove(&mut self, identifier: impl AsRef<str>) -> Option<String> {
        let key = self.options.hash.hash(identifier.as_ref());
        self.remove_key(key)
    }

    /// Remove the string stored under `key`.
    pub fn remove_key(&mut self, key: HashKey) -> Option<String> {
        self.strings.shift_remove(&key)
    }

    /// Derive the code from every collected string and encode them.
    #[instrument(skip(self), err, fields(entries = self.len()))]
    pub fn finish(self) -> Result<LocalizationBinary> {
        let corpus = self
            .strings
            .values()
            .flat_map(|text| text.bytes())
            .collect::<Vec<_>>();

        let histogram = if corpus.is_empty() {
            Histogram::default()
        } else {
            Histogram::build(&corpus)?
        };
        let code_table = derive_code_table(&histogram)?;

        let mut blob = Vec::new();
        let mut index = ContainerIndex::default();
        for (&key, text) in &self.strings {
            let encoded = codec::encode(text.as_bytes(), &code_table)?;
            let entry = IndexEntry::new(
                key,
                u32::try_from(blob.len()).map_err(|_| Error::CapacityExceeded("blob size"))?,
                u32::try_from(encoded.bit_length)
                    .map_err(|_| Error::CapacityExceeded("bitstream length"))?,
                u32::try_from(text.len()).map_err(|_| Error::CapacityExceeded("string length"))?,
            );
            trace!(%key, offset = entry.offset, bits = entry.bit_length, "encoded string");

            blob.extend_from_slice(&encoded.data);
            index.insert(entry)?;
        }

        debug!(
            symbols = histogram.len(),
            max_code = code_table.max_length(),
            blob = blob.len(),
            "built container"
        );

        Ok(LocalizationBinary::from_parts(
            self.options,
            histogram,
            code_table,
            index,
            blob,
        ))
    }
}
