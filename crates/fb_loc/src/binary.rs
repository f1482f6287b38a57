//! Types for reading localization containers
//!

use std::io::{Cursor, Read, Write};

use binrw::{BinRead, BinWrite};
use bon::Builder;
use fb_hash::{HashKey, HashVariant};
use tracing::{debug, instrument, warn};

use crate::{
    code::CodeTable,
    codec,
    error::{Error, InvalidFormatError, KeyNotFoundError, Result},
    histogram::Histogram,
    index::{ContainerIndex, IndexEntry},
    types::{LocHeader, FORMAT_VERSION, HEADER_SIZE, MAGIC, SYMBOL_SIZE},
    write::LocalizationWriter,
};

/// What to do when a second string resolves to a key that is already taken
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// Fail with [`Error::DuplicateKey`]
    #[default]
    Reject,

    /// Keep the string inserted first and drop the later one
    KeepFirst,
}

/// Options for how a container is keyed and built
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Builder)]
pub struct LocalizationOptions {
    /// The hash used to turn identifiers into keys; also fixes the key width on disk
    #[builder(default)]
    pub hash: HashVariant,

    /// How colliding keys are handled while building
    #[builder(default)]
    pub duplicates: DuplicatePolicy,
}

/// Localization container
///
/// ```
/// # fn doit() -> fb_loc::error::Result<()>
/// # {
/// use fb_loc::LocalizationBinary;
///
/// let binary = LocalizationBinary::build([
///     ("ID_M_PLAY", "Play"),
///     ("ID_M_QUIT", "Quit"),
/// ])?;
///
/// let bytes = binary.serialize()?;
/// let reopened = LocalizationBinary::open(&bytes)?;
///
/// assert_eq!(reopened.lookup_string("ID_M_QUIT")?, "Quit");
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalizationBinary {
    options: LocalizationOptions,
    histogram: Histogram,
    code_table: CodeTable,
    index: ContainerIndex,
    blob: Vec<u8>,
}

impl LocalizationBinary {
    /// Parse a container keyed with the default hash.
    pub fn open(buffer: &[u8]) -> Result<LocalizationBinary> {
        Self::open_with(buffer, LocalizationOptions::default())
    }

    /// Parse a container whose keys were produced by `options.hash`.
    #[instrument(skip_all, err, fields(size = buffer.len(), hash = %options.hash))]
    pub fn open_with(buffer: &[u8], options: LocalizationOptions) -> Result<LocalizationBinary> {
        let actual = buffer.len() as u64;
        if buffer.len() < HEADER_SIZE {
            return Err(Error::Truncated {
                expected: HEADER_SIZE as u64,
                actual,
            });
        }

        let mut reader = Cursor::new(buffer);
        let header = LocHeader::read(&mut reader).map_err(|err| match err {
            binrw::Error::BadMagic { .. } => {
                let mut magic = MAGIC;
                magic.copy_from_slice(&buffer[..MAGIC.len()]);
                InvalidFormatError::Magic(magic).into()
            }
            err => Error::from(err),
        })?;

        if header.version != FORMAT_VERSION {
            return Err(InvalidFormatError::Version(header.version).into());
        }
        if header.symbols > 256 {
            return Err(InvalidFormatError::SymbolCount(header.symbols).into());
        }

        let width = options.hash.width();
        let blob_start = HEADER_SIZE as u64
            + header.symbols as u64 * SYMBOL_SIZE as u64
            + header.entries as u64 * IndexEntry::size(width) as u64;
        if blob_start > actual {
            return Err(Error::Truncated {
                expected: blob_start,
                actual,
            });
        }

        let histogram = Histogram::read(&mut reader, header.symbols)?;
        let code_table = derive_code_table(&histogram)?;
        let index = ContainerIndex::read(&mut reader, header.entries, width)?;

        let blob = buffer[blob_start as usize..].to_vec();
        if let Some(end) = index.iter().map(IndexEntry::end).max() {
            if end > blob.len() as u64 {
                return Err(Error::Truncated {
                    expected: blob_start + end,
                    actual,
                });
            }
        }

        if let Some(entry) = index
            .iter()
            .find(|entry| entry.decoded_length > entry.bit_length)
        {
            return Err(InvalidFormatError::EntryLength {
                key: entry.key,
                bit_length: entry.bit_length,
                decoded_length: entry.decoded_length,
            }
            .into());
        }

        let coded = index
            .iter()
            .map(|entry| entry.decoded_length as u64)
            .sum::<u64>();
        if coded != histogram.total() {
            warn!(
                coded,
                histogram = histogram.total(),
                "histogram total does not match decoded lengths"
            );
        }

        let collisions = index.collisions();
        if !collisions.is_empty() {
            warn!(count = collisions.len(), "index contains colliding keys");
        }

        debug!(
            entries = header.entries,
            symbols = header.symbols,
            blob = blob.len(),
            "opened container"
        );

        Ok(LocalizationBinary {
            options,
            histogram,
            code_table,
            index,
            blob,
        })
    }

    /// Buffer everything `reader` yields and parse it with [`LocalizationBinary::open_with`].
    pub fn read<R: Read>(mut reader: R, options: LocalizationOptions) -> Result<LocalizationBinary> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        Self::open_with(&buffer, options)
    }

    /// Build a container from `(identifier, text)` pairs keyed with the default hash.
    ///
    /// Strings are laid out in the blob in the order they are given, so the same input always
    /// produces the same bytes.
    pub fn build<I, K, V>(entries: I) -> Result<LocalizationBinary>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self::build_with(entries, LocalizationOptions::default())
    }

    /// Build a container from `(identifier, text)` pairs with the given options.
    pub fn build_with<I, K, V>(entries: I, options: LocalizationOptions) -> Result<LocalizationBinary>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut writer = LocalizationWriter::new(options);
        for (identifier, text) in entries {
            writer.insert(identifier, text)?;
        }
        writer.finish()
    }

    pub(crate) fn from_parts(
        options: LocalizationOptions,
        histogram: Histogram,
        code_table: CodeTable,
        index: ContainerIndex,
        blob: Vec<u8>,
    ) -> LocalizationBinary {
        LocalizationBinary {
            options,
            histogram,
            code_table,
            index,
            blob,
        }
    }

    /// Number of strings in the container
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether this container holds no strings
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Options the container was opened or built with
    pub fn options(&self) -> LocalizationOptions {
        self.options
    }

    /// Persisted symbol frequencies
    pub fn histogram(&self) -> &Histogram {
        &self.histogram
    }

    /// Prefix code derived from the histogram
    pub fn code_table(&self) -> &CodeTable {
        &self.code_table
    }

    /// Sorted key index
    pub fn index(&self) -> &ContainerIndex {
        &self.index
    }

    /// Encoded strings, back to back
    pub fn blob(&self) -> &[u8] {
        &self.blob
    }

    /// Key `identifier` hashes to in this container
    pub fn key_for(&self, identifier: &str) -> HashKey {
        self.options.hash.hash(identifier)
    }

    /// Whether a string is stored under `identifier`
    pub fn contains(&self, identifier: impl AsRef<str>) -> bool {
        self.index
            .lookup(self.key_for(identifier.as_ref()))
            .is_some()
    }

    /// Keys in ascending order
    pub fn keys(&self) -> impl Iterator<Item = HashKey> + '_ {
        self.index.iter().map(|entry| entry.key)
    }

    /// Decode every string, in key order.
    pub fn entries(&self) -> impl Iterator<Item = Result<(HashKey, String)>> + '_ {
        self.index
            .iter()
            .map(|entry| Ok((entry.key, self.decode_entry(entry)?)))
    }

    /// Look up a string by its identifier.
    pub fn lookup_string(&self, identifier: impl AsRef<str>) -> Result<String> {
        let identifier = identifier.as_ref();
        match self.index.lookup(self.key_for(identifier)) {
            Some(entry) => self.decode_entry(entry),
            None => Err(KeyNotFoundError::Identifier(identifier.to_owned()).into()),
        }
    }

    /// Look up a string by an already computed key.
    pub fn lookup_key(&self, key: HashKey) -> Result<String> {
        match self.index.lookup(key) {
            Some(entry) => self.decode_entry(entry),
            None => Err(KeyNotFoundError::Key(key).into()),
        }
    }

    pub(crate) fn decode_entry(&self, entry: &IndexEntry) -> Result<String> {
        let data = self
            .blob
            .get(entry.offset as usize..entry.end() as usize)
            .ok_or(Error::Truncated {
                expected: entry.end(),
                actual: self.blob.len() as u64,
            })?;

        let bytes = codec::decode_bits(
            data,
            entry.bit_length as u64,
            &self.code_table,
            entry.decoded_length as usize,
        )?;

        Ok(String::from_utf8(bytes)?)
    }

    /// Write header, histogram, index and blob, in that order.
    #[instrument(skip_all, err, fields(entries = self.len()))]
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let width = self.options.hash.width();
        let header = LocHeader {
            entries: u32::try_from(self.index.len())
                .map_err(|_| Error::CapacityExceeded("entry count"))?,
            symbols: self.histogram.len() as u32,
            ..Default::default()
        };

        let capacity = HEADER_SIZE
            + self.histogram.len() * SYMBOL_SIZE
            + self.index.len() * IndexEntry::size(width)
            + self.blob.len();

        let mut output = Cursor::new(Vec::with_capacity(capacity));
        header.write(&mut output)?;
        self.histogram.write(&mut output)?;
        self.index.write(&mut output, width)?;
        output.write_all(&self.blob)?;

        debug!(size = capacity, "serialized container");

        Ok(output.into_inner())
    }

    /// Stream [`LocalizationBinary::serialize`] into `writer`.
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.serialize()?)?;
        Ok(())
    }
}

/// An empty histogram means every string is empty; there is nothing to decode.
pub(crate) fn derive_code_table(histogram: &Histogram) -> Result<CodeTable> {
    if histogram.is_empty() {
        return Ok(CodeTable::default());
    }
    histogram.code_table()
}

#[cfg(test)]
mod test {
    use fb_hash::{HashKey, HashVariant};
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use crate::binary::{DuplicatePolicy, LocalizationBinary, LocalizationOptions};
    use crate::error::{Error, InvalidFormatError, KeyNotFoundError, Result};

    #[rustfmt::skip]
    const YES_NO: [u8; 75] = [
        // Header
        0x00, 0x90, 0x03, 0x00,
        0x01, 0x00, 0x00, 0x00,
        0x02, 0x00, 0x00, 0x00,
        0x05, 0x00, 0x00, 0x00,
        // Histogram
        0x65, 0x01, 0x00, 0x00, 0x00,
        0x6E, 0x01, 0x00, 0x00, 0x00,
        0x6F, 0x01, 0x00, 0x00, 0x00,
        0x73, 0x01, 0x00, 0x00, 0x00,
        0x79, 0x01, 0x00, 0x00, 0x00,
        // Index
        0x74, 0xF7, 0xD4, 0x10,
        0x01, 0x00, 0x00, 0x00,
        0x05, 0x00, 0x00, 0x00,
        0x02, 0x00, 0x00, 0x00,

        0x2E, 0x92, 0x25, 0xDD,
        0x00, 0x00, 0x00, 0x00,
        0x07, 0x00, 0x00, 0x00,
        0x03, 0x00, 0x00, 0x00,
        // Blob
        0xB2, 0xE0,
    ];

    #[traced_test]
    #[test]
    fn build_is_byte_exact() -> Result<()> {
        let binary = LocalizationBinary::build([("ID_YES", "yes"), ("ID_NO", "no")])?;

        assert_eq!(
            format!("{:02X?}", binary.serialize()?),
            format!("{:02X?}", YES_NO)
        );

        Ok(())
    }

    #[traced_test]
    #[test]
    fn open_fixture() -> Result<()> {
        let binary = LocalizationBinary::open(&YES_NO)?;

        assert_eq!(binary.len(), 2);
        assert_eq!(binary.lookup_string("ID_YES")?, "yes");
        assert_eq!(binary.lookup_string("ID_NO")?, "no");
        assert_eq!(binary.lookup_key(HashKey::from(0x10D4F774u32))?, "no");
        assert!(binary.contains("ID_YES"));
        assert!(!binary.contains("ID_MAYBE"));

        Ok(())
    }

    #[test]
    fn lookup_miss() -> Result<()> {
        let binary = LocalizationBinary::open(&YES_NO)?;

        assert!(matches!(
            binary.lookup_string("ID_MAYBE"),
            Err(Error::KeyNotFound(KeyNotFoundError::Identifier(id))) if id == "ID_MAYBE"
        ));
        assert!(matches!(
            binary.lookup_key(HashKey::from(1u32)),
            Err(Error::KeyNotFound(KeyNotFoundError::Key(_)))
        ));

        Ok(())
    }

    #[test]
    fn open_rejects_bad_magic_and_version() {
        let mut input = YES_NO;
        input[0] = 0xFF;
        assert!(matches!(
            LocalizationBinary::open(&input),
            Err(Error::InvalidFormat(InvalidFormatError::Magic([0xFF, 0x90, 0x03, 0x00])))
        ));

        let mut input = YES_NO;
        input[4] = 0x02;
        assert!(matches!(
            LocalizationBinary::open(&input),
            Err(Error::InvalidFormat(InvalidFormatError::Version(2)))
        ));
    }

    #[test]
    fn open_rejects_every_truncation() {
        for length in 0..YES_NO.len() {
            let result = LocalizationBinary::open(&YES_NO[..length]);
            assert!(
                matches!(result, Err(Error::Truncated { .. })),
                "length {length}: {result:?}"
            );
        }
    }

    #[test]
    fn entries_in_key_order() -> Result<()> {
        let binary = LocalizationBinary::open(&YES_NO)?;

        let entries = binary.entries().collect::<Result<Vec<_>>>()?;
        assert_eq!(
            entries,
            vec![
                (HashKey::from(0x10D4F774u32), "no".to_owned()),
                (HashKey::from(0xDD25922Eu32), "yes".to_owned()),
            ]
        );

        Ok(())
    }

    #[test]
    fn sixty_four_bit_keys() -> Result<()> {
        let options = LocalizationOptions::builder()
            .hash(HashVariant::Fnv1a_64)
            .build();
        let binary =
            LocalizationBinary::build_with([("ID_YES", "yes"), ("ID_NO", "no")], options)?;

        let bytes = binary.serialize()?;
        assert_eq!(bytes.len(), YES_NO.len() + 2 * 4);

        let reopened = LocalizationBinary::open_with(&bytes, options)?;
        assert_eq!(reopened.lookup_string("ID_YES")?, "yes");
        assert_eq!(reopened, binary);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn keep_first_policy() -> Result<()> {
        let options = LocalizationOptions::builder()
            .hash(HashVariant::LocId32)
            .duplicates(DuplicatePolicy::KeepFirst)
            .build();

        // "bC" and "cb" share a key under the engine's string id constants.
        let binary = LocalizationBinary::build_with([("bC", "first"), ("cb", "second")], options)?;

        assert_eq!(binary.len(), 1);
        assert_eq!(binary.lookup_string("cb")?, "first");
        assert!(logs_contain("duplicate"));

        Ok(())
    }
}
