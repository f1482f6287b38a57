use std::io::Cursor;

use fb_hash::{hash_str, HashKey, HashVariant};
use fb_loc::{
    error::{CorruptBitstreamError, Error, InvalidFormatError, Result},
    DuplicatePolicy, LocalizationBinary, LocalizationOptions, LocalizationWriter, StringTable,
};
use pretty_assertions::assert_eq;
use tracing_test::traced_test;

#[rustfmt::skip]
const SINGLE_SYMBOL: [u8; 38] = [
    // Header
    0x00, 0x90, 0x03, 0x00,
    0x01, 0x00, 0x00, 0x00,
    0x01, 0x00, 0x00, 0x00,
    0x01, 0x00, 0x00, 0x00,
    // Histogram
    0x61, 0x04, 0x00, 0x00, 0x00,
    // Index
    0xB6, 0x5C, 0x91, 0xA1,
    0x00, 0x00, 0x00, 0x00,
    0x04, 0x00, 0x00, 0x00,
    0x04, 0x00, 0x00, 0x00,
    // Blob
    0x00,
];

fn menu() -> Vec<(&'static str, &'static str)> {
    vec![
        ("ID_M_MAIN_PLAY", "Play"),
        ("ID_M_MAIN_OPTIONS", "Options"),
        ("ID_M_MAIN_QUIT", "Quit"),
        ("ID_M_CONFIRM_QUIT", "Are you sure you want to quit?"),
        ("ID_M_EMPTY", ""),
        ("ID_M_GREETING", "Добро пожаловать, солдат!"),
    ]
}

#[traced_test]
#[test]
fn single_symbol_container() -> Result<()> {
    let binary = LocalizationBinary::build([("ID_A", "aaaa")])?;

    assert_eq!(binary.serialize()?, SINGLE_SYMBOL);
    assert_eq!(
        LocalizationBinary::open(&SINGLE_SYMBOL)?.lookup_string("ID_A")?,
        "aaaa"
    );

    Ok(())
}

#[traced_test]
#[test]
fn round_trip() -> Result<()> {
    let binary = LocalizationBinary::build(menu())?;
    let reopened = LocalizationBinary::open(&binary.serialize()?)?;

    assert_eq!(reopened.len(), menu().len());
    for (identifier, text) in menu() {
        assert_eq!(reopened.lookup_string(identifier)?, text);
        assert_eq!(
            reopened.lookup_key(hash_str(identifier, HashVariant::Fnv1_32))?,
            text
        );
    }

    let keys = reopened.keys().collect::<Vec<_>>();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);

    Ok(())
}

#[test]
fn build_is_reproducible() -> Result<()> {
    let first = LocalizationBinary::build(menu())?.serialize()?;
    let second = LocalizationBinary::build(menu())?.serialize()?;

    assert_eq!(first, second);

    Ok(())
}

#[test]
fn stream_adaptors() -> Result<()> {
    let binary = LocalizationBinary::build(menu())?;

    let mut output = Vec::new();
    binary.write(&mut output)?;
    assert_eq!(output, binary.serialize()?);

    let reopened = LocalizationBinary::read(Cursor::new(output), LocalizationOptions::default())?;
    assert_eq!(reopened, binary);

    Ok(())
}

#[test]
fn every_prefix_is_truncated() -> Result<()> {
    let bytes = LocalizationBinary::build(menu())?.serialize()?;

    for length in 0..bytes.len() {
        let result = LocalizationBinary::open(&bytes[..length]);
        assert!(
            matches!(result, Err(Error::Truncated { .. })),
            "length {length}: {result:?}"
        );
    }

    Ok(())
}

#[test]
fn corrupt_blob() -> Result<()> {
    // "aaaa" is four one-bit zero codes; a set bit has no codeword.
    let mut bytes = SINGLE_SYMBOL;
    bytes[37] = 0x80;

    let binary = LocalizationBinary::open(&bytes)?;
    assert!(matches!(
        binary.lookup_string("ID_A"),
        Err(Error::CorruptBitstream(CorruptBitstreamError::InvalidCodeword(1)))
    ));

    Ok(())
}

fn yes_no() -> Result<Vec<u8>> {
    LocalizationBinary::build([("ID_YES", "yes"), ("ID_NO", "no")])?.serialize()
}

// Index entry fields of the "yes/no" container; "ID_NO" sorts first.
const NO_BIT_LENGTH: usize = 49;
const YES_BIT_LENGTH: usize = 65;

#[test]
fn huge_decoded_length() {
    let mut bytes = SINGLE_SYMBOL;
    bytes[33..37].copy_from_slice(&u32::MAX.to_le_bytes());

    assert!(matches!(
        LocalizationBinary::open(&bytes),
        Err(Error::InvalidFormat(InvalidFormatError::EntryLength {
            bit_length: 4,
            decoded_length: u32::MAX,
            ..
        }))
    ));
}

#[test]
fn decoded_length_beyond_bit_length() {
    let mut bytes = SINGLE_SYMBOL;
    bytes[33] = 5;

    assert!(matches!(
        LocalizationBinary::open(&bytes),
        Err(Error::InvalidFormat(InvalidFormatError::EntryLength { .. }))
    ));
}

#[test]
fn bit_length_shorter_than_codes() -> Result<()> {
    let mut bytes = yes_no()?;
    assert_eq!(bytes[YES_BIT_LENGTH], 7);
    bytes[YES_BIT_LENGTH] = 4;

    let binary = LocalizationBinary::open(&bytes)?;
    assert!(matches!(
        binary.lookup_string("ID_YES"),
        Err(Error::CorruptBitstream(CorruptBitstreamError::Exhausted {
            decoded: 1,
            expected: 3
        }))
    ));
    assert_eq!(binary.lookup_string("ID_NO")?, "no");

    Ok(())
}

#[test]
fn bit_length_past_blob() -> Result<()> {
    let mut bytes = yes_no()?;
    assert_eq!(bytes[NO_BIT_LENGTH], 5);
    bytes[NO_BIT_LENGTH] = 9;

    assert!(matches!(
        LocalizationBinary::open(&bytes),
        Err(Error::Truncated {
            expected: 76,
            actual: 75
        })
    ));

    Ok(())
}

#[traced_test]
#[test]
fn histogram_total_mismatch() -> Result<()> {
    let mut bytes = SINGLE_SYMBOL;
    bytes[17] = 0x05;

    let binary = LocalizationBinary::open(&bytes)?;
    assert_eq!(binary.lookup_string("ID_A")?, "aaaa");
    assert!(logs_contain("histogram total does not match"));

    Ok(())
}

#[test]
fn invalid_histogram() {
    let mut bytes = SINGLE_SYMBOL;
    bytes[17] = 0x00;

    assert!(matches!(
        LocalizationBinary::open(&bytes),
        Err(Error::InvalidFormat(InvalidFormatError::ZeroFrequency(b'a')))
    ));
}

#[test]
fn invalid_utf8() -> Result<()> {
    let mut writer = LocalizationWriter::new(LocalizationOptions::default());
    writer.insert("ID_OK", "é")?;
    let binary = writer.finish()?;

    // Decode only the first byte of the two byte sequence.
    let mut bytes = binary.serialize()?;
    bytes[16 + 2 * 5 + 12] = 0x01;

    assert!(matches!(
        LocalizationBinary::open(&bytes)?.lookup_string("ID_OK"),
        Err(Error::UTF8Error(_))
    ));

    Ok(())
}

#[traced_test]
#[test]
fn collisions_are_rejected() {
    let options = LocalizationOptions::builder()
        .hash(HashVariant::Fnv1a_32)
        .build();

    assert_eq!(
        hash_str("ID_avi_", HashVariant::Fnv1a_32),
        hash_str("ID_9pam", HashVariant::Fnv1a_32)
    );

    let result =
        LocalizationBinary::build_with([("ID_avi_", "one"), ("ID_9pam", "two")], options);
    assert!(matches!(
        result,
        Err(Error::DuplicateKey(key)) if key == HashKey::from(0xDB965CB6u32)
    ));
}

#[traced_test]
#[test]
fn collisions_in_foreign_files() -> Result<()> {
    let options = LocalizationOptions::builder()
        .hash(HashVariant::LocId32)
        .build();
    let binary = LocalizationBinary::build_with([("bC", "first"), ("xx", "second")], options)?;
    let mut bytes = binary.serialize()?;

    // Point the second index entry at the first entry's key.
    let low = hash_str("bC", HashVariant::LocId32);
    let high = hash_str("xx", HashVariant::LocId32);
    let index_start = 16 + binary.histogram().len() * 5;
    let (moved, kept) = if low < high { (16, 0) } else { (0, 16) };
    let key = (low.get() as u32).to_le_bytes();
    bytes[index_start + moved..index_start + moved + 4].copy_from_slice(&key);
    assert_eq!(bytes[index_start + kept..index_start + kept + 4], key);

    let reopened = LocalizationBinary::open_with(&bytes, options)?;
    assert_eq!(reopened.index().collisions(), vec![low]);
    assert_eq!(reopened.len(), 2);
    assert!(logs_contain("colliding keys"));

    let edited = LocalizationWriter::from_binary(&reopened)?.finish()?;
    assert_eq!(edited.len(), 1);

    Ok(())
}

#[test]
fn keep_first_across_identifiers() -> Result<()> {
    let options = LocalizationOptions::builder()
        .hash(HashVariant::LocId32)
        .duplicates(DuplicatePolicy::KeepFirst)
        .build();

    let binary = LocalizationBinary::build_with([("bC", "first"), ("cb", "second")], options)?;

    assert_eq!(binary.lookup_string("bC")?, "first");
    assert_eq!(binary.lookup_string("cb")?, "first");

    Ok(())
}

#[test]
fn sixty_four_bit_round_trip() -> Result<()> {
    let options = LocalizationOptions::builder()
        .hash(HashVariant::Fnv1_64)
        .build();
    let binary = LocalizationBinary::build_with(menu(), options)?;
    let bytes = binary.serialize()?;

    let reopened = LocalizationBinary::open_with(&bytes, options)?;
    assert_eq!(reopened.lookup_string("ID_M_MAIN_QUIT")?, "Quit");

    // Opening with the wrong key width misreads the index.
    assert!(LocalizationBinary::open(&bytes)
        .and_then(|narrow| narrow.lookup_string("ID_M_MAIN_QUIT"))
        .is_err());

    Ok(())
}

#[traced_test]
#[test]
fn edit_cycle() -> Result<()> {
    let original = LocalizationBinary::build(menu())?;
    let bytes = original.serialize()?;

    let opened = LocalizationBinary::open(&bytes)?;
    assert_eq!(
        LocalizationWriter::from_binary(&opened)?.finish()?.serialize()?,
        bytes
    );

    let mut writer = LocalizationWriter::from_binary(&opened)?;
    assert_eq!(
        writer.replace("ID_M_MAIN_QUIT", "Exit")?,
        Some("Quit".to_owned())
    );
    writer.insert_key(HashKey::from(0x1234u32), "raw key")?;
    assert!(writer
        .remove_key(hash_str("ID_M_EMPTY", HashVariant::Fnv1_32))
        .is_some());

    let edited = LocalizationBinary::open(&writer.finish()?.serialize()?)?;
    assert_eq!(edited.lookup_string("ID_M_MAIN_QUIT")?, "Exit");
    assert_eq!(edited.lookup_key(HashKey::from(0x1234u32))?, "raw key");
    assert!(!edited.contains("ID_M_EMPTY"));
    assert_eq!(edited.lookup_string("ID_M_MAIN_PLAY")?, "Play");

    Ok(())
}

#[test]
fn empty_container() -> Result<()> {
    let binary = LocalizationBinary::build(StringTable::default())?;
    let bytes = binary.serialize()?;

    assert_eq!(bytes.len(), 16);
    let reopened = LocalizationBinary::open(&bytes)?;
    assert!(reopened.is_empty());
    assert_eq!(reopened.entries().count(), 0);

    Ok(())
}

#[test]
fn json_to_container() -> Result<()> {
    let table: StringTable =
        serde_json::from_str(r#"{"ID_YES":"yes","ID_NO":"no"}"#).map_err(std::io::Error::from)?;

    let binary = LocalizationBinary::build(table)?;
    assert_eq!(binary.lookup_string("ID_NO")?, "no");

    let exported = serde_json::to_value(&binary).map_err(std::io::Error::from)?;
    assert_eq!(
        exported,
        serde_json::json!({ "10D4F774": "no", "DD25922E": "yes" })
    );

    Ok(())
}
