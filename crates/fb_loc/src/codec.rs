//! Packing strings into bitstreams with a [`CodeTable`] and reading them back.
//!
//! Codewords are written most significant bit first and packed into bytes starting at the high
//! bit. The final byte is padded with zero bits; the number of symbols to decode is always stored
//! next to the stream, so the pad is never mistaken for data.

use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};
use tracing::instrument;

use crate::{
    code::CodeTable,
    error::{CorruptBitstreamError, Error, Result},
};

/// An encoded string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bitstream {
    /// Packed codewords, zero padded to a whole byte
    pub data: Vec<u8>,

    /// Number of meaningful bits in `data`
    pub bit_length: u64,
}

/// Bit reader that refuses to go past `limit`, whatever the underlying bytes hold
struct BoundedReader<'a> {
    inner: BitReader<&'a [u8], BigEndian>,
    limit: u64,
    position: u64,
}

impl<'a> BoundedReader<'a> {
    fn new(data: &'a [u8], limit: u64) -> Self {
        Self {
            inner: BitReader::endian(data, BigEndian),
            limit: limit.min(data.len() as u64 * 8),
            position: 0,
        }
    }

    fn next_bit(&mut self) -> Option<u64> {
        if self.position >= self.limit {
            return None;
        }
        let bit = self.inner.read::<u8>(1).ok()?;
        self.position += 1;
        Some(bit as u64)
    }
}

/// Replace every byte of `data` with its codeword.
pub fn encode(data: &[u8], table: &CodeTable) -> Result<Bitstream> {
    let mut writer = BitWriter::endian(Vec::new(), BigEndian);
    let mut bit_length = 0u64;
    for &byte in data {
        let code = table.get(byte).ok_or(Error::MissingSymbol(byte))?;
        writer.write(code.length as u32, code.bits)?;
        bit_length += code.length as u64;
    }
    writer.byte_align()?;

    Ok(Bitstream {
        data: writer.into_writer(),
        bit_length,
    })
}

/// Decode exactly `decoded_length` symbols from `data`, ignoring any trailing pad.
pub fn decode(data: &[u8], table: &CodeTable, decoded_length: usize) -> Result<Vec<u8>> {
    decode_bits(data, data.len() as u64 * 8, table, decoded_length)
}

/// Like [`decode`], but never reads past the first `bit_length` bits of `data`.
#[instrument(level = "trace", skip(data, table), err)]
pub fn decode_bits(
    data: &[u8],
    bit_length: u64,
    table: &CodeTable,
    decoded_length: usize,
) -> Result<Vec<u8>> {
    let mut reader = BoundedReader::new(data, bit_length);
    // Every codeword is at least one bit long.
    let mut output = Vec::with_capacity(decoded_length.min(reader.limit as usize));

    while output.len() < decoded_length {
        let exhausted = CorruptBitstreamError::Exhausted {
            decoded: output.len(),
            expected: decoded_length,
        };

        // Walk the canonical code space one length at a time: `first` is the smallest codeword
        // of the current length and `index` the position of its symbol in canonical order.
        let mut code = 0u64;
        let mut first = 0u64;
        let mut index = 0usize;
        let mut symbol = None;
        for length in 1..=table.max_length() {
            code = (code << 1) | reader.next_bit().ok_or(exhausted.clone())?;
            let count = table.count(length) as u64;
            if code < first + count {
                symbol = table.symbol_at(index + (code - first) as usize);
                break;
            }
            index += count as usize;
            first = (first + count) << 1;
        }

        match symbol {
            Some(symbol) => output.push(symbol),
            None if table.is_empty() => return Err(exhausted.into()),
            None => return Err(CorruptBitstreamError::InvalidCodeword(reader.position).into()),
        }
    }

    Ok(output)
}
