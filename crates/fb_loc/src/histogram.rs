//! Symbol frequency table over the byte alphabet and the code lengths derived from it.

use std::{
    cmp::Reverse,
    collections::BinaryHeap,
    io::{Read, Seek, Write},
};

use binrw::{BinRead, BinWrite};
use tracing::instrument;

use crate::{
    code::CodeTable,
    error::{Error, InvalidFormatError, Result},
    types::SymbolFrequency,
};

/// Occurrence counts of every byte value across the strings of a container
///
/// The persisted counts are the only input to [`Histogram::code_table`], so a decoder
/// reconstructs exactly the code the encoder used without access to the original strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    counts: [u32; 256],
}

impl Default for Histogram {
    fn default() -> Self {
        Self { counts: [0; 256] }
    }
}

impl Histogram {
    /// Count the bytes of `data`.
    pub fn build(data: &[u8]) -> Result<Histogram> {
        if data.is_empty() {
            return Err(Error::EmptyInput);
        }

        let mut histogram = Histogram::default();
        for &byte in data {
            let count = &mut histogram.counts[byte as usize];
            *count = count
                .checked_add(1)
                .ok_or(Error::CapacityExceeded("symbol frequency"))?;
        }

        Ok(histogram)
    }

    /// Rebuild a histogram from persisted pairs, rejecting repeated or zero entries.
    pub fn from_symbols(symbols: impl IntoIterator<Item = SymbolFrequency>) -> Result<Histogram> {
        let mut histogram = Histogram::default();
        for SymbolFrequency { symbol, frequency } in symbols {
            if frequency == 0 {
                return Err(InvalidFormatError::ZeroFrequency(symbol).into());
            }
            if histogram.counts[symbol as usize] != 0 {
                return Err(InvalidFormatError::DuplicateSymbol(symbol).into());
            }
            histogram.counts[symbol as usize] = frequency;
        }

        Ok(histogram)
    }

    /// Occurrences of `symbol`
    pub fn frequency(&self, symbol: u8) -> u32 {
        self.counts[symbol as usize]
    }

    /// Symbols with a non-zero count, in ascending symbol order
    pub fn symbols(&self) -> impl Iterator<Item = SymbolFrequency> + '_ {
        self.counts
            .iter()
            .enumerate()
            .filter(|&(_, &frequency)| frequency > 0)
            .map(|(symbol, &frequency)| SymbolFrequency {
                symbol: symbol as u8,
                frequency,
            })
    }

    /// Number of distinct symbols
    pub fn len(&self) -> usize {
        self.counts.iter().filter(|&&count| count > 0).count()
    }

    /// Whether no symbol has been counted
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of all counts
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&count| count as u64).sum()
    }

    /// Depth of every symbol in the Huffman tree, as `(symbol, length)` in symbol order.
    ///
    /// The two lightest nodes are merged first. Equal weights are resolved by creation order:
    /// leaves come first in ascending symbol order, then merged nodes in the order they were
    /// made. This rule is part of the container format. A lone symbol gets length 1.
    pub fn code_lengths(&self) -> Result<Vec<(u8, u8)>> {
        let leaves = self.symbols().collect::<Vec<_>>();

        match leaves.as_slice() {
            [] => return Err(Error::EmptyInput),
            [only] => return Ok(vec![(only.symbol, 1)]),
            _ => {}
        }

        let mut parents: Vec<Option<usize>> = vec![None; leaves.len()];
        let mut heap = leaves
            .iter()
            .enumerate()
            .map(|(node, leaf)| Reverse((leaf.frequency as u64, node)))
            .collect::<BinaryHeap<_>>();

        while let (Some(Reverse((left_weight, left))), Some(Reverse((right_weight, right)))) =
            (heap.pop(), heap.pop())
        {
            let node = parents.len();
            parents.push(None);
            parents[left] = Some(node);
            parents[right] = Some(node);
            heap.push(Reverse((left_weight + right_weight, node)));
        }

        Ok(leaves
            .iter()
            .enumerate()
            .map(|(leaf, frequency)| {
                let mut depth = 0u8;
                let mut node = leaf;
                while let Some(parent) = parents[node] {
                    depth += 1;
                    node = parent;
                }
                (frequency.symbol, depth)
            })
            .collect())
    }

    /// Derive the canonical prefix code for this histogram.
    pub fn code_table(&self) -> Result<CodeTable> {
        Ok(CodeTable::from_lengths(&self.code_lengths()?))
    }

    /// Read `count` persisted pairs.
    #[instrument(skip(reader), err)]
    pub fn read<R: Read + Seek>(reader: &mut R, count: u32) -> Result<Histogram> {
        if count > 256 {
            return Err(InvalidFormatError::SymbolCount(count).into());
        }

        let symbols = (0..count)
            .map(|_| SymbolFrequency::read(reader).map_err(Error::from))
            .collect::<Result<Vec<_>>>()?;

        Histogram::from_symbols(symbols)
    }

    /// Write the non-zero pairs in ascending symbol order.
    pub fn write<W: Write + Seek>(&self, writer: &mut W) -> Result<()> {
        for symbol in self.symbols() {
            symbol.write(writer)?;
        }
        Ok(())
    }
}
