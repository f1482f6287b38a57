//! Canonical prefix code derived from a [`crate::histogram::Histogram`].

/// A single canonical codeword, `length` bits taken from the low end of `bits`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codeword {
    pub length: u8,
    pub bits: u64,
}

/// Mapping from byte value to its canonical codeword
///
/// Codewords are assigned in ascending `(length, symbol)` order, each one the previous plus one,
/// shifted left whenever the length grows. Two builders given the same code lengths therefore
/// produce identical tables. Symbols that never occur have no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: Vec<Option<Codeword>>,
    /// Number of codewords of each length, indexed by length
    counts: Vec<u32>,
    /// Symbols in canonical order
    symbols: Vec<u8>,
}

impl CodeTable {
    /// Assign canonical codewords to `(symbol, length)` pairs.
    pub(crate) fn from_lengths(lengths: &[(u8, u8)]) -> CodeTable {
        let mut sorted = lengths
            .iter()
            .filter(|(_, length)| *length > 0)
            .copied()
            .collect::<Vec<_>>();
        sorted.sort_by_key(|&(symbol, length)| (length, symbol));

        let max_length = sorted.last().map_or(0, |&(_, length)| length);
        debug_assert!(max_length <= 64, "codeword longer than 64 bits");

        let mut codes = vec![None; 256];
        let mut counts = vec![0u32; max_length as usize + 1];
        let mut symbols = Vec::with_capacity(sorted.len());

        let mut next = 0u64;
        let mut previous_length = sorted.first().map_or(0, |&(_, length)| length);
        for (symbol, length) in sorted {
            next <<= length - previous_length;
            previous_length = length;

            codes[symbol as usize] = Some(Codeword { length, bits: next });
            counts[length as usize] += 1;
            symbols.push(symbol);

            next += 1;
        }

        CodeTable {
            codes,
            counts,
            symbols,
        }
    }

    /// Codeword assigned to `symbol`, if it occurs
    pub fn get(&self, symbol: u8) -> Option<Codeword> {
        self.codes.get(symbol as usize).copied().flatten()
    }

    /// Number of symbols with a codeword
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the table holds no codewords
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Length of the longest codeword
    pub fn max_length(&self) -> u8 {
        self.counts.len().saturating_sub(1) as u8
    }

    /// Iterate `(symbol, codeword)` in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, Codeword)> + '_ {
        self.symbols
            .iter()
            .filter_map(|&symbol| self.get(symbol).map(|code| (symbol, code)))
    }

    pub(crate) fn count(&self, length: u8) -> u32 {
        self.counts.get(length as usize).copied().unwrap_or(0)
    }

    pub(crate) fn symbol_at(&self, index: usize) -> Option<u8> {
        self.symbols.get(index).copied()
    }
}
