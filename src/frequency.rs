//! Per-byte frequency analysis
//!
//! Only symbols that actually occur are stored, in ascending symbol order.
//! That order is the order leaves enter the heap, so it fixes the tree shape.

use std::collections::BTreeMap;
use std::io::{ErrorKind, Read};

use crate::error::Result;

/// One byte value.
pub type Symbol = u8;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: BTreeMap<Symbol, u64>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(data: &[u8]) -> Self {
        let mut table = Self::new();
        table.observe(data);
        table
    }

    /// Count every byte the reader yields. Returns the table and the number
    /// of bytes consumed.
    pub fn from_reader<R: Read>(reader: &mut R) -> Result<(Self, u64)> {
        let mut table = Self::new();
        let mut buf = [0u8; 8192];
        let mut consumed = 0u64;
        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            table.observe(&buf[..n]);
            consumed += n as u64;
        }
        Ok((table, consumed))
    }

    /// Same alphabet, every count replaced by `placeholder`.
    pub fn with_placeholder<I>(symbols: I, placeholder: u64) -> Self
    where
        I: IntoIterator<Item = Symbol>,
    {
        Self {
            counts: symbols.into_iter().map(|s| (s, placeholder)).collect(),
        }
    }

    pub fn observe(&mut self, data: &[u8]) {
        for &byte in data {
            *self.counts.entry(byte).or_insert(0) += 1;
        }
    }

    pub fn insert(&mut self, symbol: Symbol, count: u64) {
        self.counts.insert(symbol, count);
    }

    pub fn get(&self, symbol: Symbol) -> u64 {
        self.counts.get(&symbol).copied().unwrap_or(0)
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        self.counts.contains_key(&symbol)
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts, i.e. the number of symbols in the source.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn alphabet(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.counts.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, u64)> + '_ {
        self.counts.iter().map(|(&s, &c)| (s, c))
    }
}
