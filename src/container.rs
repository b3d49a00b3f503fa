//! Container header codec
//!
//! Layout on disk:
//!
//! ```text
//! [0..256)  presence bitmap, one byte per symbol value, nonzero = present
//! counted layout only:
//!           u64 LE count for each present symbol, ascending symbol order
//! [..end)   packed payload, MSB-first, last byte zero-padded
//! ```

use std::io::{ErrorKind, Read, Write};

use tracing::debug;

use crate::config::HeaderLayout;
use crate::error::{CompressError, Result};
use crate::frequency::{FrequencyTable, Symbol};

/// Size of the presence bitmap block.
pub const BITMAP_LEN: usize = 256;

/// Frequency every present symbol gets when only the bitmap is known.
pub const PLACEHOLDER_FREQUENCY: u64 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceBitmap {
    present: [bool; BITMAP_LEN],
}

impl Default for PresenceBitmap {
    fn default() -> Self {
        Self {
            present: [false; BITMAP_LEN],
        }
    }
}

impl PresenceBitmap {
    pub fn from_symbols<I: IntoIterator<Item = Symbol>>(symbols: I) -> Self {
        let mut bitmap = Self::default();
        for symbol in symbols {
            bitmap.mark(symbol);
        }
        bitmap
    }

    pub fn mark(&mut self, symbol: Symbol) {
        self.present[symbol as usize] = true;
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        self.present[symbol as usize]
    }

    pub fn count(&self) -> usize {
        self.present.iter().filter(|&&p| p).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.present.iter().any(|&p| p)
    }

    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        (0..=255u8).filter(move |&s| self.contains(s))
    }

    pub fn to_bytes(&self) -> [u8; BITMAP_LEN] {
        let mut bytes = [0u8; BITMAP_LEN];
        for (byte, &present) in bytes.iter_mut().zip(self.present.iter()) {
            *byte = present as u8;
        }
        bytes
    }

    pub fn from_bytes(bytes: &[u8; BITMAP_LEN]) -> Self {
        let mut bitmap = Self::default();
        for (present, &byte) in bitmap.present.iter_mut().zip(bytes.iter()) {
            *present = byte != 0;
        }
        bitmap
    }
}

/// Everything the decoder needs to rebuild the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerHeader {
    /// Bitmap plus the true count of each present symbol.
    Counted(FrequencyTable),
    /// Bitmap only.
    Presence(PresenceBitmap),
}

impl ContainerHeader {
    pub fn layout(&self) -> HeaderLayout {
        match self {
            ContainerHeader::Counted(_) => HeaderLayout::Counted,
            ContainerHeader::Presence(_) => HeaderLayout::Presence,
        }
    }

    pub fn presence(&self) -> PresenceBitmap {
        match self {
            ContainerHeader::Counted(freqs) => PresenceBitmap::from_symbols(freqs.alphabet()),
            ContainerHeader::Presence(bitmap) => bitmap.clone(),
        }
    }

    /// Frequencies the decode-side tree is built from. For the presence
    /// layout every symbol gets [`PLACEHOLDER_FREQUENCY`].
    pub fn tree_frequencies(&self) -> FrequencyTable {
        match self {
            ContainerHeader::Counted(freqs) => freqs.clone(),
            ContainerHeader::Presence(bitmap) => {
                FrequencyTable::with_placeholder(bitmap.symbols(), PLACEHOLDER_FREQUENCY)
            }
        }
    }

    /// Number of symbols in the payload, when the header records it.
    pub fn symbol_count(&self) -> Option<u64> {
        match self {
            ContainerHeader::Counted(freqs) => Some(freqs.total()),
            ContainerHeader::Presence(_) => None,
        }
    }

    pub fn encoded_len(&self) -> usize {
        match self {
            ContainerHeader::Counted(freqs) => BITMAP_LEN + 8 * freqs.len(),
            ContainerHeader::Presence(_) => BITMAP_LEN,
        }
    }

    pub fn encode_header<W: Write>(&self, writer: &mut W) -> Result<usize> {
        writer.write_all(&self.presence().to_bytes())?;
        if let ContainerHeader::Counted(freqs) = self {
            for (_, count) in freqs.iter() {
                writer.write_all(&count.to_le_bytes())?;
            }
        }
        Ok(self.encoded_len())
    }

    pub fn decode_header<R: Read>(reader: &mut R, layout: HeaderLayout) -> Result<Self> {
        let mut bytes = [0u8; BITMAP_LEN];
        read_block(reader, &mut bytes, "presence bitmap")?;
        let bitmap = PresenceBitmap::from_bytes(&bytes);
        if bitmap.is_empty() {
            return Err(CompressError::EmptyAlphabet);
        }
        let alphabet = bitmap.count();

        let header = match layout {
            HeaderLayout::Presence => ContainerHeader::Presence(bitmap),
            HeaderLayout::Counted => {
                let mut freqs = FrequencyTable::new();
                let mut total = 0u64;
                for symbol in bitmap.symbols() {
                    let mut count = [0u8; 8];
                    read_block(reader, &mut count, "symbol counts")?;
                    let count = u64::from_le_bytes(count);
                    if count == 0 {
                        return Err(CompressError::corrupt(format!(
                            "symbol 0x{symbol:02x} is marked present with a zero count"
                        )));
                    }
                    total = total
                        .checked_add(count)
                        .ok_or_else(|| CompressError::corrupt("symbol counts overflow"))?;
                    freqs.insert(symbol, count);
                }
                ContainerHeader::Counted(freqs)
            }
        };

        debug!(
            layout = %layout,
            alphabet,
            symbols = ?header.symbol_count(),
            "decoded container header"
        );
        Ok(header)
    }
}

fn read_block<R: Read>(reader: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => CompressError::corrupt(format!("header truncated in {what}")),
        _ => CompressError::from(e),
    })
}
