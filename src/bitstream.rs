//! Bit packing and unpacking of the payload
//!
//! Bits are stored MSB-first. The final partial byte is left-justified and
//! its low-order bits are zero.

use std::io::{self, ErrorKind, Read, Write};

use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};
use tracing::debug;

use crate::code_table::{Code, CodeTable};
use crate::error::{CompressError, Result};
use crate::tree::HuffmanTree;

/// Counters for one packed payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PayloadStats {
    /// Symbols encoded or emitted.
    pub symbols: u64,
    /// Bits that belong to codes, padding excluded.
    pub bits: u64,
    /// Payload bytes written or consumed.
    pub bytes: u64,
}

impl PayloadStats {
    pub fn padding_bits(&self) -> u64 {
        (self.bytes * 8).saturating_sub(self.bits)
    }
}

pub struct BitstreamWriter<W: Write> {
    inner: BitWriter<W, BigEndian>,
    stats: PayloadStats,
}

impl<W: Write> BitstreamWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: BitWriter::endian(writer, BigEndian),
            stats: PayloadStats::default(),
        }
    }

    pub fn write_code(&mut self, code: &Code) -> io::Result<()> {
        for &bit in code.bits() {
            self.inner.write_bit(bit)?;
        }
        self.stats.bits += code.len() as u64;
        self.stats.symbols += 1;
        Ok(())
    }

    /// Pad the last partial byte with zeros and hand back the writer.
    pub fn finish(mut self) -> io::Result<(W, PayloadStats)> {
        self.inner.byte_align()?;
        let mut writer = self.inner.into_writer();
        writer.flush()?;
        let mut stats = self.stats;
        stats.bytes = stats.bits.div_ceil(8);
        Ok((writer, stats))
    }
}

/// Pack every byte of `input` with its code from `codes`.
///
/// A byte with no code fails with [`CompressError::UnknownSymbol`]; this only
/// happens when the input changed since its frequencies were taken.
pub fn encode_payload<R: Read, W: Write>(
    mut input: R,
    codes: &CodeTable,
    output: W,
) -> Result<(W, PayloadStats)> {
    let mut writer = BitstreamWriter::new(output);
    let mut buf = [0u8; 8192];
    loop {
        let n = match input.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        for &byte in &buf[..n] {
            let code = codes.get(byte).ok_or(CompressError::UnknownSymbol(byte))?;
            writer.write_code(code)?;
        }
    }
    let (output, stats) = writer.finish()?;
    debug!(
        symbols = stats.symbols,
        bits = stats.bits,
        padding = stats.padding_bits(),
        "packed payload"
    );
    Ok((output, stats))
}

/// Walk `tree` bit by bit over `payload`, writing each decoded symbol.
///
/// With `expected = Some(n)` decoding stops after exactly `n` symbols; the
/// rest of the final byte must be zero padding and nothing may follow it.
/// With `expected = None` every bit is consumed and a leaf reached during the
/// padding is emitted too. A trailing partial walk is dropped if it could be
/// padding (at most 7 zero bits), otherwise the payload is corrupt.
pub fn decode_payload<R: Read, W: Write>(
    payload: R,
    tree: &HuffmanTree,
    expected: Option<u64>,
    output: &mut W,
) -> Result<PayloadStats> {
    let mut reader = BitReader::endian(payload, BigEndian);
    let root = tree.root();
    let mut node = root;
    let mut stats = PayloadStats::default();
    let mut bits_read = 0u64;
    let mut pending_bits = 0u64;
    let mut pending_ones = false;

    loop {
        if expected == Some(stats.symbols) {
            break;
        }
        let Some(bit) = next_bit(&mut reader)? else {
            break;
        };
        bits_read += 1;

        let next = match tree.child(node, bit) {
            Some(child) => child,
            // a lone leaf at the root: each 0 bit is one symbol
            None if !bit => node,
            None => {
                return Err(CompressError::corrupt(format!(
                    "bit 1 at offset {} under a single-symbol tree",
                    bits_read - 1
                )))
            }
        };

        match tree.symbol(next) {
            Some(symbol) => {
                output.write_all(&[symbol])?;
                stats.symbols += 1;
                stats.bits += pending_bits + 1;
                node = root;
                pending_bits = 0;
                pending_ones = false;
            }
            None => {
                node = next;
                pending_bits += 1;
                pending_ones |= bit;
            }
        }
    }

    match expected {
        Some(total) => {
            if stats.symbols < total {
                return Err(CompressError::corrupt(format!(
                    "payload ended after {} of {} symbols",
                    stats.symbols, total
                )));
            }
            while !reader.byte_aligned() {
                bits_read += 1;
                if reader.read_bit()? {
                    return Err(CompressError::corrupt("nonzero padding after final symbol"));
                }
            }
            if next_bit(&mut reader)?.is_some() {
                return Err(CompressError::corrupt("trailing data after final symbol"));
            }
        }
        None => {
            if pending_bits > 7 || pending_ones {
                return Err(CompressError::corrupt(format!(
                    "payload ends {pending_bits} bits into a code"
                )));
            }
            if pending_bits > 0 {
                debug!(bits = pending_bits, "dropped trailing padding walk");
            }
        }
    }

    stats.bytes = bits_read.div_ceil(8);
    Ok(stats)
}

fn next_bit<R: Read>(reader: &mut BitReader<R, BigEndian>) -> Result<Option<bool>> {
    match reader.read_bit() {
        Ok(bit) => Ok(Some(bit)),
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(e.into()),
    }
}
