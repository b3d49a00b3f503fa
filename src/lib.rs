//! hcompress: byte-oriented Huffman compression of whole files.
//!
//! Compression takes two passes over the input:
//! - a frequency pass that counts every byte value,
//! - an encoding pass that packs each byte's code into an MSB-first bitstream.
//!
//! The container starts with a 256-byte presence bitmap. With the default
//! [`HeaderLayout::Counted`] layout the true symbol counts follow it, so the
//! decoder rebuilds the exact tree the encoder used and knows where the data
//! ends. [`HeaderLayout::Presence`] writes the bitmap alone and decodes with
//! placeholder frequencies.
//!
//! ```no_run
//! use std::path::Path;
//!
//! hcompress::compress(Path::new("input.txt"), Path::new("input.huff"))?;
//! hcompress::decompress(Path::new("input.huff"), Path::new("roundtrip.txt"))?;
//! # Ok::<(), hcompress::error::CompressError>(())
//! ```

pub mod bitstream;
pub mod code_table;
pub mod config;
pub mod container;
pub mod error;
pub mod frequency;
pub mod min_heap;
pub mod tree;

use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;

use tracing::{info, warn};

use crate::bitstream::{decode_payload, encode_payload, PayloadStats};
use crate::code_table::CodeTable;
use crate::config::{CompressionConfig, HeaderLayout};
use crate::container::ContainerHeader;
use crate::error::{CompressError, Result};
use crate::frequency::FrequencyTable;
use crate::tree::HuffmanTree;

/// What one compress or decompress call produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionSummary {
    pub layout: HeaderLayout,
    /// Distinct symbols in the alphabet.
    pub alphabet: usize,
    pub header_bytes: u64,
    pub payload: PayloadStats,
}

impl CompressionSummary {
    /// Size of the whole container.
    pub fn container_bytes(&self) -> u64 {
        self.header_bytes + self.payload.bytes
    }

    /// Bytes of uncompressed data.
    pub fn symbols(&self) -> u64 {
        self.payload.symbols
    }
}

/// Result of the frequency pass.
struct Encoding {
    frequencies: FrequencyTable,
    codes: CodeTable,
}

impl Encoding {
    fn header(&self, layout: HeaderLayout) -> ContainerHeader {
        match layout {
            HeaderLayout::Counted => ContainerHeader::Counted(self.frequencies.clone()),
            HeaderLayout::Presence => ContainerHeader::Presence(self.codes.presence().clone()),
        }
    }
}

/// The compressor engine
#[derive(Debug, Clone, Default)]
pub struct Compressor {
    config: CompressionConfig,
}

impl Compressor {
    pub fn new(config: CompressionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    /// Compress the file at `input` into a new container at `output`.
    ///
    /// The output file is only created once the input is known to be
    /// non-empty, and is removed again if writing it fails.
    pub fn compress_file(&self, input: &Path, output: &Path) -> Result<CompressionSummary> {
        let mut reader = self.open_input(input)?;
        self.compress_reader_to_file(&mut reader, output)
    }

    fn compress_reader_to_file<R: Read + Seek>(
        &self,
        reader: &mut R,
        output: &Path,
    ) -> Result<CompressionSummary> {
        let encoding = self.analyze(reader)?;

        let file = create_output(output)?;
        let result = self.write_container(&encoding, reader, self.buffered(file));
        let summary = discard_on_error(result, output)?;
        log_summary("compressed", &summary);
        Ok(summary)
    }

    /// Decompress the container at `input` into `output`.
    pub fn decompress_file(&self, input: &Path, output: &Path) -> Result<CompressionSummary> {
        let mut reader = self.open_input(input)?;
        let (header, tree) = self.read_header(&mut reader)?;

        let file = create_output(output)?;
        let mut writer = self.buffered(file);
        let result = decode_payload(&mut reader, &tree, header.symbol_count(), &mut writer)
            .and_then(|payload| {
                writer.flush()?;
                Ok(payload)
            });
        drop(writer);
        let payload = discard_on_error(result, output)?;

        let summary = summary_for(&header, payload);
        log_summary("decompressed", &summary);
        Ok(summary)
    }

    pub fn compress_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut input = Cursor::new(data);
        let encoding = self.analyze(&mut input)?;
        let mut output = Vec::new();
        let summary = self.write_container(&encoding, &mut input, &mut output)?;
        log_summary("compressed", &summary);
        Ok(output)
    }

    pub fn decompress_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut input = Cursor::new(data);
        let (header, tree) = self.read_header(&mut input)?;
        let mut output = Vec::new();
        let payload = decode_payload(&mut input, &tree, header.symbol_count(), &mut output)?;
        log_summary("decompressed", &summary_for(&header, payload));
        Ok(output)
    }

    /// Code table the compressor would use for the file at `input`.
    pub fn code_table(&self, input: &Path) -> Result<CodeTable> {
        let mut reader = self.open_input(input)?;
        Ok(self.analyze(&mut reader)?.codes)
    }

    fn open_input(&self, path: &Path) -> Result<BufReader<File>> {
        let file = File::open(path).map_err(|source| CompressError::OpenInput {
            path: path.to_path_buf(),
            source,
        })?;
        self.config.check_input_size(file.metadata()?.len())?;
        Ok(BufReader::with_capacity(self.config.buffer_size, file))
    }

    fn buffered(&self, file: File) -> BufWriter<File> {
        BufWriter::with_capacity(self.config.buffer_size, file)
    }

    fn analyze<R: Read>(&self, input: &mut R) -> Result<Encoding> {
        let (frequencies, size) = FrequencyTable::from_reader(input)?;
        self.config.check_input_size(size)?;
        if frequencies.is_empty() {
            return Err(CompressError::EmptyInput);
        }
        let tree = HuffmanTree::build(&frequencies)?;
        let codes = CodeTable::from_tree(&tree);
        Ok(Encoding { frequencies, codes })
    }

    fn write_container<R: Read + Seek, W: Write>(
        &self,
        encoding: &Encoding,
        input: &mut R,
        mut output: W,
    ) -> Result<CompressionSummary> {
        let header = encoding.header(self.config.layout);
        header.encode_header(&mut output)?;

        input.rewind()?;
        let (_, payload) = encode_payload(input, &encoding.codes, output)?;

        let expected = encoding.frequencies.total();
        if payload.symbols != expected {
            return Err(CompressError::SizeMismatch {
                expected,
                actual: payload.symbols,
            });
        }
        Ok(summary_for(&header, payload))
    }

    fn read_header<R: Read>(&self, input: &mut R) -> Result<(ContainerHeader, HuffmanTree)> {
        let header = ContainerHeader::decode_header(input, self.config.layout)?;
        if header.layout() == HeaderLayout::Presence {
            warn!("presence layout rebuilds the tree from placeholder frequencies; output may differ from the original");
        }
        let tree = HuffmanTree::build(&header.tree_frequencies())?;
        Ok((header, tree))
    }
}

/// Compress `input_path` into `output_path` with the default configuration.
pub fn compress(input_path: &Path, output_path: &Path) -> Result<CompressionSummary> {
    Compressor::default().compress_file(input_path, output_path)
}

/// Decompress `input_path` into `output_path` with the default configuration.
pub fn decompress(input_path: &Path, output_path: &Path) -> Result<CompressionSummary> {
    Compressor::default().decompress_file(input_path, output_path)
}

fn create_output(path: &Path) -> Result<File> {
    File::create(path).map_err(|source| CompressError::CreateOutput {
        path: path.to_path_buf(),
        source,
    })
}

fn discard_on_error<T>(result: Result<T>, path: &Path) -> Result<T> {
    if let Err(err) = &result {
        match std::fs::remove_file(path) {
            Ok(()) => warn!(path = %path.display(), error = %err, "removed incomplete output"),
            Err(e) => warn!(path = %path.display(), error = %e, "could not remove incomplete output"),
        }
    }
    result
}

fn summary_for(header: &ContainerHeader, payload: PayloadStats) -> CompressionSummary {
    CompressionSummary {
        layout: header.layout(),
        alphabet: header.presence().count(),
        header_bytes: header.encoded_len() as u64,
        payload,
    }
}

fn log_summary(action: &str, summary: &CompressionSummary) {
    info!(
        layout = %summary.layout,
        alphabet = summary.alphabet,
        symbols = summary.symbols(),
        payload_bytes = summary.payload.bytes,
        container_bytes = summary.container_bytes(),
        "{action}"
    );
}
