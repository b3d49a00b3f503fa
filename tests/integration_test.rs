//! Integration tests for hcompress

use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

use hcompress::config::{CompressionConfig, HeaderLayout};
use hcompress::container::BITMAP_LEN;
use hcompress::error::CompressError;
use hcompress::*;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn file(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.path(name);
        fs::write(&path, contents).unwrap();
        path
    }

    /// Compress then decompress `data`, returning the decoded bytes.
    fn roundtrip(&self, data: &[u8]) -> Vec<u8> {
        let input = self.file("input.bin", data);
        let packed = self.path("input.huff");
        let output = self.path("output.bin");
        compress(&input, &packed).unwrap();
        decompress(&packed, &output).unwrap();
        fs::read(output).unwrap()
    }
}

#[test]
fn test_file_roundtrip_text() {
    let ws = Workspace::new();
    let data = b"the quick brown fox jumps over the lazy dog".repeat(50);
    assert_eq!(ws.roundtrip(&data), data);
}

#[test]
fn test_file_roundtrip_random() {
    let ws = Workspace::new();
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for (len, alphabet) in [(1usize, 256u32), (17, 2), (1000, 3), (4096, 40), (50_000, 256)] {
        let data: Vec<u8> = (0..len)
            .map(|_| {
                // skew towards low values so code lengths vary
                let x: u32 = rng.gen_range(0..alphabet);
                (x * x / alphabet) as u8
            })
            .collect();
        assert_eq!(ws.roundtrip(&data), data, "len {len}, alphabet {alphabet}");
    }
}

#[test]
fn test_file_roundtrip_all_byte_values() {
    let ws = Workspace::new();
    let data: Vec<u8> = (0..=255).cycle().take(2000).collect();
    assert_eq!(ws.roundtrip(&data), data);
}

#[test]
fn test_single_symbol_file() {
    let ws = Workspace::new();
    let data = vec![b'A'; 1000];
    let input = ws.file("a.txt", &data);
    let packed = ws.path("a.huff");
    let summary = compress(&input, &packed).unwrap();
    assert_eq!(summary.alphabet, 1);
    assert_eq!(summary.payload.bits, 1000);
    assert_eq!(summary.payload.bytes, 125);

    let output = ws.path("a.out");
    decompress(&packed, &output).unwrap();
    assert_eq!(fs::read(output).unwrap(), data);
}

#[test]
fn test_padding_boundaries() {
    let ws = Workspace::new();
    // 'x' = 1 and 'y' = 0 here, one bit per symbol: lengths 8..=16 cover an
    // exact byte boundary and every padding width from 1 to 7
    for len in 8..=16 {
        let mut data = vec![b'x'; len - 1];
        data.push(b'y');
        let input = ws.file("pad.txt", &data);
        let packed = ws.path("pad.huff");
        let summary = compress(&input, &packed).unwrap();
        assert_eq!(summary.payload.bits, len as u64);
        assert_eq!(summary.payload.padding_bits(), ((8 - len % 8) % 8) as u64);

        let output = ws.path("pad.out");
        let decoded = decompress(&packed, &output).unwrap();
        assert_eq!(decoded.symbols(), len as u64);
        assert_eq!(fs::read(&output).unwrap(), data, "len {len}");
    }
}

#[test]
fn test_presence_bitmap_fidelity() {
    let ws = Workspace::new();
    let data = b"hello, presence bitmap";
    let input = ws.file("in.txt", data);
    let packed = ws.path("in.huff");
    compress(&input, &packed).unwrap();

    let container = fs::read(&packed).unwrap();
    for symbol in 0..=255u8 {
        assert_eq!(
            container[symbol as usize] != 0,
            data.contains(&symbol),
            "symbol {symbol}"
        );
    }
}

#[test]
fn test_aaabb_container_bytes() {
    let ws = Workspace::new();
    let input = ws.file("ab.txt", b"aaabb");
    let packed = ws.path("ab.huff");
    let summary = compress(&input, &packed).unwrap();

    let container = fs::read(&packed).unwrap();
    assert_eq!(container.len() as u64, summary.container_bytes());
    assert_eq!(container.len(), BITMAP_LEN + 2 * 8 + 1);
    assert_eq!(container.iter().take(BITMAP_LEN).filter(|&&b| b != 0).count(), 2);
    assert_eq!(*container.last().unwrap(), 0b1110_0000);

    let output = ws.path("ab.out");
    decompress(&packed, &output).unwrap();
    assert_eq!(fs::read(output).unwrap(), b"aaabb");
}

#[test]
fn test_empty_input_leaves_no_output() {
    let ws = Workspace::new();
    let input = ws.file("empty.txt", b"");
    let packed = ws.path("empty.huff");
    let err = compress(&input, &packed).unwrap_err();
    assert!(matches!(err, CompressError::EmptyInput));
    assert!(!packed.exists());
}

#[test]
fn test_missing_input() {
    let ws = Workspace::new();
    let err = compress(&ws.path("nope.txt"), &ws.path("nope.huff")).unwrap_err();
    assert!(matches!(err, CompressError::OpenInput { .. }));
    let err = decompress(&ws.path("nope.huff"), &ws.path("nope.out")).unwrap_err();
    assert!(matches!(err, CompressError::OpenInput { .. }));
}

#[test]
fn test_uncreatable_output() {
    let ws = Workspace::new();
    let input = ws.file("in.txt", b"some data");
    let output = Path::new("/nonexistent-dir/for/hcompress/out.huff");
    let err = compress(&input, output).unwrap_err();
    assert!(matches!(err, CompressError::CreateOutput { .. }));
}

#[test]
fn test_empty_bitmap_container() {
    let ws = Workspace::new();
    let packed = ws.file("zero.huff", &[0u8; BITMAP_LEN + 3]);
    let output = ws.path("zero.out");
    let err = decompress(&packed, &output).unwrap_err();
    assert!(matches!(err, CompressError::EmptyAlphabet));
    assert!(!output.exists());
}

#[test]
fn test_truncated_container_removes_output() {
    let ws = Workspace::new();
    let data = b"truncate me, truncate me, truncate me".to_vec();
    let input = ws.file("t.txt", &data);
    let packed = ws.path("t.huff");
    compress(&input, &packed).unwrap();

    let mut container = fs::read(&packed).unwrap();
    container.truncate(container.len() - 3);
    fs::write(&packed, &container).unwrap();

    let output = ws.path("t.out");
    let err = decompress(&packed, &output).unwrap_err();
    assert!(matches!(err, CompressError::Corrupt(_)));
    assert!(!output.exists());
}

#[test]
fn test_trailing_garbage_detected() {
    let ws = Workspace::new();
    let input = ws.file("g.txt", b"garbage follows");
    let packed = ws.path("g.huff");
    compress(&input, &packed).unwrap();

    let mut container = fs::read(&packed).unwrap();
    container.extend_from_slice(b"junk");
    fs::write(&packed, &container).unwrap();

    let err = decompress(&packed, &ws.path("g.out")).unwrap_err();
    assert!(matches!(err, CompressError::Corrupt(_)));
}

#[test]
fn test_presence_layout_file() {
    let ws = Workspace::new();
    let compressor =
        Compressor::new(CompressionConfig::default().with_layout(HeaderLayout::Presence));

    // two symbols with equal counts build the same tree from real and
    // placeholder weights, and 16 one-bit codes fill two bytes exactly
    let data = b"abababababababab";
    let input = ws.file("p.txt", data);
    let packed = ws.path("p.huff");
    let summary = compressor.compress_file(&input, &packed).unwrap();
    assert_eq!(summary.header_bytes, BITMAP_LEN as u64);
    assert_eq!(summary.payload.padding_bits(), 0);
    assert_eq!(fs::metadata(&packed).unwrap().len(), BITMAP_LEN as u64 + 2);

    let output = ws.path("p.out");
    compressor.decompress_file(&packed, &output).unwrap();
    assert_eq!(fs::read(output).unwrap(), data);
}

#[test]
fn test_layout_mismatch_is_not_silent() {
    let ws = Workspace::new();
    let input = ws.file("m.txt", b"counted header read as presence");
    let packed = ws.path("m.huff");
    compress(&input, &packed).unwrap();

    let presence =
        Compressor::new(CompressionConfig::default().with_layout(HeaderLayout::Presence));
    let output = ws.path("m.out");
    // the counts are decoded as payload, so the bytes cannot match
    match presence.decompress_file(&packed, &output) {
        Ok(_) => assert_ne!(fs::read(&output).unwrap(), b"counted header read as presence"),
        Err(err) => assert!(matches!(err, CompressError::Corrupt(_))),
    }
}

#[test]
fn test_config_from_file() {
    let ws = Workspace::new();
    let config_path = ws.file(
        "hcompress.json",
        br#"{ "layout": "presence", "buffer_size": 16 }"#,
    );
    let config = CompressionConfig::from_path(&config_path).unwrap();
    assert_eq!(config.layout, HeaderLayout::Presence);
    assert_eq!(config.buffer_size, 16);

    // a tiny buffer still streams whole files
    let compressor = Compressor::new(CompressionConfig {
        layout: HeaderLayout::Counted,
        ..config
    });
    let data: Vec<u8> = (0..5000u32).map(|i| (i % 97) as u8).collect();
    let input = ws.file("c.bin", &data);
    let packed = ws.path("c.huff");
    let output = ws.path("c.out");
    compressor.compress_file(&input, &packed).unwrap();
    compressor.decompress_file(&packed, &output).unwrap();
    assert_eq!(fs::read(output).unwrap(), data);
}

#[test]
fn test_code_table_for_file() {
    let ws = Workspace::new();
    let input = ws.file("codes.txt", b"aaaabbc");
    let codes = Compressor::default().code_table(&input).unwrap();
    assert_eq!(codes.len(), 3);
    assert_eq!(codes.get(b'a').map(|c| c.len()), Some(1));
    assert!(codes.presence().contains(b'c'));
    assert!(!codes.presence().contains(b'd'));
}
