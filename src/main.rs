//! hcompress command line
//!
//! ```bash
//! hcompress -c -o notes.huff notes.txt
//! hcompress -d -o notes.txt notes.huff
//! hcompress -c --layout presence -o notes.huff notes.txt
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use hcompress::config::{CompressionConfig, HeaderLayout};
use hcompress::Compressor;

#[derive(Parser, Debug)]
#[command(name = "hcompress")]
#[command(version)]
#[command(about = "Huffman file compressor", long_about = None)]
#[command(group(ArgGroup::new("mode").required(true).args(["compress", "decompress"])))]
struct Args {
    /// Compress INPUT into OUTPUT
    #[arg(short = 'c')]
    compress: bool,

    /// Decompress INPUT into OUTPUT
    #[arg(short = 'd')]
    decompress: bool,

    /// Output file
    #[arg(short = 'o', value_name = "OUTPUT")]
    output: PathBuf,

    /// Input file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Header layout (counted, presence); overrides the config file
    #[arg(long)]
    layout: Option<HeaderLayout>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log each symbol's code before compressing
    #[arg(long)]
    print_codes: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;

    let mut config = match &args.config {
        Some(path) => CompressionConfig::from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => CompressionConfig::default(),
    };
    if let Some(layout) = args.layout {
        config.layout = layout;
    }
    let compressor = Compressor::new(config);

    info!(input = %args.input.display(), output = %args.output.display(), "starting");

    if args.compress {
        if args.print_codes {
            let codes = compressor
                .code_table(&args.input)
                .context("compression failed")?;
            for (symbol, code) in codes.iter() {
                info!("{:?}: {}", symbol as char, code);
            }
        }
        let summary = compressor
            .compress_file(&args.input, &args.output)
            .context("compression failed")?;
        info!(
            "{} bytes -> {} bytes ({} symbols in alphabet)",
            summary.symbols(),
            summary.container_bytes(),
            summary.alphabet
        );
    } else {
        let summary = compressor
            .decompress_file(&args.input, &args.output)
            .context("decompression failed")?;
        info!(
            "{} bytes -> {} bytes",
            summary.container_bytes(),
            summary.symbols()
        );
    }

    Ok(())
}
