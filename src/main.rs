//! Command-line interface over the packing codecs.
//!
//! Thin dispatcher: argument parsing, JSON file I/O of the envelope
//! format, and a guided REPL. All packing logic lives in the library.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::debug;

use kbits::transmission::{self, TransmissionMetrics};
use kbits::{bench, from_envelope, get_bitpacking, BitPacking, Envelope, PackError, Result};

#[derive(Parser)]
#[command(name = "kbits")]
#[command(about = "Integer array compression with O(1) random access")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Packing variant: noncross, cross, overflow, overflow-noncross
    #[arg(short = 'i', long = "variant", global = true, default_value = "noncross")]
    variant: String,

    /// Percentile cutoff for the overflow exception list, in (0, 1]
    #[arg(long, global = true, default_value_t = kbits::DEFAULT_OVERFLOW_THRESHOLD)]
    threshold: f64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compress a JSON array of integers into an envelope file
    Compress {
        /// Input JSON array
        #[arg(long = "in")]
        input: PathBuf,
        /// Output envelope
        #[arg(long = "out")]
        output: PathBuf,
    },
    /// Expand an envelope file back into a JSON array
    Decompress {
        /// Input envelope
        #[arg(long = "in")]
        input: PathBuf,
        /// Output JSON array
        #[arg(long = "out")]
        output: PathBuf,
    },
    /// Print one element of a compressed array without expanding it
    Get {
        /// Input envelope
        #[arg(long = "in")]
        input: PathBuf,
        /// Zero-based element index
        #[arg(long)]
        index: i64,
    },
    /// Time compress, get, and decompress over synthetic workloads
    Bench,
    /// Compare raw against compressed transfer time
    Transmission(TransmissionArgs),
    /// Guided prompt over the same operations
    Interactive,
}

#[derive(Args)]
struct TransmissionArgs {
    /// Envelope file to derive sizes and codec times from
    #[arg(long)]
    file: Option<PathBuf>,

    /// Raw payload size in bits (with --compressed-bits, instead of --file)
    #[arg(long)]
    raw_bits: Option<u64>,

    /// Compressed payload size in bits
    #[arg(long)]
    compressed_bits: Option<u64>,

    /// Compression time in nanoseconds
    #[arg(long, default_value_t = 0)]
    compress_ns: u64,

    /// Decompression time in nanoseconds
    #[arg(long, default_value_t = 0)]
    decompress_ns: u64,

    /// Report a single bandwidth (bits/s) instead of the ladder sweep
    #[arg(long)]
    bandwidth: Option<f64>,

    /// One-way latency in nanoseconds for the single-bandwidth report
    #[arg(long, default_value_t = 0)]
    latency_ns: u64,
}

fn read_values(path: &Path) -> Result<Vec<u32>> {
    let text = fs::read_to_string(path)?;
    let raw: Vec<u64> = serde_json::from_str(&text)?;
    raw.into_iter()
        .enumerate()
        .map(|(index, value)| {
            u32::try_from(value).map_err(|_| PackError::ValueTooLarge { value, index })
        })
        .collect()
}

fn read_envelope(path: &Path) -> Result<Envelope> {
    let text = fs::read_to_string(path)?;
    let envelope: Envelope = serde_json::from_str(&text)?;
    envelope.validate()?;
    Ok(envelope)
}

fn cmd_compress(variant: &str, threshold: f64, input: &Path, output: &Path) -> Result<()> {
    let values = read_values(input)?;
    let mut codec = get_bitpacking(variant, threshold)?;
    let envelope = codec.compress(&values)?;
    fs::write(output, serde_json::to_string(&envelope)?)?;
    debug!(
        n = values.len(),
        k = envelope.k(),
        variant = envelope.variant_name(),
        "wrote envelope"
    );
    println!(
        "compressed {} values to {} (variant {}, k = {}, {} words)",
        values.len(),
        output.display(),
        envelope.variant_name(),
        envelope.k(),
        envelope.words().len()
    );
    Ok(())
}

fn cmd_decompress(input: &Path, output: &Path) -> Result<()> {
    let envelope = read_envelope(input)?;
    let codec = from_envelope(&envelope)?;
    let values = codec.decompress()?;
    fs::write(output, serde_json::to_string(&values)?)?;
    println!("decompressed {} values to {}", values.len(), output.display());
    Ok(())
}

fn cmd_get(input: &Path, index: i64) -> Result<()> {
    let envelope = read_envelope(input)?;
    let codec = from_envelope(&envelope)?;
    if index < 0 {
        return Err(PackError::IndexOutOfBounds {
            index,
            len: codec.len(),
        });
    }
    let value = codec.get(index as usize)?;
    println!("{value}");
    Ok(())
}

fn cmd_transmission(args: &TransmissionArgs) -> Result<()> {
    let (raw_bits, compressed_bits, compress_ns, decompress_ns) = match &args.file {
        Some(path) => {
            let envelope = read_envelope(path)?;
            let mut codec = from_envelope(&envelope)?;

            let start = Instant::now();
            let values = codec.decompress()?;
            let decompress_ns = start.elapsed().as_nanos() as u64;

            let start = Instant::now();
            codec.compress(&values)?;
            let compress_ns = start.elapsed().as_nanos() as u64;

            debug!(raw = envelope.raw_bits(), stored = envelope.stored_bits(), "derived sizes");
            (
                envelope.raw_bits(),
                envelope.stored_bits(),
                compress_ns,
                decompress_ns,
            )
        }
        None => {
            let raw = args.raw_bits.ok_or_else(|| {
                PackError::Usage("transmission needs --file or --raw-bits with --compressed-bits".into())
            })?;
            let compressed = args.compressed_bits.ok_or_else(|| {
                PackError::Usage("transmission needs --compressed-bits alongside --raw-bits".into())
            })?;
            (raw, compressed, args.compress_ns, args.decompress_ns)
        }
    };

    match args.bandwidth {
        Some(bandwidth_bps) => {
            let metrics = TransmissionMetrics {
                uncompressed_size_bits: raw_bits,
                compressed_size_bits: compressed_bits,
                compression_time_ns: compress_ns,
                decompression_time_ns: decompress_ns,
                bandwidth_bps,
                latency_ns: args.latency_ns,
            };
            println!("{}", metrics.format_report());
        }
        None => {
            println!(
                "{}",
                transmission::analyze_scenarios(raw_bits, compressed_bits, compress_ns, decompress_ns)
            );
        }
    }
    Ok(())
}

fn print_repl_help() {
    println!(
        r#"Commands:
  compress <variant> <in.json> <out.json> [threshold]
  decompress <in.json> <out.json>
  get <envelope.json> <index>
  bench <variant>
  transmission <envelope.json>
  help
  quit"#
    );
}

fn repl_dispatch(parts: &[&str]) -> Result<()> {
    match parts {
        ["compress", variant, input, output] => {
            cmd_compress(variant, kbits::DEFAULT_OVERFLOW_THRESHOLD, Path::new(input), Path::new(output))
        }
        ["compress", variant, input, output, threshold] => {
            let threshold: f64 = threshold
                .parse()
                .map_err(|_| PackError::Usage(format!("bad threshold '{threshold}'")))?;
            cmd_compress(variant, threshold, Path::new(input), Path::new(output))
        }
        ["decompress", input, output] => cmd_decompress(Path::new(input), Path::new(output)),
        ["get", input, index] => {
            let index: i64 = index
                .parse()
                .map_err(|_| PackError::Usage(format!("bad index '{index}'")))?;
            cmd_get(Path::new(input), index)
        }
        ["bench", variant] => bench::run_benchmarks(variant, kbits::DEFAULT_OVERFLOW_THRESHOLD),
        ["transmission", input] => cmd_transmission(&TransmissionArgs {
            file: Some(PathBuf::from(input)),
            raw_bits: None,
            compressed_bits: None,
            compress_ns: 0,
            decompress_ns: 0,
            bandwidth: None,
            latency_ns: 0,
        }),
        _ => Err(PackError::Usage(
            "unrecognized command; type 'help' for the list".into(),
        )),
    }
}

fn run_interactive() -> Result<()> {
    println!("kbits v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'help' for the command list, 'quit' to leave.");
    println!();

    let mut rl = DefaultEditor::new()
        .map_err(|e| PackError::Usage(format!("cannot start the prompt: {e}")))?;
    let history_file = PathBuf::from(".kbits_history");
    let _ = rl.load_history(&history_file);

    loop {
        match rl.readline("kbits> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                let parts: Vec<&str> = trimmed.split_whitespace().collect();
                match parts.as_slice() {
                    ["quit"] | ["exit"] => break,
                    ["help"] => print_repl_help(),
                    other => {
                        if let Err(e) = repl_dispatch(other) {
                            eprintln!("error: {e}");
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("error: {err:?}");
                break;
            }
        }
    }

    let _ = rl.save_history(&history_file);
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Command::Compress { input, output } => {
            cmd_compress(&cli.variant, cli.threshold, input, output)
        }
        Command::Decompress { input, output } => cmd_decompress(input, output),
        Command::Get { input, index } => cmd_get(input, *index),
        Command::Bench => bench::run_benchmarks(&cli.variant, cli.threshold),
        Command::Transmission(args) => cmd_transmission(args),
        Command::Interactive => run_interactive(),
    }
}

/// 1 for usage errors, 2 for data errors.
fn exit_code(err: &PackError) -> i32 {
    match err {
        PackError::UnknownCodec(_) | PackError::Usage(_) => 1,
        _ => 2,
    }
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = err.print();
            process::exit(code);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        process::exit(exit_code(&err));
    }
}
