//! netreplay - Replay inspector
//!
//! Loads recorded game sessions from disk and prints what they contain.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use netreplay::config::{self, Config, OutputFormat};
use netreplay::replay::{
    DecodeError, DecodeMode, DecodeOptions, ReplayDecoder, Schema, PACKET_PREFIX,
};
use netreplay::report::{PacketLine, ReplaySummary};

/// netreplay - Recorded game session inspector
#[derive(Parser)]
#[command(name = "netreplay")]
#[command(version)]
#[command(about = "Decode and inspect recorded game session replays", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Decode settings shared by the replay commands
#[derive(clap::Args)]
struct DecodeArgs {
    /// Sections before the packet stream: bare or full
    #[arg(short, long)]
    schema: Option<Schema>,

    /// Decode packet payloads into root messages
    #[arg(short, long)]
    decode: bool,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize one or more replay files
    Inspect {
        /// Replay files to decode
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[command(flatten)]
        args: DecodeArgs,
    },

    /// List the packets of a replay file
    Packets {
        /// Replay file to decode
        file: PathBuf,

        /// Maximum number of packets to list
        #[arg(short, long)]
        limit: Option<usize>,

        #[command(flatten)]
        args: DecodeArgs,
    },

    /// Show current configuration
    Config {
        /// Generate sample configuration
        #[arg(long)]
        generate: bool,

        /// Output path for generated config
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show format information
    Info,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Load configuration
    let config = if let Some(config_path) = &cli.config {
        Config::load(config_path)?
    } else {
        Config::load_default().unwrap_or_default()
    };

    match cli.command {
        Commands::Inspect { files, args } => {
            run_inspect(&config, files, &args).await?;
        }
        Commands::Packets { file, limit, args } => {
            run_packets(&config, file, limit, &args).await?;
        }
        Commands::Config { generate, output } => {
            if generate {
                let sample = config::generate_sample_config()?;
                if let Some(path) = output {
                    std::fs::write(&path, &sample)?;
                    println!("Configuration written to: {}", path.display());
                } else {
                    println!("{}", sample);
                }
            } else {
                println!("{}", toml::to_string_pretty(&config)?);
            }
        }
        Commands::Info => {
            print_format_info();
        }
    }

    Ok(())
}

/// Merge command-line flags over the configured decode settings
fn decode_options(config: &Config, args: &DecodeArgs) -> DecodeOptions {
    let mut options = config.decode.options();
    if let Some(schema) = args.schema {
        options.schema = schema;
    }
    if args.decode {
        options.mode = DecodeMode::Decoded;
    }
    options
}

fn output_format(config: &Config, args: &DecodeArgs) -> OutputFormat {
    if args.json {
        OutputFormat::Json
    } else {
        config.output.format
    }
}

/// Describe a decode failure with its offset and packet index
fn describe_error(err: &DecodeError) -> String {
    let mut text = err.to_string();
    if let Some(index) = err.packet_index() {
        text.push_str(&format!(" [packet {}]", index));
    }
    if let Some(offset) = err.offset() {
        text.push_str(&format!(" [offset {:#x}]", offset));
    }
    text
}

/// Read a file and decode it on the blocking pool
async fn decode_file(
    decoder: Arc<ReplayDecoder>,
    path: PathBuf,
) -> anyhow::Result<netreplay::Replay> {
    let bytes = tokio::fs::read(&path).await?;
    tracing::debug!("Read {} bytes from {}", bytes.len(), path.display());

    let replay = tokio::task::spawn_blocking(move || decoder.decode(bytes))
        .await?
        .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), describe_error(&e)))?;
    Ok(replay)
}

/// Decode every file concurrently and print a summary of each
async fn run_inspect(
    config: &Config,
    files: Vec<PathBuf>,
    args: &DecodeArgs,
) -> anyhow::Result<()> {
    let options = decode_options(config, args);
    let format = output_format(config, args);

    tracing::info!(
        "Inspecting {} file(s) with schema '{}' ({:?} packets)",
        files.len(),
        options.schema,
        options.mode
    );

    let (summaries, failures) = inspect_files(Arc::new(ReplayDecoder::new(options)), files).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
        OutputFormat::Text => {
            for summary in &summaries {
                println!("{}", summary);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} replay(s) failed to decode", failures);
    }
    Ok(())
}

/// Decode files concurrently, returning the summaries in input order and
/// the number of files that failed
///
/// Failures are logged and do not stop the remaining files.
async fn inspect_files(
    decoder: Arc<ReplayDecoder>,
    files: Vec<PathBuf>,
) -> anyhow::Result<(Vec<ReplaySummary>, usize)> {
    let tasks: Vec<_> = files
        .into_iter()
        .map(|path| {
            let decoder = Arc::clone(&decoder);
            let source = path.display().to_string();
            (source, tokio::spawn(decode_file(decoder, path)))
        })
        .collect();

    let mut summaries = Vec::new();
    let mut failures = 0;
    for (source, task) in tasks {
        match task.await? {
            Ok(replay) => {
                if replay.trailing_bytes > 0 {
                    tracing::warn!(
                        "{}: {} trailing bytes after last packet",
                        source,
                        replay.trailing_bytes
                    );
                }
                summaries.push(ReplaySummary::new(&replay).with_source(source));
            }
            Err(e) => {
                tracing::error!("{}", e);
                failures += 1;
            }
        }
    }

    Ok((summaries, failures))
}

/// List the packets of a single replay
async fn run_packets(
    config: &Config,
    file: PathBuf,
    limit: Option<usize>,
    args: &DecodeArgs,
) -> anyhow::Result<()> {
    let options = decode_options(config, args);
    let limit = limit.unwrap_or(config.output.max_packets);
    let decoder = Arc::new(ReplayDecoder::new(options));

    let replay = decode_file(decoder, file).await?;
    let lines: Vec<PacketLine> = replay
        .packets
        .iter()
        .enumerate()
        .take(limit)
        .map(|(index, packet)| PacketLine::new(index, packet))
        .collect();

    match output_format(config, args) {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&lines)?),
        OutputFormat::Text => {
            for line in &lines {
                println!("{}", line);
            }
            if replay.packets.len() > lines.len() {
                println!("... {} more", replay.packets.len() - lines.len());
            }
        }
    }

    Ok(())
}

/// Print format information
fn print_format_info() {
    println!("netreplay Format Information");
    println!("============================\n");

    println!("Header:  version (u32 LE)");
    println!("Full schema adds:");
    println!("  players (u8 count): id u8, name (packed length + UTF-8), cosmetics (u8 count)");
    println!("  game options (u8 count): u16 length-prefixed frames");
    println!(
        "Packets (u32 count): direction u8, payload ({}-byte length prefix)",
        PACKET_PREFIX.width()
    );

    println!("\nSchemas: {}, {}", Schema::Bare, Schema::Full);
}
