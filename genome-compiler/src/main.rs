//! `agc` - ATOMiK genome compiler CLI.

use std::path::PathBuf;

use clap::Parser;
use genome_compiler::{compile_file, DEFAULT_FORMAT_VERSION};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Translate a JSON genome schema into a `.gnm` genome file.
#[derive(Parser, Debug)]
#[command(name = "agc", author, version, about, long_about = None)]
struct Cli {
    /// Increase output verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Genome schema (JSON).
    #[arg(value_name = "SCHEMA")]
    input: PathBuf,
    /// Directory the `<meta.id>.gnm` file is written to.
    #[arg(
        short,
        long,
        env = "AGC_OUT_DIR",
        default_value = ".",
        value_name = "DIR"
    )]
    out_dir: PathBuf,
    /// Header format version byte.
    #[arg(long, env = "AGC_FORMAT_VERSION", default_value_t = DEFAULT_FORMAT_VERSION)]
    format_version: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let output = compile_file(&cli.input, &cli.out_dir, cli.format_version)?;
    info!("compiled {}", output.display());
    println!("{}", output.display());
    Ok(())
}
