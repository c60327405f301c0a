//! # String Tuner - Command Line Front End
//!
//! Wires the detection core to live input or a recording and prints each
//! reading.
//!
//! ## Commands
//! - `listen`: default input device, one line per detected frame
//! - `analyze`: run a WAV file through the detector
//! - `tunings`: list the built-in reference sets
//! - `config`: print the effective detector configuration as JSON

mod output;
mod wav;
mod worker;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use tuner_core::DetectorConfig;
use tuner_core::presets;
use tuner_core::reference::ReferenceTuning;
use tuner_core::sink::PitchSink;

use output::{ConsoleSink, JsonSink};

#[derive(Debug, Parser)]
#[command(
    name = "string-tuner",
    version,
    about = "Plucked-string pitch detector"
)]
struct Cli {
    /// Detector configuration file (JSON)
    #[arg(long, global = true, conflicts_with = "tuning")]
    config: Option<PathBuf>,

    /// Built-in reference set to tune against
    #[arg(long, global = true)]
    tuning: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Detect pitch from the default input device
    Listen {
        /// Stop after this many seconds
        #[arg(long)]
        seconds: Option<u64>,
        /// Samples between successive frames (default: half a frame)
        #[arg(long)]
        hop: Option<usize>,
        /// Print JSON lines instead of text
        #[arg(long)]
        json: bool,
    },
    /// Detect pitch across a WAV recording
    Analyze {
        file: PathBuf,
        #[arg(long)]
        hop: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// List built-in tunings and their periods
    Tunings {
        #[arg(long, default_value_t = 44100)]
        sample_rate: u32,
    },
    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = resolve_config(cli.config.as_deref(), cli.tuning.as_deref())?;
    tracing::debug!("[CLI] Effective config: {:?}", config);

    match cli.command {
        Command::Listen { seconds, hop, json } => {
            let hop = hop.unwrap_or(config.buffer_length / 2);
            let mut sink = make_sink(json);
            worker::listen(config, hop, seconds, sink.as_mut())
        }
        Command::Analyze { file, hop, json } => {
            let hop = hop.unwrap_or(config.buffer_length / 2);
            let mut sink = make_sink(json);
            let summary = wav::analyze_file(&file, config, hop, sink.as_mut())?;
            if let Some(reference) = summary.last_reference {
                tracing::info!("[CLI] Final match: {}", reference);
            }
            Ok(())
        }
        Command::Tunings { sample_rate } => print_tunings(sample_rate),
        Command::Config => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
            Ok(())
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides `-v`.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn make_sink(json: bool) -> Box<dyn PitchSink> {
    if json {
        Box::new(JsonSink::new(io::stdout()))
    } else {
        Box::new(ConsoleSink::new(io::stdout()))
    }
}

/// Config file, else named preset, else defaults.
fn resolve_config(path: Option<&Path>, tuning: Option<&str>) -> Result<DetectorConfig> {
    if let Some(path) = path {
        return load_config(path);
    }
    match tuning {
        Some(name) => {
            let preset = presets::preset(name).ok_or_else(|| {
                let known: Vec<&str> = presets::presets().map(|p| p.name).collect();
                anyhow!("Unknown tuning '{}' (known: {})", name, known.join(", "))
            })?;
            Ok(DetectorConfig::from_preset(preset))
        }
        None => Ok(DetectorConfig::default()),
    }
}

/// Loads a detector configuration from a JSON file. Missing fields take
/// their defaults.
fn load_config(path: &Path) -> Result<DetectorConfig> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let config = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Invalid config in {}", path.display()))?;
    Ok(config)
}

fn print_tunings(sample_rate: u32) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for preset in presets::presets() {
        writeln!(
            out,
            "{} - {} (frame {} samples)",
            preset.name, preset.description, preset.buffer_length
        )?;
        for spec in &preset.references {
            let reference = ReferenceTuning::new(spec, sample_rate)?;
            writeln!(
                out,
                "  {:<4} {:>9.3} Hz  {:>5} samples",
                reference.name(),
                reference.target_frequency(),
                reference.expected_offset()
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses() {
        let args = "string-tuner --tuning bass analyze a.wav --hop 512";
        let cli = Cli::try_parse_from(args.split(' ')).unwrap();
        assert_eq!(cli.tuning.as_deref(), Some("bass"));
        assert!(matches!(cli.command, Command::Analyze { hop: Some(512), .. }));

        let args = "string-tuner --config x.json --tuning bass config";
        assert!(Cli::try_parse_from(args.split(' ')).is_err());
    }

    #[test]
    fn preset_selection() {
        let config = resolve_config(None, Some("bass")).unwrap();
        assert_eq!(config.buffer_length, 4096);
        assert!(resolve_config(None, Some("banjo")).is_err());
        assert_eq!(
            resolve_config(None, None).unwrap(),
            DetectorConfig::default()
        );
    }

    #[test]
    fn missing_config_file_is_an_error() {
        assert!(load_config(Path::new("/nonexistent/tuner.json")).is_err());
    }
}
