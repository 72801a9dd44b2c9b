use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use std::path::{Path, PathBuf};

use respiro::signal_processing::{Coherence, coherence_of};
use respiro::{SampleSource, WavSource, Waveform};

#[derive(Parser, Debug)]
#[command(name = "coherence_wav")]
#[command(about = "Magnitude-squared coherence between two recorded signals", long_about = None)]
struct Args {
    /// First recording
    first: PathBuf,

    /// Second recording (default: same as the first)
    #[arg(long)]
    second: Option<PathBuf>,

    /// Channel of the first recording
    #[arg(long, default_value = "channel0")]
    first_channel: String,

    /// Channel of the second recording
    #[arg(long, default_value = "channel1")]
    second_channel: String,

    /// Window start in seconds
    #[arg(long)]
    start: Option<f64>,

    /// Window end in seconds
    #[arg(long)]
    end: Option<f64>,

    /// Breathing band lower edge in Hz
    #[arg(long, default_value_t = 0.1)]
    band_low: f64,

    /// Breathing band upper edge in Hz
    #[arg(long, default_value_t = 0.7)]
    band_high: f64,

    /// Print the full spectrum as JSON
    #[arg(long)]
    json: bool,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Serialize)]
struct CoherenceReport<'a> {
    first: String,
    second: String,
    band_low: f64,
    band_high: f64,
    band_mean: Option<f64>,
    spectrum: &'a Coherence,
}

fn load(path: &Path, channel: &str, args: &Args) -> anyhow::Result<Waveform> {
    let source =
        WavSource::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let waveform = source.get_series(
        channel,
        args.start.unwrap_or(f64::NEG_INFINITY),
        args.end.unwrap_or(f64::INFINITY),
    )?;
    Ok(waveform)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let second_path = args.second.clone().unwrap_or_else(|| args.first.clone());
    let a = load(&args.first, &args.first_channel, &args)?;
    let b = load(&second_path, &args.second_channel, &args)?;
    log::info!(
        "{} samples at {} Hz vs {} samples at {} Hz",
        a.len(),
        a.sample_rate(),
        b.len(),
        b.sample_rate()
    );

    let spectrum = coherence_of(&a, &b)?;
    let band_mean = spectrum.band_mean(args.band_low, args.band_high);

    if args.json {
        let report = CoherenceReport {
            first: format!("{}:{}", args.first.display(), args.first_channel),
            second: format!("{}:{}", second_path.display(), args.second_channel),
            band_low: args.band_low,
            band_high: args.band_high,
            band_mean,
            spectrum: &spectrum,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{:>12} {:>10}", "Freq (Hz)", "Coherence");
    println!("{}", "-".repeat(23));
    for (f, c) in spectrum
        .frequencies
        .iter()
        .zip(&spectrum.magnitude_squared)
        .filter(|(f, _)| **f <= args.band_high * 2.0)
    {
        println!("{:>12.4} {:>10.4}", f, c);
    }
    match band_mean {
        Some(mean) => eprintln!(
            "Mean coherence {:.2}-{:.2} Hz: {:.3}",
            args.band_low, args.band_high, mean
        ),
        None => eprintln!(
            "No frequency bins between {:.2} and {:.2} Hz",
            args.band_low, args.band_high
        ),
    }

    Ok(())
}
