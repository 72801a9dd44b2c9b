use anyhow::Context;
use chrono::NaiveDateTime;
use clap::Parser;
use crossbeam_channel::bounded;
use std::path::{Path, PathBuf};

use respiro::config::{AnalysisConfig, BiasMode};
use respiro::epoch::EpochClock;
use respiro::output::{AnalysisReport, OutputFormat, create_formatter};
use respiro::respiration::analyze;
use respiro::signal_processing::derivative;
use respiro::{SampleSource, WavSource, Waveform};

#[derive(Parser, Debug)]
#[command(name = "respiro")]
#[command(about = "Breathing statistics for respiratory effort and flow recordings", long_about = None)]
struct Args {
    /// WAV recordings to analyze
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// TOML analysis configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Channels to analyze (default: every channel)
    #[arg(long = "channel", value_name = "NAME")]
    channels: Vec<String>,

    /// Also analyze the difference of two channels, e.g. --derivative channel0 channel1
    #[arg(long, num_args = 2, value_names = ["MINUEND", "SUBTRAHEND"])]
    derivative: Option<Vec<String>>,

    /// Window start in seconds
    #[arg(long, conflicts_with_all = ["epoch", "per_epoch"])]
    start: Option<f64>,

    /// Window end in seconds
    #[arg(long, conflicts_with_all = ["epoch", "per_epoch"])]
    end: Option<f64>,

    /// Analyze a single epoch (1-based)
    #[arg(long, conflicts_with = "per_epoch")]
    epoch: Option<u32>,

    /// Analyze every epoch separately
    #[arg(long)]
    per_epoch: bool,

    /// Wall-clock start of the recording, e.g. 2024-03-01T22:00:00
    #[arg(long)]
    recording_start: Option<NaiveDateTime>,

    /// Minimum peak width in milliseconds
    #[arg(long)]
    min_peak_width_ms: Option<f64>,

    /// Keep consecutive same-sign peaks separate
    #[arg(long)]
    no_merge: bool,

    /// Bias removal: none, mean, fixed
    #[arg(long, value_enum)]
    bias_mode: Option<BiasMode>,

    /// Bias subtracted with --bias-mode fixed
    #[arg(long)]
    bias: Option<f32>,

    /// Low-pass cutoff in Hz
    #[arg(long)]
    low_pass: Option<f64>,

    /// Moving average half-length in samples
    #[arg(long)]
    moving_average: Option<usize>,

    /// Output format: text, csv, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Show every statistic in text output
    #[arg(short = 'd', long)]
    detailed: bool,

    /// Worker threads (default: available cores)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Signal to analyze within a recording
#[derive(Debug, Clone)]
enum SignalSpec {
    Channel(String),
    Derivative(String, String),
}

impl SignalSpec {
    fn name(&self) -> String {
        match self {
            SignalSpec::Channel(name) => name.clone(),
            SignalSpec::Derivative(a, b) => format!("{}-{}", a, b),
        }
    }

    fn series(&self, source: &dyn SampleSource, start: f64, end: f64) -> respiro::Result<Waveform> {
        match self {
            SignalSpec::Channel(name) => source.get_series(name, start, end),
            SignalSpec::Derivative(a, b) => derivative(
                &source.get_series(a, start, end)?,
                &source.get_series(b, start, end)?,
            ),
        }
    }
}

/// Analysis window in seconds, optionally tagged with its epoch
#[derive(Debug, Clone, Copy)]
struct Window {
    epoch: Option<u32>,
    start: f64,
    end: f64,
}

fn build_config(args: &Args) -> anyhow::Result<AnalysisConfig> {
    let mut config = match args.config {
        Some(ref path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AnalysisConfig::default(),
    };

    if let Some(width) = args.min_peak_width_ms {
        config.parameters.minimum_peak_width_ms = width;
    }
    if args.no_merge {
        config.parameters.merge_same_sign_peaks = false;
    }
    if let Some(mode) = args.bias_mode {
        config.conditioning.bias_mode = mode;
    }
    if let Some(bias) = args.bias {
        config.conditioning.bias = bias;
    }
    if args.low_pass.is_some() {
        config.conditioning.low_pass_cutoff_hz = args.low_pass;
    }
    if args.moving_average.is_some() {
        config.conditioning.moving_average_half_length = args.moving_average;
    }

    config.validate()?;
    Ok(config)
}

fn windows(args: &Args, clock: &EpochClock, duration: f64) -> Vec<Window> {
    // Epoch ends are exclusive; the sample source window is inclusive
    let epoch_window = |epoch: u32| {
        let (start, end) = clock.epoch_window(epoch);
        Window {
            epoch: Some(epoch),
            start,
            end: end - 1e-9,
        }
    };

    if let Some(epoch) = args.epoch {
        vec![epoch_window(epoch)]
    } else if args.per_epoch {
        (1..=clock.epoch_count(duration)).map(epoch_window).collect()
    } else {
        vec![Window {
            epoch: None,
            start: args.start.unwrap_or(f64::NEG_INFINITY),
            end: args.end.unwrap_or(f64::INFINITY),
        }]
    }
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

    let config = build_config(&args)?;
    let clock = EpochClock::new(
        args.recording_start.unwrap_or_default(),
        config.epoch.length_secs,
    )?;

    let jobs = args
        .jobs
        .unwrap_or_else(|| std::thread::available_parallelism().map_or(1, |n| n.get()))
        .clamp(1, args.files.len());

    log::info!(
        "Analyzing {} file(s) with {} worker(s), min peak width {} ms",
        args.files.len(),
        jobs,
        config.parameters.minimum_peak_width_ms
    );

    let (job_tx, job_rx) = bounded::<(usize, &PathBuf)>(jobs);
    let (result_tx, result_rx) = bounded::<(usize, Vec<AnalysisReport>)>(jobs);

    let files = &args.files;
    let mut results: Vec<(usize, Vec<AnalysisReport>)> = std::thread::scope(|scope| {
        for _ in 0..jobs {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let (args, config, clock) = (&args, &config, &clock);
            scope.spawn(move || {
                for (index, path) in job_rx {
                    let reports = analyze_file(path, args, config, clock);
                    if result_tx.send((index, reports)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(job_rx);
        drop(result_tx);

        scope.spawn(move || {
            for job in files.iter().enumerate() {
                if job_tx.send(job).is_err() {
                    break;
                }
            }
        });

        result_rx.iter().collect()
    });
    results.sort_by_key(|(index, _)| *index);

    let formatter = create_formatter(args.format, args.detailed);
    if let Some(header) = formatter.header() {
        println!("{}", header);
    }
    for report in results.iter().flat_map(|(_, reports)| reports) {
        println!("{}", formatter.format(report));
    }

    Ok(())
}

fn analyze_file(
    path: &Path,
    args: &Args,
    config: &AnalysisConfig,
    clock: &EpochClock,
) -> Vec<AnalysisReport> {
    let filename = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let source = match WavSource::open(path) {
        Ok(source) => source,
        Err(e) => return vec![AnalysisReport::failed(filename, "-", e)],
    };

    let mut signals: Vec<SignalSpec> = if args.channels.is_empty() {
        source.signal_names().into_iter().map(SignalSpec::Channel).collect()
    } else {
        args.channels.iter().cloned().map(SignalSpec::Channel).collect()
    };
    if let Some(ref pair) = args.derivative
        && let [a, b] = pair.as_slice()
    {
        signals.push(SignalSpec::Derivative(a.clone(), b.clone()));
    }

    let duration = source
        .signal_names()
        .first()
        .and_then(|name| source.full_series(name).ok())
        .and_then(|w| w.end_time().map(|end| end + w.sample_period()))
        .unwrap_or(0.0);

    let mut reports = Vec::new();
    for signal in &signals {
        for window in windows(args, clock, duration) {
            if let Some(epoch) = window.epoch {
                log::debug!(
                    "{} {}: epoch {} starts {}",
                    filename,
                    signal.name(),
                    epoch,
                    clock.epoch_to_datetime(epoch)
                );
            }

            let result = signal
                .series(&source, window.start, window.end)
                .and_then(|waveform| analyze(&waveform, config));
            let report = match result {
                Ok(analysis) => AnalysisReport::from_analysis(&filename, signal.name(), &analysis),
                Err(e) => AnalysisReport::failed(&filename, signal.name(), e),
            };
            reports.push(match window.epoch {
                Some(epoch) => report.with_epoch(epoch),
                None => report,
            });
        }
    }
    reports
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["respiro", "night.wav"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    fn clock() -> EpochClock {
        EpochClock::new(NaiveDateTime::default(), 30.0).unwrap()
    }

    #[test]
    fn test_cli_overrides_config() {
        let config = build_config(&args(&[
            "--min-peak-width-ms",
            "250",
            "--no-merge",
            "--bias-mode",
            "fixed",
            "--bias",
            "0.5",
            "--low-pass",
            "2",
        ]))
        .unwrap();
        assert_eq!(config.parameters.minimum_peak_width_ms, 250.0);
        assert!(!config.parameters.merge_same_sign_peaks);
        assert_eq!(config.conditioning.bias_mode, BiasMode::Fixed);
        assert_eq!(config.conditioning.bias, 0.5);
        assert_eq!(config.conditioning.low_pass_cutoff_hz, Some(2.0));
    }

    #[test]
    fn test_invalid_override_rejected() {
        assert!(build_config(&args(&["--moving-average", "0"])).is_err());
    }

    #[test]
    fn test_per_epoch_windows() {
        let w = windows(&args(&["--per-epoch"]), &clock(), 75.0);
        assert_eq!(w.len(), 3);
        assert_eq!(w[2].epoch, Some(3));
        assert_eq!(w[2].start, 60.0);
        assert!(w[2].end < 90.0);
    }

    #[test]
    fn test_single_epoch_window() {
        let w = windows(&args(&["--epoch", "2"]), &clock(), 75.0);
        assert_eq!(w.len(), 1);
        assert_eq!(w[0].start, 30.0);
    }

    #[test]
    fn test_default_window_is_everything() {
        let w = windows(&args(&[]), &clock(), 75.0);
        assert_eq!(w.len(), 1);
        assert!(w[0].epoch.is_none());
        assert_eq!(w[0].start, f64::NEG_INFINITY);
    }

    #[test]
    fn test_derivative_signal_name() {
        let spec = SignalSpec::Derivative("channel0".into(), "channel1".into());
        assert_eq!(spec.name(), "channel0-channel1");
    }
}
