use anyhow::{Context, Result};
use clap::Parser;
use respiro::save_wav;
use respiro::simulation::{
    ApneaConfig, BreathConfig, NoiseConfig, apply_noise, generate_effort_channels,
};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "generate_breath")]
#[command(about = "Generate synthetic breathing WAV files for respiratory analysis testing")]
struct Args {
    /// TOML breath and noise configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "data/synthetic")]
    output_dir: PathBuf,

    /// Breathing rates in breaths per minute: comma-separated (e.g., "12,15,20") or range (e.g., "10-20:5")
    #[arg(short, long, default_value = "15")]
    rates: String,

    /// Number of trials per rate
    #[arg(short, long, default_value_t = 1)]
    trials: u32,

    /// Base seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Recording duration in seconds
    #[arg(short, long, default_value_t = 300.0)]
    duration: f64,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 25)]
    sample_rate: u32,

    /// Abdomen phase lag behind the thorax in degrees
    #[arg(long, default_value_t = 0.0)]
    phase_lag: f64,

    /// Output filename prefix
    #[arg(long, default_value = "breath")]
    prefix: String,

    /// Generate manifest.json
    #[arg(long)]
    manifest: bool,

    /// AWGN SNR in dB (CLI override)
    #[arg(long)]
    snr: Option<f32>,

    /// Apnea as START:DURATION in seconds, repeatable (CLI override)
    #[arg(long = "apnea", value_name = "START:DURATION")]
    apneas: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct TomlConfig {
    breath: Option<BreathConfig>,
    noise: Option<NoiseConfig>,
}

#[derive(Debug, serde::Serialize)]
struct ManifestEntry {
    file: String,
    rate_bpm: f64,
    trial: u32,
    seed: u64,
}

#[derive(Debug, serde::Serialize)]
struct Manifest {
    sample_rate: u32,
    duration: f64,
    phase_lag: f64,
    files: Vec<ManifestEntry>,
}

fn parse_rates(s: &str) -> Result<Vec<f64>> {
    if s.contains(':') {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 2 {
            anyhow::bail!("Invalid range format. Use 'start-end:step'");
        }
        let step: f64 = parts[1].parse().context("Invalid step value")?;
        if step <= 0.0 {
            anyhow::bail!("Range step must be positive");
        }
        let range_parts: Vec<&str> = parts[0].split('-').collect();
        if range_parts.len() != 2 {
            anyhow::bail!("Invalid range format. Use 'start-end:step'");
        }
        let start: f64 = range_parts[0].parse().context("Invalid start value")?;
        let end: f64 = range_parts[1].parse().context("Invalid end value")?;

        let mut rates = Vec::new();
        let mut r = start;
        while r <= end {
            rates.push(r);
            r += step;
        }
        Ok(rates)
    } else {
        s.split(',')
            .map(|p| p.trim().parse::<f64>().context("Invalid rate value"))
            .collect()
    }
}

fn parse_apnea(s: &str) -> Result<ApneaConfig> {
    let (start, duration) = s
        .split_once(':')
        .context("Invalid apnea format. Use 'start:duration'")?;
    Ok(ApneaConfig {
        start_secs: start.trim().parse().context("Invalid apnea start")?,
        duration_secs: duration.trim().parse().context("Invalid apnea duration")?,
    })
}

fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = fs::read_to_string(path).context("Failed to read config file")?;
    toml::from_str(&content).context("Failed to parse config file")
}

fn main() -> Result<()> {
    let args = Args::parse();

    fs::create_dir_all(&args.output_dir).context("Failed to create output directory")?;

    let toml_config = match args.config {
        Some(ref config_path) => load_toml_config(config_path)?,
        None => TomlConfig::default(),
    };

    let mut breath = toml_config.breath.unwrap_or_default();
    if !args.apneas.is_empty() {
        breath.apneas = args
            .apneas
            .iter()
            .map(|s| parse_apnea(s))
            .collect::<Result<_>>()?;
    }
    let base_noise = toml_config.noise.unwrap_or_default();

    let rates = parse_rates(&args.rates)?;
    let base_seed = args.seed.unwrap_or(0);
    let sample_rate = args.sample_rate as f64;

    let mut manifest_entries = Vec::new();
    let total_files = rates.len() * args.trials as usize;
    let mut file_count = 0;

    for &rate_bpm in &rates {
        breath.rate_hz = rate_bpm / 60.0;
        for trial in 0..args.trials {
            let seed = base_seed + trial as u64 * 1000 + rate_bpm as u64;
            let mut noise = base_noise.clone();
            if let Some(snr) = args.snr {
                noise = noise.with_awgn(snr);
            }

            let clean =
                generate_effort_channels(args.duration, sample_rate, &breath, args.phase_lag);
            let thorax: Vec<f32> = clean.iter().step_by(2).copied().collect();
            let abdomen: Vec<f32> = clean.iter().skip(1).step_by(2).copied().collect();
            let thorax = apply_noise(&thorax, &noise.clone().with_seed(seed), sample_rate);
            let abdomen = apply_noise(&abdomen, &noise.with_seed(seed + 1), sample_rate);
            let signal: Vec<f32> = thorax
                .iter()
                .zip(&abdomen)
                .flat_map(|(&t, &a)| [t, a])
                .collect();

            let filename = format!("{}_r{:02}_t{:02}.wav", args.prefix, rate_bpm as u32, trial);
            let filepath = args.output_dir.join(&filename);

            save_wav(&filepath, &signal, 2, args.sample_rate).context("Failed to write WAV file")?;

            manifest_entries.push(ManifestEntry {
                file: filename,
                rate_bpm,
                trial,
                seed,
            });

            file_count += 1;
            eprint!("\rGenerating: {}/{}", file_count, total_files);
        }
    }
    eprintln!();

    if args.manifest {
        let manifest = Manifest {
            sample_rate: args.sample_rate,
            duration: args.duration,
            phase_lag: args.phase_lag,
            files: manifest_entries,
        };
        let manifest_path = args.output_dir.join("manifest.json");
        let manifest_json =
            serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;
        fs::write(&manifest_path, manifest_json).context("Failed to write manifest")?;
        eprintln!("Manifest written to: {}", manifest_path.display());
    }

    eprintln!(
        "Generated {} files in {}",
        total_files,
        args.output_dir.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rates_comma_separated() {
        let rates = parse_rates("12,15,20").unwrap();
        assert_eq!(rates, vec![12.0, 15.0, 20.0]);
    }

    #[test]
    fn test_parse_rates_range() {
        let rates = parse_rates("10-20:5").unwrap();
        assert_eq!(rates, vec![10.0, 15.0, 20.0]);
    }

    #[test]
    fn test_parse_rates_rejects_zero_step() {
        assert!(parse_rates("10-20:0").is_err());
    }

    #[test]
    fn test_parse_apnea() {
        let apnea = parse_apnea("60:15").unwrap();
        assert_eq!(apnea.start_secs, 60.0);
        assert_eq!(apnea.duration_secs, 15.0);
        assert!(parse_apnea("60").is_err());
    }

    #[test]
    fn test_toml_sections() {
        let config: TomlConfig = toml::from_str(
            r#"
            [breath]
            amplitude = 2.0
            apneas = [{ start_secs = 30.0, duration_secs = 12.0 }]

            [noise.additive]
            snr_db = 15.0
            "#,
        )
        .unwrap();
        let breath = config.breath.unwrap();
        assert_eq!(breath.amplitude, 2.0);
        assert_eq!(breath.rate_hz, 0.25);
        assert_eq!(breath.apneas.len(), 1);
        assert_eq!(config.noise.unwrap().additive.unwrap().snr_db, 15.0);
    }
}
