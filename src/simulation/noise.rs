use rand::RngExt;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

use super::{BreathConfig, generate_breathing_signal};

#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct NoiseConfig {
    pub seed: Option<u64>,
    pub additive: Option<AdditiveNoiseConfig>,
    pub baseline_wander: Option<BaselineWanderConfig>,
    pub artifacts: Option<ArtifactConfig>,
}

impl NoiseConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_awgn(mut self, snr_db: f32) -> Self {
        self.additive = Some(AdditiveNoiseConfig { snr_db });
        self
    }

    pub fn with_baseline_wander(mut self, amplitude: f32, frequency_hz: f64) -> Self {
        self.baseline_wander = Some(BaselineWanderConfig {
            amplitude,
            frequency_hz,
        });
        self
    }

    pub fn with_artifacts(mut self, rate_hz: f64, amplitude: f32, duration_samples: usize) -> Self {
        self.artifacts = Some(ArtifactConfig {
            rate_hz,
            amplitude,
            duration_samples,
        });
        self
    }
}

#[derive(Clone, Debug, serde::Deserialize)]
pub struct AdditiveNoiseConfig {
    pub snr_db: f32,
}

/// Slow sinusoidal drift of the signal baseline
#[derive(Clone, Debug, serde::Deserialize)]
pub struct BaselineWanderConfig {
    pub amplitude: f32,
    pub frequency_hz: f64,
}

/// Short movement artifacts at random positions
#[derive(Clone, Debug, serde::Deserialize)]
pub struct ArtifactConfig {
    pub rate_hz: f64,
    pub amplitude: f32,
    pub duration_samples: usize,
}

fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => rand::make_rng(),
    }
}

pub fn signal_power(signal: &[f32]) -> f32 {
    if signal.is_empty() {
        return 0.0;
    }
    signal.iter().map(|&x| x * x).sum::<f32>() / signal.len() as f32
}

fn apply_additive_noise(signal: &mut [f32], config: &AdditiveNoiseConfig, rng: &mut ChaCha8Rng) {
    let sig_power = signal_power(signal);
    if sig_power == 0.0 {
        return;
    }

    let snr_linear = 10.0_f32.powf(config.snr_db / 10.0);
    let noise_std = (sig_power / snr_linear).sqrt();

    let Ok(normal) = Normal::new(0.0, noise_std as f64) else {
        log::warn!("Skipping additive noise: invalid std dev {}", noise_std);
        return;
    };

    for sample in signal.iter_mut() {
        *sample += normal.sample(rng) as f32;
    }
}

fn apply_baseline_wander(
    signal: &mut [f32],
    config: &BaselineWanderConfig,
    sample_rate: f64,
    rng: &mut ChaCha8Rng,
) {
    let phi = rng.random::<f64>() * 2.0 * PI;
    for (i, sample) in signal.iter_mut().enumerate() {
        let t = i as f64 / sample_rate;
        *sample += config.amplitude * (2.0 * PI * config.frequency_hz * t + phi).sin() as f32;
    }
}

fn apply_artifacts(
    signal: &mut [f32],
    config: &ArtifactConfig,
    sample_rate: f64,
    rng: &mut ChaCha8Rng,
) {
    let n = signal.len();
    if n == 0 || config.rate_hz <= 0.0 {
        return;
    }

    let avg_samples_between = sample_rate / config.rate_hz;

    let mut pos = 0usize;
    loop {
        let interval = (rng.random::<f64>() * 2.0 * avg_samples_between) as usize;
        pos += interval.max(1);

        if pos >= n {
            break;
        }

        let sign = if rng.random::<bool>() { 1.0 } else { -1.0 };
        let end = (pos + config.duration_samples).min(n);

        for sample in signal[pos..end].iter_mut() {
            *sample += sign * config.amplitude;
        }
    }
}

pub fn apply_noise(clean_signal: &[f32], config: &NoiseConfig, sample_rate: f64) -> Vec<f32> {
    let mut signal = clean_signal.to_vec();
    let mut rng = create_rng(config.seed);

    if let Some(ref wander_config) = config.baseline_wander {
        apply_baseline_wander(&mut signal, wander_config, sample_rate, &mut rng);
    }

    if let Some(ref artifact_config) = config.artifacts {
        apply_artifacts(&mut signal, artifact_config, sample_rate, &mut rng);
    }

    if let Some(ref additive_config) = config.additive {
        apply_additive_noise(&mut signal, additive_config, &mut rng);
    }

    signal
}

pub fn generate_noisy_breathing_signal(
    duration_secs: f64,
    sample_rate: f64,
    breath: &BreathConfig,
    noise: &NoiseConfig,
) -> Vec<f32> {
    let clean = generate_breathing_signal(duration_secs, sample_rate, breath);
    apply_noise(&clean, noise, sample_rate)
}
