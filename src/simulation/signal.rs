use serde::Deserialize;
use std::f64::consts::PI;

/// Shape of a synthetic breathing trace
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BreathConfig {
    /// Breaths per second
    pub rate_hz: f64,
    /// Peak flow amplitude
    pub amplitude: f32,
    /// Constant offset added to every sample
    pub bias: f32,
    /// Fraction of each cycle spent inspiring, in (0, 1)
    pub inspiration_fraction: f64,
    /// Intervals with no breathing effort
    pub apneas: Vec<ApneaConfig>,
}

impl Default for BreathConfig {
    fn default() -> Self {
        Self {
            rate_hz: 0.25,
            amplitude: 1.0,
            bias: 0.0,
            inspiration_fraction: 0.5,
            apneas: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ApneaConfig {
    pub start_secs: f64,
    pub duration_secs: f64,
}

impl ApneaConfig {
    fn contains(&self, t: f64) -> bool {
        t >= self.start_secs && t < self.start_secs + self.duration_secs
    }
}

/// Flow value at a given phase of the breathing cycle.
///
/// Inspiration is the positive half-wave, stretched to occupy
/// `inspiration_fraction` of the cycle.
fn breath_shape(phase: f64, inspiration_fraction: f64) -> f64 {
    let phase = phase.rem_euclid(1.0);
    let fraction = inspiration_fraction.clamp(0.05, 0.95);
    if phase < fraction {
        (PI * phase / fraction).sin()
    } else {
        -(PI * (phase - fraction) / (1.0 - fraction)).sin()
    }
}

/// Generate a breathing trace at a fixed rate
pub fn generate_breathing_signal(
    duration_secs: f64,
    sample_rate: f64,
    config: &BreathConfig,
) -> Vec<f32> {
    generate_breathing_signal_with_rate_fn(duration_secs, sample_rate, config, |_| config.rate_hz)
}

/// Generate a breathing trace with time-varying rate
/// The rate_fn takes time in seconds and returns the breathing rate in Hz
pub fn generate_breathing_signal_with_rate_fn<F>(
    duration_secs: f64,
    sample_rate: f64,
    config: &BreathConfig,
    rate_fn: F,
) -> Vec<f32>
where
    F: Fn(f64) -> f64,
{
    let num_samples = (duration_secs * sample_rate).round() as usize;
    let dt = 1.0 / sample_rate;
    let mut samples = Vec::with_capacity(num_samples);
    let mut phase = 0.0;

    for i in 0..num_samples {
        let t = i as f64 * dt;
        let effort = if config.apneas.iter().any(|a| a.contains(t)) {
            0.0
        } else {
            breath_shape(phase, config.inspiration_fraction)
        };
        samples.push(config.bias + config.amplitude * effort as f32);
        phase += rate_fn(t) * dt;
    }

    samples
}

/// Generate thorax and abdomen effort as interleaved stereo samples
/// [thorax, abdomen, thorax, abdomen, ...]
///
/// The abdomen lags the thorax by `phase_lag_degrees`.
pub fn generate_effort_channels(
    duration_secs: f64,
    sample_rate: f64,
    config: &BreathConfig,
    phase_lag_degrees: f64,
) -> Vec<f32> {
    let thorax = generate_breathing_signal(duration_secs, sample_rate, config);
    let lag_secs = phase_lag_degrees / 360.0 / config.rate_hz;
    let lag_samples = (lag_secs * sample_rate).round().max(0.0) as usize;

    let mut samples = Vec::with_capacity(thorax.len() * 2);
    for (i, &t) in thorax.iter().enumerate() {
        let a = if i >= lag_samples {
            thorax[i - lag_samples]
        } else {
            config.bias
        };
        samples.push(t);
        samples.push(a);
    }
    samples
}
