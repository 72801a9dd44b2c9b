use respiro::Waveform;
use std::f64::consts::PI;

/// Pure sinusoid starting at t = 0
#[allow(dead_code)]
pub fn sine_waveform(duration_secs: f64, sample_rate: f64, freq_hz: f64, amplitude: f32) -> Waveform {
    let n = (duration_secs * sample_rate).round() as usize;
    let values: Vec<f32> = (0..n)
        .map(|i| amplitude * (2.0 * PI * freq_hz * i as f64 / sample_rate).sin() as f32)
        .collect();
    Waveform::from_values(0.0, 1.0 / sample_rate, &values).unwrap()
}

/// Breathing trace from the simulation generator with default shape
#[allow(dead_code)]
pub fn breathing_waveform(duration_secs: f64, sample_rate: f64, rate_hz: f64) -> Waveform {
    let config = respiro::simulation::BreathConfig {
        rate_hz,
        ..Default::default()
    };
    breathing_waveform_with(duration_secs, sample_rate, &config, None)
}

/// Breathing trace with optional noise
#[allow(dead_code)]
pub fn breathing_waveform_with(
    duration_secs: f64,
    sample_rate: f64,
    breath: &respiro::simulation::BreathConfig,
    noise: Option<&respiro::simulation::NoiseConfig>,
) -> Waveform {
    let values = match noise {
        Some(noise) => respiro::simulation::generate_noisy_breathing_signal(
            duration_secs,
            sample_rate,
            breath,
            noise,
        ),
        None => respiro::simulation::generate_breathing_signal(duration_secs, sample_rate, breath),
    };
    Waveform::from_values(0.0, 1.0 / sample_rate, &values).unwrap()
}
