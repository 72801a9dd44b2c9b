mod test_signals;

use respiro::Waveform;
use respiro::signal_processing::{coherence, coherence_of};
use respiro::simulation::{BreathConfig, NoiseConfig, apply_noise, generate_breathing_signal};

#[test]
fn test_identical_breathing_fully_coherent() {
    let w = test_signals::breathing_waveform(300.0, 20.0, 0.25);
    let coh = coherence_of(&w, &w).unwrap();
    for (f, c) in coh.frequencies.iter().zip(&coh.magnitude_squared) {
        if *f >= 0.1 && *f <= 1.0 {
            assert!(*c > 0.999, "coherence at {:.3} Hz was {}", f, c);
        }
    }
}

#[test]
fn test_independent_noise_is_incoherent() {
    let breath = BreathConfig::default();
    let clean = generate_breathing_signal(300.0, 20.0, &breath);
    let a = apply_noise(&clean, &NoiseConfig::default().with_seed(11).with_awgn(10.0), 20.0);
    let b = apply_noise(&clean, &NoiseConfig::default().with_seed(12).with_awgn(10.0), 20.0);

    let coh = coherence(&a, &b, 0.05).unwrap();
    let breathing_band = coh.band_mean(0.2, 0.3).unwrap();
    let noise_band = coh.band_mean(3.0, 8.0).unwrap();
    assert!(breathing_band > 0.8, "breathing band coherence {}", breathing_band);
    assert!(noise_band < 0.1, "noise band coherence {}", noise_band);
}

#[test]
fn test_mixed_sample_rates() {
    // Thorax at 10 Hz, abdomen at 25 Hz, same breathing
    let slow = test_signals::breathing_waveform(120.0, 10.0, 0.25);
    let fast = test_signals::breathing_waveform(120.0, 25.0, 0.25);

    let coh = coherence_of(&slow, &fast).unwrap();
    assert!((coh.frequencies.last().unwrap() - 12.5).abs() < 1e-9);
    let band = coh.band_mean(0.1, 0.5).unwrap();
    assert!(band > 0.9, "band coherence {}", band);
}

#[test]
fn test_unequal_lengths_truncate() {
    let long = test_signals::sine_waveform(100.0, 10.0, 0.25, 1.0);
    let short = long.window(0.0, 49.95);
    let coh = coherence(&long.values(), &short.values(), 0.1).unwrap();
    assert!(!coh.is_empty());
    assert!(coh.magnitude_squared.iter().all(|c| (0.0..=1.0).contains(c)));
}

#[test]
fn test_too_short_fails() {
    let w = Waveform::from_values(0.0, 0.1, &[1.0]).unwrap();
    assert!(coherence_of(&w, &w).is_err());
}
