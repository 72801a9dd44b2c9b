use crate::waveform::Waveform;

/// Subtract a constant bias from every sample value.
///
/// Timestamps are left untouched. The subtraction happens in f32 so the
/// result matches values centred by the source application.
pub fn remove_bias(waveform: &Waveform, bias: f32) -> Waveform {
    waveform.map_values(|v| v - bias)
}

/// Arithmetic mean of the waveform values, the usual bias to remove.
///
/// Returns 0.0 for an empty waveform.
pub fn mean_bias(waveform: &Waveform) -> f32 {
    if waveform.is_empty() {
        return 0.0;
    }
    let sum: f64 = waveform.samples().iter().map(|s| s.value as f64).sum();
    (sum / waveform.len() as f64) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_bias_shifts_values() {
        let w = Waveform::from_values(0.0, 0.1, &[1.0, 2.0, 3.0]).unwrap();
        let centred = remove_bias(&w, 2.0);
        assert_eq!(centred.values(), vec![-1.0, 0.0, 1.0]);
        assert_eq!(centred.samples()[1].time, w.samples()[1].time);
    }

    #[test]
    fn test_remove_bias_idempotent_with_zero() {
        let w = Waveform::from_values(0.0, 0.1, &[0.3, -1.7, 2.25, 9.5]).unwrap();
        let once = remove_bias(&w, 0.75);
        let twice = remove_bias(&once, 0.0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_mean_bias_centres_signal() {
        let values: Vec<f32> = (0..100).map(|i| 5.0 + (i as f32 * 0.3).sin()).collect();
        let w = Waveform::from_values(0.0, 0.01, &values).unwrap();
        let bias = mean_bias(&w);
        let centred = remove_bias(&w, bias);
        assert!(mean_bias(&centred).abs() < 1e-5);
    }

    #[test]
    fn test_mean_bias_empty() {
        let w = Waveform::from_values(0.0, 0.1, &[]).unwrap();
        assert_eq!(mean_bias(&w), 0.0);
    }
}
