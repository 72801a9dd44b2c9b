use std::f64::consts::PI;

use crate::error::{AnalysisError, Result};
use crate::waveform::Waveform;

/// Single-pole RC low-pass filter
///
/// `alpha = dt / (RC + dt)` with `RC = 1 / (2π·cutoff)`. The first output
/// equals the first input; afterwards
/// `y[n] = alpha·x[n] + (1 - alpha)·y[n-1]`.
pub struct LowPassFilter {
    alpha: f64,
    state: Option<f64>,
}

impl LowPassFilter {
    /// Create a filter for the given cutoff and sample period (seconds).
    pub fn new(cutoff_hz: f64, sample_period: f64) -> Result<Self> {
        if !(cutoff_hz.is_finite() && cutoff_hz > 0.0) {
            return Err(AnalysisError::InvalidCutoff(cutoff_hz));
        }
        if !(sample_period.is_finite() && sample_period > 0.0) {
            return Err(AnalysisError::InvalidSamplePeriod(sample_period));
        }
        let rc = 1.0 / (2.0 * PI * cutoff_hz);
        Ok(Self {
            alpha: sample_period / (rc + sample_period),
            state: None,
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Filter one sample
    pub fn process(&mut self, sample: f32) -> f32 {
        let x = sample as f64;
        let y = match self.state {
            None => x,
            Some(prev) => self.alpha * x + (1.0 - self.alpha) * prev,
        };
        self.state = Some(y);
        y as f32
    }

    pub fn process_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample);
        }
    }
}

/// Apply a single-pole low-pass filter to a whole waveform.
pub fn low_pass(waveform: &Waveform, cutoff_hz: f64, sample_period: f64) -> Result<Waveform> {
    let mut filter = LowPassFilter::new(cutoff_hz, sample_period)?;
    Ok(waveform.map_values(|v| filter.process(v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_alpha() {
        // RC = 1/(2π), dt = 0.1
        let filter = LowPassFilter::new(1.0, 0.1).unwrap();
        let rc = 1.0 / (2.0 * PI);
        assert_relative_eq!(filter.alpha(), 0.1 / (rc + 0.1), epsilon = 1e-12);
    }

    #[test]
    fn test_first_sample_passes_through() {
        let w = Waveform::from_values(0.0, 0.01, &[3.5, 0.0, 0.0]).unwrap();
        let out = low_pass(&w, 2.0, 0.01).unwrap();
        assert_eq!(out.values()[0], 3.5);
        assert!(out.values()[1] < 3.5 && out.values()[1] > 0.0);
    }

    #[test]
    fn test_step_response_monotonic() {
        let mut values = vec![0.0f32; 10];
        values.extend(std::iter::repeat_n(1.0f32, 2000));
        let w = Waveform::from_values(0.0, 0.01, &values).unwrap();
        let out = low_pass(&w, 1.0, 0.01).unwrap().values();

        for pair in out.windows(2) {
            assert!(pair[1] >= pair[0], "step response must not decrease");
        }
        let last = *out.last().unwrap();
        assert!((last - 1.0).abs() < 1e-3, "should approach step height, got {}", last);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(
            LowPassFilter::new(0.0, 0.01),
            Err(AnalysisError::InvalidCutoff(_))
        ));
        assert!(matches!(
            LowPassFilter::new(1.0, 0.0),
            Err(AnalysisError::InvalidSamplePeriod(_))
        ));
    }
}
