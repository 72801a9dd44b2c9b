use num_complex::Complex64;
use realfft::RealFftPlanner;
use serde::Serialize;
use std::f64::consts::PI;

use crate::constants::{MIN_COHERENCE_NFFT, MIN_POWER_THRESHOLD};
use crate::error::{AnalysisError, Result};
use crate::signal_processing::resample::align_sample_rates;
use crate::waveform::Waveform;

/// Magnitude-squared coherence spectrum
#[derive(Debug, Clone, Default, Serialize)]
pub struct Coherence {
    /// Bin frequencies in Hz, ascending
    pub frequencies: Vec<f64>,
    /// Coherence in [0, 1] for each bin; NaN where either signal has no
    /// power and coherence is undefined
    pub magnitude_squared: Vec<f64>,
}

impl Coherence {
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// Mean coherence over bins with `low_hz <= f < high_hz`, ignoring
    /// undefined bins.
    ///
    /// Returns `None` when no defined bin falls inside the band.
    pub fn band_mean(&self, low_hz: f64, high_hz: f64) -> Option<f64> {
        let (sum, count) = self
            .frequencies
            .iter()
            .zip(&self.magnitude_squared)
            .filter(|(f, c)| **f >= low_hz && **f < high_hz && !c.is_nan())
            .fold((0.0, 0usize), |(s, n), (_, c)| (s + c, n + 1));
        (count > 0).then(|| sum / count as f64)
    }
}

/// Segment length used for the Welch estimate of two signals.
pub fn segment_length(len_a: usize, len_b: usize) -> usize {
    (len_a.max(len_b) as f64).sqrt().round() as usize
}

fn hamming(len: usize) -> Vec<f64> {
    if len == 1 {
        return vec![1.0];
    }
    let m = (len - 1) as f64;
    (0..len)
        .map(|n| 0.54 - 0.46 * (2.0 * PI * n as f64 / m).cos())
        .collect()
}

/// Magnitude-squared coherence of two signals sharing one sample period.
///
/// Welch's method: Hamming-windowed segments of
/// `round(sqrt(max(len_a, len_b)))` samples with 50% overlap, each
/// zero-padded to `max(256, next_pow2(segment))` points. Inputs of unequal
/// length are truncated to the shorter one.
pub fn coherence(signal_a: &[f32], signal_b: &[f32], sample_period: f64) -> Result<Coherence> {
    if !(sample_period.is_finite() && sample_period > 0.0) {
        return Err(AnalysisError::InvalidSamplePeriod(sample_period));
    }

    let len = signal_a.len().min(signal_b.len());
    let segment = segment_length(signal_a.len(), signal_b.len()).min(len);
    if segment < 2 {
        // round(sqrt(n)) first reaches 2 at n = 3
        let (needed, available) = if len < 2 {
            (2, len)
        } else {
            (3, signal_a.len().max(signal_b.len()))
        };
        return Err(AnalysisError::InsufficientData { needed, available });
    }

    let overlap = segment / 2;
    let step = segment - overlap;
    let num_segments = (len - overlap) / step;
    let nfft = segment.next_power_of_two().max(MIN_COHERENCE_NFFT);
    let bins = nfft / 2 + 1;
    let window = hamming(segment);

    let mut planner = RealFftPlanner::<f64>::new();
    let r2c = planner.plan_fft_forward(nfft);
    let mut frame_a = r2c.make_input_vec();
    let mut frame_b = r2c.make_input_vec();
    let mut spec_a = r2c.make_output_vec();
    let mut spec_b = r2c.make_output_vec();

    let mut pxx = vec![0.0f64; bins];
    let mut pyy = vec![0.0f64; bins];
    let mut pxy = vec![Complex64::new(0.0, 0.0); bins];

    for s in 0..num_segments {
        let start = s * step;
        frame_a.iter_mut().for_each(|v| *v = 0.0);
        frame_b.iter_mut().for_each(|v| *v = 0.0);
        for i in 0..segment {
            frame_a[i] = signal_a[start + i] as f64 * window[i];
            frame_b[i] = signal_b[start + i] as f64 * window[i];
        }

        r2c.process(&mut frame_a, &mut spec_a)
            .map_err(|e| AnalysisError::Fft(e.to_string()))?;
        r2c.process(&mut frame_b, &mut spec_b)
            .map_err(|e| AnalysisError::Fft(e.to_string()))?;

        for k in 0..bins {
            let a = Complex64::new(spec_a[k].re, spec_a[k].im);
            let b = Complex64::new(spec_b[k].re, spec_b[k].im);
            pxx[k] += a.norm_sqr();
            pyy[k] += b.norm_sqr();
            pxy[k] += a * b.conj();
        }
    }

    log::debug!(
        "Coherence: {} segments of {} samples, nfft {}",
        num_segments,
        segment,
        nfft
    );

    let fs = 1.0 / sample_period;
    let frequencies = (0..bins).map(|k| k as f64 * fs / nfft as f64).collect();
    let magnitude_squared = (0..bins)
        .map(|k| {
            let denom = pxx[k] * pyy[k];
            if denom <= MIN_POWER_THRESHOLD {
                f64::NAN
            } else {
                (pxy[k].norm_sqr() / denom).min(1.0)
            }
        })
        .collect();

    Ok(Coherence {
        frequencies,
        magnitude_squared,
    })
}

/// Coherence of two waveforms, resampling the slower one first.
///
/// The common sample period is that of the higher-rate waveform.
pub fn coherence_of(a: &Waveform, b: &Waveform) -> Result<Coherence> {
    let aligned = align_sample_rates(a, b)?;
    coherence(&aligned.first, &aligned.second, aligned.sample_period)
}
