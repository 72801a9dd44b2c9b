use crate::error::Result;
use crate::signal_processing::resample::align_sample_rates;
use crate::waveform::Waveform;

/// Synthesize `minuend - subtrahend` as a new waveform.
///
/// The two signals are first brought to the higher of their sample rates.
/// When the aligned lengths differ by the resampler's rounding, the result
/// is truncated to the shorter one. Timestamps start at the minuend's first
/// sample.
pub fn derivative(minuend: &Waveform, subtrahend: &Waveform) -> Result<Waveform> {
    let aligned = align_sample_rates(minuend, subtrahend)?;
    let values: Vec<f32> = aligned
        .first
        .iter()
        .zip(&aligned.second)
        .map(|(a, b)| a - b)
        .collect();

    log::debug!(
        "Derivative signal: {} samples at {:.6}s",
        values.len(),
        aligned.sample_period
    );

    Waveform::from_values(
        minuend.start_time().unwrap_or(0.0),
        aligned.sample_period,
        &values,
    )
}
