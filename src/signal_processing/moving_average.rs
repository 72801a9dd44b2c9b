use crate::error::{AnalysisError, Result};
use crate::waveform::Waveform;

/// Centred moving average over a fixed-length buffer
///
/// Output `n` is the mean of the `2·half_length` samples at indices
/// `n - half_length ..= n + half_length - 1`. Indices outside the buffer
/// are clamped to the first or last sample, so the edges repeat boundary
/// values rather than padding with zeros.
///
/// The window sum is updated incrementally, so the whole pass is O(n)
/// regardless of the window size.
pub fn centered_moving_average(values: &[f32], half_length: usize) -> Result<Vec<f32>> {
    if half_length < 1 {
        return Err(AnalysisError::InvalidFilterLength(half_length));
    }
    if values.is_empty() {
        return Ok(Vec::new());
    }

    let last = values.len() as isize - 1;
    let h = half_length as isize;
    let at = |k: isize| values[k.clamp(0, last) as usize] as f64;
    let window = (2 * half_length) as f64;

    let mut sum: f64 = (-h..h).map(at).sum();
    let mut output = Vec::with_capacity(values.len());
    output.push((sum / window) as f32);

    for n in 1..values.len() as isize {
        sum += at(n + h - 1) - at(n - h - 1);
        output.push((sum / window) as f32);
    }

    Ok(output)
}

/// Apply a centred moving average to a waveform.
pub fn moving_average(waveform: &Waveform, half_length: usize) -> Result<Waveform> {
    let smoothed = centered_moving_average(&waveform.values(), half_length)?;
    Ok(waveform.with_values(smoothed))
}
