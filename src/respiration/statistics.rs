//! Breathing statistics derived from a segmented waveform
//!
//! Every statistic reduces a list of numbers to a [`StatPair`]: the mean
//! and a coefficient of variation defined as the mean absolute deviation
//! divided by `|mean|`.

use serde::Serialize;

use crate::error::{AnalysisError, Result};
use crate::waveform::{Sample, SegmentationResult, Waveform};

/// Mean and coefficient of variation of a set of values.
///
/// An empty set yields `(0, 0)`. A zero mean over a non-empty set yields a
/// NaN or infinite CV.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct StatPair {
    pub mean: f64,
    pub coefficient_of_variation: f64,
}

impl StatPair {
    pub const ZERO: StatPair = StatPair {
        mean: 0.0,
        coefficient_of_variation: 0.0,
    };

    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::ZERO;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let mad = values.iter().map(|v| (v - mean).abs()).sum::<f64>() / n;
        Self {
            mean,
            coefficient_of_variation: mad / mean.abs(),
        }
    }
}

/// Pool consecutive timestamp differences from every supplied sequence.
///
/// Breaths alternate across onset, inset and peak events, so the caller
/// usually passes all four point sets of a segmentation.
pub fn breathing_period(sets: &[&[Sample]]) -> StatPair {
    let deltas: Vec<f64> = sets
        .iter()
        .flat_map(|set| set.windows(2).map(|w| w[1].time - w[0].time))
        .collect();
    StatPair::from_values(&deltas)
}

/// Pair each sample of `from` with the next sample of `to` in time.
///
/// If `from` starts strictly earlier than `to`, pairs are `(from[i],
/// to[i])`; otherwise `to[0]` precedes the first `from` and pairs are
/// `(from[i], to[i + 1])`. Pairing stops when either sequence runs out.
pub fn aligned_pairs<'a>(
    from: &'a [Sample],
    to: &'a [Sample],
) -> impl Iterator<Item = (&'a Sample, &'a Sample)> + 'a {
    let offset = match (from.first(), to.first()) {
        (Some(a), Some(b)) if a.time < b.time => 0,
        _ => 1,
    };
    from.iter().zip(to.iter().skip(offset))
}

/// Durations from each `from` event to the aligned `to` event.
///
/// `half_period(onsets, insets)` is the inspiration time and
/// `half_period(insets, onsets)` the expiration time.
pub fn half_period(from: &[Sample], to: &[Sample]) -> StatPair {
    let deltas: Vec<f64> = aligned_pairs(from, to)
        .map(|(a, b)| b.time - a.time)
        .collect();
    StatPair::from_values(&deltas)
}

/// Statistics of the raw peak values.
pub fn peak_height(peaks: &[Sample]) -> StatPair {
    let values: Vec<f64> = peaks.iter().map(|p| p.value as f64).collect();
    StatPair::from_values(&values)
}

/// Rectangular-rule integral of the waveform between two events.
///
/// Both events must coincide exactly with a waveform sample and `to` must
/// not precede `from`; the integral covers the inclusive index range
/// between them.
pub fn breath_volume(
    waveform: &Waveform,
    from: &Sample,
    to: &Sample,
    sample_period: f64,
) -> Result<f64> {
    let start = waveform
        .index_of_time(from.time)
        .ok_or(AnalysisError::MissingSample { time: from.time })?;
    let end = waveform
        .index_of_time(to.time)
        .ok_or(AnalysisError::MissingSample { time: to.time })?;

    if end < start {
        return Err(AnalysisError::InvertedRange {
            from: from.time,
            to: to.time,
        });
    }
    let sum: f64 = waveform.samples()[start..=end]
        .iter()
        .map(|s| s.value as f64)
        .sum();
    Ok(sum * sample_period)
}

/// Per-breath volumes plus the breaths that could not be integrated.
#[derive(Debug, Default)]
pub struct BreathVolumes {
    pub volumes: Vec<f64>,
    pub skipped: Vec<AnalysisError>,
}

impl BreathVolumes {
    pub fn stats(&self) -> StatPair {
        StatPair::from_values(&self.volumes)
    }
}

/// Integrate every aligned `(from, to)` breath.
///
/// Breaths whose boundaries do not match a waveform sample exactly, or
/// whose end precedes their start, are skipped and reported rather than
/// integrated over a wrong range.
pub fn breath_volumes(
    waveform: &Waveform,
    from: &[Sample],
    to: &[Sample],
    sample_period: f64,
) -> BreathVolumes {
    let mut out = BreathVolumes::default();
    for (a, b) in aligned_pairs(from, to) {
        match breath_volume(waveform, a, b, sample_period) {
            Ok(v) => out.volumes.push(v),
            Err(e) => {
                log::warn!(
                    "Skipping breath {:.3}s-{:.3}s volume: {}",
                    a.time,
                    b.time,
                    e
                );
                out.skipped.push(e);
            }
        }
    }
    out
}

/// Flow volume statistics over every aligned breath.
pub fn flow_volume(
    waveform: &Waveform,
    from: &[Sample],
    to: &[Sample],
    sample_period: f64,
) -> StatPair {
    breath_volumes(waveform, from, to, sample_period).stats()
}

/// All breathing statistics for one segmented waveform.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RespiratorySummary {
    /// Number of positive peaks (one per breath)
    pub breath_count: usize,
    pub breathing_period: StatPair,
    /// Onset to inset
    pub inspiration_period: StatPair,
    /// Inset to onset
    pub expiration_period: StatPair,
    pub positive_peak_height: StatPair,
    pub negative_peak_height: StatPair,
    pub inspiration_volume: StatPair,
    pub expiration_volume: StatPair,
    /// Breaths whose volume could not be integrated
    pub skipped_volumes: usize,
}

impl RespiratorySummary {
    /// Compute every statistic from a segmentation of `waveform`.
    pub fn from_segmentation(waveform: &Waveform, segmentation: &SegmentationResult) -> Self {
        let onsets = segmentation.onsets();
        let insets = segmentation.insets();
        let dt = waveform.sample_period();

        let inspiration = breath_volumes(waveform, onsets, insets, dt);
        let expiration = breath_volumes(waveform, insets, onsets, dt);

        Self {
            breath_count: segmentation.positive_peaks().len(),
            breathing_period: breathing_period(&[
                insets,
                onsets,
                segmentation.negative_peaks(),
                segmentation.positive_peaks(),
            ]),
            inspiration_period: half_period(onsets, insets),
            expiration_period: half_period(insets, onsets),
            positive_peak_height: peak_height(segmentation.positive_peaks()),
            negative_peak_height: peak_height(segmentation.negative_peaks()),
            inspiration_volume: inspiration.stats(),
            expiration_volume: expiration.stats(),
            skipped_volumes: inspiration.skipped.len() + expiration.skipped.len(),
        }
    }
}
