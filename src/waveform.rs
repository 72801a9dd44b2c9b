//! Typed sample containers shared by every stage of the analysis pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// A single measured value at a point in time.
///
/// `time` is seconds relative to the recording start. `value` keeps the
/// float32 precision of the source recording.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: f64,
    pub value: f32,
}

impl Sample {
    pub fn new(time: f64, value: f32) -> Self {
        Self { time, value }
    }
}

/// Time-ordered samples at a nominal uniform sample period.
///
/// Waveforms are immutable: bias removal, filtering and resampling all
/// produce a new `Waveform`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Waveform {
    samples: Vec<Sample>,
    sample_period: f64,
}

impl Waveform {
    /// Build a waveform from explicit samples.
    ///
    /// Samples must already be ordered by time; this is checked in debug
    /// builds only.
    pub fn new(samples: Vec<Sample>, sample_period: f64) -> Result<Self> {
        if !(sample_period.is_finite() && sample_period > 0.0) {
            return Err(AnalysisError::InvalidSamplePeriod(sample_period));
        }
        debug_assert!(
            samples.windows(2).all(|w| w[0].time < w[1].time),
            "waveform timestamps must be strictly increasing"
        );
        Ok(Self {
            samples,
            sample_period,
        })
    }

    /// Build a uniformly sampled waveform starting at `start_time`.
    pub fn from_values(start_time: f64, sample_period: f64, values: &[f32]) -> Result<Self> {
        let samples = values
            .iter()
            .enumerate()
            .map(|(i, &value)| Sample::new(start_time + i as f64 * sample_period, value))
            .collect();
        Self::new(samples, sample_period)
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn sample_period(&self) -> f64 {
        self.sample_period
    }

    pub fn sample_rate(&self) -> f64 {
        1.0 / self.sample_period
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn start_time(&self) -> Option<f64> {
        self.samples.first().map(|s| s.time)
    }

    pub fn end_time(&self) -> Option<f64> {
        self.samples.last().map(|s| s.time)
    }

    /// Copy of the sample values, without timestamps.
    pub fn values(&self) -> Vec<f32> {
        self.samples.iter().map(|s| s.value).collect()
    }

    /// New waveform with the same timestamps and transformed values.
    pub fn map_values<F>(&self, mut f: F) -> Waveform
    where
        F: FnMut(f32) -> f32,
    {
        Waveform {
            samples: self
                .samples
                .iter()
                .map(|s| Sample::new(s.time, f(s.value)))
                .collect(),
            sample_period: self.sample_period,
        }
    }

    /// New waveform with the same timestamps and replacement values.
    pub(crate) fn with_values(&self, values: Vec<f32>) -> Waveform {
        assert_eq!(values.len(), self.samples.len());
        Waveform {
            samples: self
                .samples
                .iter()
                .zip(values)
                .map(|(s, v)| Sample::new(s.time, v))
                .collect(),
            sample_period: self.sample_period,
        }
    }

    /// Index of the sample whose timestamp equals `time` exactly.
    pub fn index_of_time(&self, time: f64) -> Option<usize> {
        let idx = self.samples.partition_point(|s| s.time < time);
        match self.samples.get(idx) {
            Some(s) if s.time == time => Some(idx),
            _ => None,
        }
    }

    /// Samples with `start <= time <= end`.
    pub fn window(&self, start: f64, end: f64) -> Waveform {
        let lo = self.samples.partition_point(|s| s.time < start);
        let hi = self.samples.partition_point(|s| s.time <= end);
        Waveform {
            samples: self.samples[lo..hi.max(lo)].to_vec(),
            sample_period: self.sample_period,
        }
    }

    /// Smallest and largest values, or `None` when empty.
    pub fn extremes(&self) -> Option<(f32, f32)> {
        let first = self.samples.first()?.value;
        Some(
            self.samples
                .iter()
                .fold((first, first), |(lo, hi), s| (lo.min(s.value), hi.max(s.value))),
        )
    }
}

/// Spike polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn opposite(self) -> Self {
        match self {
            Polarity::Positive => Polarity::Negative,
            Polarity::Negative => Polarity::Positive,
        }
    }
}

/// Extrema of one polarity together with the sample that started each
/// spike.
///
/// For positive spikes the starts are onsets; for negative spikes they are
/// insets. Both sequences always have the same length.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PeakSet {
    peaks: Vec<Sample>,
    starts: Vec<Sample>,
}

impl PeakSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, peak: Sample, start: Sample) {
        self.peaks.push(peak);
        self.starts.push(start);
    }

    /// Overwrite the most recent peak/start pair. No-op on an empty set.
    pub fn replace_last(&mut self, peak: Sample, start: Sample) {
        if let (Some(p), Some(s)) = (self.peaks.last_mut(), self.starts.last_mut()) {
            *p = peak;
            *s = start;
        }
    }

    pub fn last_peak(&self) -> Option<&Sample> {
        self.peaks.last()
    }

    pub fn peaks(&self) -> &[Sample] {
        &self.peaks
    }

    pub fn starts(&self) -> &[Sample] {
        &self.starts
    }

    pub fn len(&self) -> usize {
        self.peaks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty()
    }
}

/// Segmentation of one waveform into positive and negative half-cycles.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SegmentationResult {
    pub positive: PeakSet,
    pub negative: PeakSet,
}

impl SegmentationResult {
    pub fn positive_peaks(&self) -> &[Sample] {
        self.positive.peaks()
    }

    pub fn negative_peaks(&self) -> &[Sample] {
        self.negative.peaks()
    }

    /// Starts of positive spikes
    pub fn onsets(&self) -> &[Sample] {
        self.positive.starts()
    }

    /// Starts of negative spikes
    pub fn insets(&self) -> &[Sample] {
        self.negative.starts()
    }

    pub fn peak_set(&self, polarity: Polarity) -> &PeakSet {
        match polarity {
            Polarity::Positive => &self.positive,
            Polarity::Negative => &self.negative,
        }
    }

    pub(crate) fn peak_set_mut(&mut self, polarity: Polarity) -> &mut PeakSet {
        match polarity {
            Polarity::Positive => &mut self.positive,
            Polarity::Negative => &mut self.negative,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_values_timestamps() {
        let w = Waveform::from_values(2.0, 0.5, &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(w.len(), 3);
        assert_eq!(w.samples()[2].time, 3.0);
        assert_eq!(w.start_time(), Some(2.0));
        assert_eq!(w.end_time(), Some(3.0));
    }

    #[test]
    fn test_invalid_sample_period() {
        assert!(Waveform::from_values(0.0, 0.0, &[1.0]).is_err());
        assert!(Waveform::from_values(0.0, -0.1, &[1.0]).is_err());
        assert!(Waveform::from_values(0.0, f64::NAN, &[1.0]).is_err());
    }

    #[test]
    fn test_index_of_time_exact_only() {
        let w = Waveform::from_values(0.0, 0.25, &[0.0; 8]).unwrap();
        assert_eq!(w.index_of_time(0.75), Some(3));
        assert_eq!(w.index_of_time(0.7), None);
        assert_eq!(w.index_of_time(5.0), None);
    }

    #[test]
    fn test_window_inclusive() {
        let w = Waveform::from_values(0.0, 1.0, &[0.0, 1.0, 2.0, 3.0, 4.0]).unwrap();
        let win = w.window(1.0, 3.0);
        assert_eq!(win.values(), vec![1.0, 2.0, 3.0]);
        assert!(w.window(10.0, 12.0).is_empty());
    }

    #[test]
    fn test_extremes() {
        let w = Waveform::from_values(0.0, 1.0, &[0.5, -2.0, 3.0]).unwrap();
        assert_eq!(w.extremes(), Some((-2.0, 3.0)));
        let empty = Waveform::from_values(0.0, 1.0, &[]).unwrap();
        assert_eq!(empty.extremes(), None);
    }

    #[test]
    fn test_peak_set_replace_last() {
        let mut set = PeakSet::new();
        set.push(Sample::new(1.0, 1.0), Sample::new(0.0, 0.0));
        set.replace_last(Sample::new(3.0, 2.0), Sample::new(2.0, 0.1));
        assert_eq!(set.len(), 1);
        assert_eq!(set.peaks()[0].time, 3.0);
        assert_eq!(set.starts()[0].time, 2.0);
    }
}
