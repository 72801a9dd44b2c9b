use crate::config::AnalysisParameters;
use crate::waveform::{Polarity, Sample, SegmentationResult, Waveform};

/// Peak / onset / inset detector for bias-removed breathing waveforms
///
/// Splits the waveform into alternating positive and negative spikes with a
/// single left-to-right scan. A spike extends while samples keep its sign
/// (zero counts as either sign), and its extremum is the sample with the
/// largest magnitude. When the sign flips, the finished spike is recorded
/// if it is longer than `min_spike_length` samples.
///
/// With `merge_same_sign` enabled, two spikes of the same polarity with no
/// recorded opposite-polarity peak between them collapse into one: only the
/// more extreme of the two is kept.
#[derive(Debug, Clone, Copy)]
pub struct PeakOnsetDetector {
    merge_same_sign: bool,
    min_spike_length: usize,
}

/// Spike currently being scanned
struct Spike {
    polarity: Polarity,
    maxima: usize,
    start: usize,
    length: usize,
}

impl PeakOnsetDetector {
    /// Create a new detector
    ///
    /// # Arguments
    /// * `merge_same_sign` - Keep only the most extreme of consecutive same-sign spikes
    /// * `min_spike_length` - Spikes must be strictly longer than this many samples
    pub fn new(merge_same_sign: bool, min_spike_length: usize) -> Self {
        Self {
            merge_same_sign,
            min_spike_length,
        }
    }

    /// Create a detector from analysis parameters for a given sample period.
    pub fn from_parameters(params: &AnalysisParameters, sample_period: f64) -> Self {
        Self::new(
            params.merge_same_sign_peaks,
            params.min_spike_length(sample_period),
        )
    }

    pub fn min_spike_length(&self) -> usize {
        self.min_spike_length
    }

    /// Segment a waveform into positive and negative spikes.
    ///
    /// Waveforms shorter than two samples contain no spike and produce an
    /// empty result.
    pub fn detect(&self, waveform: &Waveform) -> SegmentationResult {
        let samples = waveform.samples();
        let mut result = SegmentationResult::default();
        if samples.len() < 2 {
            return result;
        }

        let last = samples.len() - 1;
        // Polarity is unset until the first sign change; it is scanned as positive
        let mut spike = Spike {
            polarity: Polarity::Positive,
            maxima: 0,
            start: 0,
            length: 0,
        };

        for (i, sample) in samples.iter().enumerate() {
            let same_sign = match spike.polarity {
                Polarity::Positive => sample.value >= 0.0,
                Polarity::Negative => sample.value <= 0.0,
            };

            if same_sign || i == last {
                if sample.value.abs() > samples[spike.maxima].value.abs() {
                    spike.maxima = i;
                }
                spike.length += 1;
                if i == last {
                    self.finish_spike(&spike, samples, &mut result);
                }
            } else {
                self.finish_spike(&spike, samples, &mut result);
                spike = Spike {
                    polarity: spike.polarity.opposite(),
                    maxima: i,
                    start: i,
                    length: 1,
                };
            }
        }

        log::trace!(
            "Detected {} positive / {} negative peaks (min length {}, merge {})",
            result.positive.len(),
            result.negative.len(),
            self.min_spike_length,
            self.merge_same_sign
        );

        result
    }

    fn finish_spike(&self, spike: &Spike, samples: &[Sample], result: &mut SegmentationResult) {
        if spike.length <= self.min_spike_length {
            return;
        }

        let peak = samples[spike.maxima];
        let start = samples[spike.start];
        let last_opposite = result
            .peak_set(spike.polarity.opposite())
            .last_peak()
            .map(|s| s.time);
        let set = result.peak_set_mut(spike.polarity);

        let previous = match set.last_peak() {
            Some(p) if self.merge_same_sign => *p,
            _ => {
                set.push(peak, start);
                return;
            }
        };

        if last_opposite.is_some_and(|t| t > previous.time) {
            set.push(peak, start);
            return;
        }

        let more_extreme = match spike.polarity {
            Polarity::Positive => peak.value > previous.value,
            Polarity::Negative => peak.value < previous.value,
        };
        if more_extreme {
            set.replace_last(peak, start);
        }
    }
}

/// Segment `waveform` with the given merge policy and minimum spike length.
pub fn detect(
    waveform: &Waveform,
    merge_same_sign: bool,
    min_spike_length: usize,
) -> SegmentationResult {
    PeakOnsetDetector::new(merge_same_sign, min_spike_length).detect(waveform)
}
