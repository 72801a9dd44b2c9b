use serde::Serialize;

use crate::config::{AnalysisConfig, BiasMode, ConditioningConfig};
use crate::error::Result;
use crate::respiration::detector::PeakOnsetDetector;
use crate::respiration::statistics::RespiratorySummary;
use crate::signal_processing::{low_pass, mean_bias, moving_average, remove_bias};
use crate::source::SampleSource;
use crate::waveform::{SegmentationResult, Waveform};

/// Result of analysing one window of one signal
#[derive(Debug, Clone, Serialize)]
pub struct RespiratoryAnalysis {
    /// Bias removed before segmentation
    pub bias: f32,
    pub min_spike_length: usize,
    #[serde(skip)]
    pub conditioned: Waveform,
    pub segmentation: SegmentationResult,
    pub summary: RespiratorySummary,
}

/// Apply bias removal and the configured filters, in that order.
///
/// Returns the conditioned waveform and the bias that was removed.
pub fn condition(waveform: &Waveform, config: &ConditioningConfig) -> Result<(Waveform, f32)> {
    let bias = match config.bias_mode {
        BiasMode::None => 0.0,
        BiasMode::Mean => mean_bias(waveform),
        BiasMode::Fixed => config.bias,
    };
    let mut conditioned = remove_bias(waveform, bias);

    if let Some(cutoff) = config.low_pass_cutoff_hz {
        conditioned = low_pass(&conditioned, cutoff, conditioned.sample_period())?;
    }
    if let Some(half_length) = config.moving_average_half_length {
        conditioned = moving_average(&conditioned, half_length)?;
    }

    Ok((conditioned, bias))
}

/// Condition, segment and summarise a breathing waveform.
pub fn analyze(waveform: &Waveform, config: &AnalysisConfig) -> Result<RespiratoryAnalysis> {
    let (conditioned, bias) = condition(waveform, &config.conditioning)?;
    let detector =
        PeakOnsetDetector::from_parameters(&config.parameters, conditioned.sample_period());
    let segmentation = detector.detect(&conditioned);
    let summary = RespiratorySummary::from_segmentation(&conditioned, &segmentation);

    log::debug!(
        "Analysed {} samples: bias {:.4}, min spike {} samples, {} breaths",
        conditioned.len(),
        bias,
        detector.min_spike_length(),
        summary.breath_count
    );

    Ok(RespiratoryAnalysis {
        bias,
        min_spike_length: detector.min_spike_length(),
        conditioned,
        segmentation,
        summary,
    })
}

/// Fetch `signal` between `start` and `end` from a source and analyse it.
pub fn analyze_window(
    source: &dyn SampleSource,
    signal: &str,
    start: f64,
    end: f64,
    config: &AnalysisConfig,
) -> Result<RespiratoryAnalysis> {
    let waveform = source.get_series(signal, start, end)?;
    analyze(&waveform, config)
}
