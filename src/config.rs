//! Configuration for respiratory waveform analysis.
//!
//! All sections have sensible defaults and can be overridden from a TOML
//! file:
//!
//! ```toml
//! [parameters]
//! minimum_peak_width_ms = 400.0
//! merge_same_sign_peaks = true
//!
//! [conditioning]
//! bias_mode = "mean"
//! low_pass_cutoff_hz = 1.0
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::DEFAULT_EPOCH_SECS;
use crate::error::{AnalysisError, Result};

/// Per-invocation analysis parameters
///
/// Supplied by the caller for each analysed window and never changed
/// during the analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisParameters {
    /// Spikes must last longer than this to count as a peak
    pub minimum_peak_width_ms: f64,
    /// Collapse consecutive same-sign spikes into the most extreme one
    pub merge_same_sign_peaks: bool,
    /// Plot against whole-recording extremes instead of per-window extremes
    pub use_constant_axis: bool,
}

impl AnalysisParameters {
    /// Minimum spike length in samples for a given sample period.
    ///
    /// # Example
    /// ```
    /// use respiro::config::AnalysisParameters;
    ///
    /// let params = AnalysisParameters::default();
    /// // 500 ms at 100 Hz
    /// assert_eq!(params.min_spike_length(0.01), 50);
    /// ```
    pub fn min_spike_length(&self, sample_period: f64) -> usize {
        let samples = self.minimum_peak_width_ms / 1000.0 / sample_period;
        if samples.is_finite() && samples > 0.0 {
            samples.floor() as usize
        } else {
            0
        }
    }
}

impl Default for AnalysisParameters {
    fn default() -> Self {
        Self {
            minimum_peak_width_ms: 500.0,
            merge_same_sign_peaks: true,
            use_constant_axis: false,
        }
    }
}

/// How the DC bias is removed before peak detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BiasMode {
    /// Leave the signal as recorded
    None,
    /// Subtract the mean of the analysed window
    Mean,
    /// Subtract `ConditioningConfig::bias`
    Fixed,
}

/// Filters applied to a waveform before segmentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConditioningConfig {
    pub bias_mode: BiasMode,
    /// Bias subtracted when `bias_mode` is `Fixed`
    pub bias: f32,
    /// Single-pole low-pass cutoff in Hz (disabled when unset)
    pub low_pass_cutoff_hz: Option<f64>,
    /// Centred moving average half-length in samples (disabled when unset)
    pub moving_average_half_length: Option<usize>,
}

impl Default for ConditioningConfig {
    fn default() -> Self {
        Self {
            bias_mode: BiasMode::Mean,
            bias: 0.0,
            low_pass_cutoff_hz: None,
            moving_average_half_length: None,
        }
    }
}

/// Epoch windowing used to pick analysis windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpochConfig {
    /// Epoch length in seconds
    pub length_secs: f64,
}

impl Default for EpochConfig {
    fn default() -> Self {
        Self {
            length_secs: DEFAULT_EPOCH_SECS,
        }
    }
}

/// Complete analysis configuration
///
/// # Example
/// ```
/// use respiro::config::AnalysisConfig;
///
/// let mut config = AnalysisConfig::default();
/// config.parameters.minimum_peak_width_ms = 300.0;
/// config.conditioning.low_pass_cutoff_hz = Some(1.5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub parameters: AnalysisParameters,
    pub conditioning: ConditioningConfig,
    pub epoch: EpochConfig,
}

impl AnalysisConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| AnalysisError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Reject values no analysis could run with.
    pub fn validate(&self) -> Result<()> {
        if !(self.parameters.minimum_peak_width_ms >= 0.0) {
            return Err(AnalysisError::Config(format!(
                "minimum_peak_width_ms must be >= 0, got {}",
                self.parameters.minimum_peak_width_ms
            )));
        }
        if let Some(cutoff) = self.conditioning.low_pass_cutoff_hz {
            if !(cutoff.is_finite() && cutoff > 0.0) {
                return Err(AnalysisError::InvalidCutoff(cutoff));
            }
        }
        if let Some(0) = self.conditioning.moving_average_half_length {
            return Err(AnalysisError::InvalidFilterLength(0));
        }
        if !(self.epoch.length_secs > 0.0) {
            return Err(AnalysisError::Config(format!(
                "epoch length must be positive, got {}",
                self.epoch.length_secs
            )));
        }
        Ok(())
    }
}
