//! Numeric constants shared by the resampler and spectral estimators
//!
//! These define filter design parameters and epsilon guards used to keep
//! the numeric pipeline stable.

/// Largest numerator/denominator accepted when reducing a resample ratio
/// to `p/q`. Bounds the prototype filter length.
pub const MAX_RATIO_TERM: u64 = 1000;

/// Relative tolerance for accepting a continued-fraction convergent as the
/// rational form of a resample ratio.
pub const RATIO_TOLERANCE: f64 = 1e-9;

/// Half-length of the resampling prototype filter, in units of
/// `max(p, q)` taps.
pub const RESAMPLE_HALF_LENGTH: usize = 10;

/// Kaiser window shape parameter for the resampling prototype filter.
pub const RESAMPLE_KAISER_BETA: f64 = 5.0;

/// Minimum FFT length used by the coherence estimator.
pub const MIN_COHERENCE_NFFT: usize = 256;

/// Epsilon for preventing division by zero in cross-spectral ratios.
/// Bins where either auto-spectrum vanishes report NaN (undefined coherence).
pub const MIN_POWER_THRESHOLD: f64 = 1e-30;

/// Default epoch length used for navigation windows, in seconds.
pub const DEFAULT_EPOCH_SECS: f64 = 30.0;
