use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Invalid resample ratio: {0} (must be finite and > 0)")]
    InvalidRatio(f64),

    #[error("Invalid filter length: {0} (must be >= 1)")]
    InvalidFilterLength(usize),

    #[error("Invalid low-pass cutoff: {0} Hz")]
    InvalidCutoff(f64),

    #[error("Invalid sample period: {0} s")]
    InvalidSamplePeriod(f64),

    #[error("No sample at t={time:.6}s")]
    MissingSample { time: f64 },

    #[error("Breath ends at t={to:.6}s before it starts at t={from:.6}s")]
    InvertedRange { from: f64, to: f64 },

    #[error("Insufficient data: need {needed} samples, have {available}")]
    InsufficientData { needed: usize, available: usize },

    #[error("FFT error: {0}")]
    Fft(String),

    #[error("Unknown signal: {0}")]
    UnknownSignal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
