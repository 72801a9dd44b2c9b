pub mod axis;
pub mod config;
pub mod constants;
pub mod epoch;
pub mod error;
pub mod output;
pub mod respiration;
pub mod signal_processing;
pub mod source;
pub mod wav;
pub mod waveform;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::{AnalysisConfig, AnalysisParameters};
pub use error::{AnalysisError, Result};
pub use respiration::{PeakOnsetDetector, RespiratoryAnalysis, RespiratorySummary, StatPair};
pub use source::{MemorySource, SampleSource, WavSource};
pub use wav::save_wav;
pub use waveform::{Polarity, Sample, SegmentationResult, Waveform};
