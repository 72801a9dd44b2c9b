pub mod analysis;
pub mod detector;
pub mod statistics;

pub use analysis::{RespiratoryAnalysis, analyze, analyze_window, condition};
pub use detector::{PeakOnsetDetector, detect};
pub use statistics::{
    BreathVolumes, RespiratorySummary, StatPair, aligned_pairs, breath_volume, breath_volumes,
    breathing_period, flow_volume, half_period, peak_height,
};
