pub mod generate;

pub use generate::breathing_waveform;
pub use generate::breathing_waveform_with;
pub use generate::sine_waveform;
