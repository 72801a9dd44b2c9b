pub mod coherence;
pub mod dc_removal;
pub mod derivative;
pub mod low_pass;
pub mod moving_average;
pub mod resample;

pub use coherence::{Coherence, coherence, coherence_of};
pub use dc_removal::{mean_bias, remove_bias};
pub use derivative::derivative;
pub use low_pass::{LowPassFilter, low_pass};
pub use moving_average::{centered_moving_average, moving_average};
pub use resample::{AlignedPair, RationalRatio, Resampler, align_sample_rates, resample};
