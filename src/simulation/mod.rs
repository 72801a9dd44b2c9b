mod noise;
mod signal;

pub use noise::{
    AdditiveNoiseConfig, ArtifactConfig, BaselineWanderConfig, NoiseConfig, apply_noise,
    generate_noisy_breathing_signal, signal_power,
};
pub use signal::{
    ApneaConfig, BreathConfig, generate_breathing_signal, generate_breathing_signal_with_rate_fn,
    generate_effort_channels,
};
