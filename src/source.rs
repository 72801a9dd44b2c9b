use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use hound::WavReader;

use crate::error::{AnalysisError, Result};
use crate::waveform::Waveform;

/// Provider of named signals, such as a decoded polysomnography file.
///
/// Implementations hand out samples at each signal's native sample period;
/// no container format is parsed by the analysis code itself.
pub trait SampleSource: Send + Sync {
    /// Names of every signal this source can provide
    fn signal_names(&self) -> Vec<String>;

    /// Samples of `signal` with `start <= time <= end` (seconds)
    fn get_series(&self, signal: &str, start: f64, end: f64) -> Result<Waveform>;

    /// Every sample of `signal`
    fn full_series(&self, signal: &str) -> Result<Waveform> {
        self.get_series(signal, f64::NEG_INFINITY, f64::INFINITY)
    }
}

/// Signals held in memory, keyed by name
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    signals: BTreeMap<String, Waveform>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, waveform: Waveform) {
        self.signals.insert(name.into(), waveform);
    }

    pub fn with_signal(mut self, name: impl Into<String>, waveform: Waveform) -> Self {
        self.insert(name, waveform);
        self
    }
}

impl SampleSource for MemorySource {
    fn signal_names(&self) -> Vec<String> {
        self.signals.keys().cloned().collect()
    }

    fn get_series(&self, signal: &str, start: f64, end: f64) -> Result<Waveform> {
        self.signals
            .get(signal)
            .map(|w| w.window(start, end))
            .ok_or_else(|| AnalysisError::UnknownSignal(signal.to_string()))
    }
}

/// WAV recording exposed as one signal per channel.
///
/// Channels are named `channel0`, `channel1`, ... Integer PCM is scaled to
/// ±1.0; float samples are taken as-is.
pub struct WavSource {
    inner: MemorySource,
    sample_rate: u32,
}

impl WavSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = WavReader::open(path.as_ref())?;
        let spec = reader.spec();
        let channels = spec.channels as usize;
        if channels == 0 {
            return Err(AnalysisError::Config("WAV file has no channels".to_string()));
        }

        let interleaved = Self::read_samples(reader, &spec)?;
        let period = 1.0 / spec.sample_rate as f64;

        let mut inner = MemorySource::new();
        for ch in 0..channels {
            let values: Vec<f32> = interleaved.iter().skip(ch).step_by(channels).copied().collect();
            inner.insert(Self::channel_name(ch), Waveform::from_values(0.0, period, &values)?);
        }

        log::debug!(
            "Loaded {} ({} channels, {} Hz, {} frames)",
            path.as_ref().display(),
            channels,
            spec.sample_rate,
            interleaved.len() / channels
        );

        Ok(Self {
            inner,
            sample_rate: spec.sample_rate,
        })
    }

    pub fn channel_name(index: usize) -> String {
        format!("channel{}", index)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn read_samples(
        mut reader: WavReader<BufReader<File>>,
        spec: &hound::WavSpec,
    ) -> Result<Vec<f32>> {
        let samples = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect::<std::result::Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                let max_val = 2_i64.pow(spec.bits_per_sample as u32 - 1) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / max_val))
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
        };
        Ok(samples)
    }
}

impl SampleSource for WavSource {
    fn signal_names(&self) -> Vec<String> {
        self.inner.signal_names()
    }

    fn get_series(&self, signal: &str, start: f64, end: f64) -> Result<Waveform> {
        self.inner.get_series(signal, start, end)
    }
}
