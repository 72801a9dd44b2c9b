use serde::Serialize;
use std::collections::HashMap;

use crate::config::AnalysisParameters;
use crate::error::Result;
use crate::source::SampleSource;
use crate::waveform::Waveform;

/// Value range used to scale a signal's plot axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extremes {
    pub min: f32,
    pub max: f32,
}

impl Extremes {
    pub fn of(waveform: &Waveform) -> Option<Self> {
        waveform.extremes().map(|(min, max)| Self { min, max })
    }
}

/// Whole-recording extremes per signal, computed on first use.
///
/// Owned by whoever holds the loaded recording. Call
/// [`AxisExtremesCache::clear`] when the set of signals changes.
#[derive(Debug, Default)]
pub struct AxisExtremesCache {
    entries: HashMap<String, Option<Extremes>>,
}

impl AxisExtremesCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached extremes of `signal`, reading the full series on a miss.
    pub fn get_or_load(
        &mut self,
        signal: &str,
        source: &dyn SampleSource,
    ) -> Result<Option<Extremes>> {
        if let Some(cached) = self.entries.get(signal) {
            return Ok(*cached);
        }
        let extremes = Extremes::of(&source.full_series(signal)?);
        log::debug!("Cached axis extremes for {}: {:?}", signal, extremes);
        self.entries.insert(signal.to_string(), extremes);
        Ok(extremes)
    }

    pub fn invalidate(&mut self, signal: &str) {
        self.entries.remove(signal);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Axis range for plotting `window` of `signal`.
///
/// With `use_constant_axis` the whole-recording range is used, so every
/// window of a signal is drawn on the same scale; otherwise the window's
/// own range.
pub fn axis_bounds(
    params: &AnalysisParameters,
    signal: &str,
    window: &Waveform,
    source: &dyn SampleSource,
    cache: &mut AxisExtremesCache,
) -> Result<Option<Extremes>> {
    if params.use_constant_axis {
        cache.get_or_load(signal, source)
    } else {
        Ok(Extremes::of(window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn source() -> MemorySource {
        MemorySource::new().with_signal(
            "Flow",
            Waveform::from_values(0.0, 1.0, &[-3.0, 0.5, 1.0, 4.0]).unwrap(),
        )
    }

    #[test]
    fn test_constant_axis_uses_full_recording() {
        let src = source();
        let mut cache = AxisExtremesCache::new();
        let window = src.get_series("Flow", 1.0, 2.0).unwrap();
        let params = AnalysisParameters {
            use_constant_axis: true,
            ..Default::default()
        };

        let bounds = axis_bounds(&params, "Flow", &window, &src, &mut cache).unwrap();
        assert_eq!(bounds, Some(Extremes { min: -3.0, max: 4.0 }));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_window_axis_without_constant() {
        let src = source();
        let mut cache = AxisExtremesCache::new();
        let window = src.get_series("Flow", 1.0, 2.0).unwrap();
        let params = AnalysisParameters::default();

        let bounds = axis_bounds(&params, "Flow", &window, &src, &mut cache).unwrap();
        assert_eq!(bounds, Some(Extremes { min: 0.5, max: 1.0 }));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_reloads() {
        let mut src = source();
        let mut cache = AxisExtremesCache::new();
        cache.get_or_load("Flow", &src).unwrap();

        src.insert("Flow", Waveform::from_values(0.0, 1.0, &[10.0, 20.0]).unwrap());
        // Still cached
        assert_eq!(
            cache.get_or_load("Flow", &src).unwrap(),
            Some(Extremes { min: -3.0, max: 4.0 })
        );

        cache.invalidate("Flow");
        assert_eq!(
            cache.get_or_load("Flow", &src).unwrap(),
            Some(Extremes { min: 10.0, max: 20.0 })
        );
    }

    #[test]
    fn test_unknown_signal_not_cached() {
        let src = source();
        let mut cache = AxisExtremesCache::new();
        assert!(cache.get_or_load("Thorax", &src).is_err());
        assert!(cache.is_empty());
    }
}
