mod csv;
mod json;
mod text;

use chrono::Utc;
use serde::Serialize;

use crate::respiration::{RespiratoryAnalysis, RespiratorySummary};

pub use self::csv::CsvFormatter;
pub use self::json::JsonFormatter;
pub use self::text::{
    TextFormatter, format_percent, format_sec, format_seconds, format_two_places,
};

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

/// One analysed window of one signal, ready for display
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    /// Recording the signal came from (usually a file name)
    pub source: String,
    pub signal: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epoch: Option<u32>,
    pub start: f64,
    pub end: f64,
    pub sample_rate: f64,
    pub sample_count: usize,
    pub bias: f32,
    pub summary: RespiratorySummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisReport {
    pub fn from_analysis(
        source: impl Into<String>,
        signal: impl Into<String>,
        analysis: &RespiratoryAnalysis,
    ) -> Self {
        let waveform = &analysis.conditioned;
        Self {
            source: source.into(),
            signal: signal.into(),
            epoch: None,
            start: waveform.start_time().unwrap_or(0.0),
            end: waveform.end_time().unwrap_or(0.0),
            sample_rate: waveform.sample_rate(),
            sample_count: waveform.len(),
            bias: analysis.bias,
            summary: analysis.summary,
            error: None,
        }
    }

    /// Report for a window that could not be analysed
    pub fn failed(
        source: impl Into<String>,
        signal: impl Into<String>,
        error: impl ToString,
    ) -> Self {
        Self {
            source: source.into(),
            signal: signal.into(),
            epoch: None,
            start: 0.0,
            end: 0.0,
            sample_rate: 0.0,
            sample_count: 0,
            bias: 0.0,
            summary: RespiratorySummary::default(),
            error: Some(error.to_string()),
        }
    }

    pub fn with_epoch(mut self, epoch: u32) -> Self {
        self.epoch = Some(epoch);
        self
    }
}

pub trait Formatter: Send {
    fn format(&self, report: &AnalysisReport) -> String;

    fn header(&self) -> Option<&'static str> {
        None
    }
}

pub fn create_formatter(format: OutputFormat, verbose: bool) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(verbose)),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

pub fn iso8601_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::respiration::StatPair;

    pub(crate) fn sample_report() -> AnalysisReport {
        AnalysisReport {
            source: "night1.wav".to_string(),
            signal: "channel0".to_string(),
            epoch: Some(3),
            start: 60.0,
            end: 89.9,
            sample_rate: 10.0,
            sample_count: 300,
            bias: 0.125,
            summary: RespiratorySummary {
                breath_count: 7,
                breathing_period: StatPair {
                    mean: 4.0,
                    coefficient_of_variation: 0.0125,
                },
                inspiration_period: StatPair {
                    mean: 2.0,
                    coefficient_of_variation: 0.05,
                },
                expiration_period: StatPair {
                    mean: 2.0,
                    coefficient_of_variation: 0.05,
                },
                positive_peak_height: StatPair {
                    mean: 1.0,
                    coefficient_of_variation: 0.0,
                },
                negative_peak_height: StatPair {
                    mean: -1.0,
                    coefficient_of_variation: 0.0,
                },
                inspiration_volume: StatPair {
                    mean: 1.27,
                    coefficient_of_variation: 0.01,
                },
                expiration_volume: StatPair {
                    mean: -1.27,
                    coefficient_of_variation: 0.01,
                },
                skipped_volumes: 0,
            },
            error: None,
        }
    }

    #[test]
    fn test_failed_report_keeps_error() {
        let report = AnalysisReport::failed("a.wav", "channel1", "unknown signal: channel1");
        assert_eq!(report.error.as_deref(), Some("unknown signal: channel1"));
        assert_eq!(report.summary.breath_count, 0);
    }

    #[test]
    fn test_create_formatter_headers() {
        assert!(create_formatter(OutputFormat::Csv, false).header().is_some());
        assert!(create_formatter(OutputFormat::Json, false).header().is_none());
        assert!(create_formatter(OutputFormat::Text, true).header().is_none());
    }
}
