use super::{AnalysisReport, Formatter, iso8601_timestamp};
use crate::respiration::StatPair;

pub struct CsvFormatter;

fn pair(p: StatPair) -> String {
    format!("{:.4},{:.4}", p.mean, p.coefficient_of_variation)
}

impl Formatter for CsvFormatter {
    fn format(&self, report: &AnalysisReport) -> String {
        let s = &report.summary;
        let epoch = report.epoch.map_or(String::new(), |e| e.to_string());
        let error = report.error.as_deref().unwrap_or("").replace(',', ";");
        format!(
            "{},{},{},{},{:.3},{:.3},{},{},{},{},{},{},{},{},{},{}",
            iso8601_timestamp(),
            report.source,
            report.signal,
            epoch,
            report.start,
            report.end,
            s.breath_count,
            pair(s.breathing_period),
            pair(s.inspiration_period),
            pair(s.expiration_period),
            pair(s.positive_peak_height),
            pair(s.negative_peak_height),
            pair(s.inspiration_volume),
            pair(s.expiration_volume),
            s.skipped_volumes,
            error
        )
    }

    fn header(&self) -> Option<&'static str> {
        Some(
            "ts,source,signal,epoch,start,end,breaths,period,period_cv,inspiration,inspiration_cv,expiration,expiration_cv,positive_peak,positive_peak_cv,negative_peak,negative_peak_cv,inspiration_volume,inspiration_volume_cv,expiration_volume,expiration_volume_cv,skipped_volumes,error",
        )
    }
}
