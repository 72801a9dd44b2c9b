use super::{AnalysisReport, Formatter};

/// One JSON object per line
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, report: &AnalysisReport) -> String {
        serde_json::to_string(report)
            .unwrap_or_else(|e| format!(r#"{{"error":"{}"}}"#, e.to_string().replace('"', "'")))
    }
}
