use super::{AnalysisReport, Formatter};

/// Format with at most two decimal places and no trailing zeros.
pub fn format_two_places(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{:.2}", value);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// A period in seconds, e.g. `"4.05 s"`
pub fn format_seconds(value: f64) -> String {
    format!("{} s", format_two_places(value))
}

/// A period in seconds in the long form, e.g. `"4.05 sec"`
pub fn format_sec(value: f64) -> String {
    format!("{} sec", format_two_places(value))
}

/// A fraction shown as a percentage, e.g. `0.125` as `"12.5 %"`
pub fn format_percent(fraction: f64) -> String {
    format!("{} %", format_two_places(fraction * 100.0))
}

pub struct TextFormatter {
    verbose: bool,
}

impl TextFormatter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, report: &AnalysisReport) -> String {
        let label = match report.epoch {
            Some(epoch) => format!("{} {} [epoch {}]", report.source, report.signal, epoch),
            None => format!("{} {}", report.source, report.signal),
        };
        if let Some(ref err) = report.error {
            return format!("{}: ERROR: {}", label, err);
        }

        let s = &report.summary;
        if !self.verbose {
            return format!(
                "{}: {} breaths, period {} (CV {})",
                label,
                s.breath_count,
                format_seconds(s.breathing_period.mean),
                format_percent(s.breathing_period.coefficient_of_variation)
            );
        }

        let mut lines = vec![format!(
            "{}: {:.1}-{:.1} s, {} samples at {} Hz, bias {:.4}",
            label,
            report.start,
            report.end,
            report.sample_count,
            format_two_places(report.sample_rate),
            report.bias
        )];
        lines.push(format!("  Breaths:            {}", s.breath_count));
        for (name, pair) in [
            ("Breathing period", s.breathing_period),
            ("Inspiration time", s.inspiration_period),
            ("Expiration time", s.expiration_period),
        ] {
            lines.push(format!(
                "  {:<19} {} (CV {})",
                format!("{}:", name),
                format_sec(pair.mean),
                format_percent(pair.coefficient_of_variation)
            ));
        }
        for (name, pair) in [
            ("Positive peak", s.positive_peak_height),
            ("Negative peak", s.negative_peak_height),
            ("Inspiration vol", s.inspiration_volume),
            ("Expiration vol", s.expiration_volume),
        ] {
            lines.push(format!(
                "  {:<19} {} (CV {})",
                format!("{}:", name),
                format_two_places(pair.mean),
                format_percent(pair.coefficient_of_variation)
            ));
        }
        if s.skipped_volumes > 0 {
            lines.push(format!("  Skipped volumes:    {}", s.skipped_volumes));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::tests::sample_report;

    #[test]
    fn test_two_places_trims_zeros() {
        assert_eq!(format_two_places(4.0), "4");
        assert_eq!(format_two_places(4.5), "4.5");
        assert_eq!(format_two_places(4.056), "4.06");
        assert_eq!(format_two_places(0.001), "0");
        assert_eq!(format_two_places(-0.001), "0");
        assert_eq!(format_two_places(-1.25), "-1.25");
        assert_eq!(format_two_places(f64::NAN), "NaN");
    }

    #[test]
    fn test_legacy_units() {
        assert_eq!(format_seconds(4.0), "4 s");
        assert_eq!(format_sec(3.75), "3.75 sec");
        assert_eq!(format_percent(0.125), "12.5 %");
        assert_eq!(format_percent(0.0), "0 %");
    }

    #[test]
    fn test_summary_line() {
        let line = TextFormatter::new(false).format(&sample_report());
        assert_eq!(
            line,
            "night1.wav channel0 [epoch 3]: 7 breaths, period 4 s (CV 1.25 %)"
        );
    }

    #[test]
    fn test_verbose_lists_every_statistic() {
        let text = TextFormatter::new(true).format(&sample_report());
        assert!(text.contains("Inspiration time:   2 sec (CV 5 %)"));
        assert!(text.contains("Negative peak:      -1 (CV 0 %)"));
        assert!(!text.contains("Skipped"));
    }

    #[test]
    fn test_error_line() {
        let mut report = sample_report();
        report.error = Some("boom".to_string());
        assert!(TextFormatter::new(true).format(&report).ends_with("ERROR: boom"));
    }
}
