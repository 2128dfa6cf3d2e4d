use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::batch::plan::Emission;
use crate::errors::EmissionError;

#[derive(Debug, Clone)]
pub struct Outcome {
    pub path: PathBuf,
    pub bytes: usize,
    pub elapsed: Duration,
}

#[derive(Debug, Clone)]
pub struct EmissionResult {
    pub emission: Emission,
    pub outcome: Result<Outcome, EmissionError>,
}

impl EmissionResult {
    pub fn failed(emission: Emission, err: EmissionError) -> Self {
        Self {
            emission,
            outcome: Err(err),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Per-emission results in plan order, plus totals.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub results: Vec<EmissionResult>,
    pub elapsed: Duration,
}

impl BatchReport {
    pub fn new(results: Vec<EmissionResult>, elapsed: Duration) -> Self {
        Self { results, elapsed }
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    /// Percentage of successful emissions; an empty batch counts as 100.
    pub fn success_rate(&self) -> f64 {
        if self.results.is_empty() {
            return 100.0;
        }
        self.succeeded() as f64 * 100.0 / self.total() as f64
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }

    /// One line per failure: code, reason, then the tuple.
    pub fn failure_lines(&self) -> Vec<String> {
        self.results
            .iter()
            .filter_map(|r| match &r.outcome {
                Err(err) => Some(format!("FAILED [{}] {} ({})", err.code(), err, r.emission)),
                Ok(_) => None,
            })
            .collect()
    }

    /// Failure counts per error code, in first-seen order.
    pub fn failures_by_code(&self) -> Vec<(&'static str, usize)> {
        let mut counts: Vec<(&'static str, usize)> = Vec::new();
        for result in &self.results {
            let Err(err) = &result.outcome else { continue };
            match counts.iter_mut().find(|(code, _)| *code == err.code()) {
                Some((_, n)) => *n += 1,
                None => counts.push((err.code(), 1)),
            }
        }
        counts
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.failure_lines() {
            writeln!(f, "{line}")?;
        }
        write!(
            f,
            "{} emissions: {} succeeded, {} failed ({:.1}% success) in {:.2}s",
            self.total(),
            self.succeeded(),
            self.failed(),
            self.success_rate(),
            self.elapsed.as_secs_f64()
        )?;
        for (code, n) in self.failures_by_code() {
            write!(f, "\n  {code}: {n}")?;
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::view::{Audience, Length};
    use crate::render::OutputFormat;

    fn make_emission(format: OutputFormat) -> Emission {
        Emission {
            role: "backend".to_string(),
            length: Length::Full,
            scheme: "charcoal".to_string(),
            audience: Audience::Human,
            format,
        }
    }

    fn make_ok(format: OutputFormat) -> EmissionResult {
        EmissionResult {
            emission: make_emission(format),
            outcome: Ok(Outcome {
                path: PathBuf::from("out/a"),
                bytes: 10,
                elapsed: Duration::ZERO,
            }),
        }
    }

    fn make_report() -> BatchReport {
        BatchReport::new(
            vec![
                make_ok(OutputFormat::Pdf),
                EmissionResult::failed(
                    make_emission(OutputFormat::Docx),
                    EmissionError::LayoutOverflow("'globex' needs 900.0pt".into()),
                ),
                make_ok(OutputFormat::Rtf),
                EmissionResult::failed(make_emission(OutputFormat::Markdown), EmissionError::Cancelled),
            ],
            Duration::from_millis(1500),
        )
    }

    #[test]
    fn test_totals() {
        let report = make_report();
        assert_eq!(report.total(), 4);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed(), 2);
        assert!((report.success_rate() - 50.0).abs() < f64::EPSILON);
        assert!(!report.all_succeeded());
    }

    #[test]
    fn test_failure_lines_name_reason_and_tuple() {
        let lines = make_report().failure_lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("FAILED [LAYOUT_OVERFLOW]"));
        assert!(lines[0].contains("format=docx"));
        assert!(lines[1].contains("[CANCELLED]"));
    }

    #[test]
    fn test_summary_text() {
        let text = make_report().to_string();
        assert!(text.contains("4 emissions: 2 succeeded, 2 failed (50.0% success) in 1.50s"));
        assert!(text.contains("LAYOUT_OVERFLOW: 1"));
    }

    #[test]
    fn test_empty_batch_is_success() {
        let report = BatchReport::new(vec![], Duration::ZERO);
        assert!(report.all_succeeded());
        assert!((report.success_rate() - 100.0).abs() < f64::EPSILON);
    }
}
