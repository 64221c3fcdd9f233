//! Output formatters for ranking reports

use crate::config::{OutputConfig, OutputFormat};
use crate::error::Result;
use crate::output::report::RankingReport;
use colored::{Color, Colorize};

/// Trait for formatting ranking reports
pub trait OutputFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String>;
}

/// Plain ranked listing for the terminal
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

/// JSON formatter for scripting and structured data
pub struct JsonFormatter {
    pretty: bool,
}

/// Pick the formatter configured for this run.
pub fn formatter_for(config: &OutputConfig) -> Box<dyn OutputFormatter> {
    match config.format {
        OutputFormat::Console => Box::new(ConsoleFormatter::new(config.color_output, config.detailed)),
        OutputFormat::Json => Box::new(JsonFormatter::new(true)),
    }
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).bold().to_string()
        } else {
            text.to_string()
        }
    }

    /// One ranked entry. The layout is fixed so that scripts can parse it.
    pub fn format_rank_line(rank: usize, filename: &str, score: f32, method: &str) -> String {
        format!(
            "Rank {}: Resume: {}, Score: {:.4}, Method: {}",
            rank, filename, score, method
        )
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.colorize("Resume Ranking Results", Color::Blue));
        output.push('\n');
        output.push_str(&format!(
            "Job description: {} (method: {})\n",
            report.reference.filename, report.reference.method
        ));
        if self.detailed {
            output.push_str(&format!(
                "Model: {} | Generated: {}\n",
                report.model,
                report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }
        output.push('\n');

        if report.is_empty() {
            output.push_str("No match results to display.\n");
        } else {
            for (index, record) in report.results.iter().enumerate() {
                output.push_str(&Self::format_rank_line(
                    index + 1,
                    &record.filename,
                    record.score,
                    record.method.as_str(),
                ));
                output.push('\n');
            }
        }

        if self.detailed && !report.skipped.is_empty() {
            output.push('\n');
            output.push_str(&self.colorize(
                &format!("Skipped ({})", report.skipped.len()),
                Color::Yellow,
            ));
            output.push('\n');
            for skipped in &report.skipped {
                output.push_str(&format!("  - {}: {}\n", skipped.filename, skipped.reason));
            }
        }

        Ok(output)
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &RankingReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ExtractionMethod;
    use crate::output::report::{ReferenceSummary, SkippedDocument};
    use crate::processing::ranker::MatchRecord;
    use std::path::PathBuf;

    fn report() -> RankingReport {
        let mut report = RankingReport::new(
            ReferenceSummary {
                filename: "job.txt".to_string(),
                method: ExtractionMethod::DirectTxt,
            },
            "sentence-transformers/all-MiniLM-L6-v2",
        );
        report.results = vec![
            MatchRecord {
                filename: "alice.pdf".to_string(),
                path: PathBuf::from("resumes/alice.pdf"),
                score: 0.91234,
                method: ExtractionMethod::DirectPdf,
            },
            MatchRecord {
                filename: "bob.png".to_string(),
                path: PathBuf::from("resumes/bob.png"),
                score: 0.5,
                method: ExtractionMethod::Ocr,
            },
        ];
        report.skipped = vec![SkippedDocument {
            filename: "carol.docx".to_string(),
            reason: "no usable text could be extracted".to_string(),
        }];
        report
    }

    #[test]
    fn test_console_rank_lines() {
        let output = ConsoleFormatter::new(false, false).format_report(&report()).unwrap();
        let lines: Vec<&str> = output.lines().filter(|l| l.starts_with("Rank ")).collect();
        assert_eq!(
            lines,
            vec![
                "Rank 1: Resume: alice.pdf, Score: 0.9123, Method: direct_pdf",
                "Rank 2: Resume: bob.png, Score: 0.5000, Method: ocr",
            ]
        );
        assert!(!output.contains("carol.docx"));
    }

    #[test]
    fn test_console_empty_report() {
        let mut empty = report();
        empty.results.clear();
        let output = ConsoleFormatter::new(false, false).format_report(&empty).unwrap();
        assert!(output.contains("No match results to display."));
        assert!(!output.contains("Rank "));
    }

    #[test]
    fn test_detailed_console_lists_skipped() {
        let output = ConsoleFormatter::new(false, true).format_report(&report()).unwrap();
        assert!(output.contains("Skipped (1)"));
        assert!(output.contains("carol.docx: no usable text could be extracted"));
        assert!(output.contains("Model: sentence-transformers/all-MiniLM-L6-v2"));
    }

    #[test]
    fn test_json_report() {
        let output = JsonFormatter::new(false).format_report(&report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["results"][0]["filename"], "alice.pdf");
        assert_eq!(value["results"][1]["method"], "ocr");
        assert_eq!(value["reference"]["method"], "direct_txt");
        assert_eq!(value["skipped"][0]["filename"], "carol.docx");
    }
}
