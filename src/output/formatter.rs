//! Console and JSON rendering of matching results

use crate::error::{Result, SkillMatchError};
use crate::output::report::MatchMetadata;
use crate::processing::aggregate::AggregateResult;
use crate::processing::matcher::MatchResult;
use colored::{Color, Colorize};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Console,
    Json,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> std::result::Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        _ => Err(format!("Invalid output format: {}. Supported: console, json", format)),
    }
}

pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str) -> String {
        if self.use_colors {
            format!("\n{} {}\n", "▓".blue().bold(), title.blue().bold())
        } else {
            format!("\n▓ {}\n", title)
        }
    }

    fn format_score_badge(&self, score: f64) -> String {
        let (badge, color) = match (score * 100.0).round() as u32 {
            85..=100 => ("STRONG FIT", Color::Green),
            65..=84 => ("PARTIAL FIT", Color::Yellow),
            _ => ("WEAK FIT", Color::Red),
        };

        if self.use_colors {
            format!("[{}]", badge.color(color).bold())
        } else {
            format!("[{}]", badge)
        }
    }

    fn format_result(&self, result: &MatchResult, color: Color) -> String {
        let matched = result.matched.as_deref().unwrap_or("-");
        let mut line = format!(
            "  • {} → {} ({:.2})",
            self.colorize(&result.skill, color),
            matched,
            result.sim
        );
        if self.detailed {
            line.push_str(&self.colorize(
                &format!(
                    " [semantic {:.2}, lexical {:.2}]",
                    result.components.semantic, result.components.lexical
                ),
                Color::BrightBlack,
            ));
        }
        line.push('\n');
        line
    }

    pub fn format_results(&self, results: &AggregateResult) -> String {
        let mut output = self.format_header("Skill Match Summary");

        output.push_str(&format!(
            "Overall score: {:.1}% {}\n",
            results.score * 100.0,
            self.format_score_badge(results.score)
        ));
        output.push_str(&format!(
            "Required: {:.1}%  Optional: {:.1}%  (weights {:.2}/{:.2})\n",
            results.required_match_score * 100.0,
            results.optional_match_score * 100.0,
            results.relative_skill_weights.required,
            results.relative_skill_weights.optional
        ));

        let summary = &results.summary;
        output.push_str(&format!(
            "Required skills: {} strong, {} weak, {} missing. Nice-to-have relevant: {}\n",
            self.colorize(&summary.req_strong.to_string(), Color::Green),
            self.colorize(&summary.req_weak.to_string(), Color::Yellow),
            self.colorize(&summary.req_missing.to_string(), Color::Red),
            summary.nice_relevant
        ));

        let sections = [
            ("Strong matches", &results.required.strong, Color::Green),
            ("Weak matches", &results.required.weak, Color::Yellow),
            ("Missing", &results.required.missing, Color::Red),
        ];
        for (title, bucket, color) in sections {
            if bucket.is_empty() {
                continue;
            }
            output.push_str(&self.format_header(title));
            for result in bucket.iter() {
                output.push_str(&self.format_result(result, color));
            }
        }

        if !results.nice.is_empty() {
            output.push_str(&self.format_header("Nice to have"));
            for nice in &results.nice {
                let color = if nice.ok { Color::Green } else { Color::BrightBlack };
                output.push_str(&self.format_result(&nice.result, color));
            }
        }

        output
    }

    pub fn format_failure(&self, metadata: &MatchMetadata) -> String {
        let message = metadata
            .matching_details
            .error_message
            .as_deref()
            .unwrap_or("unknown error");
        format!("{} {}\n", self.colorize("Matching failed:", Color::Red), message)
    }
}

pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Write `value` as pretty JSON, creating parent directories as needed.
pub fn save_json<T: Serialize>(value: &T, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, to_json(value)?)?;
    Ok(())
}

fn file_stem(path: &Path) -> Result<String> {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .ok_or_else(|| SkillMatchError::InvalidInput(format!("Path has no file name: {}", path.display())))
}

/// `<job stem>_matching_results.json`
pub fn results_filename(job_path: &Path) -> Result<PathBuf> {
    Ok(PathBuf::from(format!("{}_matching_results.json", file_stem(job_path)?)))
}

/// `metadata_<candidate stem>_vs_<job stem>.json`, with `unknown` for a path without a file name.
///
/// Infallible: the metadata file has to be writable before any input is trusted.
pub fn metadata_filename(candidate_path: &Path, job_path: &Path) -> PathBuf {
    let stem = |path: &Path| file_stem(path).unwrap_or_else(|_| "unknown".to_string());
    PathBuf::from(format!("metadata_{}_vs_{}.json", stem(candidate_path), stem(job_path)))
}
