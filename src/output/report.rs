//! Audit metadata for matching runs
//!
//! Every run produces a [`MatchMetadata`] record, including runs that fail
//! before or during matching. Configuration snapshots are redacted before
//! they are attached.

use crate::config::MatcherConfig;
use crate::processing::aggregate::{AggregateResult, MatchSummary};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Instant;

pub const REDACTED: &str = "[REDACTED]";

/// Field names whose values never reach persisted metadata.
pub const SENSITIVE_KEYS: &[&str] = &[
    "api_key",
    "url",
    "base_url",
    "api_base",
    "model_path",
    "synonym_file",
    "acronym_file",
    "cache_dir",
];

/// Where a skill list came from, e.g. `file_system` + a path, or `database` + a row id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceIdentifier {
    #[serde(rename = "type")]
    pub source_type: String,
    pub id: String,
}

impl SourceIdentifier {
    pub fn new(source_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            source_type: source_type.into(),
            id: id.into(),
        }
    }

    pub fn file_system(id: impl Into<String>) -> Self {
        Self::new("file_system", id)
    }

    pub fn unknown_candidate() -> Self {
        Self::file_system("unknown_candidate")
    }

    pub fn unknown_job() -> Self {
        Self::file_system("unknown_job")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceIdentifiers {
    pub candidate: SourceIdentifier,
    pub job: SourceIdentifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputCounts {
    pub total_candidate_skills: usize,
    pub total_job_required_skills: usize,
    pub total_job_optional_skills: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchingDetails {
    pub status: MatchStatus,
    pub config_used: Value,
    pub processing_time_seconds: f64,
    pub error_message: Option<String>,
    pub input_counts: InputCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsSummary {
    pub overall_score: f64,
    pub required_match_score: f64,
    pub optional_match_score: f64,
    pub summary_counts: MatchSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchMetadata {
    pub source_identifiers: SourceIdentifiers,
    pub timestamp: DateTime<Utc>,
    pub matching_details: MatchingDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matching_results_summary: Option<ResultsSummary>,
}

impl MatchMetadata {
    pub fn is_success(&self) -> bool {
        self.matching_details.status == MatchStatus::Success
    }
}

/// Collects audit facts while a run progresses and seals them into a [`MatchMetadata`].
pub struct ReportBuilder {
    started: Instant,
    sources: SourceIdentifiers,
    config_used: Value,
    input_counts: InputCounts,
}

impl ReportBuilder {
    pub fn start(candidate: SourceIdentifier, job: SourceIdentifier) -> Self {
        Self {
            started: Instant::now(),
            sources: SourceIdentifiers { candidate, job },
            config_used: Value::Null,
            input_counts: InputCounts::default(),
        }
    }

    pub fn with_config(mut self, config: &MatcherConfig) -> Self {
        self.config_used = redacted_config(config);
        self
    }

    pub fn with_input_counts(mut self, input_counts: InputCounts) -> Self {
        self.input_counts = input_counts;
        self
    }

    pub fn success(self, results: &AggregateResult) -> MatchMetadata {
        let summary = ResultsSummary {
            overall_score: results.score,
            required_match_score: results.required_match_score,
            optional_match_score: results.optional_match_score,
            summary_counts: results.summary,
        };
        self.finish(MatchStatus::Success, None, Some(summary))
    }

    pub fn failure(self, error_message: impl Into<String>) -> MatchMetadata {
        self.finish(MatchStatus::Failed, Some(error_message.into()), None)
    }

    fn finish(
        self,
        status: MatchStatus,
        error_message: Option<String>,
        matching_results_summary: Option<ResultsSummary>,
    ) -> MatchMetadata {
        let elapsed = self.started.elapsed().as_secs_f64();
        MatchMetadata {
            source_identifiers: self.sources,
            timestamp: Utc::now(),
            matching_details: MatchingDetails {
                status,
                config_used: self.config_used,
                processing_time_seconds: (elapsed * 100.0).round() / 100.0,
                error_message,
                input_counts: self.input_counts,
            },
            matching_results_summary,
        }
    }
}

/// Serialized config with every sensitive field replaced by [`REDACTED`].
pub fn redacted_config(config: &MatcherConfig) -> Value {
    let mut value = serde_json::to_value(config).unwrap_or(Value::Null);
    redact(&mut value);
    value
}

/// Recursively replace values of denylisted keys, matched case-insensitively.
pub fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if is_sensitive(key) {
                    *field = Value::String(REDACTED.to_string());
                } else {
                    redact(field);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}

fn is_sensitive(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}
