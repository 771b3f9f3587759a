//! Per-skill results folded into categories and a weighted headline score

use crate::config::{MatcherConfig, RelativeSkillWeights};
use crate::processing::matcher::MatchResult;
use serde::{Deserialize, Serialize};

/// Required skills bucketed by how well they are covered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequiredBuckets {
    pub strong: Vec<MatchResult>,
    pub weak: Vec<MatchResult>,
    pub missing: Vec<MatchResult>,
}

/// An optional skill result with its relevance flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NiceResult {
    #[serde(flatten)]
    pub result: MatchResult,
    pub ok: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub req_strong: usize,
    pub req_weak: usize,
    pub req_missing: usize,
    pub nice_relevant: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub score: f64,
    pub required_match_score: f64,
    pub optional_match_score: f64,
    pub required: RequiredBuckets,
    pub nice: Vec<NiceResult>,
    pub summary: MatchSummary,
    pub relative_skill_weights: RelativeSkillWeights,
}

/// Categorize required results, flag optional ones and compute the composite score.
///
/// Lower threshold bounds are closed: a `sim` equal to `strong` is strong, a
/// `sim` equal to `weak` is weak.
pub fn aggregate(
    required_results: Vec<MatchResult>,
    optional_results: Vec<MatchResult>,
    config: &MatcherConfig,
) -> AggregateResult {
    let thresholds = &config.skill_thresholds;
    let weights = config.relative_skill_weights();

    let required_match_score = mean(required_results.iter().map(|r| r.sim));
    let optional_match_score = mean(optional_results.iter().map(|r| r.sim));

    let mut required = RequiredBuckets::default();
    for result in required_results {
        if result.sim >= thresholds.strong {
            required.strong.push(result);
        } else if result.sim >= thresholds.weak {
            required.weak.push(result);
        } else {
            required.missing.push(result);
        }
    }

    let nice: Vec<NiceResult> = optional_results
        .into_iter()
        .map(|result| NiceResult {
            ok: result.sim >= thresholds.nice,
            result,
        })
        .collect();

    let summary = MatchSummary {
        req_strong: required.strong.len(),
        req_weak: required.weak.len(),
        req_missing: required.missing.len(),
        nice_relevant: nice.iter().filter(|n| n.ok).count(),
    };

    let score = weights.required * required_match_score + weights.optional * optional_match_score;

    AggregateResult {
        score: round4(score),
        required_match_score: round4(required_match_score),
        optional_match_score: round4(optional_match_score),
        required,
        nice,
        summary,
        relative_skill_weights: RelativeSkillWeights {
            required: round4(weights.required),
            optional: round4(weights.optional),
        },
    }
}

/// Arithmetic mean, 0 for an empty sequence.
fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}
