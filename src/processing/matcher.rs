//! Skill matching: best-match resolution per job skill and full matching runs

use crate::config::MatcherConfig;
use crate::error::{Result, SkillMatchError};
use crate::output::report::{InputCounts, MatchMetadata, ReportBuilder, SourceIdentifier};
use crate::processing::aggregate::{aggregate, round4, AggregateResult};
use crate::processing::embedding_cache::{CacheStats, EmbeddingCache, EmbeddingMap};
use crate::processing::embeddings::{Embedder, Model2VecEmbedder};
use crate::processing::normalizer::{load_acronym_map, load_synonym_map, TextNormalizer};
use crate::processing::similarity::{SimilarityComponents, SimilarityScorer};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Separator of alternatives inside a single job skill, e.g. `"Python or R"`.
pub const DISJUNCTION: &str = " or ";

/// Best candidate match for one job skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// The job skill exactly as requested, disjunctions included.
    pub skill: String,
    #[serde(rename = "match")]
    pub matched: Option<String>,
    pub sim: f64,
    pub components: SimilarityComponents,
}

impl MatchResult {
    fn unmatched(skill: &str) -> Self {
        Self {
            skill: skill.to_string(),
            matched: None,
            sim: 0.0,
            components: SimilarityComponents::default(),
        }
    }
}

/// Inputs of one matching run.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRequest {
    pub candidate_skills: Vec<String>,
    pub required_skills: Vec<String>,
    pub optional_skills: Vec<String>,
    pub candidate_source: SourceIdentifier,
    pub job_source: SourceIdentifier,
}

impl MatchRequest {
    pub fn new(candidate_skills: Vec<String>, required_skills: Vec<String>, optional_skills: Vec<String>) -> Self {
        Self {
            candidate_skills,
            required_skills,
            optional_skills,
            candidate_source: SourceIdentifier::unknown_candidate(),
            job_source: SourceIdentifier::unknown_job(),
        }
    }

    pub fn with_candidate_source(mut self, source: SourceIdentifier) -> Self {
        self.candidate_source = source;
        self
    }

    pub fn with_job_source(mut self, source: SourceIdentifier) -> Self {
        self.job_source = source;
        self
    }

    pub fn input_counts(&self) -> InputCounts {
        InputCounts {
            total_candidate_skills: self.candidate_skills.len(),
            total_job_required_skills: self.required_skills.len(),
            total_job_optional_skills: self.optional_skills.len(),
        }
    }

    /// Every distinct text that needs an embedding, in first-seen order.
    fn texts_to_embed(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let job_parts = self
            .required_skills
            .iter()
            .chain(&self.optional_skills)
            .flat_map(|skill| split_alternatives(skill));

        self.candidate_skills
            .iter()
            .map(String::as_str)
            .chain(job_parts)
            .filter(|text| seen.insert(*text))
            .map(str::to_string)
            .collect()
    }
}

/// Result of [`SkillMatcher::match_skills`]. `results` is `None` when the run failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub results: Option<AggregateResult>,
    pub metadata: MatchMetadata,
}

/// Split a job skill on [`DISJUNCTION`] into trimmed, non-empty alternatives.
pub fn split_alternatives(skill: &str) -> Vec<&str> {
    skill
        .split(DISJUNCTION)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

/// Highest-scoring candidate skill for `job_skill` over all (alternative x candidate) pairs.
///
/// Iteration is alternatives first, then candidates, both in input order; a
/// later pair only wins on a strictly greater combined score. Pairs without
/// embeddings are skipped, and if none remain the result has no match and a
/// similarity of 0.
pub fn find_best_match(
    scorer: &SimilarityScorer,
    job_skill: &str,
    candidate_skills: &[String],
    embeddings: &EmbeddingMap<'_>,
) -> MatchResult {
    let mut best: Option<(&str, f64, SimilarityComponents)> = None;

    for part in split_alternatives(job_skill) {
        for candidate in candidate_skills {
            let Some(similarity) = scorer.similarity(part, candidate, embeddings) else {
                continue;
            };

            let better = match &best {
                Some((_, best_score, _)) => similarity.combined > *best_score,
                None => true,
            };
            if better {
                best = Some((candidate.as_str(), similarity.combined, similarity.components()));
            }
        }
    }

    match best {
        Some((candidate, score, components)) => MatchResult {
            skill: job_skill.to_string(),
            matched: Some(candidate.to_string()),
            sim: round4(score),
            components: SimilarityComponents {
                semantic: round4(components.semantic),
                lexical: round4(components.lexical),
            },
        },
        None => MatchResult::unmatched(job_skill),
    }
}

/// Owns the configuration, normalizer, embedding model and embedding cache for matching runs.
///
/// The cache file is a scoped resource: it is read here, written after each
/// batch of new encodings, and flushed once more by [`SkillMatcher::close`].
pub struct SkillMatcher {
    config: MatcherConfig,
    scorer: SimilarityScorer,
    embedder: Box<dyn Embedder>,
    cache: EmbeddingCache,
}

impl SkillMatcher {
    /// Build a matcher backed by the configured Model2Vec model and its cache file.
    pub fn from_config(config: MatcherConfig) -> Result<Self> {
        config.validate()?;
        let embedder = Model2VecEmbedder::load(&config.model_settings.model_name)?;
        Self::new(config, Box::new(embedder))
    }

    /// Build a matcher around an existing model, using the configured cache file.
    pub fn new(config: MatcherConfig, embedder: Box<dyn Embedder>) -> Result<Self> {
        config.validate()?;
        let cache = EmbeddingCache::open(config.cache_file(), &config.model_settings.model_name);
        Self::with_cache(config, embedder, cache)
    }

    pub fn with_cache(config: MatcherConfig, embedder: Box<dyn Embedder>, cache: EmbeddingCache) -> Result<Self> {
        config.validate()?;
        info!("Loaded skill match configuration version {}", config.version);

        let model_name = config.model_settings.model_name.as_str();
        if embedder.model_name() != model_name || cache.model_name() != model_name {
            return Err(SkillMatchError::Configuration(format!(
                "Embedding model '{}' and cache '{}' must both match configured model '{}'",
                embedder.model_name(),
                cache.model_name(),
                model_name
            )));
        }

        let synonyms = load_synonym_map(config.synonym_file.as_deref());
        let acronyms = load_acronym_map(config.acronym_file.as_deref());
        let normalizer = TextNormalizer::new(config.normalization, synonyms, acronyms);
        let scorer = SimilarityScorer::new(config.similarity_weights, normalizer);

        Ok(Self {
            config,
            scorer,
            embedder,
            cache,
        })
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn scorer(&self) -> &SimilarityScorer {
        &self.scorer
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Match a candidate against a job. Always returns an audit record; on
    /// failure `results` is `None` and the metadata carries the error.
    pub fn match_skills(&mut self, request: &MatchRequest) -> MatchOutcome {
        let report = ReportBuilder::start(request.candidate_source.clone(), request.job_source.clone())
            .with_config(&self.config)
            .with_input_counts(request.input_counts());

        match self.try_match_skills(request) {
            Ok(results) => {
                let metadata = report.success(&results);
                MatchOutcome {
                    results: Some(results),
                    metadata,
                }
            }
            Err(e) => {
                error!("An error occurred during matching: {}", e);
                MatchOutcome {
                    results: None,
                    metadata: report.failure(e.to_string()),
                }
            }
        }
    }

    /// Match a candidate against a job, propagating model failures to the caller.
    pub fn try_match_skills(&mut self, request: &MatchRequest) -> Result<AggregateResult> {
        let texts = request.texts_to_embed();
        let embeddings = self.cache.embed_batch(&texts, self.embedder.as_mut())?;

        info!("Starting skill matching...");
        let resolve = |skills: &[String]| -> Vec<MatchResult> {
            skills
                .iter()
                .map(|skill| find_best_match(&self.scorer, skill, &request.candidate_skills, &embeddings))
                .collect()
        };
        let required_results = resolve(&request.required_skills);
        let optional_results = resolve(&request.optional_skills);

        Ok(aggregate(required_results, optional_results, &self.config))
    }

    /// Persist any cache entries not yet written.
    pub fn flush(&mut self) -> Result<()> {
        self.cache.flush()
    }

    /// Flush the cache and release the matcher.
    pub fn close(mut self) -> Result<()> {
        self.flush()
    }
}
