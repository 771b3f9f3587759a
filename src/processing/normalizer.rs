//! Skill string canonicalization: acronyms, synonyms, case, whitespace, punctuation

use crate::config::NormalizationConfig;
use crate::error::{Result, SkillMatchError};
use log::{error, warn};
use regex::{Captures, Regex, RegexBuilder};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Lowercase acronym -> canonical form, e.g. `"aws" -> "AWS"`.
pub type AcronymMap = BTreeMap<String, String>;

/// Canonical term -> alternate spellings.
pub type SynonymMap = BTreeMap<String, Vec<String>>;

/// Configurable normalization pipeline.
///
/// Steps always run in the same order: acronym expansion, synonym
/// resolution (which short-circuits), lowercase, trim, punctuation removal.
/// The synonym lookup is repeated on the final text so that a form which
/// only matches once trimmed still resolves to its canonical term.
pub struct TextNormalizer {
    config: NormalizationConfig,
    acronyms: Option<AcronymExpander>,
    synonyms: Vec<SynonymEntry>,
}

struct AcronymExpander {
    pattern: Regex,
    replacements: HashMap<String, String>,
}

struct SynonymEntry {
    canonical: String,
    alternates: Vec<String>,
}

impl TextNormalizer {
    pub fn new(config: NormalizationConfig, synonyms: SynonymMap, acronyms: AcronymMap) -> Self {
        let acronyms = if acronyms.is_empty() {
            None
        } else {
            AcronymExpander::build(acronyms)
        };

        let synonyms = synonyms
            .into_iter()
            .map(|(canonical, alternates)| SynonymEntry {
                canonical: canonical.to_lowercase(),
                alternates: alternates.iter().map(|s| s.to_lowercase()).collect(),
            })
            .collect();

        Self {
            config,
            acronyms,
            synonyms,
        }
    }

    /// Normalizer with every step disabled.
    pub fn passthrough() -> Self {
        Self::new(NormalizationConfig::default(), SynonymMap::new(), AcronymMap::new())
    }

    pub fn config(&self) -> &NormalizationConfig {
        &self.config
    }

    pub fn normalize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let mut text = text.to_string();

        if self.config.apply_acronyms {
            if let Some(expander) = &self.acronyms {
                text = expander.expand(&text);
            }
        }

        if let Some(canonical) = self.resolve_synonym(&text) {
            return canonical.to_string();
        }

        if self.config.lowercase {
            text = text.to_lowercase();
        }

        if self.config.strip_whitespace {
            text = text.trim().to_string();
        }

        if self.config.remove_punctuation {
            text.retain(|c| !c.is_ascii_punctuation());
            // Removing a trailing "." can expose whitespace that the trim step would strip
            if self.config.strip_whitespace {
                text = text.trim().to_string();
            }
        }

        match self.resolve_synonym(&text) {
            Some(canonical) => canonical.to_string(),
            None => text,
        }
    }

    /// Canonical term whose spelling equals `text`, ignoring case.
    fn resolve_synonym(&self, text: &str) -> Option<&str> {
        if !self.config.apply_synonyms {
            return None;
        }
        let lowered = text.to_lowercase();
        self.synonyms
            .iter()
            .find(|entry| lowered == entry.canonical || entry.alternates.iter().any(|alt| *alt == lowered))
            .map(|entry| entry.canonical.as_str())
    }
}

impl AcronymExpander {
    /// One case-insensitive alternation over all keys, longest first, so a
    /// shorter key is still tried where a longer one fails the word boundary.
    fn build(acronyms: AcronymMap) -> Option<Self> {
        let mut keys: Vec<&String> = acronyms.keys().filter(|key| !key.is_empty()).collect();
        if keys.is_empty() {
            return None;
        }
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let alternation = keys.iter().map(|key| regex::escape(key)).collect::<Vec<_>>().join("|");
        let pattern = match RegexBuilder::new(&format!(r"\b(?:{})\b", alternation))
            .case_insensitive(true)
            .build()
        {
            Ok(pattern) => pattern,
            Err(e) => {
                error!("Failed to build acronym pattern, acronym expansion disabled: {}", e);
                return None;
            }
        };

        let replacements = acronyms
            .iter()
            .map(|(key, value)| (key.to_lowercase(), value.clone()))
            .collect();

        Some(Self { pattern, replacements })
    }

    /// Replace whole-word, case-insensitive occurrences of each acronym key.
    fn expand(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, |caps: &Captures| {
                let found = &caps[0];
                self.replacements
                    .get(&found.to_lowercase())
                    .cloned()
                    .unwrap_or_else(|| found.to_string())
            })
            .into_owned()
    }
}

/// Load the acronym map, degrading to an empty map when the file is missing or malformed.
pub fn load_acronym_map(path: Option<&Path>) -> AcronymMap {
    load_map(path, "acronym").unwrap_or_default()
}

/// Load the synonym map, degrading to an empty map when the file is missing or malformed.
pub fn load_synonym_map(path: Option<&Path>) -> SynonymMap {
    load_map(path, "synonym").unwrap_or_default()
}

fn load_map<T: serde::de::DeserializeOwned>(path: Option<&Path>, kind: &str) -> Option<T> {
    let path = path?;
    match read_map(path) {
        Ok(map) => Some(map),
        Err(SkillMatchError::Io(e)) => {
            warn!("{} file not found at {} ({}). Using empty map.", kind, path.display(), e);
            None
        }
        Err(e) => {
            error!("Error decoding {} file {}: {}. Using empty map.", kind, path.display(), e);
            None
        }
    }
}

fn read_map<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| SkillMatchError::DataFile(format!("Invalid JSON in {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn all_steps() -> NormalizationConfig {
        NormalizationConfig {
            apply_acronyms: true,
            apply_synonyms: true,
            lowercase: true,
            strip_whitespace: true,
            remove_punctuation: true,
        }
    }

    fn sample_acronyms() -> AcronymMap {
        [("aws", "AWS"), ("gpc", "GPC"), ("gafs/bq", "GAFS/BQ")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn sample_synonyms() -> SynonymMap {
        let mut map = SynonymMap::new();
        map.insert(
            "JavaScript".to_string(),
            vec!["JS".to_string(), "ECMAScript".to_string()],
        );
        map.insert(
            "Kubernetes".to_string(),
            vec!["k8s".to_string()],
        );
        map
    }

    #[test]
    fn test_empty_input_bypasses_pipeline() {
        let normalizer = TextNormalizer::new(all_steps(), sample_synonyms(), sample_acronyms());
        assert_eq!(normalizer.normalize(""), "");
    }

    #[test]
    fn test_passthrough_leaves_text_untouched() {
        let normalizer = TextNormalizer::passthrough();
        assert_eq!(normalizer.normalize("  C++ / Rust! "), "  C++ / Rust! ");
    }

    #[test]
    fn test_acronyms_expand_whole_words_only() {
        let config = NormalizationConfig {
            apply_acronyms: true,
            ..Default::default()
        };
        let normalizer = TextNormalizer::new(config, SynonymMap::new(), sample_acronyms());

        assert_eq!(normalizer.normalize("Aws cloud"), "AWS cloud");
        assert_eq!(normalizer.normalize("lawson"), "lawson");
        assert_eq!(normalizer.normalize("gpc and gafs/bq"), "GPC and GAFS/BQ");
        assert_eq!(normalizer.normalize("awsgpc"), "awsgpc");
    }

    #[test]
    fn test_shorter_acronym_applies_where_longer_is_not_a_whole_word() {
        let config = NormalizationConfig {
            apply_acronyms: true,
            ..Default::default()
        };
        let acronyms: AcronymMap = [("aws", "AWS"), ("aws lambda", "AWS Lambda")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let normalizer = TextNormalizer::new(config, SynonymMap::new(), acronyms);

        assert_eq!(normalizer.normalize("aws lambdas"), "AWS lambdas");
        assert_eq!(normalizer.normalize("Aws Lambda functions"), "AWS Lambda functions");
        assert_eq!(normalizer.normalize("aws, aws lambda"), "AWS, AWS Lambda");
    }

    #[test]
    fn test_synonym_resolves_after_trim_and_punctuation() {
        let normalizer = TextNormalizer::new(all_steps(), sample_synonyms(), AcronymMap::new());
        assert_eq!(normalizer.normalize("JS "), "javascript");
        assert_eq!(normalizer.normalize(" K8s"), "kubernetes");
        assert_eq!(normalizer.normalize("K8S."), "kubernetes");
    }

    #[test]
    fn test_synonym_short_circuits_remaining_steps() {
        let config = NormalizationConfig {
            apply_synonyms: true,
            remove_punctuation: true,
            ..Default::default()
        };
        let normalizer = TextNormalizer::new(config, sample_synonyms(), AcronymMap::new());

        assert_eq!(normalizer.normalize("ECMAScript"), "javascript");
        assert_eq!(normalizer.normalize("K8S"), "kubernetes");
        assert_eq!(normalizer.normalize("Kubernetes"), "kubernetes");
        // No synonym hit: punctuation step still runs, lowercase is off
        assert_eq!(normalizer.normalize("Node.js"), "Nodejs");
    }

    #[test]
    fn test_synonym_requires_exact_match() {
        let config = NormalizationConfig {
            apply_synonyms: true,
            ..Default::default()
        };
        let normalizer = TextNormalizer::new(config, sample_synonyms(), AcronymMap::new());
        assert_eq!(normalizer.normalize("JS frameworks"), "JS frameworks");
    }

    #[test]
    fn test_full_pipeline() {
        let normalizer = TextNormalizer::new(all_steps(), sample_synonyms(), sample_acronyms());
        assert_eq!(normalizer.normalize("  Python, Django! "), "python django");
        assert_eq!(normalizer.normalize("aws"), "aws");
        assert_eq!(normalizer.normalize("C++"), "c");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let normalizer = TextNormalizer::new(all_steps(), sample_synonyms(), sample_acronyms());
        let inputs = [
            "Python Programming",
            "  REST API Design. ",
            "a .",
            "AWS Cloud Services",
            "gafs/bq",
            "JS",
            "CI/CD Pipelines",
            "Database Management (SQL)",
            "JS ",
            " K8s",
            "K8S.",
            "Postgres\n",
            "",
        ];
        for input in inputs {
            let once = normalizer.normalize(input);
            assert_eq!(normalizer.normalize(&once), once, "input: {:?}", input);
        }

        let partial = TextNormalizer::new(
            NormalizationConfig {
                apply_acronyms: true,
                apply_synonyms: true,
                ..Default::default()
            },
            sample_synonyms(),
            sample_acronyms(),
        );
        for input in inputs {
            let once = partial.normalize(input);
            assert_eq!(partial.normalize(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_missing_or_corrupt_files_degrade_to_empty() {
        let dir = TempDir::new().unwrap();
        assert!(load_acronym_map(Some(&dir.path().join("missing.json"))).is_empty());
        assert!(load_acronym_map(None).is_empty());

        let corrupt = dir.path().join("synonyms.json");
        std::fs::write(&corrupt, "{ not json").unwrap();
        assert!(load_synonym_map(Some(&corrupt)).is_empty());
    }

    #[test]
    fn test_load_maps_from_json() {
        let dir = TempDir::new().unwrap();
        let acronyms = dir.path().join("acronyms.json");
        std::fs::write(&acronyms, r#"{"aws": "AWS", "dts": "DTS"}"#).unwrap();
        let synonyms = dir.path().join("synonyms.json");
        std::fs::write(&synonyms, r#"{"machine learning": ["ML", "statistical learning"]}"#).unwrap();

        let acronym_map = load_acronym_map(Some(&acronyms));
        assert_eq!(acronym_map.get("dts").map(String::as_str), Some("DTS"));

        let synonym_map = load_synonym_map(Some(&synonyms));
        assert_eq!(synonym_map["machine learning"].len(), 2);
    }
}
