//! Configuration management for the skill matcher

use crate::error::{Result, SkillMatchError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL_NAME: &str = "minishlab/potion-base-8M";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    #[serde(default = "default_version")]
    pub version: String,
    /// Required. A config without thresholds cannot produce meaningful categories.
    pub skill_thresholds: SkillThresholds,
    #[serde(default)]
    pub similarity_weights: SimilarityWeights,
    #[serde(default)]
    pub scoring_weights: ScoringWeights,
    #[serde(default)]
    pub normalization: NormalizationConfig,
    #[serde(default)]
    pub model_settings: ModelSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synonym_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acronym_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillThresholds {
    pub strong: f64,
    pub weak: f64,
    pub nice: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityWeights {
    pub semantic: f64,
    pub lexical: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub required_skill: f64,
    pub optional_skill: f64,
}

/// Each step of the normalization pipeline is opt-in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    pub apply_acronyms: bool,
    pub apply_synonyms: bool,
    pub lowercase: bool,
    pub strip_whitespace: bool,
    pub remove_punctuation: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    #[serde(default = "default_model_name")]
    pub model_name: String,
}

/// Required/optional weights normalized so they sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelativeSkillWeights {
    pub required: f64,
    pub optional: f64,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

fn default_model_name() -> String {
    DEFAULT_MODEL_NAME.to_string()
}

impl Default for SimilarityWeights {
    fn default() -> Self {
        Self {
            semantic: 0.7,
            lexical: 0.3,
        }
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            required_skill: 0.8,
            optional_skill: 0.2,
        }
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            model_name: default_model_name(),
        }
    }
}

impl MatcherConfig {
    /// Build a config from explicit thresholds, everything else at its default.
    pub fn with_thresholds(skill_thresholds: SkillThresholds) -> Self {
        Self {
            version: default_version(),
            skill_thresholds,
            similarity_weights: SimilarityWeights::default(),
            scoring_weights: ScoringWeights::default(),
            normalization: NormalizationConfig::default(),
            model_settings: ModelSettings::default(),
            synonym_file: None,
            acronym_file: None,
            cache_dir: None,
        }
    }

    /// Load and validate a config file. `.toml` files are parsed as TOML,
    /// everything else as JSON.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SkillMatchError::Configuration(format!(
                "Failed to read config '{}': {}",
                path.display(),
                e
            ))
        })?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("toml"))
            .unwrap_or(false);

        let mut config = if is_toml {
            Self::from_toml_str(&content)?
        } else {
            Self::from_json_str(&content)?
        };

        // Relative data file paths are resolved against the config's directory
        if let Some(base) = path.parent() {
            config.resolve_relative_paths(base);
        }

        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: MatcherConfig = toml::from_str(content)
            .map_err(|e| SkillMatchError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: MatcherConfig = serde_json::from_str(content)
            .map_err(|e| SkillMatchError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make scores meaningless.
    pub fn validate(&self) -> Result<()> {
        let t = &self.skill_thresholds;
        for (name, value) in [("strong", t.strong), ("weak", t.weak), ("nice", t.nice)] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(SkillMatchError::Configuration(format!(
                    "skill_thresholds.{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }
        if t.weak > t.strong {
            return Err(SkillMatchError::Configuration(format!(
                "skill_thresholds.weak ({}) must not exceed skill_thresholds.strong ({})",
                t.weak, t.strong
            )));
        }

        let s = &self.similarity_weights;
        for (name, value) in [("semantic", s.semantic), ("lexical", s.lexical)] {
            if !value.is_finite() || value < 0.0 {
                return Err(SkillMatchError::Configuration(format!(
                    "similarity_weights.{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        // Both components are in [0, 1]; a sum above 1 would push combined scores out of range
        if s.semantic + s.lexical > 1.0 + 1e-9 {
            return Err(SkillMatchError::Configuration(format!(
                "similarity_weights.semantic + lexical must not exceed 1, got {}",
                s.semantic + s.lexical
            )));
        }

        let w = &self.scoring_weights;
        for (name, value) in [("required_skill", w.required_skill), ("optional_skill", w.optional_skill)] {
            if !value.is_finite() || value < 0.0 {
                return Err(SkillMatchError::Configuration(format!(
                    "scoring_weights.{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if w.required_skill + w.optional_skill <= 0.0 {
            return Err(SkillMatchError::Configuration(
                "scoring_weights.required_skill and optional_skill must not both be zero".to_string(),
            ));
        }

        if self.model_settings.model_name.trim().is_empty() {
            return Err(SkillMatchError::Configuration(
                "model_settings.model_name must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    pub fn relative_skill_weights(&self) -> RelativeSkillWeights {
        let total = self.scoring_weights.required_skill + self.scoring_weights.optional_skill;
        RelativeSkillWeights {
            required: self.scoring_weights.required_skill / total,
            optional: self.scoring_weights.optional_skill / total,
        }
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(Self::default_cache_dir)
    }

    /// One cache file per embedding model; vector spaces of different models are incompatible.
    pub fn cache_file(&self) -> PathBuf {
        let model = self.model_settings.model_name.replace(['/', '\\'], "_");
        self.cache_dir().join(format!("embeddings_{}.bin", model))
    }

    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("skill-matcher")
            .join("config.toml")
    }

    fn default_cache_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("skill-matcher")
    }

    fn resolve_relative_paths(&mut self, base: &Path) {
        for path in [&mut self.synonym_file, &mut self.acronym_file, &mut self.cache_dir]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn thresholds() -> SkillThresholds {
        SkillThresholds {
            strong: 0.85,
            weak: 0.65,
            nice: 0.6,
        }
    }

    #[test]
    fn test_toml_defaults_applied() {
        let config = MatcherConfig::from_toml_str(
            r#"
            [skill_thresholds]
            strong = 0.85
            weak = 0.65
            nice = 0.6
            "#,
        )
        .unwrap();

        assert_eq!(config.version, "1.0.0");
        assert_eq!(config.similarity_weights, SimilarityWeights::default());
        assert_eq!(config.scoring_weights, ScoringWeights::default());
        assert_eq!(config.normalization, NormalizationConfig::default());
        assert_eq!(config.model_settings.model_name, DEFAULT_MODEL_NAME);
    }

    #[test]
    fn test_missing_thresholds_fail_fast() {
        let result = MatcherConfig::from_json_str(r#"{"similarity_weights": {"semantic": 0.5, "lexical": 0.5}}"#);
        assert!(matches!(result, Err(SkillMatchError::Configuration(_))));

        let partial = MatcherConfig::from_json_str(r#"{"skill_thresholds": {"strong": 0.8, "weak": 0.6}}"#);
        assert!(matches!(partial, Err(SkillMatchError::Configuration(_))));
    }

    #[test]
    fn test_weak_above_strong_rejected() {
        let mut config = MatcherConfig::with_thresholds(thresholds());
        config.skill_thresholds.weak = 0.9;
        assert!(config.validate().is_err());

        config.skill_thresholds.weak = 0.85;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let mut config = MatcherConfig::with_thresholds(thresholds());
        config.skill_thresholds.nice = 1.5;
        assert!(config.validate().is_err());

        let mut config = MatcherConfig::with_thresholds(thresholds());
        config.similarity_weights.lexical = -0.1;
        assert!(config.validate().is_err());

        let mut config = MatcherConfig::with_thresholds(thresholds());
        config.scoring_weights = ScoringWeights {
            required_skill: 0.0,
            optional_skill: 0.0,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_similarity_weights_cannot_exceed_one() {
        let mut config = MatcherConfig::with_thresholds(thresholds());
        config.similarity_weights = SimilarityWeights {
            semantic: 0.8,
            lexical: 0.3,
        };
        assert!(matches!(config.validate(), Err(SkillMatchError::Configuration(_))));

        config.similarity_weights = SimilarityWeights {
            semantic: 0.7,
            lexical: 0.3,
        };
        assert!(config.validate().is_ok());

        config.similarity_weights = SimilarityWeights {
            semantic: 0.5,
            lexical: 0.2,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_relative_weights_only_ratio_matters() {
        let mut config = MatcherConfig::with_thresholds(thresholds());
        config.scoring_weights = ScoringWeights {
            required_skill: 4.0,
            optional_skill: 1.0,
        };
        let weights = config.relative_skill_weights();
        assert!((weights.required - 0.8).abs() < 1e-12);
        assert!((weights.optional - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_cache_file_is_namespaced_by_model() {
        let mut config = MatcherConfig::with_thresholds(thresholds());
        config.cache_dir = Some(PathBuf::from("/tmp/cache"));
        config.model_settings.model_name = "sentence-transformers/all-MiniLM-L6-v2".to_string();
        assert_eq!(
            config.cache_file(),
            PathBuf::from("/tmp/cache/embeddings_sentence-transformers_all-MiniLM-L6-v2.bin")
        );

        let mut other = config.clone();
        other.model_settings.model_name = "minishlab/potion-base-8M".to_string();
        assert_ne!(config.cache_file(), other.cache_file());
    }

    #[test]
    fn test_from_path_resolves_relative_data_files() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("skill_match.json");
        std::fs::write(
            &path,
            r#"{
                "version": "2.1.0",
                "skill_thresholds": {"strong": 0.8, "weak": 0.6, "nice": 0.5},
                "normalization": {"lowercase": true},
                "synonym_file": "synonyms.json"
            }"#,
        )
        .unwrap();

        let config = MatcherConfig::from_path(&path).unwrap();
        assert_eq!(config.version, "2.1.0");
        assert!(config.normalization.lowercase);
        assert!(!config.normalization.apply_synonyms);
        assert_eq!(config.synonym_file, Some(dir.path().join("synonyms.json")));
        assert_eq!(config.acronym_file, None);
    }

    #[test]
    fn test_missing_file_is_configuration_error() {
        let result = MatcherConfig::from_path(Path::new("/definitely/not/here.toml"));
        assert!(matches!(result, Err(SkillMatchError::Configuration(_))));
    }
}
