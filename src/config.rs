//! Configuration for the quiz engine.
//!
//! Supports both environment variables and YAML config file.
//! Environment variables take precedence over config file values.
//!
//! The scoring constants (blend weights, containment floor, pass threshold)
//! are policy knobs rather than derived values, so all of them live here.

use crate::error::{QuizError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Relevance index settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Sentences must score strictly above this to be returned by a search.
    pub min_similarity: f64,

    /// How many top search hits `best_definition` inspects for a
    /// "term is/are/refers to" sentence.
    pub definition_candidates: usize,

    /// Index adjacent token pairs alongside single tokens.
    pub use_bigrams: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            min_similarity: 0.0,
            definition_candidates: 5,
            use_bigrams: true,
        }
    }
}

/// Question synthesis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Candidate sentences requested per wanted question.
    pub oversample_factor: usize,

    /// Answers are cut at a word boundary to this many characters.
    pub max_answer_chars: usize,

    /// Questions are cut at a word boundary to this many characters.
    pub max_question_chars: usize,

    /// Seed for the sentence shuffle used by topic-less quizzes.
    pub seed: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            oversample_factor: 10,
            max_answer_chars: 100,
            max_question_chars: 200,
            seed: None,
        }
    }
}

/// Answer evaluation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Weight of the character-sequence similarity ratio.
    pub sequence_weight: f64,

    /// Weight of the keyword-set Jaccard similarity.
    pub keyword_weight: f64,

    /// Score floor when one normalized answer contains the other.
    pub containment_floor: f64,

    /// When the expected answer contains the candidate, the candidate must be
    /// at least this fraction of the expected length for the floor to apply.
    pub containment_min_ratio: f64,

    /// Score floor when the candidate carries the expected answer's key phrases.
    pub key_phrase_floor: f64,

    /// Pass/fail threshold.
    pub threshold: f64,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            sequence_weight: 0.4,
            keyword_weight: 0.6,
            containment_floor: 0.9,
            containment_min_ratio: 0.7,
            key_phrase_floor: 0.7,
            threshold: 0.6,
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Relevance index settings
    pub retrieval: RetrievalConfig,
    /// Question synthesis settings
    pub generation: GenerationConfig,
    /// Answer evaluation settings
    pub evaluation: EvaluationConfig,
}

impl Config {
    /// Load configuration from environment variables and optional config file.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (QUIZ_THRESHOLD, QUIZ_SEED, QUIZ_OVERSAMPLE)
    /// 2. Config file (~/.config/lecture-quiz/config.yaml)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                config = Self::load_from_file(&config_path)?;
            }
        }

        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| QuizError::io(path, e))?;

        serde_yaml::from_str(&content)
            .map_err(|e| QuizError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Override values from environment variables. Unparseable values are ignored.
    pub fn apply_env(&mut self) {
        if let Ok(threshold) = env::var("QUIZ_THRESHOLD") {
            if let Ok(value) = threshold.parse() {
                self.evaluation.threshold = value;
            }
        }

        if let Ok(seed) = env::var("QUIZ_SEED") {
            if let Ok(value) = seed.parse() {
                self.generation.seed = Some(value);
            }
        }

        if let Ok(oversample) = env::var("QUIZ_OVERSAMPLE") {
            if let Ok(value) = oversample.parse() {
                self.generation.oversample_factor = value;
            }
        }
    }

    /// Get the default config file path.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "lecture-quiz")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Validate that values are usable.
    pub fn validate(&self) -> Result<()> {
        let eval = &self.evaluation;

        if eval.sequence_weight < 0.0 || eval.keyword_weight < 0.0 {
            return Err(QuizError::InvalidConfig(
                "evaluation weights must be non-negative".to_string(),
            ));
        }

        if eval.sequence_weight + eval.keyword_weight <= 0.0 {
            return Err(QuizError::InvalidConfig(
                "at least one evaluation weight must be positive".to_string(),
            ));
        }

        for (name, value) in [
            ("threshold", eval.threshold),
            ("containment_floor", eval.containment_floor),
            ("containment_min_ratio", eval.containment_min_ratio),
            ("key_phrase_floor", eval.key_phrase_floor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(QuizError::InvalidConfig(format!(
                    "evaluation.{} must be within [0, 1], got {}",
                    name, value
                )));
            }
        }

        if self.generation.oversample_factor == 0 {
            return Err(QuizError::InvalidConfig(
                "generation.oversample_factor must be at least 1".to_string(),
            ));
        }

        if self.retrieval.definition_candidates == 0 {
            return Err(QuizError::InvalidConfig(
                "retrieval.definition_candidates must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Create a config with an explicit pass threshold (useful for testing).
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            evaluation: EvaluationConfig {
                threshold,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.evaluation.sequence_weight, 0.4);
        assert_eq!(config.evaluation.keyword_weight, 0.6);
        assert_eq!(config.evaluation.containment_floor, 0.9);
        assert_eq!(config.evaluation.threshold, 0.6);
        assert_eq!(config.generation.oversample_factor, 10);
        assert!(config.generation.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::with_threshold(1.5);
        assert!(config.validate().is_err());

        config.evaluation.threshold = 0.5;
        config.evaluation.sequence_weight = -0.1;
        assert!(config.validate().is_err());

        config.evaluation.sequence_weight = 0.0;
        config.evaluation.keyword_weight = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "evaluation:\n  threshold: 0.75\ngeneration:\n  seed: 42\n")
            .unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.evaluation.threshold, 0.75);
        assert_eq!(config.evaluation.keyword_weight, 0.6);
        assert_eq!(config.generation.seed, Some(42));
        assert_eq!(config.retrieval.definition_candidates, 5);
    }

    #[test]
    fn test_malformed_yaml_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "evaluation: [not, a, map").unwrap();

        let err = Config::load_from_file(&path).unwrap_err();
        assert!(matches!(err, QuizError::Config(_)));
    }
}
