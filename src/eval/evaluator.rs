use super::similarity::{has_key_phrase, jaccard, sequence_ratio};
use crate::config::EvaluationConfig;
use crate::tokenizer;
use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Whether one normalized answer contains the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
#[serde(rename_all = "snake_case")]
pub enum Containment {
    None,
    /// The candidate says everything the expected answer says, and more.
    CandidateContainsExpected,
    /// The candidate is a long enough excerpt of the expected answer.
    ExpectedContainsCandidate,
}

/// Per-signal detail behind a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct SignalBreakdown {
    /// Character-sequence similarity of the normalized answers.
    pub sequence_ratio: f64,
    /// Keyword Jaccard similarity; `None` when either answer has no keywords.
    pub keyword_overlap: Option<f64>,
    /// Weighted blend of the two similarities above.
    pub blended: f64,
    pub key_phrase: bool,
    pub containment: Containment,
}

/// Verdict for one candidate answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct EvaluationResult {
    /// Final score in [0, 1].
    pub score: f64,
    pub passed: bool,
    pub threshold: f64,
    /// The answer the candidate was compared against.
    pub expected: String,
    pub breakdown: SignalBreakdown,
}

impl EvaluationResult {
    /// User-facing feedback line.
    ///
    /// The closeness hint reports the blended similarity, before any floor.
    pub fn feedback(&self) -> String {
        if self.passed {
            return "Correct!".to_string();
        }
        let mut feedback = format!("Incorrect. The correct answer is: {}", self.expected);
        let similarity = self.breakdown.blended;
        if similarity > 0.3 {
            feedback.push_str(&format!(
                " (Your answer was close: {:.0}% similar)",
                similarity * 100.0
            ));
        }
        feedback
    }
}

/// Scores free-text answers against expected answers.
#[derive(Debug, Clone, Default)]
pub struct AnswerEvaluator {
    config: EvaluationConfig,
}

impl AnswerEvaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EvaluationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Evaluate against the configured threshold.
    pub fn evaluate(&self, expected: &str, candidate: &str) -> EvaluationResult {
        self.evaluate_with_threshold(expected, candidate, self.config.threshold)
    }

    /// Score `candidate` against `expected`; it passes when `score >= threshold`.
    ///
    /// The score blends sequence similarity and keyword overlap, then is
    /// raised to the containment floor when one normalized answer contains
    /// the other, or to the key-phrase floor when the candidate reproduces a
    /// key phrase. A blank candidate always scores 0.
    pub fn evaluate_with_threshold(
        &self,
        expected: &str,
        candidate: &str,
        threshold: f64,
    ) -> EvaluationResult {
        let expected_text = expected.trim().to_string();
        let verdict = |score: f64, breakdown: SignalBreakdown| EvaluationResult {
            score,
            passed: score >= threshold,
            threshold,
            expected: expected_text.clone(),
            breakdown,
        };

        let expected_norm = tokenizer::normalize(expected);
        let candidate_norm = tokenizer::normalize(candidate);

        if candidate.trim().is_empty() {
            return EvaluationResult {
                passed: false,
                ..verdict(0.0, empty_breakdown())
            };
        }
        if expected_norm.is_empty() || candidate_norm.is_empty() {
            // Nothing but punctuation on one side: only an exact match counts.
            let same = expected.trim().to_lowercase() == candidate.trim().to_lowercase();
            let score = if same { 1.0 } else { 0.0 };
            return verdict(
                score,
                SignalBreakdown {
                    sequence_ratio: score,
                    blended: score,
                    ..empty_breakdown()
                },
            );
        }

        let ratio = sequence_ratio(&expected_norm, &candidate_norm);
        let overlap = jaccard(
            &tokenizer::keywords(expected),
            &tokenizer::keywords(candidate),
        );
        let blended = match overlap {
            Some(overlap) => {
                let weights = self.config.sequence_weight + self.config.keyword_weight;
                (self.config.sequence_weight * ratio + self.config.keyword_weight * overlap)
                    / weights
            }
            None => ratio,
        };

        let containment = if candidate_norm.contains(&expected_norm) {
            Containment::CandidateContainsExpected
        } else if expected_norm.contains(&candidate_norm)
            && candidate_norm.chars().count() as f64
                > expected_norm.chars().count() as f64 * self.config.containment_min_ratio
        {
            Containment::ExpectedContainsCandidate
        } else {
            Containment::None
        };
        let key_phrase = has_key_phrase(expected, candidate);

        let mut score = blended;
        if containment != Containment::None {
            score = score.max(self.config.containment_floor);
        }
        if key_phrase {
            score = score.max(self.config.key_phrase_floor);
        }
        let score = score.clamp(0.0, 1.0);

        debug!(score, ratio, ?overlap, key_phrase, ?containment, "evaluated answer");
        verdict(
            score,
            SignalBreakdown {
                sequence_ratio: ratio,
                keyword_overlap: overlap,
                blended,
                key_phrase,
                containment,
            },
        )
    }
}

fn empty_breakdown() -> SignalBreakdown {
    SignalBreakdown {
        sequence_ratio: 0.0,
        keyword_overlap: None,
        blended: 0.0,
        key_phrase: false,
        containment: Containment::None,
    }
}
