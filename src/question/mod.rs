//! Question synthesis.
//!
//! Sentences are turned into question/answer pairs by an ordered table of
//! pattern strategies ([`strategies::STRATEGIES`]); [`QuestionGenerator`]
//! picks candidate sentences from the relevance index and runs the table
//! over them until enough distinct questions exist.

mod generator;
pub mod strategies;

pub use generator::QuestionGenerator;

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which transformation produced a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// "X is Y" → "What is X?"
    Definition,
    /// "X is led by Y" → "Who is X led by?"
    Role,
    /// "X lasts 2 weeks" → "How long is X?"
    Quantity,
    /// A key noun phrase replaced by a blank.
    FillInBlank,
    /// "X manages Y" → "What does X do?"
    Comprehension,
    /// "X includes Y" → "What are the components or types of X?"
    Components,
    /// "X is used for Y" → "What is the purpose of X?"
    Purpose,
    /// "X is Y" anywhere in the sentence.
    LenientDefinition,
    /// "Explain: X" for a prominent term.
    Explanation,
}

impl Strategy {
    /// Short lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Definition => "definition",
            Strategy::Role => "role",
            Strategy::Quantity => "quantity",
            Strategy::FillInBlank => "fill_in_blank",
            Strategy::Comprehension => "comprehension",
            Strategy::Components => "components",
            Strategy::Purpose => "purpose",
            Strategy::LenientDefinition => "lenient_definition",
            Strategy::Explanation => "explanation",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated question with its expected answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct QuestionRecord {
    /// Question text shown to the user.
    pub question: String,
    /// Expected answer, taken from the source sentence.
    pub answer: String,
    /// Strategy that produced the question.
    pub strategy: Strategy,
    /// Load-bearing terms of the sentence.
    pub key_terms: Vec<String>,
    /// Position of the source sentence in the document.
    pub source_position: usize,
    /// Source sentence text.
    pub source_text: String,
    /// Section the source sentence belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
}

/// Outcome of a generation request.
///
/// Sparse material can yield fewer questions than requested; that is
/// reported through [`QuestionBatch::is_partial`] rather than as an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionBatch {
    /// Topic the questions were generated for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Number of questions asked for.
    pub requested: usize,
    /// Generated questions, in ranking order.
    pub questions: Vec<QuestionRecord>,
}

impl QuestionBatch {
    /// Whether fewer questions were produced than requested.
    pub fn is_partial(&self) -> bool {
        self.questions.len() < self.requested
    }

    /// Number of generated questions.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether no question was produced.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Key used to detect duplicate questions: lowercase, single-spaced.
pub(crate) fn question_key(question: &str) -> String {
    question
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_key_normalizes_case_and_spacing() {
        assert_eq!(question_key("What is  Scrum?"), question_key("what is scrum?"));
        assert_ne!(question_key("What is Scrum?"), question_key("What is Kanban?"));
    }

    #[test]
    fn test_partial_batch() {
        let batch = QuestionBatch {
            topic: Some("scrum".to_string()),
            requested: 3,
            questions: Vec::new(),
        };
        assert!(batch.is_partial());
        assert!(batch.is_empty());

        let complete = QuestionBatch::default();
        assert!(!complete.is_partial());
    }

    #[test]
    fn test_strategy_serializes_snake_case() {
        let json = serde_json::to_string(&Strategy::FillInBlank).unwrap();
        assert_eq!(json, "\"fill_in_blank\"");
        assert_eq!(Strategy::LenientDefinition.to_string(), "lenient_definition");
    }
}
