//! Direct answers to "what is X" style questions.
//!
//! The query is reduced to its term, the index picks the sentence that best
//! defines it, and only the part after the defining connective is returned.

use crate::error::{QuizError, Result};
use crate::indexer::RelevanceIndex;
use crate::question::strategies::cut_at_word;
use crate::search::DefinitionMatch;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

const MAX_DEFINITION_CHARS: usize = 150;
const MAX_SENTENCE_CHARS: usize = 200;

static LEADING_SCAFFOLD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?i)(?:what's|whats|what|who|which|define|describe|explain|tell\s+me\s+about|meaning\s+of|definition\s+of|is|are|was|were|does|do|the|a|an)(?:\s+|$)",
    )
    .expect("valid scaffold regex")
});
static TRAILING_SCAFFOLD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+(?:means?|stands\s+for)$").expect("valid trailing scaffold regex")
});

/// How much the answer can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Taken from a sentence that defines the term.
    Definition,
    /// No defining sentence; the closest sentence is returned whole.
    LowConfidence,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Definition => f.write_str("definition"),
            Confidence::LowConfidence => f.write_str("low confidence"),
        }
    }
}

/// A concise answer with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectAnswer {
    /// The term extracted from the query.
    pub term: String,
    pub text: String,
    pub confidence: Confidence,
    /// Position of the sentence the answer came from.
    pub source_position: usize,
}

/// Answers definition questions from an indexed document.
pub struct DirectAnswerExtractor<'i, 'd> {
    index: &'i RelevanceIndex<'d>,
}

impl<'i, 'd> DirectAnswerExtractor<'i, 'd> {
    pub fn new(index: &'i RelevanceIndex<'d>) -> Self {
        Self { index }
    }

    /// Answer a query such as "What is narrow AI?".
    ///
    /// Fails with [`QuizError::EmptyQuery`] when nothing but scaffolding is
    /// left, and [`QuizError::NotFound`] when no sentence is relevant.
    pub fn answer(&self, query: &str) -> Result<DirectAnswer> {
        let term = query_term(query);
        if term.is_empty() {
            return Err(QuizError::EmptyQuery);
        }

        let definition = self.index.best_definition(&term)?;
        let (text, confidence) = match definition.matched {
            Some(DefinitionMatch::Defines { remainder, .. }) => (
                cut_at_word(&remainder, MAX_DEFINITION_CHARS).to_string(),
                Confidence::Definition,
            ),
            Some(DefinitionMatch::AlsoKnownAs(alias)) => {
                (format!("Also known as {alias}"), Confidence::Definition)
            }
            None => (
                cut_at_word(&definition.sentence.text, MAX_SENTENCE_CHARS).to_string(),
                Confidence::LowConfidence,
            ),
        };

        debug!(%term, %confidence, position = definition.sentence.position, "answered query");
        Ok(DirectAnswer {
            term,
            text,
            confidence,
            source_position: definition.sentence.position,
        })
    }
}

/// Strip question scaffolding ("what is", "the", trailing "?") from a query.
pub fn query_term(query: &str) -> String {
    let mut term = query
        .trim()
        .trim_end_matches(['?', '!', '.', ',', ';', ':'])
        .trim()
        .to_string();

    loop {
        let Some(m) = LEADING_SCAFFOLD.find(&term) else {
            break;
        };
        term = term[m.end()..].trim_start().to_string();
    }
    if let Some(m) = TRAILING_SCAFFOLD.find(&term) {
        term.truncate(m.start());
    }

    term.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn lecture() -> Document {
        Document::from_sentences(
            "ai",
            vec![
                ("Artificial intelligence covers many techniques.", None),
                ("Narrow AI is designed to perform specific tasks.", None),
                ("General AI would match human reasoning across domains.", None),
                ("Machine learning, also known as ML, is a subset of AI.", None),
                ("Reinforcement learning, also known as trial-and-error learning, shines in games.", None),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_query_term() {
        assert_eq!(query_term("what is narrow ai"), "narrow ai");
        assert_eq!(query_term("What are the Scrum artifacts?"), "Scrum artifacts");
        assert_eq!(query_term("What does overfitting mean?"), "overfitting");
        assert_eq!(query_term("define a sprint"), "sprint");
        assert_eq!(query_term("Kanban"), "Kanban");
        assert_eq!(query_term("what is?"), "");
    }

    #[test]
    fn test_answer_returns_remainder() {
        let doc = lecture();
        let index = RelevanceIndex::build(&doc).unwrap();
        let answer = DirectAnswerExtractor::new(&index)
            .answer("what is narrow ai")
            .unwrap();

        assert_eq!(answer.text, "designed to perform specific tasks");
        assert_eq!(answer.confidence, Confidence::Definition);
        assert_eq!(answer.source_position, 1);
        assert_eq!(answer.term, "narrow ai");
    }

    #[test]
    fn test_answer_skips_alias() {
        let doc = lecture();
        let index = RelevanceIndex::build(&doc).unwrap();
        let answer = DirectAnswerExtractor::new(&index)
            .answer("What is machine learning?")
            .unwrap();
        assert_eq!(answer.text, "a subset of AI");
    }

    #[test]
    fn test_answer_alias_only() {
        let doc = lecture();
        let index = RelevanceIndex::build(&doc).unwrap();
        let answer = DirectAnswerExtractor::new(&index)
            .answer("what is reinforcement learning")
            .unwrap();
        assert_eq!(answer.text, "Also known as trial-and-error learning");
        assert_eq!(answer.confidence, Confidence::Definition);
    }

    #[test]
    fn test_answer_low_confidence_fallback() {
        let doc = lecture();
        let index = RelevanceIndex::build(&doc).unwrap();
        let answer = DirectAnswerExtractor::new(&index)
            .answer("what is human reasoning")
            .unwrap();
        assert_eq!(answer.confidence, Confidence::LowConfidence);
        assert_eq!(answer.text, "General AI would match human reasoning across domains.");
    }

    #[test]
    fn test_answer_errors() {
        let doc = lecture();
        let index = RelevanceIndex::build(&doc).unwrap();
        let extractor = DirectAnswerExtractor::new(&index);

        assert!(matches!(extractor.answer("what is?"), Err(QuizError::EmptyQuery)));
        assert!(matches!(
            extractor.answer("what is photosynthesis"),
            Err(QuizError::NotFound(_))
        ));
    }

    #[test]
    fn test_answer_term_inside_other_word_is_not_found() {
        let doc = Document::from_sentences(
            "agile",
            vec![
                ("Teams start each sprint with a planning meeting.", None),
                ("Kanban is a visual method for managing flow.", None),
            ],
        )
        .unwrap();
        let index = RelevanceIndex::build(&doc).unwrap();

        let result = DirectAnswerExtractor::new(&index).answer("what is art");
        assert!(matches!(result, Err(QuizError::NotFound(_))));
    }
}
