//! Relevance index - TF-IDF sentence vectors over a document.
//!
//! The index is built once per loaded document and is read-only afterwards,
//! so it can be shared by reference across searches, quiz generation and
//! direct answers.
//!
//! Weighting follows the smoothed scheme used by common vectorizers:
//!
//! ```text
//! idf(t)   = ln((1 + n) / (1 + df(t))) + 1
//! w(t, s)  = tf(t, s) * idf(t), then L2-normalized per sentence
//! ```
//!
//! Because every stored vector has unit length, cosine similarity against a
//! normalized query vector is a plain dot product.

use crate::config::RetrievalConfig;
use crate::document::Document;
use crate::error::{QuizError, Result};
use crate::tokenizer;
use std::collections::{BTreeMap, HashMap};
use tracing::{info, instrument};

/// Document frequency of every term, computed once per document.
#[derive(Debug, Clone, Default)]
pub struct TermStatistics {
    document_frequency: HashMap<String, usize>,
    sentence_count: usize,
}

impl TermStatistics {
    /// Number of sentences containing `term`.
    pub fn document_frequency(&self, term: &str) -> usize {
        self.document_frequency.get(term).copied().unwrap_or(0)
    }

    /// Smoothed inverse document frequency; `None` for terms never seen.
    pub fn idf(&self, term: &str) -> Option<f64> {
        let df = *self.document_frequency.get(term)?;
        let n = self.sentence_count as f64;
        Some(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
    }

    /// Number of distinct terms.
    pub fn vocabulary_size(&self) -> usize {
        self.document_frequency.len()
    }
}

/// Unit-length TF-IDF weights for one sentence. Absent terms weigh zero.
///
/// Terms are kept sorted so similarity sums run in a fixed order and equal
/// inputs always produce bit-identical scores.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SentenceVector {
    weights: BTreeMap<String, f64>,
}

impl SentenceVector {
    /// Weight a bag of terms against the statistics. Unknown terms are dropped.
    fn from_terms(terms: &[String], stats: &TermStatistics) -> Self {
        let mut tf: HashMap<&str, usize> = HashMap::new();
        for term in terms {
            *tf.entry(term.as_str()).or_insert(0) += 1;
        }

        let mut weights: BTreeMap<String, f64> = tf
            .into_iter()
            .filter_map(|(term, count)| {
                stats
                    .idf(term)
                    .map(|idf| (term.to_string(), count as f64 * idf))
            })
            .collect();

        let norm = weights.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for weight in weights.values_mut() {
                *weight /= norm;
            }
        }

        Self { weights }
    }

    /// Weight of a term (0 when absent).
    pub fn weight(&self, term: &str) -> f64 {
        self.weights.get(term).copied().unwrap_or(0.0)
    }

    /// Whether no term carries weight.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Number of weighted terms.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Cosine similarity with another unit vector, summed over this
    /// vector's terms.
    pub fn cosine(&self, other: &SentenceVector) -> f64 {
        self.weights
            .iter()
            .map(|(term, w)| w * other.weight(term))
            .sum()
    }
}

/// Searchable index over a document's sentences.
pub struct RelevanceIndex<'d> {
    pub(crate) document: &'d Document,
    pub(crate) stats: TermStatistics,
    pub(crate) vectors: Vec<SentenceVector>,
    pub(crate) config: RetrievalConfig,
}

impl<'d> RelevanceIndex<'d> {
    /// Build with default retrieval settings.
    pub fn build(document: &'d Document) -> Result<Self> {
        Self::build_with_config(document, RetrievalConfig::default())
    }

    /// Compute term statistics and sentence vectors for every sentence.
    #[instrument(skip_all, fields(document = %document.name, sentences = document.len()))]
    pub fn build_with_config(document: &'d Document, config: RetrievalConfig) -> Result<Self> {
        if document.is_empty() {
            return Err(QuizError::EmptyDocument(document.name.clone()));
        }

        let sentence_terms: Vec<Vec<String>> = document
            .sentences()
            .iter()
            .map(|s| tokenizer::terms(&s.text, config.use_bigrams))
            .collect();

        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        for terms in &sentence_terms {
            let mut unique: Vec<&String> = terms.iter().collect();
            unique.sort();
            unique.dedup();
            for term in unique {
                *document_frequency.entry(term.clone()).or_insert(0) += 1;
            }
        }

        let stats = TermStatistics {
            document_frequency,
            sentence_count: document.len(),
        };

        let vectors: Vec<SentenceVector> = sentence_terms
            .iter()
            .map(|terms| SentenceVector::from_terms(terms, &stats))
            .collect();

        info!(
            vocabulary = stats.vocabulary_size(),
            "built relevance index"
        );

        Ok(Self {
            document,
            stats,
            vectors,
            config,
        })
    }

    /// Build a query vector using the corpus IDF weights.
    pub fn vectorize(&self, text: &str) -> SentenceVector {
        let terms = tokenizer::terms(text, self.config.use_bigrams);
        SentenceVector::from_terms(&terms, &self.stats)
    }

    /// The indexed document.
    pub fn document(&self) -> &'d Document {
        self.document
    }

    /// Term statistics of the document.
    pub fn stats(&self) -> &TermStatistics {
        &self.stats
    }

    /// Vector of the sentence at `position`.
    pub fn vector(&self, position: usize) -> Option<&SentenceVector> {
        self.vectors.get(position)
    }

    /// Retrieval settings in use.
    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::from_sentences(
            "notes",
            vec![
                ("Scrum is an agile framework for teams.", None),
                ("Kanban is a visual method for managing work.", None),
                ("Scrum teams work in sprints.", None),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_document_frequency() {
        let doc = doc();
        let index = RelevanceIndex::build(&doc).unwrap();
        assert_eq!(index.stats().document_frequency("scrum"), 2);
        assert_eq!(index.stats().document_frequency("kanban"), 1);
        assert_eq!(index.stats().document_frequency("missing"), 0);
    }

    #[test]
    fn test_rarer_terms_weigh_more() {
        let doc = doc();
        let index = RelevanceIndex::build(&doc).unwrap();
        let idf_scrum = index.stats().idf("scrum").unwrap();
        let idf_kanban = index.stats().idf("kanban").unwrap();
        assert!(idf_kanban > idf_scrum);
        assert!(index.stats().idf("missing").is_none());
    }

    #[test]
    fn test_vectors_are_unit_length_and_non_negative() {
        let doc = doc();
        let index = RelevanceIndex::build(&doc).unwrap();
        for position in 0..doc.len() {
            let vector = index.vector(position).unwrap();
            let norm: f64 = vector.weights.values().map(|w| w * w).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
            assert!(vector.weights.values().all(|w| w.is_finite() && *w >= 0.0));
        }
    }

    #[test]
    fn test_unseen_query_terms_have_no_weight() {
        let doc = doc();
        let index = RelevanceIndex::build(&doc).unwrap();
        assert!(index.vectorize("quantum chromodynamics").is_empty());
        assert!(!index.vectorize("scrum quantum").is_empty());
    }

    #[test]
    fn test_cosine_of_self_is_one() {
        let doc = doc();
        let index = RelevanceIndex::build(&doc).unwrap();
        let v = index.vector(0).unwrap();
        assert!((v.cosine(v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_stopword_only_sentence_has_empty_vector() {
        let doc = Document::from_sentences(
            "notes",
            vec![("It is what it is.", None), ("Scrum uses sprints.", None)],
        )
        .unwrap();
        let index = RelevanceIndex::build(&doc).unwrap();
        assert!(index.vector(0).unwrap().is_empty());
        assert_eq!(index.vector(0).unwrap().len(), 0);
    }
}
