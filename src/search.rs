//! Sentence retrieval over a [`RelevanceIndex`].
//!
//! Two lookups are provided: ranked top-k search by cosine similarity, and
//! `best_definition`, which prefers a sentence shaped like "term is/are/refers
//! to ..." among the top hits.

use crate::document::{Sentence, phrase_pattern, phrase_regex};
use crate::error::{QuizError, Result};
use crate::indexer::RelevanceIndex;
use regex::{Regex, RegexBuilder};
use tracing::{debug, instrument};

/// A ranked sentence.
#[derive(Debug, Clone, Copy)]
pub struct SearchResult<'d> {
    /// The matched sentence.
    pub sentence: &'d Sentence,
    /// Cosine similarity with the query, in (0, 1].
    pub score: f64,
}

impl SearchResult<'_> {
    /// Position of the sentence in the document.
    pub fn position(&self) -> usize {
        self.sentence.position
    }
}

/// How a sentence defines the looked-up term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefinitionMatch {
    /// "term is/are/refers to/means/denotes <remainder>"
    Defines {
        connective: String,
        remainder: String,
    },
    /// "term, also known as <alias>" with no definition after it.
    AlsoKnownAs(String),
}

/// Result of a definition lookup.
#[derive(Debug, Clone)]
pub struct Definition<'d> {
    /// The selected sentence.
    pub sentence: &'d Sentence,
    /// Similarity of the sentence with the term.
    pub score: f64,
    /// The defining pattern, if the sentence has one.
    pub matched: Option<DefinitionMatch>,
}

/// Regexes matching definitional shapes for one term.
struct DefinitionPatterns {
    aka_defines: Regex,
    defines: Regex,
    aka: Regex,
}

impl DefinitionPatterns {
    fn new(term: &str) -> Option<Self> {
        let term = phrase_pattern(term)?;

        let build = |pattern: String| {
            RegexBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .ok()
        };

        Some(Self {
            aka_defines: build(format!(
                r"{term}\s*,\s*also\s+known\s+as\s+[^,]+,\s*(is|are)\s+(.{{10,}})"
            ))?,
            defines: build(format!(
                r"{term}\s+(is|are|refers\s+to|means|denotes)\s+(.{{10,}})"
            ))?,
            aka: build(format!(r"{term}\s*,\s*also\s+known\s+as\s+([^,.;]+)"))?,
        })
    }

    fn find(&self, text: &str) -> Option<DefinitionMatch> {
        for re in [&self.aka_defines, &self.defines] {
            if let Some(caps) = re.captures(text) {
                let remainder = caps[2].trim().trim_end_matches(['.', '!', '?']).trim();
                if !remainder.is_empty() {
                    return Some(DefinitionMatch::Defines {
                        connective: caps[1].split_whitespace().collect::<Vec<_>>().join(" "),
                        remainder: remainder.to_string(),
                    });
                }
            }
        }

        self.aka
            .captures(text)
            .map(|caps| DefinitionMatch::AlsoKnownAs(caps[1].trim().to_string()))
            .filter(|m| !matches!(m, DefinitionMatch::AlsoKnownAs(alias) if alias.is_empty()))
    }
}

impl<'d> RelevanceIndex<'d> {
    /// Top-`k` sentences by cosine similarity with `query`.
    ///
    /// Only sentences scoring above the configured minimum (0 by default) are
    /// returned, so fewer than `k` results is normal. Equal scores keep
    /// document order.
    #[instrument(skip_all, fields(query = %query, k = k))]
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<SearchResult<'d>>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(QuizError::EmptyQuery);
        }
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_vector = self.vectorize(query);
        if query_vector.is_empty() {
            debug!(query, "no query term occurs in the document");
            return Ok(Vec::new());
        }

        let document = self.document;
        let mut results: Vec<SearchResult<'d>> = document
            .sentences()
            .iter()
            .zip(&self.vectors)
            .filter_map(|(sentence, vector)| {
                let score = query_vector.cosine(vector);
                (score > self.config.min_similarity).then_some(SearchResult { sentence, score })
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.position().cmp(&b.position()))
        });
        results.truncate(k);

        debug!(query, hits = results.len(), "search complete");
        Ok(results)
    }

    /// Best sentence defining `term`.
    ///
    /// Selection order:
    /// 1. the highest-ranked candidate with a definitional shape,
    /// 2. the highest-ranked candidate containing the term verbatim,
    /// 3. the first sentence in the document containing the term verbatim
    ///    (definitional ones first),
    /// 4. the top-ranked candidate.
    pub fn best_definition(&self, term: &str) -> Result<Definition<'d>> {
        let term = term.trim();
        if term.is_empty() {
            return Err(QuizError::EmptyQuery);
        }

        let candidates = self.search(term, self.config.definition_candidates)?;
        let patterns = DefinitionPatterns::new(term);
        let shape = |sentence: &Sentence| patterns.as_ref().and_then(|p| p.find(&sentence.text));
        let phrase = phrase_regex(term);
        let mentions =
            |sentence: &Sentence| phrase.as_ref().is_some_and(|re| re.is_match(&sentence.text));

        for hit in &candidates {
            if let Some(matched) = shape(hit.sentence) {
                debug!(term, position = hit.position(), "definition pattern matched");
                return Ok(Definition {
                    sentence: hit.sentence,
                    score: hit.score,
                    matched: Some(matched),
                });
            }
        }

        if let Some(hit) = candidates.iter().find(|hit| mentions(hit.sentence)) {
            return Ok(Definition {
                sentence: hit.sentence,
                score: hit.score,
                matched: None,
            });
        }

        let query_vector = self.vectorize(term);
        let literal: Vec<&'d Sentence> = self
            .document
            .sentences()
            .iter()
            .filter(|s| mentions(s))
            .collect();
        let literal_pick = literal
            .iter()
            .find_map(|s| shape(*s).map(|m| (*s, Some(m))))
            .or_else(|| literal.first().map(|s| (*s, None)));

        if let Some((sentence, matched)) = literal_pick {
            let score = query_vector.cosine(&self.vectors[sentence.position]);
            return Ok(Definition {
                sentence,
                score,
                matched,
            });
        }

        candidates
            .first()
            .map(|hit| Definition {
                sentence: hit.sentence,
                score: hit.score,
                matched: None,
            })
            .ok_or_else(|| QuizError::NotFound(term.to_string()))
    }
}
