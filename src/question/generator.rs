use super::strategies::{self, BLANK, Draft, STRATEGIES};
use super::{QuestionBatch, QuestionRecord, Strategy, question_key};
use crate::config::GenerationConfig;
use crate::document::Sentence;
use crate::error::{QuizError, Result};
use crate::indexer::RelevanceIndex;
use crate::tokenizer::{self, PosTag};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// Questions must be longer than this many characters.
const MIN_QUESTION_CHARS: usize = 10;
/// Answers must be longer than this many characters.
const MIN_ANSWER_CHARS: usize = 5;

/// Builds quizzes from the sentences of an indexed document.
pub struct QuestionGenerator<'i, 'd> {
    index: &'i RelevanceIndex<'d>,
    config: GenerationConfig,
}

/// Questions picked so far, plus what has already been looked at.
#[derive(Default)]
struct Selection {
    records: Vec<QuestionRecord>,
    seen_questions: HashSet<String>,
    used_positions: HashSet<usize>,
    tried_positions: HashSet<usize>,
}

impl<'i, 'd> QuestionGenerator<'i, 'd> {
    /// Generator with default settings.
    pub fn new(index: &'i RelevanceIndex<'d>) -> Self {
        Self::with_config(index, GenerationConfig::default())
    }

    pub fn with_config(index: &'i RelevanceIndex<'d>, config: GenerationConfig) -> Self {
        Self { index, config }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Generate up to `count` distinct questions.
    ///
    /// With a topic, candidates are the top `count × oversample_factor`
    /// sentences by relevance; if they run dry, one more pass covers every
    /// relevant sentence not yet tried, under the lenient filter. Without a
    /// topic, every sentence is a candidate in shuffled order and there is no
    /// second pass. A batch shorter than `count` is returned as-is (see
    /// [`QuestionBatch::is_partial`]).
    #[instrument(skip(self), fields(document = %self.index.document().name))]
    pub fn generate(&self, topic: Option<&str>, count: usize) -> Result<QuestionBatch> {
        let topic = match topic.map(str::trim) {
            Some("") => return Err(QuizError::EmptyQuery),
            other => other,
        };

        let mut batch = QuestionBatch {
            topic: topic.map(str::to_string),
            requested: count,
            questions: Vec::new(),
        };
        if count == 0 {
            return Ok(batch);
        }

        let oversampled = count.saturating_mul(self.config.oversample_factor.max(1));
        let pool = self.candidate_pool(topic, oversampled)?;
        let mut selection = Selection::default();
        self.collect(&mut selection, &self.admit(&pool, count), count);

        // A topic-less pool already spans the whole document.
        if topic.is_some() && selection.records.len() < count {
            let widened: Vec<&'d Sentence> = self
                .candidate_pool(topic, self.index.document().len())?
                .into_iter()
                .filter(|s| !selection.tried_positions.contains(&s.position) && is_lenient_candidate(s))
                .collect();
            debug!(
                have = selection.records.len(),
                extra_candidates = widened.len(),
                "widening candidate pool"
            );
            self.collect(&mut selection, &widened, count);
        }

        batch.questions = selection.records;
        if batch.is_partial() {
            warn!(
                requested = count,
                generated = batch.len(),
                "not enough material for the requested number of questions"
            );
        } else {
            info!(generated = batch.len(), "generated quiz");
        }
        Ok(batch)
    }

    /// First strategy result for `sentence` that survives clean-up.
    pub fn synthesize(&self, sentence: &Sentence) -> Option<QuestionRecord> {
        let text = sentence
            .text
            .trim()
            .trim_end_matches(['.', '!', '?'])
            .trim_end();

        STRATEGIES.iter().find_map(|(strategy, apply)| {
            let draft = apply(text)?;
            self.finish(*strategy, draft, sentence)
        })
    }

    fn candidate_pool(&self, topic: Option<&str>, k: usize) -> Result<Vec<&'d Sentence>> {
        match topic {
            Some(topic) => {
                let hits = self.index.search(topic, k)?;
                if hits.is_empty() {
                    return Err(QuizError::NotFound(topic.to_string()));
                }
                Ok(hits.into_iter().map(|hit| hit.sentence).collect())
            }
            None => {
                let mut all: Vec<&'d Sentence> = self.index.document().sentences().iter().collect();
                let mut rng = match self.config.seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                all.shuffle(&mut rng);
                Ok(all)
            }
        }
    }

    /// Strict sentence filter, relaxed when it leaves too few candidates.
    fn admit(&self, pool: &[&'d Sentence], count: usize) -> Vec<&'d Sentence> {
        let strict: Vec<&'d Sentence> = pool
            .iter()
            .copied()
            .filter(|s| is_strict_candidate(s))
            .collect();
        if strict.len() >= count.saturating_mul(2) {
            return strict;
        }

        debug!(strict = strict.len(), "using lenient sentence filter");
        pool.iter()
            .copied()
            .filter(|s| is_lenient_candidate(s))
            .collect()
    }

    fn collect(&self, selection: &mut Selection, candidates: &[&'d Sentence], count: usize) {
        for sentence in candidates {
            if selection.records.len() >= count {
                break;
            }
            if !selection.tried_positions.insert(sentence.position)
                || selection.used_positions.contains(&sentence.position)
            {
                continue;
            }

            let Some(record) = self.synthesize(sentence) else {
                continue;
            };
            if selection.seen_questions.insert(question_key(&record.question)) {
                selection.used_positions.insert(sentence.position);
                selection.records.push(record);
            } else {
                debug!(question = %record.question, "skipping duplicate question");
            }
        }
    }

    fn finish(&self, strategy: Strategy, draft: Draft, sentence: &Sentence) -> Option<QuestionRecord> {
        let answer = collapse_whitespace(
            draft
                .answer
                .trim()
                .trim_end_matches(['.', '!', '?', ',', ';', ':']),
        );
        let answer = strategies::cut_at_word(&answer, self.config.max_answer_chars).to_string();

        let question = collapse_whitespace(&draft.question);
        let question = strategies::cut_at_word(&question, self.config.max_question_chars).to_string();

        if strategy == Strategy::FillInBlank && !question.contains(BLANK) {
            return None;
        }
        if question.chars().count() <= MIN_QUESTION_CHARS
            || answer.chars().count() <= MIN_ANSWER_CHARS
        {
            return None;
        }

        let mut key_terms: Vec<String> = Vec::new();
        for term in draft.key_terms {
            let term = term.trim().to_string();
            if !term.is_empty() && !key_terms.contains(&term) {
                key_terms.push(term);
            }
        }

        Some(QuestionRecord {
            question,
            answer,
            strategy,
            key_terms,
            source_position: sentence.position,
            source_text: sentence.text.clone(),
            section: sentence.section.clone(),
        })
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn starts_uppercase(text: &str) -> bool {
    text.chars().next().is_some_and(char::is_uppercase)
}

/// Sentences that read like complete statements.
fn is_strict_candidate(sentence: &Sentence) -> bool {
    let text = sentence.text.trim();
    let words = text.split_whitespace().count();

    text.chars().count() >= 20
        && starts_uppercase(text)
        && text.matches(',').count() <= 8
        && words >= 5
        && (words >= 10 || tokenizer::tag(text).iter().any(|t| t.tag == PosTag::Verb))
}

fn is_lenient_candidate(sentence: &Sentence) -> bool {
    let text = sentence.text.trim();
    text.chars().count() > 20 && starts_uppercase(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn lecture() -> Document {
        Document::from_sentences(
            "scrum",
            vec![
                ("Scrum is an agile framework for managing complex product work.", None),
                ("A sprint in Scrum is typically 2 weeks long.", None),
                ("The daily Scrum is facilitated by the Scrum Master.", None),
                ("The Product Owner is responsible for the Scrum product backlog.", None),
                ("Scrum includes three roles, five events and three artifacts.", None),
                ("The sprint retrospective in Scrum is used for improving the way the team works.", None),
                ("Kanban is a visual method for managing flow of work.", None),
                ("Narrow AI is designed to perform specific tasks.", None),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_generate_on_topic() {
        let doc = lecture();
        let index = RelevanceIndex::build(&doc).unwrap();
        let batch = QuestionGenerator::new(&index).generate(Some("scrum"), 5).unwrap();

        assert_eq!(batch.len(), 5);
        assert!(!batch.is_partial());
        assert_eq!(batch.topic.as_deref(), Some("scrum"));

        let keys: HashSet<String> = batch.questions.iter().map(|q| question_key(&q.question)).collect();
        assert_eq!(keys.len(), 5);
        let positions: HashSet<usize> = batch.questions.iter().map(|q| q.source_position).collect();
        assert_eq!(positions.len(), 5);

        for record in &batch.questions {
            assert!(record.question.chars().count() > MIN_QUESTION_CHARS);
            assert!(record.answer.chars().count() > MIN_ANSWER_CHARS);
            assert!(record.source_text.contains(&record.answer), "{record:?}");
            assert!(record.source_text.to_lowercase().contains("scrum"));
        }
    }

    #[test]
    fn test_generate_expected_shapes() {
        let doc = lecture();
        let index = RelevanceIndex::build(&doc).unwrap();
        let batch = QuestionGenerator::new(&index).generate(Some("scrum"), 6).unwrap();
        assert_eq!(batch.len(), 6);

        let find = |q: &str| batch.questions.iter().find(|r| r.question == q);
        let definition = find("What is Scrum?").unwrap();
        assert_eq!(definition.strategy, Strategy::Definition);
        assert_eq!(definition.answer, "an agile framework for managing complex product work");

        let role = find("Who is the daily Scrum facilitated by?").unwrap();
        assert_eq!(role.answer, "Scrum Master");

        let quantity = find("How long is a sprint in Scrum?").unwrap();
        assert_eq!(quantity.answer, "2 weeks");
    }

    #[test]
    fn test_generate_partial_when_material_is_sparse() {
        let doc = lecture();
        let index = RelevanceIndex::build(&doc).unwrap();
        let batch = QuestionGenerator::new(&index).generate(Some("kanban"), 3).unwrap();

        assert!(batch.is_partial());
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.questions[0].question, "What is Kanban?");
    }

    #[test]
    fn test_generate_skips_duplicate_questions() {
        let doc = Document::from_sentences(
            "dupes",
            vec![
                ("Scrum is an agile framework for teams.", None),
                ("Scrum is an agile framework for teams.", None),
            ],
        )
        .unwrap();
        let index = RelevanceIndex::build(&doc).unwrap();
        let batch = QuestionGenerator::new(&index).generate(Some("scrum"), 2).unwrap();

        assert_eq!(batch.len(), 1);
        assert!(batch.is_partial());
    }

    #[test]
    fn test_generate_widens_past_oversampled_pool() {
        let doc = Document::from_sentences(
            "widen",
            vec![
                ("Scrum is an agile framework for Scrum teams.", None),
                ("Scrum is an agile framework for Scrum teams.", None),
                ("A sprint in Scrum is typically 2 weeks long.", None),
            ],
        )
        .unwrap();
        let index = RelevanceIndex::build(&doc).unwrap();
        let config = GenerationConfig {
            oversample_factor: 1,
            ..GenerationConfig::default()
        };
        let batch = QuestionGenerator::with_config(&index, config)
            .generate(Some("scrum"), 2)
            .unwrap();

        assert_eq!(batch.len(), 2);
        assert!(!batch.is_partial());
        assert_eq!(batch.questions[0].question, "What is Scrum?");
        assert_eq!(batch.questions[1].source_position, 2);
        assert_eq!(batch.questions[1].answer, "2 weeks");
    }

    #[test]
    fn test_generate_errors_and_zero() {
        let doc = lecture();
        let index = RelevanceIndex::build(&doc).unwrap();
        let generator = QuestionGenerator::new(&index);

        assert!(matches!(
            generator.generate(Some("photosynthesis"), 3),
            Err(QuizError::NotFound(_))
        ));
        assert!(matches!(
            generator.generate(Some("   "), 3),
            Err(QuizError::EmptyQuery)
        ));

        let empty = generator.generate(Some("scrum"), 0).unwrap();
        assert!(empty.is_empty());
        assert!(!empty.is_partial());
    }

    #[test]
    fn test_generate_without_topic_is_seeded() {
        let doc = lecture();
        let index = RelevanceIndex::build(&doc).unwrap();
        let config = GenerationConfig {
            seed: Some(7),
            ..GenerationConfig::default()
        };
        let generator = QuestionGenerator::with_config(&index, config);

        let first = generator.generate(None, 3).unwrap();
        let second = generator.generate(None, 3).unwrap();
        assert_eq!(first.len(), 3);
        assert!(first.topic.is_none());
        assert_eq!(first.questions, second.questions);
    }

    #[test]
    fn test_answers_respect_length_cap() {
        let doc = lecture();
        let index = RelevanceIndex::build(&doc).unwrap();
        let config = GenerationConfig {
            max_answer_chars: 20,
            ..GenerationConfig::default()
        };
        let batch = QuestionGenerator::with_config(&index, config)
            .generate(Some("scrum"), 3)
            .unwrap();

        assert!(!batch.is_empty());
        for record in &batch.questions {
            assert!(record.answer.chars().count() <= 20, "{}", record.answer);
            assert!(!record.answer.ends_with("..."));
        }
    }

    #[test]
    fn test_synthesize_rejects_noise() {
        let doc = lecture();
        let index = RelevanceIndex::build(&doc).unwrap();
        let generator = QuestionGenerator::new(&index);
        assert!(generator.synthesize(&Sentence::new(0, "ok then", None)).is_none());
    }

    #[test]
    fn test_candidate_filters() {
        assert!(is_strict_candidate(&Sentence::new(0, "Scrum is an agile framework.", None)));
        assert!(!is_strict_candidate(&Sentence::new(0, "scrum is an agile framework.", None)));
        assert!(!is_strict_candidate(&Sentence::new(0, "Agile framework overview here", None)));
        assert!(is_lenient_candidate(&Sentence::new(0, "Agile framework overview here", None)));
    }
}
