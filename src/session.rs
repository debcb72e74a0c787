//! Quiz sessions: asking generated questions in order and recording answers.

use crate::document::Document;
use crate::error::{QuizError, Result};
use crate::eval::{AnswerEvaluator, EvaluationResult};
use crate::question::{QuestionBatch, QuestionRecord};
use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Sentences shown on each side of the source sentence by `explain`.
const CONTEXT_RADIUS: usize = 1;

/// One answered question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct AnswerRecord {
    /// 1-based question number.
    pub number: usize,
    pub question: QuestionRecord,
    pub user_answer: String,
    pub evaluation: EvaluationResult,
}

impl AnswerRecord {
    pub fn is_correct(&self) -> bool {
        self.evaluation.passed
    }
}

/// Score totals for a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct QuizSummary {
    pub total: usize,
    pub correct: usize,
    /// Percentage of correct answers; 0 when nothing was answered.
    pub accuracy: f64,
}

impl QuizSummary {
    fn from_answers(answers: &[AnswerRecord]) -> Self {
        let total = answers.len();
        let correct = answers.iter().filter(|a| a.is_correct()).count();
        let accuracy = if total > 0 {
            correct as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        Self {
            total,
            correct,
            accuracy,
        }
    }
}

/// Everything worth keeping from a finished quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct QuizReport {
    /// Name of the lecture document.
    pub document: String,
    pub topic: Option<String>,
    /// Number of questions originally requested.
    pub requested: usize,
    pub answers: Vec<AnswerRecord>,
    pub summary: QuizSummary,
}

/// A quiz in progress.
pub struct QuizSession {
    batch: QuestionBatch,
    evaluator: AnswerEvaluator,
    answers: Vec<AnswerRecord>,
}

impl QuizSession {
    pub fn new(batch: QuestionBatch, evaluator: AnswerEvaluator) -> Self {
        Self {
            batch,
            evaluator,
            answers: Vec::new(),
        }
    }

    /// The questions of this quiz.
    pub fn batch(&self) -> &QuestionBatch {
        &self.batch
    }

    /// Next unanswered question with its 1-based number.
    pub fn current(&self) -> Option<(usize, &QuestionRecord)> {
        let index = self.answers.len();
        self.batch.questions.get(index).map(|q| (index + 1, q))
    }

    /// Evaluate `answer` against the current question and move on.
    ///
    /// Returns `None` once every question has been answered.
    pub fn submit(&mut self, answer: &str) -> Option<&AnswerRecord> {
        let (number, question) = self.current()?;
        let question = question.clone();
        let evaluation = self.evaluator.evaluate(&question.answer, answer);
        debug!(number, score = evaluation.score, passed = evaluation.passed, "answer submitted");

        self.answers.push(AnswerRecord {
            number,
            question,
            user_answer: answer.trim().to_string(),
            evaluation,
        });
        self.answers.last()
    }

    pub fn is_finished(&self) -> bool {
        self.answers.len() >= self.batch.questions.len()
    }

    /// Answers given so far.
    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    pub fn summary(&self) -> QuizSummary {
        QuizSummary::from_answers(&self.answers)
    }

    /// Serializable record of the session so far.
    pub fn report(&self, document: &str) -> QuizReport {
        QuizReport {
            document: document.to_string(),
            topic: self.batch.topic.clone(),
            requested: self.batch.requested,
            answers: self.answers.clone(),
            summary: self.summary(),
        }
    }

    /// Detailed explanation of answered question `number` (1-based),
    /// including the sentences around its source.
    pub fn explain(&self, number: usize, document: &Document) -> Result<String> {
        explain_answer(&self.answers, number, document)
    }
}

/// Explain question `number` (1-based) of a list of answers.
pub fn explain_answer(answers: &[AnswerRecord], number: usize, document: &Document) -> Result<String> {
    let record = number
        .checked_sub(1)
        .and_then(|i| answers.get(i))
        .ok_or(QuizError::QuestionOutOfRange {
            number,
            total: answers.len(),
        })?;

    let question = &record.question;
    let mut text = format!("Question: {}\n", question.question);
    text.push_str(&format!("Correct Answer: {}\n", question.answer));
    text.push_str(&format!("Source: {}\n", question.source_text));

    let context: Vec<&str> = document
        .neighbors(question.source_position, CONTEXT_RADIUS)
        .iter()
        .filter(|s| s.position != question.source_position)
        .map(|s| s.text.as_str())
        .collect();
    if !context.is_empty() {
        text.push_str(&format!("Context: {}\n", context.join(" ")));
    }
    if let Some(section) = &question.section {
        text.push_str(&format!("Section: {section}\n"));
    }

    text.push_str(&format!("Your Answer: {}\n", record.user_answer));
    text.push_str(&format!(
        "Result: {} (score {:.0}%)\n",
        if record.is_correct() { "Correct" } else { "Incorrect" },
        record.evaluation.score * 100.0
    ));

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indexer::RelevanceIndex;
    use crate::question::QuestionGenerator;

    fn lecture() -> Document {
        Document::from_sentences(
            "scrum",
            vec![
                ("Teams plan their work at the start of each iteration.", None),
                ("Scrum is an agile framework for managing complex product work.", None),
                ("The daily Scrum is facilitated by the Scrum Master.", None),
                ("Kanban is a visual method for managing flow of work.", None),
            ],
        )
        .unwrap()
    }

    fn session(doc: &Document) -> QuizSession {
        let index = RelevanceIndex::build(doc).unwrap();
        let batch = QuestionGenerator::new(&index).generate(Some("scrum"), 2).unwrap();
        assert_eq!(batch.len(), 2);
        QuizSession::new(batch, AnswerEvaluator::new())
    }

    #[test]
    fn test_walks_questions_in_order() {
        let doc = lecture();
        let mut session = session(&doc);

        let (number, first) = session.current().unwrap();
        assert_eq!(number, 1);
        let expected = first.answer.clone();

        let record = session.submit(&expected).unwrap();
        assert!(record.is_correct());
        assert_eq!(record.number, 1);

        assert_eq!(session.current().unwrap().0, 2);
        let record = session.submit("").unwrap();
        assert!(!record.is_correct());

        assert!(session.is_finished());
        assert!(session.current().is_none());
        assert!(session.submit("late").is_none());
    }

    #[test]
    fn test_summary_and_report() {
        let doc = lecture();
        let mut session = session(&doc);
        assert_eq!(session.summary().accuracy, 0.0);

        let answer = session.current().unwrap().1.answer.clone();
        session.submit(&answer);
        session.submit("something unrelated entirely");

        let summary = session.summary();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.correct, 1);
        assert_eq!(summary.accuracy, 50.0);

        let report = session.report(&doc.name);
        assert_eq!(report.document, "scrum");
        assert_eq!(report.topic.as_deref(), Some("scrum"));
        assert_eq!(report.answers.len(), 2);
        assert_eq!(report.summary, summary);
    }

    #[test]
    fn test_explain_includes_context() {
        let doc = lecture();
        let mut session = session(&doc);
        let answer = session.current().unwrap().1.answer.clone();
        session.submit(&answer);

        let text = session.explain(1, &doc).unwrap();
        assert!(text.contains("Question: "));
        assert!(text.contains(&format!("Correct Answer: {answer}")));
        assert!(text.contains("Context: "));
        assert!(text.contains("Result: Correct"));
    }

    #[test]
    fn test_explain_out_of_range() {
        let doc = lecture();
        let session = session(&doc);
        assert!(matches!(
            session.explain(1, &doc),
            Err(QuizError::QuestionOutOfRange { number: 1, total: 0 })
        ));
        assert!(matches!(
            session.explain(0, &doc),
            Err(QuizError::QuestionOutOfRange { .. })
        ));
    }
}
