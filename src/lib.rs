//! Lecture Quiz - offline quiz generation and answer checking for lecture notes.
//!
//! A lecture (Markdown or pre-split sentences) is indexed once with TF-IDF
//! sentence vectors. The index then serves three lookups: ranked sentence
//! search, quiz generation from pattern-based question strategies, and direct
//! answers to "what is X" questions. Free-text answers are scored by blending
//! character-sequence and keyword similarity. No network access or trained
//! model is involved; everything is deterministic lexical matching.
//!
//! # Quick Start
//!
//! ```no_run
//! use lecture_quiz::{
//!     answer::DirectAnswerExtractor,
//!     config::Config,
//!     document::Document,
//!     eval::AnswerEvaluator,
//!     indexer::RelevanceIndex,
//!     question::QuestionGenerator,
//! };
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     config.validate()?;
//!
//!     // Load and index a lecture
//!     let document = Document::from_markdown_file(Path::new("lecture.md"))?;
//!     let index = RelevanceIndex::build_with_config(&document, config.retrieval.clone())?;
//!
//!     // Generate a quiz
//!     let generator = QuestionGenerator::with_config(&index, config.generation.clone());
//!     let batch = generator.generate(Some("scrum"), 5)?;
//!
//!     // Check an answer
//!     let evaluator = AnswerEvaluator::with_config(config.evaluation.clone());
//!     if let Some(question) = batch.questions.first() {
//!         let result = evaluator.evaluate(&question.answer, "my answer");
//!         println!("{}", result.feedback());
//!     }
//!
//!     // Answer a direct question
//!     let answer = DirectAnswerExtractor::new(&index).answer("what is narrow ai")?;
//!     println!("{}", answer.text);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **Document**: ordered sentences with their section headings
//! - **RelevanceIndex**: TF-IDF vectors, search and definition lookup
//! - **QuestionGenerator**: ordered pattern strategies over candidate sentences
//! - **AnswerEvaluator**: similarity blend with containment and key-phrase floors
//! - **DirectAnswerExtractor**: concise answers from defining sentences
//! - **QuizSession**: question-by-question quiz state and reports

pub mod answer;
pub mod config;
pub mod document;
pub mod error;
pub mod eval;
pub mod indexer;
pub mod persistence;
pub mod question;
pub mod search;
pub mod session;
pub mod tokenizer;

// Re-export commonly used types
pub use answer::{Confidence, DirectAnswer, DirectAnswerExtractor};
pub use config::Config;
pub use document::{Document, Sentence};
pub use error::{QuizError, Result};
pub use eval::{AnswerEvaluator, EvaluationResult};
pub use indexer::RelevanceIndex;
pub use persistence::{load_report, save_report};
pub use question::{QuestionBatch, QuestionGenerator, QuestionRecord, Strategy};
pub use search::{Definition, SearchResult};
pub use session::{QuizReport, QuizSession, QuizSummary};
