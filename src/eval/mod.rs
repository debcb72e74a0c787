//! Answer evaluation.
//!
//! This module provides:
//! - Similarity signals (character-sequence ratio, keyword Jaccard, key phrases)
//! - [`AnswerEvaluator`], which blends them into a pass/fail verdict

mod evaluator;
pub mod similarity;

pub use evaluator::{AnswerEvaluator, Containment, EvaluationResult, SignalBreakdown};
