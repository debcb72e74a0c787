//! Document representation for lecture notes.
//!
//! A document is an ordered list of sentences, each remembering the section
//! heading it appeared under. Order is meaningful: neighbouring sentences
//! provide context when a quiz answer is explained.

use crate::error::{QuizError, Result};
use crate::tokenizer;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::path::{Path, PathBuf};

/// Fragments this short or shorter are dropped as splitting artifacts.
const MIN_SENTENCE_CHARS: usize = 20;

static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#{1,6}\s+(.+?)\s*#*\s*$").expect("valid heading regex"));
static FENCED_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[\s\S]*?```").expect("valid fence regex"));
static INLINE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"`[^`]+`").expect("valid inline code regex"));
static IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").expect("valid image regex"));
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").expect("valid link regex"));
static EMPHASIS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\*\*([^*]+)\*\*|__([^_]+)__|\*([^*]+)\*|\b_([^_]+)_\b").expect("valid emphasis regex")
});
static RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:-{3,}|\*{3,}|_{3,})$").expect("valid rule regex"));
static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[-*+]|\d+[.)])\s+").expect("valid list regex"));
static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+(?:\s+|$)").expect("valid sentence regex"));

/// A single sentence of a document.
#[derive(Debug, Clone)]
pub struct Sentence {
    /// 0-indexed position in the document.
    pub position: usize,
    /// Sentence text as it appears in the source.
    pub text: String,
    /// Heading of the section the sentence appeared under.
    pub section: Option<String>,
    /// Normalized tokens (stopwords removed).
    pub tokens: Vec<String>,
}

impl Sentence {
    /// Create a new sentence.
    pub fn new(position: usize, text: impl Into<String>, section: Option<String>) -> Self {
        let text = text.into();
        let tokens = tokenizer::tokenize(&text);
        Self {
            position,
            text,
            section,
            tokens,
        }
    }

    /// Case-insensitive check that the sentence contains `phrase` as whole words.
    ///
    /// Runs of whitespace inside the phrase match any whitespace run.
    pub fn mentions(&self, phrase: &str) -> bool {
        phrase_regex(phrase).is_some_and(|re| re.is_match(&self.text))
    }
}

/// Regex source matching `phrase` word for word, bounded at word edges.
///
/// `None` for a blank phrase.
pub(crate) fn phrase_pattern(phrase: &str) -> Option<String> {
    let words: Vec<String> = phrase.split_whitespace().map(regex::escape).collect();
    if words.is_empty() {
        return None;
    }

    let phrase = phrase.trim();
    let word_edge = |c: Option<char>| c.is_some_and(|c| c.is_alphanumeric() || c == '_');
    let lead = if word_edge(phrase.chars().next()) { r"\b" } else { "" };
    let trail = if word_edge(phrase.chars().last()) { r"\b" } else { "" };
    Some(format!("{lead}{}{trail}", words.join(r"\s+")))
}

/// Case-insensitive whole-word regex for `phrase`.
pub(crate) fn phrase_regex(phrase: &str) -> Option<Regex> {
    let pattern = phrase_pattern(phrase)?;
    RegexBuilder::new(&pattern).case_insensitive(true).build().ok()
}

/// An immutable lecture document.
#[derive(Debug, Clone)]
pub struct Document {
    /// Document name/title.
    pub name: String,
    /// Original file path (if loaded from file).
    pub path: Option<PathBuf>,
    sentences: Vec<Sentence>,
}

impl Document {
    /// Build a document from already-cleaned `(sentence, heading)` pairs.
    ///
    /// Blank sentences are skipped; no other filtering is applied.
    pub fn from_sentences<I, S>(name: impl Into<String>, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Option<String>)>,
        S: Into<String>,
    {
        let name = name.into();
        let sentences: Vec<Sentence> = pairs
            .into_iter()
            .map(|(text, section)| (text.into(), section))
            .filter(|(text, _)| !text.trim().is_empty())
            .enumerate()
            .map(|(i, (text, section))| Sentence::new(i, text.trim(), section))
            .collect();

        if sentences.is_empty() {
            return Err(QuizError::EmptyDocument(name));
        }

        Ok(Self {
            name,
            path: None,
            sentences,
        })
    }

    /// Load a Markdown lecture file.
    pub fn from_markdown_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(QuizError::DocumentNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path).map_err(|e| QuizError::io(path, e))?;

        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled")
            .to_string();

        let mut document = Self::from_markdown(name, &content)?;
        document.path = Some(path.to_path_buf());
        Ok(document)
    }

    /// Parse Markdown text into a document.
    pub fn from_markdown(name: impl Into<String>, content: &str) -> Result<Self> {
        let pairs = split_markdown(content);
        Self::from_sentences(name, pairs)
    }

    /// All sentences in document order.
    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    /// Get a sentence by position (0-indexed).
    pub fn get(&self, position: usize) -> Option<&Sentence> {
        self.sentences.get(position)
    }

    /// Number of sentences.
    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    /// Always false for a constructed document; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }

    /// Sentences within `radius` positions of `position`, in order.
    pub fn neighbors(&self, position: usize, radius: usize) -> &[Sentence] {
        if position >= self.sentences.len() {
            return &[];
        }
        let start = position.saturating_sub(radius);
        let end = (position + radius + 1).min(self.sentences.len());
        &self.sentences[start..end]
    }

    /// Distinct section headings in first-appearance order.
    pub fn sections(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for section in self.sentences.iter().filter_map(|s| s.section.as_deref()) {
            if !seen.contains(&section) {
                seen.push(section);
            }
        }
        seen
    }
}

/// Strip inline Markdown from a line of prose.
fn clean_inline(line: &str) -> String {
    let line = INLINE_CODE.replace_all(line, "");
    let line = IMAGE.replace_all(&line, "");
    let line = LINK.replace_all(&line, "$1");
    let line = EMPHASIS.replace_all(&line, "$1$2$3$4");
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a cleaned block of prose into sentences.
fn split_sentences(block: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut last = 0;

    for m in SENTENCE_END.find_iter(block) {
        let sentence = block[last..m.end()].trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        last = m.end();
    }
    let tail = block[last..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }

    sentences
        .into_iter()
        .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS)
        .collect()
}

/// Turn Markdown into `(sentence, heading)` pairs.
fn split_markdown(content: &str) -> Vec<(String, Option<String>)> {
    let content = FENCED_CODE.replace_all(content, "");
    let mut pairs = Vec::new();
    let mut section: Option<String> = None;
    let mut block: Vec<String> = Vec::new();

    let flush = |block: &mut Vec<String>, section: &Option<String>, pairs: &mut Vec<_>| {
        if !block.is_empty() {
            for sentence in split_sentences(&block.join(" ")) {
                pairs.push((sentence, section.clone()));
            }
            block.clear();
        }
    };

    for raw in content.lines() {
        let line = raw.trim();

        if line.is_empty() || RULE.is_match(line) {
            flush(&mut block, &section, &mut pairs);
            continue;
        }

        if let Some(caps) = HEADING.captures(line) {
            flush(&mut block, &section, &mut pairs);
            let title = clean_inline(&caps[1]);
            section = (!title.is_empty()).then_some(title);
            continue;
        }

        if LIST_MARKER.is_match(line) {
            // Each list item stands alone.
            flush(&mut block, &section, &mut pairs);
            let item = clean_inline(&LIST_MARKER.replace(line, ""));
            if !item.is_empty() {
                block.push(item);
            }
            flush(&mut block, &section, &mut pairs);
            continue;
        }

        let cleaned = clean_inline(line);
        if !cleaned.is_empty() {
            block.push(cleaned);
        }
    }
    flush(&mut block, &section, &mut pairs);

    pairs
}
