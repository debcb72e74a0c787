//! Tokenization, normalization and shallow part-of-speech tagging.
//!
//! Everything here is a pure function of its input text plus the static word
//! lists below. Empty input yields empty output.

use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashSet};

/// English stopwords excluded from term weighting and keyword sets.
static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and",
        "any", "are", "as", "at", "be", "because", "been", "before", "being", "below", "between",
        "both", "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during",
        "each", "either", "etc", "few", "for", "from", "further", "had", "has", "have", "having",
        "he", "her", "here", "hers", "herself", "him", "himself", "his", "how", "i", "if", "in",
        "into", "is", "it", "its", "itself", "just", "may", "me", "might", "more", "most", "must",
        "my", "myself", "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or",
        "other", "our", "ours", "ourselves", "out", "over", "own", "same", "shall", "she",
        "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
        "themselves", "then", "there", "these", "they", "this", "those", "through", "to", "too",
        "under", "until", "up", "us", "very", "via", "was", "we", "were", "what", "when",
        "where", "which", "while", "who", "whom", "whose", "why", "will", "with", "would", "you",
        "your", "yours", "yourself", "yourselves",
    ]
    .into_iter()
    .collect()
});

/// Closed-class words: determiners, prepositions, conjunctions, pronouns.
static FUNCTION_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "an", "the", "this", "that", "these", "those", "each", "every", "some", "any",
        "all", "no", "both", "either", "neither", "its", "their", "his", "her", "our", "your",
        "my", "of", "in", "on", "at", "to", "for", "with", "by", "from", "into", "onto", "about",
        "over", "under", "between", "through", "during", "before", "after", "above", "below",
        "without", "within", "across", "against", "among", "around", "as", "via", "per", "than",
        "like", "and", "or", "but", "nor", "so", "yet", "if", "because", "while", "although",
        "when", "where", "which", "who", "whom", "whose", "what", "how", "why", "whether", "it",
        "they", "them", "he", "she", "we", "you", "i", "us", "him", "itself", "themselves",
        "not", "also", "very", "too", "more", "most", "such", "only", "often", "then", "there",
        "here", "usually", "typically", "generally", "approximately",
    ]
    .into_iter()
    .collect()
});

static AUXILIARIES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "is", "are", "was", "were", "be", "been", "being", "am", "do", "does", "did", "has",
        "have", "had", "can", "could", "will", "would", "shall", "should", "may", "might", "must",
    ]
    .into_iter()
    .collect()
});

static COMMON_VERBS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "use", "uses", "include", "includes", "contain", "contains", "consist", "consists",
        "provide", "provides", "allow", "allows", "enable", "enables", "help", "helps", "make",
        "makes", "perform", "performs", "manage", "manages", "handle", "handles", "execute",
        "executes", "involve", "involves", "require", "requires", "mean", "means", "refer",
        "refers", "denote", "denotes", "describe", "describes", "represent", "represents",
        "learn", "learns", "focus", "focuses", "create", "creates", "build", "builds", "define",
        "defines", "ensure", "ensures", "support", "supports", "become", "becomes", "produce",
        "produces", "lead", "leads", "run", "runs", "take", "takes", "last", "lasts", "give",
        "gives", "aim", "aims", "facilitate", "facilitates", "deliver", "delivers", "improve",
        "improves", "reduce", "reduces", "increase", "increases", "depend", "depends",
    ]
    .into_iter()
    .collect()
});

const ADJECTIVE_SUFFIXES: &[&str] = &[
    "ous", "ful", "ive", "able", "ible", "al", "ic", "less", "ish", "ary",
];

/// Whether a lowercase word is a stopword.
pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word)
}

/// Lowercase, drop punctuation, collapse whitespace.
pub fn normalize(text: &str) -> String {
    let kept: String = text
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercased alphanumeric runs, stopwords and single characters removed.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .filter(|w| w.chars().count() >= 2 && !is_stopword(w))
        .collect()
}

/// Index terms for a text: tokens, plus adjacent-token bigrams when enabled.
pub fn terms(text: &str, bigrams: bool) -> Vec<String> {
    let tokens = tokenize(text);
    if !bigrams || tokens.len() < 2 {
        return tokens;
    }

    let pairs: Vec<String> = tokens
        .windows(2)
        .map(|pair| format!("{} {}", pair[0], pair[1]))
        .collect();

    let mut all = tokens;
    all.extend(pairs);
    all
}

/// Keyword set of an answer: normalized words longer than two characters
/// that are not stopwords.
pub fn keywords(text: &str) -> BTreeSet<String> {
    normalize(text)
        .split_whitespace()
        .filter(|w| w.chars().count() > 2 && !is_stopword(w))
        .map(str::to_string)
        .collect()
}

/// Shallow part-of-speech tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosTag {
    Noun,
    ProperNoun,
    Adjective,
    Verb,
    Number,
    /// Determiners, prepositions, conjunctions, pronouns.
    Function,
    Punctuation,
    Other,
}

impl PosTag {
    /// Tags that can sit inside a noun phrase.
    pub fn is_nominal(self) -> bool {
        matches!(self, PosTag::Noun | PosTag::ProperNoun | PosTag::Adjective)
    }
}

/// A token with its byte span in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaggedToken<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
    pub tag: PosTag,
}

/// Split into word and punctuation spans. Hyphens and apostrophes between
/// alphanumerics stay inside the word.
fn spans(text: &str) -> Vec<(usize, usize, bool)> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut out = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (start, c) = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_alphanumeric() {
            let mut j = i + 1;
            while j < chars.len() {
                let cj = chars[j].1;
                let joins = (cj == '-' || cj == '\'')
                    && chars.get(j + 1).is_some_and(|(_, n)| n.is_alphanumeric());
                if cj.is_alphanumeric() || joins {
                    j += 1;
                } else {
                    break;
                }
            }
            let end = chars.get(j).map(|(pos, _)| *pos).unwrap_or(text.len());
            out.push((start, end, true));
            i = j;
        } else {
            out.push((start, start + c.len_utf8(), false));
            i += 1;
        }
    }

    out
}

fn is_acronym(word: &str) -> bool {
    word.chars().count() >= 2
        && word.chars().all(|c| c.is_uppercase() || c.is_ascii_digit())
        && word.chars().any(char::is_uppercase)
}

fn base_tag(word: &str, sentence_initial: bool, prev: Option<(&str, PosTag)>) -> PosTag {
    let lower = word.to_lowercase();
    let lw = lower.as_str();

    if word.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return PosTag::Number;
    }
    if AUXILIARIES.contains(lw) {
        return PosTag::Verb;
    }
    if FUNCTION_WORDS.contains(lw) {
        return PosTag::Function;
    }
    if COMMON_VERBS.contains(lw) {
        return PosTag::Verb;
    }
    if is_acronym(word) {
        return PosTag::ProperNoun;
    }

    let capitalized = word.chars().next().is_some_and(char::is_uppercase);
    if capitalized && !sentence_initial {
        return PosTag::ProperNoun;
    }

    let len = lw.chars().count();
    if len > 4 && lw.ends_with("ly") {
        return PosTag::Other;
    }
    if len > 4 && lw.ends_with("ing") {
        return match prev {
            Some((p, PosTag::Verb)) if AUXILIARIES.contains(p.to_lowercase().as_str()) => {
                PosTag::Verb
            }
            _ => PosTag::Noun,
        };
    }
    if len > 3 && lw.ends_with("ed") {
        return match prev {
            Some((p, PosTag::Verb)) if AUXILIARIES.contains(p.to_lowercase().as_str()) => {
                PosTag::Verb
            }
            Some((_, PosTag::Noun | PosTag::ProperNoun)) => PosTag::Verb,
            _ => PosTag::Adjective,
        };
    }
    if len > 4 && ADJECTIVE_SUFFIXES.iter().any(|s| lw.ends_with(s)) {
        return PosTag::Adjective;
    }

    PosTag::Noun
}

/// Tag every token of `text`.
pub fn tag(text: &str) -> Vec<TaggedToken<'_>> {
    let mut tokens: Vec<TaggedToken<'_>> = Vec::new();
    let mut sentence_initial = true;

    for (start, end, is_word) in spans(text) {
        let slice = &text[start..end];
        if !is_word {
            tokens.push(TaggedToken {
                text: slice,
                start,
                end,
                tag: PosTag::Punctuation,
            });
            if matches!(slice, "." | "!" | "?" | ":") {
                sentence_initial = true;
            }
            continue;
        }

        let prev = tokens.last().map(|t| (t.text, t.tag));
        let tag = base_tag(slice, sentence_initial, prev);
        tokens.push(TaggedToken {
            text: slice,
            start,
            end,
            tag,
        });
        sentence_initial = false;
    }

    // Third-person verbs ("AI learns from data") look like plural nouns on
    // their own; resolve them from both neighbours.
    for i in 1..tokens.len().saturating_sub(1) {
        let word = tokens[i].text;
        if tokens[i].tag == PosTag::Noun
            && word.ends_with('s')
            && !word.ends_with("ss")
            && tokens[i - 1].tag.is_nominal()
            && matches!(tokens[i + 1].tag, PosTag::Function | PosTag::Number)
        {
            tokens[i].tag = PosTag::Verb;
        }
    }

    tokens
}

fn flush_phrase<'t>(text: &'t str, run: &mut Vec<TaggedToken<'t>>, phrases: &mut Vec<&'t str>) {
    if (2..=4).contains(&run.len()) {
        let first = run[0].start;
        let last = run[run.len() - 1].end;
        phrases.push(&text[first..last]);
    }
    run.clear();
}

/// Runs of two to four nominal tokens, returned as verbatim slices of `text`.
pub fn noun_phrases(text: &str) -> Vec<&str> {
    let mut phrases = Vec::new();
    let mut run = Vec::new();

    for token in tag(text) {
        if token.tag.is_nominal() {
            run.push(token);
        } else {
            flush_phrase(text, &mut run, &mut phrases);
        }
    }
    flush_phrase(text, &mut run, &mut phrases);

    phrases
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  A Subset, of AI!  "), "a subset of ai");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_tokenize_drops_stopwords_and_punctuation() {
        let tokens = tokenize("Narrow AI is designed to perform specific tasks.");
        assert_eq!(tokens, vec!["narrow", "ai", "designed", "perform", "specific", "tasks"]);
        assert!(tokenize("").is_empty());
        assert!(tokenize("the of and").is_empty());
    }

    #[test]
    fn test_tokenize_is_deterministic() {
        let text = "Scrum uses fixed-length sprints.";
        assert_eq!(tokenize(text), tokenize(text));
    }

    #[test]
    fn test_terms_with_bigrams() {
        let terms = terms("narrow AI systems", true);
        assert!(terms.contains(&"narrow".to_string()));
        assert!(terms.contains(&"narrow ai".to_string()));
        assert!(terms.contains(&"ai systems".to_string()));

        let plain = super::terms("narrow AI systems", false);
        assert_eq!(plain.len(), 3);
    }

    #[test]
    fn test_keywords() {
        let kw = keywords("A subset of AI that learns from data");
        assert!(kw.contains("subset"));
        assert!(kw.contains("learns"));
        assert!(!kw.contains("ai")); // too short
        assert!(!kw.contains("that"));
    }

    #[test]
    fn test_tag_basic_shapes() {
        let tokens = tag("The Scrum Master facilitates the daily standup.");
        let tags: Vec<PosTag> = tokens.iter().map(|t| t.tag).collect();
        assert_eq!(tags[0], PosTag::Function);
        assert_eq!(tags[1], PosTag::ProperNoun);
        assert_eq!(tags[2], PosTag::ProperNoun);
        assert_eq!(tags[3], PosTag::Verb);
        assert_eq!(*tags.last().unwrap(), PosTag::Punctuation);
    }

    #[test]
    fn test_tag_spans_are_exact() {
        let text = "Machine learning, a subset of AI.";
        for token in tag(text) {
            assert_eq!(&text[token.start..token.end], token.text);
        }
    }

    #[test]
    fn test_noun_phrases_are_verbatim() {
        let text = "The Product Owner manages the product backlog.";
        let phrases = noun_phrases(text);
        assert!(phrases.contains(&"Product Owner"));
        assert!(phrases.contains(&"product backlog"));
        for phrase in phrases {
            assert!(text.contains(phrase));
        }
    }

    #[test]
    fn test_noun_phrases_break_on_punctuation() {
        let phrases = noun_phrases("Planning, review, retrospective.");
        assert!(phrases.is_empty());
    }
}
