//! Text similarity signals used to score free-text answers.

use crate::tokenizer;
use std::collections::BTreeSet;

/// Phrases of this many characters or fewer are too weak to count.
const MIN_PHRASE_CHARS: usize = 5;
/// Words longer than this are treated as content-bearing.
const IMPORTANT_WORD_CHARS: usize = 4;

/// Character-sequence similarity in [0, 1].
///
/// Ratcliff/Obershelp: twice the number of characters in matching blocks
/// divided by the total length, where blocks are found by taking the longest
/// common substring and recursing on both sides. Two empty strings are
/// identical.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, len) = longest_common_block(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_chars(&a[..i], &b[..j]) + matching_chars(&a[i + len..], &b[j + len..])
}

/// Longest common substring as `(start_a, start_b, len)`; ties resolve to
/// the block starting earliest in `a`, then earliest in `b`.
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut previous = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        let mut current = vec![0usize; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            if ca == cb {
                let run = previous[j] + 1;
                current[j + 1] = run;
                if run > best.2 {
                    best = (i + 1 - run, j + 1 - run, run);
                }
            }
        }
        previous = current;
    }

    best
}

/// Jaccard similarity of two keyword sets; `None` when either set is empty.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> Option<f64> {
    if a.is_empty() || b.is_empty() {
        return None;
    }
    let shared = a.intersection(b).count();
    let union = a.union(b).count();
    Some(shared as f64 / union as f64)
}

/// Whether the candidate reproduces a key phrase of the expected answer.
///
/// Both texts are normalized first. A phrase is an adjacent word pair of the
/// expected answer longer than five characters; failing that, at least half
/// of the expected answer's words longer than four characters must appear.
pub fn has_key_phrase(expected: &str, candidate: &str) -> bool {
    let expected = tokenizer::normalize(expected);
    let candidate = tokenizer::normalize(candidate);
    let words: Vec<&str> = expected.split_whitespace().collect();
    if words.len() < 2 {
        return false;
    }

    let phrase_hit = words
        .windows(2)
        .map(|pair| format!("{} {}", pair[0], pair[1]))
        .filter(|phrase| phrase.chars().count() > MIN_PHRASE_CHARS)
        .any(|phrase| candidate.contains(&phrase));
    if phrase_hit {
        return true;
    }

    let important: Vec<&str> = words
        .iter()
        .copied()
        .filter(|w| w.chars().count() > IMPORTANT_WORD_CHARS)
        .collect();
    if important.is_empty() {
        return false;
    }
    let present = important.iter().filter(|w| candidate.contains(*w)).count();
    present * 2 >= important.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_sequence_ratio_bounds() {
        assert_eq!(sequence_ratio("scrum", "scrum"), 1.0);
        assert_eq!(sequence_ratio("", ""), 1.0);
        assert_eq!(sequence_ratio("abc", ""), 0.0);
        assert_eq!(sequence_ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_sequence_ratio_known_values() {
        // "abcd" vs "bcde": one block "bcd" of 3 chars -> 6 / 8
        assert!((sequence_ratio("abcd", "bcde") - 0.75).abs() < 1e-12);
        // blocks "a" and "c" -> 4 / 6
        assert!((sequence_ratio("abc", "axc") - 4.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_sequence_ratio_symmetric_for_simple_inputs() {
        let a = "scrum master";
        let b = "the scrum master";
        assert!((sequence_ratio(a, b) - sequence_ratio(b, a)).abs() < 1e-12);
    }

    #[test]
    fn test_jaccard() {
        let a = set(&["subset", "learns"]);
        let b = set(&["subset"]);
        assert_eq!(jaccard(&a, &b), Some(0.5));
        assert_eq!(jaccard(&a, &a), Some(1.0));
        assert_eq!(jaccard(&a, &BTreeSet::new()), None);
    }

    #[test]
    fn test_key_phrase_pair() {
        assert!(has_key_phrase(
            "designed to perform specific tasks",
            "it can perform specific tasks well"
        ));
        assert!(!has_key_phrase("designed to perform specific tasks", "general reasoning"));
    }

    #[test]
    fn test_key_phrase_important_words() {
        assert!(has_key_phrase("product backlog ordering", "ordering of the backlog"));
        assert!(!has_key_phrase("scrum", "scrum"));
    }
}
