//! Pattern strategies that turn one sentence into a question.
//!
//! Each strategy is a pure function of the sentence text (trailing `.!?`
//! already removed). [`STRATEGIES`] fixes the order they are tried in:
//! specific, high-confidence shapes first, lenient fallbacks last.

use super::Strategy;
use crate::tokenizer::{self, PosTag};
use once_cell::sync::Lazy;
use regex::Regex;

/// A question before clean-up and length checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub question: String,
    pub answer: String,
    pub key_terms: Vec<String>,
}

/// A strategy function.
pub type StrategyFn = fn(&str) -> Option<Draft>;

/// All strategies, in the order they are tried.
pub const STRATEGIES: &[(Strategy, StrategyFn)] = &[
    (Strategy::Definition, definition),
    (Strategy::Role, role),
    (Strategy::Quantity, quantity),
    (Strategy::FillInBlank, fill_in_blank),
    (Strategy::Comprehension, comprehension),
    (Strategy::Components, components),
    (Strategy::Purpose, purpose),
    (Strategy::LenientDefinition, lenient_definition),
    (Strategy::Explanation, explanation),
];

/// Placeholder replacing the answer in fill-in-the-blank questions.
pub const BLANK: &str = "_____";

const TIME_UNITS: &[&str] = &[
    "second", "seconds", "minute", "minutes", "hour", "hours", "day", "days", "week", "weeks",
    "month", "months", "year", "years",
];

const GENERIC_SUBJECTS: &[&str] = &[
    "finance", "healthcare", "transportation", "e-commerce", "industry", "field", "domain",
];

static DEFINITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^([a-z][a-z\s]{3,40}?)\s+(is|are)\s+([^.]{10,100})")
        .expect("valid definition regex")
});
static ROLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)([a-z][a-z\s]{3,40}?)\s+(?:is|are)\s+(done by|performed by|led by|facilitated by|owned by|responsible for)\s+([a-z][a-z\s]{3,50})",
    )
    .expect("valid role regex")
});
static QUANTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)([a-z][^.]{4,}?)\s+(?:is|are|lasts|last|takes|take)\s+(?:typically\s+|usually\s+|generally\s+|about\s+|approximately\s+|around\s+)?(\d+(?:\.\d+)?)\s+([a-z]+)",
    )
    .expect("valid quantity regex")
});
static COMPREHENSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^([a-z][a-z\s]{3,30}?)\s+(?:performs|facilitates|manages|handles|executes)\s+([^.]{10,80})",
    )
    .expect("valid comprehension regex")
});
static COMPONENTS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^([a-z][a-z\s]{3,30}?)\s+(?:includes|include|consists of|consist of|has|have|contains|contain)\s+([^.]{10,100})",
    )
    .expect("valid components regex")
});
static PURPOSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^([a-z][a-z\s]{5,40}?)\s+(?:is|are)\s+(?:used for|used to|designed to|aims to|intended to|meant to)\s+([^.]{10,80})",
    )
    .expect("valid purpose regex")
});
static LENIENT_DEFINITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Z][a-zA-Z\s]{3,35}?)\s+is\s+([^.]{15,100})")
        .expect("valid lenient definition regex")
});

/// Predicates that a more specific strategy owns.
static RESERVED_PREDICATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:used for|used to|designed to|aims to|intended to|meant to|done by|performed by|led by|facilitated by|owned by|responsible for|(?:typically\s+|usually\s+|generally\s+|about\s+|approximately\s+|around\s+)?\d)",
    )
    .expect("valid reserved predicate regex")
});
static ACTION_IN_SUBJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:uses|does|performs|facilitates|manages|involves|enables|allows)\b")
        .expect("valid action regex")
});
static TRAILING_FILLER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+(?:is|are|was|were|the|a|an|of)$").expect("valid filler regex")
});
static LEADING_ARTICLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?i)(?:the|a|an)\s+").expect("valid article regex"));

/// Trim a subject and drop dangling auxiliaries/articles at its end.
fn clean_subject(subject: &str) -> String {
    let mut subject = subject.trim().to_string();
    while let Some(m) = TRAILING_FILLER.find(&subject) {
        subject.truncate(m.start());
    }
    subject
}

/// Lowercase a leading article so the subject reads mid-sentence.
fn inline_subject(subject: &str) -> String {
    match LEADING_ARTICLE.find(subject) {
        Some(m) => format!("{}{}", subject[..m.end()].to_lowercase(), &subject[m.end()..]),
        None => subject.to_string(),
    }
}

/// Drop a leading article.
fn strip_article(text: &str) -> &str {
    match LEADING_ARTICLE.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    }
}

/// Cut `text` to at most `max_chars` characters at a word boundary.
pub fn cut_at_word(text: &str, max_chars: usize) -> &str {
    let text = text.trim();
    let Some((limit, _)) = text.char_indices().nth(max_chars) else {
        return text;
    };

    let head = &text[..limit];
    // A cut landing exactly on a word break keeps the whole head.
    if text[limit..].starts_with(char::is_whitespace) {
        return head.trim_end();
    }
    match head.rfind(char::is_whitespace) {
        Some(space) if space > 0 => head[..space].trim_end(),
        _ => head,
    }
}

fn definition(sentence: &str) -> Option<Draft> {
    let caps = DEFINITION.captures(sentence)?;
    let subject = clean_subject(&caps[1]);
    let verb = caps[2].to_lowercase();
    let predicate = caps[3].trim();

    if ACTION_IN_SUBJECT.is_match(&subject) || RESERVED_PREDICATE.is_match(predicate) {
        return None;
    }

    Some(Draft {
        question: format!("What {} {}?", verb, inline_subject(&subject)),
        answer: predicate.to_string(),
        key_terms: vec![subject],
    })
}

fn role(sentence: &str) -> Option<Draft> {
    let caps = ROLE.captures(sentence)?;
    let subject = clean_subject(&caps[1]);
    let relation = caps[2].to_lowercase();
    let object_raw = caps[3].trim();
    let object_text = strip_article(object_raw);

    // The object ends at the first non-nominal word.
    let object_end = tokenizer::tag(object_text)
        .iter()
        .take_while(|t| t.tag.is_nominal())
        .last()
        .map(|t| t.end)?;
    let object = object_text[..object_end].to_string();

    if relation == "responsible for" {
        let who = strip_article(&subject).to_string();
        if who.is_empty() {
            return None;
        }
        return Some(Draft {
            question: format!("Who is responsible for {}?", object_raw),
            answer: who.clone(),
            key_terms: vec![who, object],
        });
    }

    Some(Draft {
        question: format!("Who is {} {}?", inline_subject(&subject), relation),
        answer: object.clone(),
        key_terms: vec![subject, object],
    })
}

fn quantity(sentence: &str) -> Option<Draft> {
    let caps = QUANTITY.captures(sentence)?;
    let subject = clean_subject(&caps[1]);
    if subject.chars().count() > 80 {
        return None;
    }

    let unit = caps[3].to_lowercase();
    let (start, end) = (caps.get(2)?.start(), caps.get(3)?.end());
    let answer = sentence[start..end].to_string();

    let question = if TIME_UNITS.contains(&unit.as_str()) {
        format!("How long is {}?", inline_subject(&subject))
    } else {
        format!("How many {} is {}?", unit, inline_subject(&subject))
    };

    Some(Draft {
        question,
        answer: answer.clone(),
        key_terms: vec![subject, answer],
    })
}

fn fill_in_blank(sentence: &str) -> Option<Draft> {
    let mut phrases: Vec<&str> = tokenizer::noun_phrases(sentence)
        .into_iter()
        .filter(|p| (6..50).contains(&p.chars().count()))
        .collect();
    if phrases.is_empty() {
        return None;
    }

    phrases.sort_by_key(|p| p.len());
    let term = phrases
        .iter()
        .find(|p| p.split_whitespace().count() >= 3)
        .or_else(|| phrases.last())
        .copied()?;

    let mut question = sentence.replacen(term, BLANK, 1);
    if question.chars().count() > 150 {
        let words: Vec<&str> = question.split_whitespace().collect();
        let blank_at = words.iter().position(|w| w.contains(BLANK));
        if words.len() > 20 && blank_at.is_some_and(|i| i < 20) {
            question = format!("{}...", words[..20].join(" "));
        }
    }

    Some(Draft {
        question,
        answer: term.to_string(),
        key_terms: vec![term.to_string()],
    })
}

fn comprehension(sentence: &str) -> Option<Draft> {
    let caps = COMPREHENSION.captures(sentence)?;
    let subject = clean_subject(&caps[1]);
    if GENERIC_SUBJECTS.contains(&subject.to_lowercase().as_str()) {
        return None;
    }

    Some(Draft {
        question: format!("What does {} do?", inline_subject(&subject)),
        answer: caps[2].trim().to_string(),
        key_terms: vec![subject],
    })
}

fn components(sentence: &str) -> Option<Draft> {
    let caps = COMPONENTS.captures(sentence)?;
    let subject = clean_subject(&caps[1]);
    if subject.chars().count() > 40 || ACTION_IN_SUBJECT.is_match(&subject) {
        return None;
    }

    Some(Draft {
        question: format!(
            "What are the components or types of {}?",
            inline_subject(&subject)
        ),
        answer: caps[2].trim().to_string(),
        key_terms: vec![subject],
    })
}

fn purpose(sentence: &str) -> Option<Draft> {
    let caps = PURPOSE.captures(sentence)?;
    let subject = clean_subject(&caps[1]);

    Some(Draft {
        question: format!("What is the purpose of {}?", inline_subject(&subject)),
        answer: caps[2].trim().to_string(),
        key_terms: vec![subject],
    })
}

fn lenient_definition(sentence: &str) -> Option<Draft> {
    let caps = LENIENT_DEFINITION.captures(sentence)?;
    let subject = clean_subject(&caps[1]);
    let predicate = caps[2].trim();

    if ACTION_IN_SUBJECT.is_match(&subject)
        || subject.chars().count() >= 50
        || predicate.chars().count() <= 10
    {
        return None;
    }

    Some(Draft {
        question: format!("What is {}?", inline_subject(&subject)),
        answer: predicate.to_string(),
        key_terms: vec![subject],
    })
}

fn explanation(sentence: &str) -> Option<Draft> {
    if sentence.chars().count() <= 30 {
        return None;
    }

    let term = tokenizer::tag(sentence).into_iter().find(|t| match t.tag {
        PosTag::ProperNoun => true,
        PosTag::Noun => {
            t.text.chars().next().is_some_and(char::is_uppercase) && t.text.chars().count() > 4
        }
        _ => false,
    })?;

    Some(Draft {
        question: format!("Explain: {}", term.text),
        answer: cut_at_word(sentence, 120).to_string(),
        key_terms: vec![term.text.to_string()],
    })
}
