//! Parsing of the interactive prompt's commands.

use once_cell::sync::Lazy;
use regex::Regex;

/// Questions per quiz when the command names no number.
pub const DEFAULT_QUIZ_SIZE: usize = 5;
/// Questions in an auto quiz.
pub const AUTOQUIZ_SIZE: usize = 7;

/// A command typed at the interactive prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    /// Questions drawn from the whole lecture.
    AutoQuiz,
    /// Explain an answered question (1-based).
    Explain(usize),
    /// A direct question such as "what is narrow ai".
    Ask(String),
    Quiz { topic: Option<String>, count: usize },
    Invalid,
}

static EXPLAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^explain\s+question\s+(\d+)$").expect("valid explain regex")
});
static DIRECT_QUESTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:what|who|where|when|why|how|is|are|does|do|can|will|define)\b")
        .expect("valid question regex")
});
static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d+)\b").expect("valid number regex"));
static TOPIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:on|about|regarding)\s+(.+)$").expect("valid topic regex")
});
static TOPIC_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+(?:questions?|quiz|test)$").expect("valid topic suffix regex")
});
static QUIZ_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:questions?|quiz|test\s+me)\b").expect("valid quiz regex")
});

/// Parse one line of input; `None` for a blank line.
pub fn parse_command(input: &str) -> Option<Command> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let lower = input.to_lowercase();
    let command = match lower.as_str() {
        "quit" | "exit" | "q" => Command::Quit,
        "autoquiz" | "auto quiz" => Command::AutoQuiz,
        _ if lower.starts_with("explain") => match EXPLAIN.captures(input) {
            Some(caps) => caps[1]
                .parse()
                .map(Command::Explain)
                .unwrap_or(Command::Invalid),
            None => Command::Invalid,
        },
        _ if DIRECT_QUESTION.is_match(input) => Command::Ask(input.to_string()),
        _ => parse_quiz_request(input),
    };
    Some(command)
}

fn parse_quiz_request(input: &str) -> Command {
    let number = NUMBER.captures(input).and_then(|caps| caps[1].parse::<usize>().ok());
    let topic = TOPIC.captures(input).map(|caps| {
        let topic = caps[1].trim().trim_end_matches(['.', '!', '?']);
        TOPIC_SUFFIX.replace(topic, "").trim().to_string()
    });
    let topic = topic.filter(|t| !t.is_empty());

    if number.is_none() && topic.is_none() && !QUIZ_WORDS.is_match(input) {
        return Command::Invalid;
    }

    Command::Quiz {
        topic,
        count: number.unwrap_or(DEFAULT_QUIZ_SIZE),
    }
}
