//! Lecture Quiz CLI
//!
//! Generates quizzes from lecture notes and checks answers, fully offline.

mod command;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use command::{AUTOQUIZ_SIZE, Command, parse_command};
use lecture_quiz::{
    answer::{Confidence, DirectAnswerExtractor},
    config::Config,
    document::Document,
    error::QuizError,
    eval::AnswerEvaluator,
    indexer::RelevanceIndex,
    persistence::{load_report, save_report},
    question::QuestionGenerator,
    session::{AnswerRecord, QuizSession, explain_answer},
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Lecture Quiz - offline quizzes from lecture notes
#[derive(Parser)]
#[command(name = "lecture-quiz")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a YAML config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a quiz and answer it question by question
    Quiz {
        /// Path to the lecture Markdown file
        file: PathBuf,

        /// Topic to focus on (questions come from the whole lecture if omitted)
        #[arg(short, long)]
        topic: Option<String>,

        /// Number of questions
        #[arg(short = 'n', long, default_value_t = 5)]
        count: usize,

        /// Save the quiz report (.json or .bin)
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Answer a question directly from the lecture
    Ask {
        /// Path to the lecture Markdown file
        file: PathBuf,

        /// The question, e.g. "what is narrow ai"
        question: String,
    },

    /// Rank lecture sentences by relevance to a query
    Search {
        /// Path to the lecture Markdown file
        file: PathBuf,

        /// The search query
        query: String,

        /// Number of results to return
        #[arg(short = 'k', long, default_value_t = 5)]
        top_k: usize,
    },

    /// Score a candidate answer against an expected answer
    Check {
        /// The expected answer
        expected: String,

        /// The answer to score
        candidate: String,

        /// Pass threshold (defaults to the configured one)
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Interactive prompt: quizzes, direct questions and explanations
    Interactive {
        /// Path to the lecture Markdown file
        file: PathBuf,

        /// Save each quiz report to this path (.json or .bin)
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Show information about a lecture file
    Info {
        /// Path to the lecture Markdown file
        file: PathBuf,
    },

    /// Show a saved quiz report
    Report {
        /// Path to the report file
        path: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("lecture_quiz=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lecture_quiz=warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Quiz {
            file,
            topic,
            count,
            save,
        } => cmd_quiz(&config, &file, topic.as_deref(), count, save.as_deref()),
        Commands::Ask { file, question } => cmd_ask(&config, &file, &question),
        Commands::Search { file, query, top_k } => cmd_search(&config, &file, &query, top_k),
        Commands::Check {
            expected,
            candidate,
            threshold,
        } => cmd_check(&config, &expected, &candidate, threshold),
        Commands::Interactive { file, save } => cmd_interactive(&config, &file, save.as_deref()),
        Commands::Info { file } => cmd_info(&config, &file),
        Commands::Report { path } => cmd_report(&path),
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => {
            let mut config = Config::load_from_file(path)
                .with_context(|| format!("Failed to load config from '{}'", path.display()))?;
            config.apply_env();
            config
        }
        None => Config::load().context("Failed to load configuration")?,
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

fn load_lecture(path: &Path) -> Result<Document> {
    Document::from_markdown_file(path)
        .with_context(|| format!("Failed to load lecture '{}'", path.display()))
}

/// Read one trimmed line from stdin; `None` at end of input.
fn prompt(label: &str) -> Result<Option<String>> {
    print!("{label}");
    io::stdout().flush().context("Failed to flush stdout")?;

    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Generate a quiz and ask every question on stdin/stdout.
fn run_quiz(
    config: &Config,
    index: &RelevanceIndex<'_>,
    topic: Option<&str>,
    count: usize,
) -> Result<QuizSession> {
    println!("{}", "=".repeat(60));
    match topic {
        Some(topic) => println!("Generating {count} questions on: {topic}"),
        None => println!("Generating {count} questions from the whole lecture"),
    }
    println!("{}", "=".repeat(60));

    let generator = QuestionGenerator::with_config(index, config.generation.clone());
    let batch = generator.generate(topic, count)?;
    if batch.is_empty() {
        println!("No questions could be generated from the content.");
    } else if batch.is_partial() {
        println!(
            "Only {} of {} questions could be generated from the material.",
            batch.len(),
            batch.requested
        );
    }

    let mut session = QuizSession::new(batch, AnswerEvaluator::with_config(config.evaluation.clone()));
    while let Some((number, question)) = session.current() {
        println!("\nQ{number}: {}", question.question);
        println!("{}", "-".repeat(60));

        let Some(answer) = prompt("Your answer: ")? else {
            println!();
            break;
        };
        if let Some(record) = session.submit(&answer) {
            let mark = if record.is_correct() { "[correct]" } else { "[wrong]" };
            println!("{mark} {}", record.evaluation.feedback());
        }
    }

    let summary = session.summary();
    println!("\n{}", "=".repeat(60));
    println!("SUMMARY");
    println!("{}", "=".repeat(60));
    println!("Total questions: {}", summary.total);
    println!("Correct answers: {}", summary.correct);
    println!("Accuracy: {:.1}%", summary.accuracy);
    println!("{}", "=".repeat(60));

    Ok(session)
}

fn save_session(session: &QuizSession, document: &Document, path: Option<&Path>) -> Result<()> {
    if let Some(path) = path {
        save_report(&session.report(&document.name), path)
            .with_context(|| format!("Failed to save report to '{}'", path.display()))?;
        println!("Results saved to {}", path.display());
    }
    Ok(())
}

fn cmd_quiz(
    config: &Config,
    file: &Path,
    topic: Option<&str>,
    count: usize,
    save: Option<&Path>,
) -> Result<()> {
    let document = load_lecture(file)?;
    let index = RelevanceIndex::build_with_config(&document, config.retrieval.clone())
        .context("Failed to index lecture")?;

    let session = run_quiz(config, &index, topic, count).context("Quiz failed")?;
    save_session(&session, &document, save)
}

fn cmd_ask(config: &Config, file: &Path, question: &str) -> Result<()> {
    let document = load_lecture(file)?;
    let index = RelevanceIndex::build_with_config(&document, config.retrieval.clone())
        .context("Failed to index lecture")?;

    print_answer(&index, question)
}

fn print_answer(index: &RelevanceIndex<'_>, question: &str) -> Result<()> {
    match DirectAnswerExtractor::new(index).answer(question) {
        Ok(answer) => {
            println!("Answer: {}", answer.text);
            if answer.confidence == Confidence::LowConfidence {
                println!("(no defining sentence found; showing the closest match)");
            }
            Ok(())
        }
        Err(QuizError::NotFound(_)) => {
            println!("I couldn't find an answer to that question in the lecture.");
            Ok(())
        }
        Err(e) => Err(e).context("Failed to answer question"),
    }
}

fn cmd_search(config: &Config, file: &Path, query: &str, top_k: usize) -> Result<()> {
    let document = load_lecture(file)?;
    let index = RelevanceIndex::build_with_config(&document, config.retrieval.clone())
        .context("Failed to index lecture")?;

    let start = Instant::now();
    let results = index.search(query, top_k).context("Search failed")?;
    let duration = start.elapsed();

    if results.is_empty() {
        println!("No relevant sentences found.");
        return Ok(());
    }

    println!("Results:");
    println!("{}", "─".repeat(60));
    for (i, result) in results.iter().enumerate() {
        println!("{:>2}. [{:.3}] {}", i + 1, result.score, result.sentence.text);
        if let Some(section) = &result.sentence.section {
            println!("    Section: {section}");
        }
    }
    println!("{}", "─".repeat(60));
    println!("Found {} results in {:.2?}", results.len(), duration);

    Ok(())
}

fn cmd_check(config: &Config, expected: &str, candidate: &str, threshold: Option<f64>) -> Result<()> {
    let evaluator = AnswerEvaluator::with_config(config.evaluation.clone());
    let threshold = threshold.unwrap_or(config.evaluation.threshold);
    if !(0.0..=1.0).contains(&threshold) {
        anyhow::bail!("Threshold must be within [0, 1], got {threshold}");
    }

    let result = evaluator.evaluate_with_threshold(expected, candidate, threshold);
    let breakdown = &result.breakdown;

    println!("{}", result.feedback());
    println!("{}", "─".repeat(40));
    println!("  Score:           {:.3}", result.score);
    println!("  Threshold:       {:.2}", result.threshold);
    println!("  Sequence ratio:  {:.3}", breakdown.sequence_ratio);
    match breakdown.keyword_overlap {
        Some(overlap) => println!("  Keyword overlap: {overlap:.3}"),
        None => println!("  Keyword overlap: n/a"),
    }
    println!("  Blended:         {:.3}", breakdown.blended);
    println!("  Key phrase:      {}", breakdown.key_phrase);
    println!("  Containment:     {:?}", breakdown.containment);

    Ok(())
}

fn cmd_interactive(config: &Config, file: &Path, save: Option<&Path>) -> Result<()> {
    let document = load_lecture(file)?;
    let index = RelevanceIndex::build_with_config(&document, config.retrieval.clone())
        .context("Failed to index lecture")?;
    println!(
        "Loaded '{}' ({} sentences).\n",
        document.name,
        document.len()
    );

    println!("{}", "=".repeat(60));
    println!("Lecture Quiz");
    println!("{}", "=".repeat(60));
    println!("\nType a command, e.g.:");
    println!("  > Give me 5 questions on Agile methodology");
    println!("  > what is narrow ai");
    println!("  > autoquiz");
    println!("  > explain question 2");
    println!("  > quit");
    println!("\n{}\n", "-".repeat(60));

    let mut last_answers: Vec<AnswerRecord> = Vec::new();

    while let Some(line) = prompt("> ")? {
        let Some(command) = parse_command(&line) else {
            continue;
        };

        let quiz = match command {
            Command::Quit => break,
            Command::AutoQuiz => Some((None, AUTOQUIZ_SIZE)),
            Command::Quiz { topic, count } => Some((topic, count)),
            Command::Explain(number) => {
                match explain_answer(&last_answers, number, &document) {
                    Ok(text) => println!("\n{text}"),
                    Err(QuizError::QuestionOutOfRange { .. }) => {
                        println!("Question not found. Please run a quiz first.")
                    }
                    Err(e) => println!("Error: {e}"),
                }
                None
            }
            Command::Ask(question) => {
                print_answer(&index, &question)?;
                None
            }
            Command::Invalid => {
                println!("Invalid command. Try:");
                println!("  > Give me 5 questions on [topic]");
                println!("  > what is [topic]");
                println!("  > autoquiz");
                println!("  > explain question [number]");
                None
            }
        };

        if let Some((topic, count)) = quiz {
            match run_quiz(config, &index, topic.as_deref(), count) {
                Ok(session) => {
                    save_session(&session, &document, save)?;
                    last_answers = session.answers().to_vec();
                }
                Err(e) => println!("Could not generate a quiz: {e:#}"),
            }
        }
    }

    println!("\nGoodbye!");
    Ok(())
}

fn cmd_info(config: &Config, file: &Path) -> Result<()> {
    let document = load_lecture(file)?;
    let index = RelevanceIndex::build_with_config(&document, config.retrieval.clone())
        .context("Failed to index lecture")?;
    let sections = document.sections();

    println!("Lecture Information");
    println!("{}", "─".repeat(40));
    println!("  Document:    {}", document.name);
    println!("  Sentences:   {}", document.len());
    println!("  Sections:    {}", sections.len());
    println!("  Vocabulary:  {}", index.stats().vocabulary_size());
    println!("  Path:        {}", file.display());

    for section in sections {
        println!("    - {section}");
    }

    Ok(())
}

fn cmd_report(path: &Path) -> Result<()> {
    let report = load_report(path)
        .with_context(|| format!("Failed to load report '{}'", path.display()))?;

    println!("Quiz Report: {}", report.document);
    if let Some(topic) = &report.topic {
        println!("Topic: {topic}");
    }
    println!("{}", "─".repeat(60));
    for answer in &report.answers {
        let mark = if answer.is_correct() { "[correct]" } else { "[wrong]" };
        println!("Q{}: {} {mark}", answer.number, answer.question.question);
        println!("    Your answer:    {}", answer.user_answer);
        println!("    Correct answer: {}", answer.question.answer);
    }
    println!("{}", "─".repeat(60));
    println!(
        "{} of {} correct ({:.1}%), {} requested",
        report.summary.correct, report.summary.total, report.summary.accuracy, report.requested
    );

    Ok(())
}
