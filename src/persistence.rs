//! Persistence layer for saving/loading quiz reports.
//!
//! Supports both JSON (human-readable) and bincode (compact binary) formats,
//! chosen by file extension.

use crate::error::{QuizError, Result};
use crate::session::QuizReport;
use std::fs;
use std::path::Path;

/// Save format for quiz reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    Json,
    Bincode,
}

impl SaveFormat {
    /// `.bin`/`.bincode` are binary; everything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("bin") | Some("bincode") => SaveFormat::Bincode,
            _ => SaveFormat::Json,
        }
    }
}

/// Save a report, picking the format from the extension.
pub fn save_report(report: &QuizReport, path: &Path) -> Result<()> {
    save_report_with_format(report, path, SaveFormat::from_path(path))
}

pub fn save_report_with_format(report: &QuizReport, path: &Path, format: SaveFormat) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| QuizError::io(parent, e))?;
        }
    }

    let data = match format {
        SaveFormat::Json => serde_json::to_string_pretty(report)?.into_bytes(),
        SaveFormat::Bincode => bincode::encode_to_vec(report, bincode::config::standard())
            .map_err(|e| QuizError::Serialization(e.to_string()))?,
    };

    fs::write(path, &data).map_err(|e| QuizError::io(path, e))
}

/// Load a report saved by [`save_report`].
pub fn load_report(path: &Path) -> Result<QuizReport> {
    if !path.exists() {
        return Err(QuizError::ReportNotFound(path.to_path_buf()));
    }
    load_report_with_format(path, SaveFormat::from_path(path))
}

pub fn load_report_with_format(path: &Path, format: SaveFormat) -> Result<QuizReport> {
    let data = fs::read(path).map_err(|e| QuizError::io(path, e))?;

    let report = match format {
        SaveFormat::Json => serde_json::from_slice(&data)?,
        SaveFormat::Bincode => {
            let (report, _): (QuizReport, usize) =
                bincode::decode_from_slice(&data, bincode::config::standard())
                    .map_err(|e| QuizError::Serialization(e.to_string()))?;
            report
        }
    };

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::AnswerEvaluator;
    use crate::question::{QuestionBatch, QuestionRecord, Strategy};
    use crate::session::QuizSession;
    use tempfile::TempDir;

    fn create_test_report() -> QuizReport {
        let batch = QuestionBatch {
            topic: Some("scrum".to_string()),
            requested: 2,
            questions: vec![
                QuestionRecord {
                    question: "What is Scrum?".to_string(),
                    answer: "an agile framework".to_string(),
                    strategy: Strategy::Definition,
                    key_terms: vec!["Scrum".to_string()],
                    source_position: 0,
                    source_text: "Scrum is an agile framework.".to_string(),
                    section: Some("Agile".to_string()),
                },
                QuestionRecord {
                    question: "How long is a sprint?".to_string(),
                    answer: "2 weeks".to_string(),
                    strategy: Strategy::Quantity,
                    key_terms: vec!["sprint".to_string(), "2 weeks".to_string()],
                    source_position: 1,
                    source_text: "A sprint is typically 2 weeks long.".to_string(),
                    section: None,
                },
            ],
        };
        let mut session = QuizSession::new(batch, AnswerEvaluator::new());
        session.submit("an agile framework");
        session.submit("a month");
        session.report("lecture")
    }

    #[test]
    fn test_save_and_load_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");

        let original = create_test_report();
        save_report(&original, &path).unwrap();
        let loaded = load_report(&path).unwrap();

        assert_eq!(loaded, original);
    }

    #[test]
    fn test_save_and_load_bincode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("report.bin");

        let original = create_test_report();
        save_report(&original, &path).unwrap();
        let loaded = load_report(&path).unwrap();

        assert_eq!(loaded, original);
        assert_eq!(loaded.summary.correct, 1);
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(SaveFormat::from_path(Path::new("r.json")), SaveFormat::Json);
        assert_eq!(SaveFormat::from_path(Path::new("r.bin")), SaveFormat::Bincode);
        assert_eq!(SaveFormat::from_path(Path::new("r.bincode")), SaveFormat::Bincode);
        assert_eq!(SaveFormat::from_path(Path::new("r")), SaveFormat::Json);
    }

    #[test]
    fn test_load_missing_report() {
        let result = load_report(Path::new("/nonexistent/report.json"));
        assert!(matches!(result, Err(QuizError::ReportNotFound(_))));
    }

    #[test]
    fn test_json_is_readable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");
        save_report(&create_test_report(), &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("What is Scrum?"));
        assert!(content.contains("\"strategy\": \"definition\""));
    }
}
