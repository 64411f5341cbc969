use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Catalog text without the surrounding `[` ... `]` pair.
    #[error("catalog format error: {0}")]
    Format(String),

    /// Structured data that still fails to decode. `text` holds the input
    /// that was handed to the decoder so it can be shown to the user.
    #[error("parse error: {message}")]
    Parse { message: String, text: String },

    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },
}

impl TrackerError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TrackerError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(message: impl Into<String>, text: impl Into<String>) -> Self {
        TrackerError::Parse {
            message: message.into(),
            text: text.into(),
        }
    }

    pub fn task_not_found(id: u64) -> Self {
        TrackerError::NotFound {
            kind: "Task",
            id: id as i64,
        }
    }

    pub fn problem_not_found(id: i64) -> Self {
        TrackerError::NotFound { kind: "Problem", id }
    }

    /// The offending text for parse errors, if any.
    pub fn diagnostic_text(&self) -> Option<&str> {
        match self {
            TrackerError::Parse { text, .. } if !text.is_empty() => Some(text),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, TrackerError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_mentions_path() {
        let err = TrackerError::io(
            "/tmp/tasks.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/tasks.json"));
        assert!(msg.contains("denied"));
    }

    #[test]
    fn not_found_message() {
        assert_eq!(TrackerError::task_not_found(7).to_string(), "Task 7 not found");
        assert_eq!(
            TrackerError::problem_not_found(3).to_string(),
            "Problem 3 not found"
        );
        assert!(TrackerError::task_not_found(1).is_not_found());
    }

    #[test]
    fn diagnostic_text_only_for_parse_errors() {
        let err = TrackerError::parse("bad", "[{\"id\": }]");
        assert_eq!(err.diagnostic_text(), Some("[{\"id\": }]"));
        assert!(TrackerError::Format("no brackets".into())
            .diagnostic_text()
            .is_none());
        assert!(TrackerError::parse("bad", "").diagnostic_text().is_none());
    }
}
