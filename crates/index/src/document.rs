//! Source document loading.
//!
//! The induction document is an ordered list of paragraphs, stored either as
//! JSON (`["…", "…"]` or `{"paragraphs": ["…"]}`) or as plain text with
//! paragraphs separated by blank lines.

use buddy_core::error::IndexError;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// The induction document as ordered paragraphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub paragraphs: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDocument {
    List(Vec<String>),
    Object { paragraphs: Vec<String> },
}

impl SourceDocument {
    /// Load a document from disk. `.json` files are parsed as JSON, anything
    /// else as plain text.
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        let content = std::fs::read_to_string(path).map_err(|e| IndexError::SourceUnavailable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let document = if is_json {
            Self::from_json_str(&content).map_err(|reason| IndexError::InvalidSource {
                path: path.to_path_buf(),
                reason,
            })?
        } else {
            Self::from_plain_text(&content)
        };

        if document.is_empty() {
            return Err(IndexError::SourceUnavailable {
                path: path.to_path_buf(),
                reason: "document contains no text".into(),
            });
        }

        debug!(
            path = %path.display(),
            paragraphs = document.paragraphs.len(),
            "Loaded source document"
        );
        Ok(document)
    }

    /// Parse either a JSON array of strings or an object with a
    /// `paragraphs` array.
    pub fn from_json_str(content: &str) -> Result<Self, String> {
        let raw: RawDocument = serde_json::from_str(content).map_err(|e| e.to_string())?;
        let paragraphs = match raw {
            RawDocument::List(p) | RawDocument::Object { paragraphs: p } => p,
        };
        Ok(Self { paragraphs })
    }

    /// Split plain text into paragraphs on blank lines.
    pub fn from_plain_text(content: &str) -> Self {
        let mut paragraphs = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for line in content.lines() {
            if line.trim().is_empty() {
                if !current.is_empty() {
                    paragraphs.push(current.join("\n"));
                    current.clear();
                }
            } else {
                current.push(line.trim_end());
            }
        }
        if !current.is_empty() {
            paragraphs.push(current.join("\n"));
        }

        Self { paragraphs }
    }

    /// True when no paragraph carries any non-whitespace text.
    pub fn is_empty(&self) -> bool {
        self.paragraphs.iter().all(|p| p.trim().is_empty())
    }

    /// Every paragraph followed by a newline, concatenated in order.
    pub fn full_text(&self) -> String {
        let mut text = String::with_capacity(self.paragraphs.iter().map(|p| p.len() + 1).sum());
        for paragraph in &self.paragraphs {
            text.push_str(paragraph);
            text.push('\n');
        }
        text
    }
}
