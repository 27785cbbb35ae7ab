//! User profile — the identity fields collected by the entry form.

use serde::{Deserialize, Serialize};

/// Name, unit and division of the new joiner.
///
/// Free text. The chat surface stays locked until all three are non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub unit: String,
    pub division: String,
}

impl UserProfile {
    pub fn new(
        name: impl Into<String>,
        unit: impl Into<String>,
        division: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            division: division.into(),
        }
    }

    /// All three fields are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.unit.is_empty() && !self.division.is_empty()
    }

    /// Empty every field.
    pub fn clear(&mut self) {
        self.name.clear();
        self.unit.clear();
        self.division.clear();
    }

    /// The `{name}_{unit}_{division}` stem used in transcript filenames.
    pub fn file_stem(&self) -> String {
        format!(
            "{}_{}_{}",
            sanitize(&self.name),
            sanitize(&self.unit),
            sanitize(&self.division)
        )
    }
}

/// Strip everything except alphanumerics, spaces and underscores, then trim
/// trailing whitespace.
pub fn sanitize(s: &str) -> String {
    let kept: String = s
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '_')
        .collect();
    kept.trim_end().to_string()
}
