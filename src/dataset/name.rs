//! Hierarchical dataset names

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Hierarchy separator
pub const SEPARATOR: char = '/';

/// Characters allowed inside one name segment besides ASCII alphanumerics
pub const SEGMENT_PUNCTUATION: &str = "_-:.";

fn name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.:\-]*(/[A-Za-z0-9_.:\-]+)*$")
            .expect("dataset name pattern is a valid regex")
    })
}

/// Rejected dataset name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid dataset name '{name}': {reason}")]
pub struct InvalidDatasetName {
    pub name: String,
    pub reason: &'static str,
}

/// A slash-delimited dataset identifier (`pool/parent/child`).
///
/// Non-empty, no whitespace, no empty segments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DatasetName(String);

impl DatasetName {
    pub fn parse(name: &str) -> Result<Self, InvalidDatasetName> {
        let invalid = |reason| InvalidDatasetName {
            name: name.to_string(),
            reason,
        };

        if name.is_empty() {
            return Err(invalid("name is empty"));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(invalid("name contains whitespace"));
        }
        if name.starts_with(SEPARATOR) || name.ends_with(SEPARATOR) {
            return Err(invalid("name starts or ends with '/'"));
        }
        if name.contains("//") {
            return Err(invalid("name has an empty segment"));
        }
        if !name_pattern().is_match(name) {
            return Err(invalid("name contains characters outside [A-Za-z0-9_.:-/]"));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First segment
    pub fn pool(&self) -> &str {
        self.0.split(SEPARATOR).next().unwrap_or(&self.0)
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR)
    }

    /// Enclosing dataset, `None` for a pool root
    pub fn parent(&self) -> Option<DatasetName> {
        self.0
            .rsplit_once(SEPARATOR)
            .map(|(parent, _)| DatasetName(parent.to_string()))
    }

    /// Append a relative path (one or more segments).
    pub fn join(&self, relative: &str) -> Result<DatasetName, InvalidDatasetName> {
        DatasetName::parse(&format!("{}{}{}", self.0, SEPARATOR, relative))
    }

    /// True for `self` itself and anything below it.
    pub fn contains(&self, other: &DatasetName) -> bool {
        other.relative_to(self).is_some()
    }

    /// Path of `self` below `root`: `Some("")` for `root` itself,
    /// `Some("a/b")` for `root/a/b`, `None` when outside `root`.
    pub fn relative_to(&self, root: &DatasetName) -> Option<&str> {
        if self.0 == root.0 {
            return Some("");
        }
        self.0
            .strip_prefix(root.as_str())
            .and_then(|rest| rest.strip_prefix(SEPARATOR))
    }
}

impl fmt::Display for DatasetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for DatasetName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
