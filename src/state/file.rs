//! Persisted dataset set
//!
//! One line: `datasets: <name> <name> ...`. Replaced wholesale every run.

use std::collections::BTreeSet;

use crate::dataset::DatasetName;

const PREFIX: &str = "datasets:";

/// Dataset names recorded by the previous run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunState {
    datasets: Vec<DatasetName>,
}

impl RunState {
    pub fn new(datasets: Vec<DatasetName>) -> Self {
        Self { datasets }
    }

    pub fn datasets(&self) -> &[DatasetName] {
        &self.datasets
    }

    pub fn render(&self) -> String {
        let names: Vec<&str> = self.datasets.iter().map(DatasetName::as_str).collect();
        if names.is_empty() {
            format!("{}\n", PREFIX)
        } else {
            format!("{} {}\n", PREFIX, names.join(" "))
        }
    }

    /// Blank content is an empty set.
    pub fn parse(content: &str) -> Result<Self, String> {
        let mut lines = content.lines().map(str::trim).filter(|l| !l.is_empty());
        let line = match lines.next() {
            Some(line) => line,
            None => return Ok(Self::default()),
        };
        if lines.next().is_some() {
            return Err("expected a single line".to_string());
        }
        let rest = line
            .strip_prefix(PREFIX)
            .ok_or_else(|| format!("line does not start with '{}'", PREFIX))?;

        let mut datasets = Vec::new();
        let mut seen = BTreeSet::new();
        for token in rest.split_whitespace() {
            let name = DatasetName::parse(token).map_err(|e| e.to_string())?;
            if seen.insert(name.clone()) {
                datasets.push(name);
            }
        }
        Ok(Self { datasets })
    }

    /// Names recorded here but absent from `current`, in recorded order
    pub fn orphans(&self, current: &[DatasetName]) -> Vec<DatasetName> {
        self.datasets
            .iter()
            .filter(|name| !current.contains(name))
            .cloned()
            .collect()
    }
}
