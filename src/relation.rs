use std::collections::BTreeSet;

use serde::Serialize;

/// One related (source, target) identifier pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct IdPair {
    pub source: String,
    pub target: String,
}

impl IdPair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Two named identifier columns, one row per related pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdRelation {
    pub source_column: String,
    pub target_column: String,
    pub rows: Vec<IdPair>,
}

impl IdRelation {
    pub fn new(source_column: impl Into<String>, target_column: impl Into<String>) -> Self {
        Self {
            source_column: source_column.into(),
            target_column: target_column.into(),
            rows: Vec::new(),
        }
    }

    pub fn with_rows(mut self, rows: Vec<IdPair>) -> Self {
        self.rows = rows;
        self
    }

    pub fn columns(&self) -> (&str, &str) {
        (self.source_column.as_str(), self.target_column.as_str())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IdPair> {
        self.rows.iter()
    }

    pub fn sources(&self) -> BTreeSet<&str> {
        self.rows.iter().map(|row| row.source.as_str()).collect()
    }

    pub fn targets(&self) -> BTreeSet<&str> {
        self.rows.iter().map(|row| row.target.as_str()).collect()
    }

    /// Targets paired with `source`, in row order.
    pub fn targets_of<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.rows
            .iter()
            .filter(move |row| row.source == source)
            .map(|row| row.target.as_str())
    }
}

impl IntoIterator for IdRelation {
    type Item = IdPair;
    type IntoIter = std::vec::IntoIter<IdPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
