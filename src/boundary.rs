use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// A start/end delimiter pair, e.g. `/*` and `*/`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Boundary {
    pub start: String,
    pub end: String,
}

impl Boundary {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// A boundary with its delimiters pre-split into runes
#[derive(Debug, Clone)]
pub(crate) struct CompiledBoundary {
    pub(crate) boundary: Boundary,
    pub(crate) start: Vec<char>,
    pub(crate) end: Vec<char>,
}

/// A validated, ordered set of boundaries.
///
/// Order matters: when several starts match at the same rune, the boundary
/// declared first wins. A table can only be built through [`BoundaryTable::new`],
/// so a parser never sees an empty table or an empty delimiter.
#[derive(Debug, Clone)]
pub struct BoundaryTable {
    boundaries: Vec<CompiledBoundary>,
    window_size: usize,
}

impl BoundaryTable {
    /// Validate and compile a list of boundaries
    pub fn new(boundaries: Vec<Boundary>) -> Result<Self, ConfigError> {
        if boundaries.is_empty() {
            return Err(ConfigError::EmptyTable);
        }

        let mut compiled = Vec::with_capacity(boundaries.len());
        for (index, boundary) in boundaries.into_iter().enumerate() {
            if boundary.start.is_empty() {
                return Err(ConfigError::EmptyStart { index });
            }
            if boundary.end.is_empty() {
                return Err(ConfigError::EmptyEnd {
                    start: boundary.start,
                });
            }
            compiled.push(CompiledBoundary {
                start: boundary.start.chars().collect(),
                end: boundary.end.chars().collect(),
                boundary,
            });
        }

        let window_size = compiled
            .iter()
            .map(|b| b.start.len().max(b.end.len()))
            .max()
            .unwrap_or(0);

        Ok(Self {
            boundaries: compiled,
            window_size,
        })
    }

    /// Convenience constructor from `(start, end)` string pairs
    pub fn from_pairs<S: AsRef<str>>(pairs: &[(S, S)]) -> Result<Self, ConfigError> {
        Self::new(
            pairs
                .iter()
                .map(|(start, end)| Boundary::new(start.as_ref(), end.as_ref()))
                .collect(),
        )
    }

    /// Longest delimiter in the table, in runes
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn boundaries(&self) -> impl Iterator<Item = &Boundary> {
        self.boundaries.iter().map(|b| &b.boundary)
    }

    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    pub(crate) fn compiled(&self) -> &[CompiledBoundary] {
        &self.boundaries
    }
}
