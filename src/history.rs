//! The view of version history the blame resolver works against.

use crate::error::HistoryError;
use crate::models::CommitRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Which commits an ancestor walk visits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Traversal {
    /// Every reachable commit, merges and their second parents included
    #[default]
    AllParents,
    /// Only the first-parent chain
    FirstParent,
}

/// Added-line regions of a diff, grouped by the path on the "to" side.
///
/// A region is the concatenated content of consecutive added lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddedRegions {
    regions: HashMap<PathBuf, Vec<String>>,
}

impl AddedRegions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: PathBuf, region: String) {
        self.regions.entry(path).or_default().push(region);
    }

    /// Whether any added region of `path` contains `text`
    pub fn introduces(&self, path: &Path, text: &str) -> bool {
        self.regions
            .get(path)
            .is_some_and(|regions| regions.iter().any(|r| r.contains(text)))
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// A linear, read-only view of version history
pub trait History {
    /// The snapshot the working tree is based on
    fn head(&self) -> Result<CommitRef, HistoryError>;

    /// Ancestors of `from`, newest first, starting with `from` itself
    fn ancestors<'a>(
        &'a self,
        from: &CommitRef,
    ) -> Result<Box<dyn Iterator<Item = Result<CommitRef, HistoryError>> + 'a>, HistoryError>;

    /// Whether `ancestor` is a proper ancestor of `descendant`
    fn is_ancestor(&self, ancestor: &CommitRef, descendant: &CommitRef) -> Result<bool, HistoryError>;

    /// Lines added going from `older` to `newer`, restricted to `paths`.
    /// Binary files and files deleted in `newer` produce no regions.
    fn added_regions(
        &self,
        older: &CommitRef,
        newer: &CommitRef,
        paths: &[&Path],
    ) -> Result<AddedRegions, HistoryError>;
}
