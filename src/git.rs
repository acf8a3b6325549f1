use crate::error::HistoryError;
use crate::history::{AddedRegions, History, Traversal};
use crate::models::CommitRef;
use chrono::DateTime;
use git2::{Commit, Delta, DiffOptions, ErrorCode, Oid, Patch, Repository, Sort};
use std::path::Path;

/// [`History`] backed by a git repository
pub struct GitHistory {
    repo: Repository,
    traversal: Traversal,
}

impl GitHistory {
    pub fn new(repo: Repository, traversal: Traversal) -> Self {
        Self { repo, traversal }
    }

    /// Find the repository containing `path`
    pub fn discover(path: &Path, traversal: Traversal) -> Result<Option<Self>, HistoryError> {
        match Repository::discover(path) {
            Ok(repo) => Ok(Some(Self::new(repo, traversal))),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None), // Not a git repository - this is okay
            Err(e) => Err(e.into()),
        }
    }

    /// Root of the working tree, if the repository is not bare
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    fn find_commit(&self, commit: &CommitRef) -> Result<Commit<'_>, HistoryError> {
        let unknown = || HistoryError::UnknownSnapshot(commit.id.clone());
        let oid = Oid::from_str(&commit.id).map_err(|_| unknown())?;
        match self.repo.find_commit(oid) {
            Ok(found) => Ok(found),
            Err(e) if e.code() == ErrorCode::NotFound => Err(unknown()),
            Err(e) => Err(e.into()),
        }
    }
}

fn commit_ref(commit: &Commit<'_>) -> CommitRef {
    let author = commit.author();
    CommitRef {
        id: commit.id().to_string(),
        author_name: author.name().unwrap_or("Unknown").to_string(),
        author_email: author.email().unwrap_or("unknown@example.com").to_string(),
        author_time: DateTime::from_timestamp(author.when().seconds(), 0).unwrap_or_default(),
    }
}

impl History for GitHistory {
    fn head(&self) -> Result<CommitRef, HistoryError> {
        let commit = self.repo.head()?.peel_to_commit()?;
        Ok(commit_ref(&commit))
    }

    fn ancestors<'a>(
        &'a self,
        from: &CommitRef,
    ) -> Result<Box<dyn Iterator<Item = Result<CommitRef, HistoryError>> + 'a>, HistoryError> {
        let start = self.find_commit(from)?.id();

        let mut walk = self.repo.revwalk()?;
        walk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        if self.traversal == Traversal::FirstParent {
            walk.simplify_first_parent()?;
        }
        walk.push(start)?;

        Ok(Box::new(walk.map(move |oid| -> Result<CommitRef, HistoryError> {
            let commit = self.repo.find_commit(oid?)?;
            Ok(commit_ref(&commit))
        })))
    }

    fn is_ancestor(&self, ancestor: &CommitRef, descendant: &CommitRef) -> Result<bool, HistoryError> {
        let ancestor = self.find_commit(ancestor)?.id();
        let descendant = self.find_commit(descendant)?.id();
        Ok(self.repo.graph_descendant_of(descendant, ancestor)?)
    }

    fn added_regions(
        &self,
        older: &CommitRef,
        newer: &CommitRef,
        paths: &[&Path],
    ) -> Result<AddedRegions, HistoryError> {
        let older_tree = self.find_commit(older)?.tree()?;
        let newer_tree = self.find_commit(newer)?.tree()?;

        let mut opts = DiffOptions::new();
        opts.disable_pathspec_match(true);
        for path in paths {
            opts.pathspec(*path);
        }

        let diff = self
            .repo
            .diff_tree_to_tree(Some(&older_tree), Some(&newer_tree), Some(&mut opts))?;

        let mut added = AddedRegions::new();
        for idx in 0..diff.deltas().len() {
            let Some(patch) = Patch::from_diff(&diff, idx)? else {
                continue;
            };
            let delta = patch.delta();
            if delta.status() == Delta::Deleted
                || delta.flags().is_binary()
                || delta.new_file().is_binary()
            {
                continue;
            }
            let Some(path) = delta.new_file().path() else {
                continue;
            };
            let path = path.to_path_buf();

            for hunk in 0..patch.num_hunks() {
                let mut region = String::new();
                for line_idx in 0..patch.num_lines_in_hunk(hunk)? {
                    let line = patch.line_in_hunk(hunk, line_idx)?;
                    if line.origin() == '+' {
                        region.push_str(&String::from_utf8_lossy(line.content()));
                    } else if !region.is_empty() {
                        added.push(path.clone(), std::mem::take(&mut region));
                    }
                }
                if !region.is_empty() {
                    added.push(path.clone(), region);
                }
            }
        }

        Ok(added)
    }
}
