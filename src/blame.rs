//! Attributing TODOs to the commit that introduced them.
//!
//! The resolver walks history backward from a starting snapshot. At every
//! step it diffs the current ancestor against the snapshot visited just
//! before it; an item whose exact text shows up in the added lines of its file
//! was introduced by that newer snapshot. Resolved items drop out of the
//! working set and the walk stops as soon as the set is empty.
//!
//! An item already present in the root commit is never attributed: its
//! absence is never observed, so it stays unknown.

use crate::error::HistoryError;
use crate::history::{AddedRegions, History};
use crate::models::{CommitRef, Item};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Cooperative cancellation signal, checked once per history step.
///
/// Clones share the same flag, so a progress callback can cancel the walk
/// it is reporting on.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that also trips once `timeout` has elapsed
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancelled: Arc::default(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// What a resolution run did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlameSummary {
    /// Ancestor snapshots diffed
    pub steps: usize,
    /// Items newly attributed by this run
    pub resolved: usize,
    /// Items still of unknown origin
    pub unresolved: usize,
    /// Whether the walk stopped because of the cancel token
    pub cancelled: bool,
}

/// Callback invoked after each step with the ancestor just examined and the
/// number of items still unresolved
pub type Progress<'a> = &'a mut dyn FnMut(&CommitRef, usize);

/// Attribute each item to the snapshot that introduced its text.
///
/// Items that already have an origin are left alone. Cancellation is not an
/// error: the walk stops between steps and the remaining items stay unknown.
/// On a history error, origins assigned so far are kept.
pub fn resolve<H: History + ?Sized>(
    items: &mut [Item],
    history: &H,
    from: &CommitRef,
    cancel: &CancelToken,
    mut progress: Option<Progress<'_>>,
) -> Result<BlameSummary, HistoryError> {
    let mut remaining: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.origin().is_none())
        .map(|(idx, _)| idx)
        .collect();

    let mut summary = BlameSummary {
        unresolved: remaining.len(),
        ..BlameSummary::default()
    };

    if cancel.is_cancelled() {
        summary.cancelled = true;
        return Ok(summary);
    }
    if remaining.is_empty() {
        return Ok(summary);
    }

    let mut prev = from.clone();
    for snapshot in history.ancestors(from)? {
        if remaining.is_empty() {
            break;
        }
        if cancel.is_cancelled() {
            summary.cancelled = true;
            break;
        }

        let snapshot = snapshot?;
        if snapshot.id == prev.id {
            continue;
        }

        let added = if history.is_ancestor(&snapshot, &prev)? {
            let paths = unique_paths(items, &remaining);
            history.added_regions(&snapshot, &prev, &paths)?
        } else {
            AddedRegions::new()
        };

        let mut idx = 0;
        while idx < remaining.len() {
            let item = &mut items[remaining[idx]];
            if added.introduces(item.source_path(), item.raw_text()) {
                trace!(path = %item.source_path().display(), commit = %prev.id, "attributed");
                item.attribute(prev.clone());
                summary.resolved += 1;
                remaining.swap_remove(idx);
            } else {
                idx += 1;
            }
        }

        summary.steps += 1;
        debug!(
            commit = %snapshot.short_id(),
            remaining = remaining.len(),
            "examined ancestor"
        );
        if let Some(progress) = progress.as_deref_mut() {
            progress(&snapshot, remaining.len());
        }

        prev = snapshot;
    }

    summary.unresolved = remaining.len();
    Ok(summary)
}

fn unique_paths<'a>(items: &'a [Item], remaining: &[usize]) -> Vec<&'a Path> {
    let mut paths: Vec<&Path> = remaining.iter().map(|&idx| items[idx].source_path()).collect();
    paths.sort();
    paths.dedup();
    paths
}
