use crate::boundary::Boundary;
use crate::history::Traversal;
use crate::parser::Collection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Metadata of a snapshot (commit) in the history
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitRef {
    /// Full commit hash
    pub id: String,

    /// Author name from git
    pub author_name: String,

    /// Author email from git
    pub author_email: String,

    /// When the commit was authored
    pub author_time: DateTime<Utc>,
}

impl CommitRef {
    /// Abbreviated commit hash
    pub fn short_id(&self) -> &str {
        let end = self
            .id
            .char_indices()
            .nth(7)
            .map(|(idx, _)| idx)
            .unwrap_or(self.id.len());
        &self.id[..end]
    }
}

/// A TODO found in a source file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Path of the file, relative to the repository root
    source_path: PathBuf,

    /// The comment span the TODO was found in
    collection: Collection,

    /// Comment text with the marker stripped
    display_text: String,

    /// The commit that introduced the TODO; `None` while unknown
    origin: Option<CommitRef>,
}

impl Item {
    pub fn new(source_path: PathBuf, collection: Collection, display_text: String) -> Self {
        Self {
            source_path,
            collection,
            display_text,
            origin: None,
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// The raw comment text, as it appears in the file
    pub fn raw_text(&self) -> &str {
        &self.collection.text
    }

    pub fn display_text(&self) -> &str {
        &self.display_text
    }

    pub fn start_line(&self) -> usize {
        self.collection.start.line
    }

    pub fn end_line(&self) -> usize {
        self.collection.end.line
    }

    pub fn origin(&self) -> Option<&CommitRef> {
        self.origin.as_ref()
    }

    /// Record the originating commit. Once set, the origin never changes;
    /// later calls are ignored and return `false`.
    pub(crate) fn attribute(&mut self, commit: CommitRef) -> bool {
        if self.origin.is_some() {
            return false;
        }
        self.origin = Some(commit);
        true
    }

    /// Days between the origin commit and `now`
    pub fn age_days(&self, now: DateTime<Utc>) -> Option<i64> {
        self.origin
            .as_ref()
            .map(|c| now.signed_duration_since(c.author_time).num_days())
    }

    /// Format age as a short string (e.g., "347d", "2m", "1y")
    pub fn age_display(&self, now: DateTime<Utc>) -> String {
        match self.age_days(now) {
            None => "unknown".to_string(),
            Some(days) if days < 30 => format!("{}d", days),
            Some(days) if days < 365 => format!("{}m", days / 30),
            Some(days) => format!("{}y", days / 365),
        }
    }

    /// Human-readable time since the TODO was introduced, e.g. "3months 2days ago"
    pub fn time_ago(&self, now: DateTime<Utc>) -> String {
        let Some(origin) = self.origin.as_ref() else {
            return "<unknown>".to_string();
        };
        let elapsed = now
            .signed_duration_since(origin.author_time)
            .to_std()
            .unwrap_or(Duration::ZERO);
        format!("{} ago", humantime::format_duration(coarse(elapsed)))
    }
}

/// Keep only the two most significant units so durations stay readable
fn coarse(elapsed: Duration) -> Duration {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;
    const DAY: u64 = 24 * HOUR;

    let secs = elapsed.as_secs();
    let unit = if secs >= DAY {
        HOUR
    } else if secs >= HOUR {
        MINUTE
    } else {
        1
    };
    Duration::from_secs(secs - secs % unit)
}

/// Order items by origin time, oldest first. Items of unknown origin sort
/// before every known one and compare equal to each other.
pub fn compare_by_origin(a: &Item, b: &Item) -> Ordering {
    match (a.origin(), b.origin()) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => a.author_time.cmp(&b.author_time),
    }
}

/// Stable sort by [`compare_by_origin`]
pub fn sort_by_origin(items: &mut [Item]) {
    items.sort_by(compare_by_origin);
}

/// Complete report of the TODOs found in a codebase
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoReport {
    /// All items, sorted by origin
    pub items: Vec<Item>,

    /// Total number of items
    pub total_count: usize,

    /// Number of items whose origin commit is known
    pub with_origin: usize,

    /// Count of items by origin author
    pub by_author: HashMap<String, usize>,

    /// Count of items by file
    pub by_file: HashMap<PathBuf, usize>,

    /// Path that was scanned
    pub scan_path: PathBuf,

    /// When the scan was performed
    pub scan_time: DateTime<Utc>,
}

impl TodoReport {
    /// Create a new report, sorting the items oldest first
    pub fn new(mut items: Vec<Item>, scan_path: PathBuf) -> Self {
        sort_by_origin(&mut items);

        let total_count = items.len();
        let mut with_origin = 0;
        let mut by_author: HashMap<String, usize> = HashMap::new();
        let mut by_file: HashMap<PathBuf, usize> = HashMap::new();

        for item in &items {
            *by_file.entry(item.source_path.clone()).or_insert(0) += 1;

            if let Some(origin) = item.origin() {
                with_origin += 1;
                *by_author.entry(origin.author_name.clone()).or_insert(0) += 1;
            }
        }

        Self {
            items,
            total_count,
            with_origin,
            by_author,
            by_file,
            scan_path,
            scan_time: Utc::now(),
        }
    }
}

/// Configuration for scanning and blame
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Marker that makes a comment a TODO
    #[serde(default = "default_marker")]
    pub marker: String,

    /// Directories to ignore during scanning
    #[serde(default = "default_ignored_dirs")]
    pub ignored_dirs: Vec<String>,

    /// How long the blame walk may run, e.g. "30s" or "2m"
    #[serde(default = "default_timeout")]
    pub timeout: String,

    /// Stop the blame walk once this many items are attributed
    #[serde(default)]
    pub stop_after: Option<usize>,

    /// Which ancestors the blame walk visits
    #[serde(default)]
    pub traversal: Traversal,

    /// Extra or replacement comment delimiters, keyed by file extension
    #[serde(default)]
    pub languages: HashMap<String, Vec<Boundary>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            marker: default_marker(),
            ignored_dirs: default_ignored_dirs(),
            timeout: default_timeout(),
            stop_after: None,
            traversal: Traversal::default(),
            languages: HashMap::new(),
        }
    }
}

fn default_marker() -> String {
    "TODO".to_string()
}

fn default_ignored_dirs() -> Vec<String> {
    vec![
        ".git".to_string(),
        "node_modules".to_string(),
        "target".to_string(),
        "dist".to_string(),
        "build".to_string(),
        ".venv".to_string(),
        "venv".to_string(),
        "vendor".to_string(),
        ".next".to_string(),
        "__pycache__".to_string(),
        ".pytest_cache".to_string(),
        "coverage".to_string(),
    ]
}

fn default_timeout() -> String {
    "30s".to_string()
}
