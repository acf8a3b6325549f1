use crate::models::Item;
use crate::parser::Collection;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use regex::Regex;
use std::path::Path;

/// Recognizes action-item comments and strips their marker
#[derive(Debug, Clone)]
pub struct TodoMatcher {
    marker: String,
    pattern: Regex,
}

impl TodoMatcher {
    pub fn new(marker: &str) -> Result<Self> {
        if marker.is_empty() {
            bail!("Marker must not be empty");
        }
        let pattern = Regex::new(&format!("{}[:,]?", regex::escape(marker)))
            .context("Failed to compile marker regex")?;
        Ok(Self {
            marker: marker.to_string(),
            pattern,
        })
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Turn a comment into an [`Item`] if it contains the marker.
    ///
    /// The first marker occurrence and one `:` or `,` right after it are
    /// removed, then surrounding whitespace is trimmed.
    pub fn todo_from_collection(&self, source_path: &Path, collection: Collection) -> Option<Item> {
        if !collection.text.contains(&self.marker) {
            return None;
        }
        let display_text = self
            .pattern
            .replacen(&collection.text, 1, "")
            .trim()
            .to_string();
        Some(Item::new(source_path.to_path_buf(), collection, display_text))
    }

    /// Keep only the comments that are TODOs, in their original order
    pub fn todos_from_collections(
        &self,
        source_path: &Path,
        collections: impl IntoIterator<Item = Collection>,
    ) -> Vec<Item> {
        collections
            .into_iter()
            .filter_map(|c| self.todo_from_collection(source_path, c))
            .collect()
    }
}

/// Keep items introduced at least `min_age` ago, e.g. "30days", "6months", "1y"
pub fn filter_by_age(items: Vec<Item>, min_age: &str, now: DateTime<Utc>) -> Result<Vec<Item>> {
    let min_age = humantime::parse_duration(min_age)
        .with_context(|| format!("Invalid age format: {}", min_age))?;
    let min_age_days = (min_age.as_secs() / (24 * 60 * 60)) as i64;

    Ok(items
        .into_iter()
        .filter(|item| match item.age_days(now) {
            Some(days) => days >= min_age_days,
            None => false, // Unknown origin has no age
        })
        .collect())
}

/// Filter items by origin author (case-insensitive partial match on name or email)
pub fn filter_by_author(items: Vec<Item>, author: &str) -> Vec<Item> {
    let author_lower = author.to_lowercase();

    items
        .into_iter()
        .filter(|item| {
            if let Some(origin) = item.origin() {
                origin.author_name.to_lowercase().contains(&author_lower)
                    || origin.author_email.to_lowercase().contains(&author_lower)
            } else {
                false
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::Boundary;
    use crate::models::tests::commit;
    use crate::parser::Location;
    use chrono::TimeZone;

    fn collection(text: &str) -> Collection {
        Collection {
            text: text.to_string(),
            boundary: Boundary::new("//", "\n"),
            start: Location::new(1, 3),
            end: Location::new(1, 3),
        }
    }

    fn matcher() -> TodoMatcher {
        TodoMatcher::new("TODO").unwrap()
    }

    fn aged(author: &str, unix: i64) -> Item {
        let mut item = matcher()
            .todo_from_collection(Path::new("a.rs"), collection(" TODO: x"))
            .unwrap();
        item.attribute(commit("c", author, unix));
        item
    }

    #[test]
    fn test_non_todo_is_skipped() {
        let matcher = matcher();
        assert!(matcher
            .todo_from_collection(Path::new("a.rs"), collection(" just a comment"))
            .is_none());
        assert!(matcher
            .todo_from_collection(Path::new("a.rs"), collection(" todo lowercase"))
            .is_none());
    }

    #[test]
    fn test_marker_is_stripped() {
        let matcher = matcher();
        let cases = [
            ("TODO: fix this", "fix this"),
            (" TODO fix this ", "fix this"),
            (" TODO, later", "later"),
            (" see TODO: below", "see  below"),
            (" TODO: a TODO: b", "a TODO: b"),
        ];
        for (text, expected) in cases {
            let item = matcher
                .todo_from_collection(Path::new("a.rs"), collection(text))
                .unwrap();
            assert_eq!(item.display_text(), expected, "{text:?}");
            assert_eq!(item.raw_text(), text);
            assert!(item.origin().is_none());
        }
    }

    #[test]
    fn test_custom_marker() {
        let matcher = TodoMatcher::new("FIXME(").unwrap();
        let item = matcher
            .todo_from_collection(Path::new("a.rs"), collection(" FIXME(bob): leak"))
            .unwrap();
        assert_eq!(item.display_text(), "bob): leak");
    }

    #[test]
    fn test_empty_marker_is_rejected() {
        let err = TodoMatcher::new("").unwrap_err();
        assert!(err.to_string().contains("Marker must not be empty"));
    }

    #[test]
    fn test_todos_from_collections_keeps_order() {
        let matcher = matcher();
        let items = matcher.todos_from_collections(
            Path::new("src/lib.rs"),
            vec![
                collection(" TODO: one"),
                collection(" nothing"),
                collection(" TODO: two"),
            ],
        );
        let texts: Vec<_> = items.iter().map(|i| i.display_text()).collect();
        assert_eq!(texts, vec!["one", "two"]);
        assert_eq!(items[0].source_path(), Path::new("src/lib.rs"));
    }

    #[test]
    fn test_filter_by_age() {
        let now = Utc.timestamp_opt(100 * 86_400, 0).unwrap();
        let items = vec![
            aged("Alice", 90 * 86_400),
            aged("Bob", 50 * 86_400),
            aged("Charlie", 0),
        ];
        let filtered = filter_by_age(items, "30days", now).unwrap();
        assert_eq!(filtered.len(), 2);

        assert!(filter_by_age(vec![], "soon", now).is_err());
    }

    #[test]
    fn test_filter_by_author() {
        let items = vec![aged("Alice", 10), aged("Bob", 20), aged("Charlie", 30)];
        let filtered = filter_by_author(items, "ALICE");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].origin().unwrap().author_name, "Alice");

        let filtered = filter_by_author(vec![aged("Bob", 1)], "bob@example");
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_filter_without_origin() {
        let unknown = matcher()
            .todo_from_collection(Path::new("a.rs"), collection(" TODO: x"))
            .unwrap();
        let now = Utc::now();
        assert!(filter_by_age(vec![unknown.clone()], "1s", now).unwrap().is_empty());
        assert!(filter_by_author(vec![unknown], "alice").is_empty());
    }
}
