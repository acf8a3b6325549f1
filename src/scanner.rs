use crate::filters::TodoMatcher;
use crate::lang::LanguageTables;
use crate::models::{Config, Item};
use crate::parser;
use anyhow::{Context, Result};
use ignore::WalkBuilder;
use rayon::prelude::*;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10MB

/// Scan a directory for TODO comments.
///
/// `base` is the directory item paths are made relative to, normally the
/// repository work dir, so they line up with paths in history diffs.
pub fn scan_directory(
    root: &Path,
    base: &Path,
    config: &Config,
    tables: &mut LanguageTables,
) -> Result<Vec<Item>> {
    let matcher = TodoMatcher::new(&config.marker)?;
    let files = collect_files(root, config);
    tables.prepare(files.iter().map(PathBuf::as_path));

    let tables: &LanguageTables = tables;
    let per_file: Vec<Vec<Item>> = files
        .par_iter()
        .filter_map(|path| tables.for_path(path).map(|table| (path, table)))
        .map(|(path, table)| -> Result<Vec<Item>> {
            let file = File::open(path)
                .with_context(|| format!("Failed to open file: {}", path.display()))?;
            let collections = parser::parse(BufReader::new(file), table)
                .with_context(|| format!("Failed to parse file: {}", path.display()))?;

            let relative = path.strip_prefix(base).unwrap_or(path);
            Ok(matcher.todos_from_collections(relative, collections))
        })
        .collect::<Result<_>>()?;

    let items: Vec<Item> = per_file.into_iter().flatten().collect();
    debug!(files = files.len(), items = items.len(), "scan finished");
    Ok(items)
}

/// Walk `root` and return candidate files, sorted by path
fn collect_files(root: &Path, config: &Config) -> Vec<PathBuf> {
    let mut walker = WalkBuilder::new(root);
    walker.standard_filters(true); // Respect .gitignore

    let ignored_dirs = config.ignored_dirs.clone();
    walker.filter_entry(move |entry| {
        let name = entry.file_name().to_str().unwrap_or("");
        !ignored_dirs.iter().any(|ignored| ignored == name)
    });

    let mut files = Vec::new();
    for result in walker.build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                warn!(%err, "skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }

        if let Ok(metadata) = entry.metadata() {
            if metadata.len() > MAX_FILE_SIZE {
                debug!(path = %entry.path().display(), "skipping large file");
                continue;
            }
        }

        if is_likely_binary(entry.path()) {
            continue;
        }

        files.push(entry.into_path());
    }

    files.sort();
    files
}

/// Check if a file is likely binary
pub fn is_likely_binary(path: &Path) -> bool {
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        matches!(
            ext.to_lowercase().as_str(),
            "png" | "jpg" | "jpeg" | "gif" | "ico" | "pdf" | "zip" | "tar" | "gz" | "exe" | "dll" | "so" | "dylib" | "bin" | "dat"
        )
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn scan(dir: &TempDir, config: &Config) -> Vec<Item> {
        let mut tables = LanguageTables::new(&config.languages).unwrap();
        scan_directory(dir.path(), dir.path(), config, &mut tables).unwrap()
    }

    #[test]
    fn test_scan_finds_todos_across_languages() {
        let temp_dir = TempDir::new().unwrap();
        write(
            temp_dir.path(),
            "src/main.rs",
            "fn main() {\n    // TODO: implement this\n    /* TODO: and\n       this */\n}\n",
        );
        write(temp_dir.path(), "script.py", "# TODO: python side\nx = 1  # not this\n");
        write(temp_dir.path(), "notes.txt", "TODO: unknown extension\n");

        let items = scan(&temp_dir, &Config::default());
        let found: Vec<_> = items
            .iter()
            .map(|i| (i.source_path().to_path_buf(), i.display_text().to_string()))
            .collect();

        assert_eq!(
            found,
            vec![
                (PathBuf::from("script.py"), "python side".to_string()),
                (PathBuf::from("src/main.rs"), "implement this".to_string()),
                (PathBuf::from("src/main.rs"), "and\n       this".to_string()),
            ]
        );
        assert_eq!(items[1].start_line(), 2);
        assert_eq!(items[2].start_line(), 3);
        assert_eq!(items[2].end_line(), 4);
    }

    #[test]
    fn test_scan_skips_ignored_dirs() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "node_modules/dep.js", "// TODO: not mine\n");
        write(temp_dir.path(), "app.js", "// TODO: mine\n");

        let items = scan(&temp_dir, &Config::default());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].display_text(), "mine");
    }

    #[test]
    fn test_scan_uses_configured_marker_and_languages() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "a.rs", "// FIXME: tune\n// TODO: ignored\n");
        write(temp_dir.path(), "b.ini", "; FIXME: ini comment\n");

        let mut languages = HashMap::new();
        languages.insert(
            "ini".to_string(),
            vec![crate::boundary::Boundary::new(";", "\n")],
        );
        let config = Config {
            marker: "FIXME".to_string(),
            languages,
            ..Config::default()
        };

        let items = scan(&temp_dir, &config);
        let texts: Vec<_> = items.iter().map(|i| i.display_text()).collect();
        assert_eq!(texts, vec!["tune", "ini comment"]);
    }

    #[test]
    fn test_paths_relative_to_base() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "pkg/src/lib.rs", "// TODO: nested\n");

        let mut tables = LanguageTables::default();
        let items = scan_directory(
            &temp_dir.path().join("pkg"),
            temp_dir.path(),
            &Config::default(),
            &mut tables,
        )
        .unwrap();
        assert_eq!(items[0].source_path(), Path::new("pkg/src/lib.rs"));
    }

    #[test]
    fn test_is_likely_binary() {
        assert!(is_likely_binary(Path::new("image.png")));
        assert!(is_likely_binary(Path::new("document.pdf")));
        assert!(!is_likely_binary(Path::new("code.rs")));
        assert!(!is_likely_binary(Path::new("script.py")));
    }
}
