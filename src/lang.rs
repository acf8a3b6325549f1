use crate::boundary::{Boundary, BoundaryTable};
use crate::error::ConfigError;
use std::collections::HashMap;
use std::path::Path;

const C_STYLE: &[(&str, &str)] = &[("//", "\n"), ("/*", "*/")];
const HASH: &[(&str, &str)] = &[("#", "\n")];
const DASH_DASH: &[(&str, &str)] = &[("--", "\n")];
const PYTHON: &[(&str, &str)] = &[("#", "\n"), ("\"\"\"", "\"\"\"")];
const PHP: &[(&str, &str)] = &[("//", "\n"), ("#", "\n"), ("/*", "*/")];
const MARKUP: &[(&str, &str)] = &[("<!--", "-->")];
const HASKELL: &[(&str, &str)] = &[("{-", "-}"), ("--", "\n")];
const LISP: &[(&str, &str)] = &[(";", "\n")];
const PERCENT: &[(&str, &str)] = &[("%", "\n")];

/// Built-in comment delimiters for a file extension
pub fn builtin(extension: &str) -> Option<&'static [(&'static str, &'static str)]> {
    let pairs = match extension.to_lowercase().as_str() {
        "rs" | "go" | "c" | "h" | "cc" | "cpp" | "cxx" | "hpp" | "hh" | "cs" | "java"
        | "kt" | "kts" | "scala" | "swift" | "js" | "mjs" | "cjs" | "jsx" | "ts" | "tsx"
        | "dart" | "proto" | "groovy" | "zig" | "css" | "scss" | "less" => C_STYLE,
        "py" | "pyw" => PYTHON,
        "rb" | "sh" | "bash" | "zsh" | "fish" | "pl" | "r" | "yaml" | "yml" | "toml"
        | "ex" | "exs" | "nim" | "cmake" | "dockerfile" | "mk" | "tf" => HASH,
        "sql" | "lua" | "ada" | "elm" => DASH_DASH,
        "hs" => HASKELL,
        "php" => PHP,
        "html" | "htm" | "xml" | "svg" | "md" | "vue" => MARKUP,
        "clj" | "cljs" | "lisp" | "el" | "scm" => LISP,
        "tex" | "erl" => PERCENT,
        _ => return None,
    };
    Some(pairs)
}

/// Extension → boundary-table lookup, with user overrides layered over the
/// built-ins. Every table is validated once, up front.
#[derive(Debug, Clone, Default)]
pub struct LanguageTables {
    tables: HashMap<String, BoundaryTable>,
    overrides: HashMap<String, BoundaryTable>,
}

impl LanguageTables {
    /// Build the lookup, validating every override
    pub fn new(overrides: &HashMap<String, Vec<Boundary>>) -> Result<Self, ConfigError> {
        let mut validated = HashMap::with_capacity(overrides.len());
        for (ext, boundaries) in overrides {
            let table = BoundaryTable::new(boundaries.clone())?;
            validated.insert(normalize(ext), table);
        }

        Ok(Self {
            tables: HashMap::new(),
            overrides: validated,
        })
    }

    /// Resolve and cache tables for every extension seen in `paths`
    pub fn prepare<'a>(&mut self, paths: impl IntoIterator<Item = &'a Path>) {
        for path in paths {
            let Some(ext) = extension_of(path) else {
                continue;
            };
            if self.tables.contains_key(&ext) || self.overrides.contains_key(&ext) {
                continue;
            }
            if let Some(pairs) = builtin(&ext) {
                // Built-in pairs are never empty, so this cannot fail.
                if let Ok(table) = BoundaryTable::from_pairs(pairs) {
                    self.tables.insert(ext, table);
                }
            }
        }
    }

    /// Table for a path, if its extension is known
    pub fn for_path(&self, path: &Path) -> Option<&BoundaryTable> {
        let ext = extension_of(path)?;
        self.overrides.get(&ext).or_else(|| self.tables.get(&ext))
    }
}

fn normalize(ext: &str) -> String {
    ext.trim_start_matches('.').to_lowercase()
}

fn extension_of(path: &Path) -> Option<String> {
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        return Some(normalize(ext));
    }
    // Extension-less files like `Dockerfile` or `Makefile`
    match path.file_name().and_then(|n| n.to_str())? {
        "Dockerfile" => Some("dockerfile".to_string()),
        "Makefile" | "makefile" | "GNUmakefile" => Some("mk".to_string()),
        _ => None,
    }
}
