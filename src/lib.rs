//! Stratum - dig up where your TODOs came from
//!
//! Extracts comments from source files with a small delimiter-based lexer,
//! keeps the ones that carry a TODO marker, and walks git history backward to
//! find the commit that introduced each one.
//!
//! # Example
//!
//! ```rust,no_run
//! use stratum::*;
//! use std::path::Path;
//!
//! let config = config::load_config(None).unwrap();
//! let mut tables = lang::LanguageTables::new(&config.languages).unwrap();
//! let root = Path::new(".");
//! let mut items = scanner::scan_directory(root, root, &config, &mut tables).unwrap();
//!
//! if let Some(history) = git::GitHistory::discover(root, config.traversal).unwrap() {
//!     let head = history.head().unwrap();
//!     blame::resolve(&mut items, &history, &head, &blame::CancelToken::new(), None).unwrap();
//! }
//!
//! let report = models::TodoReport::new(items, root.to_path_buf());
//! ```

pub mod blame;
pub mod boundary;
pub mod cli;
pub mod config;
pub mod error;
pub mod filters;
pub mod git;
pub mod history;
pub mod lang;
pub mod models;
pub mod parser;
pub mod reporter;
pub mod scanner;

// Re-export commonly used types
pub use boundary::{Boundary, BoundaryTable};
pub use error::{ConfigError, HistoryError, ParseError};
pub use history::History;
pub use models::{CommitRef, Config, Item, TodoReport};
pub use parser::{Collection, Location};
