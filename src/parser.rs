//! Streaming extraction of delimited spans.
//!
//! The parser reads runes one at a time and keeps a short sliding window of the
//! most recent ones, just long enough to compare against the longest delimiter
//! in the [`BoundaryTable`]. There is no nesting, escaping or string-literal
//! awareness: a span opens at the first matching start and closes at the first
//! following occurrence of that boundary's end.

use crate::boundary::{Boundary, BoundaryTable, CompiledBoundary};
use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::io::BufRead;

/// A 1-based line/column position. Columns count runes, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    fn advance(&mut self, c: char) {
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// Text captured between a start delimiter and its matching end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Inner text, delimiters excluded
    pub text: String,

    /// The boundary that opened and closed this span
    pub boundary: Boundary,

    /// Location of the first inner rune
    pub start: Location,

    /// Location of the rune immediately preceding the end delimiter
    pub end: Location,
}

/// Fixed-capacity ring of the most recent runes and where they were read.
///
/// Holds one rune more than the longest delimiter so the position just before
/// a matched end is still available.
struct Window {
    runes: VecDeque<(char, Location)>,
    capacity: usize,
}

impl Window {
    fn new(longest_delimiter: usize) -> Self {
        let capacity = longest_delimiter + 1;
        Self {
            runes: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, c: char, at: Location) {
        if self.runes.len() == self.capacity {
            self.runes.pop_front();
        }
        self.runes.push_back((c, at));
    }

    fn ends_with(&self, pattern: &[char]) -> bool {
        let len = self.runes.len();
        if pattern.len() > len {
            return false;
        }
        self.runes
            .iter()
            .skip(len - pattern.len())
            .map(|(c, _)| c)
            .eq(pattern.iter())
    }

    /// Location of the rune just before the trailing `n` runes
    fn location_before(&self, n: usize) -> Option<Location> {
        let len = self.runes.len();
        if n >= len {
            return None;
        }
        self.runes.get(len - n - 1).map(|(_, at)| *at)
    }
}

enum State<'t> {
    /// Looking for a start delimiter
    Scanning,
    /// Inside a span. `fresh` counts runes read since the start matched, so an
    /// end can never reuse runes of its own start.
    Collecting {
        boundary: &'t CompiledBoundary,
        text: String,
        start: Location,
        fresh: usize,
    },
}

struct Collector<'t> {
    table: &'t BoundaryTable,
    window: Window,
    cursor: Location,
    state: State<'t>,
    collections: Vec<Collection>,
}

impl<'t> Collector<'t> {
    fn new(table: &'t BoundaryTable) -> Self {
        Self {
            table,
            window: Window::new(table.window_size()),
            cursor: Location::default(),
            state: State::Scanning,
            collections: Vec::new(),
        }
    }

    fn feed(&mut self, c: char) {
        let here = self.cursor;
        self.cursor.advance(c);
        self.window.push(c, here);

        match &mut self.state {
            State::Scanning => {
                let table = self.table;
                let window = &self.window;
                let opened = table
                    .compiled()
                    .iter()
                    .find(|b| window.ends_with(&b.start));

                if let Some(boundary) = opened {
                    self.state = State::Collecting {
                        boundary,
                        text: String::new(),
                        start: self.cursor,
                        fresh: 0,
                    };
                }
            }
            State::Collecting {
                boundary,
                text,
                start,
                fresh,
            } => {
                text.push(c);
                *fresh += 1;

                let end_len = boundary.end.len();
                if *fresh >= end_len && self.window.ends_with(&boundary.end) {
                    for _ in 0..end_len {
                        text.pop();
                    }
                    let collection = Collection {
                        text: std::mem::take(text),
                        boundary: boundary.boundary.clone(),
                        start: *start,
                        end: self.window.location_before(end_len).unwrap_or(*start),
                    };
                    self.collections.push(collection);
                    self.state = State::Scanning;
                }
            }
        }
    }

    /// Spans still open at end of input are dropped
    fn finish(self) -> Vec<Collection> {
        self.collections
    }
}

/// Extract every closed span from a reader.
///
/// Input is decoded as UTF-8; invalid sequences become U+FFFD. A span that is
/// still open when the input ends is discarded. On a read failure nothing is
/// returned.
pub fn parse<R: BufRead>(mut reader: R, table: &BoundaryTable) -> Result<Vec<Collection>, ParseError> {
    let mut collector = Collector::new(table);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        // Splitting on '\n' never cuts a multi-byte UTF-8 sequence.
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        for c in String::from_utf8_lossy(&buf).chars() {
            collector.feed(c);
        }
    }

    Ok(collector.finish())
}

/// Extract every closed span from an in-memory string
pub fn parse_str(text: &str, table: &BoundaryTable) -> Vec<Collection> {
    let mut collector = Collector::new(table);
    for c in text.chars() {
        collector.feed(c);
    }
    collector.finish()
}
