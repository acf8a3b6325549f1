use crate::cli::OutputFormat;
use crate::models::{Item, TodoReport};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use std::fs;
use std::path::Path;

/// Generate and output a report in the specified format
pub fn generate_report(report: &TodoReport, format: OutputFormat, output_path: Option<&Path>) -> Result<()> {
    let output = match format {
        OutputFormat::Terminal => format_terminal(report),
        OutputFormat::Markdown => format_markdown(report),
        OutputFormat::Json => format_json(report)?,
    };

    if let Some(path) = output_path {
        fs::write(path, output)
            .with_context(|| format!("Failed to write output to {}", path.display()))?;
        println!("Report written to {}", path.display());
    } else {
        println!("{}", output);
    }

    Ok(())
}

fn lines(item: &Item) -> String {
    if item.start_line() == item.end_line() {
        item.start_line().to_string()
    } else {
        format!("{}-{}", item.start_line(), item.end_line())
    }
}

/// Collapse multi-line comment text onto one line for tables
fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn sorted_authors(report: &TodoReport) -> Vec<(&String, &usize)> {
    let mut authors: Vec<_> = report.by_author.iter().collect();
    authors.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    authors.truncate(10);
    authors
}

/// Format report as terminal table
fn format_terminal(report: &TodoReport) -> String {
    format_terminal_at(report, Utc::now())
}

fn format_terminal_at(report: &TodoReport, now: DateTime<Utc>) -> String {
    let mut output = String::new();

    // Header
    let line = "─".repeat(58);
    output.push_str(&format!("╭{}╮\n", line));
    output.push_str(&format!("│ {:^56} │\n", "Stratum - TODO Report"));
    output.push_str(&format!("│ Scanned: {:<47} │\n", report.scan_path.display()));
    output.push_str(&format!("│ Total TODOs: {:<43} │\n", report.total_count));
    output.push_str(&format!("│ With known origin: {:<37} │\n", report.with_origin));
    output.push_str(&format!("╰{}╯\n\n", line));

    let authors = sorted_authors(report);
    if !authors.is_empty() {
        output.push_str("Summary by Author:\n");
        let mut author_table = Table::new();
        author_table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("Author").fg(Color::Cyan),
                Cell::new("Count").fg(Color::Cyan),
            ]);

        for (author, count) in authors {
            author_table.add_row(vec![author.as_str(), &count.to_string()]);
        }

        output.push_str(&format!("{}\n\n", author_table));
    }

    if !report.items.is_empty() {
        output.push_str("TODOs (oldest first, unknown origin on top):\n");
        let mut item_table = Table::new();
        item_table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("File").fg(Color::Cyan),
                Cell::new("Lines").fg(Color::Cyan),
                Cell::new("TODO").fg(Color::Cyan),
                Cell::new("Author").fg(Color::Cyan),
                Cell::new("Commit").fg(Color::Cyan),
                Cell::new("Age").fg(Color::Cyan),
            ]);

        for item in &report.items {
            let (author, commit) = match item.origin() {
                Some(origin) => (origin.author_name.clone(), origin.short_id().to_string()),
                None => ("unknown".to_string(), "unknown".to_string()),
            };
            item_table.add_row(vec![
                Cell::new(item.source_path().display().to_string()),
                Cell::new(lines(item)),
                Cell::new(one_line(item.display_text())),
                Cell::new(author),
                Cell::new(commit),
                Cell::new(item.age_display(now)),
            ]);
        }

        output.push_str(&format!("{}\n", item_table));
    }

    output
}

/// Format report as Markdown
fn format_markdown(report: &TodoReport) -> String {
    format_markdown_at(report, Utc::now())
}

fn format_markdown_at(report: &TodoReport, now: DateTime<Utc>) -> String {
    let mut output = String::new();

    output.push_str("# Stratum - TODO Report\n\n");
    output.push_str(&format!("**Scanned**: `{}`\n", report.scan_path.display()));
    output.push_str(&format!("**Total TODOs**: {}\n", report.total_count));
    output.push_str(&format!("**With known origin**: {}\n", report.with_origin));
    output.push_str(&format!(
        "**Generated**: {}\n\n",
        report.scan_time.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    let authors = sorted_authors(report);
    if !authors.is_empty() {
        output.push_str("## Summary by Author (Top 10)\n\n");
        for (author, count) in authors {
            output.push_str(&format!("- **{}**: {}\n", author, count));
        }
        output.push('\n');
    }

    if !report.items.is_empty() {
        output.push_str("## TODOs\n\n");

        for (idx, item) in report.items.iter().enumerate() {
            output.push_str(&format!(
                "{}. `{}:{}` {}\n",
                idx + 1,
                item.source_path().display(),
                lines(item),
                one_line(item.display_text())
            ));
            match item.origin() {
                Some(origin) => {
                    output.push_str(&format!(
                        "   - Author: {} <{}>\n",
                        origin.author_name, origin.author_email
                    ));
                    output.push_str(&format!("   - Added: {}\n", item.time_ago(now)));
                    output.push_str(&format!("   - Commit: {}\n", origin.id));
                }
                None => output.push_str("   - Origin: unknown\n"),
            }
            output.push('\n');
        }
    }

    output
}

/// Format report as JSON
fn format_json(report: &TodoReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::{commit, item};
    use chrono::TimeZone;
    use std::path::PathBuf;

    fn create_test_report() -> TodoReport {
        let mut known = item("src/main.rs", " TODO: implement this");
        known.attribute(commit("abcdef0123456789", "Alice", 0));
        let unknown = item("src/lib.rs", " TODO: no idea where\n   this came from");

        TodoReport::new(vec![known, unknown], PathBuf::from("/test/project"))
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(100 * 86_400, 0).unwrap()
    }

    #[test]
    fn test_format_terminal() {
        let report = create_test_report();
        let output = format_terminal_at(&report, now());

        assert!(output.contains("Stratum - TODO Report"));
        assert!(output.contains("Total TODOs: 2"));
        assert!(output.contains("implement this"));
        assert!(output.contains("no idea"));
        assert!(output.contains("Alice"));
        assert!(output.contains("abcdef0"));
        assert!(output.contains("3m"));
        assert!(output.contains("unknown"));
    }

    #[test]
    fn test_format_markdown() {
        let report = create_test_report();
        let output = format_markdown_at(&report, now());

        assert!(output.contains("# Stratum - TODO Report"));
        assert!(output.contains("**Total TODOs**: 2"));
        assert!(output.contains("**With known origin**: 1"));
        assert!(output.contains("`src/main.rs:1` implement this"));
        assert!(output.contains("Author: Alice <alice@example.com>"));
        assert!(output.contains("Added: 3months"));
        assert!(output.contains("Origin: unknown"));

        // Unknown origin is listed first
        let unknown_at = output.find("src/lib.rs").unwrap();
        let known_at = output.find("src/main.rs").unwrap();
        assert!(unknown_at < known_at);
    }

    #[test]
    fn test_format_json() {
        let report = create_test_report();
        let output = format_json(&report).unwrap();

        assert!(output.contains("\"display_text\""));
        assert!(output.contains("alice@example.com"));

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["total_count"], 2);
        assert_eq!(parsed["with_origin"], 1);
        assert!(parsed["items"][0]["origin"].is_null());
        assert_eq!(parsed["items"][1]["origin"]["id"], "abcdef0123456789");
    }
}
