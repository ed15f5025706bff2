//! Table observer for pretty-printing sequence progress.
//!
//! This module provides [`TableObserver`], which renders a collection of
//! [`Observable`] sequences and groups as a formatted table using the
//! `tabled` crate.
//!
//! # Feature Flag
//!
//! This module requires the `table` feature:
//!
//! ```toml
//! [dependencies]
//! sequenze = { version = "0.1", features = ["table"] }
//! ```
//!
//! # Examples
//!
//! ## Standard format (vertical list)
//!
//! ```rust,ignore
//! use sequenze::sequences::sequence::Sequence;
//! use sequenze::sequences::Observable;
//! use sequenze::observers::table::{TableObserver, TableStyle};
//!
//! let cursor = Sequence::new(1000).with_name("cursor");
//! let journaler = Sequence::new(997).with_name("journaler");
//!
//! let sequences: Vec<&dyn Observable> = vec![&cursor, &journaler];
//! println!("{}", TableObserver::new().render(sequences.into_iter()));
//! // ╭───────────┬────────┬───────╮
//! // │ Name      │ Labels │ Value │
//! // ├───────────┼────────┼───────┤
//! // │ cursor    │        │ 1000  │
//! // │ journaler │        │ 997   │
//! // ╰───────────┴────────┴───────╯
//! ```
//!
//! ## Compact format (multiple columns)
//!
//! ```rust,ignore
//! let observer = TableObserver::new().compact(true).columns(3);
//! println!("{}", observer.render(sequences.into_iter()));
//! // ╭──────────────┬─────────────────┬─────────────────╮
//! // │ cursor: 1000 │ journaler: 997  │ replicator: 990 │
//! // ╰──────────────┴─────────────────┴─────────────────╯
//! ```

use crate::sequences::Observable;
use tabled::settings::object::Rows;
use tabled::settings::{Remove, Style};
use tabled::{builder::Builder, Table, Tabled};

/// Available table styles for rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TableStyle {
    /// ASCII table with simple characters: +, -, |
    Ascii,
    /// Modern rounded corners (default)
    #[default]
    Rounded,
    /// Sharp corners with box-drawing characters
    Sharp,
    /// Modern style with clean lines
    Modern,
    /// GitHub-flavored Markdown table
    Markdown,
    /// No borders, just spacing
    Blank,
}

/// Separator style between name and value in compact mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompactSeparator {
    /// Colon separator: "name: value"
    #[default]
    Colon,
    /// Equals separator: "name = value"
    Equals,
    /// Arrow separator: "name → value"
    Arrow,
}

impl CompactSeparator {
    /// Returns the separator string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompactSeparator::Colon => ": ",
            CompactSeparator::Equals => " = ",
            CompactSeparator::Arrow => " → ",
        }
    }
}

/// Configuration for the table observer.
#[derive(Debug, Clone)]
pub struct TableConfig {
    /// The style to use for rendering.
    pub style: TableStyle,
    /// Whether to show the header row (only in non-compact mode).
    pub show_header: bool,
    /// Custom title for the table (optional).
    pub title: Option<String>,
    /// Whether to use compact format (name: value in cells).
    pub compact: bool,
    /// Number of columns in compact mode (default: 1).
    pub columns: usize,
    /// Separator between name and value in compact mode.
    pub separator: CompactSeparator,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            style: TableStyle::default(),
            show_header: true,
            title: None,
            compact: false,
            columns: 1,
            separator: CompactSeparator::default(),
        }
    }
}

#[derive(Tabled)]
struct SequenceRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Labels")]
    labels: String,
    #[tabled(rename = "Value")]
    value: i64,
}

/// An observer that renders sequences as a formatted table.
///
/// Supports two rendering modes:
///
/// 1. **Standard mode**: Name / Labels / Value columns, one row per sequence
/// 2. **Compact mode**: grid of `name{labels}: value` cells
#[derive(Debug, Clone, Default)]
pub struct TableObserver {
    config: TableConfig,
}

impl TableObserver {
    /// Creates a new table observer with default settings.
    ///
    /// Default style is [`TableStyle::Rounded`] in standard (non-compact) mode.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new table observer with the specified configuration.
    pub fn with_config(config: TableConfig) -> Self {
        Self { config }
    }

    /// Sets the table style.
    pub fn with_style(mut self, style: TableStyle) -> Self {
        self.config.style = style;
        self
    }

    /// Sets whether to show the header row.
    ///
    /// Only applies in standard (non-compact) mode.
    pub fn with_header(mut self, show: bool) -> Self {
        self.config.show_header = show;
        self
    }

    /// Sets an optional title printed above the table.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.title = Some(title.into());
        self
    }

    /// Enables or disables compact mode.
    pub fn compact(mut self, enabled: bool) -> Self {
        self.config.compact = enabled;
        self
    }

    /// Sets the number of columns in compact mode.
    ///
    /// Values less than 1 are treated as 1.
    pub fn columns(mut self, count: usize) -> Self {
        self.config.columns = count.max(1);
        self
    }

    /// Sets the separator between name and value in compact mode.
    pub fn separator(mut self, sep: CompactSeparator) -> Self {
        self.config.separator = sep;
        self
    }

    fn apply_style(&self, table: &mut Table) {
        match self.config.style {
            TableStyle::Ascii => table.with(Style::ascii()),
            TableStyle::Rounded => table.with(Style::rounded()),
            TableStyle::Sharp => table.with(Style::sharp()),
            TableStyle::Modern => table.with(Style::modern()),
            TableStyle::Markdown => table.with(Style::markdown()),
            TableStyle::Blank => table.with(Style::blank()),
        };
    }

    fn finish(&self, table: Table) -> String {
        match self.config.title {
            Some(ref title) => format!("{}\n{}", title, table),
            None => table.to_string(),
        }
    }

    fn render_compact<'a>(&self, sequences: impl Iterator<Item = &'a dyn Observable>) -> String {
        let cells: Vec<String> = sequences
            .map(|s| {
                let labels = format_labels(s.labels());
                let name = if labels.is_empty() {
                    display_name(s.name()).to_string()
                } else {
                    format!("{}{{{}}}", display_name(s.name()), labels)
                };
                format!("{}{}{}", name, self.config.separator.as_str(), s.value())
            })
            .collect();

        if cells.is_empty() {
            return String::new();
        }

        let cols = self.config.columns;
        let mut builder = Builder::default();
        for chunk in cells.chunks(cols) {
            let mut row = chunk.to_vec();
            row.resize(cols, String::new());
            builder.push_record(row);
        }

        let mut table = builder.build();
        self.apply_style(&mut table);
        self.finish(table)
    }

    fn render_standard<'a>(&self, sequences: impl Iterator<Item = &'a dyn Observable>) -> String {
        let rows: Vec<SequenceRow> = sequences
            .map(|s| SequenceRow {
                name: display_name(s.name()).to_string(),
                labels: format_labels(s.labels()),
                value: s.value(),
            })
            .collect();

        let mut table = Table::new(&rows);
        self.apply_style(&mut table);

        if !self.config.show_header {
            table.with(Remove::row(Rows::first()));
        }

        self.finish(table)
    }

    /// Renders the sequences as a formatted table string.
    ///
    /// Groups are rendered with their gating value.
    pub fn render<'a>(&self, sequences: impl Iterator<Item = &'a dyn Observable>) -> String {
        if self.config.compact {
            self.render_compact(sequences)
        } else {
            self.render_standard(sequences)
        }
    }
}

fn display_name(name: &str) -> &str {
    if name.is_empty() {
        "(unnamed)"
    } else {
        name
    }
}

fn format_labels(labels: &[(String, String)]) -> String {
    labels
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::Labeled;
    use crate::sequences::group::SequenceGroup;
    use crate::sequences::sequence::Sequence;
    use std::sync::Arc;

    #[test]
    fn test_render_empty() {
        let sequences: Vec<&dyn Observable> = vec![];
        let output = TableObserver::new().render(sequences.into_iter());
        // Header only.
        assert!(output.contains("Name"));
    }

    #[test]
    fn test_render_empty_compact() {
        let sequences: Vec<&dyn Observable> = vec![];
        let output = TableObserver::new()
            .compact(true)
            .columns(3)
            .render(sequences.into_iter());
        assert!(output.is_empty());
    }

    #[test]
    fn test_render_single_sequence() {
        let cursor = Sequence::new(42).with_name("cursor");
        let sequences: Vec<&dyn Observable> = vec![&cursor];
        let output = TableObserver::new().render(sequences.into_iter());

        assert!(output.contains("cursor"));
        assert!(output.contains("42"));
    }

    #[test]
    fn test_render_group_with_labels() {
        let group = Labeled::new(SequenceGroup::new().with_name("gating"))
            .with_label("ring", "orders")
            .with_label("stage", "2");
        group.add(Arc::new(Sequence::new(17)));
        group.add(Arc::new(Sequence::new(21)));

        let sequences: Vec<&dyn Observable> = vec![&group];
        let output = TableObserver::new().render(sequences.into_iter());

        assert!(output.contains("gating"));
        assert!(output.contains("ring=orders,stage=2"));
        assert!(output.contains("17"));
        assert!(!output.contains("21"));
    }

    #[test]
    fn test_render_compact_multiple_columns() {
        let a = Sequence::new(1).with_name("a");
        let b = Sequence::new(2).with_name("b");
        let c = Sequence::new(3).with_name("c");
        let sequences: Vec<&dyn Observable> = vec![&a, &b, &c];

        let output = TableObserver::new()
            .compact(true)
            .columns(2)
            .separator(CompactSeparator::Equals)
            .render(sequences.into_iter());

        assert!(output.contains("a = 1"));
        assert!(output.contains("b = 2"));
        assert!(output.contains("c = 3"));
        // Two rows of cells.
        assert_eq!(output.lines().filter(|l| l.contains(" = ")).count(), 2);
    }

    #[test]
    fn test_render_compact_labeled() {
        let sequence = Labeled::new(Sequence::new(5).with_name("consumer")).with_label("id", "7");
        let sequences: Vec<&dyn Observable> = vec![&sequence];

        let output = TableObserver::new()
            .compact(true)
            .render(sequences.into_iter());
        assert!(output.contains("consumer{id=7}: 5"));
    }

    #[test]
    fn test_render_with_title_and_without_header() {
        let cursor = Sequence::new(1).with_name("cursor");
        let sequences: Vec<&dyn Observable> = vec![&cursor];

        let output = TableObserver::new()
            .with_title("Progress")
            .with_header(false)
            .with_style(TableStyle::Ascii)
            .render(sequences.into_iter());

        assert!(output.starts_with("Progress\n"));
        assert!(!output.contains("Name"));
        assert!(output.contains("cursor"));
    }

    #[test]
    fn test_render_unnamed() {
        let sequence = Sequence::new(0);
        let sequences: Vec<&dyn Observable> = vec![&sequence];
        let output = TableObserver::new().render(sequences.into_iter());
        assert!(output.contains("(unnamed)"));
    }

    #[test]
    fn test_columns_min_value() {
        let observer = TableObserver::new().columns(0);
        assert_eq!(observer.config.columns, 1);
    }
}
