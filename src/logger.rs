//! Operator-facing message sink.
//!
//! Everything the console reports to the operator (discovery counts,
//! resolution failures, interrupt guidance, tables) goes through [`Logger`].
//! Internal diagnostics use `tracing` instead and land on stderr.

use crossterm::style::Stylize;
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

/// Message severity understood by the logger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    UserInteract,
    Error,
}

impl Severity {
    fn marker(self) -> &'static str {
        match self {
            Self::Info => "[*]",
            Self::UserInteract => "[+]",
            Self::Error => "[!]",
        }
    }
}

/// A message handed to [`Logger::handle`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub severity: Severity,
    pub message: String,
}

enum Sink {
    Stdout,
    Capture {
        records: Vec<Record>,
        lines: Vec<String>,
    },
}

pub struct Logger {
    sink: Sink,
}

impl Logger {
    /// Logger writing coloured output to stdout
    #[must_use]
    pub fn stdout() -> Self {
        Self { sink: Sink::Stdout }
    }

    /// Logger keeping everything in memory, used by tests and benches
    #[must_use]
    pub fn capture() -> Self {
        Self {
            sink: Sink::Capture {
                records: Vec::new(),
                lines: Vec::new(),
            },
        }
    }

    /// Report a message with the given severity
    pub fn handle(&mut self, message: impl Into<String>, severity: Severity) {
        let message = message.into();
        match &mut self.sink {
            Sink::Stdout => {
                let marker = match severity {
                    Severity::Info => severity.marker().blue(),
                    Severity::UserInteract => severity.marker().green(),
                    Severity::Error => severity.marker().red(),
                };
                let mut out = io::stdout().lock();
                // A closed stdout leaves nothing useful to report to
                let _ = writeln!(out, "{marker} {message}");
            }
            Sink::Capture { records, lines } => {
                lines.push(format!("{} {}", severity.marker(), message));
                records.push(Record { severity, message });
            }
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.handle(message, Severity::Info);
    }

    pub fn user(&mut self, message: impl Into<String>) {
        self.handle(message, Severity::UserInteract);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.handle(message, Severity::Error);
    }

    /// Write a raw line, without severity marker
    pub fn print(&mut self, line: impl Into<String>) {
        let line = line.into();
        match &mut self.sink {
            Sink::Stdout => {
                let _ = writeln!(io::stdout().lock(), "{line}");
            }
            Sink::Capture { lines, .. } => lines.push(line),
        }
    }

    /// Render rows as an aligned table with an underlined header
    pub fn print_table<S: AsRef<str>>(&mut self, headers: &[&str], rows: &[Vec<S>]) {
        for line in format_table(headers, rows) {
            self.print(line);
        }
    }

    /// Messages recorded so far (empty for the stdout sink)
    #[must_use]
    pub fn records(&self) -> &[Record] {
        match &self.sink {
            Sink::Stdout => &[],
            Sink::Capture { records, .. } => records,
        }
    }

    /// Every rendered line recorded so far (empty for the stdout sink)
    #[must_use]
    pub fn lines(&self) -> &[String] {
        match &self.sink {
            Sink::Stdout => &[],
            Sink::Capture { lines, .. } => lines,
        }
    }

    /// Whether any recorded message of `severity` contains `needle`
    #[must_use]
    pub fn contains(&self, severity: Severity, needle: &str) -> bool {
        self.records()
            .iter()
            .any(|r| r.severity == severity && r.message.contains(needle))
    }

    /// Drop everything captured so far
    pub fn clear(&mut self) {
        if let Sink::Capture { records, lines } = &mut self.sink {
            records.clear();
            lines.clear();
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::stdout()
    }
}

fn format_table<S: AsRef<str>>(headers: &[&str], rows: &[Vec<S>]) -> Vec<String> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(cell.as_ref().width());
        }
    }

    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(render_row(&widths, headers.iter().copied()));
    let underline: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    lines.push(render_row(&widths, underline.iter().map(String::as_str)));
    for row in rows {
        lines.push(render_row(&widths, row.iter().map(AsRef::as_ref)));
    }
    lines
}

fn render_row<'a>(widths: &[usize], cells: impl Iterator<Item = &'a str>) -> String {
    let mut line = String::new();
    for (i, cell) in cells.enumerate().take(widths.len()) {
        if i > 0 {
            line.push_str("  ");
        }
        line.push_str(cell);
        let pad = widths[i].saturating_sub(cell.width());
        line.extend(std::iter::repeat(' ').take(pad));
    }
    line.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_records_severity() {
        let mut logger = Logger::capture();
        logger.info("hello");
        logger.error("boom");

        assert_eq!(logger.records().len(), 2);
        assert!(logger.contains(Severity::Error, "boom"));
        assert!(!logger.contains(Severity::Error, "hello"));
        assert_eq!(logger.lines()[0], "[*] hello");
    }

    #[test]
    fn test_table_alignment() {
        let rows = vec![
            vec!["help", "Show help"],
            vec!["setg", "Set a global option"],
        ];
        let lines = format_table(&["Command", "Description"], &rows);

        assert_eq!(lines[0], "Command  Description");
        assert_eq!(lines[1], "-------  -------------------");
        assert_eq!(lines[2], "help     Show help");
        assert_eq!(lines[3], "setg     Set a global option");
    }

    #[test]
    fn test_table_wide_characters() {
        let rows = vec![vec!["端口", "x"]];
        let lines = format_table(&["k", "v"], &rows);
        assert_eq!(lines[2], "端口  x");
    }
}
