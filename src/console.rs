//! The console log: an ordered sequence of styled lines.

use std::collections::VecDeque;
use std::fmt;

/// Style category of a console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineStyle {
    Command,
    Normal,
    Success,
    Error,
    System,
    Technical,
    Query,
    Response,
    Suggestion,
}

impl LineStyle {
    /// Class name as used by the view layer.
    pub fn class(&self) -> &'static str {
        match self {
            LineStyle::Command => "command",
            LineStyle::Normal => "normal",
            LineStyle::Success => "success",
            LineStyle::Error => "error",
            LineStyle::System => "system-message",
            LineStyle::Technical => "technical-message",
            LineStyle::Query => "query-message",
            LineStyle::Response => "response-message",
            LineStyle::Suggestion => "suggestion-message",
        }
    }

    /// Whether this style reports a failure to the user.
    pub fn is_error(&self) -> bool {
        matches!(self, LineStyle::Error)
    }
}

impl fmt::Display for LineStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class())
    }
}

/// One line of console output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub text: String,
    pub style: LineStyle,
}

impl LogLine {
    pub fn new(text: impl Into<String>, style: LineStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Text split at embedded newlines, one entry per displayed row.
    pub fn rows(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }
}

/// Append-only console log with an optional line cap.
///
/// With no cap the log grows for the lifetime of the session. With a cap
/// the oldest line is evicted once the cap is reached.
#[derive(Debug, Clone, Default)]
pub struct ConsoleLog {
    lines: VecDeque<LogLine>,
    max_lines: Option<usize>,
}

impl ConsoleLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_lines(max_lines: Option<usize>) -> Self {
        Self {
            lines: VecDeque::new(),
            max_lines: max_lines.filter(|n| *n > 0),
        }
    }

    /// Append a line, evicting the oldest one when over the cap.
    pub fn push(&mut self, line: LogLine) {
        if let Some(max) = self.max_lines {
            while self.lines.len() >= max {
                self.lines.pop_front();
            }
        }
        self.lines.push_back(line);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn last(&self) -> Option<&LogLine> {
        self.lines.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogLine> {
        self.lines.iter()
    }

    /// Number of lines with the given style.
    pub fn count_style(&self, style: LineStyle) -> usize {
        self.lines.iter().filter(|l| l.style == style).count()
    }
}
