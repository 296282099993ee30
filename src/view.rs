//! View binding.
//!
//! Sessions never touch a terminal directly. They drive a [`View`], which
//! offers the handful of capabilities a console page needs: render a log
//! line, overwrite a widget's text, flip a widget class, and replace a list.
//! [`MemoryView`] records everything for tests and headless use;
//! [`TerminalView`] prints to a writer with `colored` styling.

use std::collections::{BTreeSet, HashMap};
use std::io::Write;

use colored::*;

use crate::console::{LineStyle, LogLine};

/// Addressable widgets on the console page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Widget {
    Body,
    Input,
    Clock,
    ActiveTime,
    Date,
    Time,
    StatusDot,
    StatusText,
    CommandsRun,
    SuccessRate,
    HistoryList,
    ThemeButton,
    AssistantToggle,
    SelfOperatingToggle,
}

impl Widget {
    pub fn label(&self) -> &'static str {
        match self {
            Widget::Body => "body",
            Widget::Input => "input",
            Widget::Clock => "clock",
            Widget::ActiveTime => "active",
            Widget::Date => "date",
            Widget::Time => "time",
            Widget::StatusDot => "status-dot",
            Widget::StatusText => "status",
            Widget::CommandsRun => "commands run",
            Widget::SuccessRate => "success rate",
            Widget::HistoryList => "history",
            Widget::ThemeButton => "theme",
            Widget::AssistantToggle => "assistant",
            Widget::SelfOperatingToggle => "self-operating",
        }
    }
}

/// Rendering surface driven by a session.
pub trait View {
    /// Append a line to the console and reveal it.
    fn render_line(&mut self, line: &LogLine);

    /// Remove every console line.
    fn clear_lines(&mut self);

    /// Overwrite a widget's text.
    fn set_text(&mut self, widget: Widget, text: &str);

    /// Add (`on == true`) or remove a class on a widget.
    fn set_class(&mut self, widget: Widget, class: &str, on: bool);

    /// Replace a list widget's items.
    fn set_items(&mut self, widget: Widget, items: &[String]);

    /// One-line summary of the widget texts.
    fn status_summary(&self) -> String;
}

// ---------------------------------------------------------------------------
// MemoryView
// ---------------------------------------------------------------------------

/// A view that keeps everything in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryView {
    lines: Vec<LogLine>,
    texts: HashMap<Widget, String>,
    classes: HashMap<Widget, BTreeSet<String>>,
    items: HashMap<Widget, Vec<String>>,
    /// Index one past the newest line that has been revealed.
    scroll_position: usize,
}

impl MemoryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[LogLine] {
        &self.lines
    }

    pub fn last_line(&self) -> Option<&LogLine> {
        self.lines.last()
    }

    pub fn count_style(&self, style: LineStyle) -> usize {
        self.lines.iter().filter(|l| l.style == style).count()
    }

    pub fn text(&self, widget: Widget) -> Option<&str> {
        self.texts.get(&widget).map(String::as_str)
    }

    pub fn has_class(&self, widget: Widget, class: &str) -> bool {
        self.classes
            .get(&widget)
            .map(|set| set.contains(class))
            .unwrap_or(false)
    }

    pub fn items(&self, widget: Widget) -> &[String] {
        self.items.get(&widget).map(Vec::as_slice).unwrap_or(&[])
    }

    /// One-line summary of the widget texts, e.g.
    /// `10:42:07 AM | Online | active 3m | 5 run, 80%`.
    pub fn status_bar(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        for widget in [Widget::Date, Widget::Time, Widget::Clock, Widget::StatusText] {
            if let Some(text) = self.text(widget) {
                parts.push(text.to_string());
            }
        }
        if let Some(active) = self.text(Widget::ActiveTime) {
            parts.push(format!("active {active}"));
        }
        if let (Some(run), Some(rate)) = (self.text(Widget::CommandsRun), self.text(Widget::SuccessRate)) {
            parts.push(format!("{run} run, {rate}"));
        }
        parts.join(" | ")
    }

    /// True when the newest line is the one revealed.
    pub fn is_scrolled_to_end(&self) -> bool {
        self.scroll_position == self.lines.len()
    }
}

impl View for MemoryView {
    fn render_line(&mut self, line: &LogLine) {
        self.lines.push(line.clone());
        self.scroll_position = self.lines.len();
    }

    fn clear_lines(&mut self) {
        self.lines.clear();
        self.scroll_position = 0;
    }

    fn set_text(&mut self, widget: Widget, text: &str) {
        self.texts.insert(widget, text.to_string());
    }

    fn set_class(&mut self, widget: Widget, class: &str, on: bool) {
        let set = self.classes.entry(widget).or_default();
        if on {
            set.insert(class.to_string());
        } else {
            set.remove(class);
        }
    }

    fn set_items(&mut self, widget: Widget, items: &[String]) {
        self.items.insert(widget, items.to_vec());
    }

    fn status_summary(&self) -> String {
        self.status_bar()
    }
}

// ---------------------------------------------------------------------------
// TerminalView
// ---------------------------------------------------------------------------

/// Prints console lines to a writer.
///
/// Widgets that change every tick (clock, date, time, active time) are held
/// silently and shown by [`View::status_summary`]. Connection, stats,
/// history and toggle changes are printed as dim notice rows when they change.
/// Console lines go straight to the writer and are not retained.
pub struct TerminalView<W: Write> {
    out: W,
    color: bool,
    /// Widget text, classes and items only.
    state: MemoryView,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self {
            out,
            color,
            state: MemoryView::new(),
        }
    }

    /// Current widget state.
    pub fn state(&self) -> &MemoryView {
        &self.state
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, text: &str, style: LineStyle) -> String {
        if !self.color {
            return text.to_string();
        }
        let dark = self.state.has_class(Widget::Body, "dark-theme");
        let painted = match style {
            LineStyle::Command => text.cyan().bold(),
            LineStyle::Normal if dark => text.white(),
            LineStyle::Normal => text.normal(),
            LineStyle::Success => text.green(),
            LineStyle::Error => text.red().bold(),
            LineStyle::System => text.yellow(),
            LineStyle::Technical => text.bright_black(),
            LineStyle::Query => text.bright_blue(),
            LineStyle::Response if dark => text.bright_white(),
            LineStyle::Response => text.white(),
            LineStyle::Suggestion => text.magenta().italic(),
        };
        painted.to_string()
    }

    fn notice(&mut self, label: &str, value: &str) {
        let row = format!("  [{label}] {value}");
        let row = if self.color {
            row.dimmed().to_string()
        } else {
            row
        };
        let _ = writeln!(self.out, "{row}");
        let _ = self.out.flush();
    }
}

impl<W: Write> View for TerminalView<W> {
    fn render_line(&mut self, line: &LogLine) {
        for (i, row) in line.rows().enumerate() {
            let painted = self.paint(row, line.style);
            let _ = if i == 0 {
                writeln!(self.out, "{painted}")
            } else {
                writeln!(self.out, "  {painted}")
            };
        }
        let _ = self.out.flush();
    }

    fn clear_lines(&mut self) {
        // ANSI clear screen + home
        let _ = write!(self.out, "\x1b[2J\x1b[H");
        let _ = self.out.flush();
    }

    fn set_text(&mut self, widget: Widget, text: &str) {
        let changed = self.state.text(widget) != Some(text);
        self.state.set_text(widget, text);
        if !changed {
            return;
        }
        match widget {
            Widget::Clock | Widget::Date | Widget::Time | Widget::ActiveTime | Widget::Input => {}
            _ => self.notice(widget.label(), text),
        }
    }

    fn set_class(&mut self, widget: Widget, class: &str, on: bool) {
        self.state.set_class(widget, class, on);
    }

    fn set_items(&mut self, widget: Widget, items: &[String]) {
        self.state.set_items(widget, items);
        let label = widget.label();
        for item in items {
            self.notice(label, item);
        }
    }

    fn status_summary(&self) -> String {
        self.state.status_bar()
    }
}
