//! Small page widgets: clock, connection status, stats, history, toggles.

use std::fmt;
use std::time::Duration;

use chrono::NaiveDateTime;

use crate::protocol::{HistoryEntry, Stats};
use crate::view::{View, Widget};

/// Clock refresh period.
pub const CLOCK_INTERVAL: Duration = Duration::from_secs(1);
/// Active-time refresh period.
pub const ACTIVE_TIME_INTERVAL: Duration = Duration::from_secs(60);
/// History items show at most this many characters of the command.
pub const HISTORY_PREVIEW_CHARS: usize = 40;
/// Placeholder item for an empty history.
pub const HISTORY_EMPTY: &str = "No commands yet";

// -- Clock -------------------------------------------------------------------

/// `10:42:07 AM`
pub fn format_clock(now: &NaiveDateTime) -> String {
    now.format("%I:%M:%S %p").to_string()
}

/// `Monday, January 5, 2026`
pub fn format_date(now: &NaiveDateTime) -> String {
    now.format("%A, %B %-d, %Y").to_string()
}

/// Whole minutes elapsed, e.g. `3m`.
pub fn format_active_time(elapsed: Duration) -> String {
    format!("{}m", elapsed.as_secs() / 60)
}

// -- Connection status -------------------------------------------------------

/// Liveness of the realtime channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    Online,
    #[default]
    Offline,
}

impl ConnectionState {
    pub fn is_online(&self) -> bool {
        matches!(self, ConnectionState::Online)
    }

    /// Apply to the status dot and text. `online` and `offline` are
    /// mutually exclusive classes.
    pub fn apply(&self, view: &mut dyn View) {
        let online = self.is_online();
        view.set_class(Widget::StatusDot, "online", online);
        view.set_class(Widget::StatusDot, "offline", !online);
        view.set_text(Widget::StatusText, &self.to_string());
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Online => write!(f, "Online"),
            ConnectionState::Offline => write!(f, "Offline"),
        }
    }
}

// -- Stats & history ---------------------------------------------------------

/// Overwrite the stats panel.
pub fn show_stats(view: &mut dyn View, stats: &Stats) {
    view.set_text(Widget::CommandsRun, &stats.commands_run.to_string());
    view.set_text(Widget::SuccessRate, &stats.success_rate_label());
}

/// Render history most-recent-first. The input is oldest-first as the
/// backend reports it.
pub fn history_items(history: &[HistoryEntry]) -> Vec<String> {
    if history.is_empty() {
        return vec![HISTORY_EMPTY.to_string()];
    }
    history
        .iter()
        .rev()
        .map(|item| format!("{} - {}", item.timestamp, preview(&item.command)))
        .collect()
}

fn preview(command: &str) -> String {
    let mut chars = command.chars();
    let head: String = chars.by_ref().take(HISTORY_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// Replace the history list.
pub fn show_history(view: &mut dyn View, history: &[HistoryEntry]) {
    view.set_items(Widget::HistoryList, &history_items(history));
}

// -- Toggles -----------------------------------------------------------------

/// A client-local switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleKind {
    Theme,
    Assistant,
    SelfOperating,
}

impl ToggleKind {
    pub fn widget(&self) -> Widget {
        match self {
            ToggleKind::Theme => Widget::ThemeButton,
            ToggleKind::Assistant => Widget::AssistantToggle,
            ToggleKind::SelfOperating => Widget::SelfOperatingToggle,
        }
    }
}

/// Toggle state held for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Toggles {
    pub dark_theme: bool,
    pub assistant_enabled: bool,
    pub self_operating_enabled: bool,
}

impl Default for Toggles {
    fn default() -> Self {
        Toggles {
            dark_theme: false,
            assistant_enabled: true,
            self_operating_enabled: true,
        }
    }
}

impl Toggles {
    pub fn get(&self, kind: ToggleKind) -> bool {
        match kind {
            ToggleKind::Theme => self.dark_theme,
            ToggleKind::Assistant => self.assistant_enabled,
            ToggleKind::SelfOperating => self.self_operating_enabled,
        }
    }

    /// Flip one switch and return its new value.
    pub fn flip(&mut self, kind: ToggleKind) -> bool {
        let slot = match kind {
            ToggleKind::Theme => &mut self.dark_theme,
            ToggleKind::Assistant => &mut self.assistant_enabled,
            ToggleKind::SelfOperating => &mut self.self_operating_enabled,
        };
        *slot = !*slot;
        *slot
    }

    /// Button label for the current value.
    pub fn label(&self, kind: ToggleKind) -> String {
        let on = self.get(kind);
        match kind {
            ToggleKind::Theme => format!("Theme: {}", if on { "Dark" } else { "Light" }),
            ToggleKind::Assistant => format!("Assistant: {}", on_off(on)),
            ToggleKind::SelfOperating => format!("Self-Operating: {}", on_off(on)),
        }
    }

    /// Console line announcing the current value.
    pub fn announcement(&self, kind: ToggleKind) -> String {
        let on = self.get(kind);
        match kind {
            ToggleKind::Theme => format!(
                "Theme switched to {} mode! 🎨",
                if on { "Dark" } else { "Light" }
            ),
            ToggleKind::Assistant => format!(
                "Assistant System {}!",
                if on { "Activated" } else { "Deactivated" }
            ),
            ToggleKind::SelfOperating => format!(
                "Self-Operating Mode {}!",
                if on { "Enabled" } else { "Disabled" }
            ),
        }
    }

    /// Push the visual state of one switch to the view.
    pub fn apply(&self, view: &mut dyn View, kind: ToggleKind) {
        let on = self.get(kind);
        if kind == ToggleKind::Theme {
            view.set_class(Widget::Body, "dark-theme", on);
        } else {
            view.set_class(kind.widget(), "active", on);
        }
        view.set_text(kind.widget(), &self.label(kind));
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "ON"
    } else {
        "OFF"
    }
}
