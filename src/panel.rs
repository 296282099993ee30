//! HTTP-only command panel with date/time display and cosmetic toggles.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tracing::debug;

use crate::console::{ConsoleLog, LineStyle, LogLine};
use crate::error::Result;
use crate::protocol::{CommandResult, RealtimeEvent};
use crate::runner::{Controller, Placeholder};
use crate::transport::{Dispatch, Transport};
use crate::view::{View, Widget};
use crate::widgets::{self, ToggleKind, Toggles};

pub const INITIALIZED: &str = "Command Console Initialized Successfully! 🚀";
pub const READY: &str = "Ready to assist you!";
pub const EMPTY_PROMPT: &str = "Please enter a command first!";
pub const PROCESSING: &str = "Processing your request...";
pub const CLEARED: &str = "Console cleared successfully!";
pub const READY_AFTER_CLEAR: &str = "Ready for new commands...";
pub const OFFLINE_HINT: &str =
    "This is a demo interface. Backend API connection will be established when integrated with the assistant core.";

pub struct PanelSession<V: View> {
    view: V,
    transport: Arc<dyn Transport>,
    log: ConsoleLog,
    input: String,
    toggles: Toggles,
}

impl<V: View> PanelSession<V> {
    pub fn new(view: V, transport: Box<dyn Transport>, max_lines: Option<usize>) -> Self {
        PanelSession {
            view,
            transport: Arc::from(transport),
            log: ConsoleLog::with_max_lines(max_lines),
            input: String::new(),
            toggles: Toggles::default(),
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn log(&self) -> &ConsoleLog {
        &self.log
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn toggles(&self) -> Toggles {
        self.toggles
    }

    pub fn log_line(&mut self, text: impl Into<String>, style: LineStyle) {
        let line = LogLine::new(text, style);
        self.view.render_line(&line);
        self.log.push(line);
    }

    /// Render a `/api/execute` result.
    pub fn render_result(&mut self, result: &CommandResult) {
        if result.is_success() {
            self.log_line(
                format!("Assistant: {}", result.response_text()),
                LineStyle::Response,
            );
            if let Some(details) = result.technical_details.as_deref().filter(|d| !d.is_empty()) {
                self.log_line(
                    format!("⚙ Technical Details:\n{details}"),
                    LineStyle::Technical,
                );
            }
        } else {
            self.log_line(format!("Error: {}", result.text()), LineStyle::System);
        }
    }
}

#[async_trait]
impl<V: View + Send> Controller for PanelSession<V> {
    fn log_line(&mut self, text: String, style: LineStyle) {
        PanelSession::log_line(self, text, style);
    }

    fn status_summary(&self) -> String {
        self.view.status_summary()
    }

    async fn mount(&mut self, now: NaiveDateTime) {
        self.tick_clock(now);
        for kind in [ToggleKind::Theme, ToggleKind::Assistant, ToggleKind::SelfOperating] {
            self.toggles.apply(&mut self.view, kind);
        }
        self.log_line(INITIALIZED, LineStyle::System);
        self.log_line(READY, LineStyle::Response);
    }

    async fn unmount(&mut self) {
        self.transport.close().await;
    }

    fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
        self.view.set_text(Widget::Input, text);
    }

    fn begin_submit(&mut self) -> Option<String> {
        let command = self.input.trim().to_string();
        if command.is_empty() {
            self.log_line(EMPTY_PROMPT, LineStyle::System);
            return None;
        }

        self.log_line(format!("User Command: {command}"), LineStyle::Query);
        self.input.clear();
        self.view.set_text(Widget::Input, "");
        self.log_line(PROCESSING, LineStyle::System);
        Some(command)
    }

    fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    fn finish_submit(&mut self, _command: &str, outcome: Result<Dispatch>) {
        match outcome {
            Ok(Dispatch::Completed(result)) => self.render_result(&result),
            Ok(Dispatch::Pending { request_id }) => {
                // Panels are built on the REST transport, which never defers.
                debug!(request_id = %request_id, "panel received a deferred dispatch");
            }
            Err(e) => {
                self.log_line(format!("Connection Error: {e}"), LineStyle::Error);
                self.log_line(OFFLINE_HINT, LineStyle::Suggestion);
            }
        }
    }

    fn handle_event(&mut self, event: RealtimeEvent) {
        debug!(?event, "panel ignores realtime events");
    }

    fn tick_clock(&mut self, now: NaiveDateTime) {
        self.view.set_text(Widget::Date, &widgets::format_date(&now));
        self.view.set_text(Widget::Time, &widgets::format_clock(&now));
    }

    fn toggle(&mut self, kind: ToggleKind) {
        self.toggles.flip(kind);
        self.toggles.apply(&mut self.view, kind);
        let announcement = self.toggles.announcement(kind);
        self.log_line(announcement, LineStyle::System);
    }

    fn placeholder(&mut self, control: Placeholder) {
        self.log_line(control.message(), LineStyle::System);
    }

    fn supports_clear(&self) -> bool {
        true
    }

    fn clear_console(&mut self, confirmed: bool) {
        if !confirmed {
            return;
        }
        self.log.clear();
        self.view.clear_lines();
        self.log_line(CLEARED, LineStyle::System);
        self.log_line(READY_AFTER_CLEAR, LineStyle::Response);
    }
}
