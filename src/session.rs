//! Socket-first command console.
//!
//! A [`ConsoleSession`] owns everything a console page keeps between
//! events: the view, the transport, the log, the input buffer, the
//! connection state and the start time. It is built once per run and
//! driven by [`crate::runner`].

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::console::{ConsoleLog, LineStyle, LogLine};
use crate::error::Result;
use crate::protocol::{CommandResult, RealtimeEvent};
use crate::runner::Controller;
use crate::transport::{Dispatch, Transport};
use crate::view::{View, Widget};
use crate::widgets::{self, ConnectionState};

pub const WELCOME: &str = "Welcome to the Command Console! 👋";
pub const GET_STARTED: &str = "Type a command to get started.";
pub const PROCESSING: &str = "Processing...";

pub struct ConsoleSession<V: View> {
    view: V,
    transport: Arc<dyn Transport>,
    log: ConsoleLog,
    input: String,
    connection: ConnectionState,
    started_at: Instant,
    /// Request ids of commands emitted over the realtime channel whose
    /// results have not arrived yet, oldest first.
    pending: VecDeque<String>,
    mounted: bool,
}

impl<V: View> ConsoleSession<V> {
    pub fn new(view: V, transport: Box<dyn Transport>, max_lines: Option<usize>) -> Self {
        ConsoleSession {
            view,
            transport: Arc::from(transport),
            log: ConsoleLog::with_max_lines(max_lines),
            input: String::new(),
            connection: ConnectionState::Offline,
            started_at: Instant::now(),
            pending: VecDeque::new(),
            mounted: false,
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn log(&self) -> &ConsoleLog {
        &self.log
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    pub fn pending_requests(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(String::as_str)
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Append a styled line to the log and the view.
    pub fn log_line(&mut self, text: impl Into<String>, style: LineStyle) {
        let line = LogLine::new(text, style);
        self.view.render_line(&line);
        self.log.push(line);
    }

    /// Pre-fill the input without dispatching (quick-command buttons).
    pub fn set_command(&mut self, command: &str) {
        self.input = command.to_string();
        self.view.set_text(Widget::Input, command);
    }

    /// Load stats and history over REST. Failures are diagnostics only.
    pub async fn load_stats(&mut self) {
        match self.transport.load_stats().await {
            Ok(snapshot) => {
                if let Some(stats) = &snapshot.stats {
                    widgets::show_stats(&mut self.view, stats);
                }
                if let Some(history) = &snapshot.history {
                    widgets::show_history(&mut self.view, history);
                }
            }
            Err(e) => warn!(error = %e, "failed to load stats"),
        }
    }

    /// Render a command result and refresh stats and history when present.
    pub fn handle_result(&mut self, result: &CommandResult) {
        if result.is_success() {
            self.log_line(format!("✓ {}", result.text()), LineStyle::Success);
        } else {
            self.log_line(format!("❌ {}", result.text()), LineStyle::Error);
        }
        if let Some(stats) = &result.stats {
            widgets::show_stats(&mut self.view, stats);
        }
        if let Some(history) = &result.history {
            widgets::show_history(&mut self.view, history);
        }
    }

    fn set_connection(&mut self, state: ConnectionState) {
        self.connection = state;
        state.apply(&mut self.view);
    }

    /// Match a realtime result to an outstanding request.
    ///
    /// Results carrying a known id retire that id. Results carrying an
    /// unknown id are still shown. Results without an id retire the oldest
    /// outstanding request, last-writer-wins.
    /// Forget every outstanding request once the realtime channel drops.
    fn abandon_pending(&mut self) {
        for request_id in self.pending.drain(..) {
            warn!(request_id = %request_id, "realtime channel closed before result arrived");
        }
    }

    fn correlate(&mut self, result: &CommandResult) {
        match &result.request_id {
            Some(id) => match self.pending.iter().position(|p| p == id) {
                Some(0) => {
                    self.pending.pop_front();
                }
                Some(pos) => {
                    debug!(request_id = %id, overtaken = pos, "result arrived out of order");
                    self.pending.remove(pos);
                }
                None => warn!(request_id = %id, "result for unknown request"),
            },
            None => {
                self.pending.pop_front();
            }
        }
    }
}

#[async_trait]
impl<V: View + Send> Controller for ConsoleSession<V> {
    fn log_line(&mut self, text: String, style: LineStyle) {
        ConsoleSession::log_line(self, text, style);
    }

    fn status_summary(&self) -> String {
        self.view.status_summary()
    }

    async fn mount(&mut self, now: NaiveDateTime) {
        self.mounted = true;
        self.started_at = Instant::now();
        self.tick_clock(now);
        self.view.set_text(Widget::ActiveTime, &widgets::format_active_time(Duration::ZERO));
        self.set_connection(if self.transport.is_connected() {
            ConnectionState::Online
        } else {
            ConnectionState::Offline
        });
        self.load_stats().await;
        self.log_line(WELCOME, LineStyle::Success);
        self.log_line(GET_STARTED, LineStyle::Normal);
    }

    async fn unmount(&mut self) {
        self.transport.close().await;
        self.mounted = false;
        self.pending.clear();
    }

    fn set_input(&mut self, text: &str) {
        self.set_command(text);
    }

    fn begin_submit(&mut self) -> Option<String> {
        let command = self.input.trim().to_string();
        if command.is_empty() {
            return None;
        }
        self.input.clear();
        self.view.set_text(Widget::Input, "");

        self.log_line(format!("> {command}"), LineStyle::Command);
        Some(command)
    }

    fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    fn finish_submit(&mut self, _command: &str, outcome: Result<Dispatch>) {
        match outcome {
            Ok(Dispatch::Pending { request_id }) => self.pending.push_back(request_id),
            Ok(Dispatch::Completed(result)) => self.handle_result(&result),
            Err(e) => self.log_line(format!("❌ Error: {e}"), LineStyle::Error),
        }
    }

    fn handle_event(&mut self, event: RealtimeEvent) {
        if !self.mounted {
            debug!(?event, "session not mounted, ignoring event");
            return;
        }
        match event {
            RealtimeEvent::Connected => {
                info!("✓ Connected to server");
                self.set_connection(ConnectionState::Online);
            }
            RealtimeEvent::Disconnected => {
                info!("✗ Disconnected from server");
                self.set_connection(ConnectionState::Offline);
                self.abandon_pending();
            }
            RealtimeEvent::CommandStarted { command } => {
                self.log_line(format!("> {command}"), LineStyle::Command);
                self.log_line(PROCESSING, LineStyle::Normal);
            }
            RealtimeEvent::CommandResult(result) => {
                self.correlate(&result);
                self.handle_result(&result);
            }
        }
    }

    fn tick_clock(&mut self, now: NaiveDateTime) {
        self.view.set_text(Widget::Clock, &widgets::format_clock(&now));
    }

    fn tick_active_time(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.started_at);
        self.view.set_text(Widget::ActiveTime, &widgets::format_active_time(elapsed));
    }
}
