//! Event loop for a console session.
//!
//! A session is mounted once, then driven from a single task by user input
//! lines, the clock tick, the active-time tick, realtime events and
//! completed dispatches. All session mutation happens here; nothing else
//! holds the session. Dispatches run as futures polled by the loop, so a
//! slow request never holds up ticks, events or input.

use std::io;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use futures_util::future::BoxFuture;
use futures_util::stream::FuturesUnordered;
use tokio::time::MissedTickBehavior;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::console::LineStyle;
use crate::error::Result;
use crate::protocol::RealtimeEvent;
use crate::transport::{Dispatch, EventReceiver, Transport};
use crate::widgets::{ToggleKind, ACTIVE_TIME_INTERVAL, CLOCK_INTERVAL};

pub const CLEAR_PROMPT: &str = "Are you sure you want to clear the console output? [y/N]";

/// Buttons that exist on the panel but have no behavior yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Settings,
    Volume,
    Power,
}

impl Placeholder {
    pub fn message(&self) -> &'static str {
        match self {
            Placeholder::Settings => "Settings panel coming soon...",
            Placeholder::Volume => "Volume controls coming soon...",
            Placeholder::Power => "Power options coming soon...",
        }
    }
}

/// Operations the runner drives on a session.
#[async_trait]
pub trait Controller: Send {
    fn log_line(&mut self, text: String, style: LineStyle);

    /// One-line summary of the widgets for `:info`.
    fn status_summary(&self) -> String;

    async fn mount(&mut self, now: NaiveDateTime);

    async fn unmount(&mut self);

    /// Replace the input buffer.
    fn set_input(&mut self, text: &str);

    /// Validate and echo the input buffer, clearing it. Returns the command
    /// to send, or `None` when there is nothing to dispatch.
    fn begin_submit(&mut self) -> Option<String>;

    fn transport(&self) -> Arc<dyn Transport>;

    /// Render the outcome of dispatching `command`.
    fn finish_submit(&mut self, command: &str, outcome: Result<Dispatch>);

    /// Dispatch the input buffer and wait for the outcome.
    async fn submit(&mut self) {
        if let Some(command) = self.begin_submit() {
            let outcome = self.transport().dispatch(&command).await;
            self.finish_submit(&command, outcome);
        }
    }

    fn handle_event(&mut self, event: RealtimeEvent);

    fn tick_clock(&mut self, now: NaiveDateTime);

    fn tick_active_time(&mut self, _now: Instant) {}

    fn toggle(&mut self, _kind: ToggleKind) {
        self.log_line("Toggles are only available in panel mode".into(), LineStyle::System);
    }

    fn placeholder(&mut self, _control: Placeholder) {
        self.log_line("That control is only available in panel mode".into(), LineStyle::System);
    }

    /// Whether `:clear` is offered (and therefore confirmed first).
    fn supports_clear(&self) -> bool {
        false
    }

    fn clear_console(&mut self, _confirmed: bool) {
        self.log_line("Clearing is only available in panel mode".into(), LineStyle::System);
    }
}

/// What one line of user input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Replace the input with this text and dispatch it.
    Command(String),
    /// Dispatch whatever is in the input buffer.
    Submit,
    /// Pre-fill the input buffer.
    Set(String),
    Toggle(ToggleKind),
    Placeholder(Placeholder),
    Clear,
    Info,
    Help,
    Quit,
    Unknown(String),
}

/// Parse a line typed at the prompt. Lines starting with `:` are console
/// controls; anything else is a backend command.
pub fn parse_input(line: &str) -> InputAction {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return InputAction::Submit;
    }
    let Some(rest) = trimmed.strip_prefix(':') else {
        return InputAction::Command(line.to_string());
    };
    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    match name {
        "set" => InputAction::Set(arg.to_string()),
        "theme" => InputAction::Toggle(ToggleKind::Theme),
        "assistant" => InputAction::Toggle(ToggleKind::Assistant),
        "self-operating" | "selfop" => InputAction::Toggle(ToggleKind::SelfOperating),
        "settings" => InputAction::Placeholder(Placeholder::Settings),
        "volume" => InputAction::Placeholder(Placeholder::Volume),
        "power" => InputAction::Placeholder(Placeholder::Power),
        "clear" => InputAction::Clear,
        "info" => InputAction::Info,
        "help" | "?" => InputAction::Help,
        "quit" | "q" | "exit" => InputAction::Quit,
        other => InputAction::Unknown(other.to_string()),
    }
}

const HELP: &[&str] = &[
    "Type a command and press Enter to send it.",
    ":set <cmd>   put <cmd> in the input; an empty line sends it",
    ":info        show clock, connection and stats",
    ":theme :assistant :self-operating   flip panel toggles",
    ":settings :volume :power            panel buttons",
    ":clear       clear the console (asks first)",
    ":quit        leave",
];

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

type InFlight = FuturesUnordered<BoxFuture<'static, (String, Result<Dispatch>)>>;

/// Start dispatching the input buffer without waiting for the outcome.
fn start_submit<C: Controller>(controller: &mut C, in_flight: &mut InFlight) {
    let Some(command) = controller.begin_submit() else {
        return;
    };
    let transport = controller.transport();
    in_flight.push(Box::pin(async move {
        let outcome = transport.dispatch(&command).await;
        (command, outcome)
    }));
}

async fn next_event(events: &mut Option<EventReceiver>) -> Option<RealtimeEvent> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Mount `controller`, run until `:quit` (or until the input ends and every
/// dispatch has resolved), then unmount.
pub async fn run<C, S>(controller: &mut C, mut lines: S, mut events: Option<EventReceiver>)
where
    C: Controller,
    S: Stream<Item = io::Result<String>> + Unpin + Send,
{
    controller.mount(local_now()).await;

    let mut clock = tokio::time::interval(CLOCK_INTERVAL);
    clock.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut active = tokio::time::interval(ACTIVE_TIME_INTERVAL);
    active.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut awaiting_clear = false;
    let mut input_done = false;
    let mut in_flight = InFlight::new();

    loop {
        let mut events_closed = false;
        tokio::select! {
            line = lines.next(), if !input_done => {
                let line = match line {
                    Some(Ok(line)) => line,
                    other => {
                        if let Some(Err(e)) = other {
                            warn!(error = %e, "failed to read input");
                        }
                        input_done = true;
                        if in_flight.is_empty() {
                            break;
                        }
                        continue;
                    }
                };

                if awaiting_clear {
                    awaiting_clear = false;
                    let answer = line.trim().to_ascii_lowercase();
                    controller.clear_console(answer == "y" || answer == "yes");
                    continue;
                }

                match parse_input(&line) {
                    InputAction::Command(command) => {
                        controller.set_input(&command);
                        start_submit(controller, &mut in_flight);
                    }
                    InputAction::Submit => start_submit(controller, &mut in_flight),
                    InputAction::Set(command) => controller.set_input(&command),
                    InputAction::Toggle(kind) => controller.toggle(kind),
                    InputAction::Placeholder(control) => controller.placeholder(control),
                    InputAction::Clear if controller.supports_clear() => {
                        controller.log_line(CLEAR_PROMPT.into(), LineStyle::System);
                        awaiting_clear = true;
                    }
                    InputAction::Clear => controller.clear_console(false),
                    InputAction::Info => {
                        let summary = controller.status_summary();
                        controller.log_line(summary, LineStyle::Normal);
                    }
                    InputAction::Help => {
                        for row in HELP {
                            controller.log_line((*row).to_string(), LineStyle::Normal);
                        }
                    }
                    InputAction::Quit => {
                        if !in_flight.is_empty() {
                            debug!(outstanding = in_flight.len(), "quitting with dispatches in flight");
                        }
                        break;
                    }
                    InputAction::Unknown(name) => {
                        controller.log_line(format!("Unknown control :{name} (try :help)"), LineStyle::System);
                    }
                }
            }
            Some((command, outcome)) = in_flight.next(), if !in_flight.is_empty() => {
                controller.finish_submit(&command, outcome);
            }
            _ = clock.tick() => controller.tick_clock(local_now()),
            _ = active.tick() => controller.tick_active_time(Instant::now()),
            event = next_event(&mut events) => match event {
                Some(event) => controller.handle_event(event),
                None => events_closed = true,
            },
        }
        if events_closed {
            debug!("realtime event channel closed");
            events = None;
        }
        if input_done && in_flight.is_empty() {
            break;
        }
    }

    controller.unmount().await;
}
