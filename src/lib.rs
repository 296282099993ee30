//! # command-console
//!
//! A terminal command console for an assistant backend. Commands typed at
//! the prompt are sent over a WebSocket realtime channel (or a REST
//! fallback), results are rendered into a styled console log, and a few
//! widgets track the clock, connection status, stats and command history.
//!
//! Two consoles are provided:
//!
//! - [`ConsoleSession`]: socket-first, with status, stats and history.
//! - [`PanelSession`]: HTTP-only, with date/time and cosmetic toggles.
//!
//! Both render through the [`View`] trait and reach the backend through the
//! [`Transport`] trait, so they run unchanged against a terminal or an
//! in-memory view.

pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod panel;
pub mod protocol;
pub mod runner;
pub mod session;
pub mod transport;
pub mod view;
pub mod widgets;

pub use config::ConsoleConfig;
pub use console::{ConsoleLog, LineStyle, LogLine};
pub use error::ConsoleError;
pub use panel::PanelSession;
pub use protocol::{CommandResult, HistoryEntry, RealtimeEvent, Stats};
pub use runner::Controller;
pub use session::ConsoleSession;
pub use transport::{select_transport, Dispatch, RealtimeTransport, RestTransport, Transport};
pub use view::{MemoryView, TerminalView, View, Widget};
