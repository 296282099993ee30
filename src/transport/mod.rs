//! # Transport
//!
//! How a session reaches the backend. Two implementations exist:
//!
//! - [`RestTransport`]: one `POST /api/execute` per command; the result is
//!   the response body.
//! - [`RealtimeTransport`]: emits `execute_command` over a WebSocket; the
//!   result arrives later as a `command_result` event on the receiver
//!   returned by [`RealtimeTransport::connect`]. While the socket is down it
//!   falls back to its inner REST transport.
//!
//! [`select_transport`] picks one at startup.

pub mod realtime;
pub mod rest;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::ConsoleConfig;
use crate::error::Result;
use crate::protocol::{CommandResult, RealtimeEvent, StatsSnapshot};

pub use realtime::RealtimeTransport;
pub use rest::{RestTransport, RestTransportBuilder};

/// Outcome of handing a command to a transport.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Sent; the result will arrive as a realtime event tagged `request_id`.
    Pending { request_id: String },
    /// The transport already has the result.
    Completed(CommandResult),
}

/// Receiver of realtime events, present only for socket transports.
pub type EventReceiver = mpsc::UnboundedReceiver<RealtimeEvent>;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    /// Whether a realtime channel is currently up.
    fn is_connected(&self) -> bool;

    /// Send one command.
    async fn dispatch(&self, command: &str) -> Result<Dispatch>;

    /// Fetch the current stats and history.
    async fn load_stats(&self) -> Result<StatsSnapshot>;

    /// Release the underlying connection. Idempotent.
    async fn close(&self) {}
}

/// Choose the session transport once.
///
/// With `http_only` set, or when the WebSocket handshake fails, the REST
/// transport is used and no event receiver is returned.
pub async fn select_transport(config: &ConsoleConfig) -> (Box<dyn Transport>, Option<EventReceiver>) {
    let rest = RestTransport::from_config(config);
    if config.http_only {
        info!(base_url = %config.base_url, "using HTTP transport");
        return (Box::new(rest), None);
    }

    match RealtimeTransport::connect(&config.ws_url, rest.clone(), config.connect_timeout()).await {
        Ok((transport, events)) => {
            info!(ws_url = %config.ws_url, "using realtime transport");
            (Box::new(transport), Some(events))
        }
        Err(e) => {
            warn!(error = %e, ws_url = %config.ws_url, "realtime channel unavailable, falling back to HTTP");
            (Box::new(rest), None)
        }
    }
}
