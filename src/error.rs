//! Crate-level error type.
//!
//! Every fallible transport and config operation returns [`ConsoleError`].
//! Sessions never surface these to the caller: they are rendered as console
//! lines at the session boundary.

use thiserror::Error;

/// Errors produced while talking to the backend or loading configuration.
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// A TCP or WebSocket connection could not be established.
    #[error("Connection failed to {url}: {detail}")]
    Connect { url: String, detail: String },

    /// The server replied with a non-2xx status and no usable JSON body.
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// A response body or frame could not be parsed.
    #[error("JSON parse error on field '{field}': {detail}")]
    Json { field: String, detail: String },

    /// The realtime channel is not connected or its writer has gone away.
    #[error("realtime channel closed")]
    ChannelClosed,

    /// The config file exists but is not valid.
    #[error("invalid config {path}: {detail}")]
    Config { path: String, detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
