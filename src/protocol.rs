//! Wire types for the backend API.
//!
//! The REST endpoints speak plain JSON bodies. The realtime channel carries
//! JSON text frames shaped as `{"event": <name>, "data": <payload>}`.

use serde::{Deserialize, Serialize};

use crate::error::{ConsoleError, Result};

/// Outbound realtime event name.
pub const EXECUTE_COMMAND: &str = "execute_command";
/// Inbound realtime event names.
pub const COMMAND_STARTED: &str = "command_started";
pub const COMMAND_RESULT: &str = "command_result";
pub const CONNECT: &str = "connect";
pub const DISCONNECT: &str = "disconnect";

// -- REST bodies -------------------------------------------------------------

/// Body of `POST /api/execute`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRequest {
    pub command: String,
}

/// Aggregate counters maintained by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub commands_run: u64,
    #[serde(default)]
    pub success_rate: f64,
}

impl Stats {
    /// `success_rate` as shown in the stats panel, e.g. `80%` or `83.5%`.
    pub fn success_rate_label(&self) -> String {
        // f64 Display drops a zero fraction and never switches to exponents.
        format!("{}%", self.success_rate)
    }
}

/// One past command as reported by the backend, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub command: String,
}

/// Result of a command, from either `POST /api/execute` or a
/// `command_result` realtime event.
///
/// The two backends disagree on field names: one reports `success` and
/// `message`, the other `status` and `response`. Both shapes deserialize
/// into this struct and are read through [`is_success`](Self::is_success)
/// and [`text`](Self::text).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technical_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<Stats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<HistoryEntry>>,
    /// Echo of the id sent with `execute_command`, when the backend supports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl CommandResult {
    /// A `success` flag wins over `status`; `status == "success"` is the fallback.
    pub fn is_success(&self) -> bool {
        match self.success {
            Some(flag) => flag,
            None => self.status.as_deref() == Some("success"),
        }
    }

    /// Human-readable text, preferring `message` over `response`.
    pub fn text(&self) -> &str {
        self.message
            .as_deref()
            .or(self.response.as_deref())
            .unwrap_or("")
    }

    /// Response text, preferring `response` over `message`.
    pub fn response_text(&self) -> &str {
        self.response
            .as_deref()
            .or(self.message.as_deref())
            .unwrap_or("")
    }
}

/// Body of `GET /api/stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    #[serde(default)]
    pub stats: Option<Stats>,
    #[serde(default)]
    pub history: Option<Vec<HistoryEntry>>,
}

// -- Realtime frames ---------------------------------------------------------

/// Raw realtime frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Payload of an outbound `execute_command` frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteCommand {
    pub command: String,
    pub request_id: String,
}

#[derive(Debug, Deserialize)]
struct CommandStartedPayload {
    #[serde(default)]
    command: String,
}

/// Events delivered by the realtime channel to a session.
#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeEvent {
    Connected,
    Disconnected,
    CommandStarted { command: String },
    CommandResult(CommandResult),
}

/// Encode an `execute_command` frame.
pub fn encode_execute(command: &str, request_id: &str) -> Result<String> {
    let payload = ExecuteCommand {
        command: command.to_string(),
        request_id: request_id.to_string(),
    };
    let frame = serde_json::json!({ "event": EXECUTE_COMMAND, "data": payload });
    serde_json::to_string(&frame).map_err(|e| ConsoleError::Json {
        field: "execute_command".into(),
        detail: e.to_string(),
    })
}

/// Decode an inbound frame.
///
/// Returns `Ok(None)` for well-formed frames whose event name this client
/// does not handle.
pub fn decode_frame(text: &str) -> Result<Option<RealtimeEvent>> {
    let frame: Frame = serde_json::from_str(text).map_err(|e| ConsoleError::Json {
        field: "frame".into(),
        detail: e.to_string(),
    })?;

    let event = match frame.event.as_str() {
        CONNECT => RealtimeEvent::Connected,
        DISCONNECT => RealtimeEvent::Disconnected,
        COMMAND_STARTED => {
            let payload: CommandStartedPayload =
                serde_json::from_value(frame.data).map_err(|e| ConsoleError::Json {
                    field: COMMAND_STARTED.into(),
                    detail: e.to_string(),
                })?;
            RealtimeEvent::CommandStarted {
                command: payload.command,
            }
        }
        COMMAND_RESULT => {
            let result: CommandResult =
                serde_json::from_value(frame.data).map_err(|e| ConsoleError::Json {
                    field: COMMAND_RESULT.into(),
                    detail: e.to_string(),
                })?;
            RealtimeEvent::CommandResult(result)
        }
        _ => return Ok(None),
    };
    Ok(Some(event))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_flag_wins_over_status() {
        let r = CommandResult {
            success: Some(false),
            status: Some("success".into()),
            ..Default::default()
        };
        assert!(!r.is_success());
    }

    #[test]
    fn status_success_is_success_without_flag() {
        let r: CommandResult =
            serde_json::from_str(r#"{"status":"success","response":"done"}"#).unwrap();
        assert!(r.is_success());
        assert_eq!(r.text(), "done");
    }

    #[test]
    fn status_error_is_failure() {
        let r: CommandResult =
            serde_json::from_str(r#"{"status":"error","message":"No command provided"}"#).unwrap();
        assert!(!r.is_success());
        assert_eq!(r.text(), "No command provided");
    }

    #[test]
    fn empty_object_is_failure_with_empty_text() {
        let r: CommandResult = serde_json::from_str("{}").unwrap();
        assert!(!r.is_success());
        assert_eq!(r.text(), "");
        assert!(r.stats.is_none());
        assert!(r.history.is_none());
    }

    #[test]
    fn response_text_prefers_response() {
        let r = CommandResult {
            message: Some("m".into()),
            response: Some("r".into()),
            ..Default::default()
        };
        assert_eq!(r.text(), "m");
        assert_eq!(r.response_text(), "r");
    }

    #[test]
    fn success_rate_label_integral() {
        let s = Stats { commands_run: 5, success_rate: 80.0 };
        assert_eq!(s.success_rate_label(), "80%");
    }

    #[test]
    fn success_rate_label_fractional() {
        let s = Stats { commands_run: 3, success_rate: 66.5 };
        assert_eq!(s.success_rate_label(), "66.5%");
    }

    #[test]
    fn success_rate_label_huge_whole_number_does_not_saturate() {
        let s = Stats { commands_run: 1, success_rate: 1e300 };
        let label = s.success_rate_label();
        assert_eq!(label.len(), 302);
        assert!(label.starts_with('1'));
        assert!(label.ends_with("0%"));
        assert!(!label.contains("9223372036854775807"));
    }

    #[test]
    fn stats_accepts_integer_rate() {
        let s: Stats = serde_json::from_str(r#"{"commands_run":5,"success_rate":80}"#).unwrap();
        assert_eq!(s.commands_run, 5);
        assert_eq!(s.success_rate_label(), "80%");
    }

    #[test]
    fn encode_execute_shape() {
        let text = encode_execute("status", "abc").unwrap();
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["event"], "execute_command");
        assert_eq!(v["data"]["command"], "status");
        assert_eq!(v["data"]["request_id"], "abc");
    }

    #[test]
    fn decode_command_started() {
        let ev = decode_frame(r#"{"event":"command_started","data":{"command":"ls"}}"#).unwrap();
        assert_eq!(
            ev,
            Some(RealtimeEvent::CommandStarted { command: "ls".into() })
        );
    }

    #[test]
    fn decode_command_result_with_stats() {
        let text = r#"{"event":"command_result","data":{"success":true,"message":"ok",
            "stats":{"commands_run":2,"success_rate":100}}}"#;
        match decode_frame(text).unwrap() {
            Some(RealtimeEvent::CommandResult(r)) => {
                assert!(r.is_success());
                assert_eq!(r.stats.unwrap().commands_run, 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn decode_unknown_event_is_none() {
        assert_eq!(decode_frame(r#"{"event":"pong"}"#).unwrap(), None);
    }

    #[test]
    fn decode_garbage_is_json_error() {
        let err = decode_frame("not json").unwrap_err();
        assert!(matches!(err, ConsoleError::Json { .. }));
    }

    #[test]
    fn decode_connect_without_data() {
        assert_eq!(
            decode_frame(r#"{"event":"connect"}"#).unwrap(),
            Some(RealtimeEvent::Connected)
        );
    }
}
