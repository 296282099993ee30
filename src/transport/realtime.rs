//! WebSocket realtime transport.
//!
//! One background task owns the socket. It multiplexes outbound frames from
//! the session with inbound frames from the server, decodes the latter into
//! [`RealtimeEvent`]s and forwards them over an unbounded channel. `connect`
//! and `disconnect` events are synthesized from the socket lifecycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{Dispatch, EventReceiver, RestTransport, Transport};
use crate::error::{ConsoleError, Result};
use crate::protocol::{decode_frame, encode_execute, RealtimeEvent, StatsSnapshot};

pub struct RealtimeTransport {
    url: String,
    outbound: mpsc::UnboundedSender<WsMessage>,
    connected: Arc<AtomicBool>,
    rest: RestTransport,
}

impl RealtimeTransport {
    /// Open the WebSocket at `url`.
    ///
    /// `rest` serves `/api/stats` and carries commands while the socket is
    /// down. The returned receiver yields `Connected` first, then decoded
    /// server events, and finally `Disconnected` when the socket ends.
    pub async fn connect(
        url: &str,
        rest: RestTransport,
        connect_timeout: Duration,
    ) -> Result<(Self, EventReceiver)> {
        let handshake = tokio::time::timeout(connect_timeout, tokio_tungstenite::connect_async(url))
            .await
            .map_err(|_| ConsoleError::Connect {
                url: url.to_string(),
                detail: format!("handshake timed out after {connect_timeout:?}"),
            })?;
        let (ws_stream, _response) = handshake.map_err(|e| ConsoleError::Connect {
            url: url.to_string(),
            detail: e.to_string(),
        })?;

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let connected = Arc::new(AtomicBool::new(true));

        info!(url, "connected to server");
        let _ = event_tx.send(RealtimeEvent::Connected);

        tokio::spawn(pump(
            ws_stream,
            out_rx,
            event_tx,
            Arc::clone(&connected),
            url.to_string(),
        ));

        Ok((
            RealtimeTransport {
                url: url.to_string(),
                outbound: out_tx,
                connected,
                rest,
            },
            event_rx,
        ))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn emit(&self, command: &str) -> Result<String> {
        let request_id = Uuid::new_v4().to_string();
        let text = encode_execute(command, &request_id)?;
        self.outbound
            .send(WsMessage::Text(text))
            .map_err(|_| ConsoleError::ChannelClosed)?;
        Ok(request_id)
    }
}

async fn pump<S>(
    ws_stream: tokio_tungstenite::WebSocketStream<S>,
    mut outbound: mpsc::UnboundedReceiver<WsMessage>,
    events: mpsc::UnboundedSender<RealtimeEvent>,
    connected: Arc<AtomicBool>,
    url: String,
) where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    let (mut ws_sink, mut ws_stream) = ws_stream.split();

    loop {
        tokio::select! {
            msg = ws_stream.next() => {
                match msg {
                    Some(Ok(WsMessage::Text(text))) => match decode_frame(&text) {
                        Ok(Some(event)) => {
                            if events.send(event).is_err() {
                                break;
                            }
                        }
                        Ok(None) => debug!(frame = %text, "ignoring unhandled event"),
                        Err(e) => debug!(error = %e, "dropping malformed frame"),
                    },
                    Some(Ok(WsMessage::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, url = %url, "realtime channel error");
                        break;
                    }
                }
            }
            out = outbound.recv() => {
                match out {
                    Some(frame) => {
                        let closing = matches!(frame, WsMessage::Close(_));
                        if let Err(e) = ws_sink.send(frame).await {
                            warn!(error = %e, url = %url, "failed to write frame");
                            break;
                        }
                        if closing {
                            break;
                        }
                    }
                    None => {
                        let _ = ws_sink.send(WsMessage::Close(None)).await;
                        break;
                    }
                }
            }
        }
    }

    connected.store(false, Ordering::SeqCst);
    info!(url = %url, "disconnected from server");
    let _ = events.send(RealtimeEvent::Disconnected);
}

#[async_trait]
impl Transport for RealtimeTransport {
    fn name(&self) -> &'static str {
        "realtime"
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn dispatch(&self, command: &str) -> Result<Dispatch> {
        if self.is_connected() {
            let request_id = self.emit(command)?;
            debug!(request_id = %request_id, "emitted execute_command");
            Ok(Dispatch::Pending { request_id })
        } else {
            self.rest.dispatch(command).await
        }
    }

    async fn load_stats(&self) -> Result<StatsSnapshot> {
        self.rest.fetch_stats().await
    }

    async fn close(&self) {
        if self.connected.swap(false, Ordering::SeqCst) {
            let _ = self.outbound.send(WsMessage::Close(None));
        }
    }
}
