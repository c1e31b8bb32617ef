//! WebSocket subscription to the agent's sample stream.

use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use crate::types::{StreamFrame, WireSample, PERFORMANCE_DATA};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// What the stream reader hands to the event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Sample(WireSample),
    /// A `performance_data` frame whose payload did not decode.
    Malformed(String),
    /// The socket failed or closed; no more events follow.
    Lost(String),
}

// Connect to the agent and return the WS stream
pub async fn connect(url: &str) -> Result<WsStream, tokio_tungstenite::tungstenite::Error> {
    let (ws, _) = connect_async(url).await?;
    Ok(ws)
}

/// Decode one text frame. `None` for events this client does not consume.
pub fn decode_frame(text: &str) -> Option<StreamEvent> {
    let frame: StreamFrame = match serde_json::from_str(text) {
        Ok(f) => f,
        Err(e) => return Some(StreamEvent::Malformed(format!("bad frame: {e}"))),
    };
    if frame.event != PERFORMANCE_DATA {
        return None;
    }
    Some(match serde_json::from_value::<WireSample>(frame.data) {
        Ok(s) => StreamEvent::Sample(s),
        Err(e) => StreamEvent::Malformed(e.to_string()),
    })
}

/// Read frames until the socket ends, forwarding them in arrival order.
pub async fn pump(mut ws: WsStream, tx: UnboundedSender<StreamEvent>) {
    while let Some(msg) = ws.next().await {
        let ev = match msg {
            Ok(Message::Text(text)) => decode_frame(&text),
            Ok(Message::Close(frame)) => {
                let reason = frame
                    .map(|f| f.reason.to_string())
                    .unwrap_or_else(|| "closed by agent".into());
                let _ = tx.send(StreamEvent::Lost(reason));
                return;
            }
            Ok(_) => None,
            Err(e) => {
                let _ = tx.send(StreamEvent::Lost(e.to_string()));
                return;
            }
        };
        if let Some(ev) = ev {
            if tx.send(ev).is_err() {
                // receiver gone, the app is shutting down
                return;
            }
        }
    }
    let _ = tx.send(StreamEvent::Lost("stream ended".into()));
}

/// Connect and run [`pump`] on its own task. Connection failures are reported
/// through the channel as `Lost`.
pub fn spawn_stream(url: String, tx: UnboundedSender<StreamEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        match connect(&url).await {
            Ok(ws) => {
                tracing::info!(%url, "sample stream subscribed");
                pump(ws, tx).await;
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "sample stream connect failed");
                let _ = tx.send(StreamEvent::Lost(e.to_string()));
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_performance_data() {
        let text = r#"{"event":"performance_data","data":{"timestamp":1.5,"fps":59.0,
            "cpu_freq":{"core_0":1800.0},"gpu_freq":585.0,"cpu_load":{"core_0":12.5},
            "gpu_load":33.0,"current":410.0,"power":1600.0}}"#;
        match decode_frame(text) {
            Some(StreamEvent::Sample(s)) => {
                assert_eq!(s.fps, 59.0);
                assert_eq!(s.cpu_load["core_0"], 12.5);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn ignores_other_events_and_flags_garbage() {
        assert_eq!(decode_frame(r#"{"event":"heartbeat"}"#), None);
        assert!(matches!(
            decode_frame("not json"),
            Some(StreamEvent::Malformed(_))
        ));
        assert!(matches!(
            decode_frame(r#"{"event":"performance_data","data":{"fps":1}}"#),
            Some(StreamEvent::Malformed(_))
        ));
    }
}
