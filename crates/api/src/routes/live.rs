//! Live record streams
//!
//! `GET /api/channels/{id}/live` upgrades to a WebSocket and pushes each new
//! record as a JSON text frame. Records arriving while the client's mailbox
//! is full are dropped for that client only. When the channel is removed the
//! mailbox closes and the socket is closed from our side.

use std::sync::Arc;

use axum::{
    Router,
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
    routing::get,
};
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, warn};

use sift_channels::{Channel, Line, Subscription};

use crate::error::ApiError;
use crate::state::AppState;

/// Live stream routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/channels/{id}/live", get(live_handler))
}

/// Subscribe to a channel over WebSocket
///
/// GET /api/channels/{id}/live
///
/// The subscription is registered before the upgrade completes, so nothing
/// ingested after a successful response is missed. Its guard travels with
/// the upgrade callback: if the upgrade never happens, dropping the callback
/// still unsubscribes.
async fn live_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let channel = state.registry.lookup(&id)?;
    let subscription = channel.subscribe();
    let guard = SubscriptionGuard::new(channel, subscription.id());

    debug!(channel_id = %id, subscriber_id = subscription.id(), "live subscriber connected");

    Ok(ws
        .on_failed_upgrade(|e| warn!(error = %e, "live upgrade failed"))
        .on_upgrade(move |socket| stream_records(socket, guard, subscription)))
}

/// Unregisters the subscriber however the stream ends
struct SubscriptionGuard {
    channel: Arc<Channel>,
    subscriber_id: u64,
}

impl SubscriptionGuard {
    fn new(channel: Arc<Channel>, subscriber_id: u64) -> Self {
        Self {
            channel,
            subscriber_id,
        }
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        self.channel.unsubscribe(self.subscriber_id);
        debug!(
            channel_id = %self.channel.id(),
            subscriber_id = self.subscriber_id,
            "live subscriber disconnected"
        );
    }
}

async fn stream_records(socket: WebSocket, _guard: SubscriptionGuard, mut subscription: Subscription) {
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            record = subscription.recv() => {
                let Some(line) = record else {
                    // Channel removed or server shutting down
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                };

                let frame = match encode_frame(&line) {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!(error = %e, "failed to encode live record");
                        continue;
                    }
                };

                if sender.send(frame).await.is_err() {
                    break;
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    // Client messages carry nothing; only closure matters
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

fn encode_frame(line: &Line) -> serde_json::Result<Message> {
    let json = serde_json::to_string(line)?;
    Ok(Message::Text(json.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use sift_channels::LineFilter;

    #[test]
    fn test_guard_unsubscribes_when_upgrade_never_runs() {
        let channel = Arc::new(Channel::new("c", LineFilter::none()));
        let subscription = channel.subscribe();
        let guard = SubscriptionGuard::new(Arc::clone(&channel), subscription.id());

        // Stand-in for the upgrade callback being dropped unrun
        let callback = move || drop((guard, subscription));
        assert_eq!(channel.subscriber_count(), 1);
        drop(callback);

        assert_eq!(channel.subscriber_count(), 0);
    }

    #[test]
    fn test_content_frame() {
        let frame = encode_frame(&Line::content("GET /index 200")).unwrap();
        let Message::Text(text) = frame else {
            panic!("expected text frame");
        };

        let json: Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(json["text"], "GET /index 200");
        assert!(json.get("event").is_none());
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_event_frame() {
        let frame = encode_frame(&Line::event("changed filter: a -> b")).unwrap();
        let Message::Text(text) = frame else {
            panic!("expected text frame");
        };

        let json: Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(json["text"], "");
        assert_eq!(json["event"], "changed filter: a -> b");
    }
}
