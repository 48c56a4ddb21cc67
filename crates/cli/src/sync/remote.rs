// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Handler that delivers actions to a remote endpoint over a [`Transport`].
//!
//! Each action is sent as a `deliver` message keyed by its ID. The endpoint
//! answers with an ack (applied or duplicate) or a reject for that key.
//! Anything that leaves the result unknown (a dropped connection, a server
//! error) is retryable; the next attempt reuses the key so the endpoint can
//! collapse the duplicate.

use sq_core::payload::to_envelope;
use sq_core::protocol::{ClientMessage, ServerMessage};
use sq_core::{ActionId, ActionPayload, Outcome};
use tokio::sync::Mutex;

use super::registry::{ActionHandler, HandlerFuture};
use super::transport::{Transport, TransportError, WebSocketTransport};

/// Delivers every action type to one endpoint, one action at a time.
pub struct RemoteHandler<T: Transport = WebSocketTransport> {
    url: String,
    transport: Mutex<T>,
}

impl RemoteHandler<WebSocketTransport> {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_transport(url, WebSocketTransport::new())
    }
}

impl<T: Transport> RemoteHandler<T> {
    pub fn with_transport(url: impl Into<String>, transport: T) -> Self {
        RemoteHandler { url: url.into(), transport: Mutex::new(transport) }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn deliver(&self, payload: ActionPayload, key: ActionId) -> Outcome {
        let envelope = match to_envelope(&payload) {
            Ok(envelope) => envelope,
            Err(e) => return Outcome::permanent(format!("cannot encode payload: {e}")),
        };

        let mut transport = self.transport.lock().await;
        match exchange(&mut *transport, &self.url, key.clone(), envelope).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::debug!(id = %key, error = %e, "delivery failed");
                // Drop the connection so the next attempt starts clean
                let _ = transport.disconnect().await;
                Outcome::retryable(e.to_string())
            }
        }
    }
}

/// Send one delivery and wait for the answer to its key.
async fn exchange<T: Transport>(
    transport: &mut T,
    url: &str,
    key: ActionId,
    envelope: serde_json::Value,
) -> Result<Outcome, TransportError> {
    if !transport.is_connected() {
        transport.connect(url).await?;
    }
    transport.send(ClientMessage::deliver(key.clone(), envelope)).await?;

    loop {
        let Some(msg) = transport.recv().await? else {
            return Err(TransportError::ConnectionClosed);
        };
        match msg {
            ServerMessage::Ack { key: acked, status } if acked == key => {
                tracing::debug!(id = %key, ?status, "delivery acknowledged");
                return Ok(Outcome::Success);
            }
            ServerMessage::Reject { key: rejected, reason, retryable } if rejected == key => {
                return Ok(if retryable {
                    Outcome::retryable(reason)
                } else {
                    Outcome::permanent(reason)
                });
            }
            ServerMessage::Error { key: Some(failed), message } if failed == key => {
                return Ok(Outcome::retryable(format!("server error: {message}")));
            }
            // Late answers for earlier keys, unattributable errors, or unsolicited pongs
            other => tracing::trace!(?other, "ignoring unrelated message"),
        }
    }
}

impl<T: Transport + 'static> ActionHandler for RemoteHandler<T> {
    fn execute(&self, payload: ActionPayload, key: ActionId) -> HandlerFuture<'_> {
        Box::pin(self.deliver(payload, key))
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
