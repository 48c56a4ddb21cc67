// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use sq_core::protocol::{AckStatus, ClientMessage, ServerMessage};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use sq_core::{ActionId, ActionPayload, Outcome};

use super::registry::{ActionHandler, HandlerFuture};
use super::transport::{Transport, TransportError, TransportFuture};

/// One scripted handler response.
#[derive(Debug, Clone)]
pub enum Step {
    Reply(Outcome),
    /// Sleep before succeeding; combine with a short handler timeout.
    Hang(Duration),
    Panic,
}

/// Handler that replays a script and records every call.
///
/// Once the script runs out every call succeeds.
#[derive(Default)]
pub struct ScriptedHandler {
    script: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<(ActionId, ActionPayload)>>,
}

impl ScriptedHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_script(steps: impl IntoIterator<Item = Step>) -> Arc<Self> {
        let handler = Self::default();
        handler.script.lock().unwrap().extend(steps);
        Arc::new(handler)
    }

    pub fn push(&self, step: Step) {
        self.script.lock().unwrap().push_back(step);
    }

    pub fn calls(&self) -> Vec<(ActionId, ActionPayload)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn keys(&self) -> Vec<ActionId> {
        self.calls().into_iter().map(|(key, _)| key).collect()
    }
}

impl ActionHandler for ScriptedHandler {
    fn execute(&self, payload: ActionPayload, key: ActionId) -> HandlerFuture<'_> {
        self.calls.lock().unwrap().push((key, payload));
        let step = self.script.lock().unwrap().pop_front();
        Box::pin(async move {
            match step {
                None => Outcome::Success,
                Some(Step::Reply(outcome)) => outcome,
                Some(Step::Hang(duration)) => {
                    tokio::time::sleep(duration).await;
                    Outcome::Success
                }
                Some(Step::Panic) => panic!("scripted handler panic"),
            }
        })
    }
}

/// Mock transport for testing without real sockets.
///
/// Clones share state, so a test can keep a handle after moving one into
/// the code under test.
#[derive(Clone, Default)]
pub struct MockTransport {
    connected: Arc<AtomicBool>,
    /// Messages that will be returned by recv().
    incoming: Arc<Mutex<VecDeque<ServerMessage>>>,
    /// Messages that were sent via send().
    outgoing: Arc<Mutex<Vec<ClientMessage>>>,
    connect_should_fail: Arc<AtomicBool>,
    connects: Arc<Mutex<u32>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message that will be returned by recv().
    pub fn queue_incoming(&self, msg: ServerMessage) {
        self.incoming.lock().unwrap().push_back(msg);
    }

    /// Get all messages that were sent.
    pub fn get_outgoing(&self) -> Vec<ClientMessage> {
        self.outgoing.lock().unwrap().clone()
    }

    pub fn set_connect_fail(&self, fail: bool) {
        self.connect_should_fail.store(fail, Ordering::SeqCst);
    }

    pub fn connect_count(&self) -> u32 {
        *self.connects.lock().unwrap()
    }
}

impl Transport for MockTransport {
    fn connect(&mut self, _url: &str) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            *self.connects.lock().unwrap() += 1;
            if self.connect_should_fail.load(Ordering::SeqCst) {
                Err(TransportError::ConnectionFailed("mock failure".into()))
            } else {
                self.connected.store(true, Ordering::SeqCst);
                Ok(())
            }
        })
    }

    fn disconnect(&mut self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            self.connected.store(false, Ordering::SeqCst);
            Ok(())
        })
    }

    fn send(&mut self, msg: ClientMessage) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if !self.connected.load(Ordering::SeqCst) {
                return Err(TransportError::ConnectionClosed);
            }
            self.outgoing.lock().unwrap().push(msg);
            Ok(())
        })
    }

    fn recv(&mut self) -> TransportFuture<'_, Option<ServerMessage>> {
        Box::pin(async move {
            let msg = self.incoming.lock().unwrap().pop_front();
            if msg.is_none() {
                self.connected.store(false, Ordering::SeqCst);
            }
            Ok(msg)
        })
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

/// WebSocket endpoint on a random local port that acks every delivery and
/// answers every ping, for as many connections as arrive.
///
/// Returns the `ws://` URL.
pub async fn ack_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
                    return;
                };
                while let Some(Ok(msg)) = ws.next().await {
                    let Message::Text(text) = msg else { continue };
                    let reply = match ClientMessage::from_json(&text).unwrap() {
                        ClientMessage::Deliver { key, .. } => {
                            ServerMessage::ack(key, AckStatus::Applied)
                        }
                        ClientMessage::Ping { id } => ServerMessage::pong(id),
                    };
                    if ws.send(Message::Text(reply.to_json().unwrap().into())).await.is_err() {
                        break;
                    }
                }
            });
        }
    });

    format!("ws://{addr}")
}
