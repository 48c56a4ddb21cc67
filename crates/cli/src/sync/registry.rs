// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Maps action types to the handlers that apply them remotely.
//!
//! Handlers must be idempotent with respect to the key they are given:
//! after a crash between a successful remote call and the store update,
//! the same action is delivered again with the same key.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use sq_core::{Action, ActionId, ActionPayload, ActionType, Outcome};

/// Boxed future returned by [`ActionHandler::execute`].
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Outcome> + Send + 'a>>;

/// Performs the remote side effect for one kind of action.
pub trait ActionHandler: Send + Sync {
    /// Apply `payload`, using `key` as the idempotency token.
    fn execute(&self, payload: ActionPayload, key: ActionId) -> HandlerFuture<'_>;
}

/// Registry of handlers keyed by action type.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<ActionType, Arc<dyn ActionHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `action_type`, replacing any previous one.
    pub fn register(&mut self, action_type: ActionType, handler: Arc<dyn ActionHandler>) {
        self.handlers.insert(action_type, handler);
    }

    /// Register one handler for every action type.
    pub fn register_all(&mut self, handler: Arc<dyn ActionHandler>) {
        for action_type in ActionType::ALL {
            self.register(action_type, Arc::clone(&handler));
        }
    }

    pub fn handler_for(&self, action_type: ActionType) -> Option<Arc<dyn ActionHandler>> {
        self.handlers.get(&action_type).cloned()
    }

    /// Registered types, sorted.
    pub fn registered_types(&self) -> Vec<ActionType> {
        let mut types: Vec<ActionType> = self.handlers.keys().copied().collect();
        types.sort();
        types
    }

    /// Run the handler for `action` and classify what happened.
    ///
    /// Never fails: undecodable payloads and unregistered types are permanent
    /// failures; timeouts and panics are retryable.
    pub async fn dispatch(&self, action: &Action, timeout: Duration) -> Outcome {
        let payload = match action.decode_payload() {
            Ok(payload) => payload,
            Err(e) => return Outcome::permanent(format!("cannot decode payload: {e}")),
        };

        let Some(handler) = self.handler_for(action.action_type) else {
            return Outcome::permanent(format!("no handler registered for {}", action.action_type));
        };

        let key = action.id.clone();
        let task = tokio::spawn(async move { handler.execute(payload, key).await });
        let abort = task.abort_handle();

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(join_err)) if join_err.is_panic() => {
                tracing::warn!(id = %action.id, "handler panicked");
                Outcome::retryable("handler panicked")
            }
            Ok(Err(join_err)) => Outcome::retryable(format!("handler task failed: {join_err}")),
            Err(_) => {
                abort.abort();
                tracing::warn!(id = %action.id, ?timeout, "handler timed out");
                Outcome::retryable(format!("handler timed out after {timeout:?}"))
            }
        }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
