//! Connection lifecycle observers.
//!
//! Observers only report transitions. Reconnection and retry behaviour stay
//! with the underlying client.

use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

/// Connection state transitions reported to observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    Connecting,
    Connected,
    Disconnecting,
    Disconnected,
    /// The client re-established a dropped connection on its own.
    /// Never emitted for SurrealDB, whose engine reconnects silently.
    Reconnected,
    Error(String),
}

impl ConnectionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnecting => "disconnecting",
            Self::Disconnected => "disconnected",
            Self::Reconnected => "reconnected",
            Self::Error(_) => "error",
        }
    }
}

/// Callback invoked on connection transitions. Must not block.
#[cfg_attr(test, automock)]
pub trait ConnectionObserver: Send + Sync {
    fn on_event(&self, store: &str, event: &ConnectionEvent);
}

/// Observer that writes each transition to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ConnectionObserver for TracingObserver {
    fn on_event(&self, store: &str, event: &ConnectionEvent) {
        match event {
            ConnectionEvent::Error(message) => {
                tracing::warn!(store, error = %message, "{} connection error", store)
            }
            other => tracing::info!(store, "{} {}", store, other.name()),
        }
    }
}

/// Fan-out list of observers.
#[derive(Clone)]
pub struct Observers {
    store: &'static str,
    observers: Vec<Arc<dyn ConnectionObserver>>,
}

impl Observers {
    /// Observer list for `store` with the tracing observer attached.
    pub fn new(store: &'static str) -> Self {
        Self {
            store,
            observers: vec![Arc::new(TracingObserver)],
        }
    }

    pub fn push(&mut self, observer: Arc<dyn ConnectionObserver>) {
        self.observers.push(observer);
    }

    pub fn emit(&self, event: ConnectionEvent) {
        for observer in &self.observers {
            observer.on_event(self.store, &event);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("store", &self.store)
            .field("count", &self.observers.len())
            .finish()
    }
}
