//! Event bus for distributing facts-committed signals

use super::FactsCommitted;
use tokio::sync::broadcast;
use tracing::debug;

/// Default broadcast channel capacity
const DEFAULT_CAPACITY: usize = 1024;

/// Event bus that distributes [`FactsCommitted`] signals via
/// `tokio::sync::broadcast`
///
/// Fire-and-forget: emitting never blocks, never panics.
/// If no subscribers are connected, events are silently dropped.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<FactsCommitted>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to receive events (invalidation hook, diagnostics)
    pub fn subscribe(&self) -> broadcast::Receiver<FactsCommitted> {
        self.sender.subscribe()
    }

    /// Number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Emit a facts-committed signal to all subscribers
    pub fn emit(&self, event: FactsCommitted) {
        let document_id = event.document_id.clone();
        let fact_count = event.fact_count;
        match self.sender.send(event) {
            Ok(n) => {
                debug!(
                    document_id = document_id.as_deref().unwrap_or("-"),
                    fact_count,
                    subscribers = n,
                    "facts-committed signal emitted"
                );
            }
            Err(_) => {
                // No subscribers — this is expected and fine
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
