//! Cache invalidation hook
//!
//! Background task subscribed to the event bus. Every facts-committed signal
//! flushes the adapter's snapshot cache, so the next `load()` sees the newly
//! committed facts instead of serving a stale snapshot for up to a full TTL.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::EventBus;
use crate::hypergraph::adapter::HypergraphAdapter;

/// Spawn the invalidation task.
///
/// With no adapter wired every notification is a no-op. Nothing in the loop
/// propagates an error back to the notifier; failures are logged and the loop
/// continues. The task exits when the bus (all senders) is dropped.
pub fn spawn_invalidation_hook(
    bus: &EventBus,
    adapter: Option<Arc<HypergraphAdapter>>,
) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => match &adapter {
                    Some(adapter) => {
                        adapter.invalidate_cache();
                        info!(
                            document_id = event.document_id.as_deref().unwrap_or("-"),
                            fact_count = event.fact_count,
                            "snapshot cache invalidated after facts commit"
                        );
                    }
                    None => {
                        debug!("facts-committed signal received with no adapter wired");
                    }
                },
                Err(RecvError::Lagged(skipped)) => {
                    // invalidation is idempotent, one catch-up flush covers
                    // every skipped signal
                    warn!(skipped, "invalidation hook lagged behind the event bus");
                    if let Some(adapter) = &adapter {
                        adapter.invalidate_cache();
                    }
                }
                Err(RecvError::Closed) => break,
            }
        }
        debug!("invalidation hook stopped, event bus closed");
    })
}
