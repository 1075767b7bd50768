use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::dto::live::{ConnectedEvent, LiveEvent, ServerEvent, ViewerId};

/// Events a viewer may have queued before it is considered stalled.
pub const DEFAULT_VIEWER_QUEUE_CAPACITY: usize = 64;

/// Transport a viewer is attached through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerKind {
    /// Bidirectional `/ws` connection.
    WebSocket,
    /// Receive-only `/sse` stream.
    Sse,
}

#[derive(Clone)]
struct ViewerConnection {
    kind: ViewerKind,
    tx: mpsc::Sender<ServerEvent>,
}

/// Registry of live viewers and fan-out of [`LiveEvent`]s.
///
/// Each viewer owns a bounded queue drained by its connection task, so delivery order per
/// viewer follows broadcast order. A viewer whose queue is closed or full is dropped from the
/// registry during the broadcast that notices it; its connection task then sees the queue
/// close and shuts the transport down.
pub struct BroadcastHub {
    viewers: DashMap<ViewerId, ViewerConnection>,
    capacity: usize,
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(DEFAULT_VIEWER_QUEUE_CAPACITY)
    }
}

impl BroadcastHub {
    /// Create an empty hub whose viewer queues hold at most `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            viewers: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Queue pair for a new viewer, sized for this hub.
    pub fn viewer_channel(&self) -> (mpsc::Sender<ServerEvent>, mpsc::Receiver<ServerEvent>) {
        mpsc::channel(self.capacity)
    }

    /// Register a viewer and queue its `connected` handshake ahead of any broadcast.
    ///
    /// Returns `None` when the handshake cannot be serialized or queued.
    pub fn connect(&self, kind: ViewerKind, tx: mpsc::Sender<ServerEvent>) -> Option<ViewerId> {
        let viewer_id = Uuid::new_v4();
        let handshake = LiveEvent::Connected(ConnectedEvent { viewer_id });
        let event = match ServerEvent::from_live(&handshake) {
            Ok(event) => event,
            Err(err) => {
                warn!(error = %err, "failed to serialize viewer handshake");
                return None;
            }
        };

        tx.try_send(event).ok()?;
        self.viewers
            .insert(viewer_id, ViewerConnection { kind, tx });
        debug!(viewer_id = %viewer_id, ?kind, "viewer registered");
        Some(viewer_id)
    }

    /// Remove a viewer. Unknown ids are ignored.
    pub fn disconnect(&self, viewer_id: &ViewerId) {
        if let Some((_, viewer)) = self.viewers.remove(viewer_id) {
            debug!(viewer_id = %viewer_id, kind = ?viewer.kind, "viewer removed");
        }
    }

    /// Deliver `event` to every registered viewer, dropping the ones that went away or stalled.
    ///
    /// Returns the number of viewers the event was queued for.
    pub fn broadcast(&self, event: &LiveEvent) -> usize {
        let payload = match ServerEvent::from_live(event) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(event = event.name(), error = %err, "failed to serialize live event");
                return 0;
            }
        };

        let mut delivered = 0;
        let mut stale = Vec::new();
        for entry in self.viewers.iter() {
            match entry.tx.try_send(payload.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => stale.push((*entry.key(), "queue full")),
                Err(TrySendError::Closed(_)) => stale.push((*entry.key(), "receiver closed")),
            }
        }

        // Removing while iterating would deadlock on the shard lock.
        for (viewer_id, reason) in stale {
            if let Some((_, viewer)) = self.viewers.remove(&viewer_id) {
                warn!(viewer_id = %viewer_id, kind = ?viewer.kind, reason, "dropped unreachable viewer");
            }
        }

        delivered
    }

    /// Number of registered viewers across both transports.
    pub fn viewer_count(&self) -> usize {
        self.viewers.len()
    }

    /// Whether `viewer_id` is still in the broadcast set.
    pub fn is_connected(&self, viewer_id: &ViewerId) -> bool {
        self.viewers.contains_key(viewer_id)
    }
}
