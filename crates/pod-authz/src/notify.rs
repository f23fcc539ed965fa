//! Change notifications.
//!
//! Every committed grant or revoke is published as an
//! [`AuthorizationUpdated`] on a broadcast channel. Publishing never fails
//! the operation: with no subscribers the update is simply dropped, and a
//! subscriber that falls behind sees `RecvError::Lagged`.

use tokio::sync::broadcast;

use pod_authz_core::AuthorizationUpdated;

/// Fan-out of authorization updates to any number of observers.
#[derive(Debug)]
pub struct Notifier {
    tx: broadcast::Sender<AuthorizationUpdated>,
}

impl Notifier {
    /// Create a notifier buffering up to `capacity` updates per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Register a new observer. It receives updates published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthorizationUpdated> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Publish an update. Returns how many observers it reached.
    pub fn publish(&self, update: AuthorizationUpdated) -> usize {
        match self.tx.send(update) {
            Ok(reached) => reached,
            Err(broadcast::error::SendError(update)) => {
                tracing::debug!(
                    principal = %update.principal,
                    action = %update.action,
                    "no subscribers for authorization update"
                );
                0
            }
        }
    }
}
