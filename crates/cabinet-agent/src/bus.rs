//! In-process subscription bus.
//!
//! Stands in for the message transport that delivers lifecycle events. Each
//! delivery carries an acknowledgement handle; the listener spawns one task
//! per delivery and that task acknowledges whether or not the payload could
//! be processed. Dropping a [`Delivery`] without acking acks it, so a
//! panicking handler cannot cause redelivery either.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use cabinet_core::types::{LifecycleEvent, Snapshot};

use crate::error::AgentError;
use crate::orchestrator::Orchestrator;

// ---------------------------------------------------------------------------
// Delivery / AckReceipt
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Delivery {
    pub subscription: String,
    pub data: Vec<u8>,
    ack_tx: Option<oneshot::Sender<()>>,
}

impl Delivery {
    pub fn ack(mut self) {
        self.send_ack();
    }

    fn send_ack(&mut self) {
        if let Some(tx) = self.ack_tx.take() {
            let _ = tx.send(());
            tracing::debug!(subscription = %self.subscription, "message acknowledged");
        }
    }
}

impl Drop for Delivery {
    fn drop(&mut self) {
        self.send_ack();
    }
}

/// Publisher-side view of a delivery's acknowledgement.
#[derive(Debug)]
pub struct AckReceipt(oneshot::Receiver<()>);

impl AckReceipt {
    /// Resolves once the delivery has been acknowledged. `false` only if the
    /// delivery was lost before reaching a handler.
    pub async fn acknowledged(self) -> bool {
        self.0.await.is_ok()
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct EventBus {
    subscribers: Arc<Mutex<HashMap<String, mpsc::UnboundedSender<Delivery>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the receiver for `subscription`.
    pub fn subscribe(&self, subscription: &str) -> mpsc::UnboundedReceiver<Delivery> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(subscription.to_string(), tx);
        tracing::info!(subscription, "subscribed");
        rx
    }

    pub fn publish<T: Serialize>(
        &self,
        subscription: &str,
        payload: &T,
    ) -> Result<AckReceipt, AgentError> {
        let data = serde_json::to_vec(payload).map_err(|source| AgentError::Parse {
            what: "published payload",
            source,
        })?;
        self.publish_raw(subscription, data)
    }

    /// Deliver raw bytes, unvalidated, to the subscriber of `subscription`.
    pub fn publish_raw(
        &self,
        subscription: &str,
        data: impl Into<Vec<u8>>,
    ) -> Result<AckReceipt, AgentError> {
        let sender = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(subscription)
            .cloned();
        let Some(sender) = sender else {
            tracing::warn!(subscription, "no handler registered for subscription");
            return Err(AgentError::NoSubscriber(subscription.to_string()));
        };

        let (ack_tx, ack_rx) = oneshot::channel();
        let delivery = Delivery {
            subscription: subscription.to_string(),
            data: data.into(),
            ack_tx: Some(ack_tx),
        };
        sender
            .send(delivery)
            .map_err(|_| AgentError::NoSubscriber(subscription.to_string()))?;
        Ok(AckReceipt(ack_rx))
    }
}

// ---------------------------------------------------------------------------
// Listener
// ---------------------------------------------------------------------------

/// Decode, process, acknowledge. Returns the snapshot when the payload was a
/// valid event; malformed payloads are logged and dropped.
pub async fn handle_delivery(orchestrator: &Orchestrator, delivery: Delivery) -> Option<Snapshot> {
    let snapshot = match LifecycleEvent::from_slice(&delivery.data) {
        Ok(event) => Some(orchestrator.process_event(&event).await),
        Err(e) => {
            tracing::error!(
                subscription = %delivery.subscription,
                error = %e,
                "invalid lifecycle event payload"
            );
            None
        }
    };
    delivery.ack();
    snapshot
}

/// Drain `deliveries`, handling each one in its own task. No ordering is
/// implied between deliveries.
pub fn spawn_listener(
    orchestrator: Arc<Orchestrator>,
    mut deliveries: mpsc::UnboundedReceiver<Delivery>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(delivery) = deliveries.recv().await {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::spawn(async move {
                handle_delivery(&orchestrator, delivery).await;
            });
        }
        tracing::info!("subscription closed; listener stopped");
    })
}
