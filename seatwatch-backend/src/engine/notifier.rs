//! Completion notifications.
//!
//! Dispatch only enqueues; a delivery worker drains the queue into the chat
//! channel. That keeps dispatch synchronous, so it can run inside the
//! registry's critical section.

use async_trait::async_trait;
use seatwatch_common::{SeatStatus, SubscriberId, WatchKey};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Outbound text channel to subscribers (chat platform adapter)
#[async_trait]
pub trait MessageChannel: Send + Sync {
    async fn send_text(&self, subscriber: SubscriberId, text: &str) -> anyhow::Result<()>;
}

/// A seat opened for a watched section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub key: WatchKey,
    pub status: SeatStatus,
}

/// Sending half of the notification queue
#[derive(Clone)]
pub struct Notifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Notifier {
    /// Create a notifier and the queue its notifications land in
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Enqueue one notification; never blocks
    pub fn notify(&self, key: &WatchKey, status: &SeatStatus) {
        let notification = Notification {
            key: key.clone(),
            status: status.clone(),
        };
        if self.tx.send(notification).is_err() {
            tracing::error!("Notification queue closed, dropping notification for {}", key);
        }
    }
}

/// Drain `rx` into `channel` until every [`Notifier`] is dropped.
///
/// Delivery failures are logged and not retried.
pub fn spawn_delivery<F>(
    mut rx: mpsc::UnboundedReceiver<Notification>,
    channel: Arc<dyn MessageChannel>,
    render: F,
) -> JoinHandle<()>
where
    F: Fn(&Notification) -> String + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(notification) = rx.recv().await {
            let text = render(&notification);
            match channel.send_text(notification.key.subscriber, &text).await {
                Ok(()) => tracing::info!(
                    "Notified {} ({} open seats)",
                    notification.key,
                    notification.status.open_seats()
                ),
                Err(e) => tracing::error!(
                    "Failed to deliver notification for {}: {:#}",
                    notification.key,
                    e
                ),
            }
        }
        tracing::info!("Notification queue closed, delivery worker exiting");
    })
}
