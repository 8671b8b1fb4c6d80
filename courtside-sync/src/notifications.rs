//! Player lifecycle notification bus.
//!
//! Built on a tokio broadcast channel:
//! - every subscriber sees notifications sent after it subscribed, in order
//! - a new subscriber first receives the most recent notification already
//!   sent (replay depth 1)
//! - each subscriber has a bounded buffer; one that falls behind loses its
//!   oldest buffered notifications and keeps going
//! - `send` never blocks and never fails, with or without subscribers

use courtside_core::Notification;
use std::pin::Pin;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, warn};

/// Boxed notification stream returned by [`NotificationStream::into_stream`].
pub type BoxNotificationStream = Pin<Box<dyn Stream<Item = Notification> + Send + 'static>>;

/// Single broadcast point for player lifecycle events.
#[derive(Debug)]
pub struct NotificationBus {
    tx: broadcast::Sender<Notification>,
    /// Last notification sent. Guarded together with `send`/`subscribe` so a
    /// subscriber never misses or double-receives the replayed item.
    latest: Mutex<Option<Notification>>,
}

impl NotificationBus {
    /// Create a bus whose subscribers each buffer up to `capacity`
    /// notifications before dropping the oldest.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            latest: Mutex::new(None),
        }
    }

    fn lock_latest(&self) -> MutexGuard<'_, Option<Notification>> {
        self.latest.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Broadcast a notification to all current subscribers.
    pub fn send(&self, notification: Notification) {
        let kind = notification.kind;
        let mut latest = self.lock_latest();
        *latest = Some(notification.clone());

        match self.tx.send(notification) {
            Ok(receivers) => {
                debug!(kind = %kind, receivers, "Broadcast notification");
            }
            Err(_) => {
                debug!(kind = %kind, "No subscribers for notification");
            }
        }
    }

    /// Subscribe, receiving the latest notification (if any) first.
    pub fn subscribe(&self) -> NotificationStream {
        let latest = self.lock_latest();
        let rx = self.tx.subscribe();
        NotificationStream {
            replay: latest.clone(),
            rx,
            dropped: 0,
        }
    }

    /// The most recent notification sent, if any.
    pub fn latest(&self) -> Option<Notification> {
        self.lock_latest().clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// One subscriber's view of the bus. Dropping it unsubscribes.
#[derive(Debug)]
pub struct NotificationStream {
    replay: Option<Notification>,
    rx: broadcast::Receiver<Notification>,
    dropped: u64,
}

impl NotificationStream {
    /// Wait for the next notification. `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<Notification> {
        if let Some(notification) = self.replay.take() {
            return Some(notification);
        }
        loop {
            match self.rx.recv().await {
                Ok(notification) => return Some(notification),
                Err(RecvError::Lagged(skipped)) => self.record_lag(skipped),
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next notification if one is ready.
    pub fn try_recv(&mut self) -> Option<Notification> {
        if let Some(notification) = self.replay.take() {
            return Some(notification);
        }
        loop {
            match self.rx.try_recv() {
                Ok(notification) => return Some(notification),
                Err(TryRecvError::Lagged(skipped)) => self.record_lag(skipped),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// Notifications lost to lag so far.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    fn record_lag(&mut self, skipped: u64) {
        self.dropped += skipped;
        warn!(skipped, total_dropped = self.dropped, "Notification subscriber lagged");
    }

    /// Convert into a `Stream`, logging and skipping over lag.
    pub fn into_stream(self) -> BoxNotificationStream {
        let replay = tokio_stream::iter(self.replay);
        let live = BroadcastStream::new(self.rx).filter_map(|result| match result {
            Ok(notification) => Some(notification),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!(skipped, "Notification stream lagged");
                None
            }
        });
        Box::pin(replay.chain(live))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courtside_core::NotificationType;

    #[test]
    fn test_send_without_subscribers_does_not_panic() {
        let bus = NotificationBus::new(4);
        bus.send(Notification::refreshed(0));
        assert_eq!(bus.subscriber_count(), 0);
        assert!(bus.latest().is_some());
    }

    #[test]
    fn test_subscriber_receives_in_order() {
        let bus = NotificationBus::new(4);
        let mut rx = bus.subscribe();
        bus.send(Notification::deleted(1));
        bus.send(Notification::deleted(2));

        let first = rx.try_recv().expect("first");
        let second = rx.try_recv().expect("second");
        assert_eq!(first.message.as_deref(), Some("Player deleted with id: 1"));
        assert_eq!(second.message.as_deref(), Some("Player deleted with id: 2"));
        assert!(rx.try_recv().is_none());
    }

    #[test]
    fn test_late_subscriber_gets_latest_first() {
        let bus = NotificationBus::new(4);
        bus.send(Notification::deleted(1));
        bus.send(Notification::refreshed(7));

        let mut rx = bus.subscribe();
        let replayed = rx.try_recv().expect("replay");
        assert_eq!(replayed.kind, NotificationType::Refresh);
        assert!(rx.try_recv().is_none());

        bus.send(Notification::deleted(3));
        assert_eq!(rx.try_recv().expect("live").kind, NotificationType::Delete);
    }

    #[test]
    fn test_slow_subscriber_drops_oldest() {
        let bus = NotificationBus::new(2);
        let mut rx = bus.subscribe();
        for id in 1..=5 {
            bus.send(Notification::deleted(id));
        }

        let next = rx.try_recv().expect("after lag");
        assert_eq!(next.message.as_deref(), Some("Player deleted with id: 4"));
        assert_eq!(rx.dropped(), 3);
        assert_eq!(
            rx.try_recv().expect("last").message.as_deref(),
            Some("Player deleted with id: 5")
        );
    }

    #[test]
    fn test_dropping_one_subscriber_leaves_others() {
        let bus = NotificationBus::new(4);
        let first = bus.subscribe();
        let mut second = bus.subscribe();
        drop(first);

        bus.send(Notification::refreshed(1));
        assert!(second.try_recv().is_some());
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn test_into_stream_replays_then_follows() {
        let bus = NotificationBus::new(4);
        bus.send(Notification::refreshed(1));
        let mut stream = bus.subscribe().into_stream();
        bus.send(Notification::refreshed(2));

        let first = stream.next().await.expect("replay");
        let second = stream.next().await.expect("live");
        assert_eq!(first.message.as_deref(), Some("New data available: 1"));
        assert_eq!(second.message.as_deref(), Some("New data available: 2"));
    }

    #[tokio::test]
    async fn test_recv_ends_when_bus_dropped() {
        let bus = NotificationBus::new(4);
        let mut rx = bus.subscribe();
        drop(bus);
        assert!(rx.recv().await.is_none());
    }
}
