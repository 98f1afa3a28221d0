//! Kitchen event feed
//!
//! Order changes are broadcast to every connected kitchen display. Publishing is
//! best-effort: with no subscribers the event is dropped.

use tokio::sync::broadcast;

use crate::order::Order;

/// Channel capacity for kitchen events
const CHANNEL_CAPACITY: usize = 64;

/// A change the kitchen should see
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KitchenEvent {
    /// A new order was stored
    NewOrder(Order),
    /// An order changed status
    OrderUpdated(Order),
}

impl KitchenEvent {
    #[must_use]
    pub const fn order(&self) -> &Order {
        match self {
            Self::NewOrder(order) | Self::OrderUpdated(order) => order,
        }
    }
}

/// Broadcast hub for kitchen events
#[derive(Debug, Clone)]
pub struct KitchenFeed {
    tx: broadcast::Sender<KitchenEvent>,
}

impl Default for KitchenFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl KitchenFeed {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Subscribe to kitchen events
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<KitchenEvent> {
        self.tx.subscribe()
    }

    /// Publish an event, returning how many subscribers received it
    pub fn publish(&self, event: KitchenEvent) -> usize {
        let order_id = event.order().id;
        match self.tx.send(event) {
            Ok(receivers) => {
                tracing::debug!(order_id, receivers, "kitchen event published");
                receivers
            }
            Err(_) => {
                tracing::debug!(order_id, "no kitchen displays connected");
                0
            }
        }
    }

    /// Number of connected subscribers
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::menu::Price;
    use crate::order::OrderStatus;

    fn order(id: i64) -> Order {
        Order {
            id,
            customer_name: "Ana".to_string(),
            items: Vec::new(),
            total: Price::ZERO,
            notes: None,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_publish_without_subscribers() {
        let feed = KitchenFeed::new();
        assert_eq!(feed.publish(KitchenEvent::NewOrder(order(1))), 0);
    }

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let feed = KitchenFeed::new();
        let mut a = feed.subscribe();
        let mut b = feed.subscribe();
        assert_eq!(feed.subscriber_count(), 2);

        assert_eq!(feed.publish(KitchenEvent::OrderUpdated(order(7))), 2);

        assert_eq!(a.recv().await.unwrap().order().id, 7);
        assert!(matches!(b.recv().await.unwrap(), KitchenEvent::OrderUpdated(_)));
    }
}
