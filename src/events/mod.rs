//! Content change events
//!
//! In-process event bus carrying change notifications for public content.
//! Built on a tokio broadcast channel: publishers never block, and slow or
//! absent subscribers only lose their own backlog.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Content collection a change applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    News,
    Programs,
    Gallery,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::News => "news",
            Collection::Programs => "programs",
            Collection::Gallery => "gallery",
        }
    }
}

/// What happened to the record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
}

/// A single content change notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentEvent {
    pub collection: Collection,
    pub action: ChangeAction,
    pub id: i64,
}

impl ContentEvent {
    pub fn new(collection: Collection, action: ChangeAction, id: i64) -> Self {
        Self {
            collection,
            action,
            id,
        }
    }
}

/// Broadcast bus for content events. Cheap to clone; all clones share the
/// same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ContentEvent>,
}

impl EventBus {
    /// Create a bus with the given per-subscriber backlog capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event. Succeeds whether or not anyone is listening.
    pub fn publish(&self, event: ContentEvent) {
        let receivers = self.sender.send(event.clone()).unwrap_or(0);
        tracing::debug!(
            collection = event.collection.as_str(),
            action = ?event.action,
            id = event.id,
            receivers,
            "content event published"
        );
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<ContentEvent> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(ContentEvent::new(Collection::News, ChangeAction::Created, 7));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.collection, Collection::News);
        assert_eq!(event.action, ChangeAction::Created);
        assert_eq!(event.id, 7);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_does_not_fail() {
        let bus = EventBus::new(16);
        bus.publish(ContentEvent::new(Collection::Gallery, ChangeAction::Deleted, 1));
    }

    #[tokio::test]
    async fn test_all_clones_share_the_channel() {
        let bus = EventBus::new(16);
        let clone = bus.clone();
        let mut rx = bus.subscribe();

        clone.publish(ContentEvent::new(Collection::Programs, ChangeAction::Updated, 3));
        assert_eq!(rx.recv().await.unwrap().id, 3);
    }
}
