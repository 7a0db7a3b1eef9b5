//! Domain event system — decoupled progress reporting for a review run.
//!
//! Events are published as the pipeline advances. Observers (the CLI, a
//! future gateway) subscribe and filter for what they care about.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::question::QuestionId;
use crate::scene::SceneId;

/// All domain events emitted by a review run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// All agents finished (or were skipped) for a scene.
    SceneProcessed {
        scene: SceneId,
        agents_completed: usize,
        agents_skipped: usize,
        timestamp: DateTime<Utc>,
    },

    /// A scene left the recent buffer and was compressed.
    DigestCreated {
        scene: SceneId,
        importance: f32,
        timestamp: DateTime<Utc>,
    },

    /// An agent raised a new question.
    QuestionRaised {
        id: QuestionId,
        scene: SceneId,
        agent_id: String,
        timestamp: DateTime<Utc>,
    },

    /// A question transitioned to answered.
    QuestionResolved {
        id: QuestionId,
        scene: SceneId,
        timestamp: DateTime<Utc>,
    },

    /// A retroactive emotional revision was accepted.
    RevisionApplied {
        agent_id: String,
        target_scene: SceneId,
        triggering_scene: SceneId,
        timestamp: DateTime<Utc>,
    },

    /// An agent/scene pair was abandoned after retries.
    AgentSkipped {
        agent_id: String,
        scene: SceneId,
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // Ignore send errors (no subscribers = that's fine)
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_subscribe_roundtrip() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(DomainEvent::DigestCreated {
            scene: SceneId(1),
            importance: 0.4,
            timestamp: Utc::now(),
        });

        let event = rx.recv().await.unwrap();
        match event.as_ref() {
            DomainEvent::DigestCreated { scene, .. } => assert_eq!(*scene, SceneId(1)),
            _ => panic!("Expected DigestCreated event"),
        }
    }

    #[test]
    fn no_subscribers_doesnt_panic() {
        let bus = EventBus::default();
        bus.publish(DomainEvent::SceneProcessed {
            scene: SceneId(2),
            agents_completed: 3,
            agents_skipped: 0,
            timestamp: Utc::now(),
        });
    }
}
