//! Topic-based event bus implementation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

use super::types::{CampaignEvent, CombatEvent, FeedbackEvent, PhaseEvent, RevealEvent};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Topic {
    /// Phase transitions, telegraphed intents, mulligan and finish
    Phase,
    /// Player actions and enemy resolutions with their state changes
    Combat,
    /// Fate reveals requested, dismissed or discarded
    Reveal,
    /// Transient feedback flags
    Feedback,
    /// Campaign slot lifecycle and reconciliation
    Campaign,
}

impl Topic {
    pub const ALL: [Topic; 5] = [
        Topic::Phase,
        Topic::Combat,
        Topic::Reveal,
        Topic::Feedback,
        Topic::Campaign,
    ];
}

/// Event wrapper that carries the topic and typed event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    Phase(PhaseEvent),
    Combat(CombatEvent),
    Reveal(RevealEvent),
    Feedback(FeedbackEvent),
    Campaign(CampaignEvent),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::Phase(_) => Topic::Phase,
            Event::Combat(_) => Topic::Combat,
            Event::Reveal(_) => Topic::Reveal,
            Event::Feedback(_) => Topic::Feedback,
            Event::Campaign(_) => Topic::Campaign,
        }
    }
}

/// Topic-based event bus
///
/// Observers (HUD, sound, haptics) subscribe to the topics they care about
/// and follow the encounter without holding a reference to the coordinator.
/// Every topic channel is created up front, so subscription cannot fail.
pub struct EventBus {
    channels: Arc<HashMap<Topic, broadcast::Sender<Event>>>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let channels = Topic::ALL
            .into_iter()
            .map(|topic| (topic, broadcast::channel(capacity).0))
            .collect();

        Self {
            channels: Arc::new(channels),
        }
    }

    fn sender(&self, topic: Topic) -> Option<&broadcast::Sender<Event>> {
        self.channels.get(&topic)
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: impl Into<Event>) {
        let event = event.into();
        let topic = event.topic();

        if let Some(tx) = self.sender(topic)
            && tx.send(event).is_err()
        {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!("No subscribers for topic {:?}", topic);
        }
    }

    /// Subscribe to a specific topic
    ///
    /// Returns a receiver that will only receive events for that topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        match self.sender(topic) {
            Some(tx) => tx.subscribe(),
            None => broadcast::channel(1).1,
        }
    }

    /// Subscribe to multiple topics
    ///
    /// Returns receivers for each requested topic.
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            channels: Arc::clone(&self.channels),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{EncounterId, Phase};

    #[test]
    fn subscribers_only_see_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut phase_rx = bus.subscribe(Topic::Phase);
        let mut feedback_rx = bus.subscribe(Topic::Feedback);

        bus.publish(PhaseEvent::Entered {
            encounter: EncounterId(3),
            phase: Phase::PlayerAction,
            round: 1,
        });

        assert!(matches!(
            phase_rx.try_recv(),
            Ok(Event::Phase(PhaseEvent::Entered {
                phase: Phase::PlayerAction,
                ..
            }))
        ));
        assert!(feedback_rx.try_recv().is_err());
    }

    #[test]
    fn publish_without_subscribers_is_harmless() {
        let bus = EventBus::new();
        bus.publish(FeedbackEvent::Cleared);
    }
}
