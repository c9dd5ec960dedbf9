//! Event queue for decoupled communication
//!
//! A type-safe, double-buffered event queue: events pushed during one frame
//! are visible to readers during the next, so consumers never observe
//! half-a-frame of events regardless of system order.

use std::collections::VecDeque;

use hecs::Entity;

/// Events produced by the core systems.
///
/// `#[non_exhaustive]` so gameplay layers can match with a wildcard and keep
/// compiling as variants are added.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum GameEvent {
    /// Two physics-bound entities are touching, resolved from the bodies'
    /// user-data tags after a step.
    Collision {
        /// First entity in the contact pair
        entity_a: Entity,
        /// Second entity in the contact pair
        entity_b: Entity,
    },

    /// An entity was destroyed, including every entity removed by a cascade.
    EntityDestroyed {
        /// The destroyed entity (handle is already invalid)
        entity: Entity,
    },
}

/// Double-buffered event queue for frame-consistent event processing.
///
/// Events pushed during frame N are available for reading during frame N+1,
/// after [`EventQueue::swap`] runs at the frame boundary.
#[derive(Debug)]
pub struct EventQueue {
    /// Events being written this frame
    pending: VecDeque<GameEvent>,
    /// Events from the previous frame, ready for processing
    processing: VecDeque<GameEvent>,
}

impl EventQueue {
    /// Default initial capacity for event queues.
    const DEFAULT_CAPACITY: usize = 64;

    /// Create a new event queue with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a new event queue with specified initial capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            processing: VecDeque::with_capacity(capacity),
        }
    }

    /// Push an event to be processed next frame.
    #[inline]
    pub fn push(&mut self, event: GameEvent) {
        self.pending.push_back(event);
    }

    /// Swap the pending and processing queues.
    ///
    /// Call once per frame at the frame boundary. After swapping, `iter()`
    /// returns the previous frame's events and `push()` writes to a fresh
    /// pending queue.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.pending, &mut self.processing);
        self.pending.clear();
    }

    /// Iterate over events from the previous frame.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.processing.iter()
    }

    /// Drain all events from the previous frame.
    #[inline]
    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.processing.drain(..)
    }

    /// Check if there are any events to process.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.processing.is_empty()
    }

    /// Get the number of events ready for processing.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.processing.len()
    }

    /// Clear all events, pending and processing.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.processing.clear();
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_entity() -> Entity {
        let mut world = hecs::World::new();
        world.spawn(())
    }

    #[test]
    fn test_event_queue_push_and_swap() {
        let mut queue = EventQueue::new();

        queue.push(GameEvent::EntityDestroyed {
            entity: test_entity(),
        });
        assert!(queue.is_empty(), "events should not be visible before swap");

        queue.swap();
        assert_eq!(queue.len(), 1);
        assert!(matches!(
            queue.iter().next(),
            Some(GameEvent::EntityDestroyed { .. })
        ));
    }

    #[test]
    fn test_event_queue_double_buffer_isolation() {
        let mut queue = EventQueue::new();
        let first = test_entity();
        let second = test_entity();

        queue.push(GameEvent::EntityDestroyed { entity: first });
        queue.swap();

        // Pushed while the first event is being processed.
        queue.push(GameEvent::EntityDestroyed { entity: second });

        let visible: Vec<_> = queue.iter().collect();
        assert_eq!(visible.len(), 1);

        queue.swap();
        let visible: Vec<_> = queue.iter().collect();
        assert_eq!(visible.len(), 1);
        assert!(
            matches!(visible[0], GameEvent::EntityDestroyed { entity } if *entity == second)
        );
    }

    #[test]
    fn test_event_queue_drain() {
        let mut queue = EventQueue::new();
        let a = test_entity();
        let b = test_entity();

        queue.push(GameEvent::Collision {
            entity_a: a,
            entity_b: b,
        });
        queue.push(GameEvent::EntityDestroyed { entity: a });
        queue.swap();

        let drained: Vec<_> = queue.drain().collect();
        assert_eq!(drained.len(), 2);
        assert!(queue.is_empty());
    }
}
