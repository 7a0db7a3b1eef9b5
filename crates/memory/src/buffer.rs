//! The recent buffer — the last K scenes in full detail.
//!
//! A fixed-capacity ordered queue. Pushing into a full buffer evicts the
//! oldest scene and hands it back to the caller, which must compress it
//! before the next push (eviction order is compression order).

use std::collections::VecDeque;

use greenlight_core::scene::Scene;

#[derive(Debug)]
pub struct RecentBuffer {
    capacity: usize,
    scenes: VecDeque<Scene>,
}

impl RecentBuffer {
    /// Create a buffer holding up to `capacity` scenes (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            scenes: VecDeque::with_capacity(capacity.max(1)),
        }
    }

    /// Push a scene, returning the evicted oldest scene when the buffer
    /// was already full.
    pub fn push(&mut self, scene: Scene) -> Option<Scene> {
        let evicted = if self.scenes.len() == self.capacity {
            self.scenes.pop_front()
        } else {
            None
        };
        self.scenes.push_back(scene);
        evicted
    }

    /// All buffered scenes, oldest first.
    pub fn scenes(&self) -> impl Iterator<Item = &Scene> {
        self.scenes.iter()
    }

    /// The most recently pushed scene.
    pub fn latest(&self) -> Option<&Scene> {
        self.scenes.back()
    }

    pub fn is_full(&self) -> bool {
        self.scenes.len() == self.capacity
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
