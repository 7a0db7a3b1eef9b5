//! The historical digest store — compressed digests for every scene
//! older than the recent window.
//!
//! Digests arrive in eviction order and are immutable once inserted,
//! except for append-only revision annotations.

use std::collections::BTreeMap;
use tracing::warn;

use greenlight_core::digest::Digest;
use greenlight_core::scene::SceneId;

#[derive(Debug, Default)]
pub struct DigestStore {
    digests: Vec<Digest>,
    by_scene: BTreeMap<u32, usize>,
}

impl DigestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the next digest. Digests must arrive in eviction order;
    /// an out-of-order insert indicates a pipeline bug and is logged.
    pub fn insert(&mut self, digest: Digest) {
        if let Some(last) = self.digests.last() {
            if digest.scene <= last.scene {
                warn!(
                    scene = %digest.scene,
                    last = %last.scene,
                    "Digest inserted out of eviction order"
                );
            }
        }
        let position = digest.scene.position();
        let index = self.digests.len();
        self.digests.push(digest);
        self.by_scene.insert(position, index);
    }

    pub fn get(&self, scene: SceneId) -> Option<&Digest> {
        self.by_scene
            .get(&scene.position())
            .map(|&i| &self.digests[i])
    }

    pub fn contains(&self, scene: SceneId) -> bool {
        self.by_scene.contains_key(&scene.position())
    }

    /// All digests, in scene order.
    pub fn all(&self) -> &[Digest] {
        &self.digests
    }

    /// Top `n` digests by importance, returned in scene order so the
    /// rendered context reads chronologically.
    pub fn most_important(&self, n: usize) -> Vec<&Digest> {
        let mut ranked: Vec<&Digest> = self.digests.iter().collect();
        ranked.sort_by(|a, b| {
            b.importance
                .partial_cmp(&a.importance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.scene.cmp(&b.scene))
        });
        ranked.truncate(n);
        ranked.sort_by_key(|d| d.scene);
        ranked
    }

    /// Append a revision annotation to an already-digested scene.
    /// Returns false when the scene has no digest yet (still in the
    /// recent buffer — nothing to annotate).
    pub fn annotate_revision(
        &mut self,
        scene: SceneId,
        agent_id: &str,
        triggering_scene: SceneId,
        reason: &str,
    ) -> bool {
        match self.by_scene.get(&scene.position()) {
            Some(&index) => {
                self.digests[index].annotate_revision(agent_id, triggering_scene, reason);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }
}
