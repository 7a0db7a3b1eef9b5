//! The entity registry — every named entity ever seen, with a recomputed
//! importance score.
//!
//! One registry instance per document run. Entities are document
//! properties, not agent-specific: all agents read and update the same
//! registry. Entities are created on first mention and never deleted;
//! falling out of the live context is an importance decision made by the
//! assembler, not a removal.

use std::collections::BTreeMap;
use tracing::debug;

use greenlight_core::entity::{Entity, EntityId, EntityKind, Significance};
use greenlight_core::error::RegistryError;
use greenlight_core::scene::{Scene, SceneId};

/// Per-kind counters used to mint ids like `CHARACTER_003`.
#[derive(Debug, Clone, Copy, Default)]
struct IdCounters {
    characters: u32,
    objects: u32,
    locations: u32,
}

impl IdCounters {
    fn next(&mut self, kind: EntityKind) -> u32 {
        let slot = match kind {
            EntityKind::Character => &mut self.characters,
            EntityKind::Object => &mut self.objects,
            EntityKind::Location => &mut self.locations,
        };
        *slot += 1;
        *slot
    }
}

/// Tracks all entities across an entire document.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    entities: BTreeMap<EntityId, Entity>,
    counters: IdCounters,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register everything a scene itself shows: present characters (with
    /// dialogue counts), notable objects, and the location.
    pub fn observe_scene(&mut self, scene: &Scene) {
        for name in &scene.characters_present {
            let lines = scene.dialogue_lines.get(name).copied().unwrap_or(0);
            let id = self.get_or_create(name, EntityKind::Character, scene.id);
            if let Some(entity) = self.entities.get_mut(&id) {
                entity.record_appearance(scene.id, lines > 0, lines);
            }
        }

        for name in &scene.objects {
            let id = self.get_or_create(name, EntityKind::Object, scene.id);
            if let Some(entity) = self.entities.get_mut(&id) {
                entity.record_appearance(scene.id, false, 0);
            }
        }

        if let Some(location) = &scene.location {
            let id = self.get_or_create(location, EntityKind::Location, scene.id);
            if let Some(entity) = self.entities.get_mut(&id) {
                entity.record_appearance(scene.id, false, 0);
            }
        }

        self.link_co_appearances(scene);
    }

    /// Characters sharing two or more scenes are treated as associates.
    /// Existing relationships (however they were established) are left
    /// alone; this only fills gaps.
    fn link_co_appearances(&mut self, scene: &Scene) {
        let ids: Vec<EntityId> = scene
            .characters_present
            .iter()
            .filter_map(|name| self.find_id_by_name(name))
            .collect();

        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                let since = {
                    let Some(a) = self.entities.get(&ids[i]) else { continue };
                    let Some(b) = self.entities.get(&ids[j]) else { continue };
                    let known = a.relationships.iter().any(|r| r.other == b.id)
                        && b.relationships.iter().any(|r| r.other == a.id);
                    if known {
                        continue;
                    }
                    let mut shared = a.appearances.intersection(&b.appearances);
                    let first_shared = shared.next().copied();
                    if shared.next().is_none() {
                        continue; // fewer than two shared scenes
                    }
                    first_shared.map(SceneId)
                };

                for (this, other) in [(i, j), (j, i)] {
                    let other_id = ids[other].clone();
                    if let Some(entity) = self.entities.get_mut(&ids[this]) {
                        if !entity.relationships.iter().any(|r| r.other == other_id) {
                            entity.add_relationship(other_id, "associate", None, since);
                        }
                    }
                }
            }
        }
    }

    /// Get an existing entity by name/alias, or create one.
    pub fn get_or_create(
        &mut self,
        name: &str,
        kind: EntityKind,
        scene: SceneId,
    ) -> EntityId {
        if let Some(id) = self.find_id_by_name(name) {
            return id;
        }
        let id = EntityId(format!(
            "{}_{:03}",
            kind.id_prefix(),
            self.counters.next(kind)
        ));
        debug!(entity = %id, name, scene = %scene, "Registered new entity");
        self.entities
            .insert(id.clone(), Entity::new(id.clone(), kind, name, scene));
        id
    }

    /// Record a mention surfaced by an agent's response. A cryptic mention
    /// sets the one-time foreshadowing flag; an absent mention records the
    /// scene in `mentioned_while_absent`.
    pub fn record_mention(
        &mut self,
        scene: SceneId,
        name: &str,
        kind: EntityKind,
        cryptic: bool,
        absent: bool,
    ) -> EntityId {
        let id = self.get_or_create(name, kind, scene);
        if let Some(entity) = self.entities.get_mut(&id) {
            if absent {
                entity.record_absent_mention(scene);
            } else {
                entity.record_appearance(scene, false, 0);
            }
            if cryptic && !entity.foreshadowed {
                entity.foreshadowed = true;
                entity.add_key_moment(
                    scene,
                    format!("{} mentioned cryptically", entity.name),
                    Significance::High,
                );
                debug!(entity = %id, scene = %scene, "Foreshadowing flag set");
            }
        }
        id
    }

    /// Register an alias for an existing entity.
    pub fn add_alias(&mut self, id: &EntityId, alias: &str) -> Result<(), RegistryError> {
        let entity = self
            .entities
            .get_mut(id)
            .ok_or_else(|| RegistryError::UnknownEntity(id.to_string()))?;
        if !entity.matches_name(alias) {
            entity.aliases.insert(alias.to_string());
        }
        Ok(())
    }

    pub fn add_key_moment(
        &mut self,
        id: &EntityId,
        scene: SceneId,
        description: &str,
        significance: Significance,
    ) -> Result<(), RegistryError> {
        let entity = self
            .entities
            .get_mut(id)
            .ok_or_else(|| RegistryError::UnknownEntity(id.to_string()))?;
        entity.add_key_moment(scene, description, significance);
        Ok(())
    }

    pub fn add_relationship(
        &mut self,
        id: &EntityId,
        other: EntityId,
        kind: &str,
        tension: Option<String>,
        since: Option<SceneId>,
    ) -> Result<(), RegistryError> {
        if !self.entities.contains_key(&other) {
            return Err(RegistryError::UnknownEntity(other.to_string()));
        }
        let entity = self
            .entities
            .get_mut(id)
            .ok_or_else(|| RegistryError::UnknownEntity(id.to_string()))?;
        entity.add_relationship(other, kind, tension, since);
        Ok(())
    }

    pub fn get(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Find an entity by name or alias, case-insensitive.
    pub fn find_by_name(&self, name: &str) -> Option<&Entity> {
        self.entities.values().find(|e| e.matches_name(name))
    }

    fn find_id_by_name(&self, name: &str) -> Option<EntityId> {
        self.find_by_name(name).map(|e| e.id.clone())
    }

    pub fn importance(&self, id: &EntityId) -> Option<f32> {
        self.entities.get(id).map(|e| e.importance)
    }

    /// Recompute importance for every entity against the current scene.
    pub fn recompute(&mut self, current: SceneId) {
        for entity in self.entities.values_mut() {
            entity.recompute_importance(current);
        }
    }

    /// Top entities by importance, descending, ties broken by id for
    /// deterministic output.
    pub fn top(&self, n: usize, min_importance: f32) -> Vec<&Entity> {
        let mut selected: Vec<&Entity> = self
            .entities
            .values()
            .filter(|e| e.importance >= min_importance)
            .collect();
        selected.sort_by(|a, b| {
            b.importance
                .partial_cmp(&a.importance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        selected.truncate(n);
        selected
    }

    /// Entities whose first appearance is the given scene.
    pub fn introduced_in(&self, scene: SceneId) -> Vec<&Entity> {
        self.entities
            .values()
            .filter(|e| e.first_seen == scene)
            .collect()
    }

    /// Entities whose most recent appearance is the given scene.
    pub fn last_seen_in(&self, scene: SceneId) -> Vec<&Entity> {
        self.entities
            .values()
            .filter(|e| e.last_seen == scene)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};

    fn scene_with(id: u32, characters: &[(&str, u32)]) -> Scene {
        let mut characters_present = BTreeSet::new();
        let mut dialogue_lines = BTreeMap::new();
        for (name, lines) in characters {
            characters_present.insert(name.to_string());
            if *lines > 0 {
                dialogue_lines.insert(name.to_string(), *lines);
            }
        }
        Scene {
            id: SceneId(id),
            heading: format!("INT. HOUSE - SCENE {id}"),
            text: "...".into(),
            location: Some("HOUSE".into()),
            characters_present,
            objects: BTreeSet::new(),
            dialogue_lines,
            word_count: 50,
            is_last: false,
        }
    }

    #[test]
    fn observe_scene_creates_and_updates() {
        let mut registry = EntityRegistry::new();
        registry.observe_scene(&scene_with(1, &[("MARIA", 3), ("VERA", 0)]));
        registry.observe_scene(&scene_with(2, &[("MARIA", 2)]));

        let maria = registry.find_by_name("MARIA").unwrap();
        assert_eq!(maria.appearance_count(), 2);
        assert_eq!(maria.speaking_lines, 5);
        assert_eq!(maria.last_seen, SceneId(2));

        let vera = registry.find_by_name("VERA").unwrap();
        assert_eq!(vera.speaking_lines, 0);

        // Location registered too
        assert!(registry.find_by_name("HOUSE").is_some());
    }

    #[test]
    fn ids_are_minted_per_kind() {
        let mut registry = EntityRegistry::new();
        let a = registry.get_or_create("MARIA", EntityKind::Character, SceneId(1));
        let b = registry.get_or_create("VERA", EntityKind::Character, SceneId(1));
        let c = registry.get_or_create("LOCKET", EntityKind::Object, SceneId(1));
        assert_eq!(a.0, "CHARACTER_001");
        assert_eq!(b.0, "CHARACTER_002");
        assert_eq!(c.0, "OBJECT_001");
    }

    #[test]
    fn aliases_resolve_to_same_entity() {
        let mut registry = EntityRegistry::new();
        let id = registry.get_or_create("MARIA", EntityKind::Character, SceneId(1));
        registry.add_alias(&id, "THE MAID").unwrap();
        let again = registry.get_or_create("the maid", EntityKind::Character, SceneId(2));
        assert_eq!(id, again);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn cryptic_mention_boost_is_idempotent() {
        let mut registry = EntityRegistry::new();
        registry.record_mention(SceneId(1), "LOCKET", EntityKind::Object, true, false);
        registry.recompute(SceneId(2));
        let first = registry.find_by_name("LOCKET").unwrap().importance;
        let moments_after_first = registry.find_by_name("LOCKET").unwrap().key_moments.len();

        // Detected again later — must not compound.
        registry.record_mention(SceneId(2), "LOCKET", EntityKind::Object, true, false);
        registry.recompute(SceneId(2));
        let second = registry.find_by_name("LOCKET").unwrap().importance;
        assert!((first - second).abs() < f32::EPSILON);
        assert_eq!(
            registry.find_by_name("LOCKET").unwrap().key_moments.len(),
            moments_after_first
        );
    }

    #[test]
    fn co_appearance_creates_associate_relationship() {
        let mut registry = EntityRegistry::new();
        registry.observe_scene(&scene_with(1, &[("MARIA", 1), ("VERA", 1)]));
        // One shared scene is not yet a relationship.
        assert!(registry.find_by_name("MARIA").unwrap().relationships.is_empty());

        registry.observe_scene(&scene_with(2, &[("MARIA", 1), ("VERA", 1)]));
        let maria = registry.find_by_name("MARIA").unwrap();
        let vera = registry.find_by_name("VERA").unwrap();
        assert_eq!(maria.relationships.len(), 1);
        assert_eq!(maria.relationships[0].kind, "associate");
        assert_eq!(maria.relationships[0].other, vera.id);
        assert_eq!(maria.relationships[0].since, Some(SceneId(1)));
        assert_eq!(vera.relationships.len(), 1);

        // A third shared scene does not duplicate the link.
        registry.observe_scene(&scene_with(3, &[("MARIA", 1), ("VERA", 1)]));
        assert_eq!(registry.find_by_name("MARIA").unwrap().relationships.len(), 1);
    }

    #[test]
    fn absent_mention_recorded() {
        let mut registry = EntityRegistry::new();
        registry.observe_scene(&scene_with(1, &[("MARIA", 1)]));
        registry.record_mention(SceneId(3), "MARIA", EntityKind::Character, false, true);

        let maria = registry.find_by_name("MARIA").unwrap();
        assert!(maria.mentioned_while_absent.contains(&3));
        // An absent mention is not an appearance.
        assert_eq!(maria.appearance_count(), 1);
    }

    #[test]
    fn replay_determinism() {
        let build = || {
            let mut registry = EntityRegistry::new();
            for i in 1..=6 {
                registry.observe_scene(&scene_with(i, &[("MARIA", 2), ("VERA", 1)]));
                registry.recompute(SceneId(i));
            }
            registry
        };
        let a = build();
        let b = build();
        for (ea, eb) in a.iter().zip(b.iter()) {
            assert_eq!(ea.id, eb.id);
            assert!((ea.importance - eb.importance).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn top_is_sorted_and_capped() {
        let mut registry = EntityRegistry::new();
        for i in 1..=8 {
            registry.observe_scene(&scene_with(i, &[("MARIA", 4), ("VERA", 1), ("HOLT", 0)]));
        }
        registry.recompute(SceneId(8));
        let top = registry.top(2, 0.0);
        assert_eq!(top.len(), 2);
        assert!(top[0].importance >= top[1].importance);
    }

    #[test]
    fn unknown_entity_operations_fail() {
        let mut registry = EntityRegistry::new();
        let ghost = EntityId("CHARACTER_999".into());
        assert!(registry.add_alias(&ghost, "NOBODY").is_err());
        assert!(
            registry
                .add_key_moment(&ghost, SceneId(1), "appears", Significance::Low)
                .is_err()
        );
    }
}
