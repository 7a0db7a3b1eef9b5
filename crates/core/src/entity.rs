//! Tracked entities — characters, objects, locations.
//!
//! An entity is created on first mention and never deleted; entities that
//! stop mattering simply decay in importance and fall out of the live
//! context. Relationships hold the other entity's id, never a reference,
//! so the graph stays acyclic from the borrow checker's point of view and
//! serializes trivially.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::scene::SceneId;

/// Registry-assigned entity identifier (e.g., `CHARACTER_001`).
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The kinds of entity the registry tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Character,
    Object,
    Location,
}

impl EntityKind {
    /// Prefix used when generating registry ids.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::Character => "CHARACTER",
            Self::Object => "OBJECT",
            Self::Location => "LOCATION",
        }
    }
}

/// Significance grades for key moments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Significance {
    Low,
    Medium,
    High,
    Critical,
}

/// A significant moment involving an entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyMoment {
    pub scene: SceneId,
    pub description: String,
    pub significance: Significance,
}

/// A directed relationship to another entity, held by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub other: EntityId,
    /// Relationship kind (employer, rival, sibling, ...).
    pub kind: String,
    /// Underlying tension, if the agents have surfaced one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<SceneId>,
}

/// Which tier of the live context an entity currently belongs to.
///
/// This is the cache-eviction analog: exclusion drops an entity from the
/// assembled context, never from the registry itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextTier {
    /// Importance strictly above 0.7 — always included.
    Always,
    /// Importance in [0.4, 0.7] — included only when touched by the
    /// current scene or an active question.
    Conditional,
    /// Importance below 0.4 — live context excludes it; digests keep it.
    Excluded,
}

/// A tracked character, object, or location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub name: String,
    #[serde(default)]
    pub aliases: BTreeSet<String>,

    // Tracking
    pub first_seen: SceneId,
    pub last_seen: SceneId,
    /// Scene positions of every appearance.
    #[serde(default)]
    pub appearances: BTreeSet<u32>,
    #[serde(default)]
    pub speaking_lines: u32,
    #[serde(default)]
    pub dialogue_count: u32,
    /// Scenes where the entity was discussed while not present.
    #[serde(default)]
    pub mentioned_while_absent: BTreeSet<u32>,

    // Narrative significance
    #[serde(default)]
    pub relationships: Vec<Relationship>,
    #[serde(default)]
    pub key_moments: Vec<KeyMoment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative_function: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// One-time foreshadowing flag. Setting it again has no further effect,
    /// so the importance boost cannot compound.
    #[serde(default)]
    pub foreshadowed: bool,

    /// Recomputed importance in [0, 1].
    #[serde(default)]
    pub importance: f32,
}

impl Entity {
    pub fn new(id: EntityId, kind: EntityKind, name: impl Into<String>, first_seen: SceneId) -> Self {
        let mut appearances = BTreeSet::new();
        appearances.insert(first_seen.position());
        Self {
            id,
            kind,
            name: name.into(),
            aliases: BTreeSet::new(),
            first_seen,
            last_seen: first_seen,
            appearances,
            speaking_lines: 0,
            dialogue_count: 0,
            mentioned_while_absent: BTreeSet::new(),
            relationships: Vec::new(),
            key_moments: Vec::new(),
            narrative_function: None,
            description: None,
            foreshadowed: false,
            importance: 0.0,
        }
    }

    pub fn appearance_count(&self) -> u32 {
        self.appearances.len() as u32
    }

    /// Record an appearance in a scene, with optional dialogue.
    pub fn record_appearance(&mut self, scene: SceneId, spoke: bool, lines: u32) {
        self.appearances.insert(scene.position());
        if scene > self.last_seen {
            self.last_seen = scene;
        }
        if spoke {
            self.speaking_lines += lines;
            self.dialogue_count += 1;
        }
    }

    /// Record that the entity was discussed in a scene it does not appear in.
    pub fn record_absent_mention(&mut self, scene: SceneId) {
        self.mentioned_while_absent.insert(scene.position());
    }

    pub fn add_key_moment(
        &mut self,
        scene: SceneId,
        description: impl Into<String>,
        significance: Significance,
    ) {
        self.key_moments.push(KeyMoment {
            scene,
            description: description.into(),
            significance,
        });
    }

    /// Add or update a relationship to another entity (upsert by id).
    pub fn add_relationship(
        &mut self,
        other: EntityId,
        kind: impl Into<String>,
        tension: Option<String>,
        since: Option<SceneId>,
    ) {
        let kind = kind.into();
        if let Some(existing) = self.relationships.iter_mut().find(|r| r.other == other) {
            existing.kind = kind;
            if tension.is_some() {
                existing.tension = tension;
            }
            return;
        }
        self.relationships.push(Relationship {
            other,
            kind,
            tension,
            since: since.or(Some(self.last_seen)),
        });
    }

    /// Recompute the importance score against the current scene position.
    ///
    /// Sub-terms are normalized against fixed ceilings so the weighted sum
    /// stays bounded; the ceilings are tuning parameters, the weights and
    /// the recency window are not.
    pub fn recompute_importance(&mut self, current: SceneId) -> f32 {
        let current_pos = current.position().max(1) as f32;

        let speaking = (self.speaking_lines as f32 / 10.0).min(1.0) * 0.20;
        let appearances = (self.appearance_count() as f32 / 5.0).min(1.0) * 0.15;

        let span = (self.last_seen.position().saturating_sub(self.first_seen.position()))
            as f32
            / current_pos
            * 0.15;

        let mentions =
            (self.mentioned_while_absent.len() as f32 / 5.0).min(1.0) * 0.20;
        let relationships = (self.relationships.len() as f32 / 3.0).min(1.0) * 0.10;

        let critical = self
            .key_moments
            .iter()
            .filter(|m| m.significance == Significance::Critical)
            .count() as f32;
        let high = self
            .key_moments
            .iter()
            .filter(|m| m.significance == Significance::High)
            .count() as f32;
        let moments = ((critical + high * 0.5) / 3.0).min(1.0) * 0.20;

        let recency = if current.position().saturating_sub(self.last_seen.position()) < 5 {
            0.10
        } else {
            0.0
        };

        let foreshadow = if self.foreshadowed { 0.05 } else { 0.0 };

        let total =
            speaking + appearances + span + mentions + relationships + moments + recency
                + foreshadow;
        self.importance = total.min(1.0);
        self.importance
    }

    /// Retention tier for the assembler. The `Always` boundary is strict:
    /// exactly 0.7 lands in the conditional band.
    pub fn tier(&self) -> ContextTier {
        if self.importance > 0.7 {
            ContextTier::Always
        } else if self.importance >= 0.4 {
            ContextTier::Conditional
        } else {
            ContextTier::Excluded
        }
    }

    /// Case-insensitive match against name or any alias.
    pub fn matches_name(&self, name: &str) -> bool {
        if self.name.eq_ignore_ascii_case(name) {
            return true;
        }
        self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity() -> Entity {
        Entity::new(
            EntityId("CHARACTER_001".into()),
            EntityKind::Character,
            "MARIA",
            SceneId(1),
        )
    }

    #[test]
    fn appearance_tracking() {
        let mut e = entity();
        e.record_appearance(SceneId(3), true, 4);
        e.record_appearance(SceneId(3), false, 0);
        assert_eq!(e.appearance_count(), 2); // scenes 1 and 3, deduplicated
        assert_eq!(e.last_seen, SceneId(3));
        assert_eq!(e.speaking_lines, 4);
        assert_eq!(e.dialogue_count, 1);
    }

    #[test]
    fn importance_monotonic_in_activity() {
        let mut quiet = entity();
        let mut busy = entity();
        for i in 2..=5 {
            busy.record_appearance(SceneId(i), true, 3);
        }
        busy.record_absent_mention(SceneId(6));

        let current = SceneId(8);
        let quiet_score = quiet.recompute_importance(current);
        let busy_score = busy.recompute_importance(current);
        assert!(busy_score > quiet_score);
        assert!(busy_score <= 1.0);
    }

    #[test]
    fn tier_boundary_is_strict_at_always() {
        let mut e = entity();
        e.importance = 0.7;
        assert_eq!(e.tier(), ContextTier::Conditional);
        e.importance = 0.700_000_1;
        assert_eq!(e.tier(), ContextTier::Always);
        e.importance = 0.4;
        assert_eq!(e.tier(), ContextTier::Conditional);
        e.importance = 0.399;
        assert_eq!(e.tier(), ContextTier::Excluded);
    }

    #[test]
    fn foreshadow_boost_does_not_compound() {
        let mut e = entity();
        e.foreshadowed = true;
        let once = e.recompute_importance(SceneId(2));
        e.foreshadowed = true; // repeated detection
        let twice = e.recompute_importance(SceneId(2));
        assert!((once - twice).abs() < f32::EPSILON);
    }

    #[test]
    fn relationship_upsert() {
        let mut e = entity();
        let other = EntityId("CHARACTER_002".into());
        e.add_relationship(other.clone(), "employer", None, Some(SceneId(1)));
        e.add_relationship(other, "enemy", Some("hidden resentment".into()), None);
        assert_eq!(e.relationships.len(), 1);
        assert_eq!(e.relationships[0].kind, "enemy");
        assert_eq!(
            e.relationships[0].tension.as_deref(),
            Some("hidden resentment")
        );
    }

    #[test]
    fn alias_matching_is_case_insensitive() {
        let mut e = entity();
        e.aliases.insert("THE MAID".into());
        assert!(e.matches_name("maria"));
        assert!(e.matches_name("the maid"));
        assert!(!e.matches_name("VERA"));
    }
}
