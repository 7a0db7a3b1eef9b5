//! Open-question tracking — mysteries raised by agents and carried
//! forward until answered or proven irrelevant.
//!
//! Questions are never physically deleted. `answered` and `irrelevant`
//! are terminal states kept for audit; attempting to reopen one is a
//! caller bug and is rejected.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::entity::EntityId;
use crate::scene::SceneId;

/// Ledger-assigned question identifier (e.g., `Q_047`).
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct QuestionId(pub String);

impl std::fmt::Display for QuestionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionStatus {
    Open,
    Answered,
    Irrelevant,
}

/// How central the question is to the plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarrativeWeight {
    Critical,
    High,
    Medium,
    Low,
}

impl NarrativeWeight {
    /// Contribution to the importance score.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Critical => 0.30,
            Self::High => 0.20,
            Self::Medium => 0.10,
            Self::Low => 0.05,
        }
    }
}

/// A narrative question raised by an agent while reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub raised_scene: SceneId,
    pub raised_by: String,

    pub status: QuestionStatus,
    /// Scene positions where the question was referenced (includes the
    /// raising scene).
    pub references: BTreeSet<u32>,
    #[serde(default)]
    pub related_entities: BTreeSet<EntityId>,
    pub narrative_weight: NarrativeWeight,

    /// How pressing the question feels; grows each time it is referenced
    /// while still open, capped at 1.0. Never decreases.
    pub urgency: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speculation: Option<String>,

    // Resolution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answered_scene: Option<SceneId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub irrelevant_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub irrelevant_scene: Option<SceneId>,

    /// Recomputed importance in [0, 1].
    #[serde(default)]
    pub importance: f32,
}

impl Question {
    pub fn is_open(&self) -> bool {
        self.status == QuestionStatus::Open
    }

    /// Last scene position that referenced the question.
    pub fn last_reference(&self) -> Option<u32> {
        self.references.iter().next_back().copied()
    }

    /// Recompute the importance score against the current scene.
    ///
    /// `max_entity_importance` is the maximum importance among the
    /// question's related entities, supplied by the registry so the
    /// ledger stays decoupled from entity storage.
    pub fn recompute_importance(
        &mut self,
        current: SceneId,
        max_entity_importance: f32,
    ) -> f32 {
        let current_pos = current.position().max(1) as f32;

        let refs = (self.references.len() as f32 / 5.0).min(1.0) * 0.25;

        let duration = current
            .position()
            .saturating_sub(self.raised_scene.position()) as f32
            / current_pos
            * 0.15;

        let weight = self.narrative_weight.weight();
        let entities = max_entity_importance.clamp(0.0, 1.0) * 0.15;
        let urgency = self.urgency.clamp(0.0, 1.0) * 0.15;

        let recency = match self.last_reference() {
            Some(last) if current.position().saturating_sub(last) < 5 => 0.10,
            _ => 0.0,
        };

        self.importance =
            (refs + duration + weight + entities + urgency + recency).clamp(0.0, 1.0);
        self.importance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question() -> Question {
        Question {
            id: QuestionId("Q_001".into()),
            text: "Why does the maid keep appearing?".into(),
            raised_scene: SceneId(1),
            raised_by: "mystery_solver".into(),
            status: QuestionStatus::Open,
            references: BTreeSet::from([1]),
            related_entities: BTreeSet::new(),
            narrative_weight: NarrativeWeight::Medium,
            urgency: 0.5,
            speculation: None,
            answer: None,
            answered_scene: None,
            irrelevant_reason: None,
            irrelevant_scene: None,
            importance: 0.0,
        }
    }

    #[test]
    fn importance_grows_with_references() {
        let mut q = question();
        let early = q.recompute_importance(SceneId(2), 0.0);

        q.references.insert(2);
        q.references.insert(4);
        q.urgency = 0.7;
        let late = q.recompute_importance(SceneId(4), 0.0);
        assert!(late > early);
    }

    #[test]
    fn importance_is_clamped() {
        let mut q = question();
        q.references.extend(1..=20);
        q.urgency = 1.0;
        q.narrative_weight = NarrativeWeight::Critical;
        let score = q.recompute_importance(SceneId(20), 1.0);
        assert!(score <= 1.0);
    }

    #[test]
    fn narrative_weight_mapping() {
        assert!(NarrativeWeight::Critical.weight() > NarrativeWeight::High.weight());
        assert!(NarrativeWeight::High.weight() > NarrativeWeight::Medium.weight());
        assert!(NarrativeWeight::Medium.weight() > NarrativeWeight::Low.weight());
    }

    #[test]
    fn recency_bonus_window() {
        let mut recent = question();
        recent.references.insert(6);
        let with_bonus = recent.recompute_importance(SceneId(8), 0.0);

        let mut stale = question();
        let without_bonus = stale.recompute_importance(SceneId(8), 0.0);
        assert!(with_bonus > without_bonus);
    }
}
