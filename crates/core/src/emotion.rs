//! Emotional continuity types.
//!
//! Emotional state is the one thing the memory engine never compresses:
//! plot summaries are lossy, the per-agent emotional record is not. A
//! revision is a separate record that reinterprets an earlier scene
//! without touching the original — the original stays retrievable
//! byte-for-byte forever.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::entity::EntityId;
use crate::scene::SceneId;

/// Direction an agent's engagement is moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trajectory {
    Rising,
    Falling,
    Stable,
}

/// How an agent feels about one character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterFeeling {
    pub feeling: String,
    pub intensity: f32,
}

/// One agent's subjective state after one scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionalState {
    pub agent_id: String,
    pub scene: SceneId,

    pub primary_emotion: String,
    /// Strength of the primary emotion in [0, 1].
    pub intensity: f32,
    #[serde(default)]
    pub secondary_emotions: BTreeSet<String>,
    pub trajectory: Trajectory,

    /// How engaged the agent is (0 = checked out, 1 = riveted).
    pub engagement: f32,
    /// How much the agent is enjoying the material (-1 to 1).
    #[serde(default)]
    pub enjoyment: f32,
    /// How lost the agent is (0 = clear, 1 = lost).
    #[serde(default)]
    pub confusion: f32,

    /// Per-character investment, keyed by entity id.
    #[serde(default)]
    pub character_investment: BTreeMap<EntityId, CharacterFeeling>,

    /// Running narrative of how the agent feels about the whole piece so far.
    #[serde(default)]
    pub cumulative_feelings: String,

    /// Free-form reaction to the scene.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reaction: Option<String>,

    /// True only on states carried inside a `Revision`.
    #[serde(default)]
    pub revised: bool,
}

impl EmotionalState {
    /// Weight of this state when compressing a journey: intense moments
    /// dominate the summary.
    pub fn journey_weight(&self) -> f32 {
        if self.intensity > 0.8 { 1.0 } else { 0.5 }
    }
}

/// A retroactive reinterpretation of an earlier scene's emotional state.
///
/// References the original via `target_scene`; the original record is
/// never mutated or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Revision {
    pub agent_id: String,
    pub target_scene: SceneId,
    pub triggering_scene: SceneId,
    pub revised_state: EmotionalState,
    pub reason: String,
}

/// One entry in an agent's emotional history: either an original
/// per-scene state or a revision referencing an earlier one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LedgerEntry {
    State(EmotionalState),
    Revision(Revision),
}

impl LedgerEntry {
    /// The scene this entry speaks about (the target scene for revisions).
    pub fn subject_scene(&self) -> SceneId {
        match self {
            Self::State(s) => s.scene,
            Self::Revision(r) => r.target_scene,
        }
    }
}

/// One point in a compressed emotional journey.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneyPoint {
    pub scene: SceneId,
    pub primary_emotion: String,
    pub intensity: f32,
    pub engagement: f32,
    /// Summary weight (intensity > 0.8 states weigh double).
    pub weight: f32,
    pub revised: bool,
}

/// An agent's emotional journey compressed for prompt injection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressedJourney {
    pub agent_id: String,
    pub points: Vec<JourneyPoint>,
    /// Net direction across the window.
    pub momentum: Trajectory,
    /// Narrative carried forward into the next prompt.
    pub cumulative_feelings: String,
}

impl CompressedJourney {
    pub fn empty(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            points: Vec::new(),
            momentum: Trajectory::Stable,
            cumulative_feelings: String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
