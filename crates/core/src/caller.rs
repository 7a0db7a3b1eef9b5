//! AgentCaller trait — the abstraction over the external LLM layer.
//!
//! The engine never talks to a model directly. It hands an assembled
//! `Context` to a caller and expects a structured `AgentResponse` back.
//! Malformed output is a `CallerError::MalformedResponse`, never a panic;
//! the pipeline decides whether to re-request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::context::Context;
use crate::emotion::{CharacterFeeling, Trajectory};
use crate::entity::EntityKind;
use crate::error::CallerError;
use crate::profile::AgentProfile;
use crate::question::{NarrativeWeight, QuestionId};
use crate::scene::SceneId;

/// An entity the agent's response mentioned, by name. The ingestor
/// resolves names to registry ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMention {
    pub name: String,
    #[serde(default = "default_mention_kind")]
    pub kind: EntityKind,
    /// The mention read as deliberately cryptic — a foreshadowing signal.
    #[serde(default)]
    pub cryptic: bool,
    /// The entity was discussed but is not present in the scene.
    #[serde(default)]
    pub absent: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

fn default_mention_kind() -> EntityKind {
    EntityKind::Character
}

/// A new question raised by the agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaisedQuestion {
    pub text: String,
    #[serde(default = "default_weight")]
    pub narrative_weight: NarrativeWeight,
    /// Entity names the question is about; resolved against the registry.
    #[serde(default)]
    pub related_entities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speculation: Option<String>,
}

fn default_weight() -> NarrativeWeight {
    NarrativeWeight::Medium
}

/// An existing question the agent considers answered by this scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    pub id: QuestionId,
    pub answer: String,
}

/// The emotional state an agent reports for the current scene. The
/// ingestor fills in the agent and scene ids and resolves character
/// names to entity ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportedEmotion {
    pub primary_emotion: String,
    pub intensity: f32,
    #[serde(default)]
    pub secondary_emotions: BTreeSet<String>,
    #[serde(default = "default_trajectory")]
    pub trajectory: Trajectory,
    pub engagement: f32,
    #[serde(default)]
    pub enjoyment: f32,
    #[serde(default)]
    pub confusion: f32,
    /// Per-character feelings, keyed by character name.
    #[serde(default)]
    pub character_investment: BTreeMap<String, CharacterFeeling>,
    #[serde(default)]
    pub cumulative_feelings: String,
}

fn default_trajectory() -> Trajectory {
    Trajectory::Stable
}

/// A retroactive revision the agent proposes for an earlier scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportedRevision {
    pub target_scene: SceneId,
    pub new_state: ReportedEmotion,
    pub reason: String,
}

/// Structured output of one agent invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    /// Free-form reaction to the scene.
    pub reaction: String,
    #[serde(default)]
    pub notes: Vec<String>,
    pub emotional_state: ReportedEmotion,
    #[serde(default)]
    pub questions_raised: Vec<RaisedQuestion>,
    /// Open questions this scene touches without answering.
    #[serde(default)]
    pub questions_referenced: Vec<QuestionId>,
    #[serde(default)]
    pub questions_answered: Vec<AnsweredQuestion>,
    #[serde(default)]
    pub emotional_revisions: Vec<ReportedRevision>,
    #[serde(default)]
    pub entity_mentions: Vec<EntityMention>,
}

impl AgentResponse {
    /// Parse a raw caller payload. The raw text is retained in the error
    /// so a skipped update can be audited later.
    pub fn from_json(raw: &str) -> std::result::Result<Self, CallerError> {
        serde_json::from_str(raw).map_err(|e| CallerError::MalformedResponse {
            reason: e.to_string(),
            raw: raw.to_string(),
        })
    }
}

/// The external agent invocation layer.
///
/// Implementations wrap an LLM API, a scripted replay, or a test double.
/// The engine treats every implementation identically.
#[async_trait]
pub trait AgentCaller: Send + Sync {
    /// A human-readable name for this caller (e.g., "scripted", "anthropic").
    fn name(&self) -> &str;

    /// Invoke the agent with an assembled context.
    async fn invoke(
        &self,
        agent: &AgentProfile,
        context: &Context,
    ) -> std::result::Result<AgentResponse, CallerError>;
}
