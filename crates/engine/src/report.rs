//! The review report — the run's best-effort result.
//!
//! The pipeline always completes and always produces a report; any
//! agent/scene pair with unresolved errors is flagged here instead of
//! aborting the run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use greenlight_core::question::QuestionId;
use greenlight_core::scene::SceneId;

/// One agent's committed feedback for one scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneFeedback {
    pub scene: SceneId,
    pub agent_id: String,
    pub reaction: String,
    pub engagement: f32,
    pub enjoyment: f32,
    #[serde(default)]
    pub questions_raised: Vec<QuestionId>,
    #[serde(default)]
    pub questions_answered: Vec<QuestionId>,
    #[serde(default)]
    pub revisions_applied: Vec<SceneId>,
}

/// An agent/scene pair that never produced a committed update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncompletePair {
    pub scene: SceneId,
    pub agent_id: String,
    pub reason: String,
    /// Last raw payload, kept for audit when the failure was a parse.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Question counts by status at the end of the run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionSummary {
    pub open: usize,
    pub answered: usize,
    pub irrelevant: usize,
}

/// The complete result of one review run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewReport {
    pub run_id: Uuid,
    pub title: String,
    pub agents: Vec<String>,
    pub scenes_processed: u32,
    pub digests_created: usize,

    pub feedback: Vec<SceneFeedback>,
    pub incomplete: Vec<IncompletePair>,
    pub questions: QuestionSummary,
    /// Highest-importance entities at the end of the run, as (name, score).
    pub top_entities: Vec<(String, f32)>,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ReviewReport {
    pub fn new(title: impl Into<String>, agents: Vec<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            title: title.into(),
            agents,
            scenes_processed: 0,
            digests_created: 0,
            feedback: Vec::new(),
            incomplete: Vec::new(),
            questions: QuestionSummary::default(),
            top_entities: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Whether every agent committed an update for every scene.
    pub fn is_complete(&self) -> bool {
        self.incomplete.is_empty()
    }

    /// Feedback for one agent in scene order.
    pub fn feedback_for(&self, agent_id: &str) -> Vec<&SceneFeedback> {
        self.feedback
            .iter()
            .filter(|f| f.agent_id == agent_id)
            .collect()
    }

    /// Human-readable run summary.
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Review: {}\n", self.title));
        out.push_str(&format!(
            "Scenes: {} ({} digested)  Agents: {}\n",
            self.scenes_processed,
            self.digests_created,
            self.agents.join(", ")
        ));
        out.push_str(&format!(
            "Questions: {} open, {} answered, {} irrelevant\n",
            self.questions.open, self.questions.answered, self.questions.irrelevant
        ));

        if !self.top_entities.is_empty() {
            out.push_str("Key entities:\n");
            for (name, importance) in &self.top_entities {
                out.push_str(&format!("  {name} ({importance:.2})\n"));
            }
        }

        if !self.incomplete.is_empty() {
            out.push_str(&format!(
                "Incomplete ({} agent/scene pairs):\n",
                self.incomplete.len()
            ));
            for pair in &self.incomplete {
                out.push_str(&format!(
                    "  scene {} / {}: {}\n",
                    pair.scene, pair.agent_id, pair.reason
                ));
            }
        }
        out
    }
}
