//! The assembled context — the bounded bundle handed to one agent
//! invocation.
//!
//! # Determinism
//!
//! A context is a pure function of engine state: rendering uses only the
//! data carried in the struct, in stable order. No random or
//! time-dependent logic is used.

use serde::{Deserialize, Serialize};

use crate::digest::Digest;
use crate::emotion::CompressedJourney;
use crate::entity::Entity;
use crate::question::Question;
use crate::scene::{Scene, SceneId};

/// Everything one agent sees for one processing step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    pub agent_id: String,

    /// The scene under review.
    pub current: Scene,

    /// The full recent buffer, oldest first.
    pub recent_scenes: Vec<Scene>,

    /// Selected historical digests, in scene order.
    pub relevant_digests: Vec<Digest>,

    /// Entities that survived the retention policy, highest importance first.
    pub relevant_entities: Vec<Entity>,

    /// Open questions above the importance floor, highest first.
    pub active_questions: Vec<Question>,

    /// This agent's compressed emotional journey.
    pub emotional_journey: CompressedJourney,

    /// Set by the pipeline when re-requesting after a malformed response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrective_note: Option<String>,
}

impl Context {
    pub fn scene_id(&self) -> SceneId {
        self.current.id
    }

    /// Render the context as prompt text.
    ///
    /// Empty sections are omitted entirely rather than rendered as bare
    /// headers.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(4096);

        if let Some(note) = &self.corrective_note {
            out.push_str("[Format Reminder]\n");
            out.push_str(note);
            out.push_str("\n\n");
        }

        if !self.relevant_digests.is_empty() {
            out.push_str("[Earlier In The Script]\n");
            for digest in &self.relevant_digests {
                out.push_str(&format!("Scene {}: {}\n", digest.scene, digest.summary));
                if !digest.plot_beats.is_empty() {
                    out.push_str(&format!("  Beats: {}\n", digest.plot_beats.join(", ")));
                }
            }
            out.push('\n');
        }

        if !self.recent_scenes.is_empty() {
            out.push_str("[Recent Scenes]\n");
            for scene in &self.recent_scenes {
                out.push_str(&format!("Scene {}: {}\n", scene.id, scene.heading));
                out.push_str(&scene.text);
                out.push('\n');
            }
            out.push('\n');
        }

        if !self.relevant_entities.is_empty() {
            out.push_str("[Key Entities]\n");
            for entity in &self.relevant_entities {
                out.push_str(&format!(
                    "- {} ({:?}, importance {:.2}, {} appearances)\n",
                    entity.name,
                    entity.kind,
                    entity.importance,
                    entity.appearance_count(),
                ));
            }
            out.push('\n');
        }

        if !self.active_questions.is_empty() {
            out.push_str("[Open Questions]\n");
            for question in &self.active_questions {
                out.push_str(&format!("- [{}] {}\n", question.id, question.text));
            }
            out.push('\n');
        }

        if !self.emotional_journey.is_empty() {
            out.push_str("[Your Journey So Far]\n");
            for point in &self.emotional_journey.points {
                out.push_str(&format!(
                    "Scene {}: {} (intensity {:.2}, engagement {:.2}){}\n",
                    point.scene,
                    point.primary_emotion,
                    point.intensity,
                    point.engagement,
                    if point.revised { " [revised]" } else { "" },
                ));
            }
            out.push_str(&format!(
                "Momentum: {:?}\n",
                self.emotional_journey.momentum
            ));
            if !self.emotional_journey.cumulative_feelings.is_empty() {
                out.push_str(&format!(
                    "So far: {}\n",
                    self.emotional_journey.cumulative_feelings
                ));
            }
            out.push('\n');
        }

        out.push_str("[Now You're Reading]\n");
        out.push_str(&format!("Scene {}: {}\n", self.current.id, self.current.heading));
        out.push_str(&self.current.text);
        out.push('\n');

        out
    }
}
