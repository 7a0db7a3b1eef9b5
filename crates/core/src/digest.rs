//! Scene digests — the compressed historical record.
//!
//! A digest carries a lossy plot summary (~20% of the original size) and
//! the full, uncompressed emotional state of every agent at that scene.
//! Digests are created exactly once, when a scene leaves the recent
//! buffer, and are immutable afterwards except for append-only revision
//! annotations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::emotion::EmotionalState;
use crate::question::QuestionId;
use crate::scene::SceneId;

/// An append-only note recording that a later scene revised how an agent
/// felt about this one. The snapshot itself is never rewritten.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionNote {
    pub agent_id: String,
    pub triggering_scene: SceneId,
    pub reason: String,
    pub recorded_at: DateTime<Utc>,
}

/// Compressed record of a scene no longer in the recent buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Digest {
    pub scene: SceneId,

    /// Lossy plot summary.
    pub summary: String,
    #[serde(default)]
    pub characters_present: BTreeSet<String>,
    #[serde(default)]
    pub key_objects: Vec<String>,
    /// Narrative beats detected in the scene (revelation, conflict,
    /// introduction/exit of an entity, question raised/resolved, ...).
    #[serde(default)]
    pub plot_beats: Vec<String>,
    /// Scene importance in [0, 1].
    #[serde(default)]
    pub importance: f32,

    /// Full per-agent emotional state at this scene, copied verbatim.
    /// Never truncated or summarized, regardless of how lossy the plot
    /// summary is.
    #[serde(default)]
    pub emotional_snapshot: BTreeMap<String, EmotionalState>,

    #[serde(default)]
    pub questions_raised: Vec<QuestionId>,
    #[serde(default)]
    pub questions_resolved: Vec<QuestionId>,

    /// Append-only revision annotations.
    #[serde(default)]
    pub revision_notes: Vec<RevisionNote>,
}

impl Digest {
    /// Record that a later scene revised this one. Annotations only
    /// accumulate; existing snapshot data is untouched.
    pub fn annotate_revision(
        &mut self,
        agent_id: impl Into<String>,
        triggering_scene: SceneId,
        reason: impl Into<String>,
    ) {
        self.revision_notes.push(RevisionNote {
            agent_id: agent_id.into(),
            triggering_scene,
            reason: reason.into(),
            recorded_at: Utc::now(),
        });
    }
}
