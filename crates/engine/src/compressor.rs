//! Scene compression — turns a scene leaving the recent buffer into a
//! digest.
//!
//! The plot summary is lossy (targets ~20% of the original text); the
//! per-agent emotional snapshot is copied verbatim and never truncated.
//! Compression runs synchronously at eviction time and reads the
//! then-current registry and ledger state, so digests must be produced
//! in eviction order — scene N+1's digest has to observe all of scene
//! N's registry updates.

use std::collections::BTreeMap;
use tracing::debug;

use greenlight_core::digest::Digest;
use greenlight_core::emotion::EmotionalState;
use greenlight_core::scene::Scene;

use greenlight_memory::{EntityRegistry, QuestionLedger};

/// Keyword classes used for beat detection.
const BEAT_KEYWORDS: &[(&str, &[&str])] = &[
    ("revelation", &["reveal", "discover", "realize", "truth", "secret"]),
    ("conflict", &["argue", "fight", "confront", "challenge", "accuse"]),
    ("decision", &["decide", "choose", "must", "will"]),
    ("emotional", &["cry", "laugh", "smile", "tears", "angry", "sad"]),
    ("action", &["run", "chase", "escape", "attack", "defend"]),
    ("setup", &["plan", "prepare", "ready", "scheme"]),
    ("mystery", &["question", "wonder", "suspicious", "strange", "weird"]),
];

pub struct Compressor {
    /// Target summary size as a fraction of the scene text.
    summary_ratio: f32,
    /// Cap on listed key objects.
    max_objects: usize,
}

impl Default for Compressor {
    fn default() -> Self {
        Self {
            summary_ratio: 0.2,
            max_objects: 5,
        }
    }
}

impl Compressor {
    pub fn new(summary_ratio: f32, max_objects: usize) -> Self {
        Self {
            summary_ratio: summary_ratio.clamp(0.05, 1.0),
            max_objects,
        }
    }

    /// Compress an evicted scene into its digest.
    ///
    /// `emotional_snapshot` is each agent's current view of this scene,
    /// gathered by the pipeline before the call; it is stored verbatim.
    pub fn compress(
        &self,
        scene: &Scene,
        registry: &EntityRegistry,
        questions: &QuestionLedger,
        emotional_snapshot: BTreeMap<String, EmotionalState>,
    ) -> Digest {
        let summary = self.summarize(scene);
        let plot_beats = self.plot_beats(scene, registry, questions);
        let importance = self.scene_importance(scene, registry);

        let questions_raised = questions
            .raised_in(scene.id)
            .into_iter()
            .map(|q| q.id.clone())
            .collect();
        let questions_resolved = questions
            .resolved_in(scene.id)
            .into_iter()
            .map(|q| q.id.clone())
            .collect();

        debug!(
            scene = %scene.id,
            importance,
            agents = emotional_snapshot.len(),
            "Scene compressed"
        );

        Digest {
            scene: scene.id,
            summary,
            characters_present: scene.characters_present.clone(),
            key_objects: scene
                .objects
                .iter()
                .take(self.max_objects)
                .cloned()
                .collect(),
            plot_beats,
            importance,
            emotional_snapshot,
            questions_raised,
            questions_resolved,
            revision_notes: Vec::new(),
        }
    }

    /// Build the lossy summary: location, who's there, and a slice of
    /// the text, capped at the configured fraction of the original.
    fn summarize(&self, scene: &Scene) -> String {
        let mut parts: Vec<String> = Vec::new();

        if let Some(location) = &scene.location {
            parts.push(format!("{location}."));
        }
        if !scene.characters_present.is_empty() {
            let names: Vec<&str> = scene
                .characters_present
                .iter()
                .take(3)
                .map(String::as_str)
                .collect();
            let extra = scene.characters_present.len().saturating_sub(3);
            if extra > 0 {
                parts.push(format!("{} and {extra} others present.", names.join(", ")));
            } else {
                parts.push(format!("{} present.", names.join(", ")));
            }
        }

        let budget = ((scene.text.len() as f32) * self.summary_ratio) as usize;
        let lead: String = scene.text.chars().take(budget.max(40)).collect();
        let lead = lead.trim();
        if !lead.is_empty() {
            parts.push(if lead.len() < scene.text.trim().len() {
                format!("{lead}...")
            } else {
                lead.to_string()
            });
        }

        parts.join(" ")
    }

    /// Detect beats: keyword classes in the text, entity introductions
    /// and exits per the registry, and question activity in the ledger.
    fn plot_beats(
        &self,
        scene: &Scene,
        registry: &EntityRegistry,
        questions: &QuestionLedger,
    ) -> Vec<String> {
        let mut beats = Vec::new();
        let lowered = scene.text.to_lowercase();

        for (beat, keywords) in BEAT_KEYWORDS {
            if keywords.iter().any(|k| lowered.contains(k)) {
                beats.push((*beat).to_string());
            }
        }

        for entity in registry.introduced_in(scene.id) {
            beats.push(format!("introduces {}", entity.name));
        }
        // Compression runs a full buffer-width after the scene, so an
        // entity still last seen here has been absent ever since — an
        // exit beat as far as the narrative can tell.
        for entity in registry.last_seen_in(scene.id) {
            if entity.first_seen != scene.id {
                beats.push(format!("last seen: {}", entity.name));
            }
        }

        if !questions.raised_in(scene.id).is_empty() {
            beats.push("raises question".into());
        }
        if !questions.resolved_in(scene.id).is_empty() {
            beats.push("answers question".into());
        }

        beats
    }

    /// Scene importance: character count, dialogue density, length, and
    /// the presence of high-importance entities.
    fn scene_importance(&self, scene: &Scene, registry: &EntityRegistry) -> f32 {
        let characters =
            (scene.characters_present.len() as f32 / 5.0).min(1.0) * 0.3;
        let dialogue =
            (scene.total_dialogue_lines() as f32 / 10.0).min(1.0) * 0.3;
        let length = (scene.word_count as f32 / 200.0).min(1.0) * 0.2;

        let heavy_hitters = scene
            .characters_present
            .iter()
            .filter(|name| {
                registry
                    .find_by_name(name)
                    .is_some_and(|e| e.importance > 0.7)
            })
            .count();
        let presence = (heavy_hitters as f32 / 2.0).min(1.0) * 0.2;

        (characters + dialogue + length + presence).min(1.0)
    }
}
