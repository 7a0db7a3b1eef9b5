//! Context assembly — the core architectural component.
//!
//! Composes a bounded context from five distinct layers:
//!
//! 1. **Recent Scenes** — the full recent buffer, no selection policy
//! 2. **Historical Digests** — all digests, or the most important N when
//!    a cap is configured
//! 3. **Entities** — the registry retention policy applied against the
//!    current scene's participants and question-referenced entities
//! 4. **Active Questions** — open questions above the importance floor
//! 5. **Emotional Journey** — the agent's own compressed journey
//!
//! # Determinism
//!
//! Context assembly is a pure function of store state: identical
//! registry/ledger/buffer state always produces an identical context.
//! No random or time-dependent logic is used during assembly.

use greenlight_core::context::Context;
use greenlight_core::entity::{ContextTier, Entity};
use greenlight_core::scene::Scene;

use greenlight_memory::{
    DigestStore, EmotionalLedger, EntityRegistry, QuestionLedger, RecentBuffer,
};

/// Selection policy knobs. All of these are configuration, not code:
/// the boundaries in the retention policy itself are fixed by the
/// entity tier rules.
#[derive(Debug, Clone)]
pub struct AssemblerPolicy {
    /// Importance floor for active questions.
    pub min_question_importance: f32,
    /// When set, only the most important N digests are included.
    pub digest_cap: Option<usize>,
    /// How many recent scenes of emotional history feed the journey.
    pub journey_window: usize,
}

impl Default for AssemblerPolicy {
    fn default() -> Self {
        Self {
            min_question_importance: 0.4,
            digest_cap: None,
            journey_window: 8,
        }
    }
}

/// The context assembler. Stateless — create one and reuse it.
pub struct ContextAssembler {
    policy: AssemblerPolicy,
}

impl ContextAssembler {
    pub fn new(policy: AssemblerPolicy) -> Self {
        Self { policy }
    }

    pub fn with_default_policy() -> Self {
        Self::new(AssemblerPolicy::default())
    }

    /// Assemble the context one agent sees for one scene.
    pub fn assemble(
        &self,
        agent_id: &str,
        current: &Scene,
        buffer: &RecentBuffer,
        digests: &DigestStore,
        registry: &EntityRegistry,
        questions: &QuestionLedger,
        emotions: &EmotionalLedger,
    ) -> Context {
        let active_questions: Vec<_> = questions
            .active(self.policy.min_question_importance)
            .into_iter()
            .cloned()
            .collect();

        let relevant_entities =
            Self::select_entities(registry, current, &active_questions);

        let relevant_digests = match self.policy.digest_cap {
            Some(cap) => digests
                .most_important(cap)
                .into_iter()
                .cloned()
                .collect(),
            None => digests.all().to_vec(),
        };

        Context {
            agent_id: agent_id.to_string(),
            current: current.clone(),
            recent_scenes: buffer.scenes().cloned().collect(),
            relevant_digests,
            relevant_entities,
            active_questions,
            emotional_journey: emotions.journey(self.policy.journey_window),
            corrective_note: None,
        }
    }

    /// Apply the retention policy: high-importance entities always make
    /// it in; the middle band only when the current scene or an active
    /// question touches them; the rest live on in digests only.
    fn select_entities(
        registry: &EntityRegistry,
        current: &Scene,
        active_questions: &[greenlight_core::question::Question],
    ) -> Vec<Entity> {
        let mut selected: Vec<Entity> = registry
            .iter()
            .filter(|entity| match entity.tier() {
                ContextTier::Always => true,
                ContextTier::Conditional => {
                    let in_scene = current
                        .characters_present
                        .iter()
                        .chain(current.objects.iter())
                        .any(|name| entity.matches_name(name))
                        || current
                            .location
                            .as_deref()
                            .is_some_and(|loc| entity.matches_name(loc));
                    let in_question = active_questions
                        .iter()
                        .any(|q| q.related_entities.contains(&entity.id));
                    in_scene || in_question
                }
                ContextTier::Excluded => false,
            })
            .cloned()
            .collect();

        selected.sort_by(|a, b| {
            b.importance
                .partial_cmp(&a.importance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenlight_core::question::NarrativeWeight;
    use greenlight_core::scene::SceneId;
    use std::collections::{BTreeMap, BTreeSet};

    fn scene(id: u32, characters: &[&str]) -> Scene {
        Scene {
            id: SceneId(id),
            heading: format!("SCENE {id}"),
            text: format!("Scene {id} body."),
            location: None,
            characters_present: characters.iter().map(|c| c.to_string()).collect(),
            objects: BTreeSet::new(),
            dialogue_lines: BTreeMap::new(),
            word_count: 10,
            is_last: false,
        }
    }

    /// Scene where every listed character speaks `lines` lines — enough
    /// appearances with dialogue push an entity into the mid band.
    fn talky_scene(id: u32, characters: &[&str], lines: u32) -> Scene {
        let mut s = scene(id, characters);
        for c in characters {
            s.dialogue_lines.insert(c.to_string(), lines);
        }
        s
    }

    struct Stores {
        buffer: RecentBuffer,
        digests: DigestStore,
        registry: EntityRegistry,
        questions: QuestionLedger,
        emotions: EmotionalLedger,
    }

    fn stores() -> Stores {
        Stores {
            buffer: RecentBuffer::new(3),
            digests: DigestStore::new(),
            registry: EntityRegistry::new(),
            questions: QuestionLedger::new(),
            emotions: EmotionalLedger::new("indie_critic"),
        }
    }

    #[test]
    fn recent_scenes_are_the_whole_buffer() {
        let mut s = stores();
        s.buffer.push(scene(1, &[]));
        s.buffer.push(scene(2, &[]));

        let asm = ContextAssembler::with_default_policy();
        let ctx = asm.assemble(
            "indie_critic",
            &scene(3, &[]),
            &s.buffer,
            &s.digests,
            &s.registry,
            &s.questions,
            &s.emotions,
        );
        let held: Vec<u32> = ctx.recent_scenes.iter().map(|x| x.id.position()).collect();
        assert_eq!(held, vec![1, 2]);
        assert_eq!(ctx.scene_id(), SceneId(3));
    }

    #[test]
    fn conditional_entities_need_a_touch() {
        let mut s = stores();
        // MARIA speaks across several scenes and lands mid-band.
        for i in 1..=3 {
            s.registry.observe_scene(&talky_scene(i, &["MARIA", "VERA"], 4));
        }
        s.registry.recompute(SceneId(4));
        let maria = s.registry.find_by_name("MARIA").unwrap();
        assert_eq!(maria.tier(), ContextTier::Conditional, "test setup: mid-band");

        let asm = ContextAssembler::with_default_policy();

        // Scene 4 includes MARIA → she is selected.
        let with_maria = asm.assemble(
            "indie_critic",
            &scene(4, &["MARIA"]),
            &s.buffer,
            &s.digests,
            &s.registry,
            &s.questions,
            &s.emotions,
        );
        assert!(with_maria.relevant_entities.iter().any(|e| e.name == "MARIA"));

        // A scene without her, and no question about her → excluded.
        let without = asm.assemble(
            "indie_critic",
            &scene(4, &["HOLT"]),
            &s.buffer,
            &s.digests,
            &s.registry,
            &s.questions,
            &s.emotions,
        );
        assert!(!without.relevant_entities.iter().any(|e| e.name == "MARIA"));
    }

    #[test]
    fn question_link_rescues_mid_band_entity() {
        let mut s = stores();
        for i in 1..=3 {
            s.registry.observe_scene(&talky_scene(i, &["MARIA"], 4));
        }
        s.registry.recompute(SceneId(4));
        let maria = s.registry.find_by_name("MARIA").unwrap();
        assert_eq!(maria.tier(), ContextTier::Conditional);
        let maria_id = maria.id.clone();

        let qid = s.questions.raise(
            "Why is the maid always cleaning that room?",
            SceneId(2),
            "mystery_solver",
            NarrativeWeight::High,
            BTreeSet::from([maria_id]),
            None,
        );
        for i in 3..=4 {
            s.questions.reference(&qid, SceneId(i)).unwrap();
        }
        s.questions.recompute(SceneId(4), |_| 0.6);

        let asm = ContextAssembler::with_default_policy();
        let ctx = asm.assemble(
            "indie_critic",
            &scene(4, &["HOLT"]),
            &s.buffer,
            &s.digests,
            &s.registry,
            &s.questions,
            &s.emotions,
        );
        assert!(
            ctx.active_questions.iter().any(|q| q.id == qid),
            "question should clear the 0.4 floor"
        );
        assert!(ctx.relevant_entities.iter().any(|e| e.name == "MARIA"));
    }

    #[test]
    fn digest_cap_keeps_most_important() {
        use greenlight_core::digest::Digest;
        let mut s = stores();
        for (scene_id, importance) in [(1, 0.2), (2, 0.9), (3, 0.5)] {
            s.digests.insert(Digest {
                scene: SceneId(scene_id),
                summary: format!("digest {scene_id}"),
                characters_present: BTreeSet::new(),
                key_objects: vec![],
                plot_beats: vec![],
                importance,
                emotional_snapshot: BTreeMap::new(),
                questions_raised: vec![],
                questions_resolved: vec![],
                revision_notes: vec![],
            });
        }

        let capped = ContextAssembler::new(AssemblerPolicy {
            digest_cap: Some(2),
            ..Default::default()
        });
        let ctx = capped.assemble(
            "indie_critic",
            &scene(6, &[]),
            &s.buffer,
            &s.digests,
            &s.registry,
            &s.questions,
            &s.emotions,
        );
        let scenes: Vec<u32> = ctx.relevant_digests.iter().map(|d| d.scene.position()).collect();
        assert_eq!(scenes, vec![2, 3]);

        let uncapped = ContextAssembler::with_default_policy();
        let ctx = uncapped.assemble(
            "indie_critic",
            &scene(6, &[]),
            &s.buffer,
            &s.digests,
            &s.registry,
            &s.questions,
            &s.emotions,
        );
        assert_eq!(ctx.relevant_digests.len(), 3);
    }

    #[test]
    fn assembly_is_deterministic() {
        let mut s = stores();
        for i in 1..=3 {
            s.registry.observe_scene(&scene(i, &["MARIA", "VERA"]));
            s.buffer.push(scene(i, &["MARIA", "VERA"]));
        }
        s.registry.recompute(SceneId(4));

        let asm = ContextAssembler::with_default_policy();
        let current = scene(4, &["MARIA"]);
        let a = asm.assemble(
            "indie_critic", &current, &s.buffer, &s.digests, &s.registry, &s.questions, &s.emotions,
        );
        let b = asm.assemble(
            "indie_critic", &current, &s.buffer, &s.digests, &s.registry, &s.questions, &s.emotions,
        );
        assert_eq!(a.render(), b.render());
    }
}
