//! Response ingestion — fans one agent's structured output out to the
//! memory stores.
//!
//! Ingestion only runs on a successfully parsed response; a caller
//! failure or malformed payload never gets this far, so shared state is
//! never corrupted by a partial update. Within an ingest, ledger logic
//! errors split two ways: a duplicate emotional append is a hard error
//! surfaced to the pipeline, while question-state and revision-order
//! violations are rejected, logged, and counted — they invalidate one
//! instruction, not the whole response.

use tracing::{debug, warn};

use greenlight_core::caller::{AgentResponse, ReportedEmotion};
use greenlight_core::emotion::EmotionalState;
use greenlight_core::error::LedgerError;
use greenlight_core::profile::AgentProfile;
use greenlight_core::question::QuestionId;
use greenlight_core::scene::{Scene, SceneId};

use greenlight_memory::{DigestStore, EmotionalLedger, EntityRegistry, QuestionLedger};

/// What one ingest actually changed, for the report and the event bus.
#[derive(Debug, Default)]
pub struct IngestOutcome {
    pub questions_raised: Vec<QuestionId>,
    pub questions_answered: Vec<QuestionId>,
    pub revisions_applied: Vec<SceneId>,
    pub revisions_rejected: u32,
    pub warnings: Vec<String>,
}

pub struct ResponseIngestor;

impl ResponseIngestor {
    /// Apply a parsed response to the stores.
    pub fn ingest(
        agent: &AgentProfile,
        scene: &Scene,
        response: &AgentResponse,
        registry: &mut EntityRegistry,
        questions: &mut QuestionLedger,
        emotions: &mut EmotionalLedger,
        digests: &mut DigestStore,
    ) -> Result<IngestOutcome, LedgerError> {
        let mut outcome = IngestOutcome::default();

        // 1. Entity mentions — may create entities, so they land before
        //    anything that resolves names.
        for mention in &response.entity_mentions {
            registry.record_mention(
                scene.id,
                &mention.name,
                mention.kind,
                mention.cryptic,
                mention.absent,
            );
        }

        // 2. Emotional state — write-once per (agent, scene); a duplicate
        //    is a logic error in the pipeline and aborts the ingest.
        let mut state =
            Self::materialize(&response.emotional_state, agent, scene.id, registry);
        state.reaction = Some(response.reaction.clone());
        emotions.append(state)?;

        // 3. New questions.
        for raised in &response.questions_raised {
            let related = raised
                .related_entities
                .iter()
                .filter_map(|name| {
                    let found = registry.find_by_name(name).map(|e| e.id.clone());
                    if found.is_none() {
                        outcome
                            .warnings
                            .push(format!("question names unknown entity '{name}'"));
                    }
                    found
                })
                .collect();
            let id = questions.raise(
                raised.text.clone(),
                scene.id,
                agent.id.clone(),
                raised.narrative_weight,
                related,
                raised.speculation.clone(),
            );
            outcome.questions_raised.push(id);
        }

        // 4. References to still-open questions.
        for id in &response.questions_referenced {
            if let Err(e) = questions.reference(id, scene.id) {
                warn!(agent = %agent.id, question = %id, error = %e, "Reference rejected");
                outcome.warnings.push(e.to_string());
            }
        }

        // 5. Answered questions. Terminal-status violations are rejected
        //    and logged, never silently accepted.
        for answered in &response.questions_answered {
            match questions.resolve(&answered.id, answered.answer.clone(), scene.id) {
                Ok(()) => outcome.questions_answered.push(answered.id.clone()),
                Err(e) => {
                    warn!(agent = %agent.id, question = %answered.id, error = %e, "Resolution rejected");
                    outcome.warnings.push(e.to_string());
                }
            }
        }

        // 6. Retroactive revisions.
        for revision in &response.emotional_revisions {
            let state =
                Self::materialize(&revision.new_state, agent, revision.target_scene, registry);
            match emotions.revise(
                revision.target_scene,
                scene.id,
                state,
                revision.reason.clone(),
            ) {
                Ok(true) => {
                    outcome.revisions_applied.push(revision.target_scene);
                    // If the target already left the buffer, its digest
                    // gets an annotation; the snapshot stays untouched.
                    digests.annotate_revision(
                        revision.target_scene,
                        &agent.id,
                        scene.id,
                        &revision.reason,
                    );
                }
                Ok(false) => {
                    outcome.warnings.push(format!(
                        "revision of scene {} skipped: no prior record",
                        revision.target_scene
                    ));
                }
                Err(e @ LedgerError::RevisionOrder { .. }) => {
                    warn!(agent = %agent.id, error = %e, "Revision order violation");
                    outcome.revisions_rejected += 1;
                    outcome.warnings.push(e.to_string());
                }
                Err(e) => return Err(e),
            }
        }

        debug!(
            agent = %agent.id,
            scene = %scene.id,
            raised = outcome.questions_raised.len(),
            answered = outcome.questions_answered.len(),
            revisions = outcome.revisions_applied.len(),
            "Response ingested"
        );
        Ok(outcome)
    }

    /// Turn a reported emotion into a ledger-ready state: stamp the agent
    /// and scene, clamp numeric fields, and resolve character names to
    /// entity ids.
    fn materialize(
        reported: &ReportedEmotion,
        agent: &AgentProfile,
        scene: SceneId,
        registry: &EntityRegistry,
    ) -> EmotionalState {
        let character_investment = reported
            .character_investment
            .iter()
            .filter_map(|(name, feeling)| {
                registry
                    .find_by_name(name)
                    .map(|e| (e.id.clone(), feeling.clone()))
            })
            .collect();

        EmotionalState {
            agent_id: agent.id.clone(),
            scene,
            primary_emotion: reported.primary_emotion.clone(),
            intensity: reported.intensity.clamp(0.0, 1.0),
            secondary_emotions: reported.secondary_emotions.clone(),
            trajectory: reported.trajectory,
            engagement: reported.engagement.clamp(0.0, 1.0),
            enjoyment: reported.enjoyment.clamp(-1.0, 1.0),
            confusion: reported.confusion.clamp(0.0, 1.0),
            character_investment,
            cumulative_feelings: reported.cumulative_feelings.clone(),
            reaction: None,
            revised: false,
        }
    }
}
