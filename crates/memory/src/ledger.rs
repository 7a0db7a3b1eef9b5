//! The question ledger — open mysteries, tracked until answered or
//! proven irrelevant.
//!
//! Status transitions are terminal and one-way. A transition attempt on
//! an answered or irrelevant question is rejected as a caller bug rather
//! than silently accepted, which keeps the audit history trustworthy.

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use greenlight_core::entity::EntityId;
use greenlight_core::error::LedgerError;
use greenlight_core::question::{NarrativeWeight, Question, QuestionId, QuestionStatus};
use greenlight_core::scene::SceneId;

/// How much urgency grows each time an open question is re-referenced.
const URGENCY_STEP: f32 = 0.1;

/// Tracks all questions across an entire document run.
#[derive(Debug, Default)]
pub struct QuestionLedger {
    questions: BTreeMap<QuestionId, Question>,
    counter: u32,
}

impl QuestionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise a new question. The raising scene counts as its first
    /// reference.
    pub fn raise(
        &mut self,
        text: impl Into<String>,
        scene: SceneId,
        raised_by: impl Into<String>,
        narrative_weight: NarrativeWeight,
        related_entities: BTreeSet<EntityId>,
        speculation: Option<String>,
    ) -> QuestionId {
        self.counter += 1;
        let id = QuestionId(format!("Q_{:03}", self.counter));
        let question = Question {
            id: id.clone(),
            text: text.into(),
            raised_scene: scene,
            raised_by: raised_by.into(),
            status: QuestionStatus::Open,
            references: BTreeSet::from([scene.position()]),
            related_entities,
            narrative_weight,
            urgency: 0.5,
            speculation,
            answer: None,
            answered_scene: None,
            irrelevant_reason: None,
            irrelevant_scene: None,
            importance: 0.0,
        };
        debug!(question = %id, scene = %scene, "Question raised");
        self.questions.insert(id.clone(), question);
        id
    }

    /// Record that a scene touched an open question. Re-referencing an
    /// open question makes it feel more pressing: urgency grows
    /// monotonically, capped at 1.0. References on terminal questions are
    /// still recorded (they matter for audit) but urgency is frozen.
    pub fn reference(&mut self, id: &QuestionId, scene: SceneId) -> Result<(), LedgerError> {
        let question = self
            .questions
            .get_mut(id)
            .ok_or_else(|| LedgerError::UnknownQuestion(id.clone()))?;
        let newly_added = question.references.insert(scene.position());
        if newly_added && question.is_open() {
            question.urgency = (question.urgency + URGENCY_STEP).min(1.0);
        }
        Ok(())
    }

    /// Transition a question to answered. Terminal states are one-way.
    pub fn resolve(
        &mut self,
        id: &QuestionId,
        answer: impl Into<String>,
        scene: SceneId,
    ) -> Result<(), LedgerError> {
        let question = self
            .questions
            .get_mut(id)
            .ok_or_else(|| LedgerError::UnknownQuestion(id.clone()))?;
        if !question.is_open() {
            warn!(question = %id, status = ?question.status, "Rejected transition on terminal question");
            return Err(LedgerError::TerminalStatus {
                id: id.clone(),
                status: question.status,
            });
        }
        question.status = QuestionStatus::Answered;
        question.answer = Some(answer.into());
        question.answered_scene = Some(scene);
        question.references.insert(scene.position());
        debug!(question = %id, scene = %scene, "Question answered");
        Ok(())
    }

    /// Transition a question to irrelevant. Terminal states are one-way.
    pub fn mark_irrelevant(
        &mut self,
        id: &QuestionId,
        reason: impl Into<String>,
        scene: SceneId,
    ) -> Result<(), LedgerError> {
        let question = self
            .questions
            .get_mut(id)
            .ok_or_else(|| LedgerError::UnknownQuestion(id.clone()))?;
        if !question.is_open() {
            warn!(question = %id, status = ?question.status, "Rejected transition on terminal question");
            return Err(LedgerError::TerminalStatus {
                id: id.clone(),
                status: question.status,
            });
        }
        question.status = QuestionStatus::Irrelevant;
        question.irrelevant_reason = Some(reason.into());
        question.irrelevant_scene = Some(scene);
        Ok(())
    }

    pub fn get(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.get(id)
    }

    pub fn by_status(&self, status: QuestionStatus) -> Vec<&Question> {
        self.questions
            .values()
            .filter(|q| q.status == status)
            .collect()
    }

    /// Open questions at or above the importance floor, highest first,
    /// ties broken by id for deterministic output.
    pub fn active(&self, min_importance: f32) -> Vec<&Question> {
        let mut selected: Vec<&Question> = self
            .questions
            .values()
            .filter(|q| q.is_open() && q.importance >= min_importance)
            .collect();
        selected.sort_by(|a, b| {
            b.importance
                .partial_cmp(&a.importance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        selected
    }

    /// Questions raised in the given scene.
    pub fn raised_in(&self, scene: SceneId) -> Vec<&Question> {
        self.questions
            .values()
            .filter(|q| q.raised_scene == scene)
            .collect()
    }

    /// Questions answered in the given scene.
    pub fn resolved_in(&self, scene: SceneId) -> Vec<&Question> {
        self.questions
            .values()
            .filter(|q| q.answered_scene == Some(scene))
            .collect()
    }

    /// Recompute importance for all open questions. `entity_importance`
    /// supplies the registry's current score for a related entity.
    pub fn recompute(
        &mut self,
        current: SceneId,
        entity_importance: impl Fn(&EntityId) -> f32,
    ) {
        for question in self.questions.values_mut() {
            if !question.is_open() {
                continue;
            }
            let max_entity = question
                .related_entities
                .iter()
                .map(&entity_importance)
                .fold(0.0, f32::max);
            question.recompute_importance(current, max_entity);
        }
    }

    /// Sweep very low-importance open questions into irrelevant status.
    /// Off by default; only runs when a threshold is configured. Returns
    /// the number of questions actually swept.
    pub fn prune_low_importance(&mut self, threshold: f32, scene: SceneId) -> usize {
        // Freshly-raised questions haven't been scored yet; skip them.
        let stale: Vec<QuestionId> = self
            .questions
            .values()
            .filter(|q| q.is_open() && q.importance < threshold && q.raised_scene != scene)
            .map(|q| q.id.clone())
            .collect();
        for id in &stale {
            let _ = self.mark_irrelevant(id, "importance decayed below threshold", scene);
        }
        stale.len()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.values()
    }
}
