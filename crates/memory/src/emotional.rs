//! The emotional ledger — one agent's append-only record of how each
//! scene felt, with retroactive revision support.
//!
//! Implemented as an event log plus a "current view" index: a revision
//! appends a new record referencing the target scene and repoints the
//! index, so the original stays retrievable byte-for-byte. Each agent
//! owns a private ledger.

use std::collections::BTreeMap;
use tracing::{debug, warn};

use greenlight_core::emotion::{
    CompressedJourney, EmotionalState, JourneyPoint, LedgerEntry, Revision, Trajectory,
};
use greenlight_core::error::LedgerError;
use greenlight_core::scene::SceneId;

#[derive(Debug)]
pub struct EmotionalLedger {
    agent_id: String,
    /// Append-only event log.
    entries: Vec<LedgerEntry>,
    /// Index of the original state per scene position.
    originals: BTreeMap<u32, usize>,
    /// Index of the latest view per scene position (original or most
    /// recent revision).
    current: BTreeMap<u32, usize>,
}

impl EmotionalLedger {
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            entries: Vec::new(),
            originals: BTreeMap::new(),
            current: BTreeMap::new(),
        }
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    /// Append the state for a new scene. The ledger is write-once per
    /// scene: a second append for the same scene is a logic error in the
    /// caller and is rejected.
    pub fn append(&mut self, state: EmotionalState) -> Result<(), LedgerError> {
        let position = state.scene.position();
        if self.originals.contains_key(&position) {
            return Err(LedgerError::DuplicateAppend {
                agent_id: self.agent_id.clone(),
                scene: state.scene,
            });
        }
        let index = self.entries.len();
        self.entries.push(LedgerEntry::State(state));
        self.originals.insert(position, index);
        self.current.insert(position, index);
        Ok(())
    }

    /// Record a retroactive revision of an earlier scene.
    ///
    /// The target must precede the triggering scene (revising the future
    /// is an error). A revision of a scene with no prior record is a
    /// no-op with a reported warning — `Ok(false)` — not a crash.
    /// Returns `Ok(true)` when the revision was recorded.
    pub fn revise(
        &mut self,
        target: SceneId,
        trigger: SceneId,
        mut revised_state: EmotionalState,
        reason: impl Into<String>,
    ) -> Result<bool, LedgerError> {
        if target >= trigger {
            return Err(LedgerError::RevisionOrder { target, trigger });
        }
        if !self.originals.contains_key(&target.position()) {
            warn!(
                agent = %self.agent_id,
                target = %target,
                trigger = %trigger,
                "Revision targets a scene with no emotional record; skipping"
            );
            return Ok(false);
        }

        revised_state.agent_id = self.agent_id.clone();
        revised_state.scene = target;
        revised_state.revised = true;

        let reason = reason.into();
        let index = self.entries.len();
        self.entries.push(LedgerEntry::Revision(Revision {
            agent_id: self.agent_id.clone(),
            target_scene: target,
            triggering_scene: trigger,
            revised_state,
            reason,
        }));
        self.current.insert(target.position(), index);
        debug!(agent = %self.agent_id, target = %target, trigger = %trigger, "Revision recorded");
        Ok(true)
    }

    /// The full history: original states and revisions, in append order.
    pub fn history(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// The original state for a scene, untouched by any later revision.
    pub fn original(&self, scene: SceneId) -> Option<&EmotionalState> {
        let index = *self.originals.get(&scene.position())?;
        match &self.entries[index] {
            LedgerEntry::State(s) => Some(s),
            LedgerEntry::Revision(_) => None,
        }
    }

    /// The current view for a scene — the most recent revision if one
    /// exists, otherwise the original.
    pub fn current_view(&self, scene: SceneId) -> Option<&EmotionalState> {
        let index = *self.current.get(&scene.position())?;
        match &self.entries[index] {
            LedgerEntry::State(s) => Some(s),
            LedgerEntry::Revision(r) => Some(&r.revised_state),
        }
    }

    /// The current view of the most recently appended scene.
    pub fn latest(&self) -> Option<&EmotionalState> {
        let (&position, _) = self.originals.iter().next_back()?;
        self.current_view(SceneId(position))
    }

    /// Scene positions with an original record, ascending.
    pub fn scenes(&self) -> impl Iterator<Item = SceneId> + '_ {
        self.originals.keys().map(|&p| SceneId(p))
    }

    /// Compress the last `window` scenes into a journey summary for the
    /// next prompt. Uses the current view per scene; states with
    /// intensity above 0.8 weigh double when computing momentum and the
    /// carried narrative.
    pub fn journey(&self, window: usize) -> CompressedJourney {
        let scenes: Vec<SceneId> = self.scenes().collect();
        let start = scenes.len().saturating_sub(window);
        let mut points = Vec::with_capacity(scenes.len() - start);

        for &scene in &scenes[start..] {
            if let Some(state) = self.current_view(scene) {
                points.push(JourneyPoint {
                    scene,
                    primary_emotion: state.primary_emotion.clone(),
                    intensity: state.intensity,
                    engagement: state.engagement,
                    weight: state.journey_weight(),
                    revised: state.revised,
                });
            }
        }

        let momentum = Self::momentum(&points);
        let cumulative_feelings = self.carried_narrative(&points);

        CompressedJourney {
            agent_id: self.agent_id.clone(),
            points,
            momentum,
            cumulative_feelings,
        }
    }

    /// Weighted engagement trend across the window: later half vs earlier
    /// half, with intense states counting double.
    fn momentum(points: &[JourneyPoint]) -> Trajectory {
        if points.len() < 2 {
            return Trajectory::Stable;
        }
        let mid = points.len() / 2;
        let weighted_avg = |slice: &[JourneyPoint]| -> f32 {
            let total_weight: f32 = slice.iter().map(|p| p.weight).sum();
            if total_weight == 0.0 {
                return 0.0;
            }
            slice.iter().map(|p| p.engagement * p.weight).sum::<f32>() / total_weight
        };
        let early = weighted_avg(&points[..mid]);
        let late = weighted_avg(&points[mid..]);
        let delta = late - early;
        if delta > 0.05 {
            Trajectory::Rising
        } else if delta < -0.05 {
            Trajectory::Falling
        } else {
            Trajectory::Stable
        }
    }

    /// Build the carried narrative: the latest cumulative text plus the
    /// peak moments of the window.
    fn carried_narrative(&self, points: &[JourneyPoint]) -> String {
        let base = self
            .latest()
            .map(|s| s.cumulative_feelings.clone())
            .unwrap_or_default();

        let mut peaks: Vec<&JourneyPoint> =
            points.iter().filter(|p| p.intensity > 0.8).collect();
        peaks.sort_by(|a, b| {
            b.intensity
                .partial_cmp(&a.intensity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.scene.cmp(&b.scene))
        });

        if peaks.is_empty() {
            return base;
        }
        let highlights: Vec<String> = peaks
            .iter()
            .take(3)
            .map(|p| format!("{} at scene {}", p.primary_emotion, p.scene))
            .collect();
        if base.is_empty() {
            format!("Strongest moments: {}", highlights.join(", "))
        } else {
            format!("{} Strongest moments: {}", base, highlights.join(", "))
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
