//! Caller implementations that don't need a network: scripted replay
//! for tests and demos, and a deterministic dry-run caller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;

use greenlight_core::caller::{AgentCaller, AgentResponse, ReportedEmotion};
use greenlight_core::context::Context;
use greenlight_core::emotion::Trajectory;
use greenlight_core::error::CallerError;
use greenlight_core::profile::AgentProfile;

/// A script: raw response payloads keyed by agent id, then scene position.
///
/// Payloads are kept as raw JSON strings so the scripted caller exercises
/// the same parse path (and the same malformed-response handling) as a
/// real LLM caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Script {
    pub responses: BTreeMap<String, BTreeMap<u32, String>>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raw payload for (agent, scene).
    pub fn add_raw(&mut self, agent_id: &str, scene: u32, raw: impl Into<String>) {
        self.responses
            .entry(agent_id.to_string())
            .or_default()
            .insert(scene, raw.into());
    }

    /// Add a structured response for (agent, scene).
    pub fn add(&mut self, agent_id: &str, scene: u32, response: &AgentResponse) {
        // Serializing a well-formed struct cannot fail.
        let raw = serde_json::to_string(response).unwrap_or_default();
        self.add_raw(agent_id, scene, raw);
    }
}

/// Replays canned payloads keyed by (agent, scene).
///
/// A missing entry is a transport error, which the pipeline treats as a
/// transient failure — useful for exercising retry and skip paths.
pub struct ScriptedCaller {
    script: Script,
    calls: Mutex<u32>,
}

impl ScriptedCaller {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            calls: Mutex::new(0),
        }
    }

    /// Total number of invocations made, for test assertions.
    pub fn call_count(&self) -> u32 {
        *self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl AgentCaller for ScriptedCaller {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn invoke(
        &self,
        agent: &AgentProfile,
        context: &Context,
    ) -> Result<AgentResponse, CallerError> {
        {
            let mut calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
            *calls += 1;
        }
        let raw = self
            .script
            .responses
            .get(&agent.id)
            .and_then(|per_scene| per_scene.get(&context.scene_id().position()))
            .ok_or_else(|| {
                CallerError::Transport(format!(
                    "no scripted response for agent '{}' at scene {}",
                    agent.id,
                    context.scene_id()
                ))
            })?;
        AgentResponse::from_json(raw)
    }
}

/// A caller that fabricates a mild, deterministic response from the
/// context alone. Lets the pipeline run end-to-end without any model or
/// script — engagement tracks how busy the scene looks.
pub struct DryRunCaller;

#[async_trait]
impl AgentCaller for DryRunCaller {
    fn name(&self) -> &str {
        "dry-run"
    }

    async fn invoke(
        &self,
        _agent: &AgentProfile,
        context: &Context,
    ) -> Result<AgentResponse, CallerError> {
        let scene = &context.current;
        let busyness = (scene.characters_present.len() as f32 * 0.1
            + scene.total_dialogue_lines() as f32 * 0.02)
            .min(0.5);

        Ok(AgentResponse {
            reaction: format!(
                "Read scene {} ({} characters present).",
                scene.id,
                scene.characters_present.len()
            ),
            notes: vec![],
            emotional_state: ReportedEmotion {
                primary_emotion: "attentive".into(),
                intensity: 0.3 + busyness,
                secondary_emotions: Default::default(),
                trajectory: Trajectory::Stable,
                engagement: 0.4 + busyness,
                enjoyment: 0.1,
                confusion: 0.0,
                character_investment: BTreeMap::new(),
                cumulative_feelings: String::new(),
            },
            questions_raised: vec![],
            questions_referenced: vec![],
            questions_answered: vec![],
            emotional_revisions: vec![],
            entity_mentions: vec![],
        })
    }
}
