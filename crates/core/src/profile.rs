//! Agent profiles — reviewer personalities as data.
//!
//! A profile is a plain configuration record (name, criteria weights,
//! persona text) consumed uniformly by the assembler and the caller.
//! There is no type hierarchy: two agents differ only in the values they
//! carry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Personality profile for one reviewing agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProfile {
    pub id: String,
    pub name: String,

    /// Persona text handed to the caller as the agent's voice.
    pub voice: String,

    /// How the agent phrases feedback (casual, coverage, intense, ...).
    #[serde(default)]
    pub feedback_style: String,

    /// What the agent cares about, as named criterion weights in [0, 1]
    /// (plot, character, dialogue, pacing, originality, ...).
    #[serde(default)]
    pub criteria: BTreeMap<String, f32>,

    /// Tolerance for slow material.
    #[serde(default = "default_trait")]
    pub patience: f32,
    /// How harsh the agent is.
    #[serde(default = "default_trait")]
    pub cynicism: f32,
    /// How emotionally involved the agent gets.
    #[serde(default = "default_trait")]
    pub emotional_investment: f32,

    #[serde(default)]
    pub description: String,
}

fn default_trait() -> f32 {
    0.5
}

impl AgentProfile {
    /// Look up a built-in profile by id.
    pub fn builtin(id: &str) -> Option<Self> {
        Self::builtin_roster().into_iter().find(|p| p.id == id)
    }

    /// The built-in reviewer roster.
    pub fn builtin_roster() -> Vec<Self> {
        vec![
            Self {
                id: "mainstream_fan".into(),
                name: "Max (Mainstream Fan)".into(),
                voice: "You are Max, a mainstream movie fan who loves big \
                        blockbusters, action, and clear storytelling. You want to \
                        be entertained and hate when things get slow or confusing. \
                        You're not a critic - you watch movies for fun."
                    .into(),
                feedback_style: "casual".into(),
                criteria: BTreeMap::from([
                    ("plot".into(), 0.8),
                    ("character".into(), 0.6),
                    ("dialogue".into(), 0.5),
                    ("pacing".into(), 0.9),
                    ("originality".into(), 0.3),
                ]),
                patience: 0.3,
                cynicism: 0.2,
                emotional_investment: 0.7,
                description: "Mainstream audience perspective - wants entertainment and a clear plot".into(),
            },
            Self {
                id: "indie_critic".into(),
                name: "Morgan (Indie Critic)".into(),
                voice: "You are Morgan, an indie film critic who values character \
                        depth, originality, and artistic merit. You appreciate slow \
                        burns and subtle storytelling, and you notice technical craft."
                    .into(),
                feedback_style: "professional".into(),
                criteria: BTreeMap::from([
                    ("plot".into(), 0.6),
                    ("character".into(), 0.9),
                    ("dialogue".into(), 0.8),
                    ("pacing".into(), 0.5),
                    ("originality".into(), 0.9),
                ]),
                patience: 0.8,
                cynicism: 0.6,
                emotional_investment: 0.8,
                description: "Arthouse perspective - values character, originality, craft".into(),
            },
            Self {
                id: "thriller_junkie".into(),
                name: "Kane (Thriller Junkie)".into(),
                voice: "You are Kane, a thriller junkie who demands tight plotting, \
                        escalating tension, and clever twists. You're constantly \
                        trying to predict what happens next, and you hate when a \
                        story telegraphs its reveals."
                    .into(),
                feedback_style: "intense".into(),
                criteria: BTreeMap::from([
                    ("plot".into(), 1.0),
                    ("character".into(), 0.6),
                    ("dialogue".into(), 0.6),
                    ("pacing".into(), 1.0),
                    ("originality".into(), 0.7),
                ]),
                patience: 0.3,
                cynicism: 0.7,
                emotional_investment: 0.8,
                description: "Thriller specialist - demands tension, twists, tight plotting".into(),
            },
            Self {
                id: "script_reader".into(),
                name: "Casey (Script Reader)".into(),
                voice: "You are Casey, a script reader who covers twenty scripts a \
                        week. You're brutal and efficient, you notice cliches and \
                        derivative plots immediately, and you're always deciding: \
                        pass or consider?"
                    .into(),
                feedback_style: "coverage".into(),
                criteria: BTreeMap::from([
                    ("plot".into(), 0.9),
                    ("character".into(), 0.8),
                    ("dialogue".into(), 0.8),
                    ("pacing".into(), 0.8),
                    ("originality".into(), 0.8),
                ]),
                patience: 0.4,
                cynicism: 0.9,
                emotional_investment: 0.4,
                description: "Professional coverage - efficient, harsh, demands originality".into(),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lookup() {
        let profile = AgentProfile::builtin("indie_critic").unwrap();
        assert_eq!(profile.name, "Morgan (Indie Critic)");
        assert!(profile.criteria["character"] > profile.criteria["plot"]);
        assert!(AgentProfile::builtin("nonexistent").is_none());
    }

    #[test]
    fn roster_ids_are_unique() {
        let roster = AgentProfile::builtin_roster();
        let mut ids: Vec<_> = roster.iter().map(|p| p.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), roster.len());
    }

    #[test]
    fn profile_deserializes_with_defaults() {
        let toml_like = serde_json::json!({
            "id": "custom",
            "name": "Custom Reviewer",
            "voice": "You are a custom reviewer."
        });
        let profile: AgentProfile = serde_json::from_value(toml_like).unwrap();
        assert!((profile.patience - 0.5).abs() < f32::EPSILON);
        assert!(profile.criteria.is_empty());
    }
}
