//! Scene records and the scene feed abstraction.
//!
//! A `Scene` is one ordered unit of the source document, produced by an
//! upstream parser. Scenes are immutable once parsed: downstream components
//! reference them and copy fields, but never mutate them.
//!
//! The feed guarantees strict ascending order with no gaps — every later
//! importance calculation depends on prior state, so an ordering violation
//! is fatal for the run rather than something to paper over.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::FeedError;

/// Ordinal identifier of a scene. The wrapped value is the 1-based
/// position of the scene in document order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SceneId(pub u32);

impl SceneId {
    /// Position in document order (same as the wrapped ordinal).
    pub fn position(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for SceneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One ordered unit of the source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// Ordinal id; doubles as the scene's position in document order.
    pub id: SceneId,

    /// Scene heading (e.g., "INT. KITCHEN - NIGHT").
    #[serde(default)]
    pub heading: String,

    /// Full scene text.
    pub text: String,

    /// Location extracted from the heading, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Names of characters present in the scene.
    #[serde(default)]
    pub characters_present: BTreeSet<String>,

    /// Names of notable objects in the scene.
    #[serde(default)]
    pub objects: BTreeSet<String>,

    /// Dialogue line counts per speaking character.
    #[serde(default)]
    pub dialogue_lines: BTreeMap<String, u32>,

    /// Word count of the full text.
    #[serde(default)]
    pub word_count: usize,

    /// Set on the final record of the feed.
    #[serde(default)]
    pub is_last: bool,
}

impl Scene {
    /// Total dialogue lines across all speakers.
    pub fn total_dialogue_lines(&self) -> u32 {
        self.dialogue_lines.values().sum()
    }

    /// Whether the named character speaks in this scene.
    pub fn speaks(&self, name: &str) -> bool {
        self.dialogue_lines.get(name).copied().unwrap_or(0) > 0
    }
}

/// A source of scenes in strict document order.
///
/// Implementations must yield scenes with consecutive ascending positions
/// and flag the final record with `is_last`. The pipeline consumes one
/// scene at a time and never rewinds.
pub trait SceneFeed: Send {
    /// Yield the next scene, or `None` when the feed is exhausted.
    fn next_scene(&mut self) -> std::result::Result<Option<Scene>, FeedError>;
}

/// An in-memory feed over a pre-parsed scene list.
///
/// Validates ordering on construction: positions must start at 1 and
/// ascend without gaps. The last scene gets `is_last` set if the parser
/// didn't already do so.
#[derive(Debug)]
pub struct VecFeed {
    scenes: std::vec::IntoIter<Scene>,
}

impl VecFeed {
    pub fn new(mut scenes: Vec<Scene>) -> std::result::Result<Self, FeedError> {
        for (i, scene) in scenes.iter().enumerate() {
            let expected = i as u32 + 1;
            if scene.id.position() != expected {
                return Err(FeedError::OutOfOrder {
                    expected,
                    got: scene.id.position(),
                });
            }
        }
        if let Some(last) = scenes.last_mut() {
            last.is_last = true;
        }
        Ok(Self {
            scenes: scenes.into_iter(),
        })
    }
}

impl SceneFeed for VecFeed {
    fn next_scene(&mut self) -> std::result::Result<Option<Scene>, FeedError> {
        Ok(self.scenes.next())
    }
}
