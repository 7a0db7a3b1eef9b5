//! # Greenlight Core
//!
//! Domain types, traits, and error definitions for the Greenlight review
//! engine. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! External collaborators (the scene parser, the LLM layer) are defined as
//! traits here; implementations live elsewhere. Cross-referencing domain
//! objects (entities ↔ questions, entity ↔ entity relationships) hold ids
//! into owning registries, never direct pointers, so state serializes
//! cleanly and there are no ownership cycles.

pub mod caller;
pub mod context;
pub mod digest;
pub mod emotion;
pub mod entity;
pub mod error;
pub mod event;
pub mod profile;
pub mod question;
pub mod scene;

// Re-export key types at crate root for ergonomics
pub use caller::{AgentCaller, AgentResponse};
pub use context::Context;
pub use digest::Digest;
pub use emotion::{CompressedJourney, EmotionalState, LedgerEntry, Revision};
pub use entity::{ContextTier, Entity, EntityId, EntityKind};
pub use error::{Error, Result};
pub use event::{DomainEvent, EventBus};
pub use profile::AgentProfile;
pub use question::{Question, QuestionId, QuestionStatus};
pub use scene::{Scene, SceneFeed, SceneId, VecFeed};
