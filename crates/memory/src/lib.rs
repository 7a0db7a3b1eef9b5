//! # Greenlight Memory
//!
//! The bounded working-memory stores that let agents read an arbitrarily
//! long document through a small fixed window:
//!
//! - **Entity Registry** — every named entity ever seen, importance-scored
//! - **Question Ledger** — open mysteries with importance/urgency scores
//! - **Emotional Ledger** — per-agent append-only emotional record with
//!   retroactive revision
//! - **Recent Buffer + Digest Store** — last K scenes in full detail,
//!   everything older as compressed digests
//!
//! All stores are owned by one pipeline run; nothing here is a process-wide
//! singleton, so multiple documents can be processed concurrently in the
//! same process.

pub mod buffer;
pub mod digest_store;
pub mod emotional;
pub mod ledger;
pub mod registry;

pub use buffer::RecentBuffer;
pub use digest_store::DigestStore;
pub use emotional::EmotionalLedger;
pub use ledger::QuestionLedger;
pub use registry::EntityRegistry;
