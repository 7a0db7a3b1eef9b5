//! # Greenlight Engine
//!
//! Context assembly, scene compression, response ingestion, and the
//! sequential review pipeline that ties the memory stores to the
//! external agent caller.
//!
//! The engine never re-submits the full document: each step hands every
//! agent a bounded context (recent scenes, selected digests, retained
//! entities, active questions, the agent's own emotional journey) and
//! folds the structured response back into the stores.

pub mod assembler;
pub mod compressor;
pub mod ingestor;
pub mod pipeline;
pub mod report;
pub mod scripted;

pub use assembler::{AssemblerPolicy, ContextAssembler};
pub use compressor::Compressor;
pub use ingestor::{IngestOutcome, ResponseIngestor};
pub use pipeline::{PipelineConfig, ReviewPipeline};
pub use report::{IncompletePair, ReviewReport, SceneFeedback};
pub use scripted::{DryRunCaller, Script, ScriptedCaller};
