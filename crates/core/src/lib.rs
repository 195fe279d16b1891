//! # AgentForge Core
//!
//! Domain types, traits, and error definitions for the AgentForge
//! conversation orchestration pipeline. This crate has **zero framework
//! dependencies** — it defines the domain model that all other crates
//! implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (text generation backend, evaluation
//! judge, document storage) is defined as a trait here. Implementations
//! live in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod document;
pub mod error;
pub mod evaluation;
pub mod event;
pub mod generate;
pub mod judge;
pub mod record;
pub mod skill;
pub mod turn;

// Re-export key types at crate root for ergonomics
pub use document::{DocumentStore, InMemoryDocumentStore, DOCUMENT_UNAVAILABLE};
pub use error::{Error, GenerationError, JudgeError, Result, SessionError};
pub use evaluation::{EvaluationDimension, EvaluationResult};
pub use event::{EventBus, UiEvent};
pub use generate::Generator;
pub use judge::{DimensionScore, Judge, JudgeVerdict};
pub use record::SubjectRecord;
pub use skill::SkillDescriptor;
pub use turn::{ChatTurn, Conversation, ConversationId, Role, TraceStatus, TraceStep, TraceStepKind};
