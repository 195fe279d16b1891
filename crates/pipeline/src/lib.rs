//! # AgentForge Pipeline
//!
//! The conversation orchestration pipeline: routing a user utterance to a
//! skill, extracting the skill-scoped slice of the instruction document,
//! filtering tier-gated catalogs, assembling a compact context bundle,
//! composing the generation prompt, parsing the streamed response into
//! reasoning and answer channels, and driving all of it per turn through
//! a conversation session.
//!
//! Control flow per turn:
//!
//! ```text
//! utterance → IntentRouter → ContextAssembler → PromptComposer
//!           → Generator (collaborator) → StreamResponseParser → events
//! ```

pub mod access;
pub mod assembler;
pub mod composer;
pub mod router;
pub mod scenario;
pub mod session;
pub mod stream_parser;

pub use access::{AccessFilter, FilterOutcome, RiskTier};
pub use assembler::{AssembledContext, ContextAssembler, ContextBundle, SourceCategory, SourceLogEntry};
pub use composer::{compose_prompt, CLOSING_DIRECTIVE};
pub use router::{IntentRouter, Route, RouteDecision, GENERAL_CHAT_LABEL};
pub use scenario::{MarkerScenarioExtractor, ScenarioExtract, SCENARIO_NOT_FOUND};
pub use session::{ConversationSession, SessionContext, FAILURE_MESSAGE};
pub use stream_parser::{ParsePhase, ParsedStream, StreamResponseParser};
