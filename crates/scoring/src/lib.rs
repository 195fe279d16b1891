//! # AgentForge Scoring
//!
//! Readiness scoring for configured agents: a deterministic static score
//! over the configuration (0-40) and a judge-delegated dynamic score over
//! live conversations (0-60), combined into a bounded 0-100 total.

pub mod evaluator;
pub mod static_score;

pub use evaluator::DynamicEvaluator;
pub use static_score::{calculate_static_score, StaticScore};
