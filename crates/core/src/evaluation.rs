//! Readiness evaluation results.
//!
//! The total score combines a static configuration score (0-40) with a
//! dynamic conversational score (0-60), clamped to [0, 100].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One judged dimension of conversational quality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationDimension {
    pub name: String,
    /// 0-20 per dimension.
    pub score: u8,
    pub analysis: String,
}

/// A completed readiness evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Combined score, always `clamp(static + dynamic, 0, 100)`.
    pub total_score: u8,
    pub static_score: u8,
    pub dynamic_score: u8,
    pub dimensions: Vec<EvaluationDimension>,
    pub suggestions: Vec<String>,
    pub evaluated_at: DateTime<Utc>,
}

impl EvaluationResult {
    /// Combine component scores. This is the only constructor; the
    /// clamp invariant cannot be bypassed.
    pub fn combine(
        static_score: u8,
        dynamic_score: u8,
        dimensions: Vec<EvaluationDimension>,
        suggestions: Vec<String>,
    ) -> Self {
        let total = (static_score as u16 + dynamic_score as u16).min(100) as u8;
        Self {
            total_score: total,
            static_score,
            dynamic_score,
            dimensions,
            suggestions,
            evaluated_at: Utc::now(),
        }
    }
}
