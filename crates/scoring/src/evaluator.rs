//! Dynamic conversational evaluation with trigger and cooldown gating.
//!
//! Evaluation is delegated to a `Judge` collaborator. At most one
//! evaluation is in flight at a time; a request while one is running, or
//! before the cooldown elapses, is silently skipped. A failed evaluation
//! never overwrites a prior result.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use agentforge_core::{
    Conversation, EvaluationDimension, EvaluationResult, Judge, JudgeError, Role,
};

/// Minimum user and assistant turns before the first evaluation.
const MIN_TURNS: usize = 3;

/// Re-trigger cadence in user turns after the first evaluation.
const RETRIGGER_EVERY: usize = 3;

/// Minimum interval between evaluations.
fn cooldown() -> Duration {
    Duration::seconds(60)
}

/// Runs judge-delegated evaluations over a conversation.
pub struct DynamicEvaluator {
    judge: Arc<dyn Judge>,
    in_flight: AtomicBool,
}

impl DynamicEvaluator {
    pub fn new(judge: Arc<dyn Judge>) -> Self {
        Self {
            judge,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Whether an evaluation should fire now.
    ///
    /// Requires at least [`MIN_TURNS`] user and assistant turns. The
    /// first evaluation fires as soon as that holds; afterwards, every
    /// additional [`RETRIGGER_EVERY`] user turns, gated by the cooldown
    /// since the last result and by the in-flight guard.
    pub fn should_evaluate(
        &self,
        conversation: &Conversation,
        last: Option<&EvaluationResult>,
        now: DateTime<Utc>,
    ) -> bool {
        if self.in_flight.load(Ordering::SeqCst) {
            return false;
        }
        let user_turns = conversation.user_turns();
        if user_turns < MIN_TURNS || conversation.assistant_turns() < MIN_TURNS {
            return false;
        }
        match last {
            None => true,
            Some(result) => {
                user_turns > RETRIGGER_EVERY
                    && user_turns % RETRIGGER_EVERY == 0
                    && now - result.evaluated_at > cooldown()
            }
        }
    }

    /// Run one evaluation, combining the given static score with the
    /// judge's verdict.
    ///
    /// Returns `Ok(None)` when another evaluation is already in flight
    /// (silent skip). Judge failures and malformed verdicts surface as
    /// errors; the caller keeps its prior result.
    pub async fn evaluate(
        &self,
        static_score: u8,
        static_tips: &[String],
        config_summary: &str,
        conversation: &Conversation,
    ) -> Result<Option<EvaluationResult>, JudgeError> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            debug!("evaluation already in flight, skipping");
            return Ok(None);
        }

        let transcript = render_transcript(conversation);
        let outcome = self.run(static_score, static_tips, config_summary, &transcript).await;
        self.in_flight.store(false, Ordering::SeqCst);
        outcome.map(Some)
    }

    async fn run(
        &self,
        static_score: u8,
        static_tips: &[String],
        config_summary: &str,
        transcript: &str,
    ) -> Result<EvaluationResult, JudgeError> {
        let verdict = match self.judge.judge(config_summary, transcript).await {
            Ok(v) => v,
            Err(err) => {
                warn!(error = %err, "judge call failed");
                return Err(err);
            }
        };
        verdict.validate()?;

        let dimensions = verdict
            .dimensions
            .iter()
            .map(|d| EvaluationDimension {
                name: d.name.clone(),
                score: d.score as u8,
                analysis: d.analysis.clone(),
            })
            .collect();
        let mut suggestions = verdict.suggestions;
        suggestions.extend(static_tips.iter().cloned());

        Ok(EvaluationResult::combine(
            static_score,
            verdict.dynamic_score as u8,
            dimensions,
            suggestions,
        ))
    }
}

/// Render the conversation the way the judge prompt expects it.
fn render_transcript(conversation: &Conversation) -> String {
    conversation
        .turns
        .iter()
        .map(|turn| {
            let speaker = match turn.role {
                Role::User => "用户",
                Role::Assistant => "智能体",
            };
            format!("[{speaker}]: {}", turn.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
