//! Conversation turns, transcripts, and per-turn execution traces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which pipeline stage a trace step reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStepKind {
    Router,
    Preparation,
    Generation,
}

impl TraceStepKind {
    /// Display title rendered in the UI trace panel.
    pub fn title(&self) -> &'static str {
        match self {
            TraceStepKind::Router => "意图路由 (Router)",
            TraceStepKind::Preparation => "准备阶段 (Preparation)",
            TraceStepKind::Generation => "LLM 最终生成",
        }
    }
}

/// Lifecycle of one trace step. Transitions are monotonic:
/// pending → processing → success | failed. Terminal states never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStatus {
    Pending,
    Processing,
    Success,
    Failed,
}

impl TraceStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TraceStatus::Success | TraceStatus::Failed)
    }
}

/// One step in the visible execution trace of an assistant turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceStep {
    pub kind: TraceStepKind,
    pub title: String,
    pub status: TraceStatus,
    /// Human-readable detail lines accumulated while the step runs.
    pub entries: Vec<String>,
    /// Wall-clock duration, filled in when the step reaches a terminal state.
    pub cost_ms: Option<u64>,
}

impl TraceStep {
    pub fn pending(kind: TraceStepKind) -> Self {
        Self {
            kind,
            title: kind.title().to_string(),
            status: TraceStatus::Pending,
            entries: Vec::new(),
            cost_ms: None,
        }
    }

    /// Move from pending to processing. No-op once terminal.
    pub fn begin(&mut self) {
        if !self.status.is_terminal() {
            self.status = TraceStatus::Processing;
        }
    }

    pub fn push_entry(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
    }

    /// Mark the step successful. No-op once terminal.
    pub fn succeed(&mut self, cost_ms: u64) {
        if !self.status.is_terminal() {
            self.status = TraceStatus::Success;
            self.cost_ms = Some(cost_ms);
        }
    }

    /// Mark the step failed. No-op once terminal.
    pub fn fail(&mut self, cost_ms: u64) {
        if !self.status.is_terminal() {
            self.status = TraceStatus::Failed;
            self.cost_ms = Some(cost_ms);
        }
    }
}

/// Who authored a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single turn in the conversation transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub id: Uuid,
    pub role: Role,
    /// Final answer text (user input, or assistant answer channel).
    pub content: String,
    /// Assistant reasoning channel, populated while streaming.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// Execution trace; empty for user turns.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<TraceStep>,
    pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::User,
            content: content.into(),
            reasoning: None,
            trace: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Create an empty assistant turn, ready to receive streamed content.
    pub fn assistant() -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Assistant,
            content: String::new(),
            reasoning: None,
            trace: Vec::new(),
            timestamp: Utc::now(),
        }
    }
}

/// Identifier for a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub Uuid);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ordered transcript of turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub turns: Vec<ChatTurn>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: ConversationId::new(),
            turns: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn push(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
        self.updated_at = Utc::now();
    }

    /// Number of user turns in the transcript.
    pub fn user_turns(&self) -> usize {
        self.turns.iter().filter(|t| t.role == Role::User).count()
    }

    /// Number of assistant turns in the transcript.
    pub fn assistant_turns(&self) -> usize {
        self.turns
            .iter()
            .filter(|t| t.role == Role::Assistant)
            .count()
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
