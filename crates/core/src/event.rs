//! UI event bus for streaming session updates.
//!
//! Built on `tokio::sync::broadcast` so any number of frontends can
//! observe a session. Publishing with no subscribers is not an error.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::evaluation::EvaluationResult;
use crate::turn::TraceStep;

/// Events emitted while a session processes turns and evaluations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    /// A trace step on an assistant turn changed state.
    TraceStepUpdated {
        turn_id: Uuid,
        step_index: usize,
        step: TraceStep,
    },

    /// The assistant turn's streamed content was re-derived from the
    /// accumulated buffer.
    AssistantContentUpdated {
        turn_id: Uuid,
        reasoning: Option<String>,
        answer: String,
    },

    /// The assistant turn finished streaming successfully.
    TurnCompleted { turn_id: Uuid },

    /// The assistant turn failed; `message` is the user-facing text.
    TurnFailed { turn_id: Uuid, message: String },

    /// The static configuration score was recomputed.
    StaticScoreUpdated { score: u8, tips: Vec<String> },

    /// A dynamic evaluation completed.
    EvaluationCompleted { result: EvaluationResult },
}

/// Broadcast bus for [`UiEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<UiEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event. Dropped silently when no subscribers exist.
    pub fn publish(&self, event: UiEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
