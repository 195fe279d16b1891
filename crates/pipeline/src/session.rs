//! Per-conversation turn engine.
//!
//! One logical thread of control per conversation: a single in-flight
//! generation guarded by a boolean, trace steps published monotonically,
//! and the turn owning its trace exclusively. A concurrent send is
//! rejected at the boundary, never queued.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};
use uuid::Uuid;

use agentforge_core::{
    ChatTurn, Conversation, DocumentStore, Error, EventBus, Generator, SessionError,
    SkillDescriptor, SubjectRecord, TraceStep, TraceStepKind, UiEvent,
};

use crate::assembler::ContextAssembler;
use crate::composer::compose_prompt;
use crate::router::IntentRouter;
use crate::scenario::{MarkerScenarioExtractor, ScenarioExtract};
use crate::stream_parser::StreamResponseParser;

/// User-visible text when the generation stream fails.
pub const FAILURE_MESSAGE: &str = "抱歉，系统生成失败。";

/// Everything one turn needs, threaded explicitly instead of read from
/// ambient state.
pub struct SessionContext {
    /// The full instruction document.
    pub instructions: String,
    /// Skill registry in registration order.
    pub skills: Vec<SkillDescriptor>,
    /// The active simulated subject.
    pub subject: SubjectRecord,
    /// Knowledge document lookup.
    pub documents: Arc<dyn DocumentStore>,
}

/// Drives the pipeline for one conversation.
pub struct ConversationSession {
    context: SessionContext,
    generator: Arc<dyn Generator>,
    extractor: Box<dyn ScenarioExtract>,
    router: IntentRouter,
    assembler: ContextAssembler,
    events: EventBus,
    conversation: Conversation,
    in_flight: AtomicBool,
}

impl ConversationSession {
    pub fn new(context: SessionContext, generator: Arc<dyn Generator>, events: EventBus) -> Self {
        Self {
            context,
            generator,
            extractor: Box::new(MarkerScenarioExtractor::new()),
            router: IntentRouter::new(),
            assembler: ContextAssembler::new(),
            events,
            conversation: Conversation::new(),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Swap in an alternate scenario extraction strategy.
    pub fn with_extractor(mut self, extractor: Box<dyn ScenarioExtract>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Whether a generation is currently draining. Callers use this to
    /// disable the send control.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Process one user utterance end to end.
    ///
    /// Returns the assistant turn id. A stream failure does not return
    /// an error: the turn is finalized with [`FAILURE_MESSAGE`] and a
    /// failed generation step, per the no-retry contract.
    pub async fn send(&mut self, utterance: &str) -> Result<Uuid, Error> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(SessionError::EmptyUtterance.into());
        }
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(SessionError::GenerationInFlight.into());
        }

        let result = self.run_turn(utterance).await;
        self.in_flight.store(false, Ordering::SeqCst);
        result
    }

    async fn run_turn(&mut self, utterance: &str) -> Result<Uuid, Error> {
        self.conversation.push(ChatTurn::user(utterance));

        let mut turn = ChatTurn::assistant();
        turn.trace = vec![
            TraceStep::pending(TraceStepKind::Router),
            TraceStep::pending(TraceStepKind::Preparation),
            TraceStep::pending(TraceStepKind::Generation),
        ];
        let turn_id = turn.id;
        let turn_index = self.conversation.turns.len();
        self.conversation.push(turn);

        info!(%turn_id, "processing turn");

        // Step 1: intent routing.
        let started = Instant::now();
        self.begin_step(turn_index, 0);
        let decision = self.router.route(utterance, &self.context.skills);
        {
            let step = &mut self.conversation.turns[turn_index].trace[0];
            for line in &decision.log {
                step.push_entry(line.clone());
            }
            step.succeed(started.elapsed().as_millis() as u64);
        }
        self.publish_step(turn_index, 0);

        // Step 2: context preparation.
        let started = Instant::now();
        {
            let step = &mut self.conversation.turns[turn_index].trace[1];
            step.title = match decision.route.skill() {
                Some(skill) => format!("准备阶段: {}", skill.name),
                None => "SOP 跳过".to_string(),
            };
        }
        self.begin_step(turn_index, 1);
        let assembled = self.assembler.assemble(
            &decision.route,
            &self.context.subject,
            self.context.documents.as_ref(),
        );
        {
            let step = &mut self.conversation.turns[turn_index].trace[1];
            for entry in &assembled.log {
                step.push_entry(entry.to_string());
            }
            step.succeed(started.elapsed().as_millis() as u64);
        }
        self.publish_step(turn_index, 1);

        // Step 3: generation.
        let started = Instant::now();
        self.begin_step(turn_index, 2);
        let scoped_instructions = match decision.route.skill() {
            Some(skill) => self.extractor.extract(&self.context.instructions, &skill.name),
            None => self.context.instructions.clone(),
        };
        let prompt = compose_prompt(&scoped_instructions, &assembled.bundle, utterance);
        {
            let step = &mut self.conversation.turns[turn_index].trace[2];
            step.push_entry(format!("[P] {prompt}"));
        }
        self.publish_step(turn_index, 2);

        let mut rx = match self.generator.generate(&prompt).await {
            Ok(rx) => rx,
            Err(err) => {
                warn!(error = %err, "generation request failed");
                self.fail_turn(turn_index, started);
                return Ok(turn_id);
            }
        };

        let mut parser = StreamResponseParser::new();
        while let Some(item) = rx.recv().await {
            match item {
                Ok(delta) => {
                    let snapshot = parser.push(&delta);
                    let turn = &mut self.conversation.turns[turn_index];
                    turn.reasoning = if snapshot.reasoning.is_empty() {
                        None
                    } else {
                        Some(snapshot.reasoning.clone())
                    };
                    turn.content = snapshot.answer.clone();
                    self.events.publish(UiEvent::AssistantContentUpdated {
                        turn_id,
                        reasoning: turn.reasoning.clone(),
                        answer: snapshot.answer,
                    });
                }
                Err(err) => {
                    warn!(error = %err, "generation stream interrupted");
                    self.fail_turn(turn_index, started);
                    return Ok(turn_id);
                }
            }
        }

        {
            let step = &mut self.conversation.turns[turn_index].trace[2];
            step.succeed(started.elapsed().as_millis() as u64);
        }
        self.publish_step(turn_index, 2);
        self.events.publish(UiEvent::TurnCompleted { turn_id });
        debug!(%turn_id, "turn completed");
        Ok(turn_id)
    }

    fn begin_step(&mut self, turn_index: usize, step_index: usize) {
        self.conversation.turns[turn_index].trace[step_index].begin();
        self.publish_step(turn_index, step_index);
    }

    fn publish_step(&mut self, turn_index: usize, step_index: usize) {
        let turn = &self.conversation.turns[turn_index];
        self.events.publish(UiEvent::TraceStepUpdated {
            turn_id: turn.id,
            step_index,
            step: turn.trace[step_index].clone(),
        });
    }

    fn fail_turn(&mut self, turn_index: usize, started: Instant) {
        let turn = &mut self.conversation.turns[turn_index];
        turn.content = FAILURE_MESSAGE.to_string();
        turn.trace[2].fail(started.elapsed().as_millis() as u64);
        let turn_id = turn.id;
        self.publish_step(turn_index, 2);
        self.events.publish(UiEvent::TurnFailed {
            turn_id,
            message: FAILURE_MESSAGE.to_string(),
        });
    }
}
