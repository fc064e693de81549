//! # Conversation Orchestrator
//!
//! Drives one user turn as an explicit state machine:
//!
//! ```text
//! AwaitingModel{round} --no calls--> Done
//!        |
//!        +--calls--> DispatchingTools{round} --round < max--> AwaitingModel{round + 1}
//!                                  |
//!                                  +--round == max--> AwaitingFinalModel --> Done
//! ```
//!
//! Any error moves the turn to `Failed`. Tool calls are resolved against the
//! catalog before the assistant message is appended, so a rejected call leaves
//! no dangling request in the transcript.

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span};

use crate::domain::catalog::ToolCatalog;
use crate::domain::config::{ConversationConfig, HistoryPolicy};
use crate::domain::errors::{Error, Result};
use crate::domain::traits::{ChatModel, ToolProvider};
use crate::domain::transcript::Transcript;
use crate::domain::types::{Message, ModelReply};

/// Upper bound on `max_tool_rounds`, whatever the configuration says.
pub const MAX_TOOL_ROUNDS_CEILING: u32 = 8;

#[derive(Debug)]
enum TurnState {
    AwaitingModel { round: u32 },
    DispatchingTools { round: u32, reply: ModelReply },
    AwaitingFinalModel,
    Done(String),
    Failed(Error),
}

/// State after the calls of `round` have all been answered.
fn after_dispatch(round: u32, max_rounds: u32) -> TurnState {
    if round >= max_rounds {
        TurnState::AwaitingFinalModel
    } else {
        TurnState::AwaitingModel { round: round + 1 }
    }
}

pub struct Orchestrator {
    provider: Arc<dyn ToolProvider>,
    model: Arc<dyn ChatModel>,
    catalog: ToolCatalog,
    max_tool_rounds: u32,
    history: HistoryPolicy,
    span: Span,
}

impl Orchestrator {
    pub fn new(
        provider: Arc<dyn ToolProvider>,
        model: Arc<dyn ChatModel>,
        catalog: ToolCatalog,
        config: &ConversationConfig,
    ) -> Self {
        let max_tool_rounds = config.max_tool_rounds.clamp(1, MAX_TOOL_ROUNDS_CEILING);
        if max_tool_rounds != config.max_tool_rounds {
            tracing::warn!(
                configured = config.max_tool_rounds,
                effective = max_tool_rounds,
                "max_tool_rounds out of range, clamped"
            );
        }

        Self {
            provider,
            model,
            catalog,
            max_tool_rounds,
            history: config.history.clone(),
            span: tracing::info_span!("conversation"),
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub fn max_tool_rounds(&self) -> u32 {
        self.max_tool_rounds
    }

    /// Run one user turn to completion and return the final answer.
    ///
    /// On failure the transcript keeps whatever was appended before the error,
    /// except for cancellation, which restores the transcript as it was before
    /// the query was added.
    pub async fn run_turn(
        &self,
        transcript: &mut Transcript,
        query: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let snapshot = transcript.clone();
        transcript.begin_turn(query, &self.history);

        let outcome = async {
            tracing::info!(query, "Processing query");
            self.drive(transcript, cancel).await
        }
        .instrument(self.span.clone())
        .await;

        match outcome {
            Ok(answer) => Ok(answer),
            Err(Error::Cancelled) => {
                *transcript = snapshot;
                self.span.in_scope(|| tracing::info!("Turn cancelled, transcript restored"));
                Err(Error::Cancelled)
            }
            Err(e) => {
                self.span.in_scope(|| tracing::error!(error = %e, "Turn failed"));
                Err(e)
            }
        }
    }

    async fn drive(&self, transcript: &mut Transcript, cancel: &CancellationToken) -> Result<String> {
        let mut state = TurnState::AwaitingModel { round: 1 };

        loop {
            tracing::debug!(?state, "Turn state");
            state = match state {
                TurnState::AwaitingModel { round } => {
                    match self.query_model(transcript, true, cancel).await {
                        Ok(reply) if reply.has_tool_calls() => TurnState::DispatchingTools { round, reply },
                        Ok(reply) => {
                            transcript.push(Message::assistant(reply.content.clone()));
                            TurnState::Done(reply.content)
                        }
                        Err(e) => TurnState::Failed(e),
                    }
                }
                TurnState::DispatchingTools { round, reply } => {
                    match self.dispatch(transcript, reply, round, cancel).await {
                        Ok(()) => after_dispatch(round, self.max_tool_rounds),
                        Err(e) => TurnState::Failed(e),
                    }
                }
                TurnState::AwaitingFinalModel => match self.query_model(transcript, false, cancel).await {
                    Ok(reply) => {
                        if reply.has_tool_calls() {
                            tracing::warn!(
                                calls = reply.tool_calls.len(),
                                "Ignoring tool calls in reply to a request without tools"
                            );
                        }
                        transcript.push(Message::assistant(reply.content.clone()));
                        TurnState::Done(reply.content)
                    }
                    Err(e) => TurnState::Failed(e),
                },
                TurnState::Done(answer) => return Ok(answer),
                TurnState::Failed(e) => return Err(e),
            };
        }
    }

    async fn query_model(
        &self,
        transcript: &Transcript,
        with_tools: bool,
        cancel: &CancellationToken,
    ) -> Result<ModelReply> {
        let tools = with_tools.then(|| self.catalog.descriptors());
        tracing::debug!(
            model = self.model.model_id(),
            messages = transcript.len(),
            with_tools,
            "Calling model"
        );
        guarded(cancel, self.model.chat(transcript.messages(), tools)).await
    }

    /// Append the tool-call message and one result per call, in request order.
    async fn dispatch(
        &self,
        transcript: &mut Transcript,
        reply: ModelReply,
        round: u32,
        cancel: &CancellationToken,
    ) -> Result<()> {
        for call in &reply.tool_calls {
            self.catalog.resolve(call)?;
        }

        tracing::info!(
            round,
            tools = ?reply.tool_calls.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
            "Dispatching tool calls"
        );

        let ModelReply { content, tool_calls } = reply;
        transcript.push(Message::assistant_with_calls(content, tool_calls.clone()));

        for call in &tool_calls {
            let output = guarded(
                cancel,
                self.provider.call_tool(&call.name, call.arguments.clone()),
            )
            .await?;
            transcript.push(Message::tool_result(call, output));
        }

        Ok(())
    }
}

/// Await `work` unless the token has fired or fires first.
async fn guarded<T>(cancel: &CancellationToken, work: impl Future<Output = Result<T>>) -> Result<T> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled),
        result = work => result,
    }
}
