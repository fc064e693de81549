//! # Transcript
//!
//! Ordered conversation history consumed by the model on each call.
//! Append-only during a turn; the history policy is applied only when a new
//! turn begins, and only on turn boundaries.

use crate::domain::config::HistoryPolicy;
use crate::domain::types::{Message, Role};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Start a new turn: repair, trim to the policy, then append the user query.
    pub fn begin_turn(&mut self, query: impl Into<String>, policy: &HistoryPolicy) {
        self.discard_unresolved_calls();
        if let HistoryPolicy::LastTurns { turns } = policy {
            // The turn about to start counts towards the limit.
            self.keep_last_turns(turns.saturating_sub(1));
        }
        self.messages.push(Message::user(query));
    }

    /// Number of user turns currently held.
    pub fn turns(&self) -> usize {
        self.messages.iter().filter(|m| m.role() == Role::User).count()
    }

    /// Drop everything before the `turns`-th most recent user message.
    pub fn keep_last_turns(&mut self, turns: usize) {
        if turns == 0 {
            self.messages.clear();
            return;
        }
        let starts: Vec<usize> = self
            .messages
            .iter()
            .enumerate()
            .filter(|(_, m)| m.role() == Role::User)
            .map(|(i, _)| i)
            .collect();
        if starts.len() > turns {
            let cut = starts[starts.len() - turns];
            self.messages.drain(..cut);
        }
    }

    /// Remove a trailing assistant tool-call message whose results never all
    /// arrived (a turn that failed mid-dispatch), together with its partial results.
    ///
    /// Keeps the invariant that every tool-call message sent to a model is
    /// followed by one result per call.
    pub fn discard_unresolved_calls(&mut self) {
        let Some(position) = self
            .messages
            .iter()
            .rposition(|m| !m.tool_calls().is_empty())
        else {
            return;
        };

        let expected = self.messages[position].tool_calls().len();
        let resolved = self.messages[position + 1..]
            .iter()
            .take_while(|m| m.role() == Role::Tool)
            .count();

        if resolved < expected {
            tracing::debug!(expected, resolved, "Discarding unresolved tool calls from transcript");
            self.messages.truncate(position);
        }
    }
}
