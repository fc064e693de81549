//! # Domain Types
//!
//! Messages, tool descriptors and invocation requests shared by the orchestrator,
//! the MCP connection and the model backends.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Catalog entry advertised by a tool provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    /// JSON schema for the tool arguments, as advertised.
    pub input_schema: Value,
}

/// A model-emitted request to run one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Correlates the invocation with its result message.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolInvocation {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// One entry of the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    User {
        content: String,
    },
    Assistant {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolInvocation>,
    },
    #[serde(rename = "tool")]
    ToolResult {
        call_id: String,
        name: String,
        content: String,
    },
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Message::Assistant {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn assistant_with_calls(content: impl Into<String>, tool_calls: Vec<ToolInvocation>) -> Self {
        Message::Assistant {
            content: content.into(),
            tool_calls,
        }
    }

    pub fn tool_result(call: &ToolInvocation, content: impl Into<String>) -> Self {
        Message::ToolResult {
            call_id: call.id.clone(),
            name: call.name.clone(),
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Message::User { .. } => Role::User,
            Message::Assistant { .. } => Role::Assistant,
            Message::ToolResult { .. } => Role::Tool,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Message::User { content }
            | Message::Assistant { content, .. }
            | Message::ToolResult { content, .. } => content,
        }
    }

    /// Invocation requests carried by an assistant message.
    pub fn tool_calls(&self) -> &[ToolInvocation] {
        match self {
            Message::Assistant { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }
}

/// What a model returned for one chat call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    pub content: String,
    pub tool_calls: Vec<ToolInvocation>,
}

impl ModelReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn with_calls(tool_calls: Vec<ToolInvocation>) -> Self {
        Self {
            content: String::new(),
            tool_calls,
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_serializes_with_role_tag() {
        let call = ToolInvocation::new(
            "call_0",
            "get_weather",
            json!({"city": "Paris"}).as_object().cloned().unwrap_or_default(),
        );

        let value = serde_json::to_value(Message::tool_result(&call, "sunny")).unwrap();
        assert_eq!(value["role"], "tool");
        assert_eq!(value["name"], "get_weather");
        assert_eq!(value["call_id"], "call_0");

        let value = serde_json::to_value(Message::assistant("hi")).unwrap();
        assert_eq!(value["role"], "assistant");
        assert!(value.get("tool_calls").is_none());
    }

    #[test]
    fn test_tool_calls_only_on_assistant() {
        let call = ToolInvocation::new("call_0", "get_weather", Map::new());
        let msg = Message::assistant_with_calls("", vec![call.clone()]);
        assert_eq!(msg.tool_calls(), &[call]);
        assert!(Message::user("hello").tool_calls().is_empty());
        assert_eq!(Message::user("hello").role().as_str(), "user");
    }
}
