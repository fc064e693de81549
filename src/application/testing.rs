//! Mock implementations for testing
//!
//! These mocks let the orchestrator and session run without a model backend or
//! a tool-provider process.

use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::domain::errors::{Error, Result};
use crate::domain::traits::{ChatModel, ToolProvider};
use crate::domain::types::{Message, ModelReply, ToolDescriptor, ToolInvocation};

// ============================================================================
// Mock Model
// ============================================================================

/// One recorded `chat` call
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub messages: Vec<Message>,
    pub tools: Option<Vec<ToolDescriptor>>,
}

/// Mock chat model that returns queued replies
pub struct MockModel {
    replies: Mutex<VecDeque<Result<ModelReply>>>,
    pub requests: Mutex<Vec<ModelRequest>>,
}

impl MockModel {
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_reply(&self, reply: ModelReply) {
        self.replies.lock().unwrap().push_back(Ok(reply));
    }

    pub fn queue_error(&self, error: Error) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for MockModel {
    async fn chat(&self, messages: &[Message], tools: Option<&[ToolDescriptor]>) -> Result<ModelReply> {
        self.requests.lock().unwrap().push(ModelRequest {
            messages: messages.to_vec(),
            tools: tools.map(<[ToolDescriptor]>::to_vec),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::model_call("mock", "No mock reply queued")))
    }

    fn model_id(&self) -> &str {
        "mock-model"
    }
}

// ============================================================================
// Mock Provider
// ============================================================================

/// Mock tool provider with predefined outputs
pub struct MockProvider {
    tools: Vec<ToolDescriptor>,
    outputs: HashMap<String, Result<String, String>>,
    list_error: Option<String>,
    pub calls: Mutex<Vec<(String, Map<String, Value>)>>,
    pub close_count: Mutex<usize>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            outputs: HashMap::new(),
            list_error: None,
            calls: Mutex::new(Vec::new()),
            close_count: Mutex::new(0),
        }
    }

    /// Add a tool taking a single required string argument
    pub fn with_tool(mut self, name: &str, argument: &str, output: &str) -> Self {
        let mut properties = Map::new();
        properties.insert(argument.to_string(), json!({ "type": "string" }));
        self.tools.push(ToolDescriptor {
            name: name.to_string(),
            description: format!("Mock {name}"),
            input_schema: json!({
                "type": "object",
                "properties": properties,
                "required": [argument]
            }),
        });
        self.outputs.insert(name.to_string(), Ok(output.to_string()));
        self
    }

    /// Add a tool whose every call fails
    pub fn with_failing_tool(mut self, name: &str, message: &str) -> Self {
        self.tools.push(ToolDescriptor {
            name: name.to_string(),
            description: format!("Mock {name}"),
            input_schema: json!({ "type": "object", "properties": {} }),
        });
        self.outputs.insert(name.to_string(), Err(message.to_string()));
        self
    }

    pub fn with_descriptor(mut self, descriptor: ToolDescriptor) -> Self {
        self.outputs
            .insert(descriptor.name.clone(), Ok(format!("{} output", descriptor.name)));
        self.tools.push(descriptor);
        self
    }

    pub fn failing_list(mut self, message: &str) -> Self {
        self.list_error = Some(message.to_string());
        self
    }

    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.tools.clone()
    }

    pub fn recorded_calls(&self) -> Vec<(String, Map<String, Value>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn closed(&self) -> usize {
        *self.close_count.lock().unwrap()
    }
}

#[async_trait]
impl ToolProvider for MockProvider {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>> {
        match &self.list_error {
            Some(message) => Err(Error::ProviderQuery(message.clone())),
            None => Ok(self.tools.clone()),
        }
    }

    async fn call_tool(&self, name: &str, arguments: Map<String, Value>) -> Result<String> {
        self.calls.lock().unwrap().push((name.to_string(), arguments));
        match self.outputs.get(name) {
            Some(Ok(output)) => Ok(output.clone()),
            Some(Err(message)) => Err(Error::tool_execution(name, message.clone())),
            None => Err(Error::UnknownTool(name.to_string())),
        }
    }

    async fn close(&self) {
        *self.close_count.lock().unwrap() += 1;
    }
}

/// Build an invocation from a JSON object literal
pub fn invocation(id: &str, name: &str, arguments: Value) -> ToolInvocation {
    ToolInvocation::new(id, name, arguments.as_object().cloned().unwrap_or_default())
}
