//! Ollama native chat provider
//!
//! Talks to `POST {endpoint}/api/chat` with `stream: false`. Tool calls come back
//! as `message.tool_calls[].function {name, arguments}` with arguments already an
//! object; Ollama assigns no call ids, so they are numbered per response.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{ProviderConfig, error_message};
use crate::domain::types::{Message, ToolInvocation};
use crate::infrastructure::llm::{Context, Error, Response, TokenUsage};

const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OllamaTool>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OllamaToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_name: Option<String>,
}

#[derive(Debug, Serialize)]
struct OllamaTool {
    r#type: String,
    function: OllamaFunction,
}

#[derive(Debug, Serialize)]
struct OllamaFunction {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaToolCall {
    function: OllamaFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaFunctionCall {
    name: String,
    #[serde(default)]
    arguments: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    model: String,
    message: OllamaMessage,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

/// Execute a chat request against an Ollama server
pub async fn chat(http: &Client, config: ProviderConfig, context: Context) -> Result<Response, Error> {
    let base_url = config
        .base_url
        .clone()
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
    let url = format!("{}/api/chat", base_url.trim_end_matches('/'));
    let request = translate_request(&config, &context);

    let mut request_builder = http.post(&url).json(&request);
    if let Some(timeout_secs) = config.timeout {
        request_builder = request_builder.timeout(std::time::Duration::from_secs(timeout_secs));
    }

    let response = request_builder
        .send()
        .await
        .map_err(|e| Error::new("ollama", format!("HTTP request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        return Err(Error::new(
            "ollama",
            error_message(&error_text).unwrap_or_else(|| format!("HTTP {}: {}", status, error_text)),
        ));
    }

    let ollama_response: OllamaResponse = response
        .json()
        .await
        .map_err(|e| Error::new("ollama", format!("Failed to parse response: {}", e)))?;

    Ok(normalize_response(ollama_response))
}

fn translate_request(config: &ProviderConfig, context: &Context) -> OllamaRequest {
    let tools = if context.tools.is_empty() {
        None
    } else {
        Some(
            context
                .tools
                .iter()
                .map(|t| OllamaTool {
                    r#type: "function".to_string(),
                    function: OllamaFunction {
                        name: t.name.clone(),
                        description: t.description.clone(),
                        parameters: t.input_schema.clone(),
                    },
                })
                .collect(),
        )
    };

    OllamaRequest {
        model: config.default_model.clone(),
        messages: context.messages.iter().map(translate_message).collect(),
        tools,
        stream: false,
        options: context.temperature.map(|temperature| OllamaOptions { temperature }),
    }
}

fn translate_message(msg: &Message) -> OllamaMessage {
    match msg {
        Message::User { content } => OllamaMessage {
            role: "user".to_string(),
            content: content.clone(),
            tool_calls: None,
            tool_name: None,
        },
        Message::Assistant { content, tool_calls } => OllamaMessage {
            role: "assistant".to_string(),
            content: content.clone(),
            tool_calls: (!tool_calls.is_empty()).then(|| {
                tool_calls
                    .iter()
                    .map(|call| OllamaToolCall {
                        function: OllamaFunctionCall {
                            name: call.name.clone(),
                            arguments: call.arguments.clone(),
                        },
                    })
                    .collect()
            }),
            tool_name: None,
        },
        Message::ToolResult { name, content, .. } => OllamaMessage {
            role: "tool".to_string(),
            content: content.clone(),
            tool_calls: None,
            tool_name: Some(name.clone()),
        },
    }
}

fn normalize_response(resp: OllamaResponse) -> Response {
    let tool_calls = resp
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .filter(|tc| !tc.function.name.is_empty())
        .enumerate()
        .map(|(i, tc)| ToolInvocation::new(format!("call_{i}"), tc.function.name, tc.function.arguments))
        .collect();

    let prompt_tokens = resp.prompt_eval_count.unwrap_or(0);
    let completion_tokens = resp.eval_count.unwrap_or(0);

    Response {
        content: resp.message.content,
        tool_calls,
        model: resp.model,
        usage: TokenUsage {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        },
    }
}
