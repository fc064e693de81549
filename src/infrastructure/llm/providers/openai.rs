//! OpenAI-compatible API provider
//!
//! Supports OpenAI, Groq and other OpenAI-compatible chat completion APIs,
//! including function tools.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{ProviderConfig, error_message};
use crate::domain::types::{Message, ToolInvocation};
use crate::infrastructure::llm::{Context, Error, Response, TokenUsage};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI API request format
#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAITool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<OpenAIToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct OpenAITool {
    r#type: String,
    function: OpenAIFunction,
}

#[derive(Debug, Serialize)]
struct OpenAIFunction {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIToolCall {
    id: String,
    r#type: String,
    function: OpenAIFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAIFunctionCall {
    name: String,
    /// JSON-encoded argument object
    arguments: String,
}

/// OpenAI API response format
#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    model: String,
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// Execute a chat request using OpenAI-compatible API
pub async fn chat(
    http: &Client,
    provider_name: &str,
    config: ProviderConfig,
    context: Context,
) -> Result<Response, Error> {
    let base_url = config
        .base_url
        .clone()
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let url = format!("{}/chat/completions", base_url.trim_end_matches('/'));
    let request = translate_request(&config, &context);

    let mut request_builder = http
        .post(&url)
        .header("Content-Type", "application/json")
        .json(&request);

    if let Some(api_key) = &config.api_key {
        request_builder = request_builder.header("Authorization", format!("Bearer {}", api_key));
    }

    if let Some(timeout_secs) = config.timeout {
        request_builder = request_builder.timeout(std::time::Duration::from_secs(timeout_secs));
    }

    let response = request_builder
        .send()
        .await
        .map_err(|e| Error::new(provider_name, format!("HTTP request failed: {}", e)))?;

    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());

        return Err(Error::new(
            provider_name,
            error_message(&error_text).unwrap_or_else(|| format!("HTTP {}: {}", status, error_text)),
        ));
    }

    let openai_response: OpenAIResponse = response
        .json()
        .await
        .map_err(|e| Error::new(provider_name, format!("Failed to parse response: {}", e)))?;

    normalize_response(provider_name, openai_response)
}

fn translate_request(config: &ProviderConfig, context: &Context) -> OpenAIRequest {
    let tools = if context.tools.is_empty() {
        None
    } else {
        Some(
            context
                .tools
                .iter()
                .map(|t| OpenAITool {
                    r#type: "function".to_string(),
                    function: OpenAIFunction {
                        name: t.name.clone(),
                        description: t.description.clone(),
                        parameters: t.input_schema.clone(),
                    },
                })
                .collect(),
        )
    };

    let model = if config.default_model.is_empty() {
        "gpt-4o".to_string()
    } else {
        config.default_model.clone()
    };

    OpenAIRequest {
        model,
        messages: context.messages.iter().map(translate_message).collect(),
        tools,
        temperature: context.temperature,
    }
}

fn translate_message(msg: &Message) -> OpenAIMessage {
    match msg {
        Message::User { content } => OpenAIMessage {
            role: "user".to_string(),
            content: Some(content.clone()),
            tool_calls: None,
            tool_call_id: None,
        },
        Message::Assistant { content, tool_calls } => {
            let calls: Vec<OpenAIToolCall> = tool_calls
                .iter()
                .map(|call| OpenAIToolCall {
                    id: call.id.clone(),
                    r#type: "function".to_string(),
                    function: OpenAIFunctionCall {
                        name: call.name.clone(),
                        arguments: Value::Object(call.arguments.clone()).to_string(),
                    },
                })
                .collect();

            OpenAIMessage {
                role: "assistant".to_string(),
                content: (!content.is_empty() || calls.is_empty()).then(|| content.clone()),
                tool_calls: (!calls.is_empty()).then_some(calls),
                tool_call_id: None,
            }
        }
        Message::ToolResult { call_id, content, .. } => OpenAIMessage {
            role: "tool".to_string(),
            content: Some(content.clone()),
            tool_calls: None,
            tool_call_id: Some(call_id.clone()),
        },
    }
}

fn normalize_response(provider_name: &str, resp: OpenAIResponse) -> Result<Response, Error> {
    let choice = resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::new(provider_name, "No choices in response"))?;

    let mut tool_calls = Vec::new();
    for tc in choice.message.tool_calls.unwrap_or_default() {
        if tc.function.name.is_empty() {
            continue;
        }
        let arguments = match serde_json::from_str::<Value>(&tc.function.arguments) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                tracing::warn!(
                    tool = %tc.function.name,
                    arguments = %tc.function.arguments,
                    "Tool call arguments are not a JSON object"
                );
                Map::new()
            }
        };
        tool_calls.push(ToolInvocation::new(tc.id, tc.function.name, arguments));
    }

    let usage = resp
        .usage
        .map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        })
        .unwrap_or_default();

    Ok(Response {
        content: choice.message.content.unwrap_or_default(),
        tool_calls,
        model: resp.model,
        usage,
    })
}
