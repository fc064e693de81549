//! MCP tool mapping
//!
//! Converts `tools/list` entries into domain `ToolDescriptor`s and renders
//! `tools/call` results as the text fed back to the model.

use rmcp::model::{CallToolResult, Content, RawContent, Tool};
use serde_json::Value;

use crate::domain::types::ToolDescriptor;

pub fn descriptor_from_tool(tool: Tool) -> ToolDescriptor {
    ToolDescriptor {
        name: tool.name.to_string(),
        description: tool.description.map(|d| d.to_string()).unwrap_or_default(),
        input_schema: Value::Object((*tool.input_schema).clone()),
    }
}

/// Join text blocks; non-text blocks become short placeholders.
/// Falls back to the structured content when no blocks were returned.
pub fn render_result(result: &CallToolResult) -> String {
    let parts: Vec<String> = result.content.iter().map(render_content).collect();

    if parts.is_empty() {
        return result
            .structured_content
            .as_ref()
            .map(Value::to_string)
            .unwrap_or_default();
    }

    parts.join("\n")
}

pub fn is_error(result: &CallToolResult) -> bool {
    result.is_error.unwrap_or(false)
}

fn render_content(content: &Content) -> String {
    match &content.raw {
        RawContent::Text(text) => text.text.clone(),
        RawContent::Image(image) => format!("[image] mime_type={}", image.mime_type),
        RawContent::Audio(audio) => format!("[audio] mime_type={}", audio.mime_type),
        RawContent::ResourceLink(link) => format!("[resource_link] {}", link.uri),
        RawContent::Resource(_) => "[resource]".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_blocks_are_joined() {
        let result = CallToolResult::success(vec![Content::text("line one"), Content::text("line two")]);
        assert_eq!(render_result(&result), "line one\nline two");
        assert!(!is_error(&result));
    }

    #[test]
    fn test_error_flag_is_read() {
        let result = CallToolResult::error(vec![Content::text("city not found")]);
        assert!(is_error(&result));
        assert_eq!(render_result(&result), "city not found");
    }

    #[test]
    fn test_descriptor_keeps_schema() {
        let schema = json!({
            "type": "object",
            "properties": {"city": {"type": "string"}},
            "required": ["city"]
        });
        let tool = Tool::new(
            "get_weather",
            "Get the current weather for a specified city",
            std::sync::Arc::new(schema.as_object().cloned().unwrap_or_default()),
        );

        let descriptor = descriptor_from_tool(tool);
        assert_eq!(descriptor.name, "get_weather");
        assert_eq!(descriptor.input_schema, schema);
    }
}
