//! # Messages
//!
//! Constant strings and format functions for what the REPL prints.

pub const BANNER: &str = "MCP Client Started!";
pub const USAGE_HINT: &str = "Type your queries or 'quit' to exit.";
pub const PROMPT: &str = "\nQuery: ";
pub const CANCELLED: &str = "Cancelled.";
pub const GOODBYE: &str = "Goodbye!";

pub fn connected(tools: &[&str]) -> String {
    format!("Connected to server with tools: {}", tools.join(", "))
}

pub fn answer(text: &str) -> String {
    format!("\n{text}")
}

pub fn turn_failed(err: &str) -> String {
    format!("\nError: {err}")
}

pub fn startup_failed(err: &str) -> String {
    format!("Failed to start session: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connected_lists_tools() {
        assert_eq!(
            connected(&["get_weather", "get_alerts"]),
            "Connected to server with tools: get_weather, get_alerts"
        );
    }
}
