//! # Weather Server
//!
//! The `get_weather`, `get_alerts` and `get_forecast` tools behind the
//! `weather-server` binary.

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::{ErrorData as McpError, ServerHandler, tool, tool_handler, tool_router};
use serde::Deserialize;

use crate::server::nws::NwsClient;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CityRequest {
    /// The name of the city to get the weather for
    pub city: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AlertsRequest {
    /// The two-letter state abbreviation (e.g. "CA" for California)
    pub state: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ForecastRequest {
    /// Latitude of the location
    pub latitude: f64,
    /// Longitude of the location
    pub longitude: f64,
}

pub fn current_weather(city: &str) -> String {
    format!("The weather in {city} is currently sunny with a temperature of 22°C.")
}

#[derive(Clone)]
pub struct WeatherServer {
    nws: NwsClient,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl WeatherServer {
    pub fn new(nws: NwsClient) -> Self {
        Self {
            nws,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Get the current weather for a specified city")]
    async fn get_weather(
        &self,
        Parameters(CityRequest { city }): Parameters<CityRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(%city, "get_weather");
        Ok(CallToolResult::success(vec![Content::text(current_weather(&city))]))
    }

    #[tool(description = "Get weather alerts for a specific US state")]
    async fn get_alerts(
        &self,
        Parameters(AlertsRequest { state }): Parameters<AlertsRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(%state, "get_alerts");
        Ok(CallToolResult::success(vec![Content::text(self.nws.alerts(&state).await)]))
    }

    #[tool(description = "Get weather forecast for a location")]
    async fn get_forecast(
        &self,
        Parameters(ForecastRequest { latitude, longitude }): Parameters<ForecastRequest>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!(latitude, longitude, "get_forecast");
        Ok(CallToolResult::success(vec![Content::text(
            self.nws.forecast(latitude, longitude).await,
        )]))
    }
}

#[tool_handler]
impl ServerHandler for WeatherServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "weather".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            instructions: Some("Weather tools: current conditions by city, NWS alerts by US state and NWS forecasts by coordinates.".to_string()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_weather_text() {
        assert_eq!(
            current_weather("Paris"),
            "The weather in Paris is currently sunny with a temperature of 22°C."
        );
    }

    #[test]
    fn test_router_lists_all_tools() {
        let server = WeatherServer::new(NwsClient::new().unwrap());
        let mut names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["get_alerts", "get_forecast", "get_weather"]);
    }

    #[test]
    fn test_tools_capability_advertised() {
        let info = WeatherServer::new(NwsClient::new().unwrap()).get_info();
        assert!(info.capabilities.tools.is_some());
        assert_eq!(info.server_info.name, "weather");
    }
}
