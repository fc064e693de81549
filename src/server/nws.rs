//! National Weather Service API client
//!
//! Thin `reqwest` wrapper around `api.weather.gov`. Request failures are logged
//! and surface as `None`; the tools turn that into a friendly message.

use serde_json::Value;
use std::time::Duration;

pub const NWS_API_BASE: &str = "https://api.weather.gov";
const USER_AGENT: &str = "weather-app/1.0";
const ACCEPT: &str = "application/geo+json";
const FORECAST_PERIODS: usize = 5;

pub const NO_ALERTS: &str = "No active alerts found.";
pub const NO_FORECAST_POINT: &str = "Unable to fetch forecast data for this location.";
pub const NO_FORECAST: &str = "Unable to fetch detailed forecast.";

#[derive(Clone)]
pub struct NwsClient {
    http: reqwest::Client,
    base_url: String,
}

impl NwsClient {
    pub fn new() -> reqwest::Result<Self> {
        Self::with_base_url(NWS_API_BASE)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> reqwest::Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::ACCEPT, reqwest::header::HeaderValue::from_static(ACCEPT));

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn get_json(&self, url: &str) -> Option<Value> {
        let response = match self.http.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url, error = %e, "NWS request error");
                return None;
            }
        };

        let response = match response.error_for_status() {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url, error = %e, "NWS HTTP error");
                return None;
            }
        };

        match response.json::<Value>().await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::warn!(url, error = %e, "NWS returned invalid JSON");
                None
            }
        }
    }

    /// Active alerts for a two-letter US state code
    pub async fn alerts(&self, state: &str) -> String {
        let url = format!("{}/alerts/active?area={}", self.base_url, state.trim().to_uppercase());
        match self.get_json(&url).await {
            Some(data) => format_alerts(&data),
            None => NO_ALERTS.to_string(),
        }
    }

    /// Next forecast periods for a point
    pub async fn forecast(&self, latitude: f64, longitude: f64) -> String {
        let points_url = format!("{}/points/{},{}", self.base_url, latitude, longitude);
        let Some(points) = self.get_json(&points_url).await else {
            return NO_FORECAST_POINT.to_string();
        };

        let Some(forecast_url) = points["properties"]["forecast"].as_str() else {
            return NO_FORECAST_POINT.to_string();
        };

        match self.get_json(forecast_url).await {
            Some(forecast) => format_forecast(&forecast),
            None => NO_FORECAST.to_string(),
        }
    }
}

fn field<'a>(props: &'a Value, key: &str, fallback: &'a str) -> &'a str {
    props[key].as_str().unwrap_or(fallback)
}

pub fn format_alert(feature: &Value) -> String {
    let props = &feature["properties"];
    format!(
        "Event: {}\nArea: {}\nSeverity: {}\nDescription: {}\nInstructions: {}\n",
        field(props, "event", "Unknown"),
        field(props, "areaDesc", "Unknown"),
        field(props, "severity", "Unknown"),
        field(props, "description", "No description available"),
        field(props, "instruction", "No specific instructions provided"),
    )
}

pub fn format_alerts(data: &Value) -> String {
    match data["features"].as_array() {
        Some(features) if !features.is_empty() => features
            .iter()
            .map(format_alert)
            .collect::<Vec<_>>()
            .join("\n"),
        _ => NO_ALERTS.to_string(),
    }
}

pub fn format_forecast(data: &Value) -> String {
    let Some(periods) = data["properties"]["periods"].as_array() else {
        return NO_FORECAST.to_string();
    };

    periods
        .iter()
        .take(FORECAST_PERIODS)
        .map(|period| {
            format!(
                "{}:\nTemperature: {}°{}\nWind: {} {}\nForecast: {}\n",
                field(period, "name", "Unknown"),
                period["temperature"],
                field(period, "temperatureUnit", ""),
                field(period, "windSpeed", "Unknown"),
                field(period, "windDirection", ""),
                field(period, "detailedForecast", "No forecast available"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n---\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_alert_defaults() {
        let feature = json!({"properties": {"event": "Flood Warning", "severity": "Severe"}});
        let text = format_alert(&feature);
        assert!(text.starts_with("Event: Flood Warning\nArea: Unknown\nSeverity: Severe"));
        assert!(text.contains("Instructions: No specific instructions provided"));
    }

    #[test]
    fn test_empty_alerts() {
        assert_eq!(format_alerts(&json!({"features": []})), NO_ALERTS);
        assert_eq!(format_alerts(&json!({})), NO_ALERTS);
    }

    #[test]
    fn test_forecast_keeps_five_periods() {
        let periods: Vec<Value> = (0..7)
            .map(|i| {
                json!({
                    "name": format!("Period {i}"),
                    "temperature": 60 + i,
                    "temperatureUnit": "F",
                    "windSpeed": "10 mph",
                    "windDirection": "NW",
                    "detailedForecast": "Clear."
                })
            })
            .collect();
        let text = format_forecast(&json!({"properties": {"periods": periods}}));

        assert_eq!(text.split("\n---\n").count(), 5);
        assert!(text.starts_with("Period 0:\nTemperature: 60°F\nWind: 10 mph NW"));
        assert!(!text.contains("Period 5"));
    }

    #[tokio::test]
    async fn test_unreachable_api_falls_back() {
        let client = NwsClient::with_base_url("http://127.0.0.1:9").unwrap();
        assert_eq!(client.alerts("ca").await, NO_ALERTS);
        assert_eq!(client.forecast(38.58, -121.49).await, NO_FORECAST_POINT);
    }
}
