use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    condition::WeatherCategory,
    model::{Coordinates, WeatherData, WeatherRequest},
    provider::{now_id, truncate_body},
};

use super::{ProviderId, WeatherProvider};

pub const DEFAULT_BASE_URL: &str = "http://api.weatherapi.com/v1";

const KPH_TO_MPS: f64 = 0.277778;

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    async fn fetch_current(&self, query: &str) -> Result<WeatherData> {
        let url = format!("{}/current.json", self.base_url);
        tracing::debug!("Fetching WeatherAPI current conditions for '{query}'");

        let res = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("q", query), ("aqi", "no")])
            .send()
            .await
            .context("Failed to send request to WeatherAPI.com (current)")?;

        let status = res.status();
        let body = res.text().await.context("Failed to read WeatherAPI current response body")?;

        if !status.is_success() {
            return Err(anyhow::anyhow!(
                "WeatherAPI current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: WaResponse =
            serde_json::from_str(&body).context("Failed to parse WeatherAPI current JSON")?;

        Ok(parsed.into_weather_data(now_id()))
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    name: String,
    country: String,
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    humidity: u8,
    wind_kph: f64,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    location: WaLocation,
    current: WaCurrent,
}

impl WaResponse {
    fn into_weather_data(self, id: i64) -> WeatherData {
        let category = WeatherCategory::normalize(&self.current.condition.text);

        WeatherData {
            id,
            city: self.location.name,
            country: self.location.country,
            temperature: self.current.temp_c.round() as i32,
            weather: category,
            humidity: self.current.humidity,
            wind_speed: (self.current.wind_kph * KPH_TO_MPS).round() as u32,
            description: self.current.condition.text,
            icon: category.icon_id().to_string(),
            coordinates: Coordinates::new(self.location.lat, self.location.lon),
        }
    }
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    fn id(&self) -> ProviderId {
        ProviderId::WeatherApi
    }

    async fn get_weather(&self, request: &WeatherRequest) -> Result<WeatherData> {
        match request {
            WeatherRequest::City(city) => self.fetch_current(city).await,
            WeatherRequest::Coordinates(coords) => self.fetch_current(&coords.to_string()).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn london_body() -> serde_json::Value {
        serde_json::json!({
            "location": {
                "name": "London",
                "country": "United Kingdom",
                "lat": 51.52,
                "lon": -0.11,
                "localtime_epoch": 1725100000
            },
            "current": {
                "temp_c": 17.6,
                "humidity": 72,
                "wind_kph": 19.8,
                "condition": { "text": "Light rain shower", "code": 1240 }
            }
        })
    }

    #[tokio::test]
    async fn city_lookup_maps_response() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/current.json"))
            .and(query_param("key", "KEY"))
            .and(query_param("q", "London"))
            .and(query_param("aqi", "no"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
            .mount(&server)
            .await;

        let provider = WeatherApiProvider::with_base_url("KEY".into(), &server.uri());
        let data = provider
            .get_weather(&WeatherRequest::City("London".into()))
            .await
            .unwrap();

        assert_eq!(data.city, "London");
        assert_eq!(data.country, "United Kingdom");
        assert_eq!(data.temperature, 18);
        // 19.8 km/h ≈ 5.5 m/s
        assert_eq!(data.wind_speed, 6);
        assert_eq!(data.weather, WeatherCategory::LightRain);
        assert_eq!(data.icon, "light-rain");
        assert_eq!(data.description, "Light rain shower");
        assert_eq!(data.coordinates, Coordinates::new(51.52, -0.11));
    }

    #[tokio::test]
    async fn coordinates_are_sent_as_lat_comma_lon() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/current.json"))
            .and(query_param("q", "33.7,73.1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(london_body()))
            .mount(&server)
            .await;

        let provider = WeatherApiProvider::with_base_url("KEY".into(), &server.uri());
        let result = provider
            .get_weather(&WeatherRequest::Coordinates(Coordinates::new(33.7, 73.1)))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/current.json"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"error":{"code":1006,"message":"No matching location found."}}"#),
            )
            .mount(&server)
            .await;

        let provider = WeatherApiProvider::with_base_url("KEY".into(), &server.uri());
        let err = provider
            .get_weather(&WeatherRequest::City("Atlantis".into()))
            .await
            .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("400"));
        assert!(msg.contains("No matching location found"));
    }
}
