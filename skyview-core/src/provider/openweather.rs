use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    condition::WeatherCategory,
    model::{Coordinates, WeatherData, WeatherRequest},
    provider::{now_id, truncate_body},
};

use super::{ProviderId, WeatherProvider};

pub const DEFAULT_BASE_URL: &str = "http://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
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

    async fn fetch_current(&self, location: &[(&str, String)]) -> Result<WeatherData> {
        let url = format!("{}/weather", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(location)
            .query(&[("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await
            .context("Failed to send request to OpenWeather (current weather)")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather current response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather current request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather current JSON")?;

        parsed.into_weather_data(now_id())
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCoord {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    coord: OwCoord,
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

impl OwCurrentResponse {
    fn into_weather_data(self, id: i64) -> Result<WeatherData> {
        let condition = self
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("OpenWeather response contained no weather conditions"))?;

        let category = WeatherCategory::normalize(&condition.main);

        Ok(WeatherData {
            id,
            city: self.name,
            country: self.sys.country,
            temperature: self.main.temp.round() as i32,
            weather: category,
            humidity: self.main.humidity,
            wind_speed: self.wind.speed.round() as u32,
            description: condition.description,
            icon: category.icon_id().to_string(),
            coordinates: Coordinates::new(self.coord.lat, self.coord.lon),
        })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenWeather
    }

    async fn get_weather(&self, request: &WeatherRequest) -> Result<WeatherData> {
        match request {
            WeatherRequest::City(city) => self.fetch_current(&[("q", city.clone())]).await,
            WeatherRequest::Coordinates(coords) => {
                self.fetch_current(&[("lat", coords.lat.to_string()), ("lon", coords.lng.to_string())])
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn body(weather: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "name": "Lahore",
            "coord": { "lat": 31.55, "lon": 74.34 },
            "sys": { "country": "PK" },
            "main": { "temp": 34.4, "feels_like": 38.0, "humidity": 48 },
            "weather": weather,
            "wind": { "speed": 3.6 },
            "dt": 1725100000
        })
    }

    #[tokio::test]
    async fn coordinate_lookup_maps_main_condition() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("lat", "31.55"))
            .and(query_param("lon", "74.34"))
            .and(query_param("appid", "OW"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body(serde_json::json!([
                { "main": "Clear", "description": "clear sky" }
            ]))))
            .mount(&server)
            .await;

        let provider = OpenWeatherProvider::with_base_url("OW".into(), &server.uri());
        let data = provider
            .get_weather(&WeatherRequest::Coordinates(Coordinates::new(31.55, 74.34)))
            .await
            .unwrap();

        assert_eq!(data.city, "Lahore");
        assert_eq!(data.country, "PK");
        assert_eq!(data.temperature, 34);
        assert_eq!(data.wind_speed, 4);
        assert_eq!(data.weather, WeatherCategory::Sunny);
        assert_eq!(data.description, "clear sky");
        assert_eq!(data.icon, "sunny");
    }

    #[tokio::test]
    async fn city_lookup_uses_q() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "Lahore"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body(serde_json::json!([
                { "main": "Rain", "description": "moderate rain" }
            ]))))
            .mount(&server)
            .await;

        let provider = OpenWeatherProvider::with_base_url("OW".into(), &server.uri());
        let data = provider
            .get_weather(&WeatherRequest::City("Lahore".into()))
            .await
            .unwrap();

        assert_eq!(data.weather, WeatherCategory::Rainy);
    }

    #[tokio::test]
    async fn empty_weather_array_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body(serde_json::json!([]))))
            .mount(&server)
            .await;

        let provider = OpenWeatherProvider::with_base_url("OW".into(), &server.uri());
        let err = provider
            .get_weather(&WeatherRequest::City("Lahore".into()))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("no weather conditions"));
    }

    #[tokio::test]
    async fn unauthorized_is_reported() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/weather"))
            .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"cod":401,"message":"Invalid API key."}"#))
            .mount(&server)
            .await;

        let provider = OpenWeatherProvider::with_base_url("bad".into(), &server.uri());
        let err = provider
            .get_weather(&WeatherRequest::City("Lahore".into()))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("401"));
    }
}
