use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::condition::WeatherCategory;

/// What a provider is asked to look up.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherRequest {
    City(String),
    Coordinates(Coordinates),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// A current-conditions snapshot for one place.
///
/// Field names follow the camelCase JSON shape used by the local weather
/// server and by the persisted favorites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherData {
    #[serde(deserialize_with = "lenient::id")]
    pub id: i64,
    pub city: String,
    pub country: String,
    /// Degrees Celsius, rounded.
    #[serde(deserialize_with = "lenient::rounded_i32")]
    pub temperature: i32,
    pub weather: WeatherCategory,
    /// Percent.
    #[serde(deserialize_with = "lenient::percent")]
    pub humidity: u8,
    /// Metres per second, rounded.
    #[serde(deserialize_with = "lenient::rounded_u32")]
    pub wind_speed: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub coordinates: Coordinates,
}

/// Readings from the local server are loosely typed JSON numbers: ids may be
/// strings and measurements may carry fractions. They are rounded on the way in.
mod lenient {
    use serde::{Deserialize, Deserializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawNumber {
        Int(i64),
        Float(f64),
        Text(String),
    }

    fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match RawNumber::deserialize(deserializer)? {
            RawNumber::Int(v) => Ok(v as f64),
            RawNumber::Float(v) => Ok(v),
            RawNumber::Text(text) => text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| D::Error::custom(format!("expected a number, got \"{text}\""))),
        }
    }

    pub fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        match RawNumber::deserialize(deserializer)? {
            RawNumber::Int(v) => Ok(v),
            RawNumber::Float(v) => Ok(v.round() as i64),
            RawNumber::Text(text) => text
                .trim()
                .parse::<i64>()
                .map_err(|_| D::Error::custom(format!("expected a numeric id, got \"{text}\""))),
        }
    }

    pub fn rounded_i32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
        Ok(number(deserializer)?.round() as i32)
    }

    pub fn rounded_u32<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        Ok(number(deserializer)?.round().max(0.0) as u32)
    }

    pub fn percent<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
        Ok(number(deserializer)?.round().clamp(0.0, 100.0) as u8)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentSearch {
    pub city: String,
    pub country: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl RecentSearch {
    pub fn from_weather(weather: &WeatherData, at: DateTime<Utc>) -> Self {
        Self {
            city: weather.city.clone(),
            country: weather.country.clone(),
            timestamp: at.timestamp_millis(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteCity {
    pub city: String,
    pub country: String,
    pub weather_data: WeatherData,
    /// Milliseconds since the Unix epoch.
    pub added_at: i64,
}

impl FavoriteCity {
    pub fn from_weather(weather: WeatherData, at: DateTime<Utc>) -> Self {
        Self {
            city: weather.city.clone(),
            country: weather.country.clone(),
            weather_data: weather,
            added_at: at.timestamp_millis(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[default]
    C,
    F,
}

impl TemperatureUnit {
    pub fn toggled(self) -> Self {
        match self {
            TemperatureUnit::C => TemperatureUnit::F,
            TemperatureUnit::F => TemperatureUnit::C,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::C => "°C",
            TemperatureUnit::F => "°F",
        }
    }

    /// Convert a Celsius reading into this unit, rounded to a whole degree.
    pub fn convert(&self, celsius: f64) -> i32 {
        let value = match self {
            TemperatureUnit::C => celsius,
            TemperatureUnit::F => celsius * 9.0 / 5.0 + 32.0,
        };
        value.round() as i32
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemperatureUnit::C => f.write_str("C"),
            TemperatureUnit::F => f.write_str("F"),
        }
    }
}

impl TryFrom<&str> for TemperatureUnit {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().trim_start_matches('°').to_ascii_uppercase().as_str() {
            "C" | "CELSIUS" => Ok(TemperatureUnit::C),
            "F" | "FAHRENHEIT" => Ok(TemperatureUnit::F),
            _ => Err(anyhow::anyhow!(
                "Unknown temperature unit '{value}'. Supported units: C, F."
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fahrenheit_conversion_rounds() {
        assert_eq!(TemperatureUnit::F.convert(0.0), 32);
        assert_eq!(TemperatureUnit::F.convert(25.0), 77);
        assert_eq!(TemperatureUnit::F.convert(-40.0), -40);
        assert_eq!(TemperatureUnit::C.convert(21.6), 22);
    }

    #[test]
    fn unit_parses_and_toggles() {
        assert_eq!(TemperatureUnit::try_from("f").unwrap(), TemperatureUnit::F);
        assert_eq!(TemperatureUnit::try_from("°C").unwrap(), TemperatureUnit::C);
        assert!(TemperatureUnit::try_from("K").is_err());
        assert_eq!(TemperatureUnit::C.toggled(), TemperatureUnit::F);
        assert_eq!(TemperatureUnit::F.toggled(), TemperatureUnit::C);
    }

    #[test]
    fn unit_serializes_as_bare_letter() {
        assert_eq!(serde_json::to_string(&TemperatureUnit::F).unwrap(), "\"F\"");
        let unit: TemperatureUnit = serde_json::from_str("\"C\"").unwrap();
        assert_eq!(unit, TemperatureUnit::C);
    }

    #[test]
    fn weather_data_reads_server_record() {
        let json = r#"{
            "id": 3,
            "city": "Tokyo",
            "country": "Japan",
            "temperature": 18,
            "weather": "Light Rain",
            "humidity": 82,
            "windSpeed": 4,
            "description": "Light drizzle over the bay",
            "icon": "light-rain",
            "coordinates": { "lat": 35.68, "lng": 139.69 }
        }"#;

        let data: WeatherData = serde_json::from_str(json).unwrap();
        assert_eq!(data.city, "Tokyo");
        assert_eq!(data.weather, WeatherCategory::LightRain);
        assert_eq!(data.wind_speed, 4);
        assert_eq!(data.coordinates, Coordinates::new(35.68, 139.69));
    }

    #[test]
    fn weather_data_rounds_fractional_readings_and_accepts_string_ids() {
        let json = r#"{
            "id": "12",
            "city": "Lahore",
            "country": "Pakistan",
            "temperature": 28.5,
            "weather": "Sunny",
            "humidity": 61.4,
            "windSpeed": "3.6",
            "coordinates": { "lat": 31.5, "lng": 74.3 }
        }"#;

        let data: WeatherData = serde_json::from_str(json).unwrap();
        assert_eq!(data.id, 12);
        assert_eq!(data.temperature, 29);
        assert_eq!(data.humidity, 61);
        assert_eq!(data.wind_speed, 4);
        assert!(data.description.is_empty());
    }

    #[test]
    fn weather_data_rejects_non_numeric_id() {
        let json = r#"{
            "id": "abc", "city": "X", "country": "Y", "temperature": 1,
            "weather": "Sunny", "humidity": 1, "windSpeed": 1,
            "coordinates": { "lat": 0.0, "lng": 0.0 }
        }"#;

        let err = serde_json::from_str::<WeatherData>(json).unwrap_err();
        assert!(err.to_string().contains("expected a numeric id"));
    }

    #[test]
    fn favorite_snapshot_copies_city_and_time() {
        let at = Utc.with_ymd_and_hms(2025, 8, 31, 12, 0, 0).unwrap();
        let weather = WeatherData {
            id: 1,
            city: "Paris".into(),
            country: "France".into(),
            temperature: 20,
            weather: WeatherCategory::Sunny,
            humidity: 40,
            wind_speed: 3,
            description: String::new(),
            icon: "sunny".into(),
            coordinates: Coordinates::new(48.85, 2.35),
        };

        let fav = FavoriteCity::from_weather(weather.clone(), at);
        assert_eq!(fav.city, "Paris");
        assert_eq!(fav.added_at, at.timestamp_millis());
        assert_eq!(fav.weather_data, weather);

        let value = serde_json::to_value(&fav).unwrap();
        assert!(value.get("weatherData").is_some());
        assert!(value.get("addedAt").is_some());
    }
}
