//! Offline stand-in for a coordinates lookup. Positions inside Pakistan map
//! to the nearest of three major cities; everywhere else gets a generic
//! mild reading.

use anyhow::Result;
use async_trait::async_trait;
use rand::Rng;

use crate::{
    condition::WeatherCategory,
    error::LookupError,
    model::{Coordinates, WeatherData, WeatherRequest},
    provider::now_id,
};

use super::{ProviderId, WeatherProvider};

struct RegionalCity {
    name: &'static str,
    base_temperature: i32,
    weather: WeatherCategory,
}

const ISLAMABAD: RegionalCity = RegionalCity {
    name: "Islamabad",
    base_temperature: 25,
    weather: WeatherCategory::PartlyCloudy,
};
const LAHORE: RegionalCity = RegionalCity {
    name: "Lahore",
    base_temperature: 28,
    weather: WeatherCategory::Sunny,
};
const KARACHI: RegionalCity = RegionalCity {
    name: "Karachi",
    base_temperature: 30,
    weather: WeatherCategory::Clear,
};

pub fn in_pakistan(coords: Coordinates) -> bool {
    (24.0..=37.0).contains(&coords.lat) && (61.0..=75.0).contains(&coords.lng)
}

/// Generate a plausible current-conditions snapshot for `coords`.
pub fn regional_weather<R: Rng + ?Sized>(coords: Coordinates, rng: &mut R, id: i64) -> WeatherData {
    if in_pakistan(coords) {
        let city = if coords.lat > 33.0 {
            &ISLAMABAD
        } else if coords.lat > 31.0 {
            &LAHORE
        } else {
            &KARACHI
        };

        return WeatherData {
            id,
            city: city.name.to_string(),
            country: "Pakistan".to_string(),
            temperature: city.base_temperature + rng.random_range(-2..=2),
            weather: city.weather,
            humidity: rng.random_range(50..=80),
            wind_speed: rng.random_range(5..=15),
            description: format!("Current weather in {}", city.name),
            icon: city.weather.icon_id().to_string(),
            coordinates: coords,
        };
    }

    let weather = WeatherCategory::PartlyCloudy;
    WeatherData {
        id,
        city: "Current Location".to_string(),
        country: "Unknown".to_string(),
        temperature: rng.random_range(20..=30),
        weather,
        humidity: 60,
        wind_speed: 8,
        description: "Weather at your current location".to_string(),
        icon: weather.icon_id().to_string(),
        coordinates: coords,
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimulatedProvider;

impl SimulatedProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl WeatherProvider for SimulatedProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Simulated
    }

    async fn get_weather(&self, request: &WeatherRequest) -> Result<WeatherData> {
        match request {
            WeatherRequest::Coordinates(coords) => {
                let data = regional_weather(*coords, &mut rand::rng(), now_id());
                tracing::debug!("Simulated weather for {coords}: {} {}", data.city, data.weather);
                Ok(data)
            }
            WeatherRequest::City(_) => Err(LookupError::Unsupported {
                provider: ProviderId::Simulated.as_str(),
                what: "city",
            }
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn pakistan_bands_pick_city() {
        let mut rng = StdRng::seed_from_u64(7);

        let north = regional_weather(Coordinates::new(33.7, 73.1), &mut rng, 1);
        assert_eq!(north.city, "Islamabad");
        assert_eq!(north.weather, WeatherCategory::PartlyCloudy);

        let central = regional_weather(Coordinates::new(31.5, 74.3), &mut rng, 2);
        assert_eq!(central.city, "Lahore");
        assert_eq!(central.weather, WeatherCategory::Sunny);

        let south = regional_weather(Coordinates::new(24.9, 67.0), &mut rng, 3);
        assert_eq!(south.city, "Karachi");
        assert_eq!(south.weather, WeatherCategory::Clear);
        assert_eq!(south.country, "Pakistan");
        assert_eq!(south.description, "Current weather in Karachi");
    }

    #[test]
    fn icon_follows_regional_condition() {
        let mut rng = StdRng::seed_from_u64(3);
        let icons: Vec<String> = [(33.7, 73.1), (31.5, 74.3), (24.9, 67.0)]
            .into_iter()
            .map(|(lat, lng)| regional_weather(Coordinates::new(lat, lng), &mut rng, 0).icon)
            .collect();

        assert_eq!(icons, ["partly-cloudy", "sunny", "clear"]);
    }

    #[test]
    fn pakistan_readings_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let w = regional_weather(Coordinates::new(31.5, 74.3), &mut rng, 0);
            assert!((26..=30).contains(&w.temperature));
            assert!((50..=80).contains(&w.humidity));
            assert!((5..=15).contains(&w.wind_speed));
        }
    }

    #[test]
    fn elsewhere_falls_back() {
        let mut rng = StdRng::seed_from_u64(1);
        let coords = Coordinates::new(48.85, 2.35);
        let w = regional_weather(coords, &mut rng, 9);

        assert_eq!(w.city, "Current Location");
        assert_eq!(w.country, "Unknown");
        assert!((20..=30).contains(&w.temperature));
        assert_eq!(w.humidity, 60);
        assert_eq!(w.wind_speed, 8);
        assert_eq!(w.icon, "partly-cloudy");
        assert_eq!(w.coordinates, coords);
    }

    #[test]
    fn bounding_box_is_inclusive() {
        assert!(in_pakistan(Coordinates::new(24.0, 61.0)));
        assert!(in_pakistan(Coordinates::new(37.0, 75.0)));
        assert!(!in_pakistan(Coordinates::new(37.01, 70.0)));
        assert!(!in_pakistan(Coordinates::new(30.0, 75.5)));
    }

    #[tokio::test]
    async fn city_requests_are_unsupported() {
        let err = SimulatedProvider::new()
            .get_weather(&WeatherRequest::City("Lahore".into()))
            .await
            .unwrap_err();

        assert!(matches!(
            LookupError::find(&err),
            Some(LookupError::Unsupported { what: "city", .. })
        ));
    }
}
