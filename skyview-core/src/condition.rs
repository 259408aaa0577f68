use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized weather condition used to drive icons, colours and gradients.
///
/// Serialized as its display label (e.g. `"Partly Cloudy"`), which is also the
/// format the local JSON weather server stores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WeatherCategory {
    Sunny,
    Clear,
    #[default]
    PartlyCloudy,
    Cloudy,
    Overcast,
    Rainy,
    LightRain,
    HeavyRain,
    Thunderstorm,
    Stormy,
    Humid,
    Foggy,
    Misty,
    Snowy,
    Windy,
}

impl WeatherCategory {
    pub const fn all() -> &'static [WeatherCategory] {
        &[
            WeatherCategory::Sunny,
            WeatherCategory::Clear,
            WeatherCategory::PartlyCloudy,
            WeatherCategory::Cloudy,
            WeatherCategory::Overcast,
            WeatherCategory::Rainy,
            WeatherCategory::LightRain,
            WeatherCategory::HeavyRain,
            WeatherCategory::Thunderstorm,
            WeatherCategory::Stormy,
            WeatherCategory::Humid,
            WeatherCategory::Foggy,
            WeatherCategory::Misty,
            WeatherCategory::Snowy,
            WeatherCategory::Windy,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            WeatherCategory::Sunny => "Sunny",
            WeatherCategory::Clear => "Clear",
            WeatherCategory::PartlyCloudy => "Partly Cloudy",
            WeatherCategory::Cloudy => "Cloudy",
            WeatherCategory::Overcast => "Overcast",
            WeatherCategory::Rainy => "Rainy",
            WeatherCategory::LightRain => "Light Rain",
            WeatherCategory::HeavyRain => "Heavy Rain",
            WeatherCategory::Thunderstorm => "Thunderstorm",
            WeatherCategory::Stormy => "Stormy",
            WeatherCategory::Humid => "Humid",
            WeatherCategory::Foggy => "Foggy",
            WeatherCategory::Misty => "Misty",
            WeatherCategory::Snowy => "Snowy",
            WeatherCategory::Windy => "Windy",
        }
    }

    /// Icon identifier, e.g. `"partly-cloudy"`.
    pub fn icon_id(&self) -> &'static str {
        match self {
            WeatherCategory::Sunny => "sunny",
            WeatherCategory::Clear => "clear",
            WeatherCategory::PartlyCloudy => "partly-cloudy",
            WeatherCategory::Cloudy => "cloudy",
            WeatherCategory::Overcast => "overcast",
            WeatherCategory::Rainy => "rainy",
            WeatherCategory::LightRain => "light-rain",
            WeatherCategory::HeavyRain => "heavy-rain",
            WeatherCategory::Thunderstorm => "thunderstorm",
            // no dedicated icon
            WeatherCategory::Stormy => "partly-cloudy",
            WeatherCategory::Humid => "humid",
            WeatherCategory::Foggy => "foggy",
            WeatherCategory::Misty => "misty",
            WeatherCategory::Snowy => "snowy",
            WeatherCategory::Windy => "windy",
        }
    }

    /// Exact (case-insensitive) label lookup.
    pub fn from_label(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        Self::all()
            .iter()
            .copied()
            .find(|c| c.label().eq_ignore_ascii_case(trimmed))
    }

    /// Map a free-form provider condition string to a category.
    ///
    /// Rules are checked in order and the first hit wins, so "Partly sunny"
    /// is `Sunny` and "Patchy light rain with thunder" is `LightRain`.
    /// Anything unrecognised falls back to `PartlyCloudy`.
    pub fn normalize(condition: &str) -> Self {
        let lower = condition.to_lowercase();
        let has = |needle: &str| lower.contains(needle);

        if has("sunny") || has("clear") {
            WeatherCategory::Sunny
        } else if has("partly cloudy") || has("partly sunny") {
            WeatherCategory::PartlyCloudy
        } else if has("cloudy") || has("overcast") {
            WeatherCategory::Cloudy
        } else if has("rain") && has("heavy") {
            WeatherCategory::HeavyRain
        } else if has("rain") && has("light") {
            WeatherCategory::LightRain
        } else if has("rain") {
            WeatherCategory::Rainy
        } else if has("thunder") || has("storm") {
            WeatherCategory::Thunderstorm
        } else if has("snow") {
            WeatherCategory::Snowy
        } else if has("fog") || has("mist") {
            WeatherCategory::Foggy
        } else if has("wind") {
            WeatherCategory::Windy
        } else {
            WeatherCategory::PartlyCloudy
        }
    }
}

impl fmt::Display for WeatherCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for WeatherCategory {
    fn from(value: String) -> Self {
        Self::from_label(&value).unwrap_or_else(|| Self::normalize(&value))
    }
}

impl From<WeatherCategory> for String {
    fn from(value: WeatherCategory) -> Self {
        value.label().to_string()
    }
}
