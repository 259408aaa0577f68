//! Presentation tables: how a weather category, wind speed or humidity
//! reading is shown to the user.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::condition::WeatherCategory;

/// Cities offered as one-tap suggestions on the search screen.
pub const AVAILABLE_CITIES: &[&str] = &[
    "New York",
    "London",
    "Tokyo",
    "Paris",
    "Sydney",
    "Dubai",
    "Mumbai",
    "Singapore",
    "Toronto",
    "Berlin",
];

const DARK_TEXT: &str = "#333";
const LIGHT_TEXT: &str = "#fff";
const DEFAULT_ACCENT: &str = "#87CEEB";
const SKY_BACKDROP: Gradient = ["#87CEEB", "#B0E0E6", "#E0F6FF"];

/// Three-stop, top-left to bottom-right gradient.
pub type Gradient = [&'static str; 3];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardStyle {
    pub background_color: String,
    pub border_color: String,
    pub border_width: u8,
}

pub fn gradient(category: WeatherCategory) -> Gradient {
    use WeatherCategory::*;

    match category {
        Sunny | Clear => ["#FFD700", "#FFA500", "#FF8C00"],
        Cloudy => ["#808080", "#A9A9A9", "#C0C0C0"],
        Overcast => ["#696969", "#808080", "#A9A9A9"],
        PartlyCloudy => ["#A9A9A9", "#C0C0C0", "#D3D3D3"],
        Rainy => ["#4169E1", "#1E90FF", "#00BFFF"],
        LightRain | Windy => ["#87CEEB", "#B0E0E6", "#E0F6FF"],
        HeavyRain => ["#1E90FF", "#4169E1", "#000080"],
        Thunderstorm | Stormy => ["#483D8B", "#2F4F4F", "#191970"],
        Humid => ["#20B2AA", "#48D1CC", "#7FFFD4"],
        Foggy => ["#D3D3D3", "#F5F5F5", "#FFFFFF"],
        Misty | Snowy => ["#F0F8FF", "#E6E6FA", "#F8F8FF"],
    }
}

/// Animated backdrop behind a weather card. The light palette is the card
/// gradient itself.
pub fn background_gradient(category: WeatherCategory, dark: bool) -> Gradient {
    use WeatherCategory::*;

    if !dark {
        return gradient(category);
    }

    match category {
        Sunny | Clear => ["#B8860B", "#D2691E", "#CD853F"],
        Cloudy | Overcast => ["#2F4F4F", "#696969", "#778899"],
        PartlyCloudy | Foggy => ["#696969", "#778899", "#B0C4DE"],
        Rainy => ["#191970", "#000080", "#0000CD"],
        HeavyRain => ["#000080", "#191970", "#000033"],
        LightRain | Windy => ["#4682B4", "#5F9EA0", "#B0E0E6"],
        Thunderstorm | Stormy => ["#191970", "#000033", "#000022"],
        Humid => ["#008B8B", "#20B2AA", "#48D1CC"],
        Misty | Snowy => ["#778899", "#B0C4DE", "#E6E6FA"],
    }
}

/// Full-screen backdrop behind the current conditions. Softer than the card
/// gradient for most categories; `None` means nothing has been looked up yet.
pub fn screen_gradient(category: Option<WeatherCategory>) -> Gradient {
    use WeatherCategory::*;

    let Some(category) = category else {
        return SKY_BACKDROP;
    };

    match category {
        Sunny | Clear => ["#FFD700", "#FFA500", "#FF8C00"],
        Cloudy => ["#708090", "#778899", "#B0C4DE"],
        Overcast => ["#696969", "#808080", "#A9A9A9"],
        PartlyCloudy => ["#87CEEB", "#B0C4DE", "#E6E6FA"],
        Rainy => ["#4682B4", "#5F9EA0", "#87CEEB"],
        LightRain | Windy => SKY_BACKDROP,
        HeavyRain => ["#1E90FF", "#4169E1", "#0000CD"],
        Thunderstorm => ["#483D8B", "#6A5ACD", "#9370DB"],
        Stormy => ["#2F4F4F", "#483D8B", "#191970"],
        Humid => ["#20B2AA", "#48D1CC", "#7FFFD4"],
        Foggy => ["#D3D3D3", "#F5F5F5", "#FFFFFF"],
        Misty => ["#F0F8FF", "#E6E6FA", "#F8F8FF"],
        Snowy => ["#F0F8FF", "#E6E6FA", "#FFFFFF"],
    }
}

/// Header text colour over [`screen_gradient`].
pub fn screen_text_color(category: Option<WeatherCategory>) -> &'static str {
    use WeatherCategory::*;

    match category {
        None | Some(Sunny | Clear | Foggy | Misty | Snowy) => DARK_TEXT,
        Some(_) => LIGHT_TEXT,
    }
}

/// CSS rendition of [`gradient`], e.g. for HTML exports.
pub fn css_gradient(category: WeatherCategory) -> String {
    let [a, b, c] = gradient(category);
    format!("linear-gradient(135deg, {a} 0%, {b} 50%, {c} 100%)")
}

pub fn accent_color(category: WeatherCategory) -> &'static str {
    use WeatherCategory::*;

    match category {
        Sunny | Clear => "#FFD700",
        Cloudy => "#808080",
        Overcast => "#696969",
        PartlyCloudy => "#A9A9A9",
        Rainy => "#4169E1",
        LightRain => DEFAULT_ACCENT,
        HeavyRain => "#1E90FF",
        Thunderstorm | Stormy => "#483D8B",
        Humid => "#20B2AA",
        Foggy => "#D3D3D3",
        Misty | Snowy => "#F0F8FF",
        Windy => DEFAULT_ACCENT,
    }
}

pub fn emoji(category: WeatherCategory) -> &'static str {
    use WeatherCategory::*;

    match category {
        Sunny => "☀️",
        Clear => "🌤️",
        PartlyCloudy => "⛅",
        Cloudy | Overcast => "☁️",
        Rainy | HeavyRain => "🌧️",
        LightRain => "🌦️",
        Thunderstorm | Stormy => "⛈️",
        Humid => "💧",
        Foggy | Misty => "🌫️",
        Snowy => "❄️",
        Windy => "💨",
    }
}

/// Bright backgrounds get dark text, everything else white.
pub fn text_color(category: WeatherCategory) -> &'static str {
    use WeatherCategory::*;

    match category {
        Sunny | Clear | PartlyCloudy | Windy => DARK_TEXT,
        _ => LIGHT_TEXT,
    }
}

/// Accent colour with hex alpha suffixes `15` (fill) and `30` (border).
pub fn card_style(category: WeatherCategory) -> CardStyle {
    let base = accent_color(category);
    CardStyle {
        background_color: format!("{base}15"),
        border_color: format!("{base}30"),
        border_width: 1,
    }
}

pub fn wind_description(wind_speed_mps: u32) -> &'static str {
    match wind_speed_mps {
        0..5 => "Calm",
        5..10 => "Light breeze",
        10..15 => "Moderate breeze",
        15..20 => "Strong breeze",
        _ => "High winds",
    }
}

pub fn humidity_level(humidity_pct: u8) -> &'static str {
    match humidity_pct {
        0..30 => "Low",
        30..60 => "Moderate",
        60..80 => "High",
        _ => "Very High",
    }
}

/// "Just now", "5h ago" or "3d ago" for a millisecond epoch timestamp.
pub fn relative_time(timestamp_ms: i64, now: DateTime<Utc>) -> String {
    let diff_hours = (now.timestamp_millis() - timestamp_ms).div_euclid(60 * 60 * 1000);

    if diff_hours < 1 {
        "Just now".to_string()
    } else if diff_hours < 24 {
        format!("{diff_hours}h ago")
    } else {
        format!("{}d ago", diff_hours / 24)
    }
}

/// 24-bit ANSI foreground escape for a `#RRGGBB` colour, if it parses.
pub fn ansi_fg(hex: &str) -> Option<String> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    let (r, g, b) = (channel(0..2)?, channel(2..4)?, channel(4..6)?);
    Some(format!("\x1b[38;2;{r};{g};{b}m"))
}
