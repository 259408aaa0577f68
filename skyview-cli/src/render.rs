//! Human-friendly terminal output.

use chrono::{DateTime, Utc};
use skyview_core::{
    FavoriteCity, RecentSearch, TemperatureUnit, WeatherData, theme,
};
use std::io::IsTerminal;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

#[derive(Debug, Clone, Copy)]
pub struct Style {
    color: bool,
    dark: bool,
}

impl Style {
    /// Colour only when stdout is a terminal and `NO_COLOR` is unset.
    pub fn detect(dark: bool) -> Self {
        let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        Self {
            color: !no_color && std::io::stdout().is_terminal(),
            dark,
        }
    }

    pub fn dark(&self) -> bool {
        self.dark
    }

    fn paint(&self, hex: &str, text: &str) -> String {
        match (self.color, theme::ansi_fg(hex)) {
            (true, Some(fg)) => format!("{fg}{text}{RESET}"),
            _ => text.to_string(),
        }
    }

    fn bold(&self, text: &str) -> String {
        if self.color {
            format!("{BOLD}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    /// A strip of the three gradient stops as coloured blocks.
    fn gradient_bar(&self, stops: theme::Gradient) -> Option<String> {
        if !self.color {
            return None;
        }
        Some(stops.iter().map(|hex| self.paint(hex, "████")).collect())
    }
}

pub fn temperature(celsius: i32, unit: TemperatureUnit) -> String {
    format!("{}{}", unit.convert(f64::from(celsius)), unit.symbol())
}

pub fn weather_card(
    style: Style,
    weather: &WeatherData,
    unit: TemperatureUnit,
    is_favorite: bool,
) -> String {
    let category = weather.weather;
    let accent = theme::accent_color(category);

    let mut lines = Vec::new();
    if let Some(bar) = style.gradient_bar(theme::background_gradient(category, style.dark)) {
        lines.push(bar);
    }

    let heart = if is_favorite { "  ♥" } else { "" };
    lines.push(format!(
        "{}  {}{heart}",
        theme::emoji(category),
        style.bold(&format!("{}, {}", weather.city, weather.country)),
    ));
    lines.push(format!(
        "   {}  {}",
        style.bold(&temperature(weather.temperature, unit)),
        style.paint(accent, category.label()),
    ));
    if !weather.description.is_empty() {
        lines.push(format!("   {}", weather.description));
    }
    lines.push(format!(
        "   Humidity {}% ({}) · Wind {} m/s ({})",
        weather.humidity,
        theme::humidity_level(weather.humidity),
        weather.wind_speed,
        theme::wind_description(weather.wind_speed),
    ));

    lines.join("\n")
}

pub fn weather_json(
    weather: &WeatherData,
    unit: TemperatureUnit,
    is_favorite: bool,
    dark: bool,
) -> serde_json::Value {
    let category = weather.weather;
    serde_json::json!({
        "weather": weather,
        "unit": unit,
        "displayTemperature": unit.convert(f64::from(weather.temperature)),
        "isFavorite": is_favorite,
        "theme": {
            "gradient": theme::gradient(category),
            "css": theme::css_gradient(category),
            "background": theme::background_gradient(category, dark),
            "textColor": theme::text_color(category),
            "emoji": theme::emoji(category),
            "card": theme::card_style(category),
            "screen": {
                "gradient": theme::screen_gradient(Some(category)),
                "textColor": theme::screen_text_color(Some(category)),
            },
        },
    })
}

pub fn recent_list(searches: &[RecentSearch], now: DateTime<Utc>) -> String {
    if searches.is_empty() {
        return "No recent searches.".to_string();
    }

    searches
        .iter()
        .enumerate()
        .map(|(i, s)| {
            format!(
                "{:>2}. {}, {}  ({})",
                i + 1,
                s.city,
                s.country,
                theme::relative_time(s.timestamp, now)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn favorites_list(
    style: Style,
    favorites: &[FavoriteCity],
    unit: TemperatureUnit,
    now: DateTime<Utc>,
) -> String {
    if favorites.is_empty() {
        return "No favorite cities yet.".to_string();
    }

    favorites
        .iter()
        .map(|fav| {
            let w = &fav.weather_data;
            format!(
                "{}  {}, {}  {}  {}  (added {})",
                theme::emoji(w.weather),
                style.bold(&fav.city),
                fav.country,
                temperature(w.temperature, unit),
                style.paint(theme::accent_color(w.weather), w.weather.label()),
                theme::relative_time(fav.added_at, now).to_lowercase(),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyview_core::{Coordinates, WeatherCategory};

    const PLAIN: Style = Style {
        color: false,
        dark: false,
    };

    fn sample() -> WeatherData {
        WeatherData {
            id: 7,
            city: "Tokyo".into(),
            country: "Japan".into(),
            temperature: 18,
            weather: WeatherCategory::LightRain,
            humidity: 82,
            wind_speed: 4,
            description: "Light drizzle".into(),
            icon: "light-rain".into(),
            coordinates: Coordinates::new(35.68, 139.69),
        }
    }

    #[test]
    fn plain_card_has_no_escapes() {
        let card = weather_card(PLAIN, &sample(), TemperatureUnit::F, true);
        assert!(!card.contains('\x1b'));
        assert!(card.contains("Tokyo, Japan  ♥"));
        assert!(card.contains("64°F  Light Rain"));
        assert!(card.contains("Humidity 82% (Very High) · Wind 4 m/s (Calm)"));
    }

    #[test]
    fn json_carries_display_temperature() {
        let value = weather_json(&sample(), TemperatureUnit::F, false, false);
        assert_eq!(value["displayTemperature"], 64);
        assert_eq!(value["unit"], "F");
        assert_eq!(value["weather"]["weather"], "Light Rain");
        assert_eq!(value["theme"]["textColor"], "#fff");
    }

    #[test]
    fn json_theme_carries_card_screen_and_dark_backdrop() {
        let value = weather_json(&sample(), TemperatureUnit::C, false, true);
        let theme = &value["theme"];

        assert_eq!(theme["background"][0], "#4682B4");
        assert_eq!(theme["card"]["backgroundColor"], "#87CEEB15");
        assert_eq!(theme["card"]["borderWidth"], 1);
        assert_eq!(theme["screen"]["gradient"][0], "#87CEEB");
        assert!(
            theme["css"]
                .as_str()
                .unwrap()
                .starts_with("linear-gradient(135deg, #87CEEB 0%")
        );
    }

    #[test]
    fn empty_lists_have_messages() {
        let now = Utc::now();
        assert_eq!(recent_list(&[], now), "No recent searches.");
        assert_eq!(
            favorites_list(PLAIN, &[], TemperatureUnit::C, now),
            "No favorite cities yet."
        );
    }
}
