use crate::model::{FavoriteCity, RecentSearch, TemperatureUnit, WeatherData};

/// Upper bound on remembered searches.
pub const MAX_RECENT_SEARCHES: usize = 10;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeatherState {
    pub current_weather: Option<WeatherData>,
    /// Newest first, unique by city, at most [`MAX_RECENT_SEARCHES`].
    pub recent_searches: Vec<RecentSearch>,
    /// Newest first, unique by city.
    pub favorite_cities: Vec<FavoriteCity>,
    pub temperature_unit: TemperatureUnit,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl WeatherState {
    pub fn is_favorite(&self, city: &str) -> bool {
        self.favorite_cities.iter().any(|fav| fav.city == city)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Also clears any error.
    SetCurrentWeather(WeatherData),
    SetLoading(bool),
    /// Also stops loading.
    SetError(Option<String>),
    AddRecentSearch(RecentSearch),
    ClearRecentSearches,
    AddFavorite(FavoriteCity),
    RemoveFavorite(String),
    ToggleTemperatureUnit,
    LoadStoredData {
        recent_searches: Vec<RecentSearch>,
        favorite_cities: Vec<FavoriteCity>,
        temperature_unit: TemperatureUnit,
    },
}

/// Pure state transition.
pub fn reduce(state: WeatherState, action: Action) -> WeatherState {
    match action {
        Action::SetCurrentWeather(weather) => WeatherState {
            current_weather: Some(weather),
            error: None,
            ..state
        },

        Action::SetLoading(is_loading) => WeatherState { is_loading, ..state },

        Action::SetError(error) => WeatherState {
            error,
            is_loading: false,
            ..state
        },

        Action::AddRecentSearch(search) => {
            let mut recent_searches = state.recent_searches;
            recent_searches.retain(|existing| existing.city != search.city);
            recent_searches.insert(0, search);
            recent_searches.truncate(MAX_RECENT_SEARCHES);

            WeatherState { recent_searches, ..state }
        }

        Action::ClearRecentSearches => WeatherState {
            recent_searches: Vec::new(),
            ..state
        },

        Action::AddFavorite(favorite) => {
            let mut favorite_cities = state.favorite_cities;
            favorite_cities.retain(|existing| existing.city != favorite.city);
            favorite_cities.insert(0, favorite);

            WeatherState { favorite_cities, ..state }
        }

        Action::RemoveFavorite(city) => {
            let mut favorite_cities = state.favorite_cities;
            favorite_cities.retain(|fav| fav.city != city);

            WeatherState { favorite_cities, ..state }
        }

        Action::ToggleTemperatureUnit => WeatherState {
            temperature_unit: state.temperature_unit.toggled(),
            ..state
        },

        Action::LoadStoredData {
            recent_searches,
            favorite_cities,
            temperature_unit,
        } => WeatherState {
            recent_searches,
            favorite_cities,
            temperature_unit,
            ..state
        },
    }
}
