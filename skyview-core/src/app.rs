//! Application service: owns the state container, runs lookups through the
//! configured providers and writes changed slices back to storage.

use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;

use crate::{
    error::LookupError,
    location::{FixedLocation, LocationSource, PermissionStatus},
    model::{FavoriteCity, RecentSearch, TemperatureUnit, WeatherData, WeatherRequest},
    provider::{WeatherProvider, simulated::SimulatedProvider},
    state::{Action, WeatherState, reduce},
    store::{self, KeyValueStore},
};

pub const FETCH_FAILED: &str = "Failed to fetch weather data";
pub const PERMISSION_DENIED: &str =
    "Location permission denied. Please enable location access in settings.";
pub const LOCATION_FAILED: &str = "Failed to get current location weather";

#[derive(Debug)]
pub struct WeatherApp {
    state: WeatherState,
    store: Arc<dyn KeyValueStore>,
    provider: Box<dyn WeatherProvider>,
    locator: Box<dyn WeatherProvider>,
    location: Box<dyn LocationSource>,
}

impl WeatherApp {
    /// City searches go to `provider`; current-location lookups use the
    /// offline simulator until [`with_locator`](Self::with_locator) says otherwise.
    pub fn new(store: Arc<dyn KeyValueStore>, provider: Box<dyn WeatherProvider>) -> Self {
        Self {
            state: WeatherState::default(),
            store,
            provider,
            locator: Box::new(SimulatedProvider::new()),
            location: Box::new(FixedLocation::unknown()),
        }
    }

    pub fn with_locator(mut self, locator: Box<dyn WeatherProvider>) -> Self {
        self.locator = locator;
        self
    }

    pub fn with_location(mut self, location: Box<dyn LocationSource>) -> Self {
        self.location = location;
        self
    }

    pub fn state(&self) -> &WeatherState {
        &self.state
    }

    /// A Celsius reading in the user's chosen unit.
    pub fn display_temperature(&self, celsius: i32) -> i32 {
        self.state.temperature_unit.convert(f64::from(celsius))
    }

    /// Run one action through the reducer and persist whatever it touched.
    pub fn dispatch(&mut self, action: Action) -> Result<()> {
        let touched = Persisted::touched_by(&action);
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);

        match touched {
            Some(Persisted::RecentSearches) => store::write_json(
                &*self.store,
                store::RECENT_SEARCHES_KEY,
                &self.state.recent_searches,
            ),
            Some(Persisted::FavoriteCities) => store::write_json(
                &*self.store,
                store::FAVORITE_CITIES_KEY,
                &self.state.favorite_cities,
            ),
            Some(Persisted::TemperatureUnit) => store::write_json(
                &*self.store,
                store::TEMPERATURE_UNIT_KEY,
                &self.state.temperature_unit,
            ),
            None => Ok(()),
        }
    }

    pub fn load_stored_data(&mut self) -> Result<()> {
        let data = store::load_stored_data(&*self.store);
        tracing::debug!(
            "Loaded {} recent searches, {} favorites, unit {}",
            data.recent_searches.len(),
            data.favorite_cities.len(),
            data.temperature_unit
        );

        self.dispatch(Action::LoadStoredData {
            recent_searches: data.recent_searches,
            favorite_cities: data.favorite_cities,
            temperature_unit: data.temperature_unit,
        })
    }

    /// Look up `city` and make it the current weather. Lookup failures land
    /// in `state().error`; only storage failures are returned.
    pub async fn search_weather(&mut self, city: &str) -> Result<()> {
        let city = city.trim();
        if city.is_empty() {
            tracing::debug!("Ignoring empty search");
            return Ok(());
        }

        self.begin_lookup()?;

        let outcome = self
            .provider
            .get_weather(&WeatherRequest::City(city.to_string()))
            .await;
        let result = match outcome {
            Ok(weather) => self.show(weather),
            Err(err) => {
                tracing::warn!("Weather search for '{city}' failed: {err:#}");
                let message = match LookupError::find(&err) {
                    Some(e) if matches!(e, LookupError::CityNotFound | LookupError::NoData) => {
                        e.to_string()
                    }
                    _ => FETCH_FAILED.to_string(),
                };
                self.dispatch(Action::SetError(Some(message)))
            }
        };

        self.dispatch(Action::SetLoading(false))?;
        result
    }

    /// Weather for the device position, through the coordinate provider.
    pub async fn locate(&mut self) -> Result<()> {
        self.begin_lookup()?;

        let result = if self.location.request_permission().await == PermissionStatus::Denied {
            self.dispatch(Action::SetError(Some(PERMISSION_DENIED.to_string())))
        } else {
            let lookup = match self.location.current_position().await {
                Ok(coords) => {
                    tracing::info!("Current location: {coords}");
                    self.locator.get_weather(&WeatherRequest::Coordinates(coords)).await
                }
                Err(err) => Err(err),
            };

            match lookup {
                Ok(weather) => self.show(weather),
                Err(err) => {
                    tracing::warn!("Current location weather failed: {err:#}");
                    self.dispatch(Action::SetError(Some(LOCATION_FAILED.to_string())))
                }
            }
        };

        self.dispatch(Action::SetLoading(false))?;
        result
    }

    /// Re-run the lookup behind the current weather. A fresh session has none
    /// yet, so the newest recent search stands in for it; with no history at
    /// all this falls back to the current location.
    pub async fn refresh(&mut self) -> Result<()> {
        let city = self
            .state
            .current_weather
            .as_ref()
            .map(|w| w.city.clone())
            .or_else(|| self.state.recent_searches.first().map(|s| s.city.clone()));

        match city {
            Some(city) => self.search_weather(&city).await,
            None => self.locate().await,
        }
    }

    pub fn add_to_favorites(&mut self, weather: WeatherData) -> Result<()> {
        self.dispatch(Action::AddFavorite(FavoriteCity::from_weather(weather, Utc::now())))
    }

    pub fn remove_from_favorites(&mut self, city: &str) -> Result<()> {
        self.dispatch(Action::RemoveFavorite(city.to_string()))
    }

    /// Heart button: add if absent, remove if present. Returns whether the
    /// city is a favorite afterwards.
    pub fn toggle_favorite(&mut self, weather: WeatherData) -> Result<bool> {
        if self.state.is_favorite(&weather.city) {
            self.remove_from_favorites(&weather.city)?;
            Ok(false)
        } else {
            self.add_to_favorites(weather)?;
            Ok(true)
        }
    }

    pub fn toggle_temperature_unit(&mut self) -> Result<()> {
        self.dispatch(Action::ToggleTemperatureUnit)
    }

    pub fn set_temperature_unit(&mut self, unit: TemperatureUnit) -> Result<()> {
        if self.state.temperature_unit == unit {
            return Ok(());
        }
        self.toggle_temperature_unit()
    }

    pub fn clear_recent_searches(&mut self) -> Result<()> {
        self.dispatch(Action::ClearRecentSearches)
    }

    /// Clear the previous error before raising the flag: `SetError` also
    /// lowers `is_loading`.
    fn begin_lookup(&mut self) -> Result<()> {
        self.dispatch(Action::SetError(None))?;
        self.dispatch(Action::SetLoading(true))
    }

    fn show(&mut self, weather: WeatherData) -> Result<()> {
        let search = RecentSearch::from_weather(&weather, Utc::now());
        self.dispatch(Action::SetCurrentWeather(weather))?;
        self.dispatch(Action::AddRecentSearch(search))
    }
}

enum Persisted {
    RecentSearches,
    FavoriteCities,
    TemperatureUnit,
}

impl Persisted {
    fn touched_by(action: &Action) -> Option<Self> {
        match action {
            Action::AddRecentSearch(_) | Action::ClearRecentSearches => Some(Self::RecentSearches),
            Action::AddFavorite(_) | Action::RemoveFavorite(_) => Some(Self::FavoriteCities),
            Action::ToggleTemperatureUnit => Some(Self::TemperatureUnit),
            Action::SetCurrentWeather(_)
            | Action::SetLoading(_)
            | Action::SetError(_)
            | Action::LoadStoredData { .. } => None,
        }
    }
}
