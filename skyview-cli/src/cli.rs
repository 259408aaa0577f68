use anyhow::{Context, anyhow};
use chrono::Utc;
use clap::{Parser, Subcommand};
use inquire::{Confirm, Password, Text};
use skyview_core::{
    Config, FileStore, FixedLocation, ProviderConfig, ProviderId, TemperatureUnit, WeatherApp,
    WeatherData, WeatherProvider,
    provider::{self, mock_server, simulated::SimulatedProvider},
    theme,
};
use std::sync::Arc;

use crate::render::{self, Style};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skyview", version, about = "Weather lookup with favorites and recent searches")]
pub struct Cli {
    /// Use this provider instead of the configured default.
    #[arg(long, global = true)]
    pub provider: Option<String>,

    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use the dark backdrop palette.
    #[arg(long, global = true)]
    pub dark: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials or endpoint for a specific provider.
    Configure {
        /// Provider short name, e.g. "mock-server", "weatherapi" or "openweather".
        provider: String,
    },

    /// Show current weather for a city.
    Search {
        /// City name.
        city: String,

        /// Print machine-readable JSON.
        #[arg(long)]
        json: bool,

        /// Also save the city to favorites.
        #[arg(long)]
        favorite: bool,
    },

    /// Show weather for the current location.
    Locate {
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        /// Ask the weather provider instead of the offline regional estimate.
        #[arg(long)]
        live: bool,

        #[arg(long)]
        json: bool,
    },

    /// Look up the newest recent search again, or the current location
    /// when there is no history.
    Refresh {
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        #[arg(long)]
        json: bool,
    },

    /// List or edit favorite cities.
    Favorites {
        #[command(subcommand)]
        action: Option<FavoritesAction>,
    },

    /// List recent searches.
    Recent {
        /// Forget all recent searches.
        #[arg(long)]
        clear: bool,
    },

    /// Show or change the temperature unit.
    Unit {
        #[command(subcommand)]
        action: Option<UnitAction>,
    },

    /// Suggested cities to search for.
    Cities,
}

#[derive(Debug, Subcommand)]
pub enum FavoritesAction {
    List,
    /// Look up a city and save it with its current weather.
    Add { city: String },
    Remove { city: String },
    /// Save the city if it is not a favorite yet, otherwise remove it.
    Toggle { city: String },
}

#[derive(Debug, Subcommand)]
pub enum UnitAction {
    Show,
    Toggle,
    Set { unit: String },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;
        let style = Style::detect(self.dark);

        match self.command {
            Command::Configure { provider } => configure(config, &provider),

            Command::Search {
                city,
                json,
                favorite,
            } => {
                let lookup = resolve_provider(self.provider.as_deref(), &config)?;
                let mut app = open_app(lookup)?;
                app.search_weather(&city).await?;
                fail_on_error(&app)?;

                if favorite {
                    save_current_favorite(&mut app)?;
                }
                print_current(&app, style, json)
            }

            Command::Locate {
                lat,
                lon,
                live,
                json,
            } => {
                let mut app = open_app(Box::new(SimulatedProvider::new()))?
                    .with_location(Box::new(position(lat, lon, &config)));
                if live {
                    app = app.with_locator(resolve_provider(self.provider.as_deref(), &config)?);
                }

                app.locate().await?;
                fail_on_error(&app)?;
                print_current(&app, style, json)
            }

            Command::Refresh { lat, lon, json } => {
                let has_history = !open_app(Box::new(SimulatedProvider::new()))?
                    .state()
                    .recent_searches
                    .is_empty();
                let lookup: Box<dyn WeatherProvider> = if has_history {
                    resolve_provider(self.provider.as_deref(), &config)?
                } else {
                    Box::new(SimulatedProvider::new())
                };

                let mut app =
                    open_app(lookup)?.with_location(Box::new(position(lat, lon, &config)));
                app.refresh().await?;
                fail_on_error(&app)?;
                print_current(&app, style, json)
            }

            Command::Favorites { action } => {
                let action = action.unwrap_or(FavoritesAction::List);
                let lookup: Box<dyn WeatherProvider> = match action {
                    FavoritesAction::Add { .. } | FavoritesAction::Toggle { .. } => {
                        resolve_provider(self.provider.as_deref(), &config)?
                    }
                    _ => Box::new(SimulatedProvider::new()),
                };
                let mut app = open_app(lookup)?;

                match action {
                    FavoritesAction::List => {}
                    FavoritesAction::Add { city } => {
                        app.search_weather(&city).await?;
                        fail_on_error(&app)?;
                        save_current_favorite(&mut app)?;
                    }
                    FavoritesAction::Toggle { city } => {
                        app.search_weather(&city).await?;
                        fail_on_error(&app)?;
                        let weather = current_weather(&app)?;
                        let name = weather.city.clone();
                        if app.toggle_favorite(weather)? {
                            println!("Saved {name} to favorites.");
                        } else {
                            println!("Removed {name} from favorites.");
                        }
                    }
                    FavoritesAction::Remove { city } => {
                        let Some(name) = find_favorite(&app, &city) else {
                            return Err(anyhow!("'{city}' is not in your favorites"));
                        };
                        app.remove_from_favorites(&name)?;
                        println!("Removed {name} from favorites.");
                    }
                }

                let state = app.state();
                println!(
                    "{}",
                    render::favorites_list(
                        style,
                        &state.favorite_cities,
                        state.temperature_unit,
                        Utc::now()
                    )
                );
                Ok(())
            }

            Command::Recent { clear } => {
                let mut app = open_app(Box::new(SimulatedProvider::new()))?;
                if clear {
                    app.clear_recent_searches()?;
                    println!("Cleared recent searches.");
                    return Ok(());
                }
                println!("{}", render::recent_list(&app.state().recent_searches, Utc::now()));
                Ok(())
            }

            Command::Unit { action } => {
                let mut app = open_app(Box::new(SimulatedProvider::new()))?;
                match action.unwrap_or(UnitAction::Show) {
                    UnitAction::Show => {}
                    UnitAction::Toggle => app.toggle_temperature_unit()?,
                    UnitAction::Set { unit } => {
                        app.set_temperature_unit(TemperatureUnit::try_from(unit.as_str())?)?
                    }
                }
                println!("{}", app.state().temperature_unit.symbol());
                Ok(())
            }

            Command::Cities => {
                let app = open_app(Box::new(SimulatedProvider::new()))?;
                let recent = &app.state().recent_searches;
                for city in theme::AVAILABLE_CITIES {
                    let seen = recent.iter().any(|s| s.city.eq_ignore_ascii_case(city));
                    println!("{}{city}", if seen { "* " } else { "  " });
                }
                Ok(())
            }
        }
    }
}

fn open_app(lookup: Box<dyn WeatherProvider>) -> anyhow::Result<WeatherApp> {
    let data_dir = Config::data_dir()?;
    tracing::debug!("Using data directory {}", data_dir.display());

    let mut app = WeatherApp::new(Arc::new(FileStore::new(data_dir)), lookup);
    app.load_stored_data()?;
    Ok(app)
}

fn resolve_provider(
    explicit: Option<&str>,
    config: &Config,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    match explicit {
        Some(name) => provider::provider_from_config(ProviderId::try_from(name)?, config),
        None => provider::default_provider_from_config(config),
    }
}

fn fail_on_error(app: &WeatherApp) -> anyhow::Result<()> {
    match &app.state().error {
        Some(message) => Err(anyhow!("{message}")),
        None => Ok(()),
    }
}

fn position(lat: Option<f64>, lon: Option<f64>, config: &Config) -> FixedLocation {
    match (lat, lon) {
        (Some(lat), Some(lon)) => FixedLocation::at(lat, lon),
        _ => config
            .location
            .map(|l| FixedLocation::at(l.latitude, l.longitude))
            .unwrap_or_else(FixedLocation::unknown),
    }
}

fn current_weather(app: &WeatherApp) -> anyhow::Result<WeatherData> {
    app.state()
        .current_weather
        .clone()
        .ok_or_else(|| anyhow!("No weather to save"))
}

fn save_current_favorite(app: &mut WeatherApp) -> anyhow::Result<()> {
    let weather = current_weather(app)?;
    let city = weather.city.clone();
    app.add_to_favorites(weather)?;
    println!("Saved {city} to favorites.");
    Ok(())
}

fn find_favorite(app: &WeatherApp, city: &str) -> Option<String> {
    app.state()
        .favorite_cities
        .iter()
        .find(|fav| fav.city.eq_ignore_ascii_case(city.trim()))
        .map(|fav| fav.city.clone())
}

fn print_current(app: &WeatherApp, style: Style, json: bool) -> anyhow::Result<()> {
    let state = app.state();
    let weather = state
        .current_weather
        .as_ref()
        .ok_or_else(|| anyhow!("No weather data available"))?;
    let is_favorite = state.is_favorite(&weather.city);

    if json {
        let value =
            render::weather_json(weather, state.temperature_unit, is_favorite, style.dark());
        println!(
            "{}",
            serde_json::to_string_pretty(&value).context("Failed to serialize weather output")?
        );
    } else {
        println!(
            "{}",
            render::weather_card(style, weather, state.temperature_unit, is_favorite)
        );
    }
    Ok(())
}

fn configure(mut config: Config, provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;

    let settings = match id {
        ProviderId::WeatherApi | ProviderId::OpenWeather => {
            let api_key = Password::new(&format!("API key for {id}:"))
                .without_confirmation()
                .prompt()
                .context("Failed to read API key")?;
            if api_key.trim().is_empty() {
                return Err(anyhow!("API key must not be empty"));
            }
            ProviderConfig {
                api_key: Some(api_key.trim().to_string()),
                base_url: None,
            }
        }
        ProviderId::MockServer => {
            let current = config
                .provider_base_url(id)
                .unwrap_or(mock_server::DEFAULT_BASE_URL)
                .to_string();
            let base_url = Text::new("Local weather server URL:")
                .with_default(&current)
                .prompt()
                .context("Failed to read server URL")?;
            ProviderConfig {
                api_key: None,
                base_url: Some(base_url.trim().to_string()),
            }
        }
        ProviderId::Simulated => ProviderConfig::default(),
    };

    let had_default = config.default_provider.is_some();
    config.upsert_provider(id, settings);

    if had_default && config.default_provider_id().ok() != Some(id) {
        let make_default = Confirm::new(&format!("Make {id} the default provider?"))
            .with_default(true)
            .prompt()
            .context("Failed to read answer")?;
        if make_default {
            config.set_default_provider(id);
        }
    }

    config.save()?;
    println!(
        "Saved {id} settings to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}
