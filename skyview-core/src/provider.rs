use crate::{
    Config, WeatherData, WeatherRequest,
    provider::{
        mock_server::MockServerProvider, openweather::OpenWeatherProvider,
        simulated::SimulatedProvider, weatherapi::WeatherApiProvider,
    },
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug};

pub mod mock_server;
pub mod openweather;
pub mod simulated;
pub mod weatherapi;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    /// Local JSON weather server.
    MockServer,
    WeatherApi,
    OpenWeather,
    /// Offline regional generator, coordinates only.
    Simulated,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::MockServer => "mock-server",
            ProviderId::WeatherApi => "weatherapi",
            ProviderId::OpenWeather => "openweather",
            ProviderId::Simulated => "simulated",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[
            ProviderId::MockServer,
            ProviderId::WeatherApi,
            ProviderId::OpenWeather,
            ProviderId::Simulated,
        ]
    }

    pub fn requires_api_key(&self) -> bool {
        matches!(self, ProviderId::WeatherApi | ProviderId::OpenWeather)
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "mock-server" | "mock" | "local" => Ok(ProviderId::MockServer),
            "weatherapi" => Ok(ProviderId::WeatherApi),
            "openweather" => Ok(ProviderId::OpenWeather),
            "simulated" => Ok(ProviderId::Simulated),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: mock-server, weatherapi, openweather, simulated."
            )),
        }
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    async fn get_weather(&self, request: &WeatherRequest) -> anyhow::Result<WeatherData>;
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let base_url = config.provider_base_url(id).map(str::to_owned);
    let api_key = || {
        config.provider_api_key(id).map(str::to_owned).ok_or_else(|| {
            anyhow::anyhow!(
                "No API key configured for provider '{id}'.\n\
                     Hint: run `skyview configure {id}` and enter your API key."
            )
        })
    };

    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::MockServer => Box::new(MockServerProvider::new(
            base_url.as_deref().unwrap_or(mock_server::DEFAULT_BASE_URL),
        )),
        ProviderId::WeatherApi => Box::new(WeatherApiProvider::with_base_url(
            api_key()?,
            base_url.as_deref().unwrap_or(weatherapi::DEFAULT_BASE_URL),
        )),
        ProviderId::OpenWeather => Box::new(OpenWeatherProvider::with_base_url(
            api_key()?,
            base_url.as_deref().unwrap_or(openweather::DEFAULT_BASE_URL),
        )),
        ProviderId::Simulated => Box::new(SimulatedProvider::new()),
    };

    tracing::debug!("Using weather provider '{id}'");
    Ok(boxed)
}

/// Construct the default provider from config, using `default_provider` field.
pub fn default_provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let id = config.default_provider_id()?;
    provider_from_config(id, config)
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

pub(crate) fn now_id() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
