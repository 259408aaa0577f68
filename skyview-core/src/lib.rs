//! Core library for the `skyview` weather app.
//!
//! This crate defines:
//! - Shared domain models (weather snapshots, recent searches, favorites)
//! - Condition normalization and the presentation tables built on it
//! - The state container and its key-value persistence
//! - Abstraction over weather providers and location sources
//! - Configuration & credentials handling
//!
//! It is used by `skyview-cli`, but can also be reused by other front ends.

pub mod app;
pub mod condition;
pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod provider;
pub mod state;
pub mod store;
pub mod theme;

pub use app::WeatherApp;
pub use condition::WeatherCategory;
pub use config::{Config, LocationConfig, ProviderConfig};
pub use error::LookupError;
pub use location::{FixedLocation, LocationSource, PermissionStatus};
pub use model::{
    Coordinates, FavoriteCity, RecentSearch, TemperatureUnit, WeatherData, WeatherRequest,
};
pub use provider::{ProviderId, WeatherProvider};
pub use state::{Action, WeatherState};
pub use store::{FileStore, KeyValueStore, MemoryStore};
