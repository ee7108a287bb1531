//! Core library for the `skycast` weather app.
//!
//! This crate defines:
//! - Shared domain models (queries, snapshots, forecast entries)
//! - Abstractions over the weather provider and the location source
//! - The coordination layer: debounced search, fetch and geolocation state,
//!   transient error display, and the persisted recent-search history
//!
//! It is used by `skycast-cli`, but can also be reused by other front ends.

pub mod app;
pub mod config;
pub mod debounce;
pub mod error;
pub mod fetch;
pub mod geolocate;
pub mod history;
pub mod model;
pub mod notice;
pub mod provider;
pub mod store;

pub use app::App;
pub use config::Config;
pub use error::{LocationError, WeatherError};
pub use model::{Coordinates, ForecastEntry, Query, UnitSystem, WeatherSnapshot};
pub use provider::WeatherProvider;
