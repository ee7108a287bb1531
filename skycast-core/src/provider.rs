use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::WeatherError;
use crate::model::{ForecastEntry, Query, UnitSystem, WeatherSnapshot};

pub mod openweather;

/// Upstream weather data source: current conditions plus a daily forecast,
/// queried by city name or by coordinates.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, query: &Query, unit: UnitSystem)
    -> Result<WeatherSnapshot, WeatherError>;

    async fn forecast(
        &self,
        query: &Query,
        unit: UnitSystem,
    ) -> Result<Vec<ForecastEntry>, WeatherError>;
}
