use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::btree_map::{BTreeMap, Entry};

use crate::error::WeatherError;
use crate::model::{ForecastEntry, Query, UnitSystem, WeatherSnapshot};

use super::WeatherProvider;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Days covered by the free 5-day/3-hour forecast endpoint.
const FORECAST_DAYS: usize = 5;

/// OpenWeatherMap client.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self { api_key, base_url, http: Client::new() }
    }

    fn query_params(&self, query: &Query, unit: UnitSystem) -> Vec<(&'static str, String)> {
        let mut params = match query {
            Query::Name(name) => vec![("q", name.clone())],
            Query::Coordinates(c) => vec![
                ("lat", c.latitude.to_string()),
                ("lon", c.longitude.to_string()),
            ],
        };
        params.push(("units", unit.as_str().to_string()));
        params.push(("appid", self.api_key.clone()));
        params
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &Query,
        unit: UnitSystem,
    ) -> Result<T, WeatherError> {
        let url = format!("{}/{path}", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&self.query_params(query, unit))
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(WeatherError::NotFound(query.to_string()));
        }
        if !status.is_success() {
            return Err(WeatherError::Provider {
                status: status.as_u16(),
                message: truncate_body(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(
        &self,
        query: &Query,
        unit: UnitSystem,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let parsed: OwCurrentResponse = self.get_json("weather", query, unit).await?;

        let observed_at = unix_to_utc(parsed.dt).unwrap_or_else(Utc::now);
        let condition = parsed
            .weather
            .first()
            .map(|w| w.description.clone())
            .unwrap_or_else(|| "Unknown".to_string());

        Ok(WeatherSnapshot {
            location_name: parsed.name,
            temperature: parsed.main.temp,
            feels_like: parsed.main.feels_like,
            condition,
            humidity_pct: parsed.main.humidity,
            wind_speed: parsed.wind.speed,
            observed_at,
            unit,
        })
    }

    async fn forecast(
        &self,
        query: &Query,
        unit: UnitSystem,
    ) -> Result<Vec<ForecastEntry>, WeatherError> {
        let parsed: OwForecastResponse = self.get_json("forecast", query, unit).await?;
        Ok(condense_daily(parsed.list))
    }
}

/// Reduce the provider's 3-hourly list to one entry per calendar day (UTC),
/// preferring the slot closest to midday, capped at [`FORECAST_DAYS`].
fn condense_daily(list: Vec<OwForecastEntry>) -> Vec<ForecastEntry> {
    let mut by_day: BTreeMap<i64, OwForecastEntry> = BTreeMap::new();

    for entry in list {
        let day = entry.dt.div_euclid(86_400);
        match by_day.entry(day) {
            Entry::Vacant(slot) => {
                slot.insert(entry);
            }
            Entry::Occupied(mut slot) => {
                if midday_distance(entry.dt) < midday_distance(slot.get().dt) {
                    slot.insert(entry);
                }
            }
        }
    }

    by_day
        .into_values()
        .take(FORECAST_DAYS)
        .map(|entry| {
            let condition = entry
                .weather
                .first()
                .map(|w| w.description.clone())
                .unwrap_or_else(|| "Unknown".to_string());

            ForecastEntry {
                at: unix_to_utc(entry.dt).unwrap_or_else(Utc::now),
                temperature: entry.main.temp,
                condition,
                humidity_pct: entry.main.humidity,
                wind_speed: entry.wind.speed,
            }
        })
        .collect()
}

fn midday_distance(ts: i64) -> i64 {
    (ts.rem_euclid(86_400) - 43_200).abs()
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}
