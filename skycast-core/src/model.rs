use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Measurement system for temperatures and wind speeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }

    /// Parse a stored preference. Anything unrecognized yields `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "metric" => Some(UnitSystem::Metric),
            "imperial" => Some(UnitSystem::Imperial),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            UnitSystem::Metric => UnitSystem::Imperial,
            UnitSystem::Imperial => UnitSystem::Metric,
        }
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "°C",
            UnitSystem::Imperial => "°F",
        }
    }

    /// Wind speed unit as reported by the provider for this system.
    pub fn wind_suffix(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "m/s",
            UnitSystem::Imperial => "mph",
        }
    }
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latitude/longitude pair from the location source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// What a fetch is scoped to: a typed city name or a coordinate pair.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Name(String),
    Coordinates(Coordinates),
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Query::Name(name) => f.write_str(name),
            Query::Coordinates(c) => write!(f, "{:.4},{:.4}", c.latitude, c.longitude),
        }
    }
}

/// Current conditions for the active query. Replaced wholesale on every
/// successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location_name: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub condition: String,
    pub humidity_pct: u8,
    pub wind_speed: f64,
    pub observed_at: DateTime<Utc>,
    pub unit: UnitSystem,
}

/// One day of the forecast series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub at: DateTime<Utc>,
    pub temperature: f64,
    pub condition: String,
    pub humidity_pct: u8,
    pub wind_speed: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_parse_roundtrip() {
        for unit in [UnitSystem::Metric, UnitSystem::Imperial] {
            assert_eq!(UnitSystem::parse(unit.as_str()), Some(unit));
        }
    }

    #[test]
    fn unit_parse_rejects_unknown_values() {
        assert_eq!(UnitSystem::parse("kelvin"), None);
        assert_eq!(UnitSystem::parse(""), None);
        assert_eq!(UnitSystem::parse("Metric"), None);
    }

    #[test]
    fn unit_toggle_flips_between_systems() {
        assert_eq!(UnitSystem::Metric.toggled(), UnitSystem::Imperial);
        assert_eq!(UnitSystem::Imperial.toggled(), UnitSystem::Metric);
    }

    #[test]
    fn query_display() {
        assert_eq!(Query::Name("London".into()).to_string(), "London");

        let coords = Query::Coordinates(Coordinates { latitude: 51.5074, longitude: -0.1278 });
        assert_eq!(coords.to_string(), "51.5074,-0.1278");
    }
}
