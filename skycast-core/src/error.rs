use thiserror::Error;

/// Failures from the weather provider, worded for direct display.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Location '{0}' not found")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Weather service returned {status}: {message}")]
    Provider { status: u16, message: String },

    #[error("Could not read weather service response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failures from the one-shot location lookup.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,

    #[error("Location service unavailable")]
    Unavailable,

    #[error("Location request timed out")]
    Timeout,

    #[error("Location error: {0}")]
    Other(String),
}
