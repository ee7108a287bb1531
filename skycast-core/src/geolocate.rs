use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::{fmt::Debug, sync::Arc, time::Duration};

use crate::error::LocationError;
use crate::model::Coordinates;

/// One-shot position lookup.
#[async_trait]
pub trait LocationSource: Send + Sync + Debug {
    async fn current(&self) -> Result<Coordinates, LocationError>;
}

const DEFAULT_BASE_URL: &str = "http://ip-api.com/json";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Network geolocation via ip-api.com. Coarse, but it needs no permission
/// prompt and no API key.
#[derive(Debug, Clone)]
pub struct IpLocationSource {
    base_url: String,
    http: Client,
}

impl IpLocationSource {
    pub fn new() -> Result<Self, LocationError> {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Result<Self, LocationError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| LocationError::Other(err.to_string()))?;

        Ok(Self { base_url, http })
    }
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    lat: Option<f64>,
    lon: Option<f64>,
}

#[async_trait]
impl LocationSource for IpLocationSource {
    async fn current(&self) -> Result<Coordinates, LocationError> {
        let res = self.http.get(&self.base_url).send().await.map_err(classify_transport)?;

        let status = res.status();
        if status == StatusCode::FORBIDDEN {
            return Err(LocationError::PermissionDenied);
        }
        if !status.is_success() {
            return Err(LocationError::Unavailable);
        }

        let body: IpApiResponse = res
            .json()
            .await
            .map_err(|err| LocationError::Other(err.to_string()))?;

        if body.status != "success" {
            return Err(LocationError::Unavailable);
        }

        match (body.lat, body.lon) {
            (Some(latitude), Some(longitude)) => Ok(Coordinates { latitude, longitude }),
            _ => Err(LocationError::Other("location response missing coordinates".to_string())),
        }
    }
}

fn classify_transport(err: reqwest::Error) -> LocationError {
    if err.is_timeout() { LocationError::Timeout } else { LocationError::Unavailable }
}

#[derive(Default)]
struct GeoState {
    coordinates: Option<Coordinates>,
    loading: bool,
    error: Option<String>,
}

/// Tracks the single outstanding location request and its result slots.
pub struct GeoCoordinator {
    source: Arc<dyn LocationSource>,
    state: Arc<Mutex<GeoState>>,
}

impl GeoCoordinator {
    pub fn new(source: Arc<dyn LocationSource>) -> Self {
        Self { source, state: Arc::new(Mutex::new(GeoState::default())) }
    }

    /// Request the current position once. On failure the coordinates stay
    /// unset; there is no automatic retry.
    pub async fn locate(&self) -> Result<Coordinates, LocationError> {
        self.state.lock().loading = true;

        let outcome = self.source.current().await;

        let mut state = self.state.lock();
        state.loading = false;
        match &outcome {
            Ok(coordinates) => {
                state.coordinates = Some(*coordinates);
                state.error = None;
            }
            Err(err) => {
                tracing::debug!(%err, "location lookup failed");
                state.error = Some(err.to_string());
            }
        }

        outcome
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.state.lock().coordinates
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }
}
