use std::sync::Arc;
use std::time::Duration;

use crate::fetch::{FetchCoordinator, FetchOutcome};
use crate::geolocate::{GeoCoordinator, LocationSource};
use crate::history::RecentHistory;
use crate::model::{Query, UnitSystem};
use crate::notice::ErrorPresenter;
use crate::provider::WeatherProvider;
use crate::store::KvStore;

/// Quiescence interval for the search box.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Debounced queries shorter than this are dropped without a fetch.
pub const MIN_QUERY_LEN: usize = 2;

/// Store key for the persisted unit preference.
pub const UNIT_KEY: &str = "unit";

/// Top-level application state: search text, unit preference, recent-search
/// history and the two coordinators. All async results land here.
pub struct App {
    search_text: String,
    unit: UnitSystem,
    history: RecentHistory,
    weather: FetchCoordinator,
    geo: GeoCoordinator,
    notice: ErrorPresenter,
    store: Arc<dyn KvStore>,
}

impl App {
    /// Build the app, loading the persisted history and unit preference.
    /// A missing or unrecognized stored unit falls back to metric.
    pub fn new(
        store: Arc<dyn KvStore>,
        provider: Arc<dyn WeatherProvider>,
        location: Arc<dyn LocationSource>,
    ) -> Self {
        let unit = store
            .get(UNIT_KEY)
            .and_then(|raw| UnitSystem::parse(&raw))
            .unwrap_or_default();

        Self {
            search_text: String::new(),
            unit,
            history: RecentHistory::load(Arc::clone(&store)),
            weather: FetchCoordinator::new(provider),
            geo: GeoCoordinator::new(location),
            notice: ErrorPresenter::new(),
            store,
        }
    }

    /// Debounced search path: values shorter than [`MIN_QUERY_LEN`] are
    /// dropped before reaching the fetch coordinator.
    pub async fn search_settled(&mut self, term: &str) {
        if term.chars().count() < MIN_QUERY_LEN {
            return;
        }
        self.search_text = term.to_string();
        self.run_name_fetch(term).await;
    }

    /// Direct submission (search button, history selection): fetches
    /// immediately, bypassing the debounce and the length guard.
    pub async fn search_now(&mut self, term: &str) {
        self.search_text = term.to_string();
        self.run_name_fetch(term).await;
    }

    /// Re-run the query for a previously recorded search term.
    pub async fn select_recent(&mut self, term: &str) {
        self.search_now(term).await;
    }

    async fn run_name_fetch(&mut self, term: &str) {
        match self.weather.fetch_by_name(term, self.unit).await {
            FetchOutcome::Applied { location } => self.history.record(&location),
            FetchOutcome::Failed(message) => self.notice.show(message),
            FetchOutcome::Superseded => {}
        }
    }

    /// Switch unit systems. Persists the preference and re-issues the active
    /// query, if any, under the new unit.
    pub async fn set_unit(&mut self, unit: UnitSystem) {
        if unit == self.unit {
            return;
        }
        self.unit = unit;
        if let Err(err) = self.store.set(UNIT_KEY, unit.as_str()) {
            tracing::warn!("failed to persist unit preference: {err:#}");
        }

        match self.weather.refetch(unit).await {
            Some(FetchOutcome::Applied { location }) => {
                if matches!(self.weather.last_query(), Some(Query::Name(_))) {
                    self.history.record(&location);
                }
            }
            Some(FetchOutcome::Failed(message)) => self.notice.show(message),
            Some(FetchOutcome::Superseded) | None => {}
        }
    }

    /// "Use my location": clears the search text, asks the location source
    /// for coordinates and fetches weather for them.
    pub async fn locate(&mut self) {
        self.search_text.clear();

        match self.geo.locate().await {
            Ok(coordinates) => {
                if let FetchOutcome::Failed(message) =
                    self.weather.fetch_by_coordinates(coordinates, self.unit).await
                {
                    self.notice.show(message);
                }
            }
            Err(err) => self.notice.show(err.to_string()),
        }
    }

    pub fn recent(&self) -> &[String] {
        self.history.entries()
    }

    pub fn clear_recent(&mut self) {
        self.history.clear();
    }

    pub fn unit(&self) -> UnitSystem {
        self.unit
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn weather(&self) -> &FetchCoordinator {
        &self.weather
    }

    pub fn geo(&self) -> &GeoCoordinator {
        &self.geo
    }

    /// The transient error currently on display, if any.
    pub fn active_error(&self) -> Option<String> {
        self.notice.active()
    }

    pub fn is_loading(&self) -> bool {
        self.weather.is_loading() || self.geo.is_loading()
    }

    /// True when there is nothing to show yet: no results, no pending
    /// request and no visible error.
    pub fn show_empty_state(&self) -> bool {
        !self.weather.has_data() && !self.is_loading() && self.active_error().is_none()
    }
}
