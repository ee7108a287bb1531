use std::sync::Arc;

use parking_lot::Mutex;

use crate::model::{Coordinates, ForecastEntry, Query, UnitSystem, WeatherSnapshot};
use crate::provider::WeatherProvider;

/// How a fetch settled.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Results were applied; carries the provider-resolved location name.
    Applied { location: String },
    /// The fetch failed; the message is ready for display. Previously
    /// applied results are left in place.
    Failed(String),
    /// A newer fetch was issued before this one settled; nothing was written.
    Superseded,
}

#[derive(Default)]
struct FetchState {
    snapshot: Option<WeatherSnapshot>,
    forecast: Vec<ForecastEntry>,
    loading: bool,
    error: Option<String>,
    last_query: Option<Query>,
    issued: u64,
}

/// Owns the current-conditions and forecast slots and the shared
/// loading/error flags for both query forms.
///
/// Every issued fetch takes a fresh token; a settling fetch whose token is no
/// longer the latest is discarded outright, so an early request that resolves
/// late can never overwrite a newer result.
pub struct FetchCoordinator {
    provider: Arc<dyn WeatherProvider>,
    state: Arc<Mutex<FetchState>>,
}

impl FetchCoordinator {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider, state: Arc::new(Mutex::new(FetchState::default())) }
    }

    pub async fn fetch_by_name(&self, term: &str, unit: UnitSystem) -> FetchOutcome {
        self.fetch(Query::Name(term.to_string()), unit).await
    }

    pub async fn fetch_by_coordinates(
        &self,
        coordinates: Coordinates,
        unit: UnitSystem,
    ) -> FetchOutcome {
        self.fetch(Query::Coordinates(coordinates), unit).await
    }

    /// Re-issue the last query under a different unit system. `None` when
    /// nothing has been fetched yet.
    pub async fn refetch(&self, unit: UnitSystem) -> Option<FetchOutcome> {
        let query = self.state.lock().last_query.clone()?;
        Some(self.fetch(query, unit).await)
    }

    async fn fetch(&self, query: Query, unit: UnitSystem) -> FetchOutcome {
        let token = {
            let mut state = self.state.lock();
            state.issued += 1;
            state.loading = true;
            state.last_query = Some(query.clone());
            state.issued
        };

        tracing::debug!(%query, unit = unit.as_str(), "issuing weather fetch");

        let (current, forecast) = tokio::join!(
            self.provider.current(&query, unit),
            self.provider.forecast(&query, unit),
        );

        let mut state = self.state.lock();
        if token != state.issued {
            tracing::debug!(%query, "discarding superseded fetch result");
            return FetchOutcome::Superseded;
        }
        state.loading = false;

        match (current, forecast) {
            (Ok(snapshot), Ok(series)) => {
                let location = snapshot.location_name.clone();
                state.error = None;
                state.snapshot = Some(snapshot);
                state.forecast = series;
                FetchOutcome::Applied { location }
            }
            (Err(err), _) | (_, Err(err)) => {
                let message = err.to_string();
                tracing::debug!(%query, %message, "weather fetch failed");
                state.error = Some(message.clone());
                FetchOutcome::Failed(message)
            }
        }
    }

    pub fn snapshot(&self) -> Option<WeatherSnapshot> {
        self.state.lock().snapshot.clone()
    }

    pub fn forecast(&self) -> Vec<ForecastEntry> {
        self.state.lock().forecast.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error.clone()
    }

    pub fn last_query(&self) -> Option<Query> {
        self.state.lock().last_query.clone()
    }

    pub fn has_data(&self) -> bool {
        let state = self.state.lock();
        state.snapshot.is_some() || !state.forecast.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WeatherError;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::sleep;

    fn snapshot(name: &str, unit: UnitSystem) -> WeatherSnapshot {
        WeatherSnapshot {
            location_name: name.to_string(),
            temperature: 15.0,
            feels_like: 14.0,
            condition: "clear sky".to_string(),
            humidity_pct: 55,
            wind_speed: 3.0,
            observed_at: Utc::now(),
            unit,
        }
    }

    fn entry() -> ForecastEntry {
        ForecastEntry {
            at: Utc::now(),
            temperature: 12.0,
            condition: "clear sky".to_string(),
            humidity_pct: 60,
            wind_speed: 2.0,
        }
    }

    #[derive(Debug, Default)]
    struct FakeProvider {
        failing: Mutex<HashSet<String>>,
        delays_ms: Mutex<HashMap<String, u64>>,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn fail(&self, name: &str) {
            self.failing.lock().insert(name.to_string());
        }

        fn delay(&self, name: &str, ms: u64) {
            self.delays_ms.lock().insert(name.to_string(), ms);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        async fn respond(&self, query: &Query) -> Result<String, WeatherError> {
            let name = query.to_string();
            let delay = self.delays_ms.lock().get(&name).copied();
            if let Some(ms) = delay {
                sleep(Duration::from_millis(ms)).await;
            }
            if self.failing.lock().contains(&name) {
                return Err(WeatherError::NotFound(name));
            }
            Ok(name)
        }
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn current(
            &self,
            query: &Query,
            unit: UnitSystem,
        ) -> Result<WeatherSnapshot, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let name = self.respond(query).await?;
            Ok(snapshot(&name, unit))
        }

        async fn forecast(
            &self,
            query: &Query,
            _unit: UnitSystem,
        ) -> Result<Vec<ForecastEntry>, WeatherError> {
            self.respond(query).await?;
            Ok(vec![entry()])
        }
    }

    fn coordinator() -> (Arc<FakeProvider>, FetchCoordinator) {
        let provider = Arc::new(FakeProvider::default());
        let coordinator = FetchCoordinator::new(Arc::clone(&provider) as Arc<dyn WeatherProvider>);
        (provider, coordinator)
    }

    #[tokio::test]
    async fn successful_fetch_fills_slots_and_clears_error() {
        let (provider, coordinator) = coordinator();
        provider.fail("Zzznotacity");

        // Leave a failure in the error slot first.
        coordinator.fetch_by_name("Zzznotacity", UnitSystem::Metric).await;
        assert!(coordinator.error().is_some());

        let outcome = coordinator.fetch_by_name("London", UnitSystem::Metric).await;

        assert_eq!(outcome, FetchOutcome::Applied { location: "London".to_string() });
        assert_eq!(coordinator.snapshot().map(|s| s.location_name).as_deref(), Some("London"));
        assert_eq!(coordinator.forecast().len(), 1);
        assert_eq!(coordinator.error(), None);
        assert!(!coordinator.is_loading());
    }

    #[tokio::test]
    async fn failed_fetch_keeps_prior_results() {
        let (provider, coordinator) = coordinator();

        coordinator.fetch_by_name("London", UnitSystem::Metric).await;
        provider.fail("Zzznotacity");

        let outcome = coordinator.fetch_by_name("Zzznotacity", UnitSystem::Metric).await;

        assert!(matches!(outcome, FetchOutcome::Failed(_)));
        assert_eq!(coordinator.snapshot().map(|s| s.location_name).as_deref(), Some("London"));
        assert_eq!(coordinator.forecast().len(), 1);
        assert_eq!(
            coordinator.error().as_deref(),
            Some("Location 'Zzznotacity' not found"),
        );
        assert!(!coordinator.is_loading());
    }

    #[tokio::test]
    async fn fetch_by_coordinates_shares_the_same_slots() {
        let (_, coordinator) = coordinator();

        coordinator.fetch_by_name("London", UnitSystem::Metric).await;
        let coords = Coordinates { latitude: 35.6762, longitude: 139.6503 };
        coordinator.fetch_by_coordinates(coords, UnitSystem::Metric).await;

        assert_eq!(
            coordinator.snapshot().map(|s| s.location_name).as_deref(),
            Some("35.6762,139.6503"),
        );
        assert_eq!(coordinator.last_query(), Some(Query::Coordinates(coords)));
    }

    #[tokio::test]
    async fn refetch_reissues_the_last_query_under_the_new_unit() {
        let (provider, coordinator) = coordinator();

        coordinator.fetch_by_name("London", UnitSystem::Metric).await;
        let calls_before = provider.calls();

        let outcome = coordinator.refetch(UnitSystem::Imperial).await;

        assert!(matches!(outcome, Some(FetchOutcome::Applied { .. })));
        assert_eq!(provider.calls(), calls_before + 1);
        assert_eq!(coordinator.snapshot().map(|s| s.unit), Some(UnitSystem::Imperial));
        assert_eq!(coordinator.last_query(), Some(Query::Name("London".to_string())));
    }

    #[tokio::test]
    async fn refetch_without_a_prior_query_is_a_no_op() {
        let (provider, coordinator) = coordinator();

        assert_eq!(coordinator.refetch(UnitSystem::Imperial).await, None);
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_fetch_is_discarded_entirely() {
        let (provider, coordinator) = coordinator();
        provider.delay("slow", 300);

        let slow = coordinator.fetch_by_name("slow", UnitSystem::Metric);
        let fast = async {
            sleep(Duration::from_millis(10)).await;
            coordinator.fetch_by_name("fast", UnitSystem::Metric).await
        };

        let (slow_outcome, fast_outcome) = tokio::join!(slow, fast);

        assert_eq!(slow_outcome, FetchOutcome::Superseded);
        assert_eq!(fast_outcome, FetchOutcome::Applied { location: "fast".to_string() });
        assert_eq!(coordinator.snapshot().map(|s| s.location_name).as_deref(), Some("fast"));
        assert!(!coordinator.is_loading());
        assert_eq!(coordinator.error(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_failure_does_not_touch_the_error_slot() {
        let (provider, coordinator) = coordinator();
        provider.delay("slow", 300);
        provider.fail("slow");

        let slow = coordinator.fetch_by_name("slow", UnitSystem::Metric);
        let fast = async {
            sleep(Duration::from_millis(10)).await;
            coordinator.fetch_by_name("fast", UnitSystem::Metric).await
        };

        let (slow_outcome, _) = tokio::join!(slow, fast);

        assert_eq!(slow_outcome, FetchOutcome::Superseded);
        assert_eq!(coordinator.error(), None);
    }
}
