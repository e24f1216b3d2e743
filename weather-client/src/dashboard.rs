use common::errors::AppError;
use common::models::CitySuggestion;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, instrument};

use crate::config::ClientConfig;
use crate::history::{FileStorage, RecentSearches};
use crate::service::{LocationSnapshot, WeatherService};

pub const FETCH_FAILED_MESSAGE: &str = "Could not fetch weather data. Please try again.";

pub const MIN_DAYS: u8 = 1;
pub const MAX_DAYS: u8 = 14;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub primary: Option<LocationSnapshot>,
    pub comparison: Option<LocationSnapshot>,
    pub loading: bool,
    pub comparison_loading: bool,
    /// User-facing message from the last failed primary load.
    pub error: Option<String>,
    pub current_query: Option<String>,
    pub days: u8,
}

impl DashboardState {
    fn new(days: u8) -> Self {
        Self {
            primary: None,
            comparison: None,
            loading: false,
            comparison_loading: false,
            error: None,
            current_query: None,
            days,
        }
    }

    pub fn has_prior_data(&self) -> bool {
        self.primary.is_some()
    }

    /// Full-page spinner only on a cold load; refreshes keep the old data on screen.
    pub fn show_spinner(&self) -> bool {
        self.loading && !self.has_prior_data()
    }
}

#[derive(Debug)]
pub enum LoadOutcome {
    Applied,
    /// A newer load started while this one was in flight; its result was dropped.
    Superseded,
    Failed(AppError),
}

impl LoadOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, LoadOutcome::Applied)
    }
}

#[derive(Clone, Copy)]
enum Slot {
    Primary,
    Comparison,
}

pub struct Dashboard {
    service: Arc<WeatherService>,
    history: Mutex<RecentSearches>,
    state: RwLock<DashboardState>,
    primary_seq: AtomicU64,
    comparison_seq: AtomicU64,
}

impl Dashboard {
    pub fn new(service: Arc<WeatherService>, history: RecentSearches, default_days: u8) -> Self {
        Self {
            service,
            history: Mutex::new(history),
            state: RwLock::new(DashboardState::new(clamp_days(default_days))),
            primary_seq: AtomicU64::new(0),
            comparison_seq: AtomicU64::new(0),
        }
    }

    /// Dashboard wired from config. History is file-backed when a directory is configured.
    pub async fn from_config(config: &ClientConfig) -> Result<Self, AppError> {
        let service = Arc::new(WeatherService::from_config(config).await?);
        let history = match &config.history_dir {
            Some(dir) => RecentSearches::load(Box::new(FileStorage::new(dir.clone()))),
            None => RecentSearches::in_memory(),
        };
        Ok(Self::new(service, history, config.forecast_days))
    }

    pub fn service(&self) -> &Arc<WeatherService> {
        &self.service
    }

    pub async fn snapshot(&self) -> DashboardState {
        self.state.read().await.clone()
    }

    pub async fn recent_searches(&self) -> Vec<CitySuggestion> {
        self.history.lock().await.entries().to_vec()
    }

    pub async fn forget_recent(&self, id: i64) {
        self.history.lock().await.remove(id);
    }

    /// Load `query` into the primary slot. Only the most recently started load is applied.
    #[instrument(skip(self))]
    pub async fn load(&self, query: &str, days: u8) -> LoadOutcome {
        let days = clamp_days(days);
        // Tag under the state lock so tag order matches the order `current_query` is written.
        let tag = {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
            state.current_query = Some(query.to_string());
            state.days = days;
            self.primary_seq.fetch_add(1, Ordering::SeqCst) + 1
        };

        let result = self.service.load_location(query, days).await;
        self.apply(Slot::Primary, tag, result).await
    }

    pub async fn select_city(&self, city: &CitySuggestion) -> LoadOutcome {
        self.history.lock().await.add(city.clone());
        let days = self.state.read().await.days;
        self.load(&location_query(city), days).await
    }

    pub async fn use_coordinates(&self, lat: f64, lon: f64) -> LoadOutcome {
        let days = self.state.read().await.days;
        self.load(&format!("{},{}", lat, lon), days).await
    }

    /// Store the new day count and refresh the current location, if any.
    pub async fn set_days(&self, days: u8) -> Option<LoadOutcome> {
        let days = clamp_days(days);
        let query = {
            let mut state = self.state.write().await;
            state.days = days;
            state.current_query.clone()
        };

        match query {
            Some(query) => Some(self.load(&query, days).await),
            None => None,
        }
    }

    #[instrument(skip(self, city), fields(city = %city.name))]
    pub async fn compare_with(&self, city: &CitySuggestion) -> LoadOutcome {
        let (tag, days) = {
            let mut state = self.state.write().await;
            state.comparison_loading = true;
            let tag = self.comparison_seq.fetch_add(1, Ordering::SeqCst) + 1;
            (tag, state.days)
        };

        let result = self.service.load_location(&location_query(city), days).await;
        self.apply(Slot::Comparison, tag, result).await
    }

    pub async fn clear_comparison(&self) {
        let mut state = self.state.write().await;
        // Any comparison still in flight becomes stale.
        self.comparison_seq.fetch_add(1, Ordering::SeqCst);
        state.comparison = None;
        state.comparison_loading = false;
    }

    async fn apply(
        &self,
        slot: Slot,
        tag: u64,
        result: Result<LocationSnapshot, AppError>,
    ) -> LoadOutcome {
        let seq = match slot {
            Slot::Primary => &self.primary_seq,
            Slot::Comparison => &self.comparison_seq,
        };

        let mut state = self.state.write().await;
        if seq.load(Ordering::SeqCst) != tag {
            debug!(tag, "Discarding superseded load");
            return LoadOutcome::Superseded;
        }

        match (slot, result) {
            (Slot::Primary, Ok(snapshot)) => {
                info!(city = %snapshot.weather.location.name, "Dashboard updated");
                state.primary = Some(snapshot);
                state.loading = false;
                LoadOutcome::Applied
            }
            (Slot::Primary, Err(e)) => {
                error!(error = %e, "Failed to fetch weather");
                state.error = Some(FETCH_FAILED_MESSAGE.to_string());
                state.loading = false;
                LoadOutcome::Failed(e)
            }
            (Slot::Comparison, Ok(snapshot)) => {
                state.comparison = Some(snapshot);
                state.comparison_loading = false;
                LoadOutcome::Applied
            }
            (Slot::Comparison, Err(e)) => {
                error!(error = %e, "Failed to fetch comparison weather");
                state.comparison_loading = false;
                LoadOutcome::Failed(e)
            }
        }
    }
}

/// Coordinates when the suggestion has them, otherwise the city name.
pub fn location_query(city: &CitySuggestion) -> String {
    if city.lat != 0.0 && city.lon != 0.0 {
        format!("{},{}", city.lat, city.lon)
    } else {
        city.name.clone()
    }
}

fn clamp_days(days: u8) -> u8 {
    days.clamp(MIN_DAYS, MAX_DAYS)
}
