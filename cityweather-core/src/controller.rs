//! Fetch-and-normalize lifecycle behind the weather widget.
//!
//! [`WeatherQueryController`] owns the [`QueryState`] and publishes every
//! change on a `tokio::sync::watch` channel. Renderers subscribe and never
//! write.
//!
//! Lookups may overlap. Each valid lookup takes a sequence number and its
//! outcome is applied only while that number is still the latest issued, so a
//! slow earlier request cannot overwrite a faster later one.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use chrono::Utc;
use tokio::sync::watch;

use crate::{
    DisplayModel, QueryState, Status, WeatherError, WeatherProvider, config::DEFAULT_CITY,
};

#[derive(Debug)]
pub struct WeatherQueryController {
    provider: Arc<dyn WeatherProvider>,
    state: watch::Sender<QueryState>,
    latest_seq: AtomicU64,
    default_city: String,
}

impl WeatherQueryController {
    /// Create an `Idle` controller remembering [`DEFAULT_CITY`].
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self::with_default_city(provider, DEFAULT_CITY)
    }

    pub fn with_default_city(
        provider: Arc<dyn WeatherProvider>,
        default_city: impl Into<String>,
    ) -> Self {
        let default_city = default_city.into();
        let (state, _) = watch::channel(QueryState::new(default_city.clone()));

        Self {
            provider,
            state,
            latest_seq: AtomicU64::new(0),
            default_city,
        }
    }

    /// First-paint lookup of the default city.
    pub async fn initialize(&self) -> Result<(), WeatherError> {
        let city = self.default_city.clone();
        self.search(&city).await
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> QueryState {
        self.state.borrow().clone()
    }

    /// Read-only view that is notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<QueryState> {
        self.state.subscribe()
    }

    /// Remember `new_city` as the input text and look it up.
    pub async fn search(&self, new_city: &str) -> Result<(), WeatherError> {
        self.state.send_modify(|s| s.city = new_city.to_string());
        self.lookup(new_city).await
    }

    /// Look up current conditions for `city_name`.
    ///
    /// Returns `Err(WeatherError::Validation)` for blank input without
    /// touching the state or the network. Provider failures are recorded in
    /// the state and never returned.
    pub async fn lookup(&self, city_name: &str) -> Result<(), WeatherError> {
        let city = city_name.trim();
        if city.is_empty() {
            tracing::warn!("lookup rejected: empty city name");
            return Err(WeatherError::Validation);
        }

        let seq = self.latest_seq.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(QueryState::start_loading);
        let guard = LoadingGuard {
            controller: self,
            seq,
            settled: false,
        };

        tracing::info!(city, seq, "looking up current weather");
        let outcome = self.provider.current_by_city(city).await;

        guard.settle(|state| match outcome {
            Ok(raw) => {
                let model = DisplayModel::from_conditions(raw, Utc::now());
                tracing::info!(
                    city = %model.city_name,
                    temp = model.temperature_celsius,
                    icon = %model.icon_key,
                    "weather updated"
                );
                state.succeed(model);
            }
            Err(err) => {
                match &err {
                    WeatherError::Transport(detail) => {
                        tracing::warn!(city, %detail, "weather lookup failed")
                    }
                    other => tracing::warn!(city, error = %other, "weather lookup failed"),
                }
                state.fail(err.user_message());
            }
        });

        Ok(())
    }

    fn is_latest(&self, seq: u64) -> bool {
        self.latest_seq.load(Ordering::SeqCst) == seq
    }
}

/// Applies the outcome of one lookup, or on drop without settling (the
/// lookup future was cancelled or the provider panicked) moves a lingering
/// `Loading` to a transport error.
struct LoadingGuard<'a> {
    controller: &'a WeatherQueryController,
    seq: u64,
    settled: bool,
}

impl LoadingGuard<'_> {
    fn settle(mut self, apply: impl FnOnce(&mut QueryState)) {
        self.settled = true;

        if !self.controller.is_latest(self.seq) {
            tracing::debug!(seq = self.seq, "discarding stale lookup response");
            return;
        }
        self.controller.state.send_modify(apply);
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.settled || !self.controller.is_latest(self.seq) {
            return;
        }
        self.controller.state.send_if_modified(|state| {
            if state.status != Status::Loading {
                return false;
            }
            tracing::warn!(seq = self.seq, "lookup abandoned while loading");
            state.fail(WeatherError::transport("lookup abandoned").user_message());
            true
        });
    }
}
