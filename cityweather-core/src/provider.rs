use crate::{Config, CurrentConditions, WeatherError, error::ConfigError};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

pub use openweather::OpenWeatherProvider;

/// Source of current conditions for a city.
///
/// Implementations map their own failure signals onto [`WeatherError`]:
/// an application-level "not found" becomes `NotFound`, everything else
/// that prevents a usable answer becomes `Transport`.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_by_city(&self, city: &str) -> Result<CurrentConditions, WeatherError>;
}

/// Construct the OpenWeather provider from config.
///
/// Fails before any request is made when no API key can be resolved.
pub fn provider_from_config(config: &Config) -> Result<Arc<dyn WeatherProvider>, ConfigError> {
    let api_key = config.api_key()?;
    let provider = OpenWeatherProvider::with_base_url(api_key, config.base_url())?;
    Ok(Arc::new(provider))
}
