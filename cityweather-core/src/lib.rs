//! Core library for the `cityweather` widget.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather provider behind a small trait
//! - The query controller that turns lookups into observable state
//! - Shared domain models (raw conditions, display model, query state)
//!
//! It is used by `cityweather-cli`, but any renderer can drive the
//! controller and subscribe to its state.

pub mod config;
pub mod controller;
pub mod error;
pub mod icon;
pub mod model;
pub mod provider;

pub use config::{Config, ProviderConfig};
pub use controller::WeatherQueryController;
pub use error::{ConfigError, WeatherError};
pub use icon::IconKey;
pub use model::{CurrentConditions, DisplayModel, QueryState, Status};
pub use provider::{OpenWeatherProvider, WeatherProvider, provider_from_config};
